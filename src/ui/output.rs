//! Output functions for consistent CLI formatting
//!
//! Every line goes through [`emit`], which picks a cliclack log line in a
//! terminal and a bracketed tag (`[OK]`, `[WARN]`, ...) otherwise. The plain
//! tags are what CI logs and the integration tests match on.

use super::context::UiContext;
use console::{style, StyledObject};

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Level {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Warn => style("[WARN]").yellow(),
            Self::Fail => style("[FAIL]").red(),
            Self::Info => style("[INFO]").cyan(),
        }
    }
}

fn emit(ctx: &UiContext, level: Level, line: String) {
    if !ctx.use_fancy_output() {
        println!("  {} {}", level.tag(), line);
        return;
    }

    let shown = match level {
        Level::Ok => cliclack::log::success(line),
        Level::Warn => cliclack::log::warning(line),
        Level::Fail => cliclack::log::error(line),
        Level::Info => cliclack::log::info(line),
    };
    shown.ok();
}

/// Title line of a command's report
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).green().bold()).ok();
    } else {
        println!("{}\n", style(title).green().bold());
    }
}

/// Closing summary of an install that stored everything
pub fn outro_success(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Ok, message);
}

/// Closing summary of an install with failed entries
pub fn outro_warn(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Warn, message);
}

fn outro(ctx: &UiContext, level: Level, message: &str) {
    if ctx.use_fancy_output() {
        let text = match level {
            Level::Ok => style(message).green().bold(),
            _ => style(message).yellow().bold(),
        };
        cliclack::outro(text).ok();
    } else {
        println!("\n{} {}", level.tag(), message);
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// e.g. `Evicted (v1)`
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    emit(ctx, Level::Ok, format!("{} ({})", message, style(detail).dim()));
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    emit(ctx, Level::Warn, format!("{} - {}", message, style(hint).dim()));
}

/// A resource that failed to seed, with the reason
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    emit(ctx, Level::Fail, format!("{}: {}", message, style(detail).red()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    emit(ctx, Level::Info, message.to_string());
}

/// Follow-up command suggestion
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Key-value line flagged healthy (`ok`) or needing attention
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let level = if ok { Level::Ok } else { Level::Warn };
    if ctx.use_fancy_output() {
        let value = match level {
            Level::Ok => style(value).green(),
            _ => style(value).yellow(),
        };
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {} {}: {}", level.tag(), key, value);
    }
}
