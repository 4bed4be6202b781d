//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::cache::SeedOutcome;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with warning message
    pub fn stop_warn(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(style(message).yellow());
        } else {
            println!("{} {}", style("[WARN]").yellow(), message);
        }
    }
}

/// Progress bar for seeding a generation
///
/// Shows an indicatif bar in interactive mode and one line per failed entry
/// in CI.
pub struct SeedProgress {
    bar: Option<ProgressBar>,
}

impl SeedProgress {
    pub fn new(ctx: &UiContext, generation: &str, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            let template = ProgressStyle::default_bar()
                .template("  {spinner:.green} Seeding {prefix}  {bar:24.green/dim} {pos}/{len} {msg:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸─");
            bar.set_style(template);
            bar.set_prefix(generation.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Seeding {} ({} resources)...", generation, total);
            None
        };
        Self { bar }
    }

    /// Record one settled entry
    pub fn on_seeded(&self, outcome: &SeedOutcome) {
        match (&self.bar, outcome) {
            (Some(bar), _) => {
                bar.inc(1);
                bar.set_message(outcome.resource().to_string());
            }
            (None, SeedOutcome::Failed { resource, reason }) => {
                println!("  {} {}: {}", style("[FAIL]").red(), resource, reason);
            }
            (None, SeedOutcome::Stored { .. }) => {}
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
