//! Terminal output for the CLI
//!
//! Uses `cliclack` log lines and `indicatif` progress bars in interactive
//! terminals, with plain line-oriented output in CI and pipes.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, remark, section,
    step_error_detail, step_info, step_ok_detail, step_warn_hint,
};
pub use progress::{SeedProgress, TaskSpinner};
