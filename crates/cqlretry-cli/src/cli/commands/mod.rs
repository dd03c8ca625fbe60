//! CLI command handlers, one file per subcommand.

mod classify;
mod completions;
mod config;
mod schedule;

pub use classify::run_classify;
pub use completions::run_completions;
pub use config::run_config;
pub use schedule::run_schedule;
