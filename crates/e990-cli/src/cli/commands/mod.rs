//! CLI command handlers, one per file.

mod completions;
mod fetch;
mod status;
mod years;

pub use completions::{run_completions, run_man};
pub use fetch::run_fetch;
pub use status::run_status;
pub use years::run_years;
