//! Command line surface: argument parsing and the update run it drives

pub mod args;
pub mod orchestration;

pub use args::Args;
pub use orchestration::{run_update_workflow, RunOutcome};
