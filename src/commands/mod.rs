// ABOUTME: Command module aggregator for the remsh CLI.
// ABOUTME: Re-exports the shell command handler.

mod shell;

pub use shell::{exit_code, shell};
