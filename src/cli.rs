// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One positional target host plus output and verbosity flags.

use clap::Parser;

#[derive(Parser)]
#[command(name = "remsh")]
#[command(about = "Open an interactive shell on a remote host over SSH")]
#[command(version)]
pub struct Cli {
    /// Host to connect to (user ubuntu, port 22)
    pub host: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress progress messages
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Report progress and outcome as JSON lines on stderr
    #[arg(long)]
    pub json: bool,
}
