// ABOUTME: Entry point for the remsh CLI application.
// ABOUTME: Parses arguments, sets up logging and runs the interactive shell.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use remsh::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    // Exit explicitly: a blocked stdin reader must not hold the runtime open.
    match commands::shell(&cli.host, &output).await {
        Ok(status) => std::process::exit(commands::exit_code(&status)),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}
