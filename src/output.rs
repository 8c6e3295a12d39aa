// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet, and JSON output modes, always on stderr.

use crate::ssh::ExitStatus;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Errors only
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
///
/// Stdout belongs to the remote terminal, so everything here goes to stderr.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (suppressed in quiet mode).
    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                event: "progress",
                message: Some(message),
                ..JsonEvent::default()
            }),
        }
    }

    /// Report how the remote shell ended.
    pub fn exited(&self, status: &ExitStatus) {
        match self.mode {
            OutputMode::Normal => {
                if !status.success() {
                    eprintln!("Remote shell ended with {status}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&exit_event(status, self.elapsed_secs())),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => emit(&JsonEvent {
                event: "error",
                message: Some(message),
                duration_secs: self.elapsed_secs(),
                ..JsonEvent::default()
            }),
        }
    }
}

fn exit_event(status: &ExitStatus, duration_secs: Option<f64>) -> JsonEvent<'_> {
    let signal = match status {
        ExitStatus::Code(_) => None,
        ExitStatus::Signal { name, .. } => Some(name.as_str()),
    };
    JsonEvent {
        event: "exit",
        code: status.code(),
        signal,
        duration_secs,
        ..JsonEvent::default()
    }
}

fn emit(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

#[derive(Serialize, Default)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
