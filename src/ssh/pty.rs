// ABOUTME: Pseudo-terminal request parameters.
// ABOUTME: Fixed xterm 80x40 with echo off and 14.4 kbaud line speeds.

use russh::Pty;

pub const TERM: &str = "xterm";
pub const COLUMNS: u32 = 80;
pub const ROWS: u32 = 40;
pub const LINE_SPEED: u32 = 14400;

/// Terminal mode flags sent with the pty request.
pub type TerminalModes = Vec<(Pty, u32)>;

/// Terminal modes for the interactive session.
///
/// Fixed for the lifetime of a session.
pub fn terminal_modes() -> TerminalModes {
    vec![
        (Pty::ECHO, 0),                   // disable echoing
        (Pty::TTY_OP_ISPEED, LINE_SPEED), // input speed = 14.4kbaud
        (Pty::TTY_OP_OSPEED, LINE_SPEED), // output speed = 14.4kbaud
    ]
}

/// A pseudo-terminal allocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyRequest {
    pub term: String,
    pub columns: u32,
    pub rows: u32,
    pub modes: TerminalModes,
}

impl Default for PtyRequest {
    fn default() -> Self {
        Self {
            term: TERM.to_string(),
            columns: COLUMNS,
            rows: ROWS,
            modes: terminal_modes(),
        }
    }
}
