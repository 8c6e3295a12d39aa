// ABOUTME: SSH-specific error types.
// ABOUTME: One variant family per session phase, plus the transport seam error.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("SSH agent error: {0}")]
    Agent(String),

    #[error("no authentication methods configured")]
    NoCredentials,

    #[error("failed to dial {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to open session channel: {0}")]
    Session(#[source] TransportError),

    #[error("request for pseudo terminal failed: {0}")]
    Pty(#[source] TransportError),

    #[error("failed to read forwarded key {path}: {reason}")]
    KeyEnvUnreadable { path: PathBuf, reason: String },

    #[error("failed to send SetEnv request for {name}: {source}")]
    Env {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to start interactive shell: {0}")]
    Shell(#[source] TransportError),

    #[error("remote shell ended abnormally: {0}")]
    Wait(String),

    #[error("session cancelled")]
    Cancelled,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither the agent nor the fallback key produced credentials.
    Credential,
    /// Transport connection or authentication failed.
    Dial,
    /// Channel open failed after a successful connection.
    Session,
    /// Pseudo-terminal request rejected.
    Pty,
    /// Remote environment request rejected.
    Env,
    /// Remote shell request rejected.
    Shell,
    /// Channel died while waiting for the remote shell.
    Wait,
    /// The caller cancelled the session.
    Cancelled,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::KeyLoadFailed { .. } | Error::Agent(_) | Error::NoCredentials => {
                ErrorKind::Credential
            }
            Error::Dial { .. } => ErrorKind::Dial,
            Error::Session(_) => ErrorKind::Session,
            Error::Pty(_) => ErrorKind::Pty,
            Error::KeyEnvUnreadable { .. } | Error::Env { .. } => ErrorKind::Env,
            Error::Shell(_) => ErrorKind::Shell,
            Error::Wait(_) => ErrorKind::Wait,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Errors raised by a [`Transport`](super::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("{0} request rejected by remote host")]
    Rejected(&'static str),

    #[error("authentication failed: no offered credential was accepted")]
    AuthenticationFailed,

    #[error("channel closed unexpectedly")]
    ChannelClosed,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
