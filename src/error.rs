// ABOUTME: Application-wide error types for remsh.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot determine home directory")]
    HomeDirUnavailable,

    #[error(transparent)]
    Ssh(#[from] crate::ssh::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
