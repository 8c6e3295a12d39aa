// ABOUTME: Remote environment variable carrying a base64-encoded local key file.
// ABOUTME: Sent to the session before the shell starts.

use super::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

/// A local key file exported to the remote session as an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEnv {
    name: String,
    key_path: PathBuf,
}

impl KeyEnv {
    pub fn new(name: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            key_path: key_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Read the key file and return its standard base64 encoding.
    pub async fn encode(&self) -> Result<String> {
        let raw = tokio::fs::read(&self.key_path)
            .await
            .map_err(|e| Error::KeyEnvUnreadable {
                path: self.key_path.clone(),
                reason: e.to_string(),
            })?;
        Ok(STANDARD.encode(raw))
    }
}
