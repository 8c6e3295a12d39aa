// ABOUTME: Client settings and fixed defaults.
// ABOUTME: Reads the agent socket and home directory once, at startup.

mod path;

pub use path::expand_tilde;

use crate::error::{Error, Result};
use crate::ssh::{DEFAULT_CONNECT_TIMEOUT, KeyEnv};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_USER: &str = "ubuntu";
pub const DEFAULT_PORT: u16 = 22;
/// Environment variable naming the agent's socket.
pub const AGENT_SOCK_ENV: &str = "SSH_AUTH_SOCK";
/// Key used when no agent is reachable.
pub const DEFAULT_KEY_PATH: &str = "~/.ssh/id_rsa";
/// Remote variable receiving the encoded key.
pub const KEY_ENV_VAR: &str = "BASE64_SSH_KEY";
/// Key file exported through [`KEY_ENV_VAR`].
pub const FORWARDED_KEY_PATH: &str = "~/.ssh/id_rsa";

/// Settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user: String,
    pub port: u16,
    /// Agent socket, if the environment named one.
    pub agent_socket: Option<PathBuf>,
    pub fallback_key: PathBuf,
    pub key_env: KeyEnv,
    pub connect_timeout: Duration,
}

impl Settings {
    /// Defaults for a user whose home directory is `home`.
    pub fn new(home: &Path, agent_socket: Option<PathBuf>) -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            port: DEFAULT_PORT,
            agent_socket,
            fallback_key: expand_tilde(DEFAULT_KEY_PATH, home),
            key_env: KeyEnv::new(KEY_ENV_VAR, expand_tilde(FORWARDED_KEY_PATH, home)),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Read the agent socket and home directory from the process environment.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        let agent_socket = std::env::var_os(AGENT_SOCK_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Ok(Self::new(&home, agent_socket))
    }
}
