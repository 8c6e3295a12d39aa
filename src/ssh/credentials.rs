// ABOUTME: Credential resolution for remote logins.
// ABOUTME: Prefers the SSH agent, falls back to a fixed private key file.

use super::error::{Error, Result};
use async_trait::async_trait;
use nonempty::NonEmpty;
use russh::keys::agent::client::AgentClient;
use russh::keys::{load_secret_key, ssh_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::UnixStream;

/// Which strategy produced an authentication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    AgentBacked,
    FileBacked,
}

/// An authentication method offered to the remote host.
///
/// Exists only for one connection attempt and is consumed by the dial.
pub enum AuthMethod<A> {
    /// Every identity the agent holds, in agent-reported order. The remote
    /// host may accept any one of them.
    Agent {
        agent: A,
        identities: NonEmpty<ssh_key::PublicKey>,
    },
    /// A single private key loaded from disk.
    KeyFile {
        path: PathBuf,
        key: Arc<ssh_key::PrivateKey>,
    },
}

impl<A> AuthMethod<A> {
    pub fn source(&self) -> CredentialSource {
        match self {
            AuthMethod::Agent { .. } => CredentialSource::AgentBacked,
            AuthMethod::KeyFile { .. } => CredentialSource::FileBacked,
        }
    }
}

impl<A> fmt::Debug for AuthMethod<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Agent { identities, .. } => f
                .debug_struct("Agent")
                .field("identities", &identities.len())
                .finish(),
            AuthMethod::KeyFile { path, .. } => {
                f.debug_struct("KeyFile").field("path", path).finish()
            }
        }
    }
}

/// Access to a running credential agent.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    type Agent: Send;

    /// Connect to the agent listening on `socket`.
    async fn connect(&self, socket: &Path) -> std::result::Result<Self::Agent, String>;

    /// List the agent's signing identities.
    async fn identities(
        &self,
        agent: &mut Self::Agent,
    ) -> std::result::Result<Vec<ssh_key::PublicKey>, String>;
}

/// Talks the agent protocol over a local Unix socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixAgentConnector;

#[async_trait]
impl AgentConnector for UnixAgentConnector {
    type Agent = AgentClient<UnixStream>;

    async fn connect(&self, socket: &Path) -> std::result::Result<Self::Agent, String> {
        AgentClient::connect_uds(socket)
            .await
            .map_err(|e| e.to_string())
    }

    async fn identities(
        &self,
        agent: &mut Self::Agent,
    ) -> std::result::Result<Vec<ssh_key::PublicKey>, String> {
        agent.request_identities().await.map_err(|e| e.to_string())
    }
}

/// Produces the authentication methods for one login.
#[derive(Debug, Clone)]
pub struct CredentialResolver<C = UnixAgentConnector> {
    agent_socket: Option<PathBuf>,
    fallback_key: PathBuf,
    connector: C,
}

impl CredentialResolver<UnixAgentConnector> {
    pub fn new(agent_socket: Option<PathBuf>, fallback_key: impl Into<PathBuf>) -> Self {
        Self::with_connector(agent_socket, fallback_key, UnixAgentConnector)
    }
}

impl<C: AgentConnector> CredentialResolver<C> {
    pub fn with_connector(
        agent_socket: Option<PathBuf>,
        fallback_key: impl Into<PathBuf>,
        connector: C,
    ) -> Self {
        Self {
            agent_socket,
            fallback_key: fallback_key.into(),
            connector,
        }
    }

    /// Resolve the authentication methods to offer.
    ///
    /// The agent is tried once; only a failed connection falls back to the key
    /// file, which is also read once. An agent that answers but cannot list
    /// identities, or lists none, is an error.
    pub async fn resolve(&self) -> Result<NonEmpty<AuthMethod<C::Agent>>> {
        let agent = match &self.agent_socket {
            Some(socket) => match self.connector.connect(socket).await {
                Ok(agent) => Some(agent),
                Err(e) => {
                    tracing::warn!(
                        "Error connecting to SSH agent at {}: {}; falling back to key",
                        socket.display(),
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("SSH agent socket not set; falling back to key");
                None
            }
        };

        let method = match agent {
            Some(agent) => self.agent_method(agent).await?,
            None => self.key_file_method()?,
        };

        Ok(NonEmpty::new(method))
    }

    async fn agent_method(&self, mut agent: C::Agent) -> Result<AuthMethod<C::Agent>> {
        let keys = self
            .connector
            .identities(&mut agent)
            .await
            .map_err(|e| Error::Agent(format!("failed to list agent keys: {}", e)))?;

        let identities = NonEmpty::from_vec(keys)
            .ok_or_else(|| Error::Agent("no keys in SSH agent".to_string()))?;

        tracing::debug!("Using {} identities from SSH agent", identities.len());
        Ok(AuthMethod::Agent { agent, identities })
    }

    fn key_file_method(&self) -> Result<AuthMethod<C::Agent>> {
        let key = load_secret_key(&self.fallback_key, None).map_err(|e| Error::KeyLoadFailed {
            path: self.fallback_key.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Using key file {}", self.fallback_key.display());
        Ok(AuthMethod::KeyFile {
            path: self.fallback_key.clone(),
            key: Arc::new(key),
        })
    }
}
