// ABOUTME: Parameters for dialing one interactive session.
// ABOUTME: User, address, credentials, host-key policy and connect timeout.

use super::credentials::{AgentConnector, AuthMethod, CredentialResolver};
use super::error::{Error, Result};
use crate::config::{DEFAULT_PORT, DEFAULT_USER};
use nonempty::NonEmpty;
use russh::keys::ssh_key;
use std::fmt;
use std::time::Duration;

/// Connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// How the remote host's identity is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostVerification {
    /// Accept any presented host key. Insecure; for non-production use.
    AcceptAny,
    /// Accept only this key.
    FixedKey(ssh_key::PublicKey),
}

/// Everything needed to dial one session.
pub struct SessionConfig<A> {
    /// Username for authentication.
    pub user: String,
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Methods offered to the host, in order. Never empty.
    pub credentials: NonEmpty<AuthMethod<A>>,
    pub host_verification: HostVerification,
    pub connect_timeout: Duration,
}

impl<A> fmt::Debug for SessionConfig<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credentials", &self.credentials)
            .field("host_verification", &self.host_verification)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl<A> SessionConfig<A> {
    pub fn new(host: impl Into<String>, credentials: NonEmpty<AuthMethod<A>>) -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            host: host.into(),
            port: DEFAULT_PORT,
            credentials,
            host_verification: HostVerification::AcceptAny,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Build from a plain list, refusing to dial with zero methods.
    pub fn from_credentials(
        host: impl Into<String>,
        credentials: Vec<AuthMethod<A>>,
    ) -> Result<Self> {
        let credentials = NonEmpty::from_vec(credentials).ok_or(Error::NoCredentials)?;
        Ok(Self::new(host, credentials))
    }

    /// Resolve credentials and fill the fixed policy: default user, default
    /// port, any host key accepted. Fails before any network I/O if
    /// resolution fails.
    pub async fn assemble<C>(
        host: impl Into<String>,
        resolver: &CredentialResolver<C>,
    ) -> Result<Self>
    where
        C: AgentConnector<Agent = A>,
    {
        let credentials = resolver.resolve().await?;
        Ok(Self::new(host, credentials))
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host_verification(mut self, policy: HostVerification) -> Self {
        self.host_verification = policy;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `host:port` as dialed.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
