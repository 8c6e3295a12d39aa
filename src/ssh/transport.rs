// ABOUTME: Capability traits separating the session runner from the wire.
// ABOUTME: Transport dials, Connection opens channels, ShellChannel carries one shell.

use super::config::SessionConfig;
use super::error::TransportError;
use super::pty::PtyRequest;
use async_trait::async_trait;
use bytes::Bytes;

/// Dials and authenticates a secure-shell connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Agent handle carried by agent-backed credentials.
    type Agent: Send;
    type Connection: Connection;

    /// Connect to `config.host:config.port` and authenticate with the
    /// configured credentials, in order. The credentials are consumed.
    ///
    /// A connection that is established but fails authentication must be
    /// released before the error is returned.
    async fn dial(
        &self,
        config: SessionConfig<Self::Agent>,
    ) -> Result<Self::Connection, TransportError>;
}

/// An authenticated connection.
#[async_trait]
pub trait Connection: Send + Sized {
    type Channel: ShellChannel;

    /// Open a new "session" channel.
    async fn open_session(&mut self) -> Result<Self::Channel, TransportError>;

    /// Release the connection. Consumes the handle.
    async fn close(self) -> Result<(), TransportError>;
}

/// A session channel hosting one remote shell.
///
/// Every request waits for the remote reply; a failure reply is reported as
/// [`TransportError::Rejected`].
#[async_trait]
pub trait ShellChannel: Send + Sized {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), TransportError>;

    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    async fn request_shell(&mut self) -> Result<(), TransportError>;

    /// Forward bytes to the remote standard input.
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Signal end of the remote standard input.
    async fn send_eof(&mut self) -> Result<(), TransportError>;

    /// Next event from the remote side, or `None` once the channel is gone.
    ///
    /// Must be cancel-safe: it is raced against local input.
    async fn next_event(&mut self) -> Option<ChannelEvent>;

    /// Release the channel. Consumes the handle.
    async fn close(self) -> Result<(), TransportError>;
}

/// Remote-side activity on a shell channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Bytes),
    Stderr(Bytes),
    Eof,
    ExitStatus(u32),
    ExitSignal {
        name: String,
        core_dumped: bool,
        message: String,
    },
    Closed,
}
