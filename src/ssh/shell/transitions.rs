// ABOUTME: State transition methods for shell negotiation.
// ABOUTME: Each method consumes self and returns the next state on success.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use super::Shell;
use super::proxy::{ExitStatus, pump};
use super::state::{EnvSet, PtyRequested, SessionOpen, ShellStarted, StreamsAttached};
use crate::ssh::error::{Error, Result};
use crate::ssh::key_env::KeyEnv;
use crate::ssh::pty::PtyRequest;
use crate::ssh::streams::LocalStreams;
use crate::ssh::transport::ShellChannel;

// =============================================================================
// SessionOpen -> PtyRequested
// =============================================================================

impl<'c, C: ShellChannel> Shell<'c, C, SessionOpen> {
    /// Request a pseudo-terminal.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pty` if the remote host rejects the request.
    pub async fn request_pty(self, request: &PtyRequest) -> Result<Shell<'c, C, PtyRequested>> {
        self.channel
            .request_pty(request)
            .await
            .map_err(Error::Pty)?;

        tracing::debug!(
            "Pseudo terminal allocated: {} {}x{}",
            request.term,
            request.columns,
            request.rows
        );
        Ok(Shell {
            channel: self.channel,
            state: PtyRequested,
        })
    }
}

// =============================================================================
// PtyRequested -> StreamsAttached
// =============================================================================

impl<'c, C: ShellChannel> Shell<'c, C, PtyRequested> {
    /// Bind local standard streams to the channel. Nothing is read or written
    /// until the shell is waited on, so early input stays queued in `stdin`.
    pub fn attach<I, O, E>(
        self,
        streams: LocalStreams<I, O, E>,
    ) -> Shell<'c, C, StreamsAttached<I, O, E>>
    where
        I: AsyncRead + Unpin + Send,
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        Shell {
            channel: self.channel,
            state: StreamsAttached { streams },
        }
    }
}

// =============================================================================
// StreamsAttached -> EnvSet
// =============================================================================

impl<'c, C, I, O, E> Shell<'c, C, StreamsAttached<I, O, E>>
where
    C: ShellChannel,
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    /// Export the encoded key file to the remote environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyEnvUnreadable` if the key file cannot be read, or
    /// `Error::Env` if the remote host rejects the request.
    pub async fn set_env(self, env: &KeyEnv) -> Result<Shell<'c, C, EnvSet<I, O, E>>> {
        let value = env.encode().await?;

        self.channel
            .set_env(env.name(), &value)
            .await
            .map_err(|source| Error::Env {
                name: env.name().to_string(),
                source,
            })?;

        tracing::debug!("Remote environment variable {} set", env.name());
        Ok(Shell {
            channel: self.channel,
            state: EnvSet {
                streams: self.state.streams,
            },
        })
    }
}

// =============================================================================
// EnvSet -> ShellStarted
// =============================================================================

impl<'c, C, I, O, E> Shell<'c, C, EnvSet<I, O, E>>
where
    C: ShellChannel,
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    /// Start the remote interactive shell.
    ///
    /// # Errors
    ///
    /// Returns `Error::Shell` if the remote host rejects the request.
    pub async fn start(self) -> Result<Shell<'c, C, ShellStarted<I, O, E>>> {
        self.channel.request_shell().await.map_err(Error::Shell)?;

        tracing::debug!("Remote shell started");
        Ok(Shell {
            channel: self.channel,
            state: ShellStarted {
                streams: self.state.streams,
            },
        })
    }
}

// =============================================================================
// ShellStarted -> exit
// =============================================================================

impl<'c, C, I, O, E> Shell<'c, C, ShellStarted<I, O, E>>
where
    C: ShellChannel,
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    /// Proxy the local streams until the remote shell exits.
    ///
    /// # Errors
    ///
    /// Returns `Error::Wait` if the channel ends without an exit status, or
    /// `Error::Cancelled` if `cancel` fires first.
    pub async fn wait(self, cancel: &CancellationToken) -> Result<ExitStatus> {
        let mut streams = self.state.streams;
        pump(self.channel, &mut streams, cancel).await
    }
}
