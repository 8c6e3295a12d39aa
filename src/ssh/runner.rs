// ABOUTME: Drives one interactive remote shell from dial to exit.
// ABOUTME: Releases the channel and connection exactly once on every exit path.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use super::client::RusshTransport;
use super::config::SessionConfig;
use super::credentials::{AgentConnector, CredentialResolver};
use super::error::{Error, Result};
use super::key_env::KeyEnv;
use super::pty::PtyRequest;
use super::shell::{ExitStatus, Shell};
use super::streams::{LocalStreams, Stdio};
use super::transport::{Connection, ShellChannel, Transport};
use crate::config::Settings;

/// Runs interactive shells with a fixed pty request and key export.
#[derive(Debug, Clone)]
pub struct InteractiveSessionRunner {
    pty: PtyRequest,
    key_env: KeyEnv,
    cancel: CancellationToken,
}

impl InteractiveSessionRunner {
    pub fn new(key_env: KeyEnv) -> Self {
        Self {
            pty: PtyRequest::default(),
            key_env,
            cancel: CancellationToken::new(),
        }
    }

    pub fn pty(mut self, pty: PtyRequest) -> Self {
        self.pty = pty;
        self
    }

    /// Use `token` to abort a session at any point, from credential
    /// resolution to the final wait. Whatever was already opened is still
    /// released.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Dial, open a session, negotiate the shell and proxy `streams` until
    /// the remote shell exits.
    pub async fn run<T, I, O, E>(
        &self,
        transport: &T,
        config: SessionConfig<T::Agent>,
        streams: LocalStreams<I, O, E>,
    ) -> Result<ExitStatus>
    where
        T: Transport,
        I: AsyncRead + Unpin + Send,
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let addr = config.addr();
        tracing::debug!("Dialing {} as {}", addr, config.user);

        let dial = async {
            transport.dial(config).await.map_err(|source| Error::Dial {
                addr: addr.clone(),
                source,
            })
        };
        let mut connection = self.cancellable(dial).await?;
        tracing::info!("Connected to {}", addr);

        let outcome = self.on_connection(&mut connection, streams).await;

        if let Err(e) = connection.close().await {
            tracing::warn!("SSH disconnect failed for {}: {}", addr, e);
        }
        tracing::debug!("Connection to {} closed", addr);

        outcome
    }

    async fn on_connection<N, I, O, E>(
        &self,
        connection: &mut N,
        streams: LocalStreams<I, O, E>,
    ) -> Result<ExitStatus>
    where
        N: Connection,
        I: AsyncRead + Unpin + Send,
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let open = async { connection.open_session().await.map_err(Error::Session) };
        let mut channel = self.cancellable(open).await?;
        tracing::debug!("Session channel open");

        let outcome = self.on_channel(&mut channel, streams).await;

        if let Err(e) = channel.close().await {
            tracing::debug!("Failed to close session channel: {}", e);
        }

        outcome
    }

    async fn on_channel<C, I, O, E>(
        &self,
        channel: &mut C,
        streams: LocalStreams<I, O, E>,
    ) -> Result<ExitStatus>
    where
        C: ShellChannel,
        I: AsyncRead + Unpin + Send,
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let negotiate = async {
            Shell::new(channel)
                .request_pty(&self.pty)
                .await?
                .attach(streams)
                .set_env(&self.key_env)
                .await?
                .start()
                .await
        };
        let status = self.cancellable(negotiate).await?.wait(&self.cancel).await?;

        tracing::info!("Remote shell finished with {}", status);
        Ok(status)
    }

    /// Resolve credentials for `host`, giving up if the session is
    /// cancelled first.
    pub async fn assemble<C: AgentConnector>(
        &self,
        host: &str,
        resolver: &CredentialResolver<C>,
    ) -> Result<SessionConfig<C::Agent>> {
        let resolve = SessionConfig::<C::Agent>::assemble(host, resolver);
        self.cancellable(resolve).await
    }

    /// Run `step` unless the cancellation token fires first. Dropping the
    /// step abandons any reply it was waiting for.
    async fn cancellable<F, T>(&self, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                tracing::debug!("Session cancelled during setup");
                Err(Error::Cancelled)
            }
            result = step => result,
        }
    }
}

/// Resolve credentials, then run one interactive shell against `host`.
///
/// Credential resolution happens before any network I/O; if it fails the
/// transport is never dialed.
pub async fn connect_and_run<T, C, I, O, E>(
    transport: &T,
    resolver: &CredentialResolver<C>,
    runner: &InteractiveSessionRunner,
    host: &str,
    streams: LocalStreams<I, O, E>,
) -> Result<ExitStatus>
where
    T: Transport,
    C: AgentConnector<Agent = T::Agent>,
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    let config = runner.assemble(host, resolver).await?;
    runner.run(transport, config, streams).await
}

/// Resolve credentials for `host` with the user, port and timeout fixed by
/// `settings`. Any host key is accepted.
pub async fn terminal_config(
    host: &str,
    settings: &Settings,
    runner: &InteractiveSessionRunner,
) -> Result<SessionConfig<<RusshTransport as Transport>::Agent>> {
    let resolver = CredentialResolver::new(
        settings.agent_socket.clone(),
        settings.fallback_key.clone(),
    );
    Ok(runner
        .assemble(host, &resolver)
        .await?
        .user(&settings.user)
        .port(settings.port)
        .connect_timeout(settings.connect_timeout))
}

/// Open the interactive shell over the process's own terminal.
pub async fn interactive_shell(
    runner: &InteractiveSessionRunner,
    config: SessionConfig<<RusshTransport as Transport>::Agent>,
) -> Result<ExitStatus> {
    runner
        .run(&RusshTransport::default(), config, Stdio::stdio())
        .await
}
