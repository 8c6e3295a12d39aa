// ABOUTME: Transport implementation over russh.
// ABOUTME: Handles connection, authentication, and the shell channel wire requests.

use super::config::{HostVerification, SessionConfig};
use super::credentials::AuthMethod;
use super::error::TransportError;
use super::pty::PtyRequest;
use super::transport::{ChannelEvent, Connection, ShellChannel, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect, Preferred};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;

/// Extended data type code for stderr.
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host_verification: HostVerification,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match &self.host_verification {
            HostVerification::AcceptAny => Ok(true),
            HostVerification::FixedKey(expected) => {
                let matches = expected.key_data() == server_public_key.key_data();
                if !matches {
                    tracing::warn!("Host key does not match the pinned key");
                }
                Ok(matches)
            }
        }
    }
}

/// Dials real SSH servers over TCP.
#[derive(Clone)]
pub struct RusshTransport {
    config: Arc<Config>,
}

impl std::fmt::Debug for RusshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshTransport")
            .field("config", &"<russh::client::Config>")
            .finish()
    }
}

/// Host key algorithms offered to the server, most preferred first.
fn host_key_algorithms() -> Vec<ssh_key::Algorithm> {
    use ssh_key::{Algorithm, EcdsaCurve, HashAlg};
    vec![
        Algorithm::Rsa {
            hash: Some(HashAlg::Sha512),
        },
        Algorithm::Rsa {
            hash: Some(HashAlg::Sha256),
        },
        Algorithm::Rsa { hash: None },
        Algorithm::Ecdsa {
            curve: EcdsaCurve::NistP256,
        },
        Algorithm::Ecdsa {
            curve: EcdsaCurve::NistP384,
        },
        Algorithm::Ecdsa {
            curve: EcdsaCurve::NistP521,
        },
        Algorithm::Ed25519,
    ]
}

impl Default for RusshTransport {
    fn default() -> Self {
        let preferred = Preferred {
            key: Cow::Owned(host_key_algorithms()),
            ..Default::default()
        };
        let config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(30)),
            preferred,
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Agent = AgentClient<UnixStream>;
    type Connection = RusshConnection;

    async fn dial(
        &self,
        config: SessionConfig<Self::Agent>,
    ) -> Result<RusshConnection, TransportError> {
        let handler = SshHandler {
            host_verification: config.host_verification.clone(),
        };

        let connect = client::connect(
            Arc::clone(&self.config),
            (config.host.as_str(), config.port),
            handler,
        );
        let mut handle = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| TransportError::Timeout(config.connect_timeout))??;

        match authenticate(&mut handle, &config.user, config.credentials).await {
            Ok(true) => Ok(RusshConnection { handle }),
            Ok(false) => {
                release(&handle).await;
                Err(TransportError::AuthenticationFailed)
            }
            Err(e) => {
                release(&handle).await;
                Err(e)
            }
        }
    }
}

/// Offer each method in order until one is accepted.
async fn authenticate(
    handle: &mut Handle<SshHandler>,
    user: &str,
    credentials: nonempty::NonEmpty<AuthMethod<AgentClient<UnixStream>>>,
) -> Result<bool, TransportError> {
    for method in credentials {
        match method {
            AuthMethod::Agent {
                mut agent,
                identities,
            } => {
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                for key in identities {
                    tracing::debug!("Trying SSH agent identity: {:?}", key.comment());
                    match handle
                        .authenticate_publickey_with(user, key, hash_alg, &mut agent)
                        .await
                    {
                        Ok(result) if result.success() => return Ok(true),
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::debug!("Agent authentication error: {:?}, trying next", e);
                            continue;
                        }
                    }
                }
            }
            AuthMethod::KeyFile { path, key } => {
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                tracing::debug!("Trying key file {}", path.display());
                let result = handle
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await?;
                if result.success() {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

async fn release(handle: &Handle<SshHandler>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "en")
        .await
    {
        tracing::debug!("Disconnect after failed authentication: {}", e);
    }
}

/// An authenticated russh connection.
pub struct RusshConnection {
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for RusshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshConnection")
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Connection for RusshConnection {
    type Channel = RusshChannel;

    async fn open_session(&mut self) -> Result<RusshChannel, TransportError> {
        let channel = self.handle.channel_open_session().await?;
        Ok(RusshChannel {
            channel,
            pending: VecDeque::new(),
        })
    }

    async fn close(self) -> Result<(), TransportError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// A russh session channel.
pub struct RusshChannel {
    channel: Channel<Msg>,
    /// Events that arrived while waiting for a request reply.
    pending: VecDeque<ChannelEvent>,
}

impl std::fmt::Debug for RusshChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshChannel")
            .field("id", &self.channel.id())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl RusshChannel {
    /// Wait for the Success/Failure reply to a request.
    async fn reply(&mut self, request: &'static str) -> Result<(), TransportError> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Success) => return Ok(()),
                Some(ChannelMsg::Failure) => return Err(TransportError::Rejected(request)),
                Some(msg) => {
                    if let Some(event) = translate(msg) {
                        self.pending.push_back(event);
                    }
                }
                None => return Err(TransportError::ChannelClosed),
            }
        }
    }
}

#[async_trait]
impl ShellChannel for RusshChannel {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), TransportError> {
        self.channel
            .request_pty(
                true,
                &request.term,
                request.columns,
                request.rows,
                0, // pixel width (0 means undefined)
                0, // pixel height (0 means undefined)
                &request.modes,
            )
            .await?;
        self.reply("pty-req").await
    }

    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.channel.set_env(true, name, value).await?;
        self.reply("env").await
    }

    async fn request_shell(&mut self) -> Result<(), TransportError> {
        self.channel.request_shell(true).await?;
        self.reply("shell").await
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.channel.data(data).await?;
        Ok(())
    }

    async fn send_eof(&mut self) -> Result<(), TransportError> {
        self.channel.eof().await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        loop {
            let msg = self.channel.wait().await?;
            if let Some(event) = translate(msg) {
                return Some(event);
            }
        }
    }

    async fn close(self) -> Result<(), TransportError> {
        self.channel.close().await?;
        Ok(())
    }
}

/// Map a russh channel message to a shell event. Window adjustments and
/// request replies carry nothing for the proxy.
fn translate(msg: ChannelMsg) -> Option<ChannelEvent> {
    match msg {
        ChannelMsg::Data { data } => Some(ChannelEvent::Stdout(Bytes::copy_from_slice(&data))),
        ChannelMsg::ExtendedData { data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
            Some(ChannelEvent::Stderr(Bytes::copy_from_slice(&data)))
        }
        ChannelMsg::Eof => Some(ChannelEvent::Eof),
        ChannelMsg::ExitStatus { exit_status } => Some(ChannelEvent::ExitStatus(exit_status)),
        ChannelMsg::ExitSignal {
            signal_name,
            core_dumped,
            error_message,
            ..
        } => Some(ChannelEvent::ExitSignal {
            name: format!("{:?}", signal_name),
            core_dumped,
            message: error_message,
        }),
        ChannelMsg::Close => Some(ChannelEvent::Closed),
        _ => None,
    }
}
