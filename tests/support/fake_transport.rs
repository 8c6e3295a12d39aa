// ABOUTME: Scripted in-memory transport for runner tests.
// ABOUTME: Records every call and tracks how many handles are still open.

use super::fake_agent::FakeAgent;
use async_trait::async_trait;
use parking_lot::Mutex;
use remsh::ssh::{
    ChannelEvent, Connection, CredentialSource, PtyRequest, SessionConfig, ShellChannel,
    Transport, TransportError,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// A call made against the fake transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Dial {
        addr: String,
        user: String,
        sources: Vec<CredentialSource>,
    },
    OpenSession,
    RequestPty(PtyRequest),
    SetEnv { name: String, value: String },
    RequestShell,
    Send(Vec<u8>),
    SendEof,
    CloseChannel,
    CloseConnection,
}

#[derive(Default)]
struct Log {
    calls: Vec<Call>,
    live_connections: i32,
    live_channels: i32,
}

/// Shared record of calls and live handles.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Log>>);

impl Recorder {
    fn push(&self, call: Call) {
        self.0.lock().calls.push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().calls.clone()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.0.lock().calls.iter().filter(|c| *c == wanted).count()
    }

    pub fn dials(&self) -> usize {
        self.0
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Dial { .. }))
            .count()
    }

    /// Connections dialed successfully and not yet closed.
    pub fn live_connections(&self) -> i32 {
        self.0.lock().live_connections
    }

    /// Channels opened successfully and not yet closed.
    pub fn live_channels(&self) -> i32 {
        self.0.lock().live_channels
    }

    pub fn sent_input(&self) -> Vec<u8> {
        self.0
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Send(data) => Some(data.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// What the fake remote host does.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub fail_dial: bool,
    /// Dial never completes.
    pub hang_dial: bool,
    pub fail_session: bool,
    pub fail_pty: bool,
    /// The pty request never gets a reply.
    pub hang_pty: bool,
    pub fail_env: bool,
    pub fail_shell: bool,
    /// Remote events, delivered in order after the shell starts.
    pub events: Vec<ChannelEvent>,
    /// Withhold remote events until local input reaches EOF.
    pub hold_events_until_eof: bool,
}

impl Script {
    /// A shell that prints nothing and exits with `code`.
    pub fn exits_with(code: u32) -> Self {
        Self {
            events: vec![
                ChannelEvent::ExitStatus(code),
                ChannelEvent::Eof,
                ChannelEvent::Closed,
            ],
            ..Self::default()
        }
    }
}

pub struct FakeTransport {
    script: Script,
    recorder: Recorder,
}

impl FakeTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            recorder: Recorder::default(),
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    type Agent = FakeAgent;
    type Connection = FakeConnection;

    async fn dial(
        &self,
        config: SessionConfig<FakeAgent>,
    ) -> Result<FakeConnection, TransportError> {
        self.recorder.push(Call::Dial {
            addr: config.addr(),
            user: config.user.clone(),
            sources: config.credentials.iter().map(|m| m.source()).collect(),
        });
        if self.script.hang_dial {
            std::future::pending::<()>().await;
        }
        if self.script.fail_dial {
            return Err(TransportError::AuthenticationFailed);
        }
        self.recorder.0.lock().live_connections += 1;
        Ok(FakeConnection {
            script: self.script.clone(),
            recorder: self.recorder.clone(),
        })
    }
}

pub struct FakeConnection {
    script: Script,
    recorder: Recorder,
}

#[async_trait]
impl Connection for FakeConnection {
    type Channel = FakeChannel;

    async fn open_session(&mut self) -> Result<FakeChannel, TransportError> {
        self.recorder.push(Call::OpenSession);
        if self.script.fail_session {
            return Err(TransportError::Rejected("session"));
        }
        self.recorder.0.lock().live_channels += 1;
        Ok(FakeChannel {
            events: self.script.events.clone().into(),
            script: self.script.clone(),
            recorder: self.recorder.clone(),
            eof_received: false,
        })
    }

    async fn close(self) -> Result<(), TransportError> {
        self.recorder.push(Call::CloseConnection);
        self.recorder.0.lock().live_connections -= 1;
        Ok(())
    }
}

pub struct FakeChannel {
    script: Script,
    recorder: Recorder,
    events: VecDeque<ChannelEvent>,
    eof_received: bool,
}

#[async_trait]
impl ShellChannel for FakeChannel {
    async fn request_pty(&mut self, request: &PtyRequest) -> Result<(), TransportError> {
        self.recorder.push(Call::RequestPty(request.clone()));
        if self.script.hang_pty {
            std::future::pending::<()>().await;
        }
        if self.script.fail_pty {
            return Err(TransportError::Rejected("pty-req"));
        }
        Ok(())
    }

    async fn set_env(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.recorder.push(Call::SetEnv {
            name: name.to_string(),
            value: value.to_string(),
        });
        if self.script.fail_env {
            return Err(TransportError::Rejected("env"));
        }
        Ok(())
    }

    async fn request_shell(&mut self) -> Result<(), TransportError> {
        self.recorder.push(Call::RequestShell);
        if self.script.fail_shell {
            return Err(TransportError::Rejected("shell"));
        }
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.recorder.push(Call::Send(data.to_vec()));
        Ok(())
    }

    async fn send_eof(&mut self) -> Result<(), TransportError> {
        self.recorder.push(Call::SendEof);
        self.eof_received = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        if self.script.hold_events_until_eof && !self.eof_received {
            std::future::pending::<()>().await;
        }
        self.events.pop_front()
    }

    async fn close(self) -> Result<(), TransportError> {
        self.recorder.push(Call::CloseChannel);
        self.recorder.0.lock().live_channels -= 1;
        Ok(())
    }
}
