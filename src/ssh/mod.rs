// ABOUTME: SSH client module for interactive remote shells.
// ABOUTME: Credential resolution, session config, transport seam and shell runner.

mod client;
mod config;
mod credentials;
mod error;
mod key_env;
mod pty;
mod runner;
pub mod shell;
mod streams;
mod transport;

pub use client::{RusshChannel, RusshConnection, RusshTransport};
pub use config::{DEFAULT_CONNECT_TIMEOUT, HostVerification, SessionConfig};
pub use credentials::{
    AgentConnector, AuthMethod, CredentialResolver, CredentialSource, UnixAgentConnector,
};
pub use error::{Error, ErrorKind, Result, TransportError};
pub use key_env::KeyEnv;
pub use pty::{PtyRequest, TerminalModes, terminal_modes};
pub use runner::{
    InteractiveSessionRunner, connect_and_run, interactive_shell, terminal_config,
};
pub use shell::{ExitStatus, Shell};
pub use streams::{LocalStreams, Stdio};
pub use transport::{ChannelEvent, Connection, ShellChannel, Transport};
