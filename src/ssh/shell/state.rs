// ABOUTME: Shell state marker types for the type state pattern.
// ABOUTME: Later states carry the attached local streams.

use crate::ssh::streams::LocalStreams;

/// Session channel open, nothing negotiated yet.
/// Available actions: `request_pty()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOpen;

/// Pseudo-terminal allocated.
/// Available actions: `attach()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PtyRequested;

/// Local streams bound to the channel.
/// Available actions: `set_env()`
#[derive(Debug)]
pub struct StreamsAttached<I, O, E> {
    pub(crate) streams: LocalStreams<I, O, E>,
}

/// Key environment variable accepted by the remote side.
/// Available actions: `start()`
#[derive(Debug)]
pub struct EnvSet<I, O, E> {
    pub(crate) streams: LocalStreams<I, O, E>,
}

/// Remote shell running.
/// Available actions: `wait()`
#[derive(Debug)]
pub struct ShellStarted<I, O, E> {
    pub(crate) streams: LocalStreams<I, O, E>,
}
