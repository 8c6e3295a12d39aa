// ABOUTME: Interactive shell negotiation using the type state pattern.
// ABOUTME: Exports state markers, the Shell wrapper and the exit outcome.

mod proxy;
mod state;
mod transitions;

pub use proxy::ExitStatus;
pub use state::{EnvSet, PtyRequested, SessionOpen, ShellStarted, StreamsAttached};

/// A session channel moving through shell negotiation, parameterized by its
/// current state.
///
/// The channel is borrowed: whoever opened it stays responsible for closing
/// it, whatever state the negotiation stopped in.
#[derive(Debug)]
pub struct Shell<'c, C, S> {
    channel: &'c mut C,
    state: S,
}

impl<'c, C> Shell<'c, C, SessionOpen> {
    pub fn new(channel: &'c mut C) -> Self {
        Shell {
            channel,
            state: SessionOpen,
        }
    }
}
