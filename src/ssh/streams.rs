// ABOUTME: Local standard streams bound to a remote shell.
// ABOUTME: Generic over async readers and writers so tests can supply buffers.

use tokio::io::{AsyncRead, AsyncWrite, Stderr, Stdin, Stdout};

/// The caller's side of the terminal proxy.
#[derive(Debug)]
pub struct LocalStreams<I, O, E> {
    pub stdin: I,
    pub stdout: O,
    pub stderr: E,
}

impl<I, O, E> LocalStreams<I, O, E>
where
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    pub fn new(stdin: I, stdout: O, stderr: E) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }
}

/// The process's own standard streams.
pub type Stdio = LocalStreams<Stdin, Stdout, Stderr>;

impl Stdio {
    pub fn stdio() -> Self {
        LocalStreams::new(tokio::io::stdin(), tokio::io::stdout(), tokio::io::stderr())
    }
}
