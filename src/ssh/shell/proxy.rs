// ABOUTME: Full-duplex byte proxy between local streams and a shell channel.
// ABOUTME: Runs until the channel closes and reports the remote exit outcome.

use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::ssh::error::{Error, Result};
use crate::ssh::streams::LocalStreams;
use crate::ssh::transport::{ChannelEvent, ShellChannel};

const READ_BUFFER_SIZE: usize = 8192;

/// How the remote shell process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// The process exited with this status code.
    Code(u32),
    /// The process was terminated by a signal.
    Signal {
        name: String,
        core_dumped: bool,
        message: String,
    },
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            ExitStatus::Code(code) => Some(*code),
            ExitStatus::Signal { .. } => None,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Code(code) => write!(f, "exit status {code}"),
            ExitStatus::Signal {
                name, core_dumped, ..
            } => {
                write!(f, "killed by signal {name}")?;
                if *core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}

/// Forward local stdin to the channel and channel output to local
/// stdout/stderr until the channel closes.
///
/// Remote output is written in the order it arrives and flushed per chunk.
/// Local input is forwarded as read; end of input is signalled once.
pub(crate) async fn pump<C, I, O, E>(
    channel: &mut C,
    streams: &mut LocalStreams<I, O, E>,
    cancel: &CancellationToken,
) -> Result<ExitStatus>
where
    C: ShellChannel,
    I: AsyncRead + Unpin + Send,
    O: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut stdin_open = true;
    let mut exit: Option<ExitStatus> = None;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("Session cancelled while waiting for remote shell");
                return Err(Error::Cancelled);
            }

            event = channel.next_event() => {
                match event {
                    Some(ChannelEvent::Stdout(data)) => {
                        write_chunk(&mut streams.stdout, &data, "stdout").await?;
                    }
                    Some(ChannelEvent::Stderr(data)) => {
                        write_chunk(&mut streams.stderr, &data, "stderr").await?;
                    }
                    Some(ChannelEvent::ExitStatus(code)) => {
                        exit = Some(ExitStatus::Code(code));
                    }
                    Some(ChannelEvent::ExitSignal { name, core_dumped, message }) => {
                        exit = Some(ExitStatus::Signal { name, core_dumped, message });
                    }
                    Some(ChannelEvent::Eof) => {}
                    Some(ChannelEvent::Closed) | None => break,
                }
            }

            read = streams.stdin.read(&mut buf), if stdin_open => {
                match read {
                    Ok(0) => {
                        stdin_open = false;
                        if let Err(e) = channel.send_eof().await {
                            tracing::debug!("Failed to send EOF to remote shell: {}", e);
                        }
                    }
                    Ok(n) => {
                        if let Err(e) = channel.send(&buf[..n]).await {
                            tracing::debug!("Channel data error: {}", e);
                            stdin_open = false;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Local stdin read error: {}", e);
                        stdin_open = false;
                    }
                }
            }
        }
    }

    exit.ok_or_else(|| Error::Wait("channel closed without exit status".to_string()))
}

async fn write_chunk<W>(out: &mut W, data: &[u8], stream: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(data)
        .await
        .map_err(|e| Error::Wait(format!("failed to write to local {stream}: {e}")))?;
    out.flush()
        .await
        .map_err(|e| Error::Wait(format!("failed to flush local {stream}: {e}")))
}
