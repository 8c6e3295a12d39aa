// ABOUTME: Shell command implementation.
// ABOUTME: Opens the interactive session and maps its outcome to an exit code.

use remsh::config::Settings;
use remsh::error::Result;
use remsh::output::Output;
use remsh::ssh::{self, ExitStatus, InteractiveSessionRunner};
use tokio_util::sync::CancellationToken;

/// Exit code used when the remote shell was killed by a signal.
const SIGNAL_EXIT_CODE: i32 = 255;

/// Connect to `host` and proxy this terminal until the remote shell exits.
pub async fn shell(host: &str, output: &Output) -> Result<ExitStatus> {
    let settings = Settings::from_env()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupt received, closing session");
            on_interrupt.cancel();
        }
    });

    let runner = InteractiveSessionRunner::new(settings.key_env.clone()).cancellation(cancel);
    let config = ssh::terminal_config(host, &settings, &runner).await?;

    output.progress(&format!("Connecting to {host}"));
    let status = ssh::interactive_shell(&runner, config).await?;
    output.exited(&status);

    Ok(status)
}

/// Process exit code for a remote outcome.
pub fn exit_code(status: &ExitStatus) -> i32 {
    match status {
        ExitStatus::Code(code) => i32::try_from(*code).unwrap_or(SIGNAL_EXIT_CODE),
        ExitStatus::Signal { .. } => SIGNAL_EXIT_CODE,
    }
}
