//! Process execution for the AWS CLI backend.
//!
//! Every `aws` call goes through [`TokioCommandRunner`]. Ordinary calls use
//! the per-call timeout (`DEVBOX_COMMAND_TIMEOUT_SECS`); the launch path's
//! `ec2 wait instance-running` passes the longer launch timeout
//! (`DEVBOX_LAUNCH_TIMEOUT_SECS`) through `run_with_timeout`.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::ports::CommandRunner;

/// Runs the AWS CLI with piped output and no stdin, so a credential or MFA
/// prompt fails fast instead of hanging the server. A call that outlives its
/// timeout has its child killed before the error is returned.
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    /// `timeout` applies to every [`CommandRunner::run`] call.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Read a child pipe to the end; a missing or broken pipe yields what was read.
async fn drain<P: AsyncRead + Unpin>(pipe: Option<P>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        tokio::select! {
            (status, stdout, stderr) = async { tokio::join!(child.wait(), stdout, stderr) } => {
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            }
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}
