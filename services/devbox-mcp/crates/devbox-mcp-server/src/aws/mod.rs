//! AWS backend that drives EC2 and SSM through the `aws` CLI.
//!
//! `AwsCliBackend<R>` routes every call through a `CommandRunner`, so tests
//! inject canned CLI output without spawning processes. All calls request
//! `--output json` and are decoded by the shapes in [`shapes`].

mod directory;
mod provisioner;
pub mod shapes;

use std::time::Duration;

use anyhow::{Context, Result};
use devbox_common::ServerConfig;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::command_runner::TokioCommandRunner;
use crate::ports::{BackendFactory, CommandRunner};

/// A non-zero exit from the AWS CLI.
#[derive(Debug, Error)]
#[error("aws {command} failed: {message}")]
pub struct AwsCliError {
    /// `service operation`, e.g. `ec2 describe-instances`.
    pub command: String,
    /// Service error code such as `InvalidInstanceID.NotFound`, when present.
    pub code: Option<String>,
    pub message: String,
}

impl AwsCliError {
    fn from_stderr(command: String, stderr: &[u8]) -> Self {
        let message = String::from_utf8_lossy(stderr).trim().to_string();
        let code = error_code(&message).map(str::to_string);
        Self {
            command,
            code,
            message,
        }
    }

    pub fn has_code(&self, codes: &[&str]) -> bool {
        self.code.as_deref().is_some_and(|c| codes.contains(&c))
    }
}

/// Extract the service error code from CLI stderr:
/// `An error occurred (InvalidInstanceID.NotFound) when calling ...`.
fn error_code(stderr: &str) -> Option<&str> {
    let start = stderr.find("An error occurred (")? + "An error occurred (".len();
    let len = stderr[start..].find(')')?;
    Some(&stderr[start..start + len])
}

/// Settings shared by every call a backend handle makes.
#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub aws_bin: String,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub launch_timeout: Duration,
    pub default_instance_type: String,
    pub ssh_username: String,
}

impl From<&ServerConfig> for AwsSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            aws_bin: config.aws_bin.clone(),
            region: config.aws_region.clone(),
            profile: config.aws_profile.clone(),
            launch_timeout: Duration::from_secs(config.launch_timeout_secs),
            default_instance_type: config.default_instance_type.clone(),
            ssh_username: config.ssh_username.clone(),
        }
    }
}

/// Backend handle implementing both ports over the AWS CLI.
pub struct AwsCliBackend<R: CommandRunner> {
    runner: R,
    settings: AwsSettings,
}

impl<R: CommandRunner> AwsCliBackend<R> {
    pub fn new(runner: R, settings: AwsSettings) -> Self {
        Self { runner, settings }
    }

    fn full_args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 6);
        full.extend_from_slice(args);
        full.extend_from_slice(&["--output", "json"]);
        if let Some(region) = &self.settings.region {
            full.extend_from_slice(&["--region", region.as_str()]);
        }
        if let Some(profile) = &self.settings.profile {
            full.extend_from_slice(&["--profile", profile.as_str()]);
        }
        full
    }

    /// Run `aws <args>` and return stdout, or [`AwsCliError`] on non-zero exit.
    async fn call_raw(&self, args: &[&str], timeout: Option<Duration>) -> Result<Vec<u8>> {
        let full = self.full_args(args);
        let program = self.settings.aws_bin.as_str();
        let output = match timeout {
            Some(t) => self.runner.run_with_timeout(program, &full, t).await?,
            None => self.runner.run(program, &full).await?,
        };

        if !output.status.success() {
            let command = args.iter().take(2).copied().collect::<Vec<_>>().join(" ");
            return Err(AwsCliError::from_stderr(command, &output.stderr).into());
        }
        Ok(output.stdout)
    }

    /// Run `aws <args>` and decode its JSON response.
    async fn call<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = self.call_raw(args, None).await?;
        let what = args.iter().take(2).copied().collect::<Vec<_>>().join(" ");
        serde_json::from_slice(&stdout).with_context(|| format!("invalid JSON from aws {what}"))
    }
}

/// Creates one `AwsCliBackend` per request.
#[derive(Debug, Clone)]
pub struct AwsCliFactory {
    settings: AwsSettings,
    command_timeout: Duration,
}

impl AwsCliFactory {
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            settings: AwsSettings::from(config),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }
}

impl BackendFactory for AwsCliFactory {
    type Backend = AwsCliBackend<TokioCommandRunner>;

    fn connect(&self) -> Result<Self::Backend> {
        anyhow::ensure!(
            !self.settings.aws_bin.trim().is_empty(),
            "DEVBOX_AWS_BIN must not be empty"
        );
        Ok(AwsCliBackend::new(
            TokioCommandRunner::new(self.command_timeout),
            self.settings.clone(),
        ))
    }
}
