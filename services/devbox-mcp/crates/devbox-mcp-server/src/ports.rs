//! Port trait definitions between the devbox operations and the provider.
//!
//! Ports are the interfaces (contracts) that a compute backend must fulfill.
//! The resolver and the operation facade depend only on these traits, never
//! on a concrete backend. Returned futures are `Send`; implementors may still
//! write `async fn`.

use std::future::Future;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use devbox_common::{InstanceRecord, LaunchOutcome, LaunchRequest, SnapshotRecord, VolumeRecord};

// ── Directory Port ────────────────────────────────────────────────────────────

/// Read-only queries over provider-managed devbox resources.
///
/// Every listing preserves the provider's native ordering.
pub trait ResourceDirectory: Send + Sync {
    /// List instances, optionally restricted to those tagged with `project`.
    fn list_instances(
        &self,
        project: Option<&str>,
    ) -> impl Future<Output = Result<Vec<InstanceRecord>>> + Send;
    /// List volumes, optionally restricted to those tagged with `project`.
    fn list_volumes(
        &self,
        project: Option<&str>,
    ) -> impl Future<Output = Result<Vec<VolumeRecord>>> + Send;
    /// List snapshots, optionally restricted to those tagged with `project`.
    fn list_snapshots(
        &self,
        project: Option<&str>,
    ) -> impl Future<Output = Result<Vec<SnapshotRecord>>> + Send;
    /// Look up a single instance by provider id.
    ///
    /// Returns `Ok(None)` when the id is malformed or the provider reports it
    /// as unknown.
    fn describe_instance_by_id(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<Option<InstanceRecord>>> + Send;
}

// ── Provisioning Port ─────────────────────────────────────────────────────────

/// Instance lifecycle operations owned by the provisioning collaborator.
pub trait Provisioner: Send + Sync {
    /// Launch (or reuse) the devbox for `request.project`.
    fn launch(
        &self,
        request: &LaunchRequest,
    ) -> impl Future<Output = Result<LaunchOutcome>> + Send;
    /// Terminate the instance named by `identifier` (project name or instance id).
    ///
    /// Resolution of `identifier` happens inside the implementation. An
    /// identifier that cannot be acted on is reported as `(false, reason)`,
    /// not as an error.
    fn terminate_instance(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<(bool, String)>> + Send;
}

/// Composite trait — any type implementing both ports is a `DevboxBackend`.
pub trait DevboxBackend: ResourceDirectory + Provisioner {}

/// Blanket implementation: any type implementing both ports is a `DevboxBackend`.
impl<T> DevboxBackend for T where T: ResourceDirectory + Provisioner {}

/// Produces a short-lived backend handle for a single request.
///
/// The handle is dropped when the request finishes, on success and on error.
pub trait BackendFactory: Send + Sync + 'static {
    type Backend: DevboxBackend + 'static;

    /// Acquire a backend handle for one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be constructed.
    fn connect(&self) -> Result<Self::Backend>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so the CLI backend can be swapped or mocked.
pub trait CommandRunner: Send + Sync {
    /// Run a program and capture its output using the runner's default timeout.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<Output>> + Send;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<Output>> + Send;
}
