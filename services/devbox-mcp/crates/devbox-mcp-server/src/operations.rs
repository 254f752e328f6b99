//! Operation facade — `launch`, `status` and `terminate`.
//!
//! Each operation acquires its own backend handle, runs against the ports,
//! and maps every failure to a single [`OperationError`] at one boundary.

use anyhow::{Context, Result};
use devbox_common::{LaunchOutcome, LaunchRequest, StatusReport, TerminateReport};

use crate::error::OperationError;
use crate::ports::{BackendFactory, Provisioner, ResourceDirectory};
use crate::resolver::resolve;

/// The three devbox operations over a backend factory.
pub struct DevboxOperations<F> {
    factory: F,
}

impl<F: BackendFactory> DevboxOperations<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Launch or reuse the devbox for `request.project`.
    ///
    /// The provisioner never prints: `emit_output` is always cleared.
    pub async fn launch(&self, request: LaunchRequest) -> Result<LaunchOutcome, OperationError> {
        let request = LaunchRequest {
            emit_output: false,
            ..request
        };
        tracing::info!(project = %request.project, "devbox_launch");
        self.try_launch(&request)
            .await
            .map_err(|e| fail("devbox_launch", OperationError::Launch, &e))
    }

    /// Instances, volumes and snapshots, optionally filtered by project.
    pub async fn status(&self, project: Option<&str>) -> Result<StatusReport, OperationError> {
        tracing::info!(project = ?project, "devbox_status");
        self.try_status(project)
            .await
            .map_err(|e| fail("devbox_status", OperationError::Status, &e))
    }

    /// Terminate by project name or instance id.
    ///
    /// The identifier is resolved for the response only; the terminate call
    /// always receives the raw identifier.
    pub async fn terminate(&self, identifier: &str) -> Result<TerminateReport, OperationError> {
        tracing::info!(identifier, "devbox_terminate");
        self.try_terminate(identifier)
            .await
            .map_err(|e| fail("devbox_terminate", OperationError::Terminate, &e))
    }

    async fn try_launch(&self, request: &LaunchRequest) -> Result<LaunchOutcome> {
        let backend = self.connect()?;
        backend.launch(request).await
    }

    async fn try_status(&self, project: Option<&str>) -> Result<StatusReport> {
        let backend = self.connect()?;
        let (instances, volumes, snapshots) = tokio::try_join!(
            backend.list_instances(project),
            backend.list_volumes(project),
            backend.list_snapshots(project),
        )?;
        Ok(StatusReport {
            instances,
            volumes,
            snapshots,
        })
    }

    async fn try_terminate(&self, identifier: &str) -> Result<TerminateReport> {
        let backend = self.connect()?;
        let (instance_id, project) = resolve(&backend, identifier).await?.into_pair();
        let (success, message) = backend.terminate_instance(identifier).await?;

        tracing::info!(
            identifier,
            success,
            instance_id = ?instance_id,
            project = ?project,
            "terminate finished",
        );
        Ok(TerminateReport {
            success,
            message,
            project,
            instance_id,
        })
    }

    fn connect(&self) -> Result<F::Backend> {
        self.factory
            .connect()
            .context("failed to create compute provider client")
    }
}

/// Log the full error chain and wrap it in the operation's failure variant.
fn fail(
    operation: &str,
    variant: fn(String) -> OperationError,
    error: &anyhow::Error,
) -> OperationError {
    tracing::error!(operation, error = ?error, "{operation} failed");
    variant(format!("{error:#}"))
}
