use anyhow::Result;
use devbox_common::params::is_instance_id;
use devbox_common::{InstanceRecord, PROJECT_TAG, SnapshotRecord, VolumeRecord};
use serde_json::{Value, json};

use super::shapes::{DescribeInstancesResponse, DescribeSnapshotsResponse, DescribeVolumesResponse};
use super::{AwsCliBackend, AwsCliError};
use crate::ports::{CommandRunner, ResourceDirectory};

/// Instance states still worth reporting; terminated instances linger for an hour.
const LIVE_STATES: &[&str] = &["pending", "running", "stopping", "stopped"];

/// Error codes meaning "no such instance" rather than a provider failure.
const INSTANCE_NOT_FOUND_CODES: &[&str] =
    &["InvalidInstanceID.NotFound", "InvalidInstanceID.Malformed"];

/// `--filters` JSON selecting devbox resources: the given project, or any
/// resource carrying a project tag.
fn project_filters(project: Option<&str>) -> Vec<Value> {
    match project {
        Some(p) => vec![json!({"Name": format!("tag:{PROJECT_TAG}"), "Values": [p]})],
        None => vec![json!({"Name": "tag-key", "Values": [PROJECT_TAG]})],
    }
}

impl<R: CommandRunner> ResourceDirectory for AwsCliBackend<R> {
    async fn list_instances(&self, project: Option<&str>) -> Result<Vec<InstanceRecord>> {
        let mut filters = project_filters(project);
        filters.push(json!({"Name": "instance-state-name", "Values": LIVE_STATES}));
        let filters = Value::Array(filters).to_string();

        let resp: DescribeInstancesResponse = self
            .call(&["ec2", "describe-instances", "--filters", &filters])
            .await?;
        Ok(resp.into_records())
    }

    async fn list_volumes(&self, project: Option<&str>) -> Result<Vec<VolumeRecord>> {
        let filters = Value::Array(project_filters(project)).to_string();
        let resp: DescribeVolumesResponse = self
            .call(&["ec2", "describe-volumes", "--filters", &filters])
            .await?;
        Ok(resp.volumes.into_iter().map(VolumeRecord::from).collect())
    }

    async fn list_snapshots(&self, project: Option<&str>) -> Result<Vec<SnapshotRecord>> {
        let filters = Value::Array(project_filters(project)).to_string();
        let resp: DescribeSnapshotsResponse = self
            .call(&[
                "ec2",
                "describe-snapshots",
                "--owner-ids",
                "self",
                "--filters",
                &filters,
            ])
            .await?;
        Ok(resp.snapshots.into_iter().map(SnapshotRecord::from).collect())
    }

    async fn describe_instance_by_id(&self, instance_id: &str) -> Result<Option<InstanceRecord>> {
        // Anything else never reaches argv.
        if !is_instance_id(instance_id) {
            tracing::debug!(instance_id, "not an instance id; skipping lookup");
            return Ok(None);
        }

        let result: Result<DescribeInstancesResponse> = self
            .call(&["ec2", "describe-instances", "--instance-ids", instance_id])
            .await;

        match result {
            Ok(resp) => Ok(resp.into_records().into_iter().next()),
            Err(e)
                if e.downcast_ref::<AwsCliError>()
                    .is_some_and(|cli| cli.has_code(INSTANCE_NOT_FOUND_CODES)) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
