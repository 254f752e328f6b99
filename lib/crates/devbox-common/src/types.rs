use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default SSM parameter prefix for per-project bookkeeping.
pub const DEFAULT_PARAM_PREFIX: &str = "/devbox";

/// Normalized view of a provider compute instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceRecord {
    pub instance_id: String,
    /// Value of the project tag, if the instance carries one.
    pub project: Option<String>,
    /// Lifecycle state as reported by the provider (`running`, `stopped`, ...).
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_time: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Block storage volume tagged with a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeRecord {
    pub volume_id: String,
    pub project: Option<String>,
    pub size_gib: u32,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Instance the volume is currently attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_instance: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Volume snapshot tagged with a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub snapshot_id: String,
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    pub size_gib: u32,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Parameters handed to the provisioning collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Project name (alphanumeric and hyphens only).
    pub project: String,
    pub instance_type: Option<String>,
    pub key_pair: Option<String>,
    /// Minimum root volume size in GiB. `0` means no minimum.
    pub volume_size: u32,
    /// Base image for projects that have never been launched.
    pub base_ami: Option<String>,
    pub param_prefix: String,
    /// Whether the provisioner may print progress to stdout.
    pub emit_output: bool,
}

impl LaunchRequest {
    /// Request for `project` with every optional setting left at its default.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            instance_type: None,
            key_pair: None,
            volume_size: 0,
            base_ami: None,
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
            emit_output: true,
        }
    }
}

/// Result of a launch, as produced by the provisioning collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub project: String,
    pub instance_id: String,
    pub public_ip: Option<String>,
    /// Login username for SSH.
    pub username: String,
    pub image_id: String,
    pub instance_type: String,
    pub key_pair: Option<String>,
    pub status: String,
}

/// Snapshot of every devbox resource, optionally scoped to one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub instances: Vec<InstanceRecord>,
    pub volumes: Vec<VolumeRecord>,
    pub snapshots: Vec<SnapshotRecord>,
}

/// Outcome of a terminate request.
///
/// `project` and `instance_id` are `None` when the identifier could not be
/// resolved to exactly one instance; they are serialized as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerminateReport {
    pub success: bool,
    pub message: String,
    pub project: Option<String>,
    pub instance_id: Option<String>,
}
