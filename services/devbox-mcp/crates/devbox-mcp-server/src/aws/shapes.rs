//! AWS CLI JSON response shapes and their conversion to devbox records.

use std::collections::BTreeMap;

use devbox_common::{InstanceRecord, SnapshotRecord, VolumeRecord, project_of};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

fn tag_map(tags: Vec<Tag>) -> BTreeMap<String, String> {
    tags.into_iter().map(|t| (t.key, t.value)).collect()
}

// ── ec2 describe-instances / run-instances ───────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesResponse {
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunInstancesResponse {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,
    pub instance_type: Option<String>,
    pub image_id: Option<String>,
    pub key_name: Option<String>,
    pub launch_time: Option<String>,
    pub public_ip_address: Option<String>,
    pub state: Option<InstanceState>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    pub name: String,
}

impl From<Instance> for InstanceRecord {
    fn from(i: Instance) -> Self {
        let tags = tag_map(i.tags);
        Self {
            project: project_of(&tags),
            instance_id: i.instance_id,
            state: i.state.map_or_else(|| "unknown".to_string(), |s| s.name),
            instance_type: i.instance_type,
            public_ip: i.public_ip_address,
            image_id: i.image_id,
            key_name: i.key_name,
            launch_time: i.launch_time,
            tags,
        }
    }
}

impl DescribeInstancesResponse {
    /// Flatten reservations into records, keeping response order.
    pub fn into_records(self) -> Vec<InstanceRecord> {
        self.reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(InstanceRecord::from)
            .collect()
    }
}

// ── ec2 describe-volumes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesResponse {
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub volume_id: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub state: String,
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub attachments: Vec<VolumeAttachment>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeAttachment {
    pub instance_id: Option<String>,
}

impl From<Volume> for VolumeRecord {
    fn from(v: Volume) -> Self {
        let tags = tag_map(v.tags);
        Self {
            project: project_of(&tags),
            volume_id: v.volume_id,
            size_gib: v.size,
            state: v.state,
            availability_zone: v.availability_zone,
            attached_instance: v.attachments.into_iter().find_map(|a| a.instance_id),
            tags,
        }
    }
}

// ── ec2 describe-snapshots ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotsResponse {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub snapshot_id: String,
    pub volume_id: Option<String>,
    #[serde(default)]
    pub volume_size: u32,
    #[serde(default)]
    pub state: String,
    pub start_time: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl From<Snapshot> for SnapshotRecord {
    fn from(s: Snapshot) -> Self {
        let tags = tag_map(s.tags);
        Self {
            project: project_of(&tags),
            snapshot_id: s.snapshot_id,
            volume_id: s.volume_id,
            size_gib: s.volume_size,
            state: s.state,
            start_time: s.start_time,
            description: s.description.filter(|d| !d.is_empty()),
            tags,
        }
    }
}

// ── ec2 describe-images ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeImagesResponse {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub image_id: String,
    pub root_device_name: Option<String>,
    #[serde(default)]
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub ebs: Option<EbsBlockDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EbsBlockDevice {
    pub volume_size: Option<u32>,
}

impl Image {
    /// Size in GiB of the root device's EBS mapping, if the image records one.
    pub fn root_volume_size(&self) -> Option<u32> {
        let root = self.root_device_name.as_deref()?;
        self.block_device_mappings
            .iter()
            .find(|m| m.device_name == root)
            .and_then(|m| m.ebs.as_ref())
            .and_then(|ebs| ebs.volume_size)
    }
}

// ── ssm get-parameter ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetParameterResponse {
    pub parameter: Parameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub value: String,
}
