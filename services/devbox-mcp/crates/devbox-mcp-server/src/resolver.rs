//! Target resolution: free-form identifier → one concrete instance.
//!
//! An identifier is either a project name or a provider instance id and
//! there is no syntactic way to tell them apart. Resolution tries the
//! project tag first and falls back to a direct id lookup only when no
//! instance carries that project.

use anyhow::{Context, Result};
use devbox_common::project_of;

use crate::ports::ResourceDirectory;

/// Outcome of resolving an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one instance matched, by project tag or by id.
    Found {
        instance_id: String,
        project: Option<String>,
    },
    /// Several instances share the project; the caller must pass an instance id.
    Ambiguous { matches: usize },
    /// Nothing matched, or the lookup itself failed.
    NotFound,
}

impl Resolution {
    /// Flatten into `(instance_id, project)`; both are `None` unless `Found`.
    pub fn into_pair(self) -> (Option<String>, Option<String>) {
        match self {
            Self::Found {
                instance_id,
                project,
            } => (Some(instance_id), project),
            Self::Ambiguous { .. } | Self::NotFound => (None, None),
        }
    }
}

/// Resolve `identifier` to a unique instance.
///
/// # Errors
///
/// Only a failure of the project listing is returned. Any failure of the
/// direct id lookup (unknown id, malformed id, provider error) is logged and
/// reported as [`Resolution::NotFound`].
pub async fn resolve(directory: &impl ResourceDirectory, identifier: &str) -> Result<Resolution> {
    let by_project = directory
        .list_instances(Some(identifier))
        .await
        .with_context(|| format!("listing instances for project '{identifier}'"))?;

    match by_project.as_slice() {
        [only] => {
            return Ok(Resolution::Found {
                instance_id: only.instance_id.clone(),
                project: only.project.clone(),
            });
        }
        [] => {}
        many => {
            tracing::debug!(identifier, matches = many.len(), "identifier is ambiguous");
            return Ok(Resolution::Ambiguous {
                matches: many.len(),
            });
        }
    }

    let resolution = match directory.describe_instance_by_id(identifier).await {
        Ok(Some(instance)) => Resolution::Found {
            project: project_of(&instance.tags),
            instance_id: instance.instance_id,
        },
        Ok(None) => Resolution::NotFound,
        Err(e) => {
            tracing::debug!(identifier, error = %format!("{e:#}"), "instance id lookup failed");
            Resolution::NotFound
        }
    };
    Ok(resolution)
}
