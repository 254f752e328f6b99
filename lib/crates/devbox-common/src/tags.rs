//! Resource tag conventions shared by every devbox resource kind.

use std::collections::BTreeMap;

use thiserror::Error;

/// Tag key holding the project a resource belongs to.
pub const PROJECT_TAG: &str = "Project";

/// Tag key holding the human-readable resource name.
pub const NAME_TAG: &str = "Name";

/// Maximum project name length (keeps generated tag values and SSM paths short).
pub const MAX_PROJECT_LEN: usize = 64;

/// Extract the project from a resource's tags.
///
/// An absent or empty tag yields `None`.
pub fn project_of(tags: &BTreeMap<String, String>) -> Option<String> {
    tags.get(PROJECT_TAG)
        .filter(|value| !value.is_empty())
        .cloned()
}

/// `Name` tag value for a project's instance.
pub fn instance_name(project: &str) -> String {
    format!("devbox-{project}")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNameError {
    #[error("project name must not be empty")]
    Empty,

    #[error("project name must be at most {MAX_PROJECT_LEN} characters, got {0}")]
    TooLong(usize),

    #[error("project name '{0}' may contain only ASCII letters, digits and hyphens")]
    InvalidCharacters(String),
}

/// Validate a project name: non-empty, bounded, `[A-Za-z0-9-]+`.
pub fn validate_project_name(name: &str) -> Result<(), ProjectNameError> {
    if name.is_empty() {
        return Err(ProjectNameError::Empty);
    }
    if name.len() > MAX_PROJECT_LEN {
        return Err(ProjectNameError::TooLong(name.len()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ProjectNameError::InvalidCharacters(name.to_string()));
    }
    Ok(())
}
