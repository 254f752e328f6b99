//! MCP tool implementations for the devbox server.
//!
//! Exposes 3 tools via the `rmcp` `#[tool]` macro:
//!   - `devbox_launch`
//!   - `devbox_status`
//!   - `devbox_terminate`
//!
//! Each tool is a thin adapter: decode input, call [`DevboxOperations`],
//! serialize the result as JSON text. Failures reach the caller as tool
//! errors carrying the normalized operation message.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use devbox_common::{LaunchRequest, ServerConfig, DEFAULT_PARAM_PREFIX};

use crate::aws::AwsCliFactory;
use crate::operations::DevboxOperations;
use crate::ports::BackendFactory;

// ===================================================================
// Input structs
// ===================================================================

/// Input parameters for the `devbox_launch` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LaunchInput {
    /// Project name (alphanumeric and hyphens only).
    pub project: String,
    /// EC2 instance type to use.
    #[serde(default)]
    pub instance_type: Option<String>,
    /// EC2 key pair name for SSH access.
    #[serde(default)]
    pub key_pair: Option<String>,
    /// Minimum size (GiB) for the root EBS volume. 0 keeps the image default.
    #[serde(default)]
    pub volume_size: u32,
    /// Base AMI ID for projects that have never been launched.
    #[serde(default)]
    pub base_ami: Option<String>,
    /// SSM parameter prefix.
    #[serde(default = "default_param_prefix")]
    pub param_prefix: String,
}

fn default_param_prefix() -> String {
    DEFAULT_PARAM_PREFIX.to_string()
}

impl From<LaunchInput> for LaunchRequest {
    fn from(input: LaunchInput) -> Self {
        Self {
            project: input.project,
            instance_type: input.instance_type,
            key_pair: input.key_pair,
            volume_size: input.volume_size,
            base_ami: input.base_ami,
            param_prefix: input.param_prefix,
            emit_output: false,
        }
    }
}

/// Input parameters for the `devbox_status` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct StatusInput {
    /// Optional project name to filter resources.
    #[serde(default)]
    pub project: Option<String>,
}

/// Input parameters for the `devbox_terminate` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TerminateInput {
    /// Project name or instance id to terminate.
    pub identifier: String,
}

// ===================================================================
// DevboxTools — the MCP server handler
// ===================================================================

/// MCP server handler exposing the devbox operations to an agent.
pub struct DevboxTools<F = AwsCliFactory> {
    ops: Arc<DevboxOperations<F>>,
    tool_router: ToolRouter<Self>,
}

impl<F> Clone for DevboxTools<F> {
    fn clone(&self) -> Self {
        Self {
            ops: Arc::clone(&self.ops),
            tool_router: self.tool_router.clone(),
        }
    }
}

impl<F> std::fmt::Debug for DevboxTools<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevboxTools")
            .field("ops", &"<DevboxOperations>")
            .finish()
    }
}

impl<F: BackendFactory> DevboxTools<F> {
    /// Create a handler sharing the given operations.
    pub fn new(ops: Arc<DevboxOperations<F>>) -> Self {
        Self {
            ops,
            tool_router: Self::tool_router(),
        }
    }
}

impl DevboxTools<AwsCliFactory> {
    /// Create a handler backed by the AWS CLI described by `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(Arc::new(DevboxOperations::new(AwsCliFactory::new(config))))
    }
}

// -------------------------------------------------------------------
// Tool implementations
// -------------------------------------------------------------------

#[tool_router]
impl<F: BackendFactory> DevboxTools<F> {
    /// Launch a devbox instance and return structured details.
    #[tool(description = "Launch (or reuse) the devbox for a project. \
        Returns instance id, public IP, username, image, type, key pair and status.")]
    pub async fn devbox_launch(&self, params: Parameters<LaunchInput>) -> Result<String, String> {
        let outcome = self
            .ops
            .launch(params.0.into())
            .await
            .map_err(|e| e.to_string())?;
        to_json(&outcome)
    }

    /// Return instances, volumes and snapshots, optionally for one project.
    #[tool(description = "List devbox instances, volumes and snapshots, \
        optionally filtered by project.")]
    pub async fn devbox_status(&self, params: Parameters<StatusInput>) -> Result<String, String> {
        let report = self
            .ops
            .status(params.0.project.as_deref())
            .await
            .map_err(|e| e.to_string())?;
        to_json(&report)
    }

    /// Terminate a devbox by project name or instance id.
    #[tool(description = "Terminate a devbox instance by project name or \
        instance id. Returns success, message and the resolved project and instance id.")]
    pub async fn devbox_terminate(
        &self,
        params: Parameters<TerminateInput>,
    ) -> Result<String, String> {
        let report = self
            .ops
            .terminate(&params.0.identifier)
            .await
            .map_err(|e| e.to_string())?;
        to_json(&report)
    }
}

// -------------------------------------------------------------------
// ServerHandler implementation (via tool_handler macro)
// -------------------------------------------------------------------

#[tool_handler]
impl<F: BackendFactory> ServerHandler for DevboxTools<F> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "DevBox — ephemeral cloud development instances. \
                 Use devbox_launch to create or resume a project's devbox, \
                 devbox_status to inspect resources, and devbox_terminate \
                 with a project name or instance id to shut one down."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

// -------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {e}"))
}
