use serde::Deserialize;
use std::net::SocketAddr;

/// MCP transport served by the devbox server.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout; the process exits when stdin closes.
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`.
    Http,
}

/// devbox MCP server configuration (loaded from `DEVBOX_*` env vars)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: Transport,

    /// Listen address for the HTTP transport (default: 127.0.0.1:8090)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// AWS CLI executable
    #[serde(default = "default_aws_bin")]
    pub aws_bin: String,

    /// Passed to the AWS CLI as `--region` when set
    pub aws_region: Option<String>,

    /// Passed to the AWS CLI as `--profile` when set
    pub aws_profile: Option<String>,

    /// Timeout for a single AWS CLI call
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Timeout for waiting on a launched instance to reach `running`
    #[serde(default = "default_launch_timeout_secs")]
    pub launch_timeout_secs: u64,

    #[serde(default = "default_instance_type")]
    pub default_instance_type: String,

    /// Login username reported in launch results
    #[serde(default = "default_ssh_username")]
    pub ssh_username: String,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8090))
}

fn default_aws_bin() -> String {
    "aws".to_string()
}

fn default_command_timeout_secs() -> u64 {
    60
}

fn default_launch_timeout_secs() -> u64 {
    900
}

fn default_instance_type() -> String {
    "t3.medium".to_string()
}

fn default_ssh_username() -> String {
    "ubuntu".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            listen_addr: default_listen_addr(),
            aws_bin: default_aws_bin(),
            aws_region: None,
            aws_profile: None,
            command_timeout_secs: default_command_timeout_secs(),
            launch_timeout_secs: default_launch_timeout_secs(),
            default_instance_type: default_instance_type(),
            ssh_username: default_ssh_username(),
        }
    }
}
