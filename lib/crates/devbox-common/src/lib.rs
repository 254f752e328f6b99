pub mod config;
pub mod params;
pub mod tags;
pub mod types;

pub use config::{ServerConfig, Transport};
pub use params::ParameterError;
pub use tags::{PROJECT_TAG, ProjectNameError, project_of, validate_project_name};
pub use types::*;
