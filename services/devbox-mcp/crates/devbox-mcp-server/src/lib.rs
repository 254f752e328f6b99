//! devbox MCP server library — exposes modules for integration testing.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod aws;
pub mod command_runner;
pub mod error;
pub mod operations;
pub mod ports;
pub mod resolver;
pub mod server;
pub mod tools;
