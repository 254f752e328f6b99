//! Tests for the MCP tool adapters over a fake backend.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use devbox_mcp_server::operations::DevboxOperations;
use devbox_mcp_server::tools::{DevboxTools, LaunchInput, StatusInput, TerminateInput};
use rmcp::handler::server::wrapper::Parameters;

use crate::mocks::{instance, launch_outcome, Call, FakeCloud, FakeFactory};

fn tools(cloud: FakeCloud) -> (DevboxTools<FakeFactory>, FakeFactory) {
    let factory = FakeFactory::new(cloud);
    let tools = DevboxTools::new(Arc::new(DevboxOperations::new(factory.clone())));
    (tools, factory)
}

fn launch_input(project: &str) -> LaunchInput {
    serde_json::from_value(serde_json::json!({ "project": project })).expect("input")
}

#[tokio::test]
async fn status_failure_becomes_normalized_tool_error() {
    let (tools, _) = tools(FakeCloud::new().failing("list_volumes"));

    let err = tools
        .devbox_status(Parameters(StatusInput { project: None }))
        .await
        .expect_err("status must fail");

    assert_eq!(err, "Failed to retrieve status: Boom");
}

#[tokio::test]
async fn launch_failure_becomes_normalized_tool_error() {
    let (tools, _) = tools(FakeCloud::new().failing("launch"));

    let err = tools
        .devbox_launch(Parameters(launch_input("web")))
        .await
        .expect_err("launch must fail");

    assert_eq!(err, "Failed to launch devbox: Boom");
}

#[tokio::test]
async fn terminate_result_is_json_with_resolved_fields() {
    let (tools, fake) = tools(FakeCloud::new().with_instance(instance("i-0abc1234", Some("web"))));

    let text = tools
        .devbox_terminate(Parameters(TerminateInput {
            identifier: "web".into(),
        }))
        .await
        .expect("terminate");

    let json: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["instance_id"], "i-0abc1234");
    assert_eq!(json["project"], "web");
    assert_eq!(fake.cloud.count(|c| *c == Call::Terminate("web".into())), 1);
}

#[tokio::test]
async fn unknown_target_serializes_nulls() {
    let (tools, _) = tools(FakeCloud::new().terminate_reply(false, "No devbox instance found for 'ghost'"));

    let text = tools
        .devbox_terminate(Parameters(TerminateInput {
            identifier: "ghost".into(),
        }))
        .await
        .expect("terminate");

    let json: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(json["success"], false);
    assert!(json["instance_id"].is_null());
    assert!(json["project"].is_null());
}

#[tokio::test]
async fn launch_result_is_the_outcome_as_json() {
    let (tools, fake) = tools(FakeCloud::new().launch_reply(launch_outcome("web", "i-0abc1234")));

    let text = tools
        .devbox_launch(Parameters(launch_input("web")))
        .await
        .expect("launch");

    let json: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(json["instance_id"], "i-0abc1234");
    assert_eq!(json["username"], "ubuntu");
    assert!(fake
        .cloud
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Launch(r) if !r.emit_output)));
}
