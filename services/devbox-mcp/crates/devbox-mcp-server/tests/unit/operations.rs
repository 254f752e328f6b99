//! Tests for the `DevboxOperations` facade.
//!
//! Verifies that every operation routes through the injected ports, acquires
//! one backend handle per request, and reports exactly one normalized failure.

#![allow(clippy::expect_used)]

use devbox_common::LaunchRequest;
use devbox_mcp_server::error::OperationError;
use devbox_mcp_server::operations::DevboxOperations;

use crate::mocks::{
    instance, launch_outcome, snapshot, volume, Call, FakeCloud, FakeFactory,
};

/// Operations over a fake cloud, plus a clone of the factory for inspection.
fn ops(cloud: FakeCloud) -> (DevboxOperations<FakeFactory>, FakeFactory) {
    let factory = FakeFactory::new(cloud);
    (DevboxOperations::new(factory.clone()), factory)
}

// ── launch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn launch_delegates_to_provisioner_without_output() {
    let (ops, fake) = ops(FakeCloud::new().launch_reply(launch_outcome("test-project", "i-12345")));
    let mut request = LaunchRequest::new("test-project");
    request.instance_type = Some("t3.medium".into());
    request.key_pair = Some("test-key".into());

    let outcome = ops.launch(request).await.expect("launch");

    assert_eq!(outcome.instance_id, "i-12345");
    assert_eq!(outcome.project, "test-project");

    let launches: Vec<LaunchRequest> = fake
        .cloud
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Launch(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(launches.len(), 1);
    assert!(!launches[0].emit_output);
    assert_eq!(launches[0].instance_type.as_deref(), Some("t3.medium"));
    assert_eq!(launches[0].key_pair.as_deref(), Some("test-key"));
    assert_eq!(launches[0].param_prefix, "/devbox");
}

#[tokio::test]
async fn launch_returns_outcome_unchanged() {
    let expected = launch_outcome("web", "i-9");
    let (ops, _) = ops(FakeCloud::new().launch_reply(expected.clone()));

    let outcome = ops.launch(LaunchRequest::new("web")).await.expect("launch");

    assert_eq!(outcome, expected);
}

#[tokio::test]
async fn launch_failure_is_normalized() {
    let (ops, _) = ops(FakeCloud::new().failing("launch"));

    let err = ops
        .launch(LaunchRequest::new("web"))
        .await
        .expect_err("launch must fail");

    assert_eq!(err, OperationError::Launch("Boom".into()));
    assert_eq!(err.to_string(), "Failed to launch devbox: Boom");
}

// ── status ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_queries_each_kind_once_with_project() {
    let (ops, fake) = ops(FakeCloud::new()
        .with_instance(instance("i-1", Some("my-project")))
        .with_volume(volume("vol-1", "my-project"))
        .with_snapshot(snapshot("snap-1", "my-project")));

    let report = ops.status(Some("my-project")).await.expect("status");

    let calls = fake.cloud.calls();
    let p = Some("my-project".to_string());
    assert_eq!(count(&calls, &Call::ListInstances(p.clone())), 1);
    assert_eq!(count(&calls, &Call::ListVolumes(p.clone())), 1);
    assert_eq!(count(&calls, &Call::ListSnapshots(p)), 1);
    assert_eq!(calls.len(), 3);

    assert_eq!(report.instances[0].instance_id, "i-1");
    assert_eq!(report.volumes[0].volume_id, "vol-1");
    assert_eq!(report.snapshots[0].snapshot_id, "snap-1");
}

#[tokio::test]
async fn status_preserves_directory_order() {
    let (ops, _) = ops(FakeCloud::new()
        .with_instance(instance("i-z", Some("a")))
        .with_instance(instance("i-a", Some("b")))
        .with_instance(instance("i-m", Some("c"))));

    let report = ops.status(None).await.expect("status");

    let ids: Vec<&str> = report
        .instances
        .iter()
        .map(|i| i.instance_id.as_str())
        .collect();
    assert_eq!(ids, ["i-z", "i-a", "i-m"]);
}

#[tokio::test]
async fn status_without_project_passes_none() {
    let (ops, fake) = ops(FakeCloud::new());

    let report = ops.status(None).await.expect("status");

    assert!(report.instances.is_empty());
    assert_eq!(count(&fake.cloud.calls(), &Call::ListVolumes(None)), 1);
}

#[tokio::test]
async fn status_fails_when_any_query_fails() {
    for method in ["list_instances", "list_volumes", "list_snapshots"] {
        let (ops, _) = ops(FakeCloud::new()
            .with_volume(volume("vol-1", "p"))
            .failing(method));

        let err = ops.status(None).await.expect_err(method);

        assert_eq!(err, OperationError::Status("Boom".into()), "{method}");
    }
}

#[tokio::test]
async fn status_surfaces_instance_listing_error() {
    let (ops, _) = ops(FakeCloud::new().failing("list_instances"));

    let err = ops.status(None).await.expect_err("status must fail");

    assert_eq!(err.to_string(), "Failed to retrieve status: Boom");
}

// ── terminate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn terminate_by_project_reports_resolved_instance() {
    let (ops, fake) = ops(FakeCloud::new().with_instance(instance("i-12345", Some("my-project"))));

    let report = ops.terminate("my-project").await.expect("terminate");

    assert!(report.success);
    assert_eq!(report.message, "Terminating");
    assert_eq!(report.project.as_deref(), Some("my-project"));
    assert_eq!(report.instance_id.as_deref(), Some("i-12345"));
    assert_eq!(
        count(&fake.cloud.calls(), &Call::Terminate("my-project".into())),
        1
    );
}

#[tokio::test]
async fn terminate_unknown_identifier_still_calls_terminate() {
    let (ops, fake) = ops(FakeCloud::new().terminate_reply(false, "No devbox instance found for 'ghost'"));

    let report = ops.terminate("ghost").await.expect("terminate");

    assert_eq!(report.instance_id, None);
    assert_eq!(report.project, None);
    assert!(!report.success);
    assert_eq!(report.message, "No devbox instance found for 'ghost'");
    assert_eq!(count(&fake.cloud.calls(), &Call::Terminate("ghost".into())), 1);
}

#[tokio::test]
async fn terminate_ambiguous_project_passes_raw_identifier() {
    let (ops, fake) = ops(FakeCloud::new()
        .with_instance(instance("i-1", Some("shared")))
        .with_instance(instance("i-2", Some("shared"))));

    let report = ops.terminate("shared").await.expect("terminate");

    assert_eq!(report.instance_id, None);
    assert_eq!(report.project, None);
    assert_eq!(count(&fake.cloud.calls(), &Call::Terminate("shared".into())), 1);
}

#[tokio::test]
async fn terminate_passes_raw_id_even_when_lookup_errors() {
    let (ops, fake) = ops(FakeCloud::new().failing("describe_instance_by_id"));

    let report = ops.terminate("i-0deadbeef").await.expect("terminate");

    assert_eq!(report.instance_id, None);
    assert_eq!(
        count(&fake.cloud.calls(), &Call::Terminate("i-0deadbeef".into())),
        1
    );
}

#[tokio::test]
async fn terminate_by_instance_id_echoes_project() {
    let (ops, _) = ops(FakeCloud::new().with_instance(instance("i-0abc", Some("web"))));

    let report = ops.terminate("i-0abc").await.expect("terminate");

    assert_eq!(report.instance_id.as_deref(), Some("i-0abc"));
    assert_eq!(report.project.as_deref(), Some("web"));
}

#[tokio::test]
async fn terminate_listing_error_is_normalized() {
    let (ops, fake) = ops(FakeCloud::new()
        .with_instance(instance("i-12345", Some("web")))
        .failing("list_instances"));

    let err = ops.terminate("web").await.expect_err("terminate must fail");

    assert!(matches!(
        err,
        OperationError::Terminate(ref m)
            if m == "listing instances for project 'web': Boom"
    ));
    assert_eq!(fake.cloud.count(|c| matches!(c, Call::Terminate(_))), 0);
    assert_eq!(fake.cloud.count(|c| matches!(c, Call::Describe(_))), 0);
}

#[tokio::test]
async fn terminate_collaborator_error_is_normalized() {
    let (ops, _) = ops(FakeCloud::new().failing("terminate_instance"));

    let err = ops.terminate("web").await.expect_err("terminate must fail");

    assert_eq!(err.to_string(), "Failed to terminate instance: Boom");
}

// ── per-request handles ───────────────────────────────────────────────────────

#[tokio::test]
async fn every_operation_acquires_its_own_handle() {
    let (ops, fake) = ops(FakeCloud::new());

    let _ = ops.status(None).await;
    let _ = ops.terminate("web").await;
    let _ = ops.launch(LaunchRequest::new("web")).await;

    assert_eq!(fake.connect_count(), 3);
}

#[tokio::test]
async fn connect_failure_is_normalized_per_operation() {
    let ops = DevboxOperations::new(FakeFactory::refusing());

    let status = ops.status(None).await.expect_err("status");
    let terminate = ops.terminate("web").await.expect_err("terminate");

    assert!(matches!(status, OperationError::Status(ref m) if m.contains("no credentials")));
    assert!(terminate
        .to_string()
        .starts_with("Failed to terminate instance: failed to create compute provider client"));
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn count(calls: &[Call], wanted: &Call) -> usize {
    calls.iter().filter(|c| *c == wanted).count()
}
