//! Integration tests for the execution coordinator
//!
//! All streaming behavior is exercised against the scripted transport;
//! no network is involved.

use std::sync::Arc;

use serde_json::json;

use flowforge_runtime::{
    ExecutionCoordinator, ExecutionEvent, NodeRunStatus, RunInput, RunOutcome, RunState,
    RuntimeError, SYSTEM_NODE_ID,
};
use flowforge_test_utils::{
    execution_completed_message, execution_failed_message, execution_started_message,
    linear_snapshot, node_completed_message, node_started_message, ScriptedFrame,
    ScriptedTransport,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn successful_run_streams_node_events_into_the_log() {
    init_tracing();
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script(vec![
            execution_started_message(),
            node_started_message("1", "API Entry"),
            node_completed_message("1", "API Entry", json!({ "route": "/orders" })),
            node_started_message("2", "Response"),
            node_completed_message("2", "Response", json!({ "status": 200 })),
            execution_completed_message(json!({ "status": 200, "body": { "ok": true } })),
        ])
        .await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let mut handle = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();
    assert_eq!(handle.execution_id(), "exec-1");

    // Drain events through to the terminal one
    let mut saw_started = false;
    let mut node_updates = 0;
    loop {
        match handle.next_event().await.unwrap() {
            ExecutionEvent::Started { .. } => saw_started = true,
            ExecutionEvent::NodeUpdated(_) => node_updates += 1,
            ExecutionEvent::Finished(outcome) => {
                assert_eq!(
                    outcome,
                    RunOutcome::Completed(json!({ "status": 200, "body": { "ok": true } }))
                );
                break;
            }
        }
    }
    assert!(saw_started);
    assert_eq!(node_updates, 4);

    // One entry per node, both completed, first-seen order preserved
    let log = handle.log().await;
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].node_id, "1");
    assert_eq!(log.entries()[0].status, NodeRunStatus::Completed);
    assert_eq!(log.entries()[0].output, Some(json!({ "route": "/orders" })));
    assert_eq!(log.entries()[1].node_id, "2");

    assert_eq!(handle.outcome().await, RunOutcome::Completed(json!({ "status": 200, "body": { "ok": true } })));
    assert_eq!(coordinator.state().await, RunState::Completed);
}

#[tokio::test]
async fn engine_failure_resolves_as_failed_outcome() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script(vec![
            execution_started_message(),
            node_started_message("1", "API Entry"),
            execution_failed_message("logic node threw"),
        ])
        .await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let handle = coordinator
        .run(Some("user-1"), linear_snapshot(1), RunInput::default())
        .await
        .unwrap();

    assert_eq!(
        handle.outcome().await,
        RunOutcome::Failed("logic node threw".to_string())
    );
    assert_eq!(coordinator.state().await, RunState::Failed);

    // The node that had started stays in the log as running
    let log = coordinator.log().await;
    assert_eq!(log.entry("1").unwrap().status, NodeRunStatus::Running);
}

#[tokio::test]
async fn rejected_submission_writes_one_system_entry_and_opens_no_channel() {
    let transport = Arc::new(ScriptedTransport::rejecting("quota exceeded"));
    let coordinator = ExecutionCoordinator::new(transport, "p1");

    let result = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await;
    assert!(matches!(result, Err(RuntimeError::SubmissionError(_))));
    assert_eq!(coordinator.state().await, RunState::Failed);

    let log = coordinator.log().await;
    assert_eq!(log.len(), 1);
    let entry = log.entry(SYSTEM_NODE_ID).unwrap();
    assert_eq!(entry.status, NodeRunStatus::Error);
    assert!(entry.error.as_deref().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn mid_stream_transport_error_fails_the_run_with_a_system_entry() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script_frames(vec![
            ScriptedFrame::Message(execution_started_message()),
            ScriptedFrame::Message(node_started_message("1", "API Entry")),
            ScriptedFrame::Error("connection reset".to_string()),
        ])
        .await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let handle = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();

    let outcome = handle.outcome().await;
    assert!(matches!(outcome, RunOutcome::Failed(msg) if msg.contains("connection reset")));
    assert_eq!(coordinator.state().await, RunState::Failed);

    let log = coordinator.log().await;
    assert!(log.entry(SYSTEM_NODE_ID).is_some());
    assert!(log.entry("1").is_some());
}

#[tokio::test]
async fn stream_closing_without_terminal_event_is_a_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.script(vec![execution_started_message()]).await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let handle = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();

    assert!(matches!(
        handle.outcome().await,
        RunOutcome::Failed(msg) if msg.contains("closed before a terminal event")
    ));
}

#[tokio::test]
async fn out_of_order_node_events_update_in_place() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script(vec![
            node_completed_message("1", "API Entry", json!(1)),
            node_started_message("1", "API Entry"),
            execution_completed_message(json!({})),
        ])
        .await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let handle = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();
    handle.outcome().await;

    // Last write wins, still a single entry
    let log = coordinator.log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log.entry("1").unwrap().status, NodeRunStatus::Running);
}

#[tokio::test]
async fn new_run_supersedes_a_hung_run() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.script_frames(vec![ScriptedFrame::Hang]).await;
    transport
        .script(vec![execution_completed_message(json!({ "second": true }))])
        .await;

    let coordinator = ExecutionCoordinator::new(transport.clone(), "p1");
    let first = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();
    let second = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();

    assert_eq!(
        second.outcome().await,
        RunOutcome::Completed(json!({ "second": true }))
    );
    // The superseded run's outcome resolves as cancelled
    assert_eq!(first.outcome().await, RunOutcome::Cancelled);
    assert_eq!(coordinator.state().await, RunState::Completed);
}

#[tokio::test]
async fn abort_detaches_and_marks_the_run_cancelled() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.script_frames(vec![ScriptedFrame::Hang]).await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let handle = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();

    handle.abort().await;
    assert_eq!(coordinator.state().await, RunState::Cancelled);
    assert_eq!(handle.outcome().await, RunOutcome::Cancelled);
}

#[tokio::test]
async fn submission_carries_the_full_graph_and_input() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script(vec![execution_completed_message(json!({}))])
        .await;

    let input = RunInput {
        body: json!({ "orderId": 42 }),
        ..Default::default()
    };

    let coordinator = ExecutionCoordinator::new(transport.clone(), "p1");
    let snapshot = linear_snapshot(2);
    let expected_nodes = snapshot.nodes.len();
    let handle = coordinator
        .run(Some("user-1"), snapshot, input)
        .await
        .unwrap();
    handle.outcome().await;

    let submissions = transport.submissions().await;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].workflow.nodes.len(), expected_nodes);
    assert_eq!(submissions[0].workflow.edges.len(), expected_nodes - 1);
    assert_eq!(submissions[0].input.body, json!({ "orderId": 42 }));
}

#[tokio::test]
async fn a_new_run_clears_the_previous_log() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .script(vec![
            node_started_message("1", "API Entry"),
            execution_failed_message("boom"),
        ])
        .await;
    transport
        .script(vec![execution_completed_message(json!({}))])
        .await;

    let coordinator = ExecutionCoordinator::new(transport, "p1");
    let first = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();
    first.outcome().await;
    assert_eq!(coordinator.log().await.len(), 1);

    let second = coordinator
        .run(Some("user-1"), linear_snapshot(0), RunInput::default())
        .await
        .unwrap();
    second.outcome().await;
    assert!(coordinator.log().await.is_empty());
}
