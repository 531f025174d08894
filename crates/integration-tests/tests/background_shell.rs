//! Background Shell Integration Tests
//!
//! Real `bash` processes driven through ShellService and ProcessRegistry.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use shellhost_core::application::{ExecRequest, ProcessRegistry, ShellService};
use shellhost_core::domain::ExecutionStatus;
use shellhost_core::error::AppError;
use shellhost_core::port::time_provider::SystemTimeProvider;
use shellhost_core::port::ExecutionError;
use shellhost_infra_system::BashRunner;

fn service() -> ShellService {
    ShellService::new(
        Arc::new(BashRunner::new()),
        Arc::new(ProcessRegistry::new(Arc::new(SystemTimeProvider))),
    )
}

async fn start(shell: &ShellService, command: &str) -> String {
    shell
        .execute(ExecRequest {
            command: command.to_string(),
            run_in_background: true,
            ..Default::default()
        })
        .await
        .unwrap()
        .shell_id
        .unwrap()
}

async fn wait_for_exit(shell: &ShellService, shell_id: &str) {
    let execution = shell.registry().lookup(shell_id).unwrap();
    tokio::time::timeout(Duration::from_secs(10), execution.wait())
        .await
        .expect("background command did not finish");
}

/// Output arrives incrementally and is never delivered twice
#[tokio::test]
async fn test_incremental_polling() {
    let shell = service();
    let shell_id = start(&shell, "echo A; sleep 0.5; echo B").await;
    assert_eq!(shell_id, "shell_1");

    let mut first = String::new();
    for _ in 0..100 {
        first.push_str(&shell.poll_output(&shell_id, None).unwrap().stdout);
        if !first.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(first, "A\n");

    wait_for_exit(&shell, &shell_id).await;

    let last = shell.poll_output(&shell_id, None).unwrap();
    assert_eq!(last.stdout, "B\n");
    assert_eq!(last.status, ExecutionStatus::Completed);
    assert_eq!(last.exit_code, Some(0));

    let empty = shell.poll_output(&shell_id, None).unwrap();
    assert!(empty.stdout.is_empty());
    assert_eq!(empty.status, ExecutionStatus::Completed);
}

#[tokio::test]
async fn test_streams_stay_separate() {
    let shell = service();
    let shell_id = start(&shell, "echo out; echo err >&2; exit 4").await;
    wait_for_exit(&shell, &shell_id).await;

    let delta = shell.poll_output(&shell_id, None).unwrap();
    assert_eq!(delta.stdout, "out\n");
    assert_eq!(delta.stderr, "err\n");
    assert_eq!(delta.status, ExecutionStatus::Failed);
    assert_eq!(delta.exit_code, Some(4));
}

#[tokio::test]
async fn test_filter_consumes_unmatched_lines() {
    let shell = service();
    let shell_id = start(&shell, "printf 'ok 1\\nerr 2\\nok 3\\n'").await;
    wait_for_exit(&shell, &shell_id).await;

    let filtered = shell.poll_output(&shell_id, Some("ok.*")).unwrap();
    assert_eq!(filtered.stdout, "ok 1\nok 3\n");

    // Filtered-out lines are gone too
    let again = shell.poll_output(&shell_id, None).unwrap();
    assert!(again.stdout.is_empty());
}

#[tokio::test]
async fn test_invalid_filter_keeps_output() {
    let shell = service();
    let shell_id = start(&shell, "echo kept").await;
    wait_for_exit(&shell, &shell_id).await;

    let err = shell.poll_output(&shell_id, Some("(")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let delta = shell.poll_output(&shell_id, None).unwrap();
    assert_eq!(delta.stdout, "kept\n");
}

/// Two concurrent kills: exactly one wins, the other sees "not found"
#[tokio::test]
async fn test_concurrent_terminate() {
    let shell = service();
    let shell_id = start(&shell, "sleep 30").await;

    let (first, second) = tokio::join!(shell.terminate(&shell_id), shell.terminate(&shell_id));
    let outcomes = [first, second];
    let killed = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(killed, 1);

    let message = outcomes.iter().find_map(|r| r.as_ref().ok()).unwrap();
    assert_eq!(
        message,
        &format!("Successfully killed shell: {} (sleep 30)", shell_id)
    );
    let err = outcomes.into_iter().find_map(|r| r.err()).unwrap();
    assert!(err.to_string().contains("not found"));

    assert!(shell.list().is_empty());
    assert!(shell.poll_output(&shell_id, None).is_err());
}

#[tokio::test]
async fn test_terminate_completed_is_rejected() {
    let shell = service();
    let shell_id = start(&shell, "true").await;
    wait_for_exit(&shell, &shell_id).await;

    let err = shell.terminate(&shell_id).await.unwrap_err();
    assert!(err.to_string().contains("has already completed"));

    // Entry survives the rejected kill
    let listed = shell.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, ExecutionStatus::Completed);
}

#[tokio::test]
async fn test_kill_reaches_child_processes() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let shell = service();
    let shell_id = start(
        &shell,
        &format!("(sleep 1; touch {}) & wait", marker.display()),
    )
    .await;

    shell.terminate(&shell_id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "grandchild survived the kill");
}

#[tokio::test]
async fn test_foreground_failure_and_timeout() {
    let shell = service();

    let ok = shell
        .execute(ExecRequest {
            command: "echo hi".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ok.result, "hi\n");
    assert!(ok.shell_id.is_none());

    let err = shell
        .execute(ExecRequest {
            command: "echo partial; exit 3".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    match err {
        AppError::CommandFailed { code, output, .. } => {
            assert_eq!(code, 3);
            assert_eq!(output, "partial\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = shell
        .execute(ExecRequest {
            command: "sleep 5".into(),
            timeout_ms: Some(200),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Execution(ExecutionError::Timeout(200))
    ));

    // Foreground runs never enter the registry
    assert!(shell.registry().is_empty());
}

#[tokio::test]
async fn test_ids_are_sequential() {
    let shell = service();
    let ids = [
        start(&shell, "true").await,
        start(&shell, "true").await,
        start(&shell, "true").await,
    ];
    assert_eq!(ids, ["shell_1", "shell_2", "shell_3"]);

    let listed: Vec<String> = shell.list().into_iter().map(|s| s.id).collect();
    assert_eq!(listed, ids);
}
