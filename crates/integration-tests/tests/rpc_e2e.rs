//! JSON-RPC End-to-End Tests
//!
//! Real daemon wiring on an ephemeral port, exercised through the SDK.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use shellhost_api_rpc::{RpcServer, RpcServerConfig};
use shellhost_core::application::{
    FileMutationGuard, FileService, ProcessRegistry, SearchService, ShellService,
};
use shellhost_core::port::time_provider::SystemTimeProvider;
use shellhost_infra_system::{BashRunner, LocalFileSystem, LocalSearch};
use shellhost_sdk::{code, EditRequest, ExecRequest, ReadRequest, SdkError, ShellhostClient};

struct TestDaemon {
    client: ShellhostClient,
    handle: jsonrpsee::server::ServerHandle,
    workdir: tempfile::TempDir,
}

async fn spawn_daemon() -> TestDaemon {
    let workdir = tempfile::tempdir().unwrap();
    let shell = Arc::new(ShellService::new(
        Arc::new(BashRunner::new().with_workdir(workdir.path())),
        Arc::new(ProcessRegistry::new(Arc::new(SystemTimeProvider))),
    ));
    let files = Arc::new(FileService::new(
        Arc::new(LocalFileSystem::new()),
        Arc::new(FileMutationGuard::new()),
    ));
    let search = Arc::new(SearchService::new(
        Arc::new(LocalSearch::new("rg", workdir.path())),
        workdir.path(),
    ));

    let config = RpcServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
    };
    let (addr, handle) = RpcServer::new(config, shell, files, search)
        .start()
        .await
        .unwrap();
    let client = ShellhostClient::connect(format!("http://{}", addr))
        .await
        .unwrap();

    TestDaemon {
        client,
        handle,
        workdir,
    }
}

fn rpc_code(err: &SdkError) -> i32 {
    err.code()
        .unwrap_or_else(|| panic!("expected an RPC error, got {err:?}"))
}

#[tokio::test]
async fn test_foreground_exec() {
    let daemon = spawn_daemon().await;

    let response = daemon
        .client
        .exec(ExecRequest::foreground("echo hello"))
        .await
        .unwrap();
    assert_eq!(response.output, "hello\n");
    assert!(response.shell_id.is_none());

    let err = daemon
        .client
        .exec(ExecRequest::foreground("exit 7"))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), code::COMMAND_FAILED);
    assert_eq!(err.exit_code(), Some(7));

    let err = daemon
        .client
        .exec(ExecRequest::foreground("   "))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), code::VALIDATION_ERROR);

    daemon.handle.stop().unwrap();
}

#[tokio::test]
async fn test_background_lifecycle() {
    let daemon = spawn_daemon().await;
    let client = &daemon.client;

    let started = client
        .exec(ExecRequest::background("echo ready; sleep 30"))
        .await
        .unwrap();
    let shell_id = started.shell_id.unwrap();
    assert_eq!(
        started.output,
        format!("Command running in background with ID: {}", shell_id)
    );

    let mut seen = String::new();
    for _ in 0..100 {
        let delta = client.output(&shell_id, None).await.unwrap();
        assert_eq!(delta.status, "running");
        seen.push_str(&delta.stdout);
        if !seen.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(seen, "ready\n");

    let listed = client.list().await.unwrap();
    assert_eq!(listed.shells.len(), 1);
    assert_eq!(listed.shells[0].id, shell_id);
    assert_eq!(listed.shells[0].command, "echo ready; sleep 30");

    let killed = client.kill(&shell_id).await.unwrap();
    assert_eq!(killed.shell_id, shell_id);
    assert!(killed.message.starts_with("Successfully killed shell"));

    assert!(client.list().await.unwrap().shells.is_empty());
    let err = client.output(&shell_id, None).await.unwrap_err();
    assert!(err.is_not_found());

    daemon.handle.stop().unwrap();
}

#[tokio::test]
async fn test_file_round_trip() {
    let daemon = spawn_daemon().await;
    let client = &daemon.client;
    let path = daemon.workdir.path().join("app.txt");
    let path_str = path.display().to_string();

    client.write(&path_str, "alpha\nbeta\n").await.unwrap();

    let read = client
        .read(ReadRequest {
            file_path: path_str.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(read.content.contains("alpha"));
    assert!(read.content.contains("beta"));

    let edited = client
        .edit(EditRequest {
            file_path: path_str.clone(),
            old_string: "beta".into(),
            new_string: "gamma".into(),
            replace_all: false,
        })
        .await
        .unwrap();
    assert!(edited.message.contains("has been updated"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "alpha\ngamma\n");

    let globbed = client.glob("*.txt", None).await.unwrap();
    assert_eq!(globbed.files, "app.txt");

    // Unread file in the same directory
    let other = daemon.workdir.path().join("other.txt");
    std::fs::write(&other, "x\n").unwrap();
    let err = client
        .write(other.display().to_string(), "y\n")
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    daemon.handle.stop().unwrap();
}
