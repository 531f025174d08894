//! Read-before-write Integration Tests
//!
//! FileService over the real filesystem, with files changed behind its back.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use shellhost_core::application::{
    EditRequest, FileMutationGuard, FileService, ReadRequest, WriteRequest,
};
use shellhost_core::domain::DomainError;
use shellhost_core::error::AppError;
use shellhost_infra_system::LocalFileSystem;

fn service() -> FileService {
    FileService::new(
        Arc::new(LocalFileSystem::new()),
        Arc::new(FileMutationGuard::new()),
    )
}

fn read_req(path: &Path) -> ReadRequest {
    ReadRequest {
        file_path: path.display().to_string(),
        ..Default::default()
    }
}

fn edit_req(path: &Path, old: &str, new: &str) -> EditRequest {
    EditRequest {
        file_path: path.display().to_string(),
        old_string: old.to_string(),
        new_string: new.to_string(),
        replace_all: false,
    }
}

/// Simulate an external writer by pushing the mtime into the future
fn touch_externally(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();
}

#[tokio::test]
async fn test_edit_requires_prior_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.rs");
    std::fs::write(&path, "fn main() {}\n").unwrap();
    let files = service();

    let err = files
        .edit(edit_req(&path, "main", "start"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::NotRead(_))));
    assert!(err.to_string().contains("has not been read yet"));

    files.read(read_req(&path)).await.unwrap();
    let message = files.edit(edit_req(&path, "main", "start")).await.unwrap();
    assert!(message.contains("has been updated"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn start() {}\n");
}

#[tokio::test]
async fn test_external_change_blocks_mutation_until_reread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 1\n").unwrap();
    let files = service();

    files.read(read_req(&path)).await.unwrap();
    touch_externally(&path, "port = 2\n");

    let err = files
        .edit(edit_req(&path, "port = 2", "port = 3"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("has been modified since it was last read"));

    let err = files
        .write(WriteRequest {
            file_path: path.display().to_string(),
            content: "port = 9\n".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::ModifiedSinceRead(_))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "port = 2\n");

    let content = files.read(read_req(&path)).await.unwrap();
    assert!(content.contains("port = 2"));
    files
        .edit(edit_req(&path, "port = 2", "port = 3"))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "port = 3\n");
}

#[tokio::test]
async fn test_write_creates_then_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/dir/notes.txt");
    let files = service();
    let request = |content: &str| WriteRequest {
        file_path: path.display().to_string(),
        content: content.to_string(),
    };

    let created = files.write(request("one\n")).await.unwrap();
    assert_eq!(
        created,
        format!("File created successfully at: {}", path.display())
    );

    // Our own write counts as a read
    let updated = files.write(request("two\n")).await.unwrap();
    assert_eq!(
        updated,
        format!("File updated successfully at: {}", path.display())
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "two\n");
}

#[tokio::test]
async fn test_successive_edits_without_rereading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "let a = 1;\nlet b = 1;\n").unwrap();
    let files = service();

    files.read(read_req(&path)).await.unwrap();
    files.edit(edit_req(&path, "a = 1", "a = 2")).await.unwrap();
    files.edit(edit_req(&path, "b = 1", "b = 2")).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "let a = 2;\nlet b = 2;\n"
    );
}

#[tokio::test]
async fn test_path_rules() {
    let files = service();

    let err = files
        .read(ReadRequest {
            file_path: "relative/file.txt".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let dir = tempfile::tempdir().unwrap();
    let err = files
        .read(read_req(&dir.path().join("missing.txt")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::File(_)));

    let err = files.read(read_req(dir.path())).await.unwrap_err();
    assert!(matches!(err, AppError::File(_)));
}
