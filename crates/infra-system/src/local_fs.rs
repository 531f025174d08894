// Local filesystem adapter
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

use shellhost_core::port::{FileError, FileSnapshot, FileSystem};

/// tokio::fs backed FileSystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn modified(&self, path: &Path) -> Result<Option<SystemTime>, FileError> {
        match fs::metadata(path).await {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| FileError::io(path, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FileError::io(path, e)),
        }
    }

    async fn read(&self, path: &Path, max_size: u64) -> Result<FileSnapshot, FileError> {
        let meta = match fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FileError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(FileError::io(path, e)),
        };
        if meta.is_dir() {
            return Err(FileError::IsDirectory(path.to_path_buf()));
        }
        if meta.len() > max_size {
            return Err(FileError::TooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                limit: max_size,
            });
        }

        let modified = meta.modified().map_err(|e| FileError::io(path, e))?;
        let content = fs::read(path).await.map_err(|e| FileError::io(path, e))?;
        Ok(FileSnapshot { content, modified })
    }

    async fn write(&self, path: &Path, content: &[u8]) -> Result<SystemTime, FileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::io(parent, e))?;
        }
        fs::write(path, content)
            .await
            .map_err(|e| FileError::io(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote file");

        let meta = fs::metadata(path)
            .await
            .map_err(|e| FileError::io(path, e))?;
        meta.modified().map_err(|e| FileError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.txt");
        let fs = LocalFileSystem::new();

        assert_eq!(fs.modified(&path).await.unwrap(), None);
        assert!(matches!(
            fs.read(&path, 1024).await,
            Err(FileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_and_size_limit() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFileSystem::new();
        assert!(matches!(
            fs.read(dir.path(), 1024).await,
            Err(FileError::IsDirectory(_))
        ));

        let path = dir.path().join("big.txt");
        std::fs::write(&path, vec![b'x'; 100]).unwrap();
        assert!(matches!(
            fs.read(&path, 99).await,
            Err(FileError::TooLarge { size: 100, limit: 99, .. })
        ));
        assert_eq!(fs.read(&path, 100).await.unwrap().content.len(), 100);
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_reports_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");
        let fs = LocalFileSystem::new();

        let written = fs.write(&path, b"hello").await.unwrap();
        let snapshot = fs.read(&path, 1024).await.unwrap();
        assert_eq!(snapshot.content, b"hello");
        assert_eq!(snapshot.modified, written);
        assert_eq!(fs.modified(&path).await.unwrap(), Some(written));
    }
}
