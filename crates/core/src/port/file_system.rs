// File System Port
// Line-oriented file component consumed by the file tools

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Contents of a file together with the modification time observed when reading it
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub content: Vec<u8>,
    pub modified: SystemTime,
}

/// File access errors
#[derive(Error, Debug)]
pub enum FileError {
    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is a directory, not a file: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("File content ({size} bytes) exceeds maximum allowed size ({limit} bytes). Please use offset and limit parameters to read specific portions of the file, or use the Grep tool to search for specific content.")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Cannot access file {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl FileError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// File System trait
///
/// Implementations:
/// - LocalFileSystem: tokio::fs backed (infra-system)
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Current modification time, `None` if nothing exists at `path`
    async fn modified(&self, path: &Path) -> Result<Option<SystemTime>, FileError>;

    /// Read a regular file no larger than `max_size` bytes
    ///
    /// # Errors
    /// - FileError::NotFound, FileError::IsDirectory, FileError::TooLarge, FileError::Io
    async fn read(&self, path: &Path, max_size: u64) -> Result<FileSnapshot, FileError>;

    /// Write `content`, creating parent directories. Returns the new modification time.
    async fn write(&self, path: &Path, content: &[u8]) -> Result<SystemTime, FileError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory file table with a logical clock.
    ///
    /// Every write advances the clock by one second, so modification times
    /// are strictly increasing.
    pub struct InMemoryFileSystem {
        files: Mutex<HashMap<PathBuf, FileSnapshot>>,
        dirs: Mutex<HashSet<PathBuf>>,
        clock: Mutex<SystemTime>,
    }

    impl InMemoryFileSystem {
        pub fn new() -> Self {
            Self {
                files: Mutex::new(HashMap::new()),
                dirs: Mutex::new(HashSet::new()),
                clock: Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            }
        }

        fn tick(&self) -> SystemTime {
            let mut clock = self.clock.lock().unwrap();
            *clock += Duration::from_secs(1);
            *clock
        }

        /// Simulate a change made by another process
        pub fn put(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> SystemTime {
            let modified = self.tick();
            self.files.lock().unwrap().insert(
                path.into(),
                FileSnapshot {
                    content: content.into(),
                    modified,
                },
            );
            modified
        }

        pub fn mkdir(&self, path: impl Into<PathBuf>) {
            self.dirs.lock().unwrap().insert(path.into());
        }

        pub fn contents(&self, path: &Path) -> Option<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .map(|f| String::from_utf8_lossy(&f.content).into_owned())
        }
    }

    impl Default for InMemoryFileSystem {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FileSystem for InMemoryFileSystem {
        async fn modified(&self, path: &Path) -> Result<Option<SystemTime>, FileError> {
            Ok(self.files.lock().unwrap().get(path).map(|f| f.modified))
        }

        async fn read(&self, path: &Path, max_size: u64) -> Result<FileSnapshot, FileError> {
            if self.dirs.lock().unwrap().contains(path) {
                return Err(FileError::IsDirectory(path.to_path_buf()));
            }
            let snapshot = self
                .files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| FileError::NotFound(path.to_path_buf()))?;
            let size = snapshot.content.len() as u64;
            if size > max_size {
                return Err(FileError::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit: max_size,
                });
            }
            Ok(snapshot)
        }

        async fn write(&self, path: &Path, content: &[u8]) -> Result<SystemTime, FileError> {
            Ok(self.put(path, content.to_vec()))
        }
    }
}
