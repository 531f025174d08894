// File Service - read / write / edit use cases guarded by read-before-write

pub mod edit;
pub mod path;
pub mod read;
pub mod write;

pub use edit::{EditRequest, Replacement};
pub use path::resolve_path;
pub use read::ReadRequest;
pub use write::WriteRequest;

use crate::application::file_guard::FileMutationGuard;
use crate::error::Result;
use crate::port::FileSystem;
use std::sync::Arc;

/// File Service
pub struct FileService {
    fs: Arc<dyn FileSystem>,
    guard: Arc<FileMutationGuard>,
}

impl FileService {
    pub fn new(fs: Arc<dyn FileSystem>, guard: Arc<FileMutationGuard>) -> Self {
        Self { fs, guard }
    }

    pub fn guard(&self) -> &Arc<FileMutationGuard> {
        &self.guard
    }

    /// Read a file in `cat -n` format and record the observed modification time
    pub async fn read(&self, req: ReadRequest) -> Result<String> {
        let path = resolve_path(&req.file_path)?;
        read::execute(
            self.fs.as_ref(),
            &self.guard,
            &path,
            req.offset,
            req.limit,
        )
        .await
    }

    /// Create or overwrite a file
    pub async fn write(&self, req: WriteRequest) -> Result<String> {
        let path = resolve_path(&req.file_path)?;
        write::execute(self.fs.as_ref(), &self.guard, &path, &req.content).await
    }

    /// Replace text in a file that was read before
    pub async fn edit(&self, req: EditRequest) -> Result<String> {
        let path = resolve_path(&req.file_path)?;
        edit::execute(self.fs.as_ref(), &self.guard, &path, Replacement::from(&req)).await
    }
}
