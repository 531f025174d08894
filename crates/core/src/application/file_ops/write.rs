// Write Use Case

use crate::application::file_guard::{FileMutationGuard, MutationKind};
use crate::error::Result;
use crate::port::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteRequest {
    pub file_path: String,
    pub content: String,
}

/// Execute write use case
pub async fn execute(
    fs: &dyn FileSystem,
    guard: &FileMutationGuard,
    path: &Path,
    content: &str,
) -> Result<String> {
    let on_disk = fs.modified(path).await?;
    guard.check_mutation(path, on_disk, MutationKind::Write)?;

    let modified = fs.write(path, content.as_bytes()).await?;
    guard.record_read(path, modified);
    debug!(path = %path.display(), bytes = content.len(), "File written");

    let verb = if on_disk.is_some() { "updated" } else { "created" };
    Ok(format!("File {} successfully at: {}", verb, path.display()))
}
