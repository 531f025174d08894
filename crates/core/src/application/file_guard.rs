// File Mutation Guard - optimistic concurrency for edit/write

use crate::domain::DomainError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

/// Kind of mutation being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Whole-file write; may create a file that does not exist yet
    Write,
    /// In-place edit; always requires a prior read
    Edit,
}

/// Tracks the modification time observed at the last read of each path.
///
/// Keys are canonical absolute paths. Entries are overwritten on every
/// successful read or mutation and never deleted.
#[derive(Debug, Default)]
pub struct FileMutationGuard {
    reads: RwLock<HashMap<PathBuf, SystemTime>>,
}

impl FileMutationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `modified` as the last observed state of `path`
    pub fn record_read(&self, path: &Path, modified: SystemTime) {
        self.reads
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_path_buf(), modified);
    }

    /// Last recorded read time for `path`
    pub fn last_read(&self, path: &Path) -> Option<SystemTime> {
        self.reads
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .copied()
    }

    pub fn was_read(&self, path: &Path) -> bool {
        self.last_read(path).is_some()
    }

    /// Decide whether a mutation may proceed.
    ///
    /// `on_disk` is the file's current modification time, `None` if it does
    /// not exist. The caller stats the file; no I/O happens under the lock.
    pub fn check_mutation(
        &self,
        path: &Path,
        on_disk: Option<SystemTime>,
        kind: MutationKind,
    ) -> Result<(), DomainError> {
        let recorded = self.last_read(path);

        match (recorded, on_disk) {
            (None, None) if kind == MutationKind::Write => Ok(()),
            (None, _) => Err(DomainError::NotRead(path.to_path_buf())),
            (Some(read_at), Some(modified)) if modified > read_at => {
                Err(DomainError::ModifiedSinceRead(path.to_path_buf()))
            }
            (Some(_), _) => Ok(()),
        }
    }
}
