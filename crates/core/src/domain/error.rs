// Domain Error Types

use std::path::PathBuf;
use thiserror::Error;

/// State conflicts and lookups that fail against the in-memory tables
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Background shell with ID '{0}' not found.")]
    ExecutionNotFound(String),

    #[error("Shell {0} has already completed. Cannot kill a finished process.")]
    AlreadyCompleted(String),

    #[error("Failed to kill shell {id}: {reason}")]
    KillFailed { id: String, reason: String },

    #[error("file {} has not been read yet - please read the file before modifying it", .0.display())]
    NotRead(PathBuf),

    #[error("file {} has been modified since it was last read - please read the file again before modifying it", .0.display())]
    ModifiedSinceRead(PathBuf),
}

pub type Result<T> = std::result::Result<T, DomainError>;
