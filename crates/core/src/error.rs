// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    #[error(transparent)]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Command exited with code {code}:\n{output}\n\nCommand: {command}")]
    CommandFailed {
        code: i32,
        output: String,
        command: String,
    },

    #[error(transparent)]
    File(#[from] crate::port::FileError),

    #[error("{0}")]
    OutputTooLarge(String),

    #[error(transparent)]
    Search(#[from] crate::port::SearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}
