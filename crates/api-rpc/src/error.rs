//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use shellhost_core::domain::DomainError;
use shellhost_core::error::AppError;
use shellhost_core::port::{ExecutionError, FileError, SearchError};

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const TIMEOUT: i32 = 4004;
    pub const OUTPUT_TOO_LARGE: i32 = 4005;
    pub const COMMAND_FAILED: i32 = 4006;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Numeric code for an application error
pub fn error_code(err: &AppError) -> i32 {
    match err {
        AppError::Validation(_) | AppError::Serialization(_) => code::VALIDATION_ERROR,
        AppError::Domain(e) => match e {
            DomainError::ExecutionNotFound(_) => code::NOT_FOUND,
            DomainError::AlreadyCompleted(_)
            | DomainError::NotRead(_)
            | DomainError::ModifiedSinceRead(_) => code::CONFLICT,
            DomainError::KillFailed { .. } => code::SYSTEM_ERROR,
        },
        AppError::Execution(ExecutionError::Timeout(_)) => code::TIMEOUT,
        AppError::Execution(_) => code::SYSTEM_ERROR,
        AppError::CommandFailed { .. } => code::COMMAND_FAILED,
        AppError::File(e) => match e {
            FileError::NotFound(_) => code::NOT_FOUND,
            FileError::IsDirectory(_) => code::VALIDATION_ERROR,
            FileError::TooLarge { .. } => code::OUTPUT_TOO_LARGE,
            FileError::Io { .. } => code::SYSTEM_ERROR,
        },
        AppError::OutputTooLarge(_) => code::OUTPUT_TOO_LARGE,
        AppError::Search(e) => match e {
            SearchError::InvalidPattern(_) | SearchError::NoFilesSearched => {
                code::VALIDATION_ERROR
            }
            SearchError::ExitCode { .. } | SearchError::Spawn(_) | SearchError::Io(_) => {
                code::SYSTEM_ERROR
            }
        },
        AppError::Io(_) => code::SYSTEM_ERROR,
        AppError::Internal(_) => code::INTERNAL_ERROR,
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = error_code(&err);
    match &err {
        // Callers get the exit code without parsing the message
        AppError::CommandFailed { code: exit_code, .. } => ErrorObjectOwned::owned(
            code,
            err.to_string(),
            Some(serde_json::json!({ "exit_code": exit_code })),
        ),
        _ => ErrorObjectOwned::owned(code, err.to_string(), None::<()>),
    }
}
