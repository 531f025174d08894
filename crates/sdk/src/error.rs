//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Daemon error codes the SDK gives names to
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const TIMEOUT: i32 = 4004;
    pub const OUTPUT_TOO_LARGE: i32 = 4005;
    pub const COMMAND_FAILED: i32 = 4006;
}

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error object returned by the daemon
    #[error("RPC error ({code}): {message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// Daemon error code, if the daemon answered with an error
    pub fn code(&self) -> Option<i32> {
        match self {
            SdkError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Unknown or already killed shell, or a missing file
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(code::NOT_FOUND)
    }

    /// Write or edit refused until the file is read (again)
    pub fn is_conflict(&self) -> bool {
        self.code() == Some(code::CONFLICT)
    }

    pub fn is_timeout(&self) -> bool {
        self.code() == Some(code::TIMEOUT)
    }

    /// Exit code of a foreground command that failed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SdkError::Rpc {
                code: code::COMMAND_FAILED,
                data: Some(data),
                ..
            } => data.get("exit_code")?.as_i64().map(|c| c as i32),
            _ => None,
        }
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        use jsonrpsee::core::ClientError;

        match e {
            ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
                data: call_err
                    .data()
                    .and_then(|raw| serde_json::from_str(raw.get()).ok()),
            },
            ClientError::Transport(e) => SdkError::Transport(e.to_string()),
            ClientError::RestartNeeded(_) => {
                SdkError::Connection("connection to daemon lost".to_string())
            }
            ClientError::RequestTimeout => {
                SdkError::Transport("request timed out".to_string())
            }
            ClientError::ParseError(e) => SdkError::Serialization(e),
            other => SdkError::Other(other.to_string()),
        }
    }
}
