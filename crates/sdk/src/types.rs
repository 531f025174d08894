//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from api-rpc crate.

use serde::{Deserialize, Serialize};

/// Request to run a command
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecRequest {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Milliseconds; foreground only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    pub run_in_background: bool,
}

impl ExecRequest {
    pub fn foreground(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn background(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            run_in_background: true,
            ..Default::default()
        }
    }
}

/// Response from exec
#[derive(Debug, Clone, Deserialize)]
pub struct ExecResponse {
    pub output: String,
    /// Present for background runs
    #[serde(default)]
    pub shell_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OutputRequest {
    pub shell_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Output produced since the previous poll
#[derive(Debug, Clone, Deserialize)]
pub struct OutputResponse {
    pub shell_id: String,
    /// running | completed | failed
    pub status: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub error: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub shells: Vec<ShellInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellInfo {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct KillRequest {
    pub shell_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KillResponse {
    pub message: String,
    pub shell_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadRequest {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadResponse {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WriteRequest {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditRequest {
    pub file_path: String,
    pub old_string: String,
    pub new_string: String,
    pub replace_all: bool,
}

/// Response from write and edit
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GlobRequest {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobResponse {
    pub files: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GrepRequest {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// content | files_with_matches | count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<String>,
    #[serde(rename = "-i")]
    pub case_insensitive: bool,
    pub multiline: bool,
    #[serde(rename = "-n")]
    pub line_numbers: bool,
    #[serde(rename = "-A")]
    pub after: u32,
    #[serde(rename = "-B")]
    pub before: u32,
    #[serde(rename = "-C")]
    pub context: u32,
    pub head_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrepResponse {
    pub results: String,
}
