//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Params are named objects.

use serde::{Deserialize, Serialize};

/// shell.exec.v1 - Run a command
#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Milliseconds; foreground only
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub run_in_background: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecResponse {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_id: Option<String>,
}

/// shell.output.v1 - New output of a background shell
#[derive(Debug, Deserialize)]
pub struct OutputRequest {
    pub shell_id: String,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputResponse {
    pub shell_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stdout: String,
    pub stderr: String,
    /// RFC 3339 with nanoseconds
    pub timestamp: String,
}

/// shell.list.v1 - All known background shells
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub shells: Vec<ShellInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellInfo {
    pub id: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
}

/// shell.kill.v1 - Terminate a background shell
#[derive(Debug, Deserialize)]
pub struct KillRequest {
    pub shell_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KillResponse {
    pub message: String,
    pub shell_id: String,
}

/// fs.read.v1
#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub file_path: String,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadResponse {
    pub content: String,
}

/// fs.write.v1
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub file_path: String,
    pub content: String,
}

/// fs.edit.v1
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub file_path: String,
    pub old_string: String,
    pub new_string: String,
    #[serde(default)]
    pub replace_all: bool,
}

/// Result of fs.write.v1 and fs.edit.v1
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// search.glob.v1
#[derive(Debug, Deserialize)]
pub struct GlobRequest {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobResponse {
    pub files: String,
}

/// search.grep.v1
#[derive(Debug, Deserialize)]
pub struct GrepRequest {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub glob: Option<String>,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    /// content | files_with_matches | count
    #[serde(default)]
    pub output_mode: Option<String>,
    #[serde(default, rename = "-i")]
    pub case_insensitive: bool,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default, rename = "-n")]
    pub line_numbers: bool,
    #[serde(default, rename = "-A")]
    pub after: u32,
    #[serde(default, rename = "-B")]
    pub before: u32,
    #[serde(default, rename = "-C")]
    pub context: u32,
    #[serde(default)]
    pub head_limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrepResponse {
    pub results: String,
}
