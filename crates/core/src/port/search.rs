// Search Port
// File-name globbing and full-text search (external search binary)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("No files were searched. This usually means ripgrep applied a filter that excluded all files.")]
    NoFilesSearched,

    #[error("rg exited with code {code}:\n{output}")]
    ExitCode { code: i32, output: String },

    #[error("Failed to execute rg: {0}")]
    Spawn(String),

    #[error("{0}")]
    Io(String),
}

/// A file matched by a glob, relative to the search root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatch {
    pub path: String,
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
pub struct GlobQuery {
    pub pattern: String,
    pub root: PathBuf,
}

/// Grep output modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrepOutputMode {
    Content,
    #[default]
    FilesWithMatches,
    Count,
}

#[derive(Debug, Clone, Default)]
pub struct GrepQuery {
    pub pattern: String,
    pub path: Option<PathBuf>,
    pub glob: Option<String>,
    pub file_type: Option<String>,
    pub output_mode: GrepOutputMode,
    pub case_insensitive: bool,
    pub multiline: bool,
    pub line_numbers: bool,
    pub after: u32,
    pub before: u32,
    pub context: u32,
    pub head_limit: usize,
}

/// Search Provider trait
///
/// Implementations:
/// - LocalSearch: walkdir + globset, ripgrep (infra-system)
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Files under `query.root` matching the glob
    async fn glob(&self, query: &GlobQuery) -> Result<Vec<GlobMatch>, SearchError>;

    /// Raw search output; empty when nothing matched
    async fn grep(&self, query: &GrepQuery) -> Result<String, SearchError>;
}
