// Search Service - glob and grep use cases

use crate::application::constraints::{cap_line_count, cap_output_size, OutputContext};
use crate::application::file_ops::resolve_path;
use crate::error::{AppError, Result};
use crate::port::{GlobQuery, GrepOutputMode, GrepQuery, SearchProvider};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub const NO_FILES_FOUND: &str = "No files found";
pub const NO_MATCHES_FOUND: &str = "No matches found";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobRequest {
    pub pattern: String,
    /// Directory to search; the working directory when absent
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrepRequest {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub glob: Option<String>,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub output_mode: GrepOutputMode,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default)]
    pub line_numbers: bool,
    #[serde(default)]
    pub after: u32,
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub context: u32,
    #[serde(default)]
    pub head_limit: usize,
}

/// Search Service
pub struct SearchService {
    provider: Arc<dyn SearchProvider>,
    workdir: PathBuf,
}

impl SearchService {
    pub fn new(provider: Arc<dyn SearchProvider>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            workdir: workdir.into(),
        }
    }

    /// Files matching `pattern`, newest first
    pub async fn glob(&self, req: GlobRequest) -> Result<String> {
        if req.pattern.is_empty() || req.pattern.contains('\0') {
            return Err(AppError::validation("Invalid glob pattern."));
        }
        let root = match req.path.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => resolve_path(p)?,
            None => self.workdir.clone(),
        };

        let mut matches = self
            .provider
            .glob(&GlobQuery {
                pattern: req.pattern,
                root,
            })
            .await?;
        if matches.is_empty() {
            return Ok(NO_FILES_FOUND.to_string());
        }
        matches.sort_by(|a, b| b.modified.cmp(&a.modified));

        let listing = matches
            .iter()
            .map(|m| m.path.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let result = cap_line_count(&listing);
        cap_output_size(result, OutputContext::Glob)?;
        Ok(result.to_string())
    }

    /// Full-text search
    pub async fn grep(&self, req: GrepRequest) -> Result<String> {
        if req.pattern.is_empty() {
            return Err(AppError::validation("pattern is required."));
        }
        let path = match req.path.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => Some(resolve_path(p)?),
            None => None,
        };

        let query = GrepQuery {
            pattern: req.pattern,
            path,
            glob: req.glob.filter(|g| !g.is_empty()),
            file_type: req.file_type.filter(|t| !t.is_empty()),
            output_mode: req.output_mode,
            case_insensitive: req.case_insensitive,
            multiline: req.multiline,
            line_numbers: req.line_numbers,
            after: req.after,
            before: req.before,
            context: req.context,
            head_limit: req.head_limit,
        };
        let raw = self.provider.grep(&query).await?;

        let limited = apply_head_limit(&raw, query.head_limit);
        let trimmed = limited.trim();
        if trimmed.is_empty() {
            return Ok(NO_MATCHES_FOUND.to_string());
        }
        let result = cap_line_count(trimmed);
        cap_output_size(result, OutputContext::Grep)?;
        Ok(result.to_string())
    }
}

/// First `limit` lines of the trimmed output; 0 means unlimited
fn apply_head_limit(output: &str, limit: usize) -> String {
    if limit == 0 {
        return output.to_string();
    }
    output
        .trim()
        .split('\n')
        .take(limit)
        .collect::<Vec<_>>()
        .join("\n")
}
