// Local search adapter: walkdir + globset for glob, ripgrep for grep
use async_trait::async_trait;
use globset::GlobBuilder;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use shellhost_core::port::{
    GlobMatch, GlobQuery, GrepOutputMode, GrepQuery, SearchError, SearchProvider,
};

pub struct LocalSearch {
    rg_path: PathBuf,
    workdir: PathBuf,
}

impl LocalSearch {
    /// `workdir` is where ripgrep runs when the query has no path
    pub fn new(rg_path: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            rg_path: rg_path.into(),
            workdir: workdir.into(),
        }
    }
}

/// Walk `root` and collect files whose relative path matches `pattern`
fn walk_matches(root: &Path, pattern: &str) -> Result<Vec<GlobMatch>, SearchError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| SearchError::InvalidPattern(e.to_string()))?
        .compile_matcher();

    let matches = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            if !matcher.is_match(relative) {
                return None;
            }
            // Unreadable metadata: skip the file
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some(GlobMatch {
                path: relative.to_string_lossy().into_owned(),
                modified,
            })
        })
        .collect();
    Ok(matches)
}

/// ripgrep arguments for `query`; the pattern follows `--`
pub fn build_rg_args(query: &GrepQuery) -> Vec<String> {
    let mut args = Vec::new();
    match query.output_mode {
        GrepOutputMode::FilesWithMatches => args.push("--files-with-matches".to_string()),
        GrepOutputMode::Count => args.push("--count".to_string()),
        GrepOutputMode::Content => {
            // Context flags only make sense for content output
            if query.after > 0 {
                args.push(format!("-A{}", query.after));
            }
            if query.before > 0 {
                args.push(format!("-B{}", query.before));
            }
            if query.context > 0 {
                args.push(format!("-C{}", query.context));
            }
            if query.line_numbers {
                args.push("--line-number".to_string());
            }
        }
    }
    if query.case_insensitive {
        args.push("--ignore-case".to_string());
    }
    if query.multiline {
        args.push("--multiline".to_string());
        args.push("--multiline-dotall".to_string());
    }
    if let Some(file_type) = &query.file_type {
        args.push("--type".to_string());
        args.push(file_type.clone());
    }
    if let Some(glob) = &query.glob {
        args.push("--glob".to_string());
        args.push(glob.clone());
    }
    args.push("--".to_string());
    args.push(query.pattern.clone());
    if let Some(path) = &query.path {
        args.push(path.to_string_lossy().into_owned());
    }
    args
}

#[async_trait]
impl SearchProvider for LocalSearch {
    async fn glob(&self, query: &GlobQuery) -> Result<Vec<GlobMatch>, SearchError> {
        if tokio::fs::metadata(&query.root).await.is_err() {
            return Ok(Vec::new());
        }
        let root = query.root.clone();
        let pattern = query.pattern.clone();
        tokio::task::spawn_blocking(move || walk_matches(&root, &pattern))
            .await
            .map_err(|e| SearchError::Io(e.to_string()))?
    }

    async fn grep(&self, query: &GrepQuery) -> Result<String, SearchError> {
        let args = build_rg_args(query);
        debug!(rg = %self.rg_path.display(), args = ?args, "Running ripgrep");

        let output = Command::new(&self.rg_path)
            .args(&args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SearchError::Spawn(e.to_string()))?;

        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(1) => Ok(String::new()),
            Some(2) => Err(SearchError::NoFilesSearched),
            code => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                Err(SearchError::ExitCode {
                    code: code.unwrap_or(-1),
                    output: combined,
                })
            }
        }
    }
}
