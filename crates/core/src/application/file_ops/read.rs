// Read Use Case

use crate::application::constants::{DEFAULT_READ_LINES, MAX_FILE_SIZE};
use crate::application::constraints::{cap_output_size, OutputContext};
use crate::application::file_guard::FileMutationGuard;
use crate::application::format::cat_n;
use crate::error::Result;
use crate::port::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const EMPTY_FILE_WARNING: &str =
    "<system-reminder>Warning: the file exists but the contents are empty.</system-reminder>";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadRequest {
    pub file_path: String,
    /// 1-based line to start from
    #[serde(default)]
    pub offset: Option<usize>,
    /// Number of lines to return
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Execute read use case
pub async fn execute(
    fs: &dyn FileSystem,
    guard: &FileMutationGuard,
    path: &Path,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Result<String> {
    let snapshot = fs.read(path, MAX_FILE_SIZE).await?;
    guard.record_read(path, snapshot.modified);

    if snapshot.content.is_empty() {
        return Ok(EMPTY_FILE_WARNING.to_string());
    }
    if let Some(mime) = binary_mime(path, &snapshot.content) {
        return Ok(format!(
            "[Binary file: {} ({}), {} bytes]",
            path.display(),
            mime,
            snapshot.content.len()
        ));
    }

    let text = String::from_utf8_lossy(&snapshot.content);
    let lines: Vec<&str> = text.split('\n').collect();
    let total = lines.len();
    let offset = offset.filter(|o| *o > 0);
    let limit = limit.filter(|l| *l > 0);

    let (start, end) = line_range(total, offset, limit);
    if offset.is_some() && start > total {
        return Ok(format!(
            "<system-reminder>Warning: the file exists but is shorter than the provided offset ({}). The file has {} lines.</system-reminder>",
            start, total
        ));
    }

    let result = cat_n(&lines[start - 1..end], start);
    cap_output_size(&result, OutputContext::Read)?;
    Ok(result)
}

/// 1-based inclusive window of lines to show
fn line_range(total: usize, offset: Option<usize>, limit: Option<usize>) -> (usize, usize) {
    let start = offset.unwrap_or(1);
    let end = match (offset, limit) {
        (_, Some(limit)) => (start + limit - 1).min(total),
        (None, None) => total.min(DEFAULT_READ_LINES),
        (Some(_), None) => total,
    };
    (start, end)
}

/// Mime type to report when the content should not be rendered as text
fn binary_mime(path: &Path, content: &[u8]) -> Option<String> {
    let guess = mime_guess::from_path(path).first();
    if let Some(mime) = &guess {
        if mime.type_() == mime_guess::mime::IMAGE || mime.type_() == mime_guess::mime::AUDIO {
            return Some(mime.to_string());
        }
    }
    if content.contains(&0) {
        return Some(
            guess
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        );
    }
    None
}
