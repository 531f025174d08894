// Edit Use Case

use crate::application::constants::{EDIT_SNIPPET_CONTEXT, MAX_FILE_SIZE};
use crate::application::constraints::{cap_output_size, OutputContext};
use crate::application::file_guard::{FileMutationGuard, MutationKind};
use crate::application::format::{cat_n, changed_range};
use crate::error::{AppError, Result};
use crate::port::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditRequest {
    pub file_path: String,
    pub old_string: String,
    pub new_string: String,
    #[serde(default)]
    pub replace_all: bool,
}

/// A single string replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old_string: String,
    pub new_string: String,
    pub replace_all: bool,
}

impl From<&EditRequest> for Replacement {
    fn from(req: &EditRequest) -> Self {
        Self {
            old_string: req.old_string.clone(),
            new_string: req.new_string.clone(),
            replace_all: req.replace_all,
        }
    }
}

pub fn validate_edits(edits: &[Replacement]) -> Result<()> {
    if edits.is_empty() {
        return Err(AppError::validation("at least one edit is required"));
    }
    if edits.iter().any(|e| e.old_string == e.new_string) {
        return Err(AppError::validation(
            "old_string and new_string are the same - no changes to make",
        ));
    }
    Ok(())
}

/// Apply one replacement to `content`.
///
/// `previous_new_strings` are the replacement texts of edits already applied
/// in the same batch; matching inside one of them is a conflict.
pub fn apply_edit_to_content(
    content: &str,
    edit: &Replacement,
    previous_new_strings: &[&str],
) -> Result<String> {
    let old = edit.old_string.as_str();
    if old.is_empty() {
        return Err(AppError::validation("old_string cannot be empty"));
    }
    if previous_new_strings.iter().any(|prev| prev.contains(old)) {
        return Err(AppError::validation(
            "edit conflict detected: the string to replace is part of a previous edit's replacement",
        ));
    }

    let count = content.matches(old).count();
    if count == 0 {
        return Err(AppError::validation(format!(
            "String to replace not found in file.\nString: {}",
            old
        )));
    }
    if edit.replace_all {
        return Ok(content.replace(old, &edit.new_string));
    }
    if count > 1 {
        return Err(AppError::validation(format!(
            "Found {} matches of the string to replace, but replace_all is false. To replace all occurrences, set replace_all to true. To replace only one occurrence, provide more context to uniquely identify the instance.\nString: {}",
            count, old
        )));
    }
    Ok(content.replacen(old, &edit.new_string, 1))
}

/// Apply `edits` in order, returning the new content
pub fn apply_edits(content: &str, edits: &[Replacement]) -> Result<String> {
    validate_edits(edits)?;
    let mut current = content.to_string();
    let mut applied: Vec<&str> = Vec::with_capacity(edits.len());
    for edit in edits {
        current = apply_edit_to_content(&current, edit, &applied)?;
        applied.push(&edit.new_string);
    }
    if current == content {
        return Err(AppError::validation(
            "the original content matches the edited content - no changes to make",
        ));
    }
    Ok(current)
}

/// Execute edit use case
pub async fn execute(
    fs: &dyn FileSystem,
    guard: &FileMutationGuard,
    path: &Path,
    edit: Replacement,
) -> Result<String> {
    validate_edits(std::slice::from_ref(&edit))?;

    let on_disk = fs.modified(path).await?;
    guard.check_mutation(path, on_disk, MutationKind::Edit)?;

    let snapshot = fs.read(path, MAX_FILE_SIZE).await?;
    let old_content = String::from_utf8(snapshot.content).map_err(|_| {
        AppError::validation(format!("Cannot edit {}: file is not valid UTF-8", path.display()))
    })?;
    let new_content = apply_edits(&old_content, std::slice::from_ref(&edit))?;

    let modified = fs.write(path, new_content.as_bytes()).await?;
    guard.record_read(path, modified);
    debug!(path = %path.display(), replace_all = edit.replace_all, "File edited");

    if edit.replace_all {
        return Ok(format!(
            "The file {} has been updated. All occurrences of '{}' were successfully replaced with '{}'.",
            path.display(),
            edit.old_string,
            edit.new_string
        ));
    }

    let old_lines: Vec<&str> = old_content.split('\n').collect();
    let new_lines: Vec<&str> = new_content.split('\n').collect();
    let (start, end) = changed_range(&old_lines, &new_lines, EDIT_SNIPPET_CONTEXT);
    let snippet = if end >= start {
        cat_n(&new_lines[start - 1..end], start)
    } else {
        String::new()
    };

    let message = format!(
        "The file {} has been updated. Here's the result of running `cat -n` on a snippet of the edited file:\n{}",
        path.display(),
        snippet
    );
    cap_output_size(&message, OutputContext::Edit)?;
    Ok(message)
}
