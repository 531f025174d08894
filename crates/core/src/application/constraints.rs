// Output caps applied to every tool result

use crate::application::constants::{CHARS_PER_TOKEN, MAX_OUTPUT_SIZE, MAX_RESULT_LINES};
use crate::error::{AppError, Result};

/// Which tool produced the output; selects the remediation hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputContext {
    Read,
    Write,
    Edit,
    Grep,
    Glob,
    Bash,
    Other,
}

impl OutputContext {
    fn suggestion(self) -> &'static str {
        match self {
            OutputContext::Read => "Use the offset and limit parameters to read specific portions of the file, or use the Grep tool to search for specific content.",
            OutputContext::Write => "Consider breaking the file into smaller chunks.",
            OutputContext::Edit => "Consider editing smaller sections of the file.",
            OutputContext::Grep => "Consider using the head_limit parameter to restrict results, adding more specific patterns, or using glob/type filters to narrow the search.",
            OutputContext::Glob => "Consider using more specific glob patterns to narrow the search scope.",
            OutputContext::Bash => "Consider using background execution with shell output polling to stream results, or redirect output to a file and read specific portions.",
            OutputContext::Other => "Consider breaking down the operation into smaller parts or using more specific parameters to limit output.",
        }
    }
}

/// Reject output above the size budget
pub fn cap_output_size(output: &str, context: OutputContext) -> Result<()> {
    if output.len() <= MAX_OUTPUT_SIZE {
        return Ok(());
    }
    Err(AppError::OutputTooLarge(format!(
        "Output ({} tokens) exceeds maximum allowed size ({} tokens). {}",
        output.len() / CHARS_PER_TOKEN,
        MAX_OUTPUT_SIZE / CHARS_PER_TOKEN,
        context.suggestion()
    )))
}

/// Truncate to at most `MAX_RESULT_LINES` lines, keeping whole lines only
pub fn cap_line_count(text: &str) -> &str {
    cap_lines(text, MAX_RESULT_LINES)
}

fn cap_lines(text: &str, max_lines: usize) -> &str {
    if max_lines == 0 {
        return "";
    }
    match text.match_indices('\n').nth(max_lines - 1) {
        // Keep the Nth newline so the last line stays complete
        Some((idx, _)) => &text[..=idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_output_size_within_limit() {
        assert!(cap_output_size("small", OutputContext::Read).is_ok());
        assert!(cap_output_size(&"a".repeat(MAX_OUTPUT_SIZE), OutputContext::Read).is_ok());
    }

    #[test]
    fn test_cap_output_size_hint_depends_on_context() {
        let big = "a".repeat(MAX_OUTPUT_SIZE + 1);

        let err = cap_output_size(&big, OutputContext::Grep).unwrap_err().to_string();
        assert!(err.contains("25000 tokens"));
        assert!(err.contains("head_limit"));

        let err = cap_output_size(&big, OutputContext::Bash).unwrap_err().to_string();
        assert!(err.contains("background execution"));
    }

    #[test]
    fn test_cap_lines_keeps_whole_lines() {
        assert_eq!(cap_lines("a\nb\nc\nd", 2), "a\nb\n");
        assert_eq!(cap_lines("a\nb\n", 2), "a\nb\n");
        assert_eq!(cap_lines("a\nb", 5), "a\nb");
        assert_eq!(cap_lines("", 5), "");
    }

    #[test]
    fn test_cap_line_count_default_limit() {
        let text: String = (0..1500).map(|i| format!("line{}\n", i)).collect();
        let capped = cap_line_count(&text);
        assert_eq!(capped.lines().count(), MAX_RESULT_LINES);
        assert!(capped.ends_with("line999\n"));
    }
}
