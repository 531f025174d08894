// Line filter applied to newly delivered background output

use crate::error::{AppError, Result};
use regex::Regex;

/// A compiled full-line filter
#[derive(Debug, Clone)]
pub struct LineFilter {
    regex: Regex,
}

impl LineFilter {
    /// Compile `pattern`. An empty pattern means "no filter" and yields `None`.
    pub fn compile(pattern: Option<&str>) -> Result<Option<Self>> {
        let pattern = match pattern {
            Some(p) if !p.is_empty() => p,
            _ => return Ok(None),
        };
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| AppError::validation(format!("Invalid filter regex: {}", e)))?;
        Ok(Some(Self { regex }))
    }

    /// Keep lines that match in full.
    ///
    /// One trailing newline is preserved iff at least one line is kept.
    pub fn apply(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };

        let kept: Vec<&str> = body
            .split('\n')
            .filter(|line| self.regex.is_match(line))
            .collect();
        if kept.is_empty() {
            return String::new();
        }

        let mut result = kept.join("\n");
        if trailing_newline {
            result.push('\n');
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(pattern: &str) -> LineFilter {
        LineFilter::compile(Some(pattern)).unwrap().unwrap()
    }

    #[test]
    fn test_empty_pattern_is_no_filter() {
        assert!(LineFilter::compile(Some("")).unwrap().is_none());
        assert!(LineFilter::compile(None).unwrap().is_none());
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let err = LineFilter::compile(Some("(unclosed")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("Invalid filter regex"));
    }

    #[test]
    fn test_full_line_match() {
        let f = filter("ERROR.*");
        assert_eq!(
            f.apply("ERROR one\ninfo ERROR two\nERROR three\n"),
            "ERROR one\nERROR three\n"
        );
    }

    #[test]
    fn test_trailing_newline_only_when_non_empty() {
        let f = filter("nomatch");
        assert_eq!(f.apply("a\nb\n"), "");

        let f = filter("b");
        assert_eq!(f.apply("a\nb"), "b");
        assert_eq!(f.apply("a\nb\n"), "b\n");
    }

    #[test]
    fn test_match_all_is_identity_and_match_none_is_empty() {
        let input = "first line\nsecond line\n\nlast\n";
        assert_eq!(filter(".*").apply(input), input);
        assert_eq!(filter("zzz").apply(input), "");

        // Blank-only slices survive a match-all filter
        assert_eq!(filter(".*").apply("\n"), "\n");
        assert_eq!(filter(".*").apply("\n\n"), "\n\n");
        assert_eq!(filter("x").apply("\n"), "");
    }
}
