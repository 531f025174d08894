// Text formatting helpers shared by the file tools

use crate::application::constants::MAX_LINE_CHARS;

/// Format lines like `cat -n`, numbering from `start_line`.
///
/// The number column is at least 6 wide and grows with the largest line
/// number. Lines longer than `MAX_LINE_CHARS` characters are truncated.
pub fn cat_n(lines: &[&str], start_line: usize) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let width = 6.max((start_line + lines.len()).to_string().len());
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = match line.char_indices().nth(MAX_LINE_CHARS) {
                Some((cut, _)) => &line[..cut],
                None => line,
            };
            format!("{:>width$}\u{2192}{}", start_line + i, line, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 1-indexed inclusive range of `new_lines` that differs from `old_lines`,
/// widened by `context` lines on each side and clamped to `new_lines`.
pub fn changed_range(old_lines: &[&str], new_lines: &[&str], context: usize) -> (usize, usize) {
    if new_lines.is_empty() {
        return (1, 0);
    }

    let prefix = old_lines
        .iter()
        .zip(new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old_lines.len().min(new_lines.len()) - prefix;
    let suffix = old_lines
        .iter()
        .rev()
        .zip(new_lines.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let first_changed = prefix + 1;
    // A pure deletion leaves no changed line; anchor on the line after the gap
    let last_changed = (new_lines.len() - suffix).max(first_changed.min(new_lines.len()));

    let start = first_changed.saturating_sub(context).max(1);
    let end = (last_changed + context).min(new_lines.len());
    (start.min(end), end)
}
