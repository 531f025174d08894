// Application constants (No magic values)
use std::time::Duration;

/// Default foreground deadline (2 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Maximum foreground deadline (10 minutes)
pub const MAX_TIMEOUT_MS: u64 = 600_000;

/// Pause between sending a kill and dropping the registry entry
pub const KILL_GRACE_PERIOD: Duration = Duration::from_millis(100);

/// Hard limit on files read into memory (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Approximate characters per token used for output budgeting
pub const CHARS_PER_TOKEN: usize = 4;

/// Maximum output returned by any tool (~25k tokens)
pub const MAX_OUTPUT_SIZE: usize = 25_000 * CHARS_PER_TOKEN;

/// Maximum lines returned from glob/grep results
pub const MAX_RESULT_LINES: usize = 1000;

/// Lines shown by `read` when neither offset nor limit is given
pub const DEFAULT_READ_LINES: usize = 2000;

/// Longer lines are truncated in `read` output
pub const MAX_LINE_CHARS: usize = 2000;

/// Context lines around an edit in the returned snippet
pub const EDIT_SNIPPET_CONTEXT: usize = 2;
