// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod file_system;
pub mod search;
pub mod time_provider;

// Re-exports
pub use command_runner::{
    CommandRunner, ExecutionError, ForegroundOutput, OutputSinks, ProcessControl, RunningProcess,
};
pub use file_system::{FileError, FileSnapshot, FileSystem};
pub use search::{GlobMatch, GlobQuery, GrepOutputMode, GrepQuery, SearchError, SearchProvider};
pub use time_provider::TimeProvider;
