// shellhost Infrastructure - System Adapters
// Implements: CommandRunner, FileSystem, SearchProvider

pub mod bash_runner;
pub mod local_fs;
pub mod local_search;

pub use bash_runner::{BashRunner, ProcessGroupControl};
pub use local_fs::LocalFileSystem;
pub use local_search::LocalSearch;
