// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod constraints;
pub mod file_guard;
pub mod file_ops;
pub mod filter;
pub mod format;
pub mod registry;
pub mod search;
pub mod shell;

// Re-exports
pub use file_guard::{FileMutationGuard, MutationKind};
pub use file_ops::{EditRequest, FileService, ReadRequest, WriteRequest};
pub use registry::{ExecutionSummary, OutputDelta, ProcessRegistry};
pub use search::{GlobRequest, GrepRequest, SearchService};
pub use shell::{ExecRequest, ExecResult, ShellService};
