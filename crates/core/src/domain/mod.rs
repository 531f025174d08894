// Domain Layer - Pure state and entities

pub mod error;
pub mod execution;
pub mod output_buffer;

// Re-exports
pub use error::DomainError;
pub use execution::{
    BackgroundExecution, ExecutionId, ExecutionStatus, ExitOutcome, EXECUTION_ID_PREFIX,
};
pub use output_buffer::OutputBuffer;
