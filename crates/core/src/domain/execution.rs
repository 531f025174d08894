// Background Execution Domain Model

use crate::domain::OutputBuffer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tokio::sync::Notify;

/// Opaque background execution identifier (`shell_<n>`)
pub type ExecutionId = String;

pub const EXECUTION_ID_PREFIX: &str = "shell_";

/// Observable status of a background execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal outcome of a process, written once by the monitoring task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExitOutcome {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Wait failure, distinct from a nonzero exit code
    pub error: Option<String>,
}

impl ExitOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            error: None,
        }
    }

    pub fn errored(error: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0) && self.error.is_none()
    }
}

/// One spawned background process: its output sinks and completion signal.
///
/// Read cursors are not stored here; they belong to the registry entry so
/// that advancing them is serialized by the registry's write lock.
#[derive(Debug)]
pub struct BackgroundExecution {
    id: ExecutionId,
    command: String,
    description: Option<String>,
    started_at: DateTime<Utc>,
    stdout: Arc<OutputBuffer>,
    stderr: Arc<OutputBuffer>,
    outcome: OnceLock<ExitOutcome>,
    completed: Notify,
}

impl BackgroundExecution {
    pub fn new(
        id: ExecutionId,
        command: impl Into<String>,
        description: Option<String>,
        started_at: DateTime<Utc>,
        stdout: Arc<OutputBuffer>,
        stderr: Arc<OutputBuffer>,
    ) -> Self {
        Self {
            id,
            command: command.into(),
            description,
            started_at,
            stdout,
            stderr,
            outcome: OnceLock::new(),
            completed: Notify::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stdout(&self) -> &Arc<OutputBuffer> {
        &self.stdout
    }

    pub fn stderr(&self) -> &Arc<OutputBuffer> {
        &self.stderr
    }

    /// Fire the completion signal. Returns `false` if it had already fired.
    pub fn complete(&self, outcome: ExitOutcome) -> bool {
        if self.outcome.set(outcome).is_err() {
            return false;
        }
        self.completed.notify_waiters();
        true
    }

    /// Non-blocking check of the completion signal
    pub fn outcome(&self) -> Option<&ExitOutcome> {
        self.outcome.get()
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.get().is_some()
    }

    pub fn status(&self) -> ExecutionStatus {
        match self.outcome.get() {
            None => ExecutionStatus::Running,
            Some(outcome) if outcome.is_success() => ExecutionStatus::Completed,
            Some(_) => ExecutionStatus::Failed,
        }
    }

    /// Wait until the completion signal fires
    pub async fn wait(&self) -> &ExitOutcome {
        loop {
            let notified = self.completed.notified();
            tokio::pin!(notified);
            // Register before re-checking so a concurrent `complete` is not missed
            notified.as_mut().enable();
            if let Some(outcome) = self.outcome.get() {
                return outcome;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn execution() -> BackgroundExecution {
        BackgroundExecution::new(
            "shell_1".to_string(),
            "echo hi",
            None,
            Utc::now(),
            Arc::new(OutputBuffer::new()),
            Arc::new(OutputBuffer::new()),
        )
    }

    #[test]
    fn test_completion_fires_once() {
        let exec = execution();
        assert_eq!(exec.status(), ExecutionStatus::Running);

        assert!(exec.complete(ExitOutcome::exited(0)));
        assert!(!exec.complete(ExitOutcome::exited(3)));

        assert_eq!(exec.status(), ExecutionStatus::Completed);
        assert_eq!(exec.outcome().and_then(|o| o.exit_code), Some(0));
    }

    #[test]
    fn test_status_derivation() {
        let failed = execution();
        failed.complete(ExitOutcome::exited(2));
        assert_eq!(failed.status(), ExecutionStatus::Failed);

        let signalled = execution();
        signalled.complete(ExitOutcome::default());
        assert_eq!(signalled.status(), ExecutionStatus::Failed);

        let errored = execution();
        errored.complete(ExitOutcome::errored("wait failed"));
        assert_eq!(errored.status(), ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn test_wait_observes_completion() {
        let exec = Arc::new(execution());

        let waiter = {
            let exec = Arc::clone(&exec);
            tokio::spawn(async move { exec.wait().await.clone() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        exec.complete(ExitOutcome::exited(7));

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.exit_code, Some(7));
    }

    #[tokio::test]
    async fn test_wait_after_completion_returns_immediately() {
        let exec = execution();
        exec.complete(ExitOutcome::exited(0));
        assert!(exec.wait().await.is_success());
    }
}
