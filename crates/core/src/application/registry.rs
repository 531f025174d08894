// Process Registry - shared table of background executions
//
// Locking: one RwLock guards the id -> entry map, the id counter and every
// entry's read cursors. Critical sections are in-memory bookkeeping only;
// process output accumulates in OutputBuffer under its own lock.

use crate::application::constants::KILL_GRACE_PERIOD;
use crate::application::filter::LineFilter;
use crate::domain::{
    BackgroundExecution, DomainError, ExecutionId, ExecutionStatus, EXECUTION_ID_PREFIX,
};
use crate::error::Result;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{OutputSinks, ProcessControl, TimeProvider};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Output delivered by one poll
#[derive(Debug, Clone, Serialize)]
pub struct OutputDelta {
    pub status: ExecutionStatus,
    /// Set once the execution has exited with a code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Wait failure recorded by the monitoring task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: DateTime<Utc>,
}

/// Row returned by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub id: ExecutionId,
    pub command: String,
    pub description: Option<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Default, Clone, Copy)]
struct ReadCursors {
    stdout: usize,
    stderr: usize,
}

struct RegistryEntry {
    execution: Arc<BackgroundExecution>,
    control: Option<Arc<dyn ProcessControl>>,
    cursors: ReadCursors,
    sequence: u64,
    terminating: bool,
}

struct RegistryState {
    entries: HashMap<ExecutionId, RegistryEntry>,
    next_id: u64,
}

/// Process-wide table of background executions.
///
/// Completed entries stay until process shutdown; only a successful
/// `terminate` removes an entry.
pub struct ProcessRegistry {
    state: RwLock<RegistryState>,
    time_provider: Arc<dyn TimeProvider>,
    kill_grace: Duration,
}

static GLOBAL_REGISTRY: OnceLock<Arc<ProcessRegistry>> = OnceLock::new();

impl ProcessRegistry {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                entries: HashMap::new(),
                next_id: 1,
            }),
            time_provider,
            kill_grace: KILL_GRACE_PERIOD,
        }
    }

    /// Override the pause between kill and removal
    pub fn with_kill_grace(mut self, kill_grace: Duration) -> Self {
        self.kill_grace = kill_grace;
        self
    }

    /// Process-wide default instance, created on first use
    pub fn global() -> Arc<ProcessRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(ProcessRegistry::new(Arc::new(SystemTimeProvider))))
            .clone()
    }

    // Poisoning is recovered: every critical section leaves the map consistent
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocate an id and insert a freshly spawned process
    pub fn register(
        &self,
        command: &str,
        description: Option<String>,
        sinks: OutputSinks,
        control: Option<Arc<dyn ProcessControl>>,
    ) -> Arc<BackgroundExecution> {
        let started_at = self.time_provider.now();
        let execution = {
            let mut state = self.write();
            let sequence = state.next_id;
            state.next_id += 1;

            let id = format!("{}{}", EXECUTION_ID_PREFIX, sequence);
            let execution = Arc::new(BackgroundExecution::new(
                id.clone(),
                command,
                description,
                started_at,
                sinks.stdout,
                sinks.stderr,
            ));
            state.entries.insert(
                id,
                RegistryEntry {
                    execution: execution.clone(),
                    control,
                    cursors: ReadCursors::default(),
                    sequence,
                    terminating: false,
                },
            );
            execution
        };

        info!(
            shell_id = %execution.id(),
            command = %command,
            "Registered background execution"
        );
        execution
    }

    pub fn lookup(&self, id: &str) -> std::result::Result<Arc<BackgroundExecution>, DomainError> {
        self.read()
            .entries
            .get(id)
            .map(|entry| entry.execution.clone())
            .ok_or_else(|| DomainError::ExecutionNotFound(id.to_string()))
    }

    /// Deliver output produced since the previous poll and advance the cursors.
    ///
    /// Each byte is handed to at most one caller. An invalid filter fails
    /// before the cursors move, so the poll can be retried.
    pub fn poll_output(&self, id: &str, filter: Option<&str>) -> Result<OutputDelta> {
        self.lookup(id)?;
        let filter = LineFilter::compile(filter)?;
        let timestamp = self.time_provider.now();

        let (status, outcome, stdout, stderr) = {
            let mut state = self.write();
            let entry = state
                .entries
                .get_mut(id)
                .ok_or_else(|| DomainError::ExecutionNotFound(id.to_string()))?;
            let execution = entry.execution.clone();

            // Completion fires only after both streams are drained, so the
            // signal must be observed before the lengths: a terminal status
            // then guarantees the slices below are final.
            let status = execution.status();
            let outcome = execution.outcome().cloned().unwrap_or_default();

            // Read-then-advance must stay inside one critical section
            let stdout_end = execution.stdout().len();
            let stderr_end = execution.stderr().len();
            let stdout = execution
                .stdout()
                .read_range(entry.cursors.stdout, stdout_end);
            let stderr = execution
                .stderr()
                .read_range(entry.cursors.stderr, stderr_end);
            entry.cursors.stdout = entry.cursors.stdout.max(stdout_end);
            entry.cursors.stderr = entry.cursors.stderr.max(stderr_end);
            (status, outcome, stdout, stderr)
        };

        let mut stdout = String::from_utf8_lossy(&stdout).into_owned();
        let mut stderr = String::from_utf8_lossy(&stderr).into_owned();
        if let Some(filter) = &filter {
            stdout = filter.apply(&stdout);
            stderr = filter.apply(&stderr);
        }

        debug!(
            shell_id = %id,
            status = %status,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Polled background output"
        );

        Ok(OutputDelta {
            status,
            exit_code: outcome.exit_code,
            error: outcome.error,
            stdout,
            stderr,
            timestamp,
        })
    }

    /// Kill a running execution and drop its entry.
    ///
    /// The entry is marked terminating under the write lock, so of two racing
    /// calls only one proceeds; the other sees `ExecutionNotFound`.
    pub async fn terminate(
        &self,
        id: &str,
    ) -> std::result::Result<Arc<BackgroundExecution>, DomainError> {
        let (execution, control) = {
            let mut state = self.write();
            let entry = state
                .entries
                .get_mut(id)
                .filter(|entry| !entry.terminating)
                .ok_or_else(|| DomainError::ExecutionNotFound(id.to_string()))?;
            if entry.execution.is_completed() {
                return Err(DomainError::AlreadyCompleted(id.to_string()));
            }
            entry.terminating = true;
            (entry.execution.clone(), entry.control.clone())
        };

        match control {
            Some(control) => {
                if let Err(e) = control.kill() {
                    warn!(shell_id = %id, error = %e, "Failed to kill background execution");
                    if let Some(entry) = self.write().entries.get_mut(id) {
                        entry.terminating = false;
                    }
                    return Err(DomainError::KillFailed {
                        id: id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
            None => debug!(shell_id = %id, "No process handle; treating kill as a no-op"),
        }

        // Give the OS time to reap the process before forgetting it
        tokio::time::sleep(self.kill_grace).await;
        self.write().entries.remove(id);

        info!(shell_id = %id, command = %execution.command(), "Terminated background execution");
        Ok(execution)
    }

    /// All executions in allocation order; cursors are not touched
    pub fn list(&self) -> Vec<ExecutionSummary> {
        let state = self.read();
        let mut entries: Vec<&RegistryEntry> = state.entries.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries
            .into_iter()
            .map(|entry| ExecutionSummary {
                id: entry.execution.id().to_string(),
                command: entry.execution.command().to_string(),
                description: entry.execution.description().map(str::to_string),
                status: entry.execution.status(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
