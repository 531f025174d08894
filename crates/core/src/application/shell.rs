// Shell Service - foreground and background command execution use cases

use crate::application::constants::{DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};
use crate::application::constraints::{cap_output_size, OutputContext};
use crate::application::registry::{ExecutionSummary, OutputDelta, ProcessRegistry};
use crate::domain::ExecutionId;
use crate::error::{AppError, Result};
use crate::port::{CommandRunner, ExecutionError, OutputSinks};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// SIGKILL; a foreground process killed this way is reported as a timeout
const SIGKILL: i32 = 9;

/// Execute request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Deadline in milliseconds for foreground runs
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub run_in_background: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_id: Option<ExecutionId>,
}

/// Validate the requested deadline and fall back to the default
pub fn effective_timeout(timeout_ms: Option<u64>) -> Result<Duration> {
    match timeout_ms {
        None | Some(0) => Ok(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
        Some(ms) if ms > MAX_TIMEOUT_MS => Err(AppError::validation(format!(
            "Timeout cannot exceed {} milliseconds (10 minutes).",
            MAX_TIMEOUT_MS
        ))),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}

/// Shell Service
pub struct ShellService {
    runner: Arc<dyn CommandRunner>,
    registry: Arc<ProcessRegistry>,
}

impl ShellService {
    pub fn new(runner: Arc<dyn CommandRunner>, registry: Arc<ProcessRegistry>) -> Self {
        Self { runner, registry }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    /// Run a command in the foreground or start it in the background
    pub async fn execute(&self, req: ExecRequest) -> Result<ExecResult> {
        if req.command.trim().is_empty() {
            return Err(AppError::validation("Command cannot be empty."));
        }
        let timeout = effective_timeout(req.timeout_ms)?;

        if req.run_in_background {
            return self.start_background(&req.command, req.description).await;
        }

        let output = self.run_foreground(&req.command, timeout).await?;
        Ok(ExecResult {
            result: output,
            shell_id: None,
        })
    }

    async fn run_foreground(&self, command: &str, timeout: Duration) -> Result<String> {
        let timeout_ms = timeout.as_millis() as u64;
        info!(command = %command, timeout_ms, "Running foreground command");

        let output = match self.runner.run_foreground(command, timeout).await {
            Ok(output) => output,
            Err(ExecutionError::Timeout(_)) => {
                return Err(ExecutionError::Timeout(timeout_ms).into());
            }
            Err(e) => return Err(e.into()),
        };

        match (output.exit_code, output.signal) {
            (Some(0), _) => {}
            // A deadline kill may surface as a bare SIGKILL rather than a timeout
            (None, Some(SIGKILL)) => return Err(ExecutionError::Timeout(timeout_ms).into()),
            (code, signal) => {
                let code = code.unwrap_or_else(|| 128 + signal.unwrap_or(0));
                return Err(AppError::CommandFailed {
                    code,
                    output: output.output,
                    command: command.to_string(),
                });
            }
        }

        cap_output_size(&output.output, OutputContext::Bash)?;
        Ok(output.output)
    }

    async fn start_background(
        &self,
        command: &str,
        description: Option<String>,
    ) -> Result<ExecResult> {
        let sinks = OutputSinks::new();
        // Spawn first: ids are only issued for processes that actually started
        let process = self
            .runner
            .spawn_background(command, sinks.clone())
            .await?;

        let execution = self
            .registry
            .register(command, description, sinks, process.control());

        let monitored = execution.clone();
        tokio::spawn(async move {
            let outcome = process.wait().await;
            info!(
                shell_id = %monitored.id(),
                exit_code = ?outcome.exit_code,
                error = ?outcome.error,
                "Background execution finished"
            );
            monitored.complete(outcome);
        });

        let shell_id = execution.id().to_string();
        Ok(ExecResult {
            result: format!("Command running in background with ID: {}", shell_id),
            shell_id: Some(shell_id),
        })
    }

    /// New output since the previous poll
    pub fn poll_output(&self, shell_id: &str, filter: Option<&str>) -> Result<OutputDelta> {
        if shell_id.is_empty() {
            return Err(AppError::validation("shell_id is required."));
        }
        let delta = self.registry.poll_output(shell_id, filter)?;

        // Oversized output is still returned; the cap is advisory here
        for (stream, text) in [("stdout", &delta.stdout), ("stderr", &delta.stderr)] {
            if let Err(e) = cap_output_size(text, OutputContext::Bash) {
                warn!(shell_id = %shell_id, stream, error = %e, "Background output exceeds size cap");
            }
        }
        Ok(delta)
    }

    pub fn list(&self) -> Vec<ExecutionSummary> {
        self.registry.list()
    }

    /// Kill a running background execution
    pub async fn terminate(&self, shell_id: &str) -> Result<String> {
        if shell_id.is_empty() {
            return Err(AppError::validation("shell_id is required."));
        }
        let execution = self.registry.terminate(shell_id).await?;
        Ok(format!(
            "Successfully killed shell: {} ({})",
            execution.id(),
            execution.command()
        ))
    }
}
