// Command Runner Port
// Abstraction for executing shell commands (foreground or background)

use crate::domain::{ExitOutcome, OutputBuffer};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result of a foreground execution that ran to exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Terminating signal number, if any
    pub signal: Option<i32>,
    /// Interleaved stdout and stderr
    pub output: String,
}

impl ForegroundOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to execute command: {0}")]
    SpawnFailed(String),

    #[error("Command timed out after {0}ms. Consider increasing the timeout parameter or running in background.")]
    Timeout(u64),

    #[error("Process kill failed: {0}")]
    Killed(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Destinations for a background process' output streams
#[derive(Debug, Clone)]
pub struct OutputSinks {
    pub stdout: Arc<OutputBuffer>,
    pub stderr: Arc<OutputBuffer>,
}

impl OutputSinks {
    pub fn new() -> Self {
        Self {
            stdout: Arc::new(OutputBuffer::new()),
            stderr: Arc::new(OutputBuffer::new()),
        }
    }
}

impl Default for OutputSinks {
    fn default() -> Self {
        Self::new()
    }
}

/// Kill switch for a spawned process, usable while another task awaits it
pub trait ProcessControl: Send + Sync {
    /// Send a kill signal; does not wait for exit
    fn kill(&self) -> Result<(), ExecutionError>;

    fn pid(&self) -> Option<u32>;
}

/// A spawned background process whose exit can be awaited exactly once
#[async_trait]
pub trait RunningProcess: Send {
    /// `None` if the OS handle was already gone when the process was spawned
    fn control(&self) -> Option<Arc<dyn ProcessControl>>;

    /// Wait for exit and for the output streams to drain
    async fn wait(self: Box<Self>) -> ExitOutcome;
}

/// Command Runner trait
///
/// Implementations:
/// - BashRunner: `bash -c` via tokio::process (infra-system)
/// - MockCommandRunner: scripted outcomes for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion under a deadline
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::Timeout if the deadline elapses (the process is killed)
    async fn run_foreground(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ForegroundOutput, ExecutionError>;

    /// Start a command whose output is streamed into `sinks`
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    async fn spawn_background(
        &self,
        command: &str,
        sinks: OutputSinks,
    ) -> Result<Box<dyn RunningProcess>, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::watch;

    /// Scripted foreground behavior
    #[derive(Debug, Clone)]
    pub enum MockForeground {
        /// Exit with the given code and combined output
        Exit { code: i32, output: String },
        /// Terminated by a signal
        Signal(i32),
        /// Deadline elapsed
        Timeout,
        /// Process could not be started
        SpawnFail(String),
    }

    /// Controllable stand-in for a background OS process
    pub struct MockProcessControl {
        outcome: watch::Sender<Option<ExitOutcome>>,
        kill_count: AtomicUsize,
        fail_kill: bool,
    }

    impl MockProcessControl {
        fn new(fail_kill: bool) -> Self {
            let (outcome, _) = watch::channel(None);
            Self {
                outcome,
                kill_count: AtomicUsize::new(0),
                fail_kill,
            }
        }

        /// Let the process exit with `outcome`
        pub fn finish(&self, outcome: ExitOutcome) {
            self.outcome.send_if_modified(|current| {
                if current.is_some() {
                    return false;
                }
                *current = Some(outcome);
                true
            });
        }

        pub fn kill_count(&self) -> usize {
            self.kill_count.load(Ordering::SeqCst)
        }
    }

    impl ProcessControl for MockProcessControl {
        fn kill(&self) -> Result<(), ExecutionError> {
            if self.fail_kill {
                return Err(ExecutionError::Killed("operation not permitted".to_string()));
            }
            self.kill_count.fetch_add(1, Ordering::SeqCst);
            self.finish(ExitOutcome::default());
            Ok(())
        }

        fn pid(&self) -> Option<u32> {
            Some(4242)
        }
    }

    struct MockRunningProcess {
        control: Arc<MockProcessControl>,
        expose_control: bool,
    }

    #[async_trait]
    impl RunningProcess for MockRunningProcess {
        fn control(&self) -> Option<Arc<dyn ProcessControl>> {
            if !self.expose_control {
                return None;
            }
            let control: Arc<dyn ProcessControl> = self.control.clone();
            Some(control)
        }

        async fn wait(self: Box<Self>) -> ExitOutcome {
            let mut rx = self.control.outcome.subscribe();
            // The watch::Ref borrows rx; end it before rx drops
            #[allow(clippy::let_and_return)]
            let outcome = match rx.wait_for(|outcome| outcome.is_some()).await {
                Ok(outcome) => outcome.clone().unwrap_or_default(),
                Err(_) => ExitOutcome::errored("mock process dropped"),
            };
            outcome
        }
    }

    /// Mock Command Runner for testing
    pub struct MockCommandRunner {
        foreground: Mutex<MockForeground>,
        stdout_prelude: Vec<u8>,
        stderr_prelude: Vec<u8>,
        spawn_error: Option<String>,
        fail_kill: bool,
        expose_control: bool,
        spawned: Mutex<Vec<Arc<MockProcessControl>>>,
        foreground_timeouts: Mutex<Vec<Duration>>,
    }

    impl MockCommandRunner {
        pub fn new(foreground: MockForeground) -> Self {
            Self {
                foreground: Mutex::new(foreground),
                stdout_prelude: Vec::new(),
                stderr_prelude: Vec::new(),
                spawn_error: None,
                fail_kill: false,
                expose_control: true,
                spawned: Mutex::new(Vec::new()),
                foreground_timeouts: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success(output: impl Into<String>) -> Self {
            Self::new(MockForeground::Exit {
                code: 0,
                output: output.into(),
            })
        }

        /// Bytes every background process writes on start
        pub fn with_output(mut self, stdout: &[u8], stderr: &[u8]) -> Self {
            self.stdout_prelude = stdout.to_vec();
            self.stderr_prelude = stderr.to_vec();
            self
        }

        pub fn with_spawn_error(mut self, message: impl Into<String>) -> Self {
            self.spawn_error = Some(message.into());
            self
        }

        pub fn with_failing_kill(mut self) -> Self {
            self.fail_kill = true;
            self
        }

        pub fn without_process_handle(mut self) -> Self {
            self.expose_control = false;
            self
        }

        /// Controls of every background process spawned so far
        pub fn spawned(&self) -> Vec<Arc<MockProcessControl>> {
            self.spawned.lock().unwrap().clone()
        }

        pub fn foreground_timeouts(&self) -> Vec<Duration> {
            self.foreground_timeouts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run_foreground(
            &self,
            _command: &str,
            timeout: Duration,
        ) -> Result<ForegroundOutput, ExecutionError> {
            self.foreground_timeouts.lock().unwrap().push(timeout);
            let behavior = self.foreground.lock().unwrap().clone();
            match behavior {
                MockForeground::Exit { code, output } => Ok(ForegroundOutput {
                    exit_code: Some(code),
                    signal: None,
                    output,
                }),
                MockForeground::Signal(signal) => Ok(ForegroundOutput {
                    exit_code: None,
                    signal: Some(signal),
                    output: String::new(),
                }),
                MockForeground::Timeout => Err(ExecutionError::Timeout(timeout.as_millis() as u64)),
                MockForeground::SpawnFail(msg) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }

        async fn spawn_background(
            &self,
            _command: &str,
            sinks: OutputSinks,
        ) -> Result<Box<dyn RunningProcess>, ExecutionError> {
            if let Some(msg) = &self.spawn_error {
                return Err(ExecutionError::SpawnFailed(msg.clone()));
            }
            sinks.stdout.append(&self.stdout_prelude);
            sinks.stderr.append(&self.stderr_prelude);

            let control = Arc::new(MockProcessControl::new(self.fail_kill));
            self.spawned.lock().unwrap().push(control.clone());
            Ok(Box::new(MockRunningProcess {
                control,
                expose_control: self.expose_control,
            }))
        }
    }
}
