// Bash command runner
// reason: tokio::process for async pipes, nix for process-group signals
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use shellhost_core::domain::{ExitOutcome, OutputBuffer};
use shellhost_core::port::{
    CommandRunner, ExecutionError, ForegroundOutput, OutputSinks, ProcessControl, RunningProcess,
};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Runs commands through `bash -c`
///
/// Every command gets its own process group so that a kill also reaches
/// the children the shell started.
pub struct BashRunner {
    shell: PathBuf,
    workdir: Option<PathBuf>,
}

impl BashRunner {
    pub fn new() -> Self {
        Self {
            shell: PathBuf::from("bash"),
            workdir: None,
        }
    }

    /// Run commands from `workdir` instead of the daemon's cwd
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    fn spawn(&self, command: &str) -> Result<Child, ExecutionError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd.spawn()
            .map_err(|e| ExecutionError::SpawnFailed(e.to_string()))
    }
}

impl Default for BashRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a pipe into a buffer until EOF
fn pump<R>(mut reader: R, sink: Arc<OutputBuffer>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => sink.append(&chunk[..n]),
                Err(e) => {
                    debug!(error = %e, "Output pipe closed with error");
                    break;
                }
            }
        }
    })
}

/// Attach pumps for both pipes of `child`
fn pump_pipes(child: &mut Child, stdout: Arc<OutputBuffer>, stderr: Arc<OutputBuffer>) -> Vec<JoinHandle<()>> {
    let mut pumps = Vec::with_capacity(2);
    if let Some(out) = child.stdout.take() {
        pumps.push(pump(out, stdout));
    }
    if let Some(err) = child.stderr.take() {
        pumps.push(pump(err, stderr));
    }
    pumps
}

async fn drain(pumps: Vec<JoinHandle<()>>) {
    for handle in pumps {
        if let Err(e) = handle.await {
            warn!(error = %e, "Output pump task failed");
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[async_trait]
impl CommandRunner for BashRunner {
    async fn run_foreground(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ForegroundOutput, ExecutionError> {
        let mut child = self.spawn(command)?;
        let control = child.id().map(ProcessGroupControl::new);

        // Both pipes feed one buffer so the output keeps its interleaving
        let combined = Arc::new(OutputBuffer::new());
        let pumps = pump_pipes(&mut child, combined.clone(), combined.clone());

        let aborts: Vec<AbortHandle> = pumps.iter().map(JoinHandle::abort_handle).collect();

        // The deadline covers the drain too: a grandchild can hold the pipes
        // open after the shell itself has exited.
        let finished = tokio::time::timeout(timeout, async {
            let status = child.wait().await?;
            drain(pumps).await;
            Ok::<_, std::io::Error>(status)
        })
        .await;

        let status = match finished {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(ExecutionError::Io(e.to_string())),
            Err(_) => {
                warn!(command = %command, timeout_ms = timeout.as_millis() as u64, "Foreground command timed out");
                if let Some(control) = control {
                    if let Err(e) = control.kill() {
                        warn!(error = %e, "Failed to kill timed out process group");
                    }
                }
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "Child already gone after timeout");
                }
                for handle in aborts {
                    handle.abort();
                }
                return Err(ExecutionError::Timeout(timeout.as_millis() as u64));
            }
        };

        let output = combined.to_string_lossy();
        info!(
            command = %command,
            exit_code = ?status.code(),
            output_bytes = output.len(),
            "Foreground command finished"
        );
        Ok(ForegroundOutput {
            exit_code: status.code(),
            signal: exit_signal(&status),
            output,
        })
    }

    async fn spawn_background(
        &self,
        command: &str,
        sinks: OutputSinks,
    ) -> Result<Box<dyn RunningProcess>, ExecutionError> {
        let mut child = self.spawn(command)?;
        let control = child
            .id()
            .map(|pid| Arc::new(ProcessGroupControl::new(pid)) as Arc<dyn ProcessControl>);
        let pumps = pump_pipes(&mut child, sinks.stdout, sinks.stderr);

        debug!(command = %command, pid = ?child.id(), "Spawned background command");
        Ok(Box::new(BashProcess {
            child,
            control,
            pumps,
        }))
    }
}

/// A background `bash -c` child
struct BashProcess {
    child: Child,
    control: Option<Arc<dyn ProcessControl>>,
    pumps: Vec<JoinHandle<()>>,
}

#[async_trait]
impl RunningProcess for BashProcess {
    fn control(&self) -> Option<Arc<dyn ProcessControl>> {
        self.control.clone()
    }

    async fn wait(mut self: Box<Self>) -> ExitOutcome {
        let status = self.child.wait().await;
        drain(std::mem::take(&mut self.pumps)).await;
        match status {
            Ok(status) => match status.code() {
                Some(code) => ExitOutcome::exited(code),
                // Killed by a signal: no exit code, reported as failed
                None => ExitOutcome::default(),
            },
            Err(e) => ExitOutcome::errored(e.to_string()),
        }
    }
}

/// Kills the process group led by `pid`
///
/// The group id stays valid after the leader is reaped for as long as any
/// member (e.g. a backgrounded grandchild) is alive, so a kill in that window
/// still reaches the survivors. Once every member is gone the id is free; a
/// kill racing with the final pipe drain may then hit ESRCH or, if the pid
/// was already reused as a new group leader, an unrelated group. Callers
/// check the completion signal first, which fires only after the drain.
pub struct ProcessGroupControl {
    pid: u32,
}

impl ProcessGroupControl {
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }
}

impl ProcessControl for ProcessGroupControl {
    #[cfg(unix)]
    fn kill(&self) -> Result<(), ExecutionError> {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        match killpg(Pid::from_raw(self.pid as i32), Signal::SIGKILL) {
            // Already exited and reaped
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ExecutionError::Killed(format!("SIGKILL failed: {}", e))),
        }
    }

    #[cfg(not(unix))]
    fn kill(&self) -> Result<(), ExecutionError> {
        Err(ExecutionError::Killed(
            "process groups are not supported on this platform".to_string(),
        ))
    }

    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }
}
