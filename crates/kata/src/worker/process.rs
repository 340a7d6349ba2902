//! Process spawning and I/O for workers

use std::io::ErrorKind;
use std::process::ExitStatus;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tracing::{debug, instrument};

use crate::worker::WorkerError;
use crate::worker::command::WorkerCommand;

/// Diagnostics kept from a worker's stderr
const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;

/// Everything a worker produced before exiting
#[derive(Debug)]
pub struct WorkerExit {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl WorkerExit {
    /// Last non-empty line the worker wrote to stderr
    pub fn stderr_summary(&self) -> Option<String> {
        String::from_utf8_lossy(&self.stderr)
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(str::to_string)
    }

    /// Human-readable reason for an unsuccessful exit
    pub fn failure_reason(&self) -> String {
        self.stderr_summary()
            .unwrap_or_else(|| format!("worker exited unexpectedly ({})", self.status))
    }
}

/// Handle to a running worker process
#[derive(Debug)]
pub struct WorkerProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl WorkerProcess {
    /// Spawn a new worker process
    #[instrument(skip(command), fields(program = %command.program().display()))]
    pub fn spawn(command: WorkerCommand) -> Result<Self, WorkerError> {
        let path = command.program().to_path_buf();
        let mut child = command
            .build()
            .spawn()
            .map_err(|source| WorkerError::SpawnFailed { path, source })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        debug!(pid = ?child.id(), "spawned worker process");

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
        })
    }

    /// OS process id, if the process has not been reaped yet
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Send the request, collect the worker's output and wait for it to exit
    ///
    /// Stdin is written while stdout and stderr are drained so that neither
    /// side can stall on a full pipe. Stdout beyond `limit` bytes is an error.
    pub async fn exchange(&mut self, request: &[u8], limit: usize) -> Result<WorkerExit, WorkerError> {
        let stdin = self.stdin.take();
        let stdout = self.stdout.take().ok_or(WorkerError::StreamClosed("stdout"))?;
        let stderr = self.stderr.take().ok_or(WorkerError::StreamClosed("stderr"))?;

        let write = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(request).await {
                    // The worker may exit before reading everything
                    Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                    Err(err) => return Err(WorkerError::Io(err)),
                    Ok(()) => {}
                }
                // Dropping stdin signals EOF
            }
            Ok(())
        };

        let ((), stdout, stderr) = tokio::try_join!(
            write,
            read_limited(stdout, limit),
            read_capped(stderr, STDERR_CAPTURE_LIMIT),
        )?;

        let status = self.child.wait().await?;
        debug!(%status, stdout_len = stdout.len(), "worker exited");

        Ok(WorkerExit {
            status,
            stdout,
            stderr,
        })
    }

    /// Kill the process and reap it
    pub async fn kill(&mut self) -> Result<(), WorkerError> {
        self.child.kill().await?;
        Ok(())
    }
}

/// Read to EOF, failing as soon as more than `limit` bytes arrive
async fn read_limited<R>(reader: R, limit: usize) -> Result<Vec<u8>, WorkerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let bound = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(bound).read_to_end(&mut buf).await?;
    if buf.len() > limit {
        return Err(WorkerError::ResponseTooLarge { limit });
    }
    Ok(buf)
}

/// Read to EOF, keeping at most `cap` bytes and discarding the rest
async fn read_capped<R>(mut reader: R, cap: usize) -> Result<Vec<u8>, WorkerError>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = cap.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(kept)
}
