//! Bounded subprocess execution
//!
//! Every external tool call (picotool, make) goes through [`run_tool`]:
//! spawn with piped stdio, drain both pipes on reader threads, poll for
//! exit until the deadline, kill on expiry. No invocation in the engine
//! may block indefinitely.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ToolError;

/// Poll granularity while waiting for a child to exit
const WAIT_TICK: Duration = Duration::from_millis(50);

/// Captured result of a finished tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Trimmed stderr for diagnostics
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

#[cfg(test)]
impl ToolOutput {
    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    pub(crate) fn ok(stdout: &str) -> Self {
        Self {
            status: Self::exit_status(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub(crate) fn failed(code: i32, stderr: &str) -> Self {
        Self {
            status: Self::exit_status(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Run a tool with the current working directory inherited
pub fn run_tool(program: &str, args: &[&str], timeout: Duration) -> Result<ToolOutput, ToolError> {
    run(program, args, None, timeout)
}

/// Run a tool with the working directory scoped to `dir`
pub fn run_tool_in(
    program: &str,
    args: &[&str],
    dir: &Path,
    timeout: Duration,
) -> Result<ToolOutput, ToolError> {
    run(program, args, Some(dir), timeout)
}

fn run(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    timeout: Duration,
) -> Result<ToolOutput, ToolError> {
    log::debug!("Running {} {:?} (timeout {:?})", program, args, timeout);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                program: program.to_string(),
            }
        } else {
            ToolError::Io {
                program: program.to_string(),
                source: e,
            }
        }
    })?;

    // Drain the pipes off-thread so a chatty child cannot deadlock
    // against a full pipe buffer while we poll for exit.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    match wait_bounded(&mut child, timeout) {
        Ok(Some(status)) => {
            let stdout = stdout.join().unwrap_or_default();
            let stderr = stderr.join().unwrap_or_default();
            log::debug!("{} exited with {}", program, status);
            Ok(ToolOutput {
                status,
                stdout,
                stderr,
            })
        }
        Ok(None) => Err(ToolError::Timeout {
            program: program.to_string(),
            seconds: timeout.as_secs(),
        }),
        Err(e) => Err(ToolError::Io {
            program: program.to_string(),
            source: e,
        }),
    }
}

/// Wait for the child to exit, returning `None` when the deadline
/// passes. A timed-out child is killed and reaped before returning.
fn wait_bounded(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(WAIT_TICK);
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
