//! strace process supervision
//!
//! Builds the strace command line, runs it with a timeout, and forwards
//! Ctrl+C so an attached strace detaches cleanly instead of leaving the
//! target stopped.

use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::{Pid, TracerError};

/// Flags every run needs for the output to be parseable:
/// - `-f` follow forks and threads, prefixing lines with the tid
/// - `-T` time spent in each syscall
/// - `-ttt` absolute timestamps with microseconds
/// - `-yy` decode file descriptors
/// - `-qq` suppress attach/exit status messages
pub const DEFAULT_STRACE_ARGS: [&str; 5] = ["-f", "-T", "-ttt", "-yy", "-qq"];

/// What strace should trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Attach to a running process
    Attach(Pid),
    /// Spawn a command under strace
    Spawn(Vec<String>),
}

/// Why the tracer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exited(Option<i32>),
    TimedOut,
    Interrupted,
}

impl StopReason {
    fn from_status(status: ExitStatus) -> Self {
        StopReason::Exited(status.code())
    }
}

/// An strace invocation
#[derive(Debug, Clone)]
pub struct StraceCommand {
    program: PathBuf,
    target: Target,
    syscalls: Option<String>,
    /// Zero disables the timeout
    timeout: Duration,
}

impl StraceCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, target: Target) -> Self {
        Self { program: program.into(), target, syscalls: None, timeout: Duration::ZERO }
    }

    /// Only trace syscalls matching this `-e` expression
    #[must_use]
    pub fn syscalls(mut self, expr: impl Into<String>) -> Self {
        self.syscalls = Some(expr.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument list, writing the trace to `output`.
    #[must_use]
    pub fn build_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = DEFAULT_STRACE_ARGS.iter().map(OsString::from).collect();
        args.push("-o".into());
        args.push(output.into());

        if let Some(ref expr) = self.syscalls {
            args.push("-e".into());
            args.push(expr.into());
        }

        match &self.target {
            Target::Attach(pid) => {
                args.push("-p".into());
                args.push(pid.0.to_string().into());
            }
            Target::Spawn(command) => {
                args.push("--".into());
                args.extend(command.iter().map(OsString::from));
            }
        }
        args
    }

    /// Run strace to completion, timeout or Ctrl+C.
    ///
    /// On timeout or interrupt strace receives SIGINT and is awaited, so the
    /// output file is complete when this returns.
    ///
    /// # Errors
    /// Returns [`TracerError`] if strace cannot be spawned, signalled or awaited.
    pub async fn run(&self, output: &Path) -> Result<StopReason, TracerError> {
        let args = self.build_args(output);
        debug!("Running {} {:?}", self.program.display(), args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TracerError::SpawnFailed {
                program: self.program.display().to_string(),
                source,
            })?;

        let deadline = async {
            if self.timeout.is_zero() {
                std::future::pending::<()>().await;
            } else {
                tokio::time::sleep(self.timeout).await;
            }
        };
        tokio::pin!(deadline);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let reason = tokio::select! {
            status = child.wait() => {
                let status = status.map_err(TracerError::WaitFailed)?;
                return Ok(StopReason::from_status(status));
            }
            () = &mut deadline => StopReason::TimedOut,
            _ = &mut ctrl_c => StopReason::Interrupted,
        };

        info!("Stopping strace ({reason:?})");
        if let Some(pid) = child.id() {
            interrupt(pid)?;
        }
        let status = child.wait().await.map_err(TracerError::WaitFailed)?;
        if !status.success() {
            warn!("strace exited with {status} after being interrupted");
        }
        Ok(reason)
    }
}

/// Send SIGINT to the tracer process.
#[allow(unsafe_code)]
fn interrupt(pid: u32) -> Result<(), TracerError> {
    let raw = libc::pid_t::try_from(pid).map_err(|_| TracerError::SignalFailed {
        pid,
        source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
    })?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    if unsafe { libc::kill(raw, libc::SIGINT) } == 0 {
        Ok(())
    } else {
        Err(TracerError::SignalFailed { pid, source: std::io::Error::last_os_error() })
    }
}
