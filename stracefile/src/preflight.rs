//! Pre-flight checks for stracefile
//!
//! Validates the environment before starting strace, so failures come with
//! actionable messages instead of an empty trace.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use log::warn;
use std::path::{Path, PathBuf};

use crate::domain::{Pid, TracerError};
use crate::tracer::Target;

/// Run all pre-flight checks for a tracer run and return the strace binary path.
///
/// # Errors
/// Fails if strace cannot be found or an attach target is not accessible.
pub fn run_preflight_checks(program: &Path, target: &Target) -> Result<PathBuf> {
    let strace = find_program(program)?;
    if let Target::Attach(pid) = target {
        check_process_exists(*pid)?;
        check_proc_access(*pid)?;
        check_ptrace_scope();
    }
    Ok(strace)
}

/// Resolve the strace binary, searching `PATH` for bare names.
///
/// # Errors
/// Returns [`TracerError::NotFound`] if no executable file matches.
pub fn find_program(program: &Path) -> Result<PathBuf, TracerError> {
    which::which(program).map_err(|_| TracerError::NotFound(program.display().to_string()))
}

/// Check if the target process exists
///
/// # Errors
/// Fails if `/proc/<pid>` does not exist.
pub fn check_process_exists(pid: Pid) -> Result<()> {
    let proc_path = format!("/proc/{}", pid.0);
    if !Path::new(&proc_path).exists() {
        bail!(
            "Process {} not found.\n\n\
             Is the process still running? Check with: ps -p {}",
            pid.0,
            pid.0
        );
    }
    Ok(())
}

/// Check if we can read the process's task list (needed for thread names)
///
/// # Errors
/// Fails if `/proc/<pid>/task` cannot be listed.
pub fn check_proc_access(pid: Pid) -> Result<()> {
    let task_path = format!("/proc/{}/task", pid.0);
    std::fs::read_dir(&task_path).with_context(|| {
        format!(
            "Cannot read {task_path}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {})\n\
             - Permission denied (run with sudo)\n\
             - /proc is not mounted",
            pid.0
        )
    })?;
    Ok(())
}

/// Warn when Yama is likely to refuse attaching to a non-child process.
fn check_ptrace_scope() {
    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let Ok(scope) = std::fs::read_to_string("/proc/sys/kernel/yama/ptrace_scope") else {
        return;
    };
    if let Some(message) = ptrace_scope_warning(&scope) {
        warn!("{message}");
    }
}

/// Warning text for a Yama `ptrace_scope` value, `None` when attaching is unrestricted.
fn ptrace_scope_warning(scope: &str) -> Option<String> {
    let scope = scope.trim();
    (scope != "0").then(|| {
        format!("kernel.yama.ptrace_scope={scope}, attaching may be denied (run with sudo)")
    })
}

/// Check that an existing trace log can be read
///
/// # Errors
/// Fails if `path` is missing or not a regular file.
pub fn check_input_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Trace file not found: {}", path.display());
    }
    if !path.is_file() {
        bail!("Not a file: {}\n\n--input must point to an strace log file.", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_program_in_path() {
        // `sh` is present on any system these tests run on
        let found = find_program(Path::new("sh")).unwrap();
        assert!(found.is_file());
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn test_find_program_missing() {
        let err = find_program(Path::new("definitely-not-a-real-strace")).unwrap_err();
        assert!(matches!(err, TracerError::NotFound(_)));
    }

    #[test]
    fn test_find_program_explicit_path() {
        assert!(find_program(Path::new("/nonexistent/bin/strace")).is_err());
    }

    #[test]
    fn test_find_program_rejects_non_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("strace");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = find_program(&fake).unwrap_err();
        assert!(matches!(err, TracerError::NotFound(_)));

        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_program(&fake).unwrap(), fake);
    }

    #[test]
    fn test_ptrace_scope_warning() {
        assert_eq!(ptrace_scope_warning("0\n"), None);
        let message = ptrace_scope_warning("1\n").unwrap();
        assert!(message.contains("ptrace_scope=1"));
        assert!(ptrace_scope_warning("3").is_some());
    }

    #[test]
    fn test_process_not_found() {
        let result = check_process_exists(Pid(999_999_999));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_own_process_accessible() {
        let pid = Pid(std::process::id());
        check_process_exists(pid).unwrap();
        check_proc_access(pid).unwrap();
    }

    #[test]
    fn test_input_file_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_input_file(&dir.path().join("missing.log")).is_err());
        assert!(check_input_file(dir.path()).is_err());

        let file = dir.path().join("trace.log");
        std::fs::write(&file, "").unwrap();
        check_input_file(&file).unwrap();
    }
}
