//! Thread name discovery
//!
//! Reads `/proc/<pid>/task/*/comm` so the viewer can label each thread track.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::{Pid, Tid};
use crate::export::Event;

/// A thread of the traced process and its `comm` name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub tid: Tid,
    pub comm: String,
}

/// List the threads of `pid` under the given proc root.
///
/// Entries that vanish or cannot be read mid-scan are skipped.
///
/// # Errors
/// Returns an error if the task directory itself cannot be read.
pub fn list_threads_in(proc_root: &Path, pid: Pid) -> Result<Vec<ThreadInfo>> {
    let task_dir = proc_root.join(pid.0.to_string()).join("task");

    let entries = fs::read_dir(&task_dir)
        .with_context(|| format!("Failed to read {}", task_dir.display()))?;

    let mut threads: Vec<ThreadInfo> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let tid = entry.file_name().to_string_lossy().parse::<u32>().ok()?;
            let comm = fs::read_to_string(entry.path().join("comm")).ok()?;
            Some(ThreadInfo { tid: Tid(tid), comm: comm.trim().to_string() })
        })
        .collect();

    threads.sort_by_key(|t| t.tid);
    Ok(threads)
}

/// List the threads of a live process via `/proc`.
///
/// # Errors
/// Returns an error if `/proc/<pid>/task` cannot be read.
pub fn list_process_threads(pid: Pid) -> Result<Vec<ThreadInfo>> {
    list_threads_in(Path::new("/proc"), pid)
}

/// Accumulates thread names across several snapshots of one process.
///
/// Threads may start or exit while tracing runs, so the process is sampled
/// before and after; a later name for the same tid replaces an earlier one.
#[derive(Debug)]
pub struct ThreadNames {
    pid: Pid,
    names: BTreeMap<Tid, String>,
}

impl ThreadNames {
    #[must_use]
    pub fn new(pid: Pid) -> Self {
        Self { pid, names: BTreeMap::new() }
    }

    pub fn merge(&mut self, threads: Vec<ThreadInfo>) {
        for thread in threads {
            self.names.insert(thread.tid, thread.comm);
        }
    }

    /// Take a snapshot of the live process. Failures are logged, not returned.
    pub fn snapshot(&mut self) {
        match list_process_threads(self.pid) {
            Ok(threads) => {
                log::debug!("Found {} threads in {}", threads.len(), self.pid);
                self.merge(threads);
            }
            Err(e) => log::warn!("Could not read thread names for {}: {e:#}", self.pid),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// One `thread_name` metadata event per thread, ordered by tid.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        let pid = self.pid;
        self.names
            .into_iter()
            .map(|(tid, name)| Event::thread_name(pid, tid, name))
            .collect()
    }
}
