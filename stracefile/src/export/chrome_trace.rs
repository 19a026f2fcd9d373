use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{ExportError, Pid, Tid};

/// Chrome Trace Event phase
/// Spec: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Start and duration both known
    #[serde(rename = "X")]
    Complete,
    /// Started, duration not yet known
    #[serde(rename = "B")]
    Begin,
    /// Started and never finished within the trace
    #[serde(rename = "i")]
    Instant,
    /// Non-timeline annotation (thread names)
    #[serde(rename = "M")]
    Metadata,
}

impl Phase {
    /// The single-letter marker used in the JSON document.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Phase::Complete => "X",
            Phase::Begin => "B",
            Phase::Instant => "i",
            Phase::Metadata => "M",
        }
    }
}

/// Event payload. Empty fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventArgs {
    /// Argument text of the call
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first: String,
    /// Argument tail printed on a resume line
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub second: String,
    #[serde(rename = "returnValue", default, skip_serializing_if = "String::is_empty")]
    pub return_value: String,
    /// Display name for metadata events
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// One timeline record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Syscall name, or `thread_name` for metadata
    pub name: String,
    /// Line shape the event came from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cat: String,
    pub ph: Phase,
    pub pid: u32,
    pub tid: u32,
    /// Start timestamp in encoded ticks
    #[serde(default)]
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<u64>,
    #[serde(default)]
    pub args: EventArgs,
}

impl Event {
    /// Metadata event naming a thread in the viewer.
    #[must_use]
    pub fn thread_name(pid: Pid, tid: Tid, name: impl Into<String>) -> Self {
        Self {
            name: "thread_name".to_string(),
            cat: String::new(),
            ph: Phase::Metadata,
            pid: pid.0,
            tid: tid.0,
            ts: 0,
            dur: None,
            args: EventArgs { name: name.into(), ..EventArgs::default() },
        }
    }
}

/// Chrome Trace Format container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvents {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<Event>,
    #[serde(rename = "displayTimeUnit", default = "default_time_unit")]
    display_time_unit: String,
}

fn default_time_unit() -> String {
    "ms".to_string()
}

impl Default for TraceEvents {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TraceEvents {
    /// Wrap an ordered list of events
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { trace_events: events, display_time_unit: default_time_unit() }
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.trace_events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trace_events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trace_events.is_empty()
    }

    /// Export the trace to any writer (file, stdout, buffer, etc.)
    ///
    /// # Errors
    /// Returns [`ExportError`] if encoding or writing fails.
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the trace as JSON to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns [`ExportError`] if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ExportError::CreateFailed {
            path: path.display().to_string(),
            source,
        })?;
        self.export(BufWriter::new(file))?;
        debug!("Wrote {} events to {}", self.len(), path.display());
        Ok(())
    }

    /// Parse a previously saved trace document.
    ///
    /// # Errors
    /// Returns [`ExportError::Json`] if the input is not a trace document.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ExportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}
