//! # Event Reconciliation
//!
//! strace interleaves calls from several threads, so a call that blocks is
//! printed as `<unfinished ...>` and completed later by a `<... resumed>`
//! line. The [`Reconciler`] pairs those lines back up.
//!
//! ## Line Routing
//!
//! - complete success / failure → `X` event, emitted immediately
//! - started, unfinished → `B` event, held in the pending table
//! - resumed → merged with the pending entry and emitted as `X`
//! - unrecognized → counted and dropped
//!
//! At end of stream every pending entry is emitted once as an `i` event.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::BufRead;

use super::ConversionStats;
use crate::domain::{ParseError, Pid, Tid};
use crate::export::{Event, EventArgs, Phase, TraceEvents};
use crate::parse::{parse_line, RawFields, Shape, TimestampEncoding};

/// Options for one conversion pass
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub encoding: TimestampEncoding,
    /// Report every event under this pid (set when attached to a process)
    pub process_id: Option<Pid>,
}

/// Pairs started and resumed syscalls and collects finished events
pub struct Reconciler {
    options: ConvertOptions,
    /// Started calls awaiting their resume line, keyed by thread and call name
    pending: HashMap<(Tid, String), Event>,
    events: Vec<Event>,
    pub stats: ConversionStats,
}

impl Reconciler {
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            pending: HashMap::new(),
            events: Vec::new(),
            stats: ConversionStats::default(),
        }
    }

    /// Number of calls started but not yet resumed
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Events emitted so far, in stream order
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Classify, extract and route one trace line.
    ///
    /// # Errors
    /// Returns [`ParseError`] for a malformed thread id or timestamp.
    pub fn process_line(&mut self, line: &str) -> Result<(), ParseError> {
        let (shape, fields) = parse_line(line)?;
        self.stats.record(shape);

        match fields {
            Some(fields) => self.process_fields(shape, fields),
            None => Ok(()),
        }
    }

    /// Route already extracted fields.
    ///
    /// # Errors
    /// Returns [`ParseError::Timestamp`] if a timestamp or duration cannot be encoded.
    pub fn process_fields(&mut self, shape: Shape, fields: RawFields) -> Result<(), ParseError> {
        if shape.is_complete() {
            let event = self.build_event(shape, fields, Phase::Complete)?;
            self.events.push(event);
            return Ok(());
        }

        match shape {
            Shape::StartedUnfinished => self.handle_unfinished(fields),
            Shape::ResumedDetached => self.handle_resumed(fields),
            _ => Ok(()),
        }
    }

    /// Flush pending calls as instants and return all events with the stats.
    ///
    /// Flushed instants follow the stream-order events, sorted by timestamp.
    #[must_use]
    pub fn finish(mut self) -> (Vec<Event>, ConversionStats) {
        let mut leftover: Vec<Event> = self.pending.drain().map(|(_, event)| event).collect();
        leftover.sort_by(|a, b| (a.ts, a.tid, &a.name).cmp(&(b.ts, b.tid, &b.name)));

        self.stats.flushed = leftover.len();
        if !leftover.is_empty() {
            info!("{} calls never resumed, emitting them as instant events", leftover.len());
        }

        for mut event in leftover {
            event.ph = Phase::Instant;
            self.events.push(event);
        }

        (self.events, self.stats)
    }

    // Private line handlers

    fn handle_unfinished(&mut self, fields: RawFields) -> Result<(), ParseError> {
        let key = (fields.tid, fields.call.clone());
        let event = self.build_event(Shape::StartedUnfinished, fields, Phase::Begin)?;

        if let Some(replaced) = self.pending.insert(key, event) {
            self.stats.overwritten += 1;
            warn!(
                "{} started again on tid {} before resuming, dropping the earlier start at ts {}",
                replaced.name, replaced.tid, replaced.ts
            );
        }
        Ok(())
    }

    fn handle_resumed(&mut self, fields: RawFields) -> Result<(), ParseError> {
        let key = (fields.tid, fields.call.clone());
        let mut event = self.build_event(Shape::ResumedDetached, fields, Phase::Complete)?;

        match self.pending.remove(&key) {
            Some(started) => event.args.first = started.args.first,
            None => {
                self.stats.unmatched_resumes += 1;
                debug!("{} resumed on tid {} without a matching start", key.1, key.0 .0);
            }
        }

        self.events.push(event);
        Ok(())
    }

    fn build_event(&self, shape: Shape, fields: RawFields, ph: Phase) -> Result<Event, ParseError> {
        let encoding = self.options.encoding;
        let ts = encoding.encode(&fields.timestamp)?;
        let dur = fields.duration.as_deref().map(|d| encoding.encode(d)).transpose()?;
        let pid = self.options.process_id.unwrap_or_else(|| fields.tid.as_pid());

        // Resume lines rarely repeat the original arguments; keep their tail apart.
        let args = if shape == Shape::ResumedDetached {
            EventArgs {
                second: fields.args,
                return_value: fields.return_value.unwrap_or_default(),
                ..EventArgs::default()
            }
        } else {
            EventArgs {
                first: fields.args,
                return_value: fields.return_value.unwrap_or_default(),
                ..EventArgs::default()
            }
        };

        Ok(Event {
            name: fields.call,
            cat: shape.category().to_string(),
            ph,
            pid: pid.0,
            tid: fields.tid.0,
            ts,
            dur,
            args,
        })
    }
}

/// Run a full conversion pass over a line stream.
///
/// `metadata` events (thread names) are placed ahead of the timeline events,
/// unchanged.
///
/// # Errors
/// Fails on read errors and on lines whose thread id or timestamp cannot be
/// parsed; the error names the offending line number.
pub fn convert<R: BufRead>(
    reader: R,
    metadata: Vec<Event>,
    options: ConvertOptions,
) -> Result<(TraceEvents, ConversionStats)> {
    let mut reconciler = Reconciler::new(options);

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read trace line {line_no}"))?;
        reconciler
            .process_line(&line)
            .with_context(|| format!("Invalid trace line {line_no}"))?;
    }

    let (timeline, stats) = reconciler.finish();

    let mut events = metadata;
    events.extend(timeline);
    Ok((TraceEvents::new(events), stats))
}
