//! # stracefile - strace to Chrome Trace converter
//!
//! Runs `strace` around a command (or attached to a running process) and
//! turns its text output into a Chrome Trace Event document, so syscall
//! activity per thread can be inspected on a timeline in Perfetto or
//! `chrome://tracing`.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐  -o tempfile  ┌──────────────┐   lines   ┌──────────────┐
//! │    tracer    │──────────────▶│    parse     │──────────▶│  reconcile   │
//! │  (strace)    │               │ shape/fields │           │ pending table│
//! └──────────────┘               └──────────────┘           └──────┬───────┘
//!        │                                                         │ events
//!        ▼                                                         ▼
//! ┌──────────────┐  thread_name events                      ┌──────────────┐
//! │ thread_names │─────────────────────────────────────────▶│    export    │
//! │   (/proc)    │                                          │ (trace.json) │
//! └──────────────┘                                          └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`parse`]: classify a line into one of five shapes and extract its fields
//! - [`reconcile`]: pair `<unfinished ...>` lines with their `<... resumed>`
//!   lines and build the event list
//! - [`export`]: event model and Chrome Trace JSON serialization
//! - [`tracer`]: build the strace command line and supervise the process
//! - [`thread_names`]: `thread_name` metadata from `/proc/<pid>/task`
//! - [`preflight`]: environment checks before tracing
//! - [`cli`]: command-line arguments
//! - [`domain`]: newtypes and error enums
//!
//! ## Event Phases
//!
//! | Line shape              | Phase | When emitted                  |
//! |-------------------------|-------|-------------------------------|
//! | complete (ok / error)   | `X`   | immediately                   |
//! | started, unfinished     | `B`   | held until resumed            |
//! | resumed                 | `X`   | merged with its start         |
//! | never resumed           | `i`   | end of stream                 |
//! | thread name             | `M`   | ahead of the timeline         |

pub mod cli;
pub mod domain;
pub mod export;
pub mod parse;
pub mod preflight;
pub mod reconcile;
pub mod thread_names;
pub mod tracer;
