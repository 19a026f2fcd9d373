//! # stracefile - Main Entry Point
//!
//! Two modes:
//! - **Trace** (`stracefile <COMMAND>...` or `stracefile <PID>`): run strace, then convert
//! - **Convert** (`stracefile --input strace.log`): convert an existing log

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use stracefile::cli::{Args, Source};
use stracefile::export::{Event, TraceEvents};
use stracefile::preflight::{check_input_file, run_preflight_checks};
use stracefile::reconcile::{convert, display_statistics, ConversionStats, ConvertOptions};
use stracefile::thread_names::ThreadNames;
use stracefile::tracer::{StopReason, StraceCommand, Target};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("missing required argument") || msg.contains("cannot use command") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let (trace, stats) = match args.source()? {
        Source::File(path) => {
            check_input_file(&path)?;
            let options = ConvertOptions { encoding: args.time_encoding, process_id: None };
            convert_file(&path, Vec::new(), options)?
        }
        Source::Tracer(target) => trace_target(&args, target).await?,
    };

    if !quiet {
        display_statistics(&stats);
    }

    trace
        .save(&args.output)
        .with_context(|| format!("Failed to save trace to {}", args.output.display()))?;

    if !quiet {
        println!("saved: {} ({} events)", args.output.display(), trace.len());
        println!("open in: https://ui.perfetto.dev/");
    }
    Ok(())
}

/// Run strace against `target` and convert what it wrote.
async fn trace_target(args: &Args, target: Target) -> Result<(TraceEvents, ConversionStats)> {
    let strace = run_preflight_checks(&args.strace, &target)?;

    // Only an attached process has a pid we know up front.
    let attached = match target {
        Target::Attach(pid) => Some(pid),
        Target::Spawn(_) => None,
    };
    let mut thread_names = attached.map(ThreadNames::new);
    if let Some(names) = thread_names.as_mut() {
        names.snapshot();
    }

    let output = tempfile::Builder::new()
        .prefix("stracefile")
        .tempfile()
        .context("Failed to create temporary strace output file")?;

    let mut command =
        StraceCommand::new(strace, target).timeout(Duration::from_secs(args.timeout));
    if let Some(ref expr) = args.syscalls {
        command = command.syscalls(expr.clone());
    }

    if !args.quiet {
        eprintln!("tracing... (timeout: {})", format_timeout(args.timeout));
    }
    match command.run(output.path()).await? {
        StopReason::Exited(Some(0)) => info!("strace finished"),
        StopReason::Exited(code) => warn!("strace exited with status {code:?}"),
        reason => info!("strace stopped: {reason:?}"),
    }

    let metadata = match thread_names {
        Some(mut names) => {
            names.snapshot();
            if names.is_empty() {
                warn!("No thread names found, thread tracks will be unnamed");
            } else {
                info!("Collected {} thread names", names.len());
            }
            names.into_events()
        }
        None => Vec::new(),
    };

    let options = ConvertOptions { encoding: args.time_encoding, process_id: attached };
    // `output` is removed when dropped at the end of this scope.
    convert_file(output.path(), metadata, options)
}

fn convert_file(
    path: &Path,
    metadata: Vec<Event>,
    options: ConvertOptions,
) -> Result<(TraceEvents, ConversionStats)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    info!("Converting {}", path.display());
    convert(BufReader::new(file), metadata, options)
        .with_context(|| format!("Failed to convert {}", path.display()))
}

fn format_timeout(secs: u64) -> String {
    if secs == 0 {
        "none".to_string()
    } else {
        format!("{secs}s")
    }
}
