//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::domain::Pid;
use crate::parse::TimestampEncoding;
use crate::tracer::Target;

#[derive(Parser, Debug)]
#[command(
    name = "stracefile",
    version,
    about = "Trace a command with strace and save the syscalls as a Chrome trace",
    after_help = "\
EXAMPLES:
    stracefile ls -l                         Trace a new command
    stracefile 1234                          Attach to a running process
    stracefile -e trace=file -o out.json make
    stracefile --input strace.log            Convert an existing log (strace -f -T -ttt)

Open the result in https://ui.perfetto.dev/"
)]
pub struct Args {
    /// Command to trace, or a single PID to attach to
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Only trace specified syscalls (passed to strace -e)
    #[arg(short = 'e', long, value_name = "EXPR")]
    pub syscalls: Option<String>,

    /// JSON output file
    #[arg(short, long, default_value = "stracefile.json")]
    pub output: PathBuf,

    /// Stop tracing after N seconds (0 = unlimited)
    #[arg(short, long, default_value = "10")]
    pub timeout: u64,

    /// Process ID to attach to
    #[arg(short, long, conflicts_with = "input")]
    pub pid: Option<u32>,

    /// Convert an existing strace log instead of running strace
    #[arg(long, value_name = "FILE", conflicts_with_all = ["command", "syscalls"])]
    pub input: Option<PathBuf>,

    /// How `seconds.fraction` timestamps become integers
    #[arg(long, value_enum, default_value_t = TimestampEncoding::Concatenated)]
    pub time_encoding: TimestampEncoding,

    /// strace binary to run
    #[arg(long, default_value = "strace")]
    pub strace: PathBuf,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Where the trace text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Tracer(Target),
    File(PathBuf),
}

impl Args {
    /// Resolve the trace source from the arguments.
    ///
    /// A lone numeric COMMAND is treated as a PID to attach to.
    ///
    /// # Errors
    /// Fails when no source was given, or both a PID and a command were.
    pub fn source(&self) -> anyhow::Result<Source> {
        if let Some(ref path) = self.input {
            return Ok(Source::File(path.clone()));
        }

        if let Some(pid) = self.pid {
            if !self.command.is_empty() {
                anyhow::bail!(
                    "Cannot use COMMAND with --pid.\n\n\
                     Use either:\n  \
                     stracefile --pid 1234\n  \
                     stracefile my-command args..."
                );
            }
            return Ok(Source::Tracer(Target::Attach(Pid(pid))));
        }

        match self.command.as_slice() {
            [] => anyhow::bail!(
                "Missing required argument: COMMAND, PID or --input\n\n\
                 Run 'stracefile --help' for usage"
            ),
            [single] => Ok(Source::Tracer(match single.parse::<u32>() {
                Ok(pid) => Target::Attach(Pid(pid)),
                Err(_) => Target::Spawn(self.command.clone()),
            })),
            _ => Ok(Source::Tracer(Target::Spawn(self.command.clone()))),
        }
    }
}
