//! Trace line classification
//!
//! Every strace line falls into exactly one [`Shape`]. Shapes are tried in a
//! fixed order and the first matching pattern wins, so a line is never given
//! a later, looser shape when an earlier one also fits.
//!
//! # Recognized lines (`strace -f -T -ttt`)
//!
//! ```text
//! 1234 100.500000 open("/tmp/x", O_RDONLY) = 3 <0.000010>           complete success
//! 1234 100.500000 open("/nope", O_RDONLY) = -1 ENOENT (...) <0.000008>  complete failure
//! 1234 100.500000 read(3,  <unfinished ...>                            started, unfinished
//! 1234 100.600000 <... read resumed>"data", 4) = 4 <0.000020>          resumed
//! 1234 100.700000 +++ exited with 0 +++                                 unrecognized
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Captures: tid, timestamp, call, args, return value, duration.
///
/// The return value starts with a digit (decimal or hex), and may carry an
/// fd decoration from `-yy` (`3</tmp/x>`, `4<TCP:[a:1->b:2]>`) and a trailing
/// annotation such as `(Timeout)`. Decorations can contain `>`, so only the
/// duration anchor ends them.
static COMPLETE_SUCCESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+) +(\d+\.\d+) +(\w+)\((.*)\) += ((?:0x[[:xdigit:]]+|\d+)(?:<.*>)?(?: \(.*\))?) +<(\d+\.\d+)>\s*$",
    )
    .expect("Invalid complete-success regex pattern")
});

/// Captures: tid, timestamp, call, args, return value, duration.
static COMPLETE_FAILURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+) +(\d+\.\d+) +(\w+)\((.*)\) += (-.*?) +<(\d+\.\d+)>\s*$")
        .expect("Invalid complete-failure regex pattern")
});

/// Captures: tid, timestamp, call, partial args.
static STARTED_UNFINISHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+) +(\d+\.\d+) +(\w+)\((.*?) *<unfinished \.\.\.>\s*$")
        .expect("Invalid started-unfinished regex pattern")
});

/// Captures: tid, timestamp, call, argument tail, return value, duration.
static RESUMED_DETACHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+) +(\d+\.\d+) +<\.\.\. (\w+) resumed>(.*) += (.+?) +<(\d+\.\d+)>\s*$")
        .expect("Invalid resumed-detached regex pattern")
});

/// Structural classification of one trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Call and result on one line, non-negative return.
    CompleteSuccess,
    /// Call and result on one line, negative (error) return.
    CompleteFailure,
    /// Call started; result reported on a later line.
    StartedUnfinished,
    /// Result of a previously started call.
    ResumedDetached,
    /// Signals, exits and anything else.
    Unrecognized,
}

impl Shape {
    /// Recognized shapes in matching priority order.
    pub const PRIORITY: [Shape; 4] = [
        Shape::CompleteSuccess,
        Shape::CompleteFailure,
        Shape::StartedUnfinished,
        Shape::ResumedDetached,
    ];

    /// Pattern recognizing this shape, `None` for [`Shape::Unrecognized`].
    pub(crate) fn pattern(self) -> Option<&'static Regex> {
        match self {
            Shape::CompleteSuccess => Some(&*COMPLETE_SUCCESS_RE),
            Shape::CompleteFailure => Some(&*COMPLETE_FAILURE_RE),
            Shape::StartedUnfinished => Some(&*STARTED_UNFINISHED_RE),
            Shape::ResumedDetached => Some(&*RESUMED_DETACHED_RE),
            Shape::Unrecognized => None,
        }
    }

    /// Category label written to the event's `cat` field.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            Shape::CompleteSuccess => "successful",
            Shape::CompleteFailure => "failed",
            Shape::StartedUnfinished => "unfinished",
            Shape::ResumedDetached => "detached",
            Shape::Unrecognized => "other",
        }
    }

    /// True for the two single-line shapes.
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Shape::CompleteSuccess | Shape::CompleteFailure)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// Classify a trace line. Total: unmatched lines are [`Shape::Unrecognized`].
#[must_use]
pub fn classify(line: &str) -> Shape {
    Shape::PRIORITY
        .into_iter()
        .find(|shape| shape.pattern().is_some_and(|re| re.is_match(line)))
        .unwrap_or(Shape::Unrecognized)
}
