use std::fmt;

use crate::parse::Shape;

/// Per-run counters for the conversion pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub lines: usize,
    pub successful: usize,
    pub failed: usize,
    pub unfinished: usize,
    pub resumed: usize,
    pub unrecognized: usize,
    /// Resume lines with no pending start
    pub unmatched_resumes: usize,
    /// Pending starts replaced by a later start for the same thread and call
    pub overwritten: usize,
    /// Pending starts flushed as instants at end of stream
    pub flushed: usize,
}

impl ConversionStats {
    pub(crate) fn record(&mut self, shape: Shape) {
        self.lines += 1;
        match shape {
            Shape::CompleteSuccess => self.successful += 1,
            Shape::CompleteFailure => self.failed += 1,
            Shape::StartedUnfinished => self.unfinished += 1,
            Shape::ResumedDetached => self.resumed += 1,
            Shape::Unrecognized => self.unrecognized += 1,
        }
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines (successful: {}, failed: {}, unfinished: {}, resumed: {}, other: {}, \
             unmatched resumes: {}, overwritten: {}, never resumed: {})",
            self.lines,
            self.successful,
            self.failed,
            self.unfinished,
            self.resumed,
            self.unrecognized,
            self.unmatched_resumes,
            self.overwritten,
            self.flushed,
        )
    }
}

/// Display conversion statistics
pub fn display_statistics(stats: &ConversionStats) {
    eprintln!("stats: {stats}");
}
