//! Structured error types for stracefile
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid thread id '{0}'")]
    ThreadId(String),

    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    /// The classifier accepted a line that its own pattern cannot capture.
    #[error("Line classified as {shape} but fields could not be captured: {line}")]
    PatternMismatch { shape: &'static str, line: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create trace file {path}: {source}")]
    CreateFailed { path: String, source: std::io::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TracerError {
    #[error("strace binary '{0}' not found in PATH")]
    NotFound(String),

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed { program: String, source: std::io::Error },

    #[error("Failed waiting for strace: {0}")]
    WaitFailed(std::io::Error),

    #[error("Failed to signal strace (pid {pid}): {source}")]
    SignalFailed { pid: u32, source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::ThreadId("abc".to_string());
        assert_eq!(err.to_string(), "Invalid thread id 'abc'");
    }

    #[test]
    fn test_pattern_mismatch_display() {
        let err = ParseError::PatternMismatch {
            shape: "unfinished",
            line: "1 1.0 read(".to_string(),
        };
        assert!(err.to_string().contains("unfinished"));
        assert!(err.to_string().contains("1 1.0 read("));
    }

    #[test]
    fn test_tracer_not_found_display() {
        let err = TracerError::NotFound("strace".to_string());
        assert!(err.to_string().contains("strace"));
    }
}
