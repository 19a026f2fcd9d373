//! Field extraction for classified trace lines

use crate::domain::{ParseError, Tid};

use super::shape::Shape;

/// Raw fields of one recognized trace line.
///
/// Timestamps stay as text here; encoding into integer ticks is the caller's
/// choice (see [`super::TimestampEncoding`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub tid: Tid,
    pub timestamp: String,
    pub call: String,
    /// Opaque argument text.
    pub args: String,
    /// Present for complete and resumed lines only.
    pub return_value: Option<String>,
    /// Present for complete and resumed lines only.
    pub duration: Option<String>,
}

/// Extract fields from a line already classified as `shape`.
///
/// Returns `Ok(None)` for [`Shape::Unrecognized`].
///
/// # Errors
/// - [`ParseError::ThreadId`] if the thread id does not fit a `u32`
/// - [`ParseError::PatternMismatch`] if `shape` does not actually describe `line`
pub fn extract(line: &str, shape: Shape) -> Result<Option<RawFields>, ParseError> {
    let Some(pattern) = shape.pattern() else {
        return Ok(None);
    };

    let caps = pattern.captures(line).ok_or_else(|| ParseError::PatternMismatch {
        shape: shape.category(),
        line: line.to_string(),
    })?;
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let tid_str = group(1);
    let tid = tid_str
        .parse::<u32>()
        .map(Tid)
        .map_err(|_| ParseError::ThreadId(tid_str.to_string()))?;

    let args = match shape {
        Shape::StartedUnfinished => group(4).trim_end().to_string(),
        Shape::ResumedDetached => resumed_tail(group(4)).to_string(),
        _ => group(4).to_string(),
    };

    let (return_value, duration) = if shape == Shape::StartedUnfinished {
        (None, None)
    } else {
        (Some(group(5).to_string()), Some(group(6).to_string()))
    };

    Ok(Some(RawFields {
        tid,
        timestamp: group(2).to_string(),
        call: group(3).to_string(),
        args,
        return_value,
        duration,
    }))
}

/// `, "data", 4)` -> `"data", 4`
fn resumed_tail(tail: &str) -> &str {
    let tail = tail.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    let tail = tail.trim_end();
    tail.strip_suffix(')').unwrap_or(tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::classify;

    fn parse(line: &str) -> RawFields {
        extract(line, classify(line)).unwrap().expect("line should be recognized")
    }

    #[test]
    fn test_extract_complete_success() {
        let fields = parse(r#"1234 100.500000 open("/tmp/x", O_RDONLY) = 3 <0.000010>"#);
        assert_eq!(fields.tid, Tid(1234));
        assert_eq!(fields.timestamp, "100.500000");
        assert_eq!(fields.call, "open");
        assert_eq!(fields.args, r#""/tmp/x", O_RDONLY"#);
        assert_eq!(fields.return_value.as_deref(), Some("3"));
        assert_eq!(fields.duration.as_deref(), Some("0.000010"));
    }

    #[test]
    fn test_extract_empty_args() {
        let fields = parse("99 1.000001 getppid() = 1 <0.000002>");
        assert_eq!(fields.call, "getppid");
        assert_eq!(fields.args, "");
    }

    #[test]
    fn test_extract_complete_failure() {
        let fields = parse(
            r#"77 2.000000 stat("/nope", 0x7ffd) = -1 ENOENT (No such file or directory) <0.000005>"#,
        );
        assert_eq!(fields.args, r#""/nope", 0x7ffd"#);
        assert_eq!(
            fields.return_value.as_deref(),
            Some("-1 ENOENT (No such file or directory)")
        );
        assert_eq!(fields.duration.as_deref(), Some("0.000005"));
    }

    #[test]
    fn test_extract_unfinished() {
        let fields = parse("1234 100.500000 read(3, <unfinished ...>");
        assert_eq!(fields.call, "read");
        assert_eq!(fields.args, "3,");
        assert_eq!(fields.return_value, None);
        assert_eq!(fields.duration, None);
    }

    #[test]
    fn test_extract_resumed() {
        let fields = parse(r#"1234 100.600000 <... read resumed>, "data", 4) = 4 <0.000020>"#);
        assert_eq!(fields.tid, Tid(1234));
        assert_eq!(fields.timestamp, "100.600000");
        assert_eq!(fields.call, "read");
        assert_eq!(fields.args, r#""data", 4"#);
        assert_eq!(fields.return_value.as_deref(), Some("4"));
        assert_eq!(fields.duration.as_deref(), Some("0.000020"));
    }

    #[test]
    fn test_extract_unrecognized_is_none() {
        let line = "1234 100.700000 +++ exited with 0 +++";
        assert_eq!(extract(line, Shape::Unrecognized).unwrap(), None);
    }

    #[test]
    fn test_extract_with_wrong_shape_is_mismatch() {
        let line = r#"1234 100.500000 open("/tmp/x", O_RDONLY) = 3 <0.000010>"#;
        let err = extract(line, Shape::ResumedDetached).unwrap_err();
        assert!(matches!(err, ParseError::PatternMismatch { shape: "detached", .. }));
    }

    #[test]
    fn test_extract_thread_id_overflow() {
        let line = "99999999999 1.000000 getpid() = 1 <0.000001>";
        let err = extract(line, classify(line)).unwrap_err();
        assert!(matches!(err, ParseError::ThreadId(_)));
    }

    #[test]
    fn test_resumed_tail() {
        assert_eq!(resumed_tail(r#", "data", 4)"#), r#""data", 4"#);
        assert_eq!(resumed_tail(r#""data", 4)"#), r#""data", 4"#);
        assert_eq!(resumed_tail(")"), "");
        assert_eq!(resumed_tail(""), "");
    }
}
