//! Encoding of strace's `<seconds>.<fraction>` strings into integer ticks
//!
//! strace with `-ttt` prints microsecond timestamps and `-T` prints durations
//! in the same shape, so both go through the same encoder.

use clap::ValueEnum;

use crate::domain::ParseError;

/// How a decimal `seconds.fraction` string becomes an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimestampEncoding {
    /// Join the integer and fractional digits as text and parse the result.
    ///
    /// `"100.500000"` becomes `100500000`. Values are only comparable when
    /// every fraction in the trace has the same number of digits.
    #[default]
    #[value(name = "concat")]
    Concatenated,
    /// `seconds * 1_000_000 + fraction`, with the fraction padded or
    /// truncated to six digits.
    #[value(name = "micros")]
    Microseconds,
}

impl TimestampEncoding {
    /// Encode a timestamp or duration string.
    ///
    /// # Errors
    /// Returns [`ParseError::Timestamp`] when the string is not a
    /// non-negative decimal or the result overflows `u64`.
    pub fn encode(self, value: &str) -> Result<u64, ParseError> {
        let invalid = || ParseError::Timestamp(value.to_string());

        let (secs, frac) = value.split_once('.').unwrap_or((value, ""));
        if secs.is_empty() || !is_digits(secs) || !is_digits(frac) {
            return Err(invalid());
        }

        match self {
            Self::Concatenated => {
                let mut joined = String::with_capacity(secs.len() + frac.len());
                joined.push_str(secs);
                joined.push_str(frac);
                joined.parse::<u64>().map_err(|_| invalid())
            }
            Self::Microseconds => {
                let secs: u64 = secs.parse().map_err(|_| invalid())?;
                let micros: String = frac.chars().chain("000000".chars()).take(6).collect();
                let micros: u64 = micros.parse().map_err(|_| invalid())?;
                secs.checked_mul(1_000_000)
                    .and_then(|s| s.checked_add(micros))
                    .ok_or_else(invalid)
            }
        }
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenated_joins_digits() {
        let enc = TimestampEncoding::Concatenated;
        assert_eq!(enc.encode("100.500000").unwrap(), 100_500_000);
        assert_eq!(enc.encode("0.000010").unwrap(), 10);
        assert_eq!(enc.encode("0.000020").unwrap(), 20);
    }

    #[test]
    fn test_concatenated_is_width_sensitive() {
        // Same instant, different fraction widths: not comparable.
        let enc = TimestampEncoding::Concatenated;
        assert_eq!(enc.encode("1.5").unwrap(), 15);
        assert_eq!(enc.encode("1.500000").unwrap(), 1_500_000);
    }

    #[test]
    fn test_microseconds_scales_fraction() {
        let enc = TimestampEncoding::Microseconds;
        assert_eq!(enc.encode("100.500000").unwrap(), 100_500_000);
        assert_eq!(enc.encode("1.5").unwrap(), 1_500_000);
        assert_eq!(enc.encode("1.123456789").unwrap(), 1_123_456);
        assert_eq!(enc.encode("7").unwrap(), 7_000_000);
    }

    #[test]
    fn test_without_fraction() {
        assert_eq!(TimestampEncoding::Concatenated.encode("42").unwrap(), 42);
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", ".5", "abc", "1.2.3", "-1.0", "1.x"] {
            assert!(
                TimestampEncoding::Concatenated.encode(bad).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_overflow() {
        let huge = "99999999999999999999.000000";
        assert!(TimestampEncoding::Concatenated.encode(huge).is_err());
        assert!(TimestampEncoding::Microseconds.encode(huge).is_err());
    }
}
