//! strace line parsing
//!
//! - [`shape`]: which of the five line shapes a line has
//! - [`fields`]: structured fields for a classified line
//! - [`timestamp`]: `seconds.fraction` to integer encoding

pub mod fields;
pub mod shape;
pub mod timestamp;

pub use fields::{extract, RawFields};
pub use shape::{classify, Shape};
pub use timestamp::TimestampEncoding;

/// Classify and extract in one step.
///
/// # Errors
/// See [`extract`].
pub fn parse_line(line: &str) -> Result<(Shape, Option<RawFields>), crate::domain::ParseError> {
    let shape = classify(line);
    extract(line, shape).map(|fields| (shape, fields))
}
