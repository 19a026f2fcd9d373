//! Reconciliation of started and resumed syscalls into timeline events

pub mod reconciler;
pub mod stats;

pub use reconciler::{convert, ConvertOptions, Reconciler};
pub use stats::{display_statistics, ConversionStats};
