//! Error types used by this lib.
use thiserror::Error;

/// Errors raised while decoding a compressed beamforming report.
///
/// A frame that fails to decode is not recoverable; callers are expected
/// to drop it and continue with the next captured frame.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Unsupported action frame category: {category:#04x}")]
    UnknownCategory { category: u8 },
    #[error("Frame truncated: required {required} more byte(s), {available} available")]
    TruncatedFrame { required: usize, available: usize },
    #[error("No entry in {table} table for key {key}")]
    InvalidConfiguration { table: &'static str, key: String },
    #[error("Angle sequence of length {actual} where reconstruction requires {expected}")]
    MalformedAngleSequence { expected: usize, actual: usize },
}
