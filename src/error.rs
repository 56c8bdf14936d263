use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferError>;

/// Named input segment, used to report where a source ran dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    A,
    B,
    C,
    Lut,
    Output,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Segment::A => "A",
            Segment::B => "B",
            Segment::C => "C",
            Segment::Lut => "LUT",
            Segment::Output => "output",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum InferError {
    /// The source ended before the segment was filled.
    #[error("input starved in segment {segment}: expected {expected} scalars, got {received}")]
    Starved { segment: Segment, expected: usize, received: usize },

    #[error("bad scalar token {token:?}: {source}")]
    Parse {
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("vector length mismatch: expected {expected}, got {actual}")]
    Length { expected: usize, actual: usize },

    /// The end-of-message flag was missing or arrived early.
    #[error("stream framing error at word {index}: {reason}")]
    Framing { index: usize, reason: &'static str },

    #[error("stream consumer disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
