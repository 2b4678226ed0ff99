use thiserror::Error;

/// Everything that can go wrong turning bytes into typed values or back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("attempted to read {requested} bytes with only {available} available")]
    ReadBeyondData { requested: usize, available: usize },

    #[error("integer overflow encoding or decoding a wire value")]
    Overflow,

    #[error("compact-size integer was not encoded in canonical (minimal) form")]
    NonCanonicalCompactSize,

    #[error("compact-size integer {0} exceeds the configured maximum")]
    CompactSizeTooBig(u64),

    #[error("string or byte vector of {0} bytes exceeds the maximum allowed length")]
    StringTooBig(usize),

    #[error("{0} is not a valid discriminant for this enum")]
    InvalidEnumValue(u32),

    #[error("{0:#x} is not a recognized rejection code")]
    InvalidRejectionCode(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
