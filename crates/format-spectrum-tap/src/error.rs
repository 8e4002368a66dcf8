use thiserror::Error;

/// Errors raised while reading or writing a TAP image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TapError {
    #[error("truncated TAP file: expected 2-byte length at offset {offset}")]
    TruncatedLength { offset: usize },

    #[error("TAP block at offset {offset} has length {len}, minimum is 2 (flag + checksum)")]
    BlockTooShort { offset: usize, len: usize },

    #[error("truncated TAP block at offset {offset}: need {needed} bytes, only {remaining} remain")]
    TruncatedBlock {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("TAP block at offset {offset}: checksum mismatch (expected ${expected:02X}, got ${actual:02X})")]
    ChecksumMismatch {
        offset: usize,
        expected: u8,
        actual: u8,
    },

    #[error("TAP block {index} is {len} bytes, longer than a length word can hold")]
    BlockTooLong { index: usize, len: usize },
}
