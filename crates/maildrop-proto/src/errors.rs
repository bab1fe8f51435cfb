//! Error types for the maildrop wire format.
//!
//! All errors are structured, testable, and carry the sizes or values that
//! caused the rejection.

use thiserror::Error;

/// Protocol-level errors that can occur during frame parsing and encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer is shorter than the fixed layout it must contain
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum size in bytes
        expected: usize,
        /// Actual size available
        actual: usize,
    },

    /// Frame is truncated (header claims more body bytes than are available)
    #[error("frame truncated: header claims {expected} payload bytes, but only {actual} available")]
    FrameTruncated {
        /// Payload size declared in the header
        expected: usize,
        /// Actual bytes available after the header
        actual: usize,
    },

    /// Declared payload exceeds the maximum allowed size
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Declared payload size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// A declared length is inconsistent with the bytes actually present
    #[error("payload size mismatch: header says {header} bytes, actual {actual}")]
    PayloadSizeMismatch {
        /// Size declared by the enclosing header or sub-header
        header: usize,
        /// Actual size present (or required by the fixed layout)
        actual: usize,
    },

    /// Unknown request code
    #[error("invalid request code: {0}")]
    InvalidRequestCode(u16),

    /// Unknown response code
    #[error("invalid response code: {0}")]
    InvalidResponseCode(u16),

    /// Client name does not fit the fixed 255-byte name field
    #[error("name too long: {len} bytes exceeds the {max}-byte name field")]
    NameTooLong {
        /// Encoded length of the offending name
        len: usize,
        /// Width of the wire field
        max: usize,
    },

    /// Client name bytes are not valid UTF-8 after padding is stripped
    #[error("name is not valid UTF-8")]
    NameNotUtf8,
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
