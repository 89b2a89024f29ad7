//! Protocol error types.
//!
//! Every variant is recoverable: the decode pipeline logs the error, drops
//! the offending unit and resynchronizes at the next line or frame boundary.

use thiserror::Error;

/// Errors raised while decoding VE.Direct text lines or HEX frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte sum of the frame does not match the protocol constant.
    #[error("frame checksum mismatch: byte sum 0x{actual:02X}, expected 0x{expected:02X}")]
    ChecksumMismatch {
        /// Sum of all decoded bytes modulo 256.
        actual: u8,
        /// The fixed protocol constant.
        expected: u8,
    },

    /// The frame is shorter than its own header declares.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual decoded length.
        actual: usize,
    },

    /// The frame carries more bytes than its own header declares.
    #[error("frame length mismatch: declared {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Length the header declares.
        expected: usize,
        /// Actual decoded length.
        actual: usize,
    },

    /// A text line did not split into exactly two tab-separated fields.
    #[error("malformed text line ({fields} fields): {line:?}")]
    SyntaxError {
        /// Number of fields the line split into.
        fields: usize,
        /// The offending line.
        line: String,
    },

    /// The text tag is absent from the parameter catalog.
    #[error("unknown parameter tag: {0:?}")]
    UnknownTag(String),

    /// The register id is absent from the register catalog.
    #[error("unknown register id: 0x{0:04X}")]
    UnknownRegister(u16),

    /// A string-typed payload was not valid UTF-8.
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,
}
