// SPDX-License-Identifier: Apache-2.0

//! Error kinds surfaced by the codec core. See the module docs on
//! [`crate::wire`] and [`crate::buffer`] for where each variant originates.

/// The exhaustive set of ways a codec operation can fail.
///
/// Every fallible operation in this crate returns a `Result<_, CodecError>`;
/// there is no ambient panic or exception channel. Callers match on the
/// variant to decide whether a failure indicates a data problem (malformed
/// input) or a misuse problem (offset out of range, buffer too small).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    /// A read required more bytes than remain up to the current limit.
    #[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
    Underflow {
        /// Number of bytes the operation required.
        needed: usize,
        /// Number of bytes actually available.
        remaining: usize,
    },

    /// A write required more bytes than remain up to the current limit.
    #[error("buffer overflow: needed {needed} bytes, {remaining} remaining")]
    Overflow {
        /// Number of bytes the operation required.
        needed: usize,
        /// Number of bytes actually available.
        remaining: usize,
    },

    /// An absolute offset/length pair fell outside the region.
    #[error("offset {offset} with length {length} is out of bounds for region of size {region_len}")]
    OutOfBounds {
        /// The offset that was requested.
        offset: usize,
        /// The length that was requested starting at `offset`.
        length: usize,
        /// The size of the region being addressed.
        region_len: usize,
    },

    /// A negative length or otherwise invalid call parameter was supplied.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A varint ran past the 10-byte ceiling, an unsupported wire type
    /// (group start/end) was encountered, or a VARINT-BOOL field held a
    /// value other than 0 or 1.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A length-delimited payload's declared length exceeded the configured
    /// maximum.
    #[error("length-delimited payload of {declared} bytes exceeds configured maximum of {max}")]
    SizeLimitExceeded {
        /// The length prefix read from the wire.
        declared: u64,
        /// The configured ceiling it was checked against.
        max: u64,
    },

    /// Nested MESSAGE recursion exceeded the configured maximum depth.
    #[error("message nesting exceeds configured maximum depth of {max_depth}")]
    MaxDepthExceeded {
        /// The configured depth ceiling.
        max_depth: u32,
    },

    /// The underlying stream or channel reported an I/O failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// An internal invariant was violated, e.g. a `Bytes` implementation
    /// wrote fewer bytes than its reported length.
    #[error("internal codec invariant violated: {0}")]
    Internal(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for CodecError {
    fn from(err: std::str::Utf8Error) -> Self {
        CodecError::MalformedEncoding(format!("invalid utf-8: {err}"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;
