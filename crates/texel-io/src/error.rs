//! Error types for I/O operations.
//!
//! Provides unified error handling for the KTX container and the raster
//! codecs.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed stream: bad magic, truncated data, inconsistent header.
    #[error("format error: {0}")]
    Format(String),

    /// Unsupported file or pixel format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A codec option the codec cannot honour.
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Layout or allocation failure from the core types.
    #[error(transparent)]
    Core(#[from] texel_core::Error),
}

impl IoError {
    /// Creates an [`IoError::Format`] error.
    #[inline]
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Maps an unexpected end of stream to [`IoError::Format`].
    pub(crate) fn truncated(what: &str) -> impl FnOnce(io::Error) -> Self + '_ {
        move |err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                Self::Format(format!("truncated {what}"))
            } else {
                Self::Io(err)
            }
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_becomes_format_error() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err = IoError::truncated("header")(eof);
        assert!(matches!(err, IoError::Format(ref m) if m == "truncated header"));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(IoError::truncated("header")(denied), IoError::Io(_)));
    }

    #[test]
    fn core_errors_convert() {
        let err: IoError = texel_core::Error::unsupported_format("Undefined").into();
        assert!(err.to_string().contains("Undefined"));
    }
}
