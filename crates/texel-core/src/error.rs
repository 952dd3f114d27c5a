//! Error types for texel-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the layout layer:
//! - Buffer operations (allocation, length-checked writes)
//! - View copies between incompatible layouts
//! - Composite texture sizing (alignment, slot binding)
//!
//! Constructing a view from an invalid format or zero extent is *not* an
//! error: such views degrade to the empty state and report zero dimensions.
//!
//! # Usage
//!
//! ```rust
//! use texel_core::{Buffer, Error};
//!
//! let mut buffer = Buffer::with_len(4).unwrap();
//! let err = buffer.write(&[1, 2, 3]).unwrap_err();
//! assert!(matches!(err, Error::LengthMismatch { expected: 4, actual: 3 }));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - [`crate::buffer::Buffer`] - Allocation and writes
//! - [`crate::view::copy_data`] / [`crate::block::copy_block_data`] - Layout checks
//! - [`crate::composite::CompositeImg`] - Extent and binding validation
//! - `texel-io` - Wrapped as `IoError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by buffers, views and composite textures.
///
/// # Categories
///
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
/// - **Length errors**: [`LengthMismatch`](Error::LengthMismatch)
/// - **Layout errors**: [`DimensionMismatch`](Error::DimensionMismatch),
///   [`InvalidAlignment`](Error::InvalidAlignment), [`OutOfBounds`](Error::OutOfBounds),
///   [`InvalidSlot`](Error::InvalidSlot), [`UnknownBuffer`](Error::UnknownBuffer)
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat)
#[derive(Debug, Error)]
pub enum Error {
    /// Memory allocation failed.
    ///
    /// Returned when the allocator cannot reserve a buffer of the requested
    /// length. Never retried.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// A write supplied a different number of bytes than the buffer holds.
    #[error("length mismatch: buffer holds {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Buffer length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Source and destination layouts are incompatible for a copy.
    ///
    /// The source must fit inside the destination and share its channel
    /// count and bit depth (or block format). No conversion is attempted.
    #[error("dimension mismatch: {src} does not fit {dst}")]
    DimensionMismatch {
        /// Destination layout
        dst: String,
        /// Source layout
        src: String,
    },

    /// Row alignment is not a multiple of the format's required alignment.
    #[error("alignment {alignment} is not a multiple of required alignment {required}")]
    InvalidAlignment {
        /// Alignment requested
        alignment: u32,
        /// Minimum alignment of the pixel format
        required: u32,
    },

    /// A slot binding reaches past the end of its buffer.
    #[error("range {offset}..{end} exceeds buffer of {len} bytes")]
    OutOfBounds {
        /// Start offset of the binding
        offset: usize,
        /// End offset of the binding
        end: usize,
        /// Buffer length
        len: usize,
    },

    /// A `(level, layer, face)` slot outside the composite's table.
    #[error("slot (level {level}, layer {layer}, face {face}) is outside the texture")]
    InvalidSlot {
        /// Mip level
        level: u32,
        /// Array layer
        layer: u32,
        /// Cube face
        face: u32,
    },

    /// A binding names a buffer the composite does not own.
    #[error("no buffer at index {index}")]
    UnknownBuffer {
        /// Buffer index
        index: usize,
    },

    /// Format is not supported for this operation.
    #[error("unsupported texture format: {format}")]
    UnsupportedFormat {
        /// Format name
        format: String,
    },
}

impl Error {
    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(dst: impl Into<String>, src: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            dst: dst.into(),
            src: src.into(),
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Returns `true` if this is a layout error.
    #[inline]
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidAlignment { .. }
                | Self::OutOfBounds { .. }
                | Self::InvalidSlot { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(1 << 40, "capacity overflow");
        assert!(err.to_string().contains("capacity overflow"));
        assert!(err.is_allocation_error());
        assert!(!err.is_layout_error());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch("4x4x1 c3 b8", "8x8x1 c3 b8");
        let msg = err.to_string();
        assert!(msg.contains("8x8x1"));
        assert!(msg.contains("4x4x1"));
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = Error::LengthMismatch { expected: 16, actual: 12 };
        assert_eq!(err.to_string(), "length mismatch: buffer holds 16 bytes, got 12");
    }
}
