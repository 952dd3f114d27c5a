//! Owned, fixed-length pixel storage.
//!
//! A [`Buffer`] is the only owner of raw pixel bytes. Views borrow from it,
//! so the borrow checker guarantees no view outlives or observes a resize of
//! the storage it points into.
//!
//! # Usage
//!
//! ```rust
//! use texel_core::Buffer;
//!
//! let mut a = Buffer::with_len(8)?;
//! a.write(&[1, 2, 3, 4, 5, 6, 7, 8])?;
//!
//! let b = a.clone();
//! assert_eq!(a.as_slice(), b.as_slice());
//! assert_ne!(a.as_slice().as_ptr(), b.as_slice().as_ptr());
//! # Ok::<(), texel_core::Error>(())
//! ```

use crate::error::{Error, Result};

/// Owned byte storage for pixel data.
///
/// `Clone` produces an independent deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates a zero-filled buffer of `len` bytes.
    pub fn with_len(len: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.allocate(len)?;
        Ok(buffer)
    }

    /// Wraps an existing byte vector.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Allocates `len` zeroed bytes, replacing the current content.
    ///
    /// Does nothing when the buffer already holds exactly `len` bytes.
    pub fn allocate(&mut self, len: usize) -> Result<()> {
        if self.data.len() == len {
            return Ok(());
        }

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.resize(len, 0);
        self.data = data;
        Ok(())
    }

    /// Overwrites the whole buffer with `bytes`.
    ///
    /// Fails with [`Error::LengthMismatch`] unless `bytes.len() == self.len()`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.data.len() {
            return Err(Error::LengthMismatch {
                expected: self.data.len(),
                actual: bytes.len(),
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Sets every byte to zero.
    pub fn zero_fill(&mut self) {
        self.data.fill(0);
    }

    /// Copies `other` into this buffer, reallocating if the lengths differ.
    pub fn copy_from(&mut self, other: &Buffer) -> Result<()> {
        self.allocate(other.len())?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no bytes are allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the bytes mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer, returning its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_same_length_keeps_content() {
        let mut buffer = Buffer::with_len(4).unwrap();
        buffer.write(&[9, 8, 7, 6]).unwrap();
        buffer.allocate(4).unwrap();
        assert_eq!(buffer.as_slice(), &[9, 8, 7, 6]);

        buffer.allocate(2).unwrap();
        assert_eq!(buffer.as_slice(), &[0, 0]);
    }

    #[test]
    fn write_rejects_wrong_length() {
        let mut buffer = Buffer::with_len(3).unwrap();
        let err = buffer.write(&[1, 2]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 3, actual: 2 }));
        assert_eq!(buffer.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn copy_from_resizes() {
        let src = Buffer::from_vec(vec![1, 2, 3, 4, 5]);
        let mut dst = Buffer::with_len(2).unwrap();
        dst.copy_from(&src).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn clone_is_deep() {
        let mut src = Buffer::from_vec(vec![1, 2, 3]);
        let copy = src.clone();
        assert_ne!(src.as_slice().as_ptr(), copy.as_slice().as_ptr());
        src.zero_fill();
        assert_eq!(copy.as_slice(), &[1, 2, 3]);
        assert_eq!(src.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn huge_allocation_fails() {
        let mut buffer = Buffer::new();
        let err = buffer.allocate(usize::MAX).unwrap_err();
        assert!(err.is_allocation_error());
    }
}
