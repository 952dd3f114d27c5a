//! I/O traits for raster image readers and writers.
//!
//! These traits define the interface for the single-image codecs. Readers
//! produce an owned [`Image`]; writers accept any linear view, so a slot of
//! a composite texture can be written without copying it out first.

use crate::IoResult;
use std::path::Path;
use texel_core::{Image, ImgView};

/// Trait for image format readers.
///
/// # Example
///
/// ```rust,ignore
/// use texel_io::{ImageReader, IoResult};
/// use texel_core::Image;
///
/// struct MyFormatReader;
///
/// impl ImageReader for MyFormatReader {
///     fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
///         // Memory read implementation
///     }
/// }
/// ```
pub trait ImageReader {
    /// Reads an image from a file path.
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let data = std::fs::read(path.as_ref())?;
        self.read_from_memory(&data)
    }

    /// Reads an image from memory.
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image>;
}

/// Trait for image format writers.
pub trait ImageWriter {
    /// Writes an image to a file path.
    fn write<P: AsRef<Path>>(&self, path: P, image: &ImgView<'_>) -> IoResult<()> {
        let bytes = self.write_to_memory(image)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Writes an image to memory.
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>>;
}
