//! Standalone images owning their pixel storage.
//!
//! [`Image`] owns one [`Buffer`] and one whole-extent [`ImgRoi`] whose
//! origin is always the start of the buffer. Resizing reallocates the buffer
//! and rebuilds the geometry together. [`BlockImage`] is the same pairing
//! for block-compressed data.
//!
//! # Usage
//!
//! ```rust
//! use texel_core::{Image, PixelLayout};
//!
//! let mut img = Image::new(4, 4, 1, PixelLayout::new(3, 8), 4)?;
//! img.view_mut().set(2, 1, 0, 0, 200u8);
//!
//! let copy = img.clone();
//! assert_eq!(copy.view().at::<u8>(2, 1, 0, 0), 200);
//!
//! let bordered = texel_core::image::add_2d_border(&img.view(), 2, 1)?;
//! assert_eq!((bordered.width(), bordered.height()), (8, 8));
//! assert_eq!(bordered.view().at::<u8>(4, 3, 0, 0), 200);
//! # Ok::<(), texel_core::Error>(())
//! ```
//!
//! # Used By
//!
//! - `texel-io` raster codecs (BMP, PPM, PFM, PNG) decode into [`Image`]

use crate::block::{copy_block_data, BlockRoi, BlockView, BlockViewMut};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::format::TextureFormat;
use crate::view::{copy_data, ImgRoi, ImgView, ImgViewMut, PixelLayout};

/// A single linear image: one buffer and one view over all of it.
///
/// `Clone` is a deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    buffer: Buffer,
    roi: ImgRoi,
}

impl Image {
    /// Allocates a zeroed image with rows aligned to `alignment` bytes.
    pub fn new(width: u32, height: u32, depth: u32, layout: PixelLayout, alignment: u32) -> Result<Self> {
        let mut image = Self::default();
        image.set_size(width, height, depth, layout, alignment)?;
        Ok(image)
    }

    /// Allocates a zeroed image; alias of [`Image::new`].
    pub fn zeros(width: u32, height: u32, depth: u32, layout: PixelLayout, alignment: u32) -> Result<Self> {
        let mut image = Self::new(width, height, depth, layout, alignment)?;
        image.zero_fill();
        Ok(image)
    }

    /// Allocates a zeroed, byte-packed image with the extent and layout of `roi`.
    pub fn zeros_like(roi: &ImgRoi) -> Result<Self> {
        let mut image = Self::default();
        image.set_size_like(roi, 1)?;
        image.zero_fill();
        Ok(image)
    }

    /// Wraps an existing buffer.
    ///
    /// `roi` must start at offset 0 and fit inside `buffer`.
    pub fn from_buffer(buffer: Buffer, roi: ImgRoi) -> Result<Self> {
        ImgView::new(buffer.as_slice(), roi.with_origin(0))?;
        Ok(Self { buffer, roi: roi.with_origin(0) })
    }

    /// Reallocates storage and rebuilds the whole-image view.
    ///
    /// Keeps the existing bytes when the required length does not change.
    pub fn set_size(&mut self, width: u32, height: u32, depth: u32, layout: PixelLayout, alignment: u32) -> Result<()> {
        let roi = ImgRoi::aligned(width, height, depth, layout, alignment);
        self.buffer.allocate(roi.slice_pitch().saturating_mul(depth as usize))?;
        self.roi = roi;
        Ok(())
    }

    /// Sizes this image like `src`, ignoring its pitch in favour of `alignment`.
    pub fn set_size_like(&mut self, src: &ImgRoi, alignment: u32) -> Result<()> {
        self.set_size(src.width(), src.height(), src.depth(), src.layout(), alignment)
    }

    /// Reinterprets the existing bytes under a new shape.
    ///
    /// The new geometry must cover exactly the current buffer length;
    /// otherwise fails with [`Error::LengthMismatch`] and leaves the image
    /// unchanged.
    pub fn reshape(&mut self, width: u32, height: u32, depth: u32, layout: PixelLayout, alignment: u32) -> Result<()> {
        let roi = ImgRoi::aligned(width, height, depth, layout, alignment);
        let required = roi.slice_pitch() * depth as usize;
        if required != self.buffer.len() {
            return Err(Error::LengthMismatch {
                expected: self.buffer.len(),
                actual: required,
            });
        }
        self.roi = roi;
        Ok(())
    }

    /// Deep copy of another image, including its pitch.
    pub fn copy_from(&mut self, src: &Image) -> Result<()> {
        self.buffer.copy_from(&src.buffer)?;
        self.roi = src.roi;
        Ok(())
    }

    /// Deep copy of a view, repacked with rows aligned to `alignment`.
    pub fn copy_from_view(&mut self, src: &ImgView<'_>, alignment: u32) -> Result<()> {
        self.set_size_like(src.roi(), alignment)?;
        copy_data(&mut self.view_mut(), src)
    }

    /// Sets every byte, padding included, to zero.
    pub fn zero_fill(&mut self) {
        self.buffer.zero_fill();
    }

    /// Whole-image geometry.
    #[inline]
    pub fn roi(&self) -> &ImgRoi {
        &self.roi
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.roi.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.roi.height()
    }

    /// Depth in slices.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.roi.depth()
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.roi.channels()
    }

    /// Read-only view over the whole image.
    pub fn view(&self) -> ImgView<'_> {
        ImgView::from_parts(self.buffer.as_slice(), self.roi)
    }

    /// Mutable view over the whole image.
    pub fn view_mut(&mut self) -> ImgViewMut<'_> {
        ImgViewMut::from_parts(self.buffer.as_mut_slice(), self.roi)
    }

    /// Underlying storage.
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Splits the image into its buffer and geometry.
    pub fn into_parts(self) -> (Buffer, ImgRoi) {
        (self.buffer, self.roi)
    }
}

/// Creates an image `2 * border` pixels wider and taller than `src` and
/// copies `src` into its centre. Border pixels are zero.
pub fn add_2d_border(src: &ImgView<'_>, border: u32, alignment: u32) -> Result<Image> {
    if src.is_empty() {
        return Err(Error::dimension_mismatch(
            format!("{border}-pixel border"),
            format!("empty {}x{}x{} source", src.width(), src.height(), src.depth()),
        ));
    }
    let mut dst = Image::new(
        src.width() + 2 * border,
        src.height() + 2 * border,
        src.depth(),
        src.layout(),
        alignment,
    )?;
    let mut view = dst.view_mut();
    let mut inner = view.sub_region_mut(
        border,
        border,
        0,
        src.width() + border - 1,
        src.height() + border - 1,
        src.depth() - 1,
    );
    copy_data(&mut inner, src)?;
    Ok(dst)
}

/// A single block-compressed image: one buffer and one view over all of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockImage {
    buffer: Buffer,
    roi: BlockRoi,
}

impl BlockImage {
    /// Allocates a zeroed block image.
    ///
    /// A non-block format or zero extent yields an empty image.
    pub fn new(format: TextureFormat, width: u32, height: u32, depth: u32) -> Result<Self> {
        let mut image = Self::default();
        image.set_size(format, width, height, depth)?;
        Ok(image)
    }

    /// Reallocates storage and rebuilds the whole-image view.
    pub fn set_size(&mut self, format: TextureFormat, width: u32, height: u32, depth: u32) -> Result<()> {
        let roi = BlockRoi::new(format, width, height, depth);
        self.buffer.allocate(roi.slice_pitch().saturating_mul(roi.depth() as usize))?;
        self.roi = roi;
        Ok(())
    }

    /// Sizes this image like `src`.
    pub fn set_size_like(&mut self, src: &BlockRoi) -> Result<()> {
        self.set_size(src.format(), src.width(), src.height(), src.depth())
    }

    /// Deep copy of a block view into fresh, tightly packed storage.
    pub fn copy_from_view(&mut self, src: &BlockView<'_>) -> Result<()> {
        self.set_size_like(src.roi())?;
        copy_block_data(&mut self.view_mut(), src)
    }

    /// Whole-image geometry.
    #[inline]
    pub fn roi(&self) -> &BlockRoi {
        &self.roi
    }

    /// Read-only view over the whole image.
    pub fn view(&self) -> BlockView<'_> {
        BlockView::from_parts(self.buffer.as_slice(), self.roi)
    }

    /// Mutable view over the whole image.
    pub fn view_mut(&mut self) -> BlockViewMut<'_> {
        BlockViewMut::from_parts(self.buffer.as_mut_slice(), self.roi)
    }

    /// Underlying storage.
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}
