//! Strided windows over linear pixel data.
//!
//! An [`ImgRoi`] describes how a run of bytes is laid out as a 1D/2D/3D grid
//! of pixels: extent, channel count, bits per channel, row pitch and slice
//! pitch, plus the byte offset of pixel `(0, 0, 0)` within its backing
//! storage. It owns nothing and is `Copy`.
//!
//! [`ImgView`] and [`ImgViewMut`] pair an [`ImgRoi`] with a borrowed slice,
//! giving bounds-checked typed access. Sub-regions inherit the parent's
//! pitches, so a sub-region stays correctly strided inside the parent's
//! memory without copying.
//!
//! # Layout
//!
//! ```text
//! offset(x, y, z, c) = origin + z * slice_pitch + y * pitch
//!                    + x * bytes_per_pixel + c * bytes_per_channel
//! ```
//!
//! # Usage
//!
//! ```rust
//! use texel_core::view::{calc_pitch, ImgRoi, ImgView, PixelLayout};
//!
//! let layout = PixelLayout::new(3, 8);
//! let roi = ImgRoi::aligned(5, 4, 1, layout, 4);
//! assert_eq!(roi.pitch(), 16);
//! assert_eq!(calc_pitch(5, 3, 8, 0), 15);
//!
//! let bytes = vec![0u8; roi.byte_len()];
//! let view = ImgView::new(&bytes, roi)?;
//! let sub = view.sub_region(1, 1, 0, 3, 2, 0);
//! assert_eq!((sub.width(), sub.height()), (3, 2));
//! assert_eq!(sub.pitch(), 16);
//! # Ok::<(), texel_core::Error>(())
//! ```

use std::ops::Deref;

use crate::error::{Error, Result};
use crate::format::TextureFormat;
use crate::sample::Sample;

const WIDTH: usize = 0;
const HEIGHT: usize = 1;
const DEPTH: usize = 2;
const CHANNELS: usize = 3;

/// Bytes needed for `width` pixels of `channels * bpc` bits, rounded up to
/// a multiple of `alignment`.
///
/// Partial bytes round up. An `alignment` of 0 or 1 leaves the byte count
/// unrounded.
pub fn calc_pitch(width: u32, channels: u32, bpc: u32, alignment: u32) -> usize {
    let bits = width as u64 * channels as u64 * bpc as u64;
    let bytes = bits.div_ceil(8) as usize;
    if alignment > 0 {
        bytes.div_ceil(alignment as usize) * alignment as usize
    } else {
        bytes
    }
}

/// Channel layout of a linear pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelLayout {
    /// Channels per pixel.
    pub channels: u32,
    /// Bits per channel.
    pub bpc: u32,
    /// Signed storage (always true for float data).
    pub signed: bool,
    /// Floating-point storage.
    pub float: bool,
}

impl PixelLayout {
    /// Unsigned integer layout.
    pub const fn new(channels: u32, bpc: u32) -> Self {
        Self { channels, bpc, signed: false, float: false }
    }

    /// Floating-point layout.
    pub const fn float(channels: u32, bpc: u32) -> Self {
        Self { channels, bpc, signed: true, float: true }
    }

    /// Sets the signed flag.
    pub const fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Layout used to store a linear texture format.
    pub fn from_format(format: TextureFormat) -> Option<Self> {
        let desc = format.pixel_desc()?;
        let (channels, bpc) = desc.storage_layout();
        Some(Self { channels, bpc, signed: desc.signed, float: desc.float })
    }

    /// Bytes per pixel, truncated.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.channels as usize * self.bpc as usize) >> 3
    }
}

/// Geometry of a linear view: extent, channel layout, pitches and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImgRoi {
    dims: [u32; 4],
    bpc: u32,
    signed: bool,
    float: bool,
    pitch: usize,
    slice_pitch: usize,
    origin: usize,
}

impl ImgRoi {
    /// Creates a geometry with caller-supplied pitches at origin 0.
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        layout: PixelLayout,
        pitch: usize,
        slice_pitch: usize,
    ) -> Self {
        Self {
            dims: [width, height, depth, layout.channels],
            bpc: layout.bpc,
            signed: layout.signed,
            float: layout.float,
            pitch,
            slice_pitch,
            origin: 0,
        }
    }

    /// Creates a tightly packed geometry whose rows are aligned to `alignment` bytes.
    ///
    /// The slice pitch saturates at `usize::MAX` for extents no buffer could
    /// hold, so sizes derived from it fail allocation or bounds checks.
    pub fn aligned(width: u32, height: u32, depth: u32, layout: PixelLayout, alignment: u32) -> Self {
        let pitch = calc_pitch(width, layout.channels, layout.bpc, alignment);
        Self::new(width, height, depth, layout, pitch, pitch.saturating_mul(height as usize))
    }

    /// Returns the same geometry moved to byte offset `origin`.
    #[inline]
    pub fn with_origin(mut self, origin: usize) -> Self {
        self.origin = origin;
        self
    }

    /// `[width, height, depth, channels]`.
    #[inline]
    pub fn dims(&self) -> [u32; 4] {
        self.dims
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.dims[WIDTH]
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.dims[HEIGHT]
    }

    /// Depth in slices.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.dims[DEPTH]
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.dims[CHANNELS]
    }

    /// Bits per channel.
    #[inline]
    pub fn bpc(&self) -> u32 {
        self.bpc
    }

    /// Bytes between consecutive rows.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Bytes between consecutive slices.
    #[inline]
    pub fn slice_pitch(&self) -> usize {
        self.slice_pitch
    }

    /// Signed storage.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Floating-point storage.
    #[inline]
    pub fn is_float(&self) -> bool {
        self.float
    }

    /// Byte offset of pixel `(0, 0, 0)` in the backing storage.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Channel layout.
    #[inline]
    pub fn layout(&self) -> PixelLayout {
        PixelLayout {
            channels: self.channels(),
            bpc: self.bpc,
            signed: self.signed,
            float: self.float,
        }
    }

    /// Returns `true` if any axis has zero extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0 || self.depth() == 0
    }

    /// Bytes of pixel data in one row, without padding.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        calc_pitch(self.width(), self.channels(), self.bpc, 0)
    }

    /// Bytes per pixel.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.layout().bytes_per_pixel()
    }

    /// Span in bytes from the origin to the end of the last row.
    pub fn byte_len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.depth() as usize - 1) * self.slice_pitch
            + (self.height() as usize - 1) * self.pitch
            + self.row_bytes()
    }

    /// Byte offset of channel `c` of pixel `(x, y, z)`.
    #[inline]
    pub fn offset_at(&self, x: u32, y: u32, z: u32, c: u32) -> usize {
        self.origin
            + z as usize * self.slice_pitch
            + y as usize * self.pitch
            + x as usize * self.bytes_per_pixel()
            + c as usize * (self.bpc as usize >> 3)
    }

    /// Sub-region over the inclusive box `[left, right] x [top, bottom] x [front, back]`.
    ///
    /// Pitches are inherited. The box must lie inside this region with
    /// `left <= right`, `top <= bottom` and `front <= back`.
    pub fn sub_region(&self, left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        debug_assert!(left <= right && right < self.width(), "x range {left}..={right} outside {}", self.width());
        debug_assert!(top <= bottom && bottom < self.height(), "y range {top}..={bottom} outside {}", self.height());
        debug_assert!(front <= back && back < self.depth(), "z range {front}..={back} outside {}", self.depth());

        Self {
            dims: [right - left + 1, bottom - top + 1, back - front + 1, self.channels()],
            origin: self.offset_at(left, top, front, 0),
            ..*self
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}x{}x{} c{} b{}",
            self.width(),
            self.height(),
            self.depth(),
            self.channels(),
            self.bpc
        )
    }

    fn check_within(&self, len: usize) -> Result<()> {
        let end = self.origin + self.byte_len();
        if end > len {
            return Err(Error::OutOfBounds { offset: self.origin, end, len });
        }
        Ok(())
    }
}

/// Read-only linear view borrowing its bytes.
#[derive(Debug, Clone, Copy)]
pub struct ImgView<'a> {
    data: &'a [u8],
    roi: ImgRoi,
}

impl<'a> ImgView<'a> {
    pub(crate) fn from_parts(data: &'a [u8], roi: ImgRoi) -> Self {
        debug_assert!(roi.origin + roi.byte_len() <= data.len());
        Self { data, roi }
    }

    /// Binds `roi` to `data`.
    ///
    /// Fails with [`Error::OutOfBounds`] if the region reaches past `data`.
    pub fn new(data: &'a [u8], roi: ImgRoi) -> Result<Self> {
        roi.check_within(data.len())?;
        Ok(Self { data, roi })
    }

    /// An empty view with zero extent.
    pub fn empty() -> Self {
        Self { data: &[], roi: ImgRoi::default() }
    }

    /// Geometry of this view.
    #[inline]
    pub fn roi(&self) -> &ImgRoi {
        &self.roi
    }

    /// Entire backing slice.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes from the origin to the end of the last row.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[self.roi.origin..self.roi.origin + self.roi.byte_len()]
    }

    /// Reads channel `c` of pixel `(x, y, z)` as `T`.
    ///
    /// # Panics
    ///
    /// Panics if the location is outside the backing slice.
    #[inline]
    pub fn at<T: Sample>(&self, x: u32, y: u32, z: u32, c: u32) -> T {
        T::read_ne(&self.data[self.roi.offset_at(x, y, z, c)..])
    }

    /// All channels of pixel `(x, y, z)`.
    #[inline]
    pub fn pixel_bytes(&self, x: u32, y: u32, z: u32) -> &'a [u8] {
        let start = self.roi.offset_at(x, y, z, 0);
        &self.data[start..start + self.roi.bytes_per_pixel()]
    }

    /// Pixel bytes of row `y` in slice `z`, without padding.
    #[inline]
    pub fn row(&self, y: u32, z: u32) -> &'a [u8] {
        let start = self.roi.offset_at(0, y, z, 0);
        &self.data[start..start + self.roi.row_bytes()]
    }

    /// Sub-region view; see [`ImgRoi::sub_region`].
    pub fn sub_region(&self, left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        Self {
            data: self.data,
            roi: self.roi.sub_region(left, top, front, right, bottom, back),
        }
    }
}

impl Deref for ImgView<'_> {
    type Target = ImgRoi;

    fn deref(&self) -> &ImgRoi {
        &self.roi
    }
}

/// Mutable linear view borrowing its bytes.
#[derive(Debug)]
pub struct ImgViewMut<'a> {
    data: &'a mut [u8],
    roi: ImgRoi,
}

impl<'a> ImgViewMut<'a> {
    pub(crate) fn from_parts(data: &'a mut [u8], roi: ImgRoi) -> Self {
        debug_assert!(roi.origin + roi.byte_len() <= data.len());
        Self { data, roi }
    }

    /// Binds `roi` to `data`.
    ///
    /// Fails with [`Error::OutOfBounds`] if the region reaches past `data`.
    pub fn new(data: &'a mut [u8], roi: ImgRoi) -> Result<Self> {
        roi.check_within(data.len())?;
        Ok(Self { data, roi })
    }

    /// Geometry of this view.
    #[inline]
    pub fn roi(&self) -> &ImgRoi {
        &self.roi
    }

    /// Reborrows as a read-only view.
    #[inline]
    pub fn as_view(&self) -> ImgView<'_> {
        ImgView { data: &*self.data, roi: self.roi }
    }

    /// Reads channel `c` of pixel `(x, y, z)` as `T`.
    #[inline]
    pub fn at<T: Sample>(&self, x: u32, y: u32, z: u32, c: u32) -> T {
        T::read_ne(&self.data[self.roi.offset_at(x, y, z, c)..])
    }

    /// Writes channel `c` of pixel `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the location is outside the backing slice.
    #[inline]
    pub fn set<T: Sample>(&mut self, x: u32, y: u32, z: u32, c: u32, value: T) {
        let offset = self.roi.offset_at(x, y, z, c);
        value.write_ne(&mut self.data[offset..]);
    }

    /// All channels of pixel `(x, y, z)`, mutably.
    #[inline]
    pub fn pixel_bytes_mut(&mut self, x: u32, y: u32, z: u32) -> &mut [u8] {
        let start = self.roi.offset_at(x, y, z, 0);
        let len = self.roi.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Pixel bytes of row `y` in slice `z`, mutably.
    #[inline]
    pub fn row_mut(&mut self, y: u32, z: u32) -> &mut [u8] {
        let start = self.roi.offset_at(0, y, z, 0);
        let len = self.roi.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Mutable sub-region view; see [`ImgRoi::sub_region`].
    pub fn sub_region_mut(
        &mut self,
        left: u32,
        top: u32,
        front: u32,
        right: u32,
        bottom: u32,
        back: u32,
    ) -> ImgViewMut<'_> {
        ImgViewMut {
            roi: self.roi.sub_region(left, top, front, right, bottom, back),
            data: &mut *self.data,
        }
    }

    /// Consumes the view, returning a sub-region with the same lifetime.
    pub fn into_sub_region(
        self,
        left: u32,
        top: u32,
        front: u32,
        right: u32,
        bottom: u32,
        back: u32,
    ) -> ImgViewMut<'a> {
        ImgViewMut {
            roi: self.roi.sub_region(left, top, front, right, bottom, back),
            data: self.data,
        }
    }

    /// Zeroes the pixel bytes of every row, leaving padding untouched.
    pub fn zero_fill(&mut self) {
        for z in 0..self.roi.depth() {
            for y in 0..self.roi.height() {
                self.row_mut(y, z).fill(0);
            }
        }
    }
}

impl Deref for ImgViewMut<'_> {
    type Target = ImgRoi;

    fn deref(&self) -> &ImgRoi {
        &self.roi
    }
}

/// Copies `src` row by row into the top-left corner of `dst`.
///
/// `dst` keeps its own pitch and padding. Fails with
/// [`Error::DimensionMismatch`], touching nothing, when `src` is larger than
/// `dst` on any axis or differs in channel count or bit depth.
pub fn copy_data(dst: &mut ImgViewMut<'_>, src: &ImgView<'_>) -> Result<()> {
    let d = dst.roi;
    let s = src.roi;
    if s.width() > d.width()
        || s.height() > d.height()
        || s.depth() > d.depth()
        || s.channels() != d.channels()
        || s.bpc() != d.bpc()
    {
        return Err(Error::dimension_mismatch(d.describe(), s.describe()));
    }

    for z in 0..s.depth() {
        for y in 0..s.height() {
            let row = src.row(y, z);
            let start = d.offset_at(0, y, z, 0);
            dst.data[start..start + row.len()].copy_from_slice(row);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, depth: u32, channels: u32, align: u32) -> (Vec<u8>, ImgRoi) {
        let roi = ImgRoi::aligned(width, height, depth, PixelLayout::new(channels, 8), align);
        let mut data = vec![0xEE; roi.byte_len()];
        {
            let mut view = ImgViewMut::new(&mut data, roi).unwrap();
            for z in 0..depth {
                for y in 0..height {
                    for x in 0..width {
                        for c in 0..channels {
                            view.set(x, y, z, c, (x * 7 + y * 13 + z * 29 + c) as u8);
                        }
                    }
                }
            }
        }
        (data, roi)
    }

    #[test]
    fn calc_pitch_alignment() {
        for width in 0..40u32 {
            for channels in 1..=4u32 {
                for bpc in [1u32, 4, 8, 10, 16, 32, 64] {
                    let raw = calc_pitch(width, channels, bpc, 0);
                    assert_eq!(raw, ((width * channels * bpc) as usize).div_ceil(8));
                    for align in [0u32, 1, 2, 4, 8] {
                        let pitch = calc_pitch(width, channels, bpc, align);
                        assert!(pitch >= raw);
                        if align > 0 {
                            assert_eq!(pitch % align as usize, 0);
                            assert!(pitch - raw < align as usize);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn aligned_geometry() {
        let roi = ImgRoi::aligned(980, 240, 1, PixelLayout::new(3, 8), 4);
        assert_eq!(roi.pitch(), 2940);
        assert_eq!(roi.slice_pitch(), 2940 * 240);

        let roi = ImgRoi::aligned(5, 3, 2, PixelLayout::new(1, 8), 4);
        assert_eq!(roi.pitch(), 8);
        assert_eq!(roi.slice_pitch(), 24);
        assert_eq!(roi.byte_len(), 24 + 16 + 5);
    }

    #[test]
    fn typed_access() {
        let roi = ImgRoi::aligned(2, 2, 1, PixelLayout::float(2, 32), 0);
        let mut data = vec![0u8; roi.byte_len()];
        let mut view = ImgViewMut::new(&mut data, roi).unwrap();
        view.set(1, 1, 0, 1, 2.5f32);
        assert_eq!(view.at::<f32>(1, 1, 0, 1), 2.5);
        assert_eq!(view.roi().offset_at(1, 1, 0, 1), 16 + 8 + 4);

        let view = ImgView::new(&data, roi).unwrap();
        assert_eq!(view.at::<u32>(1, 1, 0, 1), 2.5f32.to_bits());
    }

    #[test]
    fn sub_region_matches_parent() {
        let (data, roi) = gradient(6, 5, 3, 2, 4);
        let parent = ImgView::new(&data, roi).unwrap();

        for front in 0..3 {
            for back in front..3 {
                for top in 0..5 {
                    for bottom in top..5 {
                        for left in 0..6 {
                            for right in left..6 {
                                let sub = parent.sub_region(left, top, front, right, bottom, back);
                                assert_eq!(sub.width(), right - left + 1);
                                assert_eq!(sub.height(), bottom - top + 1);
                                assert_eq!(sub.depth(), back - front + 1);
                                assert_eq!(sub.pitch(), parent.pitch());
                                assert_eq!(sub.slice_pitch(), parent.slice_pitch());
                                assert_eq!(sub.at::<u8>(0, 0, 0, 1), parent.at::<u8>(left, top, front, 1));
                                let (w, h, d) = (sub.width() - 1, sub.height() - 1, sub.depth() - 1);
                                assert_eq!(sub.at::<u8>(w, h, d, 0), parent.at::<u8>(right, bottom, back, 0));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn nested_sub_region() {
        let (data, roi) = gradient(8, 8, 1, 1, 0);
        let parent = ImgView::new(&data, roi).unwrap();
        let inner = parent.sub_region(2, 2, 0, 6, 6, 0).sub_region(1, 1, 0, 2, 2, 0);
        assert_eq!(inner.at::<u8>(0, 0, 0, 0), parent.at::<u8>(3, 3, 0, 0));
        assert_eq!(inner.row(1, 0), &parent.row(4, 0)[3..5]);
    }

    #[test]
    fn copy_data_preserves_padding() {
        let (src_data, src_roi) = gradient(3, 2, 1, 3, 0);
        let dst_roi = ImgRoi::aligned(4, 3, 1, PixelLayout::new(3, 8), 8);
        let mut dst_data = vec![0xAA; dst_roi.byte_len()];

        let src = ImgView::new(&src_data, src_roi).unwrap();
        let mut dst = ImgViewMut::new(&mut dst_data, dst_roi).unwrap();
        copy_data(&mut dst, &src).unwrap();

        for y in 0..2 {
            assert_eq!(&dst.as_view().row(y, 0)[..9], src.row(y, 0));
            assert_eq!(dst.as_view().row(y, 0)[9], 0xAA);
        }
        assert_eq!(dst_data[12], 0xAA);
    }

    #[test]
    fn copy_data_rejects_mismatch_without_mutation() {
        let (src_data, src_roi) = gradient(4, 4, 1, 3, 0);
        let src = ImgView::new(&src_data, src_roi).unwrap();

        let cases = [
            ImgRoi::aligned(4, 4, 1, PixelLayout::new(4, 8), 0),
            ImgRoi::aligned(4, 4, 1, PixelLayout::new(3, 16), 0),
            ImgRoi::aligned(3, 4, 1, PixelLayout::new(3, 8), 0),
            ImgRoi::aligned(4, 3, 1, PixelLayout::new(3, 8), 0),
        ];
        for dst_roi in cases {
            let mut dst_data = vec![0x5A; dst_roi.byte_len()];
            let mut dst = ImgViewMut::new(&mut dst_data, dst_roi).unwrap();
            let err = copy_data(&mut dst, &src).unwrap_err();
            assert!(matches!(err, Error::DimensionMismatch { .. }));
            assert!(dst_data.iter().all(|&b| b == 0x5A));
        }
    }

    #[test]
    fn copy_into_sub_region() {
        let (src_data, src_roi) = gradient(2, 2, 1, 1, 0);
        let src = ImgView::new(&src_data, src_roi).unwrap();
        let dst_roi = ImgRoi::aligned(4, 4, 1, PixelLayout::new(1, 8), 0);
        let mut dst_data = vec![0u8; dst_roi.byte_len()];
        let mut dst = ImgViewMut::new(&mut dst_data, dst_roi).unwrap();
        let mut inner = dst.sub_region_mut(1, 1, 0, 2, 2, 0);
        copy_data(&mut inner, &src).unwrap();

        assert_eq!(dst.at::<u8>(1, 1, 0, 0), src.at::<u8>(0, 0, 0, 0));
        assert_eq!(dst.at::<u8>(2, 2, 0, 0), src.at::<u8>(1, 1, 0, 0));
        assert_eq!(dst.at::<u8>(0, 0, 0, 0), 0);
    }

    #[test]
    fn view_bounds_checked() {
        let roi = ImgRoi::aligned(4, 4, 1, PixelLayout::new(1, 8), 0);
        let data = vec![0u8; 15];
        assert!(matches!(ImgView::new(&data, roi), Err(Error::OutOfBounds { end: 16, len: 15, .. })));
        assert!(ImgView::empty().is_empty());
    }
}
