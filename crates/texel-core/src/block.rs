//! Strided windows over block-compressed pixel data.
//!
//! Block formats (BCn, ETC, ASTC, PVRTC, ...) store fixed-size blocks of
//! `block_width x block_height` pixels. A [`BlockRoi`] addresses such data
//! in block units: rows of blocks separated by `pitch`, slices by
//! `slice_pitch`. Block counts round up, so a 5-pixel-wide level of a 4x4
//! format spans two blocks.
//!
//! Constructing a [`BlockRoi`] from a non-block format or a zero extent
//! yields the empty geometry instead of an error; callers check
//! [`BlockRoi::is_empty`].
//!
//! # Usage
//!
//! ```rust
//! use texel_core::block::BlockRoi;
//! use texel_core::format::TextureFormat;
//!
//! let roi = BlockRoi::new(TextureFormat::RgbaDxt5Unorm, 5, 9, 1);
//! assert_eq!((roi.h_blocks(), roi.v_blocks()), (2, 3));
//! assert_eq!(roi.pitch(), 32);
//!
//! let invalid = BlockRoi::new(TextureFormat::Rgba8Unorm, 16, 16, 1);
//! assert!(invalid.is_empty());
//! ```

use std::ops::Deref;

use crate::error::{Error, Result};
use crate::format::{BlockDesc, TextureFormat};

/// Geometry of a block-compressed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRoi {
    format: TextureFormat,
    desc: BlockDesc,
    // width, height, depth, horizontal blocks, vertical blocks
    dims: [u32; 5],
    pitch: usize,
    slice_pitch: usize,
    origin: usize,
}

impl Default for BlockRoi {
    fn default() -> Self {
        Self {
            format: TextureFormat::Undefined,
            desc: BlockDesc { block_width: 0, block_height: 0, block_bytes: 0 },
            dims: [0; 5],
            pitch: 0,
            slice_pitch: 0,
            origin: 0,
        }
    }
}

impl BlockRoi {
    /// Creates a tightly packed block geometry at origin 0.
    ///
    /// Returns the empty geometry if `format` is not block-compressed or any
    /// extent is zero.
    pub fn new(format: TextureFormat, width: u32, height: u32, depth: u32) -> Self {
        let Some(desc) = format.block_desc() else {
            return Self::default();
        };
        if width == 0 || height == 0 || depth == 0 {
            return Self::default();
        }

        let h_blocks = width.div_ceil(desc.block_width);
        let v_blocks = height.div_ceil(desc.block_height);
        let pitch = h_blocks as usize * desc.block_bytes as usize;
        Self {
            format,
            desc,
            dims: [width, height, depth, h_blocks, v_blocks],
            pitch,
            slice_pitch: pitch.saturating_mul(v_blocks as usize),
            origin: 0,
        }
    }

    /// Returns the same geometry moved to byte offset `origin`.
    #[inline]
    pub fn with_origin(mut self, origin: usize) -> Self {
        self.origin = origin;
        self
    }

    /// `[width, height, depth, h_blocks, v_blocks]`.
    #[inline]
    pub fn dims(&self) -> [u32; 5] {
        self.dims
    }

    /// Compressed format.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Block footprint.
    #[inline]
    pub fn block_desc(&self) -> BlockDesc {
        self.desc
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.dims[0]
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.dims[1]
    }

    /// Depth in slices.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.dims[2]
    }

    /// Blocks per row.
    #[inline]
    pub fn h_blocks(&self) -> u32 {
        self.dims[3]
    }

    /// Rows of blocks per slice.
    #[inline]
    pub fn v_blocks(&self) -> u32 {
        self.dims[4]
    }

    /// Bytes between consecutive block rows.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Bytes between consecutive slices.
    #[inline]
    pub fn slice_pitch(&self) -> usize {
        self.slice_pitch
    }

    /// Byte offset of block `(0, 0, 0)` in the backing storage.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Returns `true` for the empty geometry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0 || self.depth() == 0
    }

    /// Bytes of block data in one block row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.h_blocks() as usize * self.desc.block_bytes as usize
    }

    /// Span in bytes from the origin to the end of the last block row.
    pub fn byte_len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.depth() as usize - 1) * self.slice_pitch
            + (self.v_blocks() as usize - 1) * self.pitch
            + self.row_bytes()
    }

    /// Byte offset of block `(bx, by)` in slice `bz`.
    #[inline]
    pub fn block_offset(&self, bx: u32, by: u32, bz: u32) -> usize {
        self.origin
            + bz as usize * self.slice_pitch
            + by as usize * self.pitch
            + bx as usize * self.desc.block_bytes as usize
    }

    /// Sub-region over the inclusive pixel box `[left, right] x [top, bottom] x [front, back]`.
    ///
    /// `left` and `top` must sit on block boundaries, and `right + 1` and
    /// `bottom + 1` must either sit on a block boundary or reach the edge of
    /// this region. Any other box yields the empty geometry. Depth is
    /// sliced freely.
    pub fn sub_region(&self, left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        if self.is_empty()
            || left > right
            || top > bottom
            || front > back
            || right >= self.width()
            || bottom >= self.height()
            || back >= self.depth()
        {
            return Self::default();
        }

        let (bw, bh) = (self.desc.block_width, self.desc.block_height);
        let end_x = right + 1;
        let end_y = bottom + 1;
        let aligned = left % bw == 0
            && top % bh == 0
            && (end_x % bw == 0 || end_x == self.width())
            && (end_y % bh == 0 || end_y == self.height());
        if !aligned {
            return Self::default();
        }

        let width = end_x - left;
        let height = end_y - top;
        Self {
            dims: [width, height, back - front + 1, width.div_ceil(bw), height.div_ceil(bh)],
            origin: self.block_offset(left / bw, top / bh, front),
            ..*self
        }
    }

    fn describe(&self) -> String {
        format!("{} {}x{}x{}", self.format, self.width(), self.height(), self.depth())
    }

    fn check_within(&self, len: usize) -> Result<()> {
        let end = self.origin + self.byte_len();
        if end > len {
            return Err(Error::OutOfBounds { offset: self.origin, end, len });
        }
        Ok(())
    }
}

/// Read-only block view borrowing its bytes.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    data: &'a [u8],
    roi: BlockRoi,
}

impl<'a> BlockView<'a> {
    pub(crate) fn from_parts(data: &'a [u8], roi: BlockRoi) -> Self {
        debug_assert!(roi.origin + roi.byte_len() <= data.len());
        Self { data, roi }
    }

    /// Binds `roi` to `data`.
    pub fn new(data: &'a [u8], roi: BlockRoi) -> Result<Self> {
        roi.check_within(data.len())?;
        Ok(Self { data, roi })
    }

    /// Geometry of this view.
    #[inline]
    pub fn roi(&self) -> &BlockRoi {
        &self.roi
    }

    /// Bytes from the origin to the end of the last block row.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[self.roi.origin..self.roi.origin + self.roi.byte_len()]
    }

    /// Bytes of block `(bx, by)` in slice `bz`.
    #[inline]
    pub fn block_at(&self, bx: u32, by: u32, bz: u32) -> &'a [u8] {
        let start = self.roi.block_offset(bx, by, bz);
        &self.data[start..start + self.roi.desc.block_bytes as usize]
    }

    /// Bytes of block row `by` in slice `bz`.
    #[inline]
    pub fn block_row(&self, by: u32, bz: u32) -> &'a [u8] {
        let start = self.roi.block_offset(0, by, bz);
        &self.data[start..start + self.roi.row_bytes()]
    }

    /// Sub-region view; see [`BlockRoi::sub_region`].
    pub fn sub_region(&self, left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        Self {
            data: self.data,
            roi: self.roi.sub_region(left, top, front, right, bottom, back),
        }
    }
}

impl Deref for BlockView<'_> {
    type Target = BlockRoi;

    fn deref(&self) -> &BlockRoi {
        &self.roi
    }
}

/// Mutable block view borrowing its bytes.
#[derive(Debug)]
pub struct BlockViewMut<'a> {
    data: &'a mut [u8],
    roi: BlockRoi,
}

impl<'a> BlockViewMut<'a> {
    pub(crate) fn from_parts(data: &'a mut [u8], roi: BlockRoi) -> Self {
        debug_assert!(roi.origin + roi.byte_len() <= data.len());
        Self { data, roi }
    }

    /// Binds `roi` to `data`.
    pub fn new(data: &'a mut [u8], roi: BlockRoi) -> Result<Self> {
        roi.check_within(data.len())?;
        Ok(Self { data, roi })
    }

    /// Geometry of this view.
    #[inline]
    pub fn roi(&self) -> &BlockRoi {
        &self.roi
    }

    /// Reborrows as a read-only view.
    #[inline]
    pub fn as_view(&self) -> BlockView<'_> {
        BlockView { data: &*self.data, roi: self.roi }
    }

    /// Bytes of block `(bx, by)` in slice `bz`, mutably.
    #[inline]
    pub fn block_at_mut(&mut self, bx: u32, by: u32, bz: u32) -> &mut [u8] {
        let start = self.roi.block_offset(bx, by, bz);
        let len = self.roi.desc.block_bytes as usize;
        &mut self.data[start..start + len]
    }

    /// Bytes of block row `by` in slice `bz`, mutably.
    #[inline]
    pub fn block_row_mut(&mut self, by: u32, bz: u32) -> &mut [u8] {
        let start = self.roi.block_offset(0, by, bz);
        let len = self.roi.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Mutable sub-region view; see [`BlockRoi::sub_region`].
    pub fn sub_region_mut(
        &mut self,
        left: u32,
        top: u32,
        front: u32,
        right: u32,
        bottom: u32,
        back: u32,
    ) -> BlockViewMut<'_> {
        BlockViewMut {
            roi: self.roi.sub_region(left, top, front, right, bottom, back),
            data: &mut *self.data,
        }
    }
}

impl Deref for BlockViewMut<'_> {
    type Target = BlockRoi;

    fn deref(&self) -> &BlockRoi {
        &self.roi
    }
}

/// Copies `src` block row by block row into the top-left corner of `dst`.
///
/// Both views must share a format and `src` must fit inside `dst`;
/// otherwise fails with [`Error::DimensionMismatch`] and touches nothing.
pub fn copy_block_data(dst: &mut BlockViewMut<'_>, src: &BlockView<'_>) -> Result<()> {
    let d = dst.roi;
    let s = src.roi;
    if s.format != d.format || s.width() > d.width() || s.height() > d.height() || s.depth() > d.depth() {
        return Err(Error::dimension_mismatch(d.describe(), s.describe()));
    }

    for z in 0..s.depth() {
        for by in 0..s.v_blocks() {
            let row = src.block_row(by, z);
            let start = d.block_offset(0, by, z);
            dst.data[start..start + row.len()].copy_from_slice(row);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(roi: BlockRoi) -> Vec<u8> {
        let mut data = vec![0u8; roi.byte_len()];
        let bytes = roi.block_desc().block_bytes as usize;
        for (i, block) in data.chunks_mut(bytes).enumerate() {
            block.fill(i as u8);
        }
        data
    }

    #[test]
    fn block_counts_round_up() {
        let roi = BlockRoi::new(TextureFormat::RgbaAstc4x4Unorm, 5, 4, 1);
        assert_eq!(roi.h_blocks(), 2);
        assert_eq!(roi.v_blocks(), 1);

        for width in 1..=64u32 {
            let roi = BlockRoi::new(TextureFormat::RgbaAstc12x10Unorm, width, width, 1);
            assert_eq!(roi.h_blocks(), width.div_ceil(12));
            assert_eq!(roi.v_blocks(), width.div_ceil(10));
            assert_eq!(roi.pitch(), roi.h_blocks() as usize * 16);
            assert_eq!(roi.slice_pitch(), roi.pitch() * roi.v_blocks() as usize);
        }

        let tiny = BlockRoi::new(TextureFormat::RgbDxt1Unorm, 1, 1, 1);
        assert_eq!((tiny.h_blocks(), tiny.v_blocks(), tiny.byte_len()), (1, 1, 8));
    }

    #[test]
    fn invalid_construction_is_empty() {
        assert!(BlockRoi::new(TextureFormat::Undefined, 8, 8, 1).is_empty());
        assert!(BlockRoi::new(TextureFormat::Rgb8Unorm, 8, 8, 1).is_empty());
        assert!(BlockRoi::new(TextureFormat::RgbaBpUnorm, 0, 8, 1).is_empty());
        assert!(BlockRoi::new(TextureFormat::RgbaBpUnorm, 8, 8, 0).is_empty());
        assert_eq!(BlockRoi::new(TextureFormat::RgbaBpUnorm, 0, 8, 1).pitch(), 0);
    }

    #[test]
    fn block_addressing() {
        let roi = BlockRoi::new(TextureFormat::RgbaDxt5Unorm, 16, 8, 2);
        let data = numbered(roi);
        let view = BlockView::new(&data, roi).unwrap();
        // 4 blocks per row, 2 rows per slice
        assert_eq!(view.block_at(1, 0, 0)[0], 1);
        assert_eq!(view.block_at(0, 1, 0)[0], 4);
        assert_eq!(view.block_at(3, 1, 1)[15], 15);
    }

    #[test]
    fn aligned_sub_region() {
        let roi = BlockRoi::new(TextureFormat::RgbaDxt5Unorm, 16, 16, 1);
        let data = numbered(roi);
        let view = BlockView::new(&data, roi).unwrap();

        let sub = view.sub_region(4, 8, 0, 11, 15, 0);
        assert_eq!((sub.width(), sub.height()), (8, 8));
        assert_eq!((sub.h_blocks(), sub.v_blocks()), (2, 2));
        assert_eq!(sub.pitch(), view.pitch());
        assert_eq!(sub.block_at(0, 0, 0), view.block_at(1, 2, 0));
        assert_eq!(sub.block_at(1, 1, 0), view.block_at(2, 3, 0));
    }

    #[test]
    fn sub_region_edge_and_misalignment() {
        let roi = BlockRoi::new(TextureFormat::RgbaAstc4x4Unorm, 10, 6, 1);
        let edge = roi.sub_region(8, 4, 0, 9, 5, 0);
        assert_eq!((edge.width(), edge.height(), edge.h_blocks()), (2, 2, 1));
        assert_eq!(edge.origin(), roi.block_offset(2, 1, 0));

        assert!(roi.sub_region(1, 0, 0, 7, 3, 0).is_empty());
        assert!(roi.sub_region(0, 0, 0, 5, 3, 0).is_empty());
        assert!(roi.sub_region(0, 0, 0, 10, 3, 0).is_empty());
    }

    #[test]
    fn copy_block_rows() {
        let src_roi = BlockRoi::new(TextureFormat::RgbEtc2Unorm, 8, 8, 1);
        let src_data = numbered(src_roi);
        let src = BlockView::new(&src_data, src_roi).unwrap();

        let dst_roi = BlockRoi::new(TextureFormat::RgbEtc2Unorm, 16, 12, 1);
        let mut dst_data = vec![0xFF; dst_roi.byte_len()];
        let mut dst = BlockViewMut::new(&mut dst_data, dst_roi).unwrap();
        copy_block_data(&mut dst, &src).unwrap();

        let copied = dst.as_view();
        assert_eq!(copied.block_at(0, 0, 0), src.block_at(0, 0, 0));
        assert_eq!(copied.block_at(1, 1, 0), src.block_at(1, 1, 0));
        assert!(copied.block_at(2, 0, 0).iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn copy_block_rejects_mismatch() {
        let src_roi = BlockRoi::new(TextureFormat::RgbEtc2Unorm, 8, 8, 1);
        let src_data = numbered(src_roi);
        let src = BlockView::new(&src_data, src_roi).unwrap();

        for dst_roi in [
            BlockRoi::new(TextureFormat::RgbEtc2Srgb, 8, 8, 1),
            BlockRoi::new(TextureFormat::RgbEtc2Unorm, 4, 8, 1),
        ] {
            let mut dst_data = vec![0x11; dst_roi.byte_len()];
            let mut dst = BlockViewMut::new(&mut dst_data, dst_roi).unwrap();
            assert!(copy_block_data(&mut dst, &src).is_err());
            assert!(dst_data.iter().all(|&b| b == 0x11));
        }
    }
}
