//! Multi-level, multi-layer, multi-face textures.
//!
//! # Overview
//!
//! A [`CompositeImg`] owns any number of [`Buffer`]s and a flat table of view
//! geometries, one slot per `(level, layer, face)`. Slots are ordered with
//! levels outermost and faces innermost:
//!
//! ```text
//! index = level * layers * faces + layer * faces + face
//! ```
//!
//! The table is either entirely linear or entirely block-compressed; which
//! one is decided by the texture format when the extent is set.
//!
//! # Lifecycle
//!
//! 1. Size the table with [`CompositeImg::set_linear_extent`] or
//!    [`CompositeImg::set_block_extent`].
//! 2. Hand over storage with [`CompositeImg::add_buffer`] and bind each slot
//!    with [`CompositeImg::set_data`], or let
//!    [`CompositeImg::allocate_storage`] do both.
//! 3. Borrow slots through [`CompositeImg::view`] / [`CompositeImg::block_view`]
//!    and their `_mut` variants.
//!
//! # Mip extents
//!
//! Level `L` has extent `max(base >> L, 1)` per axis. Height never shrinks
//! for 1D targets and depth only shrinks for 3D targets.
//!
//! # Usage
//!
//! ```rust
//! use texel_core::{CompositeImg, TextureDesc, TextureFormat, TextureTarget};
//!
//! let desc = TextureDesc::new(TextureFormat::Rgba8Unorm, TextureTarget::Target2D, true);
//! let mut tex = CompositeImg::new();
//! tex.set_linear_extent(desc, 3, 1, 1, [64, 64, 1], 4)?;
//! tex.allocate_storage()?;
//!
//! assert_eq!(tex.level_extent(2), [16, 16, 1]);
//! tex.view_mut(1, 0, 0).set(31, 31, 0, 3, 255u8);
//! assert_eq!(tex.view(1, 0, 0).at::<u8>(31, 31, 0, 3), 255);
//! # Ok::<(), texel_core::Error>(())
//! ```
//!
//! # Used By
//!
//! - `texel-io::ktx` - decodes into and encodes from a composite

use crate::block::{BlockRoi, BlockView, BlockViewMut};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::format::TextureDesc;
use crate::view::{ImgRoi, ImgView, ImgViewMut, PixelLayout};

/// A bound slot: the owning buffer and a geometry whose origin is the
/// binding offset inside that buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<R> {
    /// Index into [`CompositeImg::buffers`].
    pub buffer: usize,
    /// Slot geometry.
    pub roi: R,
}

/// The slot table, tagged by storage kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Views {
    /// Uncompressed slots.
    Linear(Vec<Option<Slot<ImgRoi>>>),
    /// Block-compressed slots.
    Block(Vec<Option<Slot<BlockRoi>>>),
}

impl Default for Views {
    fn default() -> Self {
        Self::Linear(Vec::new())
    }
}

impl Views {
    /// Whether the table holds block-compressed slots.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Block(_))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        match self {
            Self::Linear(slots) => slots.len(),
            Self::Block(slots) => slots.len(),
        }
    }

    /// Returns `true` if the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_bound(&self, index: usize) -> bool {
        match self {
            Self::Linear(slots) => slots.get(index).is_some_and(Option::is_some),
            Self::Block(slots) => slots.get(index).is_some_and(Option::is_some),
        }
    }
}

/// A texture made of mip levels, array layers and cube faces.
///
/// Buffers are append-only: once added they are never removed or resized,
/// so a bound slot stays valid for the composite's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeImg {
    buffers: Vec<Buffer>,
    views: Views,
    desc: TextureDesc,
    levels: u32,
    layers: u32,
    faces: u32,
    extent: [u32; 3],
    alignment: u32,
    layout: Option<PixelLayout>,
}

impl CompositeImg {
    /// Creates an empty composite with no table and no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the table for an uncompressed texture.
    ///
    /// `alignment` is the row alignment in bytes used for every level and
    /// must be a multiple of the format's required alignment. Zero counts
    /// are treated as one. Previously bound slots are discarded; buffers are
    /// kept.
    ///
    /// Every slot, level 0 included, stays unbound until
    /// [`CompositeImg::set_data`] or [`CompositeImg::allocate_storage`] binds
    /// it. The level-0 extent is available right away through
    /// [`CompositeImg::extent`] and [`CompositeImg::level_extent`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] if the format is not a linear format
    /// - [`Error::InvalidAlignment`] if the alignment does not fit the format
    pub fn set_linear_extent(
        &mut self,
        desc: TextureDesc,
        levels: u32,
        layers: u32,
        faces: u32,
        extent: [u32; 3],
        alignment: u32,
    ) -> Result<()> {
        let layout = PixelLayout::from_format(desc.format)
            .ok_or_else(|| Error::unsupported_format(desc.format.to_string()))?;
        let required = desc.format.required_alignment();
        if alignment % required != 0 {
            return Err(Error::InvalidAlignment { alignment, required });
        }

        self.reset_table(desc, levels, layers, faces, extent);
        self.alignment = alignment;
        self.layout = Some(layout);
        self.views = Views::Linear(vec![None; self.slot_count()]);
        Ok(())
    }

    /// Sizes the table for a block-compressed texture.
    ///
    /// As with [`CompositeImg::set_linear_extent`], no slot is bound yet;
    /// query the base extent with [`CompositeImg::level_extent`].
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] if the format is not block-compressed;
    /// the composite is left untouched.
    pub fn set_block_extent(
        &mut self,
        desc: TextureDesc,
        levels: u32,
        layers: u32,
        faces: u32,
        extent: [u32; 3],
    ) -> Result<()> {
        let Some(block) = desc.format.block_desc() else {
            return Err(Error::unsupported_format(desc.format.to_string()));
        };

        self.reset_table(desc, levels, layers, faces, extent);
        self.alignment = block.block_bytes;
        self.layout = None;
        self.views = Views::Block(vec![None; self.slot_count()]);
        Ok(())
    }

    fn reset_table(&mut self, desc: TextureDesc, levels: u32, layers: u32, faces: u32, extent: [u32; 3]) {
        self.desc = desc;
        self.levels = levels.max(1);
        self.layers = layers.max(1);
        self.faces = faces.max(1);
        self.extent = extent;
    }

    fn slot_count(&self) -> usize {
        self.levels as usize * self.layers as usize * self.faces as usize
    }

    /// Appends a buffer and returns its index for [`CompositeImg::set_data`].
    pub fn add_buffer(&mut self, buffer: Buffer) -> usize {
        self.buffers.push(buffer);
        self.buffers.len() - 1
    }

    /// Binds slot `(level, layer, face)` to `offset` bytes into buffer `buffer`.
    ///
    /// The slot geometry is the level's mip extent with pitches recomputed
    /// from the stored alignment (linear) or block footprint (compressed).
    /// Does nothing when the format is undefined.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSlot`] if the coordinates are outside the table
    /// - [`Error::UnknownBuffer`] if no buffer has index `buffer`
    /// - [`Error::OutOfBounds`] if the slot does not fit in the buffer
    pub fn set_data(&mut self, buffer: usize, offset: usize, level: u32, layer: u32, face: u32) -> Result<()> {
        if self.desc.format.is_undefined() {
            return Ok(());
        }
        let index = self.slot_index(level, layer, face)?;
        let len = self
            .buffers
            .get(buffer)
            .map(Buffer::len)
            .ok_or(Error::UnknownBuffer { index: buffer })?;

        let size = self.slot_size(level);
        let end = offset.checked_add(size).unwrap_or(usize::MAX);
        if end > len {
            return Err(Error::OutOfBounds { offset, end, len });
        }

        let extent = self.level_extent_of(level);
        let [w, h, d] = extent;
        match &mut self.views {
            Views::Linear(slots) => {
                let roi = level_roi(self.layout.unwrap_or_default(), extent, self.alignment).with_origin(offset);
                slots[index] = Some(Slot { buffer, roi });
            }
            Views::Block(slots) => {
                let roi = BlockRoi::new(self.desc.format, w, h, d).with_origin(offset);
                slots[index] = Some(Slot { buffer, roi });
            }
        }
        tracing::trace!(level, layer, face, buffer, offset, size, "bound texture slot");
        Ok(())
    }

    /// Allocates one buffer large enough for every slot and binds all slots
    /// into it in level, layer, face order. Returns the buffer index.
    pub fn allocate_storage(&mut self) -> Result<usize> {
        let buffer = Buffer::with_len(self.storage_size())?;
        let index = self.add_buffer(buffer);

        let mut offset = 0;
        for level in 0..self.levels {
            let size = self.slot_size(level);
            for layer in 0..self.layers {
                for face in 0..self.faces {
                    self.set_data(index, offset, level, layer, face)?;
                    offset += size;
                }
            }
        }
        Ok(index)
    }

    /// Extent `[width, height, depth]` of mip level `level`.
    pub fn level_extent(&self, level: u32) -> [u32; 3] {
        self.level_extent_of(level)
    }

    fn level_extent_of(&self, level: u32) -> [u32; 3] {
        let [w, h, d] = self.extent;
        let target = self.desc.target;
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);

        let width = shrink(w);
        let height = if target.is_1d() { h } else { shrink(h) };
        let depth = if target.is_3d() { shrink(d) } else { d };
        [width, height, depth]
    }

    /// Bytes occupied by one slot (one face of one layer) at `level`.
    ///
    /// Saturates at `usize::MAX`, as do [`CompositeImg::level_size`] and
    /// [`CompositeImg::storage_size`].
    pub fn slot_size(&self, level: u32) -> usize {
        let [w, h, d] = self.level_extent_of(level);
        match self.views {
            Views::Linear(_) => {
                let roi = level_roi(self.layout.unwrap_or_default(), [w, h, d], self.alignment);
                roi.slice_pitch().saturating_mul(d as usize)
            }
            Views::Block(_) => {
                let roi = BlockRoi::new(self.desc.format, w, h, d);
                roi.slice_pitch().saturating_mul(d as usize)
            }
        }
    }

    /// Bytes occupied by every layer and face of `level`.
    pub fn level_size(&self, level: u32) -> usize {
        self.slot_size(level)
            .saturating_mul(self.layers as usize)
            .saturating_mul(self.faces as usize)
    }

    /// Bytes needed to store every slot back to back.
    pub fn storage_size(&self) -> usize {
        (0..self.levels).fold(0usize, |total, level| total.saturating_add(self.level_size(level)))
    }

    fn slot_index(&self, level: u32, layer: u32, face: u32) -> Result<usize> {
        if level >= self.levels || layer >= self.layers || face >= self.faces {
            return Err(Error::InvalidSlot { level, layer, face });
        }
        let (layers, faces) = (self.layers as usize, self.faces as usize);
        Ok(level as usize * layers * faces + layer as usize * faces + face as usize)
    }

    /// Texture descriptor.
    #[inline]
    pub fn desc(&self) -> TextureDesc {
        self.desc
    }

    /// Mip level count.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Array layer count.
    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Cube face count.
    #[inline]
    pub fn faces(&self) -> u32 {
        self.faces
    }

    /// Level-0 extent.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.extent
    }

    /// Row alignment of linear slots; block size for compressed slots.
    #[inline]
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Channel layout of linear slots.
    #[inline]
    pub fn layout(&self) -> Option<PixelLayout> {
        self.layout
    }

    /// Whether the texture format is block-compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.desc.format.is_compressed()
    }

    /// Owned buffers, in insertion order.
    #[inline]
    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    /// Slot table.
    #[inline]
    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Whether slot `(level, layer, face)` is bound.
    pub fn is_bound(&self, level: u32, layer: u32, face: u32) -> bool {
        self.slot_index(level, layer, face)
            .is_ok_and(|index| self.views.is_bound(index))
    }

    /// Whether every slot is bound.
    pub fn is_complete(&self) -> bool {
        !self.views.is_empty() && (0..self.views.len()).all(|i| self.views.is_bound(i))
    }

    /// Geometry of a bound linear slot.
    pub fn roi(&self, level: u32, layer: u32, face: u32) -> Option<&ImgRoi> {
        let index = self.slot_index(level, layer, face).ok()?;
        match &self.views {
            Views::Linear(slots) => slots[index].as_ref().map(|slot| &slot.roi),
            Views::Block(_) => None,
        }
    }

    /// Geometry of a bound block slot.
    pub fn block_roi(&self, level: u32, layer: u32, face: u32) -> Option<&BlockRoi> {
        let index = self.slot_index(level, layer, face).ok()?;
        match &self.views {
            Views::Block(slots) => slots[index].as_ref().map(|slot| &slot.roi),
            Views::Linear(_) => None,
        }
    }

    fn linear_slot(&self, level: u32, layer: u32, face: u32) -> Slot<ImgRoi> {
        let index = self.slot_index(level, layer, face).unwrap_or(usize::MAX);
        match &self.views {
            Views::Linear(slots) => match slots.get(index).copied().flatten() {
                Some(slot) => slot,
                None => panic!("linear slot ({level}, {layer}, {face}) is not bound"),
            },
            Views::Block(_) => panic!("linear view requested from a block-compressed texture"),
        }
    }

    fn block_slot(&self, level: u32, layer: u32, face: u32) -> Slot<BlockRoi> {
        let index = self.slot_index(level, layer, face).unwrap_or(usize::MAX);
        match &self.views {
            Views::Block(slots) => match slots.get(index).copied().flatten() {
                Some(slot) => slot,
                None => panic!("block slot ({level}, {layer}, {face}) is not bound"),
            },
            Views::Linear(_) => panic!("block view requested from a linear texture"),
        }
    }

    /// Borrows a linear slot.
    ///
    /// # Panics
    ///
    /// If the texture is block-compressed or the slot is not bound.
    pub fn view(&self, level: u32, layer: u32, face: u32) -> ImgView<'_> {
        let slot = self.linear_slot(level, layer, face);
        ImgView::from_parts(self.buffers[slot.buffer].as_slice(), slot.roi)
    }

    /// Borrows a linear slot mutably.
    ///
    /// # Panics
    ///
    /// If the texture is block-compressed or the slot is not bound.
    pub fn view_mut(&mut self, level: u32, layer: u32, face: u32) -> ImgViewMut<'_> {
        let slot = self.linear_slot(level, layer, face);
        ImgViewMut::from_parts(self.buffers[slot.buffer].as_mut_slice(), slot.roi)
    }

    /// Borrows a block slot.
    ///
    /// # Panics
    ///
    /// If the texture is linear or the slot is not bound.
    pub fn block_view(&self, level: u32, layer: u32, face: u32) -> BlockView<'_> {
        let slot = self.block_slot(level, layer, face);
        BlockView::from_parts(self.buffers[slot.buffer].as_slice(), slot.roi)
    }

    /// Borrows a block slot mutably.
    ///
    /// # Panics
    ///
    /// If the texture is linear or the slot is not bound.
    pub fn block_view_mut(&mut self, level: u32, layer: u32, face: u32) -> BlockViewMut<'_> {
        let slot = self.block_slot(level, layer, face);
        BlockViewMut::from_parts(self.buffers[slot.buffer].as_mut_slice(), slot.roi)
    }

    /// Raw bytes of a bound slot, linear or compressed.
    pub fn slot_bytes(&self, level: u32, layer: u32, face: u32) -> Option<&[u8]> {
        let index = self.slot_index(level, layer, face).ok()?;
        let (buffer, origin, len) = match &self.views {
            Views::Linear(slots) => {
                let slot = slots[index]?;
                (slot.buffer, slot.roi.origin(), slot.roi.byte_len())
            }
            Views::Block(slots) => {
                let slot = slots[index]?;
                (slot.buffer, slot.roi.origin(), slot.roi.byte_len())
            }
        };
        self.buffers.get(buffer)?.as_slice().get(origin..origin + len)
    }
}

fn level_roi(layout: PixelLayout, [w, h, d]: [u32; 3], alignment: u32) -> ImgRoi {
    ImgRoi::aligned(w, h, d, layout, alignment)
}
