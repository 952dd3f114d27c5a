//! # texel-core
//!
//! In-memory texture representation: pixel storage, strided views and
//! multi-level textures.
//!
//! - [`Buffer`] - Owned byte storage
//! - [`ImgRoi`], [`ImgView`], [`ImgViewMut`] - Linear views with row/slice pitches
//! - [`BlockRoi`], [`BlockView`], [`BlockViewMut`] - Block-compressed views
//! - [`Image`], [`BlockImage`] - A buffer paired with one whole-extent view
//! - [`CompositeImg`] - Levels, layers and faces of one texture
//! - [`TextureFormat`], [`TextureTarget`] - Format and shape tables
//! - [`gl`] - Translation to and from OpenGL format triples
//!
//! ## Views
//!
//! Views never own pixels. A view is a geometry ([`ImgRoi`] or [`BlockRoi`])
//! plus a borrowed byte slice; the geometry's origin is the byte offset of
//! its first pixel inside that slice. Sub-regions inherit the parent's
//! pitches, so writing through a sub-region never touches bytes outside it.
//!
//! ```rust
//! use texel_core::{Image, PixelLayout};
//!
//! let mut img = Image::new(8, 8, 1, PixelLayout::new(1, 8), 1)?;
//! let mut view = img.view_mut();
//! let mut inner = view.sub_region_mut(2, 2, 0, 5, 5, 0);
//! inner.set(0, 0, 0, 0, 7u8);
//!
//! assert_eq!(img.view().at::<u8>(2, 2, 0, 0), 7);
//! # Ok::<(), texel_core::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! texel-core (this crate)
//!    ^
//!    |
//!    +-- texel-io (KTX and raster codecs)
//!          ^
//!          +-- texel-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod block;
pub mod buffer;
pub mod composite;
pub mod error;
pub mod format;
pub mod gl;
pub mod image;
pub mod sample;
pub mod view;

// Re-exports for convenience
pub use block::{copy_block_data, BlockRoi, BlockView, BlockViewMut};
pub use buffer::Buffer;
pub use composite::{CompositeImg, Slot, Views};
pub use error::{Error, Result};
pub use format::{BlockDesc, PixelDesc, TextureDesc, TextureFormat, TextureTarget};
pub use gl::GlFormat;
pub use image::{add_2d_border, BlockImage, Image};
pub use sample::Sample;
pub use view::{calc_pitch, copy_data, ImgRoi, ImgView, ImgViewMut, PixelLayout};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use texel_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::block::{BlockRoi, BlockView, BlockViewMut};
    pub use crate::buffer::Buffer;
    pub use crate::composite::CompositeImg;
    pub use crate::error::{Error, Result};
    pub use crate::format::{TextureDesc, TextureFormat, TextureTarget};
    pub use crate::image::{BlockImage, Image};
    pub use crate::sample::Sample;
    pub use crate::view::{ImgRoi, ImgView, ImgViewMut, PixelLayout};
}
