//! # texel-io
//!
//! Texture and image I/O on top of `texel-core`.
//!
//! - **KTX** - KTX 1.1 texture containers: mip chains, arrays, cube maps,
//!   block-compressed formats and key-value metadata
//! - **BMP** - Windows bitmaps (8-bit palettized, 24-bit, 32-bit)
//! - **PPM/PGM** - Binary netpbm, 8 or 16 bits per sample
//! - **PFM** - Portable float maps
//! - **PNG** - 8 and 16-bit, with alpha (feature `png`)
//! - **JPEG** - 8-bit gray and RGB (feature `jpeg`)
//! - **BSON** - Lossless image documents holding any view layout
//!
//! # Architecture
//!
//! - [`ImageReader`] / [`ImageWriter`] - Traits implemented by the raster codecs
//! - [`read`] / [`write`] - Single images with format auto-detection
//! - [`read_texture`] / [`write_texture`] - Whole [`CompositeImg`] textures
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use texel_io::{read, write, read_texture};
//!
//! let image = read("input.bmp")?;
//! write("output.pfm", &image.view())?;
//!
//! let (texture, key_values) = read_texture("skybox.ktx")?;
//! println!("{} levels, {} faces", texture.levels(), texture.faces());
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Bit Depths | Notes |
//! |--------|------|-------|------------|-------|
//! | KTX | Yes | Yes | all linear and block formats | both byte orders on read |
//! | BMP | Yes | Yes | 8, 24, 32 bpp | palettes read, gray palette written |
//! | PPM/PGM | Yes | Yes | 8, 16 | binary only |
//! | PFM | Yes | Yes | 32f (16f on write) | both byte orders on read |
//! | PNG | Yes | Yes | 8, 16 | palettes expanded |
//! | JPEG | Yes | Yes | 8 (16 gray on read) | lossy, alpha dropped on write |
//! | BSON | Yes | Yes | any | extension-detected only |
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::collections::BTreeMap;
use std::path::Path;

use texel_core::{CompositeImg, Image, ImgView, PixelLayout, TextureDesc, TextureFormat, TextureTarget};

mod detect;
mod error;
mod traits;

pub mod bmp;
pub mod bson;
#[cfg(feature = "jpeg")]
pub mod jpeg;
pub mod ktx;
pub mod pfm;
#[cfg(feature = "png")]
pub mod png;
pub mod ppm;

pub use detect::Format;
pub use error::{IoError, IoResult};
pub use traits::{ImageReader, ImageWriter};

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Reads a single image, detecting the format from magic bytes or extension.
///
/// For a KTX file this is level 0, layer 0, face 0 of an uncompressed
/// texture.
///
/// # Example
///
/// ```rust,ignore
/// use texel_io::read;
///
/// let image = read("input.ppm")?;
/// println!("{}x{}", image.width(), image.height());
/// ```
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    let format = Format::detect(path)?;

    match format {
        Format::Ktx => base_image(&read_texture(path)?.0),
        Format::Bmp => bmp::read(path),
        Format::Ppm => ppm::read(path),
        Format::Pfm => pfm::read(path),
        #[cfg(feature = "png")]
        Format::Png => png::read(path),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),
        Format::Bson => bson::read(path),
        _ => Err(unsupported(path)),
    }
}

/// Writes a single image, choosing the format from the extension.
///
/// A `.ktx` target gets a one-level 2D texture whose format matches the
/// view's layout.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);

    match format {
        Format::Ktx => write_texture(path, &texture_from_image(image)?, &BTreeMap::new()),
        Format::Bmp => bmp::write(path, image),
        Format::Ppm => ppm::write(path, image),
        Format::Pfm => pfm::write(path, image),
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write(path, image),
        Format::Bson => bson::write(path, image),
        _ => Err(unsupported(path)),
    }
}

/// Reads a KTX texture and its key-value metadata with default options.
pub fn read_texture<P: AsRef<Path>>(path: P) -> IoResult<(CompositeImg, BTreeMap<String, String>)> {
    ktx::read(path, &ktx::KtxOptions::default())
}

/// Writes a KTX texture with default options.
pub fn write_texture<P: AsRef<Path>>(
    path: P,
    texture: &CompositeImg,
    key_values: &BTreeMap<String, String>,
) -> IoResult<()> {
    ktx::write(path, texture, key_values, &ktx::KtxOptions::default())
}

/// Copies the first slot of an uncompressed texture into a packed image.
pub fn base_image(texture: &CompositeImg) -> IoResult<Image> {
    if texture.is_compressed() {
        return Err(IoError::UnsupportedFormat(format!(
            "{} is block-compressed",
            texture.desc().format
        )));
    }
    if !texture.is_bound(0, 0, 0) {
        return Err(IoError::format("texture has no level 0 data"));
    }
    let mut image = Image::default();
    image.copy_from_view(&texture.view(0, 0, 0), 1)?;
    Ok(image)
}

/// Wraps a copy of `image` in a one-level 2D texture.
///
/// The texture format is the linear format with the view's channel count,
/// bit depth and signedness.
pub fn texture_from_image(image: &ImgView<'_>) -> IoResult<CompositeImg> {
    let layout: PixelLayout = image.layout();
    let format = TextureFormat::from_layout(layout.channels, layout.bpc, layout.signed, layout.float)
        .ok_or_else(|| {
            IoError::UnsupportedFormat(format!(
                "no texture format with {} channels of {} bits",
                layout.channels, layout.bpc
            ))
        })?;
    let target = if image.depth() > 1 { TextureTarget::Target3D } else { TextureTarget::Target2D };

    let mut texture = CompositeImg::default();
    texture.set_linear_extent(
        TextureDesc::new(format, target, false),
        1,
        1,
        1,
        [image.width(), image.height(), image.depth()],
        4.max(format.required_alignment()),
    )?;
    texture.allocate_storage()?;
    texel_core::copy_data(&mut texture.view_mut(0, 0, 0), image)?;
    Ok(texture)
}
