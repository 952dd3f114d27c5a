//! PNG format support.
//!
//! Reading expands palettes and sub-byte gray to 8 bits, so every decoded
//! image is gray, gray-alpha, RGB or RGBA with 8 or 16 bits per channel.
//! 16-bit samples are big endian in the file and native in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use texel_io::png::{PngReader, PngOptions};
//! use texel_io::ImageReader;
//!
//! let image = PngReader::with_options(PngOptions::default().flip_y(true)).read("input.png")?;
//! ```

use std::io::Cursor;
use std::path::Path;

use texel_core::{Image, ImgView, PixelLayout};

use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

/// PNG read/write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngOptions {
    /// Mirror rows vertically.
    pub flip_y: bool,
}

impl PngOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

/// PNG reader.
#[derive(Debug, Clone, Default)]
pub struct PngReader {
    options: PngOptions,
}

impl PngReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: PngOptions) -> Self {
        Self { options }
    }
}

impl ImageReader for PngReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder
            .read_info()
            .map_err(|e: png::DecodingError| IoError::Format(e.to_string()))?;

        let buf_size = reader
            .output_buffer_size()
            .ok_or_else(|| IoError::format("cannot determine PNG output buffer size"))?;
        let mut buf = vec![0u8; buf_size];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e: png::DecodingError| IoError::Format(e.to_string()))?;

        let channels = match info.color_type {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            other => return Err(IoError::UnsupportedFormat(format!("PNG color type {other:?}"))),
        };
        let bpc = match info.bit_depth {
            png::BitDepth::Eight => 8,
            png::BitDepth::Sixteen => 16,
            other => return Err(IoError::UnsupportedFormat(format!("PNG bit depth {other:?}"))),
        };

        let mut image = Image::new(info.width, info.height, 1, PixelLayout::new(channels, bpc), 1)?;
        let mut view = image.view_mut();
        for (i, src) in buf[..info.buffer_size()].chunks_exact(info.line_size).enumerate() {
            let y = if self.options.flip_y { info.height - 1 - i as u32 } else { i as u32 };
            let dst = view.row_mut(y, 0);
            if bpc == 8 {
                dst.copy_from_slice(&src[..dst.len()]);
            } else {
                for (out, be) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
                    out.copy_from_slice(&u16::from_be_bytes([be[0], be[1]]).to_ne_bytes());
                }
            }
        }

        tracing::debug!(width = info.width, height = info.height, channels, bpc, "decoded PNG");
        Ok(image)
    }
}

/// PNG writer.
///
/// Accepts 1 to 4 channels of 8 or 16 bits.
#[derive(Debug, Clone, Default)]
pub struct PngWriter {
    options: PngOptions,
}

impl PngWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: PngOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for PngWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        let color_type = match image.channels() {
            1 => png::ColorType::Grayscale,
            2 => png::ColorType::GrayscaleAlpha,
            3 => png::ColorType::Rgb,
            4 => png::ColorType::Rgba,
            n => return Err(IoError::UnsupportedFormat(format!("PNG with {n} channels"))),
        };
        let bit_depth = match (image.bpc(), image.is_float()) {
            (8, false) => png::BitDepth::Eight,
            (16, false) => png::BitDepth::Sixteen,
            (bpc, _) => return Err(IoError::UnsupportedFormat(format!("PNG with {bpc}-bit samples"))),
        };
        if image.depth() != 1 || image.is_empty() {
            return Err(IoError::UnsupportedFormat("PNG needs a single non-empty slice".into()));
        }

        let mut packed = Vec::with_capacity(image.row_bytes() * image.height() as usize);
        for i in 0..image.height() {
            let y = if self.options.flip_y { image.height() - 1 - i } else { i };
            let row = image.row(y, 0);
            match bit_depth {
                png::BitDepth::Sixteen => {
                    for ne in row.chunks_exact(2) {
                        packed.extend_from_slice(&u16::from_ne_bytes([ne[0], ne[1]]).to_be_bytes());
                    }
                }
                _ => packed.extend_from_slice(row),
            }
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
            encoder.set_color(color_type);
            encoder.set_depth(bit_depth);
            let mut writer = encoder
                .write_header()
                .map_err(|e: png::EncodingError| IoError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&packed)
                .map_err(|e: png::EncodingError| IoError::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e: png::EncodingError| IoError::EncodeError(e.to_string()))?;
        }

        tracing::debug!(width = image.width(), height = image.height(), "encoded PNG");
        Ok(out)
    }
}

/// Reads a PNG file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    PngReader::new().read(path)
}

/// Writes a PNG file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    PngWriter::new().write(path, image)
}
