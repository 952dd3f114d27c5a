//! JPEG format support.
//!
//! Decoding goes through `jpeg-decoder` and keeps the stream's channel
//! count: gray stays one channel, YCbCr comes back as RGB and CMYK is
//! converted to RGB. 16-bit lossless gray is returned as 16-bit samples in
//! native order.
//!
//! Encoding goes through `jpeg-encoder` and takes 8-bit gray, RGB or RGBA
//! views (alpha is dropped by the encoder). Extents are limited to 65535.
//!
//! # Example
//!
//! ```rust,ignore
//! use texel_io::jpeg::{JpegOptions, JpegWriter};
//! use texel_io::ImageWriter;
//!
//! let writer = JpegWriter::with_options(JpegOptions::default().quality(95));
//! writer.write("preview.jpg", &image.view())?;
//! ```

use std::io::Cursor;
use std::path::Path;

use texel_core::{Image, ImgView, PixelLayout};

use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

/// JPEG read/write options.
#[derive(Debug, Clone, Copy)]
pub struct JpegOptions {
    /// Mirror rows vertically.
    pub flip_y: bool,
    /// Encoder quality, 1 to 100. Ignored when reading.
    pub quality: u8,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self { flip_y: false, quality: 90 }
    }
}

impl JpegOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Sets the encoder quality, clamped to 1..=100.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }
}

/// JPEG reader.
#[derive(Debug, Clone, Default)]
pub struct JpegReader {
    options: JpegOptions,
}

impl JpegReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: JpegOptions) -> Self {
        Self { options }
    }
}

impl ImageReader for JpegReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
        let pixels = decoder
            .decode()
            .map_err(|e: jpeg_decoder::Error| IoError::Format(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| IoError::format("missing JPEG frame info"))?;
        let (width, height) = (u32::from(info.width), u32::from(info.height));

        let (layout, pixels) = match info.pixel_format {
            jpeg_decoder::PixelFormat::L8 => (PixelLayout::new(1, 8), pixels),
            jpeg_decoder::PixelFormat::RGB24 => (PixelLayout::new(3, 8), pixels),
            jpeg_decoder::PixelFormat::L16 => {
                // decoder output is big endian
                let native = pixels
                    .chunks_exact(2)
                    .flat_map(|be| u16::from_be_bytes([be[0], be[1]]).to_ne_bytes())
                    .collect();
                (PixelLayout::new(1, 16), native)
            }
            jpeg_decoder::PixelFormat::CMYK32 => (PixelLayout::new(3, 8), cmyk_to_rgb(&pixels)),
        };

        let row_len = width as usize * layout.bytes_per_pixel();
        let pixels = crate::ppm::payload(&pixels, row_len, height)
            .ok_or_else(|| IoError::format("truncated JPEG pixel data"))?;

        let mut image = Image::new(width, height, 1, layout, 1)?;
        let mut view = image.view_mut();
        for (i, src) in pixels.chunks_exact(row_len).enumerate() {
            let y = if self.options.flip_y { height - 1 - i as u32 } else { i as u32 };
            view.row_mut(y, 0).copy_from_slice(src);
        }

        tracing::debug!(width, height, pixel_format = ?info.pixel_format, "decoded JPEG");
        Ok(image)
    }
}

fn cmyk_to_rgb(pixels: &[u8]) -> Vec<u8> {
    pixels
        .chunks_exact(4)
        .flat_map(|cmyk| {
            let k = 1.0 - f32::from(cmyk[3]) / 255.0;
            let channel = |v: u8| ((1.0 - f32::from(v) / 255.0) * k * 255.0).round() as u8;
            [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
        })
        .collect()
}

/// JPEG writer.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegOptions,
}

impl JpegWriter {
    /// Creates a writer with default options (quality 90).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: JpegOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for JpegWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder, EncodingError};

        let color_type = match image.channels() {
            1 => ColorType::Luma,
            3 => ColorType::Rgb,
            4 => ColorType::Rgba,
            n => return Err(IoError::UnsupportedFormat(format!("JPEG with {n} channels"))),
        };
        if image.bpc() != 8 || image.is_float() {
            return Err(IoError::UnsupportedFormat(format!("JPEG with {}-bit samples", image.bpc())));
        }
        if image.depth() != 1 || image.is_empty() {
            return Err(IoError::UnsupportedFormat("JPEG needs a single non-empty slice".into()));
        }
        let (Ok(width), Ok(height)) = (u16::try_from(image.width()), u16::try_from(image.height())) else {
            return Err(IoError::UnsupportedFormat(format!(
                "JPEG of {}x{} pixels exceeds 65535",
                image.width(),
                image.height()
            )));
        };

        let mut packed = Vec::with_capacity(image.row_bytes() * image.height() as usize);
        for i in 0..image.height() {
            let y = if self.options.flip_y { image.height() - 1 - i } else { i };
            packed.extend_from_slice(image.row(y, 0));
        }

        let mut out = Vec::new();
        Encoder::new(&mut out, self.options.quality)
            .encode(&packed, width, height, color_type)
            .map_err(|e: EncodingError| IoError::EncodeError(e.to_string()))?;

        tracing::debug!(width, height, quality = self.options.quality, "encoded JPEG");
        Ok(out)
    }
}

/// Reads a JPEG file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    JpegReader::new().read(path)
}

/// Writes a JPEG file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    JpegWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(channels: u32) -> Image {
        let mut img = Image::new(16, 16, 1, PixelLayout::new(channels, 8), 4).unwrap();
        let mut view = img.view_mut();
        for y in 0..16 {
            for x in 0..16 {
                for c in 0..channels {
                    view.set(x, y, 0, c, (64 + x * 4 + y * 2 + c * 8) as u8);
                }
            }
        }
        img
    }

    fn max_error(a: &Image, b: &Image) -> i32 {
        let mut worst = 0;
        for y in 0..a.height() {
            for (&p, &q) in a.view().row(y, 0).iter().zip(b.view().row(y, 0)) {
                worst = worst.max((i32::from(p) - i32::from(q)).abs());
            }
        }
        worst
    }

    #[test]
    fn rgb_round_trip_is_close() {
        let img = gradient(3);
        let bytes = JpegWriter::with_options(JpegOptions::default().quality(100))
            .write_to_memory(&img.view())
            .unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);

        let back = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height(), back.channels()), (16, 16, 3));
        assert_eq!(back.roi().bpc(), 8);
        assert!(max_error(&img, &back) <= 8);
    }

    #[test]
    fn gray_stays_one_channel() {
        let img = gradient(1);
        let bytes = JpegWriter::new().write_to_memory(&img.view()).unwrap();
        let back = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.channels(), 1);
        assert!(max_error(&img, &back) <= 8);
    }

    #[test]
    fn flip_on_read() {
        // flat 8x8 blocks survive compression almost exactly
        let mut img = Image::new(8, 16, 1, PixelLayout::new(1, 8), 1).unwrap();
        let mut view = img.view_mut();
        for y in 8..16 {
            view.row_mut(y, 0).fill(240);
        }
        let bytes = JpegWriter::new().write_to_memory(&img.view()).unwrap();

        let flipped = JpegReader::with_options(JpegOptions::default().flip_y(true))
            .read_from_memory(&bytes)
            .unwrap();
        assert!(flipped.view().at::<u8>(3, 0, 0, 0) > 200);
        assert!(flipped.view().at::<u8>(3, 15, 0, 0) < 40);
    }

    #[test]
    fn rejects_unsupported_input() {
        let wide = Image::new(2, 2, 1, PixelLayout::new(3, 16), 1).unwrap();
        assert!(matches!(
            JpegWriter::new().write_to_memory(&wide.view()),
            Err(IoError::UnsupportedFormat(_))
        ));
        let two = Image::new(2, 2, 1, PixelLayout::new(2, 8), 1).unwrap();
        assert!(JpegWriter::new().write_to_memory(&two.view()).is_err());
        assert!(matches!(
            JpegReader::new().read_from_memory(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 2]),
            Err(IoError::Format(_))
        ));
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(JpegOptions::default().quality(0).quality, 1);
        assert_eq!(JpegOptions::default().quality(200).quality, 100);
    }
}
