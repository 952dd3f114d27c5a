//! PFM (portable float map) format support.
//!
//! `PF` holds RGB and `Pf` gray 32-bit float pixels. The header's scale
//! factor carries the byte order: negative means little endian. Rows are
//! stored bottom to top.
//!
//! The writer accepts 32-bit float images directly and widens 16-bit half
//! float images; files are always written little endian.

use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use half::f16;
use texel_core::{Image, ImgView, PixelLayout};

use crate::ppm::{payload, Tokens};
use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

/// PFM read/write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PfmOptions {
    /// Mirror rows vertically relative to the natural top-down order.
    pub flip_y: bool,
}

impl PfmOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

/// PFM reader.
#[derive(Debug, Clone, Default)]
pub struct PfmReader {
    options: PfmOptions,
}

impl PfmReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: PfmOptions) -> Self {
        Self { options }
    }

    fn decode_rows<B: ByteOrder>(&self, pixels: &[u8], image: &mut Image) -> IoResult<()> {
        let height = image.height();
        let row_len = image.roi().row_bytes();
        let mut view = image.view_mut();
        for (i, src) in pixels.chunks_exact(row_len).enumerate() {
            // stored bottom-up
            let y = if self.options.flip_y { i as u32 } else { height - 1 - i as u32 };
            let dst = view.row_mut(y, 0);
            let mut cur = Cursor::new(src);
            for out in dst.chunks_exact_mut(4) {
                let v = cur.read_f32::<B>().map_err(IoError::truncated("PFM row"))?;
                out.copy_from_slice(&v.to_ne_bytes());
            }
        }
        Ok(())
    }
}

impl ImageReader for PfmReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let channels = match data.get(..2) {
            Some(b"PF") => 3,
            Some(b"Pf") => 1,
            _ => return Err(IoError::format("not a PFM file")),
        };

        let mut tokens = Tokens::after_magic(data);
        let width = tokens.number("width")?;
        let height = tokens.number("height")?;
        let scale: f32 = tokens
            .word()
            .parse()
            .map_err(|_| IoError::format("invalid PFM scale"))?;
        let pixels = tokens.end_header()?;

        if width == 0 || height == 0 {
            return Err(IoError::Format(format!("invalid PFM dimensions {width}x{height}")));
        }
        if scale == 0.0 || !scale.is_finite() {
            return Err(IoError::Format(format!("invalid PFM scale {scale}")));
        }

        let layout = PixelLayout::float(channels, 32);
        let row_len = width as usize * layout.bytes_per_pixel();
        let pixels = payload(pixels, row_len, height).ok_or_else(|| IoError::format("truncated PFM pixel data"))?;

        let mut image = Image::new(width, height, 1, layout, 1)?;

        if scale < 0.0 {
            self.decode_rows::<LittleEndian>(pixels, &mut image)?;
        } else {
            self.decode_rows::<BigEndian>(pixels, &mut image)?;
        }

        tracing::debug!(width, height, channels, scale, "decoded PFM");
        Ok(image)
    }
}

/// PFM writer.
#[derive(Debug, Clone, Default)]
pub struct PfmWriter {
    options: PfmOptions,
}

impl PfmWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: PfmOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for PfmWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        let magic = match image.channels() {
            1 => "Pf",
            3 => "PF",
            n => return Err(IoError::UnsupportedFormat(format!("PFM with {n} channels"))),
        };
        if !image.is_float() || !matches!(image.bpc(), 16 | 32) {
            return Err(IoError::UnsupportedFormat(format!(
                "PFM needs 16- or 32-bit float samples, got {} bits",
                image.bpc()
            )));
        }
        if image.depth() != 1 {
            return Err(IoError::UnsupportedFormat("PFM of a 3D image".into()));
        }

        let (width, height, channels) = (image.width(), image.height(), image.channels());
        let mut out = format!("{magic}\n{width} {height}\n-1.0\n").into_bytes();
        out.reserve(width as usize * height as usize * channels as usize * 4);
        for i in 0..height {
            let y = if self.options.flip_y { i } else { height - 1 - i };
            for x in 0..width {
                for c in 0..channels {
                    let v = match image.bpc() {
                        16 => image.at::<f16>(x, y, 0, c).to_f32(),
                        _ => image.at::<f32>(x, y, 0, c),
                    };
                    out.write_f32::<LittleEndian>(v)?;
                }
            }
        }

        tracing::debug!(width, height, channels, "encoded PFM");
        Ok(out)
    }
}

/// Reads a PFM file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    PfmReader::new().read(path)
}

/// Writes a PFM file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    PfmWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn big_endian_gray() {
        let mut data = b"Pf\n1 2\n1.0\n".to_vec();
        data.extend_from_slice(&0.25f32.to_be_bytes());
        data.extend_from_slice(&(-3.5f32).to_be_bytes());
        let img = PfmReader::new().read_from_memory(&data).unwrap();
        assert_eq!((img.width(), img.height(), img.channels()), (1, 2, 1));
        assert!(img.roi().is_float());
        // first stored row is the bottom one
        assert_relative_eq!(img.view().at::<f32>(0, 1, 0, 0), 0.25);
        assert_relative_eq!(img.view().at::<f32>(0, 0, 0, 0), -3.5);
    }

    #[test]
    fn little_endian_rgb_round_trip() {
        let mut img = Image::new(2, 2, 1, PixelLayout::float(3, 32), 1).unwrap();
        img.view_mut().set(1, 0, 0, 2, 1.5f32);
        img.view_mut().set(0, 1, 0, 0, -0.125f32);

        let bytes = PfmWriter::new().write_to_memory(&img.view()).unwrap();
        assert!(bytes.starts_with(b"PF\n2 2\n-1.0\n"));

        let back = PfmReader::new().read_from_memory(&bytes).unwrap();
        assert_relative_eq!(back.view().at::<f32>(1, 0, 0, 2), 1.5);
        assert_relative_eq!(back.view().at::<f32>(0, 1, 0, 0), -0.125);

        let flipped = PfmReader::with_options(PfmOptions::default().flip_y(true))
            .read_from_memory(&bytes)
            .unwrap();
        assert_relative_eq!(flipped.view().at::<f32>(1, 1, 0, 2), 1.5);
    }

    #[test]
    fn half_images_are_widened() {
        let mut img = Image::new(1, 1, 1, PixelLayout::float(1, 16), 1).unwrap();
        img.view_mut().set(0, 0, 0, 0, f16::from_f32(0.5));
        let bytes = PfmWriter::new().write_to_memory(&img.view()).unwrap();
        let back = PfmReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.roi().bpc(), 32);
        assert_relative_eq!(back.view().at::<f32>(0, 0, 0, 0), 0.5);
    }

    #[test]
    fn huge_dimensions_fail_before_allocating() {
        let reader = PfmReader::new();
        let err = reader.read_from_memory(b"PF\n4294967295 4294967295\n-1.0\n\0\0\0\0").unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));

        let err = reader.read_from_memory(b"Pf 60000 60000 -1.0\n\0\0\0\0").unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));
    }

    #[test]
    fn rejects_bad_input() {
        let reader = PfmReader::new();
        assert!(matches!(reader.read_from_memory(b"P6 1 1 255\n"), Err(IoError::Format(_))));
        assert!(matches!(reader.read_from_memory(b"Pf 1 1 0.0\n\0\0\0\0"), Err(IoError::Format(_))));
        assert!(matches!(reader.read_from_memory(b"Pf 1 1 -1.0\n\0\0"), Err(IoError::Format(_))));

        let bytes = Image::new(1, 1, 1, PixelLayout::new(3, 8), 1).unwrap();
        assert!(matches!(
            PfmWriter::new().write_to_memory(&bytes.view()),
            Err(IoError::UnsupportedFormat(_))
        ));
    }
}
