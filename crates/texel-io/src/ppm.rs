//! Binary PPM/PGM (netpbm) format support.
//!
//! `P6` holds RGB pixels, `P5` gray pixels. A `maxval` up to 255 gives one
//! byte per sample; larger values give two bytes, stored big endian on
//! disk and converted to native order in memory. Samples are not rescaled
//! to the full range of their type.
//!
//! The ASCII variants (`P2`, `P3`) and bitmaps (`P1`, `P4`) are not read.

use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use texel_core::{Image, ImgView, PixelLayout};

use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

/// PPM/PGM read/write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpmOptions {
    /// Mirror rows vertically.
    pub flip_y: bool,
}

impl PpmOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

/// PPM/PGM reader.
#[derive(Debug, Clone, Default)]
pub struct PpmReader {
    options: PpmOptions,
}

impl PpmReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: PpmOptions) -> Self {
        Self { options }
    }
}

/// Cursor over a netpbm-style text header; shared with the PFM codec.
pub(crate) struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Starts after the two-byte magic.
    pub(crate) fn after_magic(data: &'a [u8]) -> Self {
        Self { data, pos: 2 }
    }

    fn skip_space(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while self.data.get(self.pos).is_some_and(|&b| b != b'\n') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Next whitespace-delimited word.
    pub(crate) fn word(&mut self) -> &'a str {
        self.skip_space();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(|b| !b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos]).unwrap_or_default()
    }

    pub(crate) fn number(&mut self, what: &str) -> IoResult<u32> {
        self.word()
            .parse()
            .map_err(|_| IoError::Format(format!("invalid header {what}")))
    }

    /// Consumes the single whitespace byte that ends the header.
    pub(crate) fn end_header(&mut self) -> IoResult<&'a [u8]> {
        match self.data.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => Ok(&self.data[self.pos + 1..]),
            _ => Err(IoError::format("truncated image header")),
        }
    }
}

/// The first `height` rows of `row_len` bytes, if the stream holds them.
pub(crate) fn payload(pixels: &[u8], row_len: usize, height: u32) -> Option<&[u8]> {
    pixels.get(..row_len.checked_mul(height as usize)?)
}

impl ImageReader for PpmReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let channels = match data.get(..2) {
            Some(b"P5") => 1,
            Some(b"P6") => 3,
            Some([b'P', b'1'..=b'4']) => {
                return Err(IoError::UnsupportedFormat("ASCII or bitmap netpbm".into()));
            }
            _ => return Err(IoError::format("not a binary PPM/PGM file")),
        };

        let mut tokens = Tokens::after_magic(data);
        let width = tokens.number("width")?;
        let height = tokens.number("height")?;
        let maxval = tokens.number("maxval")?;
        let pixels = tokens.end_header()?;

        if width == 0 || height == 0 {
            return Err(IoError::Format(format!("invalid PPM dimensions {width}x{height}")));
        }
        let bpc = match maxval {
            1..=255 => 8,
            256..=65535 => 16,
            _ => return Err(IoError::Format(format!("invalid PPM maxval {maxval}"))),
        };

        let layout = PixelLayout::new(channels, bpc);
        let row_len = width as usize * layout.bytes_per_pixel();
        let pixels = payload(pixels, row_len, height).ok_or_else(|| IoError::format("truncated PPM pixel data"))?;

        let mut image = Image::new(width, height, 1, layout, 1)?;
        let mut view = image.view_mut();
        for (i, src) in pixels.chunks_exact(row_len).enumerate() {
            let y = if self.options.flip_y { height - 1 - i as u32 } else { i as u32 };
            let dst = view.row_mut(y, 0);
            if bpc == 8 {
                dst.copy_from_slice(src);
            } else {
                let mut cur = Cursor::new(src);
                for out in dst.chunks_exact_mut(2) {
                    let v = cur.read_u16::<BigEndian>().map_err(IoError::truncated("PPM row"))?;
                    out.copy_from_slice(&v.to_ne_bytes());
                }
            }
        }

        tracing::debug!(width, height, channels, maxval, "decoded PPM");
        Ok(image)
    }
}

/// PPM/PGM writer.
///
/// One channel writes `P5`, three channels write `P6`; 8-bit samples use a
/// `maxval` of 255 and 16-bit samples 65535.
#[derive(Debug, Clone, Default)]
pub struct PpmWriter {
    options: PpmOptions,
}

impl PpmWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: PpmOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for PpmWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        let magic = match image.channels() {
            1 => "P5",
            3 => "P6",
            n => return Err(IoError::UnsupportedFormat(format!("PPM with {n} channels"))),
        };
        let maxval = match (image.bpc(), image.is_float()) {
            (8, false) => 255,
            (16, false) => 65535,
            (bpc, float) => {
                return Err(IoError::UnsupportedFormat(format!(
                    "PPM with {bpc}-bit{} samples",
                    if float { " float" } else { "" }
                )));
            }
        };
        if image.depth() != 1 {
            return Err(IoError::UnsupportedFormat("PPM of a 3D image".into()));
        }

        let mut out = format!("{magic}\n{} {}\n{maxval}\n", image.width(), image.height()).into_bytes();
        out.reserve(image.row_bytes() * image.height() as usize);
        for i in 0..image.height() {
            let y = if self.options.flip_y { image.height() - 1 - i } else { i };
            let row = image.row(y, 0);
            if maxval == 255 {
                out.extend_from_slice(row);
            } else {
                for sample in row.chunks_exact(2) {
                    out.write_u16::<BigEndian>(u16::from_ne_bytes([sample[0], sample[1]]))?;
                }
            }
        }

        tracing::debug!(width = image.width(), height = image.height(), magic, "encoded PPM");
        Ok(out)
    }
}

/// Reads a PPM/PGM file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    PpmReader::new().read(path)
}

/// Writes a PPM/PGM file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    PpmWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_with_comments() {
        let mut data = b"P6\n# created by hand\n2 1 # trailing\n255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let img = PpmReader::new().read_from_memory(&data).unwrap();
        assert_eq!((img.width(), img.height(), img.channels()), (2, 1, 3));
        assert_eq!(img.view().row(0, 0), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn sixteen_bit_gray_is_big_endian_on_disk() {
        let mut data = b"P5 2 1 65535\n".to_vec();
        data.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00]);
        let img = PpmReader::new().read_from_memory(&data).unwrap();
        assert_eq!(img.roi().bpc(), 16);
        assert_eq!(img.view().at::<u16>(0, 0, 0, 0), 0x1234);
        assert_eq!(img.view().at::<u16>(1, 0, 0, 0), 0xFF00);

        let written = PpmWriter::new().write_to_memory(&img.view()).unwrap();
        assert_eq!(written, b"P5\n2 1\n65535\n\x12\x34\xFF\x00");
    }

    #[test]
    fn flip_reverses_rows() {
        let mut data = b"P5 1 3 255\n".to_vec();
        data.extend_from_slice(&[10, 20, 30]);
        let img = PpmReader::with_options(PpmOptions::default().flip_y(true))
            .read_from_memory(&data)
            .unwrap();
        assert_eq!(img.view().at::<u8>(0, 0, 0, 0), 30);
        assert_eq!(img.view().at::<u8>(0, 2, 0, 0), 10);
    }

    #[test]
    fn huge_dimensions_fail_before_allocating() {
        let reader = PpmReader::new();
        let err = reader
            .read_from_memory(b"P6\n4294967295 4294967295\n65535\n\0\0\0\0")
            .unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));

        // 3.6 GB of gray pixels promised, four bytes delivered
        let err = reader.read_from_memory(b"P5 60000 60000 255\n\0\0\0\0").unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));
    }

    #[test]
    fn rejects_bad_input() {
        let reader = PpmReader::new();
        assert!(matches!(reader.read_from_memory(b"P3 1 1 255\n0 0 0"), Err(IoError::UnsupportedFormat(_))));
        assert!(matches!(reader.read_from_memory(b"BM"), Err(IoError::Format(_))));
        assert!(matches!(reader.read_from_memory(b"P6 x 1 255\n"), Err(IoError::Format(_))));
        assert!(matches!(reader.read_from_memory(b"P6 1 1 0\n\0\0\0"), Err(IoError::Format(_))));
        assert!(matches!(reader.read_from_memory(b"P6 2 2 255\n\0\0\0"), Err(IoError::Format(_))));

        let rgba = Image::new(1, 1, 1, PixelLayout::new(4, 8), 1).unwrap();
        assert!(PpmWriter::new().write_to_memory(&rgba.view()).is_err());
    }
}
