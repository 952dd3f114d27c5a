//! BMP (Windows bitmap) format support.
//!
//! Uncompressed bitmaps with a `BITMAPINFOHEADER` or later header.
//!
//! # Features
//!
//! - 8-bit palettized: a gray palette decodes to one channel, any other
//!   palette expands to RGB
//! - 24-bit BGR and 32-bit BGRA (`BI_RGB` or `BI_BITFIELDS` with the
//!   standard masks)
//! - Bottom-up and top-down row order
//! - Writes 8-bit gray (with a gray palette), 24-bit and 32-bit files
//!
//! Decoded images are byte-packed with RGB(A) channel order.
//!
//! # Example
//!
//! ```rust,ignore
//! use texel_io::bmp::{BmpReader, BmpOptions};
//! use texel_io::ImageReader;
//!
//! let reader = BmpReader::with_options(BmpOptions::default().flip_y(true));
//! let image = reader.read("input.bmp")?;
//! ```

use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use texel_core::{Image, ImgView, PixelLayout};

use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

/// BMP read/write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BmpOptions {
    /// Mirror rows vertically relative to the natural top-down order.
    pub flip_y: bool,
}

impl BmpOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

/// BMP file reader.
#[derive(Debug, Clone, Default)]
pub struct BmpReader {
    options: BmpOptions,
}

impl BmpReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: BmpOptions) -> Self {
        Self { options }
    }
}

struct Header {
    data_offset: u32,
    header_len: u32,
    width: u32,
    height: u32,
    top_down: bool,
    bpp: u16,
    compression: u32,
    colors_used: u32,
}

fn parse_header(data: &[u8]) -> IoResult<Header> {
    if data.len() < 2 || &data[..2] != b"BM" {
        return Err(IoError::format("not a BMP file"));
    }
    let header = read_header_fields(&mut Cursor::new(&data[2..])).map_err(IoError::truncated("BMP header"))?;
    if header.header_len < INFO_HEADER_LEN {
        return Err(IoError::UnsupportedFormat(format!("BMP info header of {} bytes", header.header_len)));
    }
    if header.width == 0 || header.height == 0 {
        return Err(IoError::Format(format!("invalid BMP dimensions {}x{}", header.width, header.height)));
    }
    Ok(header)
}

fn read_header_fields(cur: &mut Cursor<&[u8]>) -> std::io::Result<Header> {
    let _file_size = cur.read_u32::<LittleEndian>()?;
    let _reserved = cur.read_u32::<LittleEndian>()?;
    let data_offset = cur.read_u32::<LittleEndian>()?;
    let header_len = cur.read_u32::<LittleEndian>()?;
    let width = cur.read_i32::<LittleEndian>()?;
    let height = cur.read_i32::<LittleEndian>()?;
    let _planes = cur.read_u16::<LittleEndian>()?;
    let bpp = cur.read_u16::<LittleEndian>()?;
    let compression = cur.read_u32::<LittleEndian>()?;
    let _image_size = cur.read_u32::<LittleEndian>()?;
    let _x_ppm = cur.read_i32::<LittleEndian>()?;
    let _y_ppm = cur.read_i32::<LittleEndian>()?;
    let colors_used = cur.read_u32::<LittleEndian>()?;

    Ok(Header {
        data_offset,
        header_len,
        // negative widths are rejected as zero
        width: width.max(0) as u32,
        height: height.unsigned_abs(),
        top_down: height < 0,
        bpp,
        compression,
        colors_used,
    })
}

/// Reads the palette as RGB triples.
fn read_palette(data: &[u8], header: &Header) -> IoResult<Vec<[u8; 3]>> {
    let count = match header.colors_used {
        0 => 256,
        n if n <= 256 => n as usize,
        n => return Err(IoError::Format(format!("BMP palette of {n} entries"))),
    };
    let start = (FILE_HEADER_LEN + header.header_len) as usize;
    let end = start + count * 4;
    let raw = data
        .get(start..end)
        .ok_or_else(|| IoError::format("truncated BMP palette"))?;
    Ok(raw.chunks_exact(4).map(|bgra| [bgra[2], bgra[1], bgra[0]]).collect())
}

fn check_bitfields(data: &[u8], header: &Header) -> IoResult<()> {
    // masks follow the 40-byte info header
    let start = (FILE_HEADER_LEN + INFO_HEADER_LEN) as usize;
    let mut cur = Cursor::new(data.get(start..).unwrap_or_default());
    let mut masks = [0u32; 3];
    for mask in &mut masks {
        *mask = cur.read_u32::<LittleEndian>().map_err(IoError::truncated("BMP bitfields"))?;
    }
    if header.bpp != 32 || masks != [0x00FF_0000, 0x0000_FF00, 0x0000_00FF] {
        return Err(IoError::UnsupportedFormat(format!(
            "BMP bitfields {:08X}/{:08X}/{:08X} at {} bpp",
            masks[0], masks[1], masks[2], header.bpp
        )));
    }
    Ok(())
}

/// Bytes per stored row, padded to 4.
fn stride(width: u32, bpp: u16) -> usize {
    (width as usize * bpp as usize).div_ceil(32) * 4
}

impl ImageReader for BmpReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let header = parse_header(data)?;
        match header.compression {
            BI_RGB => {}
            BI_BITFIELDS => check_bitfields(data, &header)?,
            other => return Err(IoError::UnsupportedFormat(format!("BMP compression {other}"))),
        }

        let palette = match header.bpp {
            8 => Some(read_palette(data, &header)?),
            24 | 32 => None,
            other => return Err(IoError::UnsupportedFormat(format!("{other}-bit BMP"))),
        };
        let gray = palette
            .as_ref()
            .is_some_and(|p| p.iter().all(|&[r, g, b]| r == g && g == b));
        let channels = match (header.bpp, gray) {
            (8, true) => 1,
            (8, false) | (24, _) => 3,
            _ => 4,
        };

        let row_len = stride(header.width, header.bpp);
        let start = header.data_offset as usize;
        let pixels = row_len
            .checked_mul(header.height as usize)
            .and_then(|len| start.checked_add(len))
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| IoError::format("truncated BMP pixel data"))?;

        let mut image = Image::new(header.width, header.height, 1, PixelLayout::new(channels, 8), 1)?;
        let mut view = image.view_mut();
        for (i, src) in pixels.chunks_exact(row_len).enumerate() {
            let mut y = if header.top_down { i as u32 } else { header.height - 1 - i as u32 };
            if self.options.flip_y {
                y = header.height - 1 - y;
            }
            let dst = view.row_mut(y, 0);
            match (&palette, channels) {
                (Some(palette), _) => {
                    for (x, &index) in src[..header.width as usize].iter().enumerate() {
                        let rgb = palette
                            .get(index as usize)
                            .ok_or_else(|| IoError::Format(format!("BMP palette index {index} out of range")))?;
                        if gray {
                            dst[x] = rgb[0];
                        } else {
                            dst[x * 3..x * 3 + 3].copy_from_slice(rgb);
                        }
                    }
                }
                (None, 3) => {
                    for (out, bgr) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
                        out.copy_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                    }
                }
                (None, _) => {
                    for (out, bgra) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                        out.copy_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
                    }
                }
            }
        }

        tracing::debug!(width = header.width, height = header.height, bpp = header.bpp, "decoded BMP");
        Ok(image)
    }
}

/// BMP file writer.
#[derive(Debug, Clone, Default)]
pub struct BmpWriter {
    options: BmpOptions,
}

impl BmpWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: BmpOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for BmpWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        let channels = image.channels();
        if image.bpc() != 8 || image.is_float() || !matches!(channels, 1 | 3 | 4) || image.depth() != 1 {
            return Err(IoError::UnsupportedFormat(format!(
                "BMP needs 1, 3 or 4 channels of 8 bits in one slice, got {}x{} bits x{} slices",
                channels,
                image.bpc(),
                image.depth()
            )));
        }
        if image.is_empty() {
            return Err(IoError::EncodeError("cannot write an empty BMP".into()));
        }

        let bpp = (channels * 8) as u16;
        let palette_len = if channels == 1 { 256 * 4 } else { 0 };
        let data_offset = FILE_HEADER_LEN + INFO_HEADER_LEN + palette_len;
        let row_len = stride(image.width(), bpp);
        let image_size = row_len * image.height() as usize;
        let file_size = u32::try_from(data_offset as usize + image_size)
            .map_err(|_| IoError::EncodeError("image too large for BMP".into()))?;

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"BM");
        out.write_u32::<LittleEndian>(file_size)?;
        out.write_u32::<LittleEndian>(0)?;
        out.write_u32::<LittleEndian>(data_offset)?;

        out.write_u32::<LittleEndian>(INFO_HEADER_LEN)?;
        out.write_i32::<LittleEndian>(image.width() as i32)?;
        out.write_i32::<LittleEndian>(image.height() as i32)?;
        out.write_u16::<LittleEndian>(1)?;
        out.write_u16::<LittleEndian>(bpp)?;
        out.write_u32::<LittleEndian>(BI_RGB)?;
        out.write_u32::<LittleEndian>(image_size as u32)?;
        out.write_i32::<LittleEndian>(2835)?; // 72 dpi
        out.write_i32::<LittleEndian>(2835)?;
        out.write_u32::<LittleEndian>(if channels == 1 { 256 } else { 0 })?;
        out.write_u32::<LittleEndian>(0)?;

        if channels == 1 {
            for i in 0..=255u8 {
                out.extend_from_slice(&[i, i, i, 0]);
            }
        }

        let padding = row_len - image.row_bytes();
        for i in 0..image.height() {
            // bottom-up unless flipped
            let y = if self.options.flip_y { i } else { image.height() - 1 - i };
            let row = image.row(y, 0);
            match channels {
                1 => out.extend_from_slice(row),
                3 => row.chunks_exact(3).for_each(|p| out.extend_from_slice(&[p[2], p[1], p[0]])),
                _ => row.chunks_exact(4).for_each(|p| out.extend_from_slice(&[p[2], p[1], p[0], p[3]])),
            }
            out.resize(out.len() + padding, 0);
        }

        tracing::debug!(width = image.width(), height = image.height(), bpp, "encoded BMP");
        Ok(out)
    }
}

/// Reads a BMP file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    BmpReader::new().read(path)
}

/// Writes a BMP file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    BmpWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_image() -> Image {
        let mut img = Image::new(3, 2, 1, PixelLayout::new(3, 8), 4).unwrap();
        let mut view = img.view_mut();
        for y in 0..2 {
            for x in 0..3 {
                view.set(x, y, 0, 0, (x * 10 + y) as u8);
                view.set(x, y, 0, 1, 100u8);
                view.set(x, y, 0, 2, 200 + y as u8);
            }
        }
        img
    }

    #[test]
    fn rgb_round_trip() {
        let img = rgb_image();
        let bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        // 3 pixels * 3 bytes padded to 12 per row
        assert_eq!(bytes.len(), 54 + 12 * 2);
        // first stored row is the bottom image row, BGR order
        assert_eq!(&bytes[54..57], &[201, 100, 1]);

        let back = BmpReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height(), back.channels()), (3, 2, 3));
        for y in 0..2 {
            assert_eq!(back.view().row(y, 0), img.view().row(y, 0));
        }
    }

    #[test]
    fn gray_palette_decodes_to_one_channel() {
        let mut img = Image::new(5, 1, 1, PixelLayout::new(1, 8), 1).unwrap();
        for x in 0..5 {
            img.view_mut().set(x, 0, 0, 0, (x * 50) as u8);
        }
        let bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        let back = BmpReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.channels(), 1);
        assert_eq!(back.view().row(0, 0), &[0, 50, 100, 150, 200]);
    }

    #[test]
    fn color_palette_expands_to_rgb() {
        let mut img = Image::new(2, 1, 1, PixelLayout::new(1, 8), 1).unwrap();
        img.view_mut().set(1, 0, 0, 0, 1u8);
        let mut bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        // palette entry 1 becomes pure red (BGRA)
        bytes[54 + 4..54 + 8].copy_from_slice(&[0, 0, 255, 0]);

        let back = BmpReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.channels(), 3);
        assert_eq!(back.view().row(0, 0), &[0, 0, 0, 255, 0, 0]);
    }

    #[test]
    fn top_down_and_flip() {
        let img = rgb_image();
        let mut bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        // negative height marks top-down storage
        bytes[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let back = BmpReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.view().row(0, 0), img.view().row(1, 0));

        let flipped = BmpReader::with_options(BmpOptions::default().flip_y(true))
            .read_from_memory(&bytes)
            .unwrap();
        assert_eq!(flipped.view().row(0, 0), img.view().row(0, 0));
    }

    #[test]
    fn rgba_round_trip() {
        let mut img = Image::new(2, 2, 1, PixelLayout::new(4, 8), 1).unwrap();
        img.view_mut().set(1, 1, 0, 3, 77u8);
        img.view_mut().set(0, 1, 0, 0, 9u8);
        let bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        let back = BmpReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(back.view().at::<u8>(1, 1, 0, 3), 77);
        assert_eq!(back.view().at::<u8>(0, 1, 0, 0), 9);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(BmpReader::new().read_from_memory(b"PNG"), Err(IoError::Format(_))));

        let img = rgb_image();
        let bytes = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        let err = BmpReader::new().read_from_memory(&bytes[..60]).unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));

        // header claims i32::MAX x i32::MIN over a 3x2 payload
        let mut huge = BmpWriter::new().write_to_memory(&img.view()).unwrap();
        huge[18..22].copy_from_slice(&i32::MAX.to_le_bytes());
        huge[22..26].copy_from_slice(&i32::MIN.to_le_bytes());
        let err = BmpReader::new().read_from_memory(&huge).unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("truncated")));

        let wide = Image::new(2, 2, 1, PixelLayout::new(3, 16), 1).unwrap();
        assert!(matches!(
            BmpWriter::new().write_to_memory(&wide.view()),
            Err(IoError::UnsupportedFormat(_))
        ));
    }
}
