//! BSON image documents.
//!
//! An image is stored as one BSON document:
//!
//! ```text
//! { width: i64, height: i64, depth: i64, channels: i64, bpc: i64,
//!   signed: bool, float: bool, data: binary }
//! ```
//!
//! `data` holds the pixels byte-packed, rows top to bottom and slices in
//! order, samples in native byte order. Any layout a view can describe
//! round-trips, so the format doubles as a lossless dump of a slot or ROI.

use std::path::Path;

use bson::spec::BinarySubtype;
use bson::{Binary, Document, doc};
use texel_core::{Image, ImgView, PixelLayout};

use crate::traits::{ImageReader, ImageWriter};
use crate::{IoError, IoResult};

/// BSON read/write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonOptions {
    /// Mirror rows vertically within each slice.
    pub flip_y: bool,
}

impl BsonOptions {
    /// Sets vertical flipping.
    pub fn flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

/// BSON image reader.
#[derive(Debug, Clone, Default)]
pub struct BsonReader {
    options: BsonOptions,
}

impl BsonReader {
    /// Creates a reader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with the given options.
    pub fn with_options(options: BsonOptions) -> Self {
        Self { options }
    }
}

fn field_u32(doc: &Document, key: &str) -> IoResult<u32> {
    let value = doc
        .get_i64(key)
        .map_err(|e| IoError::Format(format!("BSON image field {key}: {e}")))?;
    u32::try_from(value).map_err(|_| IoError::Format(format!("BSON image field {key} out of range: {value}")))
}

fn field_bool(doc: &Document, key: &str) -> IoResult<bool> {
    doc.get_bool(key)
        .map_err(|e| IoError::Format(format!("BSON image field {key}: {e}")))
}

impl ImageReader for BsonReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let doc = Document::from_reader(data).map_err(|e| IoError::Format(format!("invalid BSON: {e}")))?;

        let width = field_u32(&doc, "width")?;
        let height = field_u32(&doc, "height")?;
        let depth = field_u32(&doc, "depth")?;
        let channels = field_u32(&doc, "channels")?;
        let bpc = field_u32(&doc, "bpc")?;
        let signed = field_bool(&doc, "signed")?;
        let float = field_bool(&doc, "float")?;
        let pixels = doc
            .get_binary_generic("data")
            .map_err(|e| IoError::Format(format!("BSON image field data: {e}")))?;

        if width == 0 || height == 0 || depth == 0 || channels == 0 {
            return Err(IoError::Format(format!(
                "invalid BSON image extent {width}x{height}x{depth} with {channels} channels"
            )));
        }
        if bpc == 0 || bpc % 8 != 0 || bpc > 64 {
            return Err(IoError::Format(format!("invalid BSON image depth of {bpc} bits")));
        }

        let layout = PixelLayout { channels, bpc, signed, float };
        let row_len = width as usize * layout.bytes_per_pixel();
        let expected = row_len
            .checked_mul(height as usize)
            .and_then(|len| len.checked_mul(depth as usize));
        if expected != Some(pixels.len()) {
            return Err(IoError::Format(format!(
                "BSON image data holds {} bytes, {width}x{height}x{depth} needs {}",
                pixels.len(),
                expected.map_or_else(|| "more".to_string(), |n| n.to_string())
            )));
        }

        let mut image = Image::new(width, height, depth, layout, 1)?;
        let mut view = image.view_mut();
        for (i, src) in pixels.chunks_exact(row_len).enumerate() {
            let (z, row) = ((i / height as usize) as u32, (i % height as usize) as u32);
            let y = if self.options.flip_y { height - 1 - row } else { row };
            view.row_mut(y, z).copy_from_slice(src);
        }

        tracing::debug!(width, height, depth, channels, bpc, "decoded BSON image");
        Ok(image)
    }
}

/// BSON image writer.
///
/// Writes any non-empty view; padding between rows is dropped.
#[derive(Debug, Clone, Default)]
pub struct BsonWriter {
    options: BsonOptions,
}

impl BsonWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: BsonOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for BsonWriter {
    fn write_to_memory(&self, image: &ImgView<'_>) -> IoResult<Vec<u8>> {
        if image.is_empty() {
            return Err(IoError::EncodeError("BSON image of an empty view".into()));
        }

        let (height, depth) = (image.height(), image.depth());
        let mut packed = Vec::with_capacity(image.row_bytes() * height as usize * depth as usize);
        for z in 0..depth {
            for i in 0..height {
                let y = if self.options.flip_y { height - 1 - i } else { i };
                packed.extend_from_slice(image.row(y, z));
            }
        }

        let doc = doc! {
            "width": i64::from(image.width()),
            "height": i64::from(height),
            "depth": i64::from(depth),
            "channels": i64::from(image.channels()),
            "bpc": i64::from(image.bpc()),
            "signed": image.is_signed(),
            "float": image.is_float(),
            "data": Binary { subtype: BinarySubtype::Generic, bytes: packed },
        };
        let mut out = Vec::new();
        doc.to_writer(&mut out)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;

        tracing::debug!(width = image.width(), height, depth, bytes = out.len(), "encoded BSON image");
        Ok(out)
    }
}

/// Reads a BSON image file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    BsonReader::new().read(path)
}

/// Writes a BSON image file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &ImgView<'_>) -> IoResult<()> {
    BsonWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Image {
        let mut img = Image::new(6, 5, 2, PixelLayout::new(2, 16), 4).unwrap();
        let mut view = img.view_mut();
        for z in 0..2 {
            for y in 0..5 {
                for x in 0..6 {
                    view.set(x, y, z, 0, (z * 1000 + y * 10 + x) as u16);
                    view.set(x, y, z, 1, 0xFFFFu16);
                }
            }
        }
        img
    }

    #[test]
    fn region_round_trip_with_flip() {
        let img = filled();
        let roi = img.view().sub_region(1, 1, 0, 4, 3, 1);

        let bytes = BsonWriter::with_options(BsonOptions::default().flip_y(true))
            .write_to_memory(&roi)
            .unwrap();
        let back = BsonReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height(), back.depth(), back.channels()), (4, 3, 2, 2));
        assert_eq!(back.roi().bpc(), 16);
        assert_eq!(back.roi().pitch(), 16);

        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    assert_eq!(back.view().at::<u16>(x, 2 - y, z, 0), roi.at::<u16>(x, y, z, 0));
                }
            }
        }

        let unflipped = BsonReader::with_options(BsonOptions::default().flip_y(true))
            .read_from_memory(&bytes)
            .unwrap();
        assert_eq!(unflipped.view().at::<u16>(0, 0, 1, 0), 1011);
    }

    #[test]
    fn float_layout_survives() {
        let mut img = Image::new(2, 1, 1, PixelLayout::float(1, 32), 1).unwrap();
        img.view_mut().set(1, 0, 0, 0, -2.5f32);
        let bytes = BsonWriter::new().write_to_memory(&img.view()).unwrap();
        let back = BsonReader::new().read_from_memory(&bytes).unwrap();
        assert!(back.roi().is_float());
        assert_eq!(back.view().at::<f32>(1, 0, 0, 0), -2.5);
    }

    #[test]
    fn rejects_inconsistent_documents() {
        let reader = BsonReader::new();
        assert!(matches!(reader.read_from_memory(b"\x05\x00"), Err(IoError::Format(_))));

        let mut doc = doc! {
            "width": 4_294_967_295i64,
            "height": 4_294_967_295i64,
            "depth": 1i64,
            "channels": 4i64,
            "bpc": 32i64,
            "signed": false,
            "float": true,
            "data": Binary { subtype: BinarySubtype::Generic, bytes: vec![0; 16] },
        };
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();
        let err = reader.read_from_memory(&bytes).unwrap_err();
        assert!(matches!(err, IoError::Format(ref m) if m.contains("needs")));

        doc.insert("width", -1i64);
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();
        assert!(matches!(reader.read_from_memory(&bytes), Err(IoError::Format(_))));

        doc.remove("data");
        doc.insert("width", 1i64);
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();
        assert!(matches!(reader.read_from_memory(&bytes), Err(IoError::Format(_))));
    }
}
