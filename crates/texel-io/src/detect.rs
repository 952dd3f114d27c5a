//! Format detection utilities.
//!
//! Detects file formats from extensions and magic bytes.

use crate::IoResult;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// KTX 1.1 texture container.
    Ktx,
    /// Windows bitmap.
    Bmp,
    /// Binary PPM/PGM (P6/P5).
    Ppm,
    /// Portable float map.
    Pfm,
    /// PNG format.
    Png,
    /// JPEG/JFIF.
    Jpeg,
    /// BSON image document. Recognised by extension only.
    Bson,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from file path (extension + magic bytes).
    ///
    /// First checks magic bytes, falls back to extension.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();

        if let Ok(format) = Self::from_magic_bytes(path) {
            if format != Format::Unknown {
                return Ok(format);
            }
        }

        Ok(Self::from_extension(path))
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("ktx") => Format::Ktx,
            Some("bmp") | Some("dib") => Format::Bmp,
            Some("ppm") | Some("pgm") | Some("pnm") => Format::Ppm,
            Some("pfm") => Format::Pfm,
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            Some("bson") => Format::Bson,
            _ => Format::Unknown,
        }
    }

    /// Detects format from file magic bytes.
    pub fn from_magic_bytes<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; 12];

        let bytes_read = file.read(&mut header)?;
        Ok(Self::from_bytes(&header[..bytes_read]))
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&crate::ktx::MAGIC) {
            return Format::Ktx;
        }

        // PNG: 0x89 'P' 'N' 'G' CR LF SUB LF
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Format::Png;
        }

        if bytes.len() < 3 {
            return Format::Unknown;
        }
        if bytes[..3] == [0xFF, 0xD8, 0xFF] {
            return Format::Jpeg;
        }

        match &bytes[..2] {
            b"BM" => Format::Bmp,
            b"P5" | b"P6" if bytes[2].is_ascii_whitespace() => Format::Ppm,
            b"PF" | b"Pf" if bytes[2].is_ascii_whitespace() => Format::Pfm,
            _ => Format::Unknown,
        }
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Ktx => "ktx",
            Format::Bmp => "bmp",
            Format::Ppm => "ppm",
            Format::Pfm => "pfm",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Bson => "bson",
            Format::Unknown => "",
        }
    }

    /// Returns true for the multi-level texture container.
    pub fn is_texture(&self) -> bool {
        matches!(self, Format::Ktx)
    }
}
