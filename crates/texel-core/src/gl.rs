//! Translation between [`TextureFormat`] and OpenGL format triples.
//!
//! Texture containers such as KTX identify pixel formats by the GL
//! `(internal format, external format, type)` triple. This module holds the
//! process-wide table used in both directions.
//!
//! Block-compressed formats carry `external = 0` and `ty = 0`; they are
//! matched by internal format alone. Formats with no GL counterpart (64-bit
//! components, `Rg4UnormPack8`, signed RGB10A2) are absent from the table.

use crate::format::TextureFormat;

/// GL data type constants.
#[allow(missing_docs)]
pub mod types {
    pub const BYTE: u32 = 0x1400;
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const SHORT: u32 = 0x1402;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const INT: u32 = 0x1404;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const FLOAT: u32 = 0x1406;
    pub const DOUBLE: u32 = 0x140A;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
    pub const UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
    pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;
    pub const UNSIGNED_INT_2_10_10_10_REV: u32 = 0x8368;
}

/// GL pixel (external) format constants.
#[allow(missing_docs)]
pub mod formats {
    pub const RED: u32 = 0x1903;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const RG: u32 = 0x8227;
    pub const RG_INTEGER: u32 = 0x8228;
    pub const RED_INTEGER: u32 = 0x8D94;
    pub const RGB_INTEGER: u32 = 0x8D98;
    pub const RGBA_INTEGER: u32 = 0x8D99;
}

/// A GL format triple plus the base internal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlFormat {
    /// Sized internal format.
    pub internal: u32,
    /// Pixel (external) format; 0 for compressed formats.
    pub external: u32,
    /// Base internal format.
    pub base_internal: u32,
    /// Data type; 0 for compressed formats.
    pub ty: u32,
}

const fn gl(internal: u32, external: u32, ty: u32) -> GlFormat {
    let base_internal = match external {
        formats::RED_INTEGER => formats::RED,
        formats::RG_INTEGER => formats::RG,
        formats::RGB_INTEGER => formats::RGB,
        formats::RGBA_INTEGER => formats::RGBA,
        other => other,
    };
    GlFormat { internal, external, base_internal, ty }
}

const fn compressed(internal: u32, base_internal: u32) -> GlFormat {
    GlFormat { internal, external: 0, base_internal, ty: 0 }
}

use formats::*;
use types::*;
use TextureFormat as F;

static TABLE: &[(TextureFormat, GlFormat)] = &[
    (F::Rgba4UnormPack16, gl(0x8056, RGBA, UNSIGNED_SHORT_4_4_4_4)),
    (F::R5g6b5UnormPack16, gl(0x8D62, RGB, UNSIGNED_SHORT_5_6_5)),
    (F::Rgb5a1UnormPack16, gl(0x8057, RGBA, UNSIGNED_SHORT_5_5_5_1)),

    (F::R8Unorm, gl(0x8229, RED, UNSIGNED_BYTE)),
    (F::R8Snorm, gl(0x8F94, RED, BYTE)),
    (F::R8Uint, gl(0x8232, RED_INTEGER, UNSIGNED_BYTE)),
    (F::R8Sint, gl(0x8231, RED_INTEGER, BYTE)),
    (F::R8Srgb, gl(0x8FBD, RED, UNSIGNED_BYTE)),
    (F::Rg8Unorm, gl(0x822B, RG, UNSIGNED_BYTE)),
    (F::Rg8Snorm, gl(0x8F95, RG, BYTE)),
    (F::Rg8Uint, gl(0x8238, RG_INTEGER, UNSIGNED_BYTE)),
    (F::Rg8Sint, gl(0x8237, RG_INTEGER, BYTE)),
    (F::Rg8Srgb, gl(0x8FBE, RG, UNSIGNED_BYTE)),
    (F::Rgb8Unorm, gl(0x8051, RGB, UNSIGNED_BYTE)),
    (F::Rgb8Snorm, gl(0x8F96, RGB, BYTE)),
    (F::Rgb8Uint, gl(0x8D7D, RGB_INTEGER, UNSIGNED_BYTE)),
    (F::Rgb8Sint, gl(0x8D8F, RGB_INTEGER, BYTE)),
    (F::Rgb8Srgb, gl(0x8C41, RGB, UNSIGNED_BYTE)),
    (F::Rgba8Unorm, gl(0x8058, RGBA, UNSIGNED_BYTE)),
    (F::Rgba8Snorm, gl(0x8F97, RGBA, BYTE)),
    (F::Rgba8Uint, gl(0x8D7C, RGBA_INTEGER, UNSIGNED_BYTE)),
    (F::Rgba8Sint, gl(0x8D8E, RGBA_INTEGER, BYTE)),
    (F::Rgba8Srgb, gl(0x8C43, RGBA, UNSIGNED_BYTE)),

    (F::Rgb10a2Unorm, gl(0x8059, RGBA, UNSIGNED_INT_2_10_10_10_REV)),
    (F::Rgb10a2Uint, gl(0x906F, RGBA_INTEGER, UNSIGNED_INT_2_10_10_10_REV)),

    (F::R16Unorm, gl(0x822A, RED, UNSIGNED_SHORT)),
    (F::R16Snorm, gl(0x8F98, RED, SHORT)),
    (F::R16Uint, gl(0x8234, RED_INTEGER, UNSIGNED_SHORT)),
    (F::R16Sint, gl(0x8233, RED_INTEGER, SHORT)),
    (F::R16Sfloat, gl(0x822D, RED, HALF_FLOAT)),
    (F::Rg16Unorm, gl(0x822C, RG, UNSIGNED_SHORT)),
    (F::Rg16Snorm, gl(0x8F99, RG, SHORT)),
    (F::Rg16Uint, gl(0x823A, RG_INTEGER, UNSIGNED_SHORT)),
    (F::Rg16Sint, gl(0x8239, RG_INTEGER, SHORT)),
    (F::Rg16Sfloat, gl(0x822F, RG, HALF_FLOAT)),
    (F::Rgb16Unorm, gl(0x8054, RGB, UNSIGNED_SHORT)),
    (F::Rgb16Snorm, gl(0x8F9A, RGB, SHORT)),
    (F::Rgb16Uint, gl(0x8D77, RGB_INTEGER, UNSIGNED_SHORT)),
    (F::Rgb16Sint, gl(0x8D89, RGB_INTEGER, SHORT)),
    (F::Rgb16Sfloat, gl(0x881B, RGB, HALF_FLOAT)),
    (F::Rgba16Unorm, gl(0x805B, RGBA, UNSIGNED_SHORT)),
    (F::Rgba16Snorm, gl(0x8F9B, RGBA, SHORT)),
    (F::Rgba16Uint, gl(0x8D76, RGBA_INTEGER, UNSIGNED_SHORT)),
    (F::Rgba16Sint, gl(0x8D88, RGBA_INTEGER, SHORT)),
    (F::Rgba16Sfloat, gl(0x881A, RGBA, HALF_FLOAT)),

    (F::R32Uint, gl(0x8236, RED_INTEGER, UNSIGNED_INT)),
    (F::R32Sint, gl(0x8235, RED_INTEGER, INT)),
    (F::R32Sfloat, gl(0x822E, RED, FLOAT)),
    (F::Rg32Uint, gl(0x823C, RG_INTEGER, UNSIGNED_INT)),
    (F::Rg32Sint, gl(0x823B, RG_INTEGER, INT)),
    (F::Rg32Sfloat, gl(0x8230, RG, FLOAT)),
    (F::Rgb32Uint, gl(0x8D71, RGB_INTEGER, UNSIGNED_INT)),
    (F::Rgb32Sint, gl(0x8D83, RGB_INTEGER, INT)),
    (F::Rgb32Sfloat, gl(0x8815, RGB, FLOAT)),
    (F::Rgba32Uint, gl(0x8D70, RGBA_INTEGER, UNSIGNED_INT)),
    (F::Rgba32Sint, gl(0x8D82, RGBA_INTEGER, INT)),
    (F::Rgba32Sfloat, gl(0x8814, RGBA, FLOAT)),

    // S3TC / RGTC / BPTC
    (F::RgbDxt1Unorm, compressed(0x83F0, RGB)),
    (F::RgbDxt1Srgb, compressed(0x8C4C, RGB)),
    (F::RgbaDxt1Unorm, compressed(0x83F1, RGBA)),
    (F::RgbaDxt1Srgb, compressed(0x8C4D, RGBA)),
    (F::RgbaDxt3Unorm, compressed(0x83F2, RGBA)),
    (F::RgbaDxt3Srgb, compressed(0x8C4E, RGBA)),
    (F::RgbaDxt5Unorm, compressed(0x83F3, RGBA)),
    (F::RgbaDxt5Srgb, compressed(0x8C4F, RGBA)),
    (F::RAti1nUnorm, compressed(0x8DBB, RED)),
    (F::RAti1nSnorm, compressed(0x8DBC, RED)),
    (F::RgAti2nUnorm, compressed(0x8DBD, RG)),
    (F::RgAti2nSnorm, compressed(0x8DBE, RG)),
    (F::RgbBpUfloat, compressed(0x8E8F, RGB)),
    (F::RgbBpSfloat, compressed(0x8E8E, RGB)),
    (F::RgbaBpUnorm, compressed(0x8E8C, RGBA)),
    (F::RgbaBpSrgb, compressed(0x8E8D, RGBA)),

    // ETC2 / EAC
    (F::RgbEtc2Unorm, compressed(0x9274, RGB)),
    (F::RgbEtc2Srgb, compressed(0x9275, RGB)),
    (F::RgbA1Etc2Unorm, compressed(0x9276, RGBA)),
    (F::RgbA1Etc2Srgb, compressed(0x9277, RGBA)),
    (F::RgbaEtc2Unorm, compressed(0x9278, RGBA)),
    (F::RgbaEtc2Srgb, compressed(0x9279, RGBA)),
    (F::REacUnorm, compressed(0x9270, RED)),
    (F::REacSnorm, compressed(0x9271, RED)),
    (F::RgEacUnorm, compressed(0x9272, RG)),
    (F::RgEacSnorm, compressed(0x9273, RG)),

    // ASTC
    (F::RgbaAstc4x4Unorm, compressed(0x93B0, RGBA)),
    (F::RgbaAstc4x4Srgb, compressed(0x93D0, RGBA)),
    (F::RgbaAstc5x4Unorm, compressed(0x93B1, RGBA)),
    (F::RgbaAstc5x4Srgb, compressed(0x93D1, RGBA)),
    (F::RgbaAstc5x5Unorm, compressed(0x93B2, RGBA)),
    (F::RgbaAstc5x5Srgb, compressed(0x93D2, RGBA)),
    (F::RgbaAstc6x5Unorm, compressed(0x93B3, RGBA)),
    (F::RgbaAstc6x5Srgb, compressed(0x93D3, RGBA)),
    (F::RgbaAstc6x6Unorm, compressed(0x93B4, RGBA)),
    (F::RgbaAstc6x6Srgb, compressed(0x93D4, RGBA)),
    (F::RgbaAstc8x5Unorm, compressed(0x93B5, RGBA)),
    (F::RgbaAstc8x5Srgb, compressed(0x93D5, RGBA)),
    (F::RgbaAstc8x6Unorm, compressed(0x93B6, RGBA)),
    (F::RgbaAstc8x6Srgb, compressed(0x93D6, RGBA)),
    (F::RgbaAstc8x8Unorm, compressed(0x93B7, RGBA)),
    (F::RgbaAstc8x8Srgb, compressed(0x93D7, RGBA)),
    (F::RgbaAstc10x5Unorm, compressed(0x93B8, RGBA)),
    (F::RgbaAstc10x5Srgb, compressed(0x93D8, RGBA)),
    (F::RgbaAstc10x6Unorm, compressed(0x93B9, RGBA)),
    (F::RgbaAstc10x6Srgb, compressed(0x93D9, RGBA)),
    (F::RgbaAstc10x8Unorm, compressed(0x93BA, RGBA)),
    (F::RgbaAstc10x8Srgb, compressed(0x93DA, RGBA)),
    (F::RgbaAstc10x10Unorm, compressed(0x93BB, RGBA)),
    (F::RgbaAstc10x10Srgb, compressed(0x93DB, RGBA)),
    (F::RgbaAstc12x10Unorm, compressed(0x93BC, RGBA)),
    (F::RgbaAstc12x10Srgb, compressed(0x93DC, RGBA)),
    (F::RgbaAstc12x12Unorm, compressed(0x93BD, RGBA)),
    (F::RgbaAstc12x12Srgb, compressed(0x93DD, RGBA)),

    // PVRTC
    (F::RgbPvrtc1Bpp4Unorm, compressed(0x8C00, RGB)),
    (F::RgbPvrtc1Bpp4Srgb, compressed(0x8A55, RGB)),
    (F::RgbPvrtc1Bpp2Unorm, compressed(0x8C01, RGB)),
    (F::RgbPvrtc1Bpp2Srgb, compressed(0x8A54, RGB)),
    (F::RgbaPvrtc1Bpp4Unorm, compressed(0x8C02, RGBA)),
    (F::RgbaPvrtc1Bpp4Srgb, compressed(0x8A57, RGBA)),
    (F::RgbaPvrtc1Bpp2Unorm, compressed(0x8C03, RGBA)),
    (F::RgbaPvrtc1Bpp2Srgb, compressed(0x8A56, RGBA)),
    (F::RgbaPvrtc2Bpp4Unorm, compressed(0x9138, RGBA)),
    (F::RgbaPvrtc2Bpp4Srgb, compressed(0x93F1, RGBA)),
    (F::RgbaPvrtc2Bpp2Unorm, compressed(0x9137, RGBA)),
    (F::RgbaPvrtc2Bpp2Srgb, compressed(0x93F0, RGBA)),

    // ETC1 / ATC
    (F::RgbEtc1Unorm, compressed(0x8D64, RGB)),
    (F::RgbAtcUnorm, compressed(0x8C92, RGB)),
    (F::RgbaAtcExplicitUnorm, compressed(0x8C93, RGBA)),
    (F::RgbaAtcInterpolatedUnorm, compressed(0x87EE, RGBA)),
];

/// Returns the GL triple for `format`, or `None` if it has no GL counterpart.
pub fn to_gl(format: TextureFormat) -> Option<GlFormat> {
    TABLE.iter().find(|(f, _)| *f == format).map(|(_, g)| *g)
}

/// Resolves a GL triple to a [`TextureFormat`].
///
/// Compressed formats are matched on `internal` alone and only when
/// `external` and `ty` are both 0, as the KTX container requires.
pub fn from_gl(internal: u32, external: u32, ty: u32) -> Option<TextureFormat> {
    TABLE
        .iter()
        .find(|(f, g)| {
            if f.is_compressed() {
                external == 0 && ty == 0 && g.internal == internal
            } else {
                g.internal == internal && g.external == external && g.ty == ty
            }
        })
        .map(|(f, _)| *f)
}

/// Size in bytes of one unit of `ty`, used for endianness conversion.
///
/// Compressed data (`ty == 0`) and unknown types report 1.
pub fn type_size(ty: u32) -> u32 {
    match ty {
        BYTE | UNSIGNED_BYTE => 1,
        SHORT | UNSIGNED_SHORT | HALF_FLOAT | UNSIGNED_SHORT_4_4_4_4
        | UNSIGNED_SHORT_5_5_5_1 | UNSIGNED_SHORT_5_6_5 => 2,
        INT | UNSIGNED_INT | FLOAT | UNSIGNED_INT_2_10_10_10_REV => 4,
        DOUBLE => 8,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mapped_format_round_trips() {
        for (format, gl) in TABLE {
            assert_eq!(from_gl(gl.internal, gl.external, gl.ty), Some(*format), "{format}");
        }
    }

    #[test]
    fn rgb8_triple() {
        let gl = to_gl(TextureFormat::Rgb8Unorm).unwrap();
        assert_eq!((gl.internal, gl.external, gl.ty), (0x8051, 0x1907, 0x1401));
        assert_eq!(gl.base_internal, formats::RGB);
        assert_eq!(type_size(gl.ty), 1);
    }

    #[test]
    fn integer_base_format() {
        let gl = to_gl(TextureFormat::Rgba16Uint).unwrap();
        assert_eq!(gl.external, formats::RGBA_INTEGER);
        assert_eq!(gl.base_internal, formats::RGBA);
        assert_eq!(type_size(gl.ty), 2);
    }

    #[test]
    fn astc_by_internal_format() {
        assert_eq!(from_gl(0x93B7, 0, 0), Some(TextureFormat::RgbaAstc8x8Unorm));
        assert_eq!(from_gl(0x93D7, 0, 0), Some(TextureFormat::RgbaAstc8x8Srgb));
        assert_eq!(from_gl(0x93B7, RGBA, UNSIGNED_BYTE), None);
    }

    #[test]
    fn unmapped_formats() {
        assert_eq!(to_gl(TextureFormat::Rgba64Sfloat), None);
        assert_eq!(to_gl(TextureFormat::Rg4UnormPack8), None);
        assert_eq!(from_gl(0xDEAD, RGB, UNSIGNED_BYTE), None);
    }
}
