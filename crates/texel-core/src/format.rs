//! Texture formats, targets and their static descriptor tables.
//!
//! Every pixel layout the crate understands is a [`TextureFormat`]. Linear
//! formats are described by a [`PixelDesc`] (component count, bits per
//! component, signedness, float-ness), block-compressed formats by a
//! [`BlockDesc`] (block footprint and byte size).
//!
//! # Usage
//!
//! ```rust
//! use texel_core::format::{TextureFormat, TextureTarget};
//!
//! let astc = TextureFormat::RgbaAstc8x8Unorm;
//! assert!(astc.is_compressed());
//! let block = astc.block_desc().unwrap();
//! assert_eq!((block.block_width, block.block_height, block.block_bytes), (8, 8, 16));
//!
//! let rgb = TextureFormat::Rgb8Unorm;
//! assert_eq!(rgb.storage_layout(), Some((3, 8)));
//! assert!(TextureTarget::Target1DArray.is_1d());
//! ```
//!
//! # Used By
//!
//! - [`crate::composite::CompositeImg`] - Chooses linear or block views
//! - [`crate::gl`] - GL format translation
//! - `texel-io` - KTX header decoding

use std::fmt;

/// Dimensionality and arrangement of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TextureTarget {
    /// One-dimensional texture.
    Target1D = 0,
    /// Array of one-dimensional textures.
    Target1DArray,
    /// Two-dimensional texture.
    #[default]
    Target2D,
    /// Array of two-dimensional textures.
    Target2DArray,
    /// Volume texture.
    Target3D,
    /// Rectangle texture (no mipmaps, unnormalized coordinates).
    TargetRect,
    /// Array of rectangle textures.
    TargetRectArray,
    /// Cubemap with six faces.
    TargetCube,
    /// Array of cubemaps.
    TargetCubeArray,
}

impl TextureTarget {
    /// Height never shrinks across mip levels for 1D targets.
    #[inline]
    pub const fn is_1d(self) -> bool {
        matches!(self, Self::Target1D | Self::Target1DArray)
    }

    /// Only 3D targets shrink depth across mip levels.
    #[inline]
    pub const fn is_3d(self) -> bool {
        matches!(self, Self::Target3D)
    }

    /// Returns `true` for targets whose layers form an array.
    #[inline]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::Target1DArray | Self::Target2DArray | Self::TargetCubeArray | Self::TargetRectArray
        )
    }

    /// Returns `true` for cubemap targets.
    #[inline]
    pub const fn is_cube(self) -> bool {
        matches!(self, Self::TargetCube | Self::TargetCubeArray)
    }

    /// Returns `true` for rectangle targets.
    #[inline]
    pub const fn is_rect(self) -> bool {
        matches!(self, Self::TargetRect | Self::TargetRectArray)
    }
}

macro_rules! texture_formats {
    ($($name:ident),+ $(,)?) => {
        /// Pixel format of a texture.
        ///
        /// Variant names read `<channels><bits>?<encoding>`; packed formats
        /// carry their packing width (`Pack16`), compressed formats their
        /// codec family (`Dxt1`, `Etc2`, `Astc8x8`, ...). Discriminants are
        /// stable and ordered: every variant from [`TextureFormat::RgbDxt1Unorm`]
        /// onwards is block-compressed.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(u16)]
        pub enum TextureFormat {
            /// No format; views over it are empty.
            #[default]
            Undefined = 0,
            $($name),+
        }

        impl TextureFormat {
            /// Every defined format, in discriminant order.
            pub const ALL: &'static [TextureFormat] = &[$(TextureFormat::$name),+];
        }
    };
}

texture_formats! {
    Rg4UnormPack8,
    Rgba4UnormPack16,
    R5g6b5UnormPack16,
    Rgb5a1UnormPack16,

    R8Unorm, R8Snorm, R8Uint, R8Sint, R8Srgb,
    Rg8Unorm, Rg8Snorm, Rg8Uint, Rg8Sint, Rg8Srgb,
    Rgb8Unorm, Rgb8Snorm, Rgb8Uint, Rgb8Sint, Rgb8Srgb,
    Rgba8Unorm, Rgba8Snorm, Rgba8Uint, Rgba8Sint, Rgba8Srgb,

    Rgb10a2Unorm, Rgb10a2Snorm, Rgb10a2Uint, Rgb10a2Sint,

    R16Unorm, R16Snorm, R16Uint, R16Sint, R16Sfloat,
    Rg16Unorm, Rg16Snorm, Rg16Uint, Rg16Sint, Rg16Sfloat,
    Rgb16Unorm, Rgb16Snorm, Rgb16Uint, Rgb16Sint, Rgb16Sfloat,
    Rgba16Unorm, Rgba16Snorm, Rgba16Uint, Rgba16Sint, Rgba16Sfloat,

    R32Uint, R32Sint, R32Sfloat,
    Rg32Uint, Rg32Sint, Rg32Sfloat,
    Rgb32Uint, Rgb32Sint, Rgb32Sfloat,
    Rgba32Uint, Rgba32Sint, Rgba32Sfloat,

    R64Uint, R64Sint, R64Sfloat,
    Rg64Uint, Rg64Sint, Rg64Sfloat,
    Rgb64Uint, Rgb64Sint, Rgb64Sfloat,
    Rgba64Uint, Rgba64Sint, Rgba64Sfloat,

    RgbDxt1Unorm, RgbDxt1Srgb,
    RgbaDxt1Unorm, RgbaDxt1Srgb,
    RgbaDxt3Unorm, RgbaDxt3Srgb,
    RgbaDxt5Unorm, RgbaDxt5Srgb,
    RAti1nUnorm, RAti1nSnorm,
    RgAti2nUnorm, RgAti2nSnorm,
    RgbBpUfloat, RgbBpSfloat,
    RgbaBpUnorm, RgbaBpSrgb,

    RgbEtc2Unorm, RgbEtc2Srgb,
    RgbA1Etc2Unorm, RgbA1Etc2Srgb,
    RgbaEtc2Unorm, RgbaEtc2Srgb,
    REacUnorm, REacSnorm,
    RgEacUnorm, RgEacSnorm,

    RgbaAstc4x4Unorm, RgbaAstc4x4Srgb,
    RgbaAstc5x4Unorm, RgbaAstc5x4Srgb,
    RgbaAstc5x5Unorm, RgbaAstc5x5Srgb,
    RgbaAstc6x5Unorm, RgbaAstc6x5Srgb,
    RgbaAstc6x6Unorm, RgbaAstc6x6Srgb,
    RgbaAstc8x5Unorm, RgbaAstc8x5Srgb,
    RgbaAstc8x6Unorm, RgbaAstc8x6Srgb,
    RgbaAstc8x8Unorm, RgbaAstc8x8Srgb,
    RgbaAstc10x5Unorm, RgbaAstc10x5Srgb,
    RgbaAstc10x6Unorm, RgbaAstc10x6Srgb,
    RgbaAstc10x8Unorm, RgbaAstc10x8Srgb,
    RgbaAstc10x10Unorm, RgbaAstc10x10Srgb,
    RgbaAstc12x10Unorm, RgbaAstc12x10Srgb,
    RgbaAstc12x12Unorm, RgbaAstc12x12Srgb,

    RgbPvrtc1Bpp4Unorm, RgbPvrtc1Bpp4Srgb,
    RgbPvrtc1Bpp2Unorm, RgbPvrtc1Bpp2Srgb,
    RgbaPvrtc1Bpp4Unorm, RgbaPvrtc1Bpp4Srgb,
    RgbaPvrtc1Bpp2Unorm, RgbaPvrtc1Bpp2Srgb,
    RgbaPvrtc2Bpp4Unorm, RgbaPvrtc2Bpp4Srgb,
    RgbaPvrtc2Bpp2Unorm, RgbaPvrtc2Bpp2Srgb,

    RgbEtc1Unorm,
    RgbAtcUnorm,
    RgbaAtcExplicitUnorm,
    RgbaAtcInterpolatedUnorm,
}

/// Component layout of a linear (uncompressed) format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDesc {
    /// Number of components (1 to 4).
    pub components: u32,
    /// Bits of each component in R, G, B, A order; unused entries are 0.
    pub bits: [u32; 4],
    /// Signed integer or float storage.
    pub signed: bool,
    /// Floating-point storage.
    pub float: bool,
}

impl PixelDesc {
    const fn new(components: u32, bits: [u32; 4], signed: bool, float: bool) -> Self {
        Self { components, bits, signed, float }
    }

    const fn uniform(components: u32, bits: u32, signed: bool, float: bool) -> Self {
        let mut all = [0; 4];
        let mut i = 0;
        while i < components as usize {
            all[i] = bits;
            i += 1;
        }
        Self::new(components, all, signed, float)
    }

    /// Total bits of one pixel.
    pub const fn bits_per_pixel(&self) -> u32 {
        self.bits[0] + self.bits[1] + self.bits[2] + self.bits[3]
    }

    /// Whether every component is a whole number of bytes of the same width.
    pub const fn is_byte_uniform(&self) -> bool {
        let first = self.bits[0];
        if first < 8 || first % 8 != 0 {
            return false;
        }
        let mut i = 1;
        while i < self.components as usize {
            if self.bits[i] != first {
                return false;
            }
            i += 1;
        }
        true
    }

    /// `(channels, bits_per_channel)` used to lay the format out in a view.
    ///
    /// Packed formats whose components are not whole, equal bytes collapse
    /// into a single channel spanning the whole pixel.
    pub const fn storage_layout(&self) -> (u32, u32) {
        if self.is_byte_uniform() {
            (self.components, self.bits[0])
        } else {
            (1, self.bits_per_pixel())
        }
    }

    /// Minimum row alignment in bytes: one component, or one packed pixel.
    pub const fn required_alignment(&self) -> u32 {
        if self.is_byte_uniform() {
            self.bits[0] / 8
        } else {
            self.bits_per_pixel().div_ceil(8)
        }
    }
}

/// Footprint of a block-compressed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDesc {
    /// Block width in pixels.
    pub block_width: u32,
    /// Block height in pixels.
    pub block_height: u32,
    /// Bytes per block.
    pub block_bytes: u32,
}

impl BlockDesc {
    const fn new(block_width: u32, block_height: u32, block_bytes: u32) -> Self {
        Self { block_width, block_height, block_bytes }
    }
}

impl TextureFormat {
    /// Returns `true` for [`TextureFormat::Undefined`].
    #[inline]
    pub fn is_undefined(self) -> bool {
        self == Self::Undefined
    }

    /// Whether this format stores fixed-size compressed blocks.
    #[inline]
    pub fn is_compressed(self) -> bool {
        self >= Self::RgbDxt1Unorm
    }

    /// Descriptor of a linear format, `None` for compressed or undefined formats.
    pub fn pixel_desc(self) -> Option<PixelDesc> {
        use TextureFormat::*;

        let desc = match self {
            Rg4UnormPack8 => PixelDesc::new(2, [4, 4, 0, 0], false, false),
            Rgba4UnormPack16 => PixelDesc::new(4, [4, 4, 4, 4], false, false),
            R5g6b5UnormPack16 => PixelDesc::new(3, [5, 6, 5, 0], false, false),
            Rgb5a1UnormPack16 => PixelDesc::new(4, [5, 5, 5, 1], false, false),
            Rgb10a2Unorm | Rgb10a2Uint => PixelDesc::new(4, [10, 10, 10, 2], false, false),
            Rgb10a2Snorm | Rgb10a2Sint => PixelDesc::new(4, [10, 10, 10, 2], true, false),
            _ => {
                let (components, bits, signed, float) = self.uniform_layout()?;
                PixelDesc::uniform(components, bits, signed, float)
            }
        };
        Some(desc)
    }

    fn uniform_layout(self) -> Option<(u32, u32, bool, bool)> {
        use TextureFormat::*;

        let components = match self {
            R8Unorm | R8Snorm | R8Uint | R8Sint | R8Srgb | R16Unorm | R16Snorm | R16Uint
            | R16Sint | R16Sfloat | R32Uint | R32Sint | R32Sfloat | R64Uint | R64Sint
            | R64Sfloat => 1,
            Rg8Unorm | Rg8Snorm | Rg8Uint | Rg8Sint | Rg8Srgb | Rg16Unorm | Rg16Snorm
            | Rg16Uint | Rg16Sint | Rg16Sfloat | Rg32Uint | Rg32Sint | Rg32Sfloat | Rg64Uint
            | Rg64Sint | Rg64Sfloat => 2,
            Rgb8Unorm | Rgb8Snorm | Rgb8Uint | Rgb8Sint | Rgb8Srgb | Rgb16Unorm | Rgb16Snorm
            | Rgb16Uint | Rgb16Sint | Rgb16Sfloat | Rgb32Uint | Rgb32Sint | Rgb32Sfloat
            | Rgb64Uint | Rgb64Sint | Rgb64Sfloat => 3,
            Rgba8Unorm | Rgba8Snorm | Rgba8Uint | Rgba8Sint | Rgba8Srgb | Rgba16Unorm
            | Rgba16Snorm | Rgba16Uint | Rgba16Sint | Rgba16Sfloat | Rgba32Uint | Rgba32Sint
            | Rgba32Sfloat | Rgba64Uint | Rgba64Sint | Rgba64Sfloat => 4,
            _ => return None,
        };

        let bits = match self {
            R8Unorm | R8Snorm | R8Uint | R8Sint | R8Srgb | Rg8Unorm | Rg8Snorm | Rg8Uint
            | Rg8Sint | Rg8Srgb | Rgb8Unorm | Rgb8Snorm | Rgb8Uint | Rgb8Sint | Rgb8Srgb
            | Rgba8Unorm | Rgba8Snorm | Rgba8Uint | Rgba8Sint | Rgba8Srgb => 8,
            R16Unorm | R16Snorm | R16Uint | R16Sint | R16Sfloat | Rg16Unorm | Rg16Snorm
            | Rg16Uint | Rg16Sint | Rg16Sfloat | Rgb16Unorm | Rgb16Snorm | Rgb16Uint
            | Rgb16Sint | Rgb16Sfloat | Rgba16Unorm | Rgba16Snorm | Rgba16Uint | Rgba16Sint
            | Rgba16Sfloat => 16,
            R32Uint | R32Sint | R32Sfloat | Rg32Uint | Rg32Sint | Rg32Sfloat | Rgb32Uint
            | Rgb32Sint | Rgb32Sfloat | Rgba32Uint | Rgba32Sint | Rgba32Sfloat => 32,
            _ => 64,
        };

        let float = matches!(
            self,
            R16Sfloat | Rg16Sfloat | Rgb16Sfloat | Rgba16Sfloat | R32Sfloat | Rg32Sfloat
                | Rgb32Sfloat | Rgba32Sfloat | R64Sfloat | Rg64Sfloat | Rgb64Sfloat | Rgba64Sfloat
        );
        let signed = float
            || matches!(
                self,
                R8Snorm | R8Sint | Rg8Snorm | Rg8Sint | Rgb8Snorm | Rgb8Sint | Rgba8Snorm
                    | Rgba8Sint | R16Snorm | R16Sint | Rg16Snorm | Rg16Sint | Rgb16Snorm
                    | Rgb16Sint | Rgba16Snorm | Rgba16Sint | R32Sint | Rg32Sint | Rgb32Sint
                    | Rgba32Sint | R64Sint | Rg64Sint | Rgb64Sint | Rgba64Sint
            );

        Some((components, bits, signed, float))
    }

    /// Descriptor of a block-compressed format, `None` for linear formats.
    pub fn block_desc(self) -> Option<BlockDesc> {
        use TextureFormat::*;

        let desc = match self {
            RgbDxt1Unorm | RgbDxt1Srgb | RgbaDxt1Unorm | RgbaDxt1Srgb | RAti1nUnorm
            | RAti1nSnorm => BlockDesc::new(4, 4, 8),
            RgbaDxt3Unorm | RgbaDxt3Srgb | RgbaDxt5Unorm | RgbaDxt5Srgb | RgAti2nUnorm
            | RgAti2nSnorm | RgbBpUfloat | RgbBpSfloat | RgbaBpUnorm | RgbaBpSrgb => {
                BlockDesc::new(4, 4, 16)
            }

            RgbEtc2Unorm | RgbEtc2Srgb | RgbA1Etc2Unorm | RgbA1Etc2Srgb | REacUnorm
            | REacSnorm => BlockDesc::new(4, 4, 8),
            RgbaEtc2Unorm | RgbaEtc2Srgb | RgEacUnorm | RgEacSnorm => BlockDesc::new(4, 4, 16),

            RgbaAstc4x4Unorm | RgbaAstc4x4Srgb => BlockDesc::new(4, 4, 16),
            RgbaAstc5x4Unorm | RgbaAstc5x4Srgb => BlockDesc::new(5, 4, 16),
            RgbaAstc5x5Unorm | RgbaAstc5x5Srgb => BlockDesc::new(5, 5, 16),
            RgbaAstc6x5Unorm | RgbaAstc6x5Srgb => BlockDesc::new(6, 5, 16),
            RgbaAstc6x6Unorm | RgbaAstc6x6Srgb => BlockDesc::new(6, 6, 16),
            RgbaAstc8x5Unorm | RgbaAstc8x5Srgb => BlockDesc::new(8, 5, 16),
            RgbaAstc8x6Unorm | RgbaAstc8x6Srgb => BlockDesc::new(8, 6, 16),
            RgbaAstc8x8Unorm | RgbaAstc8x8Srgb => BlockDesc::new(8, 8, 16),
            RgbaAstc10x5Unorm | RgbaAstc10x5Srgb => BlockDesc::new(10, 5, 16),
            RgbaAstc10x6Unorm | RgbaAstc10x6Srgb => BlockDesc::new(10, 6, 16),
            RgbaAstc10x8Unorm | RgbaAstc10x8Srgb => BlockDesc::new(10, 8, 16),
            RgbaAstc10x10Unorm | RgbaAstc10x10Srgb => BlockDesc::new(10, 10, 16),
            RgbaAstc12x10Unorm | RgbaAstc12x10Srgb => BlockDesc::new(12, 10, 16),
            RgbaAstc12x12Unorm | RgbaAstc12x12Srgb => BlockDesc::new(12, 12, 16),

            RgbPvrtc1Bpp4Unorm | RgbPvrtc1Bpp4Srgb | RgbaPvrtc1Bpp4Unorm | RgbaPvrtc1Bpp4Srgb => {
                BlockDesc::new(8, 8, 32)
            }
            RgbPvrtc1Bpp2Unorm | RgbPvrtc1Bpp2Srgb | RgbaPvrtc1Bpp2Unorm | RgbaPvrtc1Bpp2Srgb => {
                BlockDesc::new(16, 8, 32)
            }
            RgbaPvrtc2Bpp4Unorm | RgbaPvrtc2Bpp4Srgb => BlockDesc::new(4, 4, 8),
            RgbaPvrtc2Bpp2Unorm | RgbaPvrtc2Bpp2Srgb => BlockDesc::new(8, 4, 8),

            RgbEtc1Unorm | RgbAtcUnorm => BlockDesc::new(4, 4, 8),
            RgbaAtcExplicitUnorm | RgbaAtcInterpolatedUnorm => BlockDesc::new(4, 4, 16),

            _ => return None,
        };
        Some(desc)
    }

    /// `(channels, bits_per_channel)` of a linear format.
    ///
    /// See [`PixelDesc::storage_layout`].
    #[inline]
    pub fn storage_layout(self) -> Option<(u32, u32)> {
        self.pixel_desc().map(|d| d.storage_layout())
    }

    /// Minimum row alignment in bytes.
    ///
    /// Block formats report their block size; undefined reports 1.
    pub fn required_alignment(self) -> u32 {
        if let Some(desc) = self.pixel_desc() {
            desc.required_alignment()
        } else if let Some(desc) = self.block_desc() {
            desc.block_bytes
        } else {
            1
        }
    }

    /// Finds the linear format with the given storage layout.
    ///
    /// Only byte-uniform layouts map back. Normalized variants are preferred
    /// over integer ones, and sRGB variants are never chosen.
    pub fn from_layout(channels: u32, bits: u32, signed: bool, float: bool) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| {
            f.pixel_desc().is_some_and(|d| {
                d.is_byte_uniform()
                    && d.components == channels
                    && d.bits[0] == bits
                    && d.signed == signed
                    && d.float == float
            })
        })
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Format, target and mipmap flag of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureDesc {
    /// Pixel format.
    pub format: TextureFormat,
    /// Target shape.
    pub target: TextureTarget,
    /// Whether the texture carries (or expects) a mip chain.
    pub mipmap: bool,
}

impl TextureDesc {
    /// Creates a new descriptor.
    pub const fn new(format: TextureFormat, target: TextureTarget, mipmap: bool) -> Self {
        Self { format, target, mipmap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_range_covers_all_block_formats() {
        for &format in TextureFormat::ALL {
            assert_eq!(format.is_compressed(), format.block_desc().is_some(), "{format}");
            assert_eq!(!format.is_compressed(), format.pixel_desc().is_some(), "{format}");
        }
        assert!(!TextureFormat::Undefined.is_compressed());
        assert!(TextureFormat::Undefined.pixel_desc().is_none());
    }

    #[test]
    fn packed_formats() {
        let rgba4 = TextureFormat::Rgba4UnormPack16.pixel_desc().unwrap();
        assert_eq!(rgba4.components, 4);
        assert_eq!(rgba4.storage_layout(), (1, 16));
        assert_eq!(rgba4.required_alignment(), 2);

        let rgb565 = TextureFormat::R5g6b5UnormPack16.pixel_desc().unwrap();
        assert_eq!(rgb565.components, 3);
        assert_eq!(rgb565.storage_layout(), (1, 16));

        let rgb10a2 = TextureFormat::Rgb10a2Unorm.pixel_desc().unwrap();
        assert_eq!(rgb10a2.storage_layout(), (1, 32));
        assert_eq!(rgb10a2.required_alignment(), 4);

        let rg4 = TextureFormat::Rg4UnormPack8.pixel_desc().unwrap();
        assert_eq!(rg4.storage_layout(), (1, 8));
        assert_eq!(rg4.required_alignment(), 1);
    }

    #[test]
    fn uniform_formats() {
        let half = TextureFormat::Rgba16Sfloat.pixel_desc().unwrap();
        assert_eq!(half.storage_layout(), (4, 16));
        assert!(half.float && half.signed);
        assert_eq!(half.required_alignment(), 2);

        let r32 = TextureFormat::R32Sint.pixel_desc().unwrap();
        assert!(r32.signed && !r32.float);
        assert_eq!(r32.required_alignment(), 4);

        assert_eq!(TextureFormat::Rgba64Sfloat.required_alignment(), 8);
        assert_eq!(TextureFormat::Rgb8Srgb.storage_layout(), Some((3, 8)));
    }

    #[test]
    fn block_footprints() {
        let bc1 = TextureFormat::RgbDxt1Unorm.block_desc().unwrap();
        assert_eq!(bc1, BlockDesc { block_width: 4, block_height: 4, block_bytes: 8 });
        let astc = TextureFormat::RgbaAstc12x10Srgb.block_desc().unwrap();
        assert_eq!((astc.block_width, astc.block_height), (12, 10));
        let pvrtc = TextureFormat::RgbaPvrtc1Bpp2Unorm.block_desc().unwrap();
        assert_eq!(pvrtc.block_bytes, 32);
    }

    #[test]
    fn layout_lookup() {
        assert_eq!(TextureFormat::from_layout(3, 8, false, false), Some(TextureFormat::Rgb8Unorm));
        assert_eq!(TextureFormat::from_layout(1, 32, true, true), Some(TextureFormat::R32Sfloat));
        assert_eq!(TextureFormat::from_layout(4, 16, false, false), Some(TextureFormat::Rgba16Unorm));
        assert_eq!(TextureFormat::from_layout(5, 8, false, false), None);
    }

    #[test]
    fn target_predicates() {
        assert!(TextureTarget::Target1D.is_1d());
        assert!(!TextureTarget::Target2D.is_1d());
        assert!(TextureTarget::Target3D.is_3d());
        assert!(TextureTarget::TargetCubeArray.is_cube());
        assert!(TextureTarget::TargetCubeArray.is_array());
        assert!(!TextureTarget::TargetCube.is_array());
        assert!(TextureTarget::TargetRect.is_rect());
    }
}
