//! KTX 1.1 (Khronos Texture) container support.
//!
//! Decodes a KTX 1.1 file into a [`CompositeImg`] plus its key-value
//! metadata, and encodes one back. Both linear and block-compressed formats
//! are carried verbatim; no pixel conversion takes place.
//!
//! # Layout
//!
//! ```text
//! [12-byte identifier]
//! [13 x u32 header: endianness .. bytes_of_key_value_data]
//! [key-value block: { u32 size, key, NUL, value, pad to 4 }*]
//! per level:
//!   [u32 image_size]
//!   per layer, per face: [slot bytes (+ cube padding)]
//!   [mip padding]
//! ```
//!
//! Uncompressed rows are stored with a 4-byte unpack alignment. Files
//! written on big-endian hosts are accepted: the header is read big endian
//! and pixel data is byte-swapped in units of `gl_type_size`.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use texel_core::{CompositeImg, TextureDesc, TextureFormat, TextureTarget};
//! use texel_io::ktx::{self, KtxOptions};
//!
//! let mut tex = CompositeImg::new();
//! let desc = TextureDesc::new(TextureFormat::Rgba8Unorm, TextureTarget::Target2D, false);
//! tex.set_linear_extent(desc, 1, 1, 1, [4, 4, 1], 4)?;
//! tex.allocate_storage()?;
//!
//! let mut kv = BTreeMap::new();
//! kv.insert("KTXorientation".to_string(), "S=r,T=d".to_string());
//!
//! let bytes = ktx::encode(&tex, &kv, &KtxOptions::default())?;
//! let (decoded, meta) = ktx::decode(&bytes, &KtxOptions::default())?;
//! assert_eq!(decoded.level_extent(0), [4, 4, 1]);
//! assert_eq!(meta["KTXorientation"], "S=r,T=d");
//! # Ok::<(), texel_io::IoError>(())
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use texel_core::gl;
use texel_core::{calc_pitch, Buffer, CompositeImg, TextureDesc, TextureFormat, TextureTarget};

use crate::{IoError, IoResult};

/// KTX 1.1 file identifier.
pub const MAGIC: [u8; 12] = [0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A];

/// Endianness marker as written by the producing host.
const ENDIAN_REF: u32 = 0x0403_0201;
/// The marker as seen when the producer had the opposite byte order.
const ENDIAN_REF_REV: u32 = 0x0102_0304;

/// Bytes in the fixed header after the identifier.
const HEADER_LEN: usize = 13 * 4;
/// Offset of the key-value block.
const KV_START: usize = MAGIC.len() + HEADER_LEN;

/// Row alignment of uncompressed pixel data (`GL_UNPACK_ALIGNMENT`).
const UNPACK_ALIGNMENT: u32 = 4;

/// Fixed KTX 1.1 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KtxHeader {
    /// Endianness marker as read little endian: `0x04030201` for little
    /// endian producers, `0x01020304` for big endian ones.
    pub endianness: u32,
    /// GL pixel type, 0 for compressed data.
    pub gl_type: u32,
    /// Byte size of one `gl_type` element, 1 for compressed data.
    pub gl_type_size: u32,
    /// GL pixel format, 0 for compressed data.
    pub gl_format: u32,
    /// GL sized internal format.
    pub gl_internal_format: u32,
    /// GL unsized base format.
    pub gl_base_internal_format: u32,
    /// Width in pixels.
    pub pixel_width: u32,
    /// Height in pixels, 0 for 1D textures.
    pub pixel_height: u32,
    /// Depth in pixels, 0 unless 3D.
    pub pixel_depth: u32,
    /// Array layer count, 0 for non-array textures.
    pub number_of_array_elements: u32,
    /// 6 for cubemaps, otherwise 1.
    pub number_of_faces: u32,
    /// Mip level count; 0 asks the loader to generate mipmaps.
    pub number_of_mipmap_levels: u32,
    /// Length of the key-value block.
    pub bytes_of_key_value_data: u32,
}

impl KtxHeader {
    fn parse<B: ByteOrder>(mut r: &[u8]) -> std::io::Result<Self> {
        Ok(Self {
            endianness: r.read_u32::<LittleEndian>()?,
            gl_type: r.read_u32::<B>()?,
            gl_type_size: r.read_u32::<B>()?,
            gl_format: r.read_u32::<B>()?,
            gl_internal_format: r.read_u32::<B>()?,
            gl_base_internal_format: r.read_u32::<B>()?,
            pixel_width: r.read_u32::<B>()?,
            pixel_height: r.read_u32::<B>()?,
            pixel_depth: r.read_u32::<B>()?,
            number_of_array_elements: r.read_u32::<B>()?,
            number_of_faces: r.read_u32::<B>()?,
            number_of_mipmap_levels: r.read_u32::<B>()?,
            bytes_of_key_value_data: r.read_u32::<B>()?,
        })
    }

    fn write_le(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        for field in [
            self.endianness,
            self.gl_type,
            self.gl_type_size,
            self.gl_format,
            self.gl_internal_format,
            self.gl_base_internal_format,
            self.pixel_width,
            self.pixel_height,
            self.pixel_depth,
            self.number_of_array_elements,
            self.number_of_faces,
            self.number_of_mipmap_levels,
            self.bytes_of_key_value_data,
        ] {
            out.write_u32::<LittleEndian>(field)?;
        }
        Ok(())
    }

    /// Texture shape implied by the header.
    pub fn target(&self) -> TextureTarget {
        if self.number_of_faces > 1 {
            if self.number_of_array_elements > 0 {
                TextureTarget::TargetCubeArray
            } else {
                TextureTarget::TargetCube
            }
        } else if self.number_of_array_elements > 0 {
            if self.pixel_height == 0 {
                TextureTarget::Target1DArray
            } else {
                TextureTarget::Target2DArray
            }
        } else if self.pixel_height == 0 {
            TextureTarget::Target1D
        } else if self.pixel_depth > 0 {
            TextureTarget::Target3D
        } else {
            TextureTarget::Target2D
        }
    }

    /// Texture format matching the GL triple, if any.
    pub fn format(&self) -> Option<TextureFormat> {
        gl::from_gl(self.gl_internal_format, self.gl_format, self.gl_type)
    }

    /// Whether the producer wrote the file big endian.
    pub fn is_big_endian(&self) -> bool {
        self.endianness == ENDIAN_REF_REV
    }

    /// Level-0 extent with absent axes reported as 1.
    pub fn extent(&self) -> [u32; 3] {
        [self.pixel_width.max(1), self.pixel_height.max(1), self.pixel_depth.max(1)]
    }
}

/// KTX codec options.
#[derive(Debug, Clone, Copy, Default)]
pub struct KtxOptions {
    /// Store rows bottom to top. Not supported; requesting it fails.
    pub bottom_first: bool,
}

impl KtxOptions {
    /// Sets [`KtxOptions::bottom_first`].
    pub fn bottom_first(mut self, bottom_first: bool) -> Self {
        self.bottom_first = bottom_first;
        self
    }

    fn check(&self) -> IoResult<()> {
        if self.bottom_first {
            return Err(IoError::UnsupportedOption("KTX bottom-first row order".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

fn check_magic(bytes: &[u8]) -> IoResult<Endian> {
    if bytes.len() < KV_START {
        return Err(IoError::format("truncated KTX header"));
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(IoError::format("not a KTX 1.1 file"));
    }
    match LittleEndian::read_u32(&bytes[MAGIC.len()..]) {
        ENDIAN_REF => Ok(Endian::Little),
        ENDIAN_REF_REV => Ok(Endian::Big),
        other => Err(IoError::Format(format!("invalid KTX endianness marker 0x{other:08X}"))),
    }
}

/// Parses the fixed header without touching key-value or pixel data.
pub fn read_info(bytes: &[u8]) -> IoResult<KtxHeader> {
    let endian = check_magic(bytes)?;
    let header = &bytes[MAGIC.len()..KV_START];
    let parsed = match endian {
        Endian::Little => KtxHeader::parse::<LittleEndian>(header),
        Endian::Big => KtxHeader::parse::<BigEndian>(header),
    };
    parsed.map_err(IoError::truncated("KTX header"))
}

/// Decodes a KTX 1.1 stream.
///
/// The returned texture owns one buffer holding the stream's pixel data;
/// every slot is bound into it.
///
/// # Errors
///
/// - [`IoError::UnsupportedOption`] if `bottom_first` is requested
/// - [`IoError::Format`] on a bad identifier, endianness marker or a
///   truncated stream
/// - [`IoError::UnsupportedFormat`] if the GL triple has no texture format
pub fn decode(bytes: &[u8], options: &KtxOptions) -> IoResult<(CompositeImg, BTreeMap<String, String>)> {
    options.check()?;
    let endian = check_magic(bytes)?;
    // pixel data must end up in host order
    let swap = (endian == Endian::Big) != cfg!(target_endian = "big");
    match endian {
        Endian::Little => decode_with::<LittleEndian>(bytes, swap),
        Endian::Big => decode_with::<BigEndian>(bytes, swap),
    }
}

fn decode_with<B: ByteOrder>(bytes: &[u8], swap: bool) -> IoResult<(CompositeImg, BTreeMap<String, String>)> {
    let header = KtxHeader::parse::<B>(&bytes[MAGIC.len()..KV_START]).map_err(IoError::truncated("KTX header"))?;

    let format = header.format().ok_or_else(|| {
        IoError::UnsupportedFormat(format!(
            "GL internal format 0x{:04X}, format 0x{:04X}, type 0x{:04X}",
            header.gl_internal_format, header.gl_format, header.gl_type
        ))
    })?;
    let target = header.target();
    let desc = TextureDesc::new(format, target, header.number_of_mipmap_levels != 1);

    let kv_end = KV_START
        .checked_add(header.bytes_of_key_value_data as usize)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| IoError::format("truncated KTX key-value data"))?;
    let key_values = parse_key_values::<B>(&bytes[KV_START..kv_end])?;

    let levels = header.number_of_mipmap_levels.max(1);
    let layers = header.number_of_array_elements.max(1);
    let faces = header.number_of_faces.max(1);
    let extent = header.extent();
    let available = bytes.len() - kv_end;
    let slot_count = (layers as usize)
        .checked_mul(faces as usize)
        .and_then(|n| n.checked_mul(levels as usize))
        .filter(|&n| levels <= 32 && n <= available)
        .ok_or_else(|| {
            IoError::Format(format!(
                "KTX header describes {levels} levels, {layers} layers and {faces} faces, more than the stream holds"
            ))
        })?;

    let mut image = CompositeImg::new();
    if format.is_compressed() {
        image.set_block_extent(desc, levels, layers, faces, extent)?;
    } else {
        let alignment = UNPACK_ALIGNMENT.max(format.required_alignment());
        image.set_linear_extent(desc, levels, layers, faces, extent, alignment)?;
    }

    // sizes saturate, so an impossible extent fails here instead of overflowing below
    let needed = (0..levels).fold(0usize, |total, level| {
        total.saturating_add(4).saturating_add(image.level_size(level))
    });
    if needed > available {
        return Err(IoError::Format(format!(
            "KTX header describes a {}x{}x{} {format} texture needing {needed} bytes, the stream holds {available}",
            extent[0], extent[1], extent[2]
        )));
    }

    let mut data = bytes[kv_end..].to_vec();
    let cube_faces = target == TextureTarget::TargetCube;
    let swap_unit = if swap { header.gl_type_size as usize } else { 1 };

    let mut bindings = Vec::with_capacity(slot_count);
    let mut offset = 0usize;
    for level in 0..levels {
        let size_field = data
            .get(offset..offset + 4)
            .ok_or_else(|| IoError::Format(format!("truncated KTX image size of level {level}")))?;
        let declared = B::read_u32(size_field) as usize;
        offset += 4;

        let slot_size = image.slot_size(level);
        let expected = if cube_faces { slot_size } else { image.level_size(level) };
        if declared != expected {
            tracing::warn!(level, declared, expected, "KTX image size disagrees with texture layout");
        }

        for layer in 0..layers {
            for face in 0..faces {
                let end = offset + slot_size;
                let slot = data
                    .get_mut(offset..end)
                    .ok_or_else(|| IoError::Format(format!("truncated KTX pixel data in level {level}")))?;
                if matches!(swap_unit, 2 | 4 | 8) {
                    slot.chunks_exact_mut(swap_unit).for_each(<[u8]>::reverse);
                }
                bindings.push((offset, level, layer, face));
                offset = end;
                if cube_faces {
                    offset = align4(offset);
                }
            }
        }
        offset = align4(offset);
    }
    if offset < data.len() {
        tracing::warn!(trailing = data.len() - offset, "trailing bytes after last KTX level");
    }
    data.truncate(offset.min(data.len()));

    let buffer = image.add_buffer(Buffer::from_vec(data));
    for (offset, level, layer, face) in bindings {
        image.set_data(buffer, offset, level, layer, face)?;
    }

    tracing::debug!(
        width = extent[0],
        height = extent[1],
        depth = extent[2],
        %format,
        ?target,
        levels,
        layers,
        faces,
        swapped = swap,
        "decoded KTX texture"
    );
    Ok((image, key_values))
}

fn parse_key_values<B: ByteOrder>(mut block: &[u8]) -> IoResult<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    while block.len() >= 4 {
        let size = block.read_u32::<B>().map_err(IoError::truncated("KTX key-value size"))? as usize;
        let entry = block
            .get(..size)
            .ok_or_else(|| IoError::format("truncated KTX key-value entry"))?;

        let (key, value) = match entry.iter().position(|&b| b == 0) {
            Some(nul) => (&entry[..nul], &entry[nul + 1..]),
            None => (entry, &[][..]),
        };
        let value = match value.split_last() {
            Some((0, rest)) => rest,
            _ => value,
        };
        entries.insert(
            String::from_utf8_lossy(key).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        );

        let padded = align4(size).min(block.len());
        block = &block[padded..];
    }
    if !block.is_empty() {
        tracing::warn!(bytes = block.len(), "ignoring partial KTX key-value entry");
    }
    Ok(entries)
}

/// Encodes a texture and its metadata as a KTX 1.1 stream.
///
/// Every slot must be bound. Uncompressed rows are repacked to a 4-byte
/// alignment when the texture uses a different pitch.
///
/// # Errors
///
/// - [`IoError::UnsupportedOption`] if `bottom_first` is requested
/// - [`IoError::EncodeError`] if the texture is empty, has unbound slots, or
///   its layer, face or extent counts cannot be described by a header for
///   its target
/// - [`IoError::UnsupportedFormat`] if the format has no GL equivalent
pub fn encode(
    image: &CompositeImg,
    key_values: &BTreeMap<String, String>,
    options: &KtxOptions,
) -> IoResult<Vec<u8>> {
    options.check()?;

    let desc = image.desc();
    if desc.format.is_undefined() || !image.is_complete() {
        return Err(IoError::EncodeError("texture has unbound slots".into()));
    }
    let gl_desc = gl::to_gl(desc.format)
        .ok_or_else(|| IoError::UnsupportedFormat(format!("{} has no GL equivalent", desc.format)))?;

    let target = desc.target;
    let compressed = image.is_compressed();
    let [width, height, depth] = image.level_extent(0);
    check_target_counts(image)?;

    let kv_len: usize = key_values.iter().map(|(k, v)| 4 + align4(k.len() + 1 + v.len())).sum();
    let face_sizes: Vec<usize> = (0..image.levels()).map(|level| face_size(image, level)).collect();
    let slots_per_level = image.layers() as usize * image.faces() as usize;
    let total = KV_START + kv_len + face_sizes.iter().map(|size| 4 + slots_per_level * align4(*size)).sum::<usize>();

    let header = KtxHeader {
        endianness: ENDIAN_REF,
        gl_type: gl_desc.ty,
        gl_type_size: if compressed { 1 } else { gl::type_size(gl_desc.ty) },
        gl_format: gl_desc.external,
        gl_internal_format: gl_desc.internal,
        gl_base_internal_format: gl_desc.base_internal,
        pixel_width: width,
        pixel_height: if target.is_1d() { 0 } else { height },
        pixel_depth: if target.is_3d() { depth } else { 0 },
        number_of_array_elements: if target.is_array() { image.layers() } else { 0 },
        number_of_faces: if target.is_cube() { 6 } else { 1 },
        number_of_mipmap_levels: if desc.mipmap && image.levels() == 1 { 0 } else { image.levels() },
        bytes_of_key_value_data: kv_len as u32,
    };

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&MAGIC);
    header.write_le(&mut out)?;

    for (key, value) in key_values {
        let size = key.len() + 1 + value.len();
        out.write_u32::<LittleEndian>(size as u32)?;
        out.extend_from_slice(key.as_bytes());
        out.push(0);
        out.extend_from_slice(value.as_bytes());
        pad4(&mut out);
    }

    let cube_faces = target == TextureTarget::TargetCube;
    for (level, &size) in (0..image.levels()).zip(&face_sizes) {
        let image_size = if cube_faces { size } else { size * slots_per_level };
        out.write_u32::<LittleEndian>(image_size as u32)?;

        for layer in 0..image.layers() {
            for face in 0..image.faces() {
                if compressed {
                    let view = image.block_view(level, layer, face);
                    out.extend_from_slice(view.bytes());
                } else {
                    write_linear_slot(&mut out, image, level, layer, face);
                }
                if cube_faces {
                    pad4(&mut out);
                }
            }
        }
        pad4(&mut out);
    }

    tracing::debug!(
        width,
        height,
        depth,
        format = %desc.format,
        levels = image.levels(),
        layers = image.layers(),
        faces = image.faces(),
        bytes = out.len(),
        "encoded KTX texture"
    );
    Ok(out)
}

/// The header derives layer and face counts and the extent from the target;
/// the slots actually written must agree with it.
fn check_target_counts(image: &CompositeImg) -> IoResult<()> {
    let target = image.desc().target;
    let [_, height, depth] = image.level_extent(0);
    let faces = if target.is_cube() { 6 } else { 1 };

    let problem = if image.faces() != faces {
        format!("{} faces, the header stores {faces}", image.faces())
    } else if !target.is_array() && image.layers() != 1 {
        format!("{} layers without an array target", image.layers())
    } else if target.is_1d() && height != 1 {
        format!("height {height}")
    } else if !target.is_3d() && depth != 1 {
        format!("depth {depth}")
    } else {
        return Ok(());
    };
    Err(IoError::EncodeError(format!("{target:?} texture with {problem}")))
}

/// Size of one face at `level` as stored in the file.
fn face_size(image: &CompositeImg, level: u32) -> usize {
    if image.is_compressed() {
        return image.slot_size(level);
    }
    let [w, h, d] = image.level_extent(level);
    let layout = image.layout().unwrap_or_default();
    calc_pitch(w, layout.channels, layout.bpc, UNPACK_ALIGNMENT) * h as usize * d as usize
}

fn write_linear_slot(out: &mut Vec<u8>, image: &CompositeImg, level: u32, layer: u32, face: u32) {
    let view = image.view(level, layer, face);
    let pitch = calc_pitch(view.width(), view.channels(), view.bpc(), UNPACK_ALIGNMENT);
    for z in 0..view.depth() {
        for y in 0..view.height() {
            let row = view.row(y, z);
            out.extend_from_slice(row);
            out.resize(out.len() + pitch - row.len(), 0);
        }
    }
}

#[inline]
fn align4(n: usize) -> usize {
    n.next_multiple_of(4)
}

fn pad4(out: &mut Vec<u8>) {
    out.resize(align4(out.len()), 0);
}

/// Reads and decodes a KTX file.
pub fn read<P: AsRef<Path>>(path: P, options: &KtxOptions) -> IoResult<(CompositeImg, BTreeMap<String, String>)> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes, options)
}

/// Encodes and writes a KTX file.
pub fn write<P: AsRef<Path>>(
    path: P,
    image: &CompositeImg,
    key_values: &BTreeMap<String, String>,
    options: &KtxOptions,
) -> IoResult<()> {
    let bytes = encode(image, key_values, options)?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}
