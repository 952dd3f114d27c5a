//! KTX container round trips through the file system.

use std::collections::BTreeMap;

use texel_core::gl::{formats, types};
use texel_core::{BlockDesc, CompositeImg, TextureDesc, TextureFormat, TextureTarget};
use texel_io::ktx::{self, KtxOptions};
use texel_io::{Format, IoError};

fn linear_texture(format: TextureFormat, target: TextureTarget, levels: u32, layers: u32, faces: u32, extent: [u32; 3]) -> CompositeImg {
    let mut tex = CompositeImg::new();
    let desc = TextureDesc::new(format, target, levels > 1);
    let alignment = 4.max(format.required_alignment());
    tex.set_linear_extent(desc, levels, layers, faces, extent, alignment).unwrap();
    tex.allocate_storage().unwrap();
    tex
}

#[test]
fn rgb_array_round_trip_on_disk() {
    let mut tex = linear_texture(TextureFormat::Rgb8Unorm, TextureTarget::Target2DArray, 1, 2, 1, [980, 240, 1]);
    tex.view_mut(0, 0, 0).set(262, 43, 0, 0, 255u8);

    let mut kv = BTreeMap::new();
    kv.insert("KTXorientation".to_string(), "S=r,T=d,R=i".to_string());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("array.ktx");
    texel_io::write_texture(&path, &tex, &kv).unwrap();
    assert_eq!(Format::detect(&path).unwrap(), Format::Ktx);

    let (back, meta) = texel_io::read_texture(&path).unwrap();
    assert_eq!(back.desc().format, TextureFormat::Rgb8Unorm);
    assert_eq!(back.desc().target, TextureTarget::Target2DArray);
    assert_eq!((back.levels(), back.layers(), back.faces()), (1, 2, 1));
    assert_eq!(back.level_extent(0), [980, 240, 1]);
    assert_eq!(back.view(0, 0, 0).at::<u8>(262, 43, 0, 0), 255);
    assert_eq!(back.view(0, 1, 0).at::<u8>(262, 43, 0, 0), 0);

    assert_eq!(meta.len(), 1);
    assert_eq!(meta["KTXorientation"], "S=r,T=d,R=i");
}

#[test]
fn header_describes_the_texture() {
    let tex = linear_texture(TextureFormat::Rgb8Unorm, TextureTarget::Target2DArray, 1, 2, 1, [980, 240, 1]);
    let bytes = ktx::encode(&tex, &BTreeMap::new(), &KtxOptions::default()).unwrap();
    let header = ktx::read_info(&bytes).unwrap();

    assert_eq!(header.gl_internal_format, 0x8051);
    assert_eq!(header.gl_format, formats::RGB);
    assert_eq!(header.gl_type, types::UNSIGNED_BYTE);
    assert_eq!(header.gl_type_size, 1);
    assert_eq!(header.number_of_array_elements, 2);
    assert_eq!(header.number_of_faces, 1);
    assert_eq!(header.number_of_mipmap_levels, 1);
    assert!(!header.is_big_endian());
    assert_eq!(header.format(), Some(TextureFormat::Rgb8Unorm));
    assert_eq!(header.target(), TextureTarget::Target2DArray);
    // identifier + header + one image size + two 980x240 RGB slices
    assert_eq!(bytes.len(), 64 + 4 + 2 * 2940 * 240);
}

#[test]
fn astc_header_decodes_to_blocks() {
    let fields: [u32; 13] = [
        0x0403_0201, // endianness
        0,           // type
        1,           // type size
        0,           // format
        0x93B7,      // COMPRESSED_RGBA_ASTC_8x8_KHR
        formats::RGBA,
        16,
        16,
        0,
        0,
        1,
        1,
        0,
    ];
    let mut bytes = ktx::MAGIC.to_vec();
    for field in fields {
        bytes.extend_from_slice(&field.to_le_bytes());
    }
    // 2x2 blocks of 16 bytes
    bytes.extend_from_slice(&64u32.to_le_bytes());
    bytes.extend((0..64).map(|i| i as u8));

    let (tex, meta) = ktx::decode(&bytes, &KtxOptions::default()).unwrap();
    assert!(meta.is_empty());
    assert!(tex.is_compressed());
    assert_eq!(tex.desc().format, TextureFormat::RgbaAstc8x8Unorm);

    let roi = tex.block_roi(0, 0, 0).unwrap();
    assert_eq!(roi.block_desc(), BlockDesc { block_width: 8, block_height: 8, block_bytes: 16 });
    assert_eq!((roi.h_blocks(), roi.v_blocks()), (2, 2));
    assert_eq!(tex.block_view(0, 0, 0).block_at(1, 1, 0)[0], 48);
}

#[test]
fn cube_map_with_mips_round_trip() {
    let mut tex = linear_texture(TextureFormat::Rgba8Unorm, TextureTarget::TargetCube, 3, 1, 6, [4, 4, 1]);
    for face in 0..6u32 {
        for level in 0..3 {
            let [w, h, _] = tex.level_extent(level);
            tex.view_mut(level, 0, face).set(w - 1, h - 1, 0, 3, (face * 10 + level) as u8);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.ktx");
    texel_io::write_texture(&path, &tex, &BTreeMap::new()).unwrap();
    let (back, _) = texel_io::read_texture(&path).unwrap();

    assert_eq!(back.desc().target, TextureTarget::TargetCube);
    assert!(back.desc().mipmap);
    assert_eq!((back.levels(), back.layers(), back.faces()), (3, 1, 6));
    assert_eq!(back.level_extent(2), [1, 1, 1]);
    for face in 0..6u32 {
        for level in 0..3 {
            let [w, h, _] = back.level_extent(level);
            assert_eq!(back.view(level, 0, face).at::<u8>(w - 1, h - 1, 0, 3), (face * 10 + level) as u8);
        }
    }
}

#[test]
fn block_mip_chain_round_trip() {
    let mut tex = CompositeImg::new();
    let desc = TextureDesc::new(TextureFormat::RgbaDxt5Unorm, TextureTarget::Target2D, true);
    tex.set_block_extent(desc, 3, 1, 1, [10, 6, 1]).unwrap();
    tex.allocate_storage().unwrap();
    tex.block_view_mut(2, 0, 0).block_at_mut(0, 0, 0).fill(0xC3);

    let bytes = ktx::encode(&tex, &BTreeMap::new(), &KtxOptions::default()).unwrap();
    let (back, _) = ktx::decode(&bytes, &KtxOptions::default()).unwrap();

    assert_eq!(back.level_extent(1), [5, 3, 1]);
    let level1 = back.block_roi(1, 0, 0).unwrap();
    assert_eq!((level1.h_blocks(), level1.v_blocks()), (2, 1));
    assert_eq!(back.slot_size(0), 3 * 2 * 16);
    assert!(back.block_view(2, 0, 0).block_at(0, 0, 0).iter().all(|&b| b == 0xC3));
}

#[test]
fn volume_texture_round_trip() {
    let mut tex = linear_texture(TextureFormat::R16Uint, TextureTarget::Target3D, 2, 1, 1, [3, 3, 4]);
    tex.view_mut(0, 0, 0).set(2, 1, 3, 0, 0xABCDu16);
    tex.view_mut(1, 0, 0).set(0, 0, 1, 0, 7u16);

    let bytes = ktx::encode(&tex, &BTreeMap::new(), &KtxOptions::default()).unwrap();
    let header = ktx::read_info(&bytes).unwrap();
    assert_eq!(header.pixel_depth, 4);
    assert_eq!(header.gl_type_size, 2);

    let (back, _) = ktx::decode(&bytes, &KtxOptions::default()).unwrap();
    assert_eq!(back.level_extent(1), [1, 1, 2]);
    assert_eq!(back.view(0, 0, 0).at::<u16>(2, 1, 3, 0), 0xABCD);
    assert_eq!(back.view(1, 0, 0).at::<u16>(0, 0, 1, 0), 7);
}

#[test]
fn bottom_first_is_rejected() {
    let tex = linear_texture(TextureFormat::R8Unorm, TextureTarget::Target2D, 1, 1, 1, [2, 2, 1]);
    let options = KtxOptions::default().bottom_first(true);
    assert!(matches!(
        ktx::encode(&tex, &BTreeMap::new(), &options),
        Err(IoError::UnsupportedOption(_))
    ));
}

#[test]
fn single_image_helpers_use_ktx() {
    let mut img = texel_core::Image::new(6, 2, 1, texel_core::PixelLayout::float(1, 32), 1).unwrap();
    img.view_mut().set(5, 1, 0, 0, 2.5f32);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.ktx");
    texel_io::write(&path, &img.view()).unwrap();

    let (tex, _) = texel_io::read_texture(&path).unwrap();
    assert_eq!(tex.desc().format, TextureFormat::R32Sfloat);

    let back = texel_io::read(&path).unwrap();
    assert_eq!(back.view().at::<f32>(5, 1, 0, 0), 2.5);
}

#[test]
fn counts_the_target_cannot_express_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ktx");

    let layered = linear_texture(TextureFormat::Rgba8Unorm, TextureTarget::Target2D, 1, 2, 1, [4, 4, 1]);
    let err = ktx::write(&path, &layered, &BTreeMap::new(), &KtxOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::EncodeError(_)));
    assert!(!path.exists());

    let cube = linear_texture(TextureFormat::Rgba8Unorm, TextureTarget::TargetCube, 1, 1, 1, [4, 4, 1]);
    assert!(matches!(
        ktx::encode(&cube, &BTreeMap::new(), &KtxOptions::default()),
        Err(IoError::EncodeError(_))
    ));

    let cube_array = linear_texture(TextureFormat::Rgba8Unorm, TextureTarget::TargetCubeArray, 1, 2, 6, [4, 4, 1]);
    let bytes = ktx::encode(&cube_array, &BTreeMap::new(), &KtxOptions::default()).unwrap();
    let (back, _) = ktx::decode(&bytes, &KtxOptions::default()).unwrap();
    assert_eq!((back.layers(), back.faces()), (2, 6));
}

#[test]
fn oversized_headers_on_disk_are_format_errors() {
    let dir = tempfile::tempdir().unwrap();
    // ASTC 4x4, 0xFFFFFFFF square, one empty level
    let fields: [u32; 13] = [0x0403_0201, 0, 1, 0, 0x93B0, formats::RGBA, u32::MAX, u32::MAX, 0, 0, 1, 1, 0];
    let mut bytes = ktx::MAGIC.to_vec();
    for field in fields {
        bytes.extend_from_slice(&field.to_le_bytes());
    }
    bytes.extend_from_slice(&[0; 24]);

    let path = dir.path().join("huge.ktx");
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(texel_io::read_texture(&path), Err(IoError::Format(_))));
    assert!(matches!(texel_io::read(&path), Err(IoError::Format(_))));
}
