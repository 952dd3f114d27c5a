//! Texture and image info command.
//!
//! KTX files show the raw header, the derived texture description, every
//! level's extent and the key-value data. Raster files show their
//! dimensions and pixel layout.

use crate::InfoArgs;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use texel_io::ktx::{self, KtxOptions};
use texel_io::Format;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    for path in &args.input {
        let format = Format::detect(path).unwrap_or(Format::Unknown);
        let file_size = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();

        println!("{}", path.display());
        println!("  File size:  {}", super::format_size(file_size));
        if verbose {
            println!("  Format:     {:?}", format);
        }

        if format.is_texture() {
            print_texture(path)?;
        } else {
            print_image(path)?;
        }

        if args.input.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn print_texture(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    let header = ktx::read_info(&bytes).with_context(|| format!("Invalid KTX: {}", path.display()))?;

    println!("  Byte order: {}", if header.is_big_endian() { "big endian" } else { "little endian" });
    println!(
        "  GL:         internal 0x{:04X}, format 0x{:04X}, base 0x{:04X}, type 0x{:04X} (size {})",
        header.gl_internal_format,
        header.gl_format,
        header.gl_base_internal_format,
        header.gl_type,
        header.gl_type_size
    );
    println!(
        "  Size:       {}x{}x{}",
        header.pixel_width, header.pixel_height, header.pixel_depth
    );
    println!("  Target:     {:?}", header.target());
    match header.format() {
        Some(format) => println!("  Texture:    {format}"),
        None => println!("  Texture:    unknown GL format"),
    }

    let (texture, key_values) =
        ktx::decode(&bytes, &KtxOptions::default()).with_context(|| format!("Failed to decode: {}", path.display()))?;
    if let Some(block) = texture.desc().format.block_desc() {
        println!(
            "  Blocks:     {}x{} pixels, {} bytes",
            block.block_width, block.block_height, block.block_bytes
        );
    }
    println!(
        "  Levels:     {}, layers: {}, faces: {}",
        texture.levels(),
        texture.layers(),
        texture.faces()
    );
    for level in 0..texture.levels() {
        let [w, h, d] = texture.level_extent(level);
        println!("    level {level}: {w}x{h}x{d}, {} bytes per slot", texture.slot_size(level));
    }
    if !key_values.is_empty() {
        println!("  Key-value data:");
        for (key, value) in &key_values {
            println!("    {key} = {value}");
        }
    }
    Ok(())
}

fn print_image(path: &Path) -> Result<()> {
    let image = super::load_image(path)?;
    let roi = image.roi();
    println!("  Resolution: {}x{}x{}", image.width(), image.height(), image.depth());
    println!("  Channels:   {}", image.channels());
    println!(
        "  Bits:       {}{}",
        roi.bpc(),
        if roi.is_float() { " float" } else { "" }
    );
    Ok(())
}
