//! Format conversion command.
//!
//! Raster to raster, raster to a one-level KTX texture, and KTX level 0 to
//! raster. Block-compressed textures cannot be extracted.

use crate::ConvertArgs;
use anyhow::{Context, Result, bail};
use std::path::Path;
use texel_core::{Image, PixelLayout};
use texel_io::bmp::{BmpOptions, BmpReader};
use texel_io::bson::{BsonOptions, BsonReader};
use texel_io::pfm::{PfmOptions, PfmReader};
use texel_io::ppm::{PpmOptions, PpmReader};
use texel_io::{Format, ImageReader};
use tracing::{debug, info};

/// Runs the convert command.
pub fn run(args: ConvertArgs, verbose: bool) -> Result<()> {
    let input_format = Format::detect(&args.input).unwrap_or(Format::Unknown);
    let output_format = Format::from_extension(&args.output);

    info!(
        input = %args.input.display(),
        input_format = ?input_format,
        output = %args.output.display(),
        output_format = ?output_format,
        "Converting image"
    );
    if verbose {
        println!(
            "Converting {} ({:?}) -> {} ({:?})",
            args.input.display(),
            input_format,
            args.output.display(),
            output_format
        );
    }
    if output_format == Format::Unknown {
        bail!("Unknown output format: {}", args.output.display());
    }

    let image = load(&args.input, input_format, args.flip_y)?;
    debug!(
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "Loaded image"
    );

    texel_io::write(&args.output, &image.view())
        .with_context(|| format!("Failed to save: {}", args.output.display()))?;

    if verbose {
        println!("Done.");
    }
    Ok(())
}

fn load(path: &Path, format: Format, flip_y: bool) -> Result<Image> {
    let context = || format!("Failed to load: {}", path.display());
    let image = match format {
        Format::Bmp => BmpReader::with_options(BmpOptions::default().flip_y(flip_y)).read(path),
        Format::Ppm => PpmReader::with_options(PpmOptions::default().flip_y(flip_y)).read(path),
        Format::Pfm => PfmReader::with_options(PfmOptions::default().flip_y(flip_y)).read(path),
        Format::Bson => BsonReader::with_options(BsonOptions::default().flip_y(flip_y)).read(path),
        #[cfg(feature = "png")]
        Format::Png => {
            use texel_io::png::{PngOptions, PngReader};
            PngReader::with_options(PngOptions::default().flip_y(flip_y)).read(path)
        }
        #[cfg(feature = "jpeg")]
        Format::Jpeg => {
            use texel_io::jpeg::{JpegOptions, JpegReader};
            JpegReader::with_options(JpegOptions::default().flip_y(flip_y)).read(path)
        }
        _ => {
            let image = super::load_image(path)?;
            return if flip_y { flip_rows(&image) } else { Ok(image) };
        }
    };
    image.with_context(context)
}

/// Copies `src` with its rows in reverse order.
fn flip_rows(src: &Image) -> Result<Image> {
    let layout: PixelLayout = src.roi().layout();
    let mut dst = Image::new(src.width(), src.height(), src.depth(), layout, 1)?;
    let height = src.height();
    let mut view = dst.view_mut();
    for z in 0..src.depth() {
        for y in 0..height {
            view.row_mut(height - 1 - y, z).copy_from_slice(src.view().row(y, z));
        }
    }
    Ok(dst)
}
