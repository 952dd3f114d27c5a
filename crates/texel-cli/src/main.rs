//! texel - inspect and convert textures
//!
//! Reads KTX 1.1 containers and BMP, PPM/PGM, PFM, PNG, JPEG and BSON images.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "texel")]
#[command(author, version, about = "Inspect and convert KTX textures and raster images")]
#[command(long_about = "
Inspect and convert KTX 1.1 textures and raster images.

Examples:
  texel info skybox.ktx                 # Header, levels and key-value data
  texel info photo.bmp                  # Raster dimensions and layout
  texel convert photo.bmp photo.ktx     # Wrap an image in a 2D texture
  texel convert albedo.ktx albedo.png   # Extract level 0
  texel convert scan.pfm scan.pfm --flip-y
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Display texture or image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert between texture and image formats
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input file
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Mirror the image vertically
    #[arg(long)]
    flip_y: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
    }
}
