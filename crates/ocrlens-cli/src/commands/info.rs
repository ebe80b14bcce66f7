use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image::ImageFormat;
use ocrlens_core::io::image_io::load_image;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let file_size = std::fs::metadata(&args.file)
        .with_context(|| format!("Failed to stat {}", args.file.display()))?
        .len();

    println!("File:        {}", args.file.display());
    match ImageFormat::from_path(&args.file) {
        Ok(format) => println!("Format:      {:?}", format),
        Err(_) => println!("Format:      unknown"),
    }
    println!("Dimensions:  {}x{}", image.width(), image.height());
    println!(
        "Megapixels:  {:.2}",
        (image.width() as f64 * image.height() as f64) / 1_000_000.0
    );
    println!("File size:   {:.1} KB", file_size as f64 / 1024.0);

    Ok(())
}
