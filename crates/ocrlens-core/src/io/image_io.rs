use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::error::{OcrLensError, Result};
use crate::geometry::Size;

/// Decode an image file into RGB, rejecting empty images.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?.to_rgb8();
    validate_dimensions(&img)?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

pub fn validate_dimensions(img: &RgbImage) -> Result<()> {
    if img.width() == 0 || img.height() == 0 {
        return Err(OcrLensError::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(())
}

pub fn image_size(img: &RgbImage) -> Size {
    Size::new(img.width() as f64, img.height() as f64)
}

/// Save as PNG regardless of extension. Used to hand images to external engines.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
