use image::RgbImage;
use serde::Serialize;

use crate::error::{OcrLensError, Result};

/// A rectangle in image coordinates for cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Validate the crop rect against source dimensions.
    pub fn validated(&self, src_w: u32, src_h: u32) -> Result<CropRect> {
        if self.width == 0 || self.height == 0 {
            return Err(OcrLensError::InvalidCrop(
                "Crop width and height must be > 0".into(),
            ));
        }

        let fits_x = self.x.checked_add(self.width).is_some_and(|r| r <= src_w);
        let fits_y = self.y.checked_add(self.height).is_some_and(|b| b <= src_h);
        if !fits_x || !fits_y {
            return Err(OcrLensError::InvalidCrop(format!(
                "Crop region ({},{} {}x{}) exceeds source dimensions ({src_w}x{src_h})",
                self.x, self.y, self.width, self.height
            )));
        }

        Ok(*self)
    }
}

impl std::str::FromStr for CropRect {
    type Err = OcrLensError;

    /// Parse `"x,y,width,height"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| OcrLensError::InvalidCrop(format!("'{s}': {e}")))?;
        match parts.as_slice() {
            &[x, y, width, height] => Ok(CropRect {
                x,
                y,
                width,
                height,
            }),
            _ => Err(OcrLensError::InvalidCrop(format!(
                "'{s}': expected x,y,width,height"
            ))),
        }
    }
}

/// Copy the cropped region out of `image`.
pub fn crop_image(image: &RgbImage, crop: &CropRect) -> Result<RgbImage> {
    let c = crop.validated(image.width(), image.height())?;
    Ok(image::imageops::crop_imm(image, c.x, c.y, c.width, c.height).to_image())
}
