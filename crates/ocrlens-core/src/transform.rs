//! Mapping between image pixels and viewport pixels.
//!
//! The image is first scaled to fit the viewport while keeping its aspect
//! ratio, then multiplied by the zoom level, centred, and finally shifted by the
//! pan offset. A transform is a snapshot: build a new one whenever the viewport
//! size, zoom or pan changes.

use crate::consts::SCALE_EPSILON;
use crate::geometry::{Point, Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateTransform {
    scale: f64,
    offset: Point,
    image_size: Size,
}

/// Scale that fits `image` inside `viewport`, floored at [`SCALE_EPSILON`].
///
/// # Panics
///
/// Panics if the image has a zero or negative dimension.
pub fn fit_scale(image: Size, viewport: Size) -> f64 {
    assert!(
        image.width > 0.0 && image.height > 0.0,
        "image dimensions must be positive, got {}x{}",
        image.width,
        image.height
    );
    let fit = (viewport.width / image.width).min(viewport.height / image.height);
    if fit.is_finite() {
        fit.max(SCALE_EPSILON)
    } else {
        SCALE_EPSILON
    }
}

impl CoordinateTransform {
    /// # Panics
    ///
    /// Panics if the image has a zero dimension. Images are validated at load
    /// time, so reaching this is a programming error.
    pub fn new(image: Size, viewport: Size, zoom: f64, pan: Point) -> Self {
        let scale = (fit_scale(image, viewport) * zoom).max(SCALE_EPSILON);
        let offset = Point::new(
            (viewport.width - image.width * scale) / 2.0 + pan.x,
            (viewport.height - image.height * scale) / 2.0 + pan.y,
        );
        Self {
            scale,
            offset,
            image_size: image,
        }
    }

    /// Viewport pixels per image pixel.
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Viewport position of the image's top-left corner.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn to_viewport(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    pub fn to_image(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    pub fn to_viewport_len(&self, len: f64) -> f64 {
        len * self.scale
    }

    pub fn to_image_len(&self, len: f64) -> f64 {
        len / self.scale
    }

    /// Where the whole image lands in the viewport.
    pub fn image_rect(&self) -> Rect {
        Rect::from_min_size(
            self.offset,
            Size::new(
                self.image_size.width * self.scale,
                self.image_size.height * self.scale,
            ),
        )
    }

    /// Map an image-space rectangle into the viewport.
    pub fn rect_to_viewport(&self, r: Rect) -> Rect {
        Rect::from_min_max(self.to_viewport(r.min), self.to_viewport(r.max))
    }
}
