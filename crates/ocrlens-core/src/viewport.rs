//! Zoom, pan and pointer-index state for the image viewport.

use tracing::debug;

use crate::consts::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_STEP};
use crate::geometry::{Point, Size};
use crate::transform::CoordinateTransform;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor applied per zoom-in step. Must be > 1.
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            step: DEFAULT_ZOOM_STEP,
        }
    }
}

/// Viewport display state. Zoom 1.0 means the image fits the viewport.
#[derive(Clone, Debug)]
pub struct ViewportState {
    zoom: f64,
    pan_offset: Point,
    viewport_size: Size,
    image_size: Option<Size>,
    pub hover_index: Option<usize>,
    pub selected_index: Option<usize>,
    limits: ZoomLimits,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl ViewportState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            zoom: 1.0,
            pan_offset: Point::ZERO,
            viewport_size: Size::default(),
            image_size: None,
            hover_index: None,
            selected_index: None,
            limits,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Point {
        self.pan_offset
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    /// Install a new image: zoom, pan and indices all reset.
    ///
    /// # Panics
    ///
    /// Panics on a zero image dimension; validate at load time.
    pub fn set_image(&mut self, size: Size) {
        assert!(!size.is_empty(), "image dimensions must be positive");
        self.image_size = Some(size);
        self.zoom = 1.0;
        self.pan_offset = Point::ZERO;
        self.clear_indices();
    }

    pub fn clear_image(&mut self) {
        self.image_size = None;
        self.zoom = 1.0;
        self.pan_offset = Point::ZERO;
        self.clear_indices();
    }

    pub fn clear_indices(&mut self) {
        self.hover_index = None;
        self.selected_index = None;
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width.max(0.0), height.max(0.0));
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.limits.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.limits.step);
    }

    /// Back to fit-to-window with no pan.
    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
        self.pan_offset = Point::ZERO;
        debug!("zoom reset");
    }

    /// Multiply zoom by `factor`, keeping the image point under `anchor`
    /// (viewport space) fixed on screen.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        let Some(before) = self.transform() else {
            self.set_zoom(self.zoom * factor);
            return;
        };
        let image_point = before.to_image(anchor);
        self.set_zoom(self.zoom * factor);
        if let Some(after) = self.transform() {
            let moved = after.to_viewport(image_point);
            self.pan_by(anchor.x - moved.x, anchor.y - moved.y);
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_offset = self.pan_offset.offset(dx, dy);
    }

    fn set_zoom(&mut self, zoom: f64) {
        let clamped = zoom.clamp(self.limits.min_zoom, self.limits.max_zoom);
        if clamped != self.zoom {
            debug!(zoom = clamped, "zoom changed");
        }
        self.zoom = clamped;
    }

    /// Transform for the current state, or `None` without an image.
    ///
    /// Built fresh on every call so it can never go stale.
    pub fn transform(&self) -> Option<CoordinateTransform> {
        self.image_size
            .map(|img| CoordinateTransform::new(img, self.viewport_size, self.zoom, self.pan_offset))
    }

    /// Viewport pixels per image pixel, or `None` without an image.
    pub fn scale_factor(&self) -> Option<f64> {
        self.transform().map(|t| t.scale_factor())
    }
}
