//! Selection rectangle used to re-recognize a sub-region of the image.
//!
//! The rectangle is always stored in image pixels. Pointer positions arrive in
//! viewport pixels and are mapped through the current transform on every
//! update, so zooming mid-drag does not distort the result.

use std::fmt;

use tracing::debug;

use crate::consts::{
    DEFAULT_HANDLE_RADIUS, DEFAULT_MIN_RECOGNIZABLE_SELECTION, DEFAULT_MIN_SELECTION_EXTENT,
};
use crate::geometry::{Point, Rect, Size};
use crate::hit_test::{selection_hit, SelectionHit};
use crate::io::crop::CropRect;
use crate::transform::CoordinateTransform;

/// Axis-aligned selection in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_min_size(Point::new(self.x, self.y), Size::new(self.width, self.height))
    }

    /// Whether the selection is large enough to hand to the engine.
    pub fn is_recognizable(&self, min_size: f64) -> bool {
        self.width >= min_size && self.height >= min_size
    }

    /// Round edges to whole pixels for cropping. Rounding the edges rather
    /// than the extent keeps the crop inside any bounds the rect was inside.
    pub fn to_crop_rect(&self) -> CropRect {
        let left = self.left().max(0.0).round() as u32;
        let top = self.top().max(0.0).round() as u32;
        let right = self.right().max(0.0).round() as u32;
        let bottom = self.bottom().max(0.0).round() as u32;
        CropRect {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }
}

impl fmt::Display for SelectionRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width.round() as i64,
            self.height.round() as i64,
            self.x.round() as i64,
            self.y.round() as i64
        )
    }
}

/// The eight resize handles, clockwise from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    pub const ALL: [Self; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Image-space position of this handle on `rect`.
    pub fn position(self, rect: &SelectionRect) -> Point {
        let c = rect.center();
        match self {
            Self::TopLeft => Point::new(rect.left(), rect.top()),
            Self::Top => Point::new(c.x, rect.top()),
            Self::TopRight => Point::new(rect.right(), rect.top()),
            Self::Right => Point::new(rect.right(), c.y),
            Self::BottomRight => Point::new(rect.right(), rect.bottom()),
            Self::Bottom => Point::new(c.x, rect.bottom()),
            Self::BottomLeft => Point::new(rect.left(), rect.bottom()),
            Self::Left => Point::new(rect.left(), c.y),
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomRight | Self::Bottom | Self::BottomLeft)
    }
}

/// In-progress pointer gesture in selection mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragGesture {
    /// Drawing a new rectangle from `anchor` (image space).
    Drawing { anchor: Point },
    /// Translating the rectangle. `grab` is the image point pressed.
    Moving { grab: Point, start: SelectionRect },
    /// Resizing by `handle`; the opposite side stays fixed at `start`.
    Resizing { handle: Handle, start: SelectionRect },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionLimits {
    /// Handle grab radius in viewport pixels.
    pub handle_radius: f64,
    /// Hard floor on width/height during any drag (image pixels).
    pub min_extent: f64,
    /// Minimum width/height accepted for recognition (image pixels).
    pub min_recognizable: f64,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            handle_radius: DEFAULT_HANDLE_RADIUS,
            min_extent: DEFAULT_MIN_SELECTION_EXTENT,
            min_recognizable: DEFAULT_MIN_RECOGNIZABLE_SELECTION,
        }
    }
}

/// Selection mode state: the rectangle plus the active gesture.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    active: bool,
    rect: Option<SelectionRect>,
    gesture: Option<DragGesture>,
    limits: SelectionLimits,
}

impl SelectionState {
    pub fn new(limits: SelectionLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rect(&self) -> Option<&SelectionRect> {
        self.rect.as_ref()
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn limits(&self) -> &SelectionLimits {
        &self.limits
    }

    /// Enter or leave selection mode. Leaving drops the rectangle and any drag.
    pub fn set_mode(&mut self, enabled: bool) {
        self.active = enabled;
        if !enabled {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.rect = None;
        self.gesture = None;
    }

    /// Current rectangle if it meets the recognition minimum.
    pub fn recognizable_rect(&self) -> Option<&SelectionRect> {
        self.rect
            .as_ref()
            .filter(|r| r.is_recognizable(self.limits.min_recognizable))
    }

    /// Start a gesture at a viewport-space pointer position.
    pub fn begin_drag(&mut self, pointer: Point, transform: &CoordinateTransform, image: Size) -> SelectionHit {
        let hit = selection_hit(
            self.rect.as_ref(),
            transform,
            pointer,
            self.limits.handle_radius,
        );
        let img = transform.to_image(pointer);

        self.gesture = match (hit, self.rect) {
            (SelectionHit::Handle(handle), Some(start)) => {
                Some(DragGesture::Resizing { handle, start })
            }
            (SelectionHit::Body, Some(start)) => Some(DragGesture::Moving { grab: img, start }),
            _ => {
                self.rect = None;
                Some(DragGesture::Drawing {
                    anchor: clamp_point(img, image),
                })
            }
        };
        debug!(?hit, "selection drag started");
        hit
    }

    /// Apply a pointer move to the active gesture.
    pub fn update_drag(&mut self, pointer: Point, transform: &CoordinateTransform, image: Size) {
        let Some(gesture) = self.gesture else {
            return;
        };
        let img = transform.to_image(pointer);
        let min = self.limits.min_extent;

        match gesture {
            DragGesture::Drawing { anchor } => {
                let r = SelectionRect::from_corners(anchor, clamp_point(img, image));
                self.rect = (r.width >= min && r.height >= min).then_some(r);
            }
            DragGesture::Moving { grab, start } => {
                self.rect = Some(translate_within(&start, img.x - grab.x, img.y - grab.y, image));
            }
            DragGesture::Resizing { handle, start } => {
                self.rect = Some(resize_with_handle(&start, handle, img, min, image));
            }
        }
    }

    /// Finish the gesture. Returns the resulting rectangle, if any.
    pub fn end_drag(&mut self, image: Size) -> Option<SelectionRect> {
        self.gesture = None;
        if let Some(r) = self.rect.as_mut() {
            *r = clamp_to_image(r, self.limits.min_extent, image);
        }
        self.rect
    }
}

/// Resize `start` by dragging `handle` to `pointer` (image space).
///
/// The side opposite the handle stays fixed. The moving side is clamped so the
/// rectangle keeps at least `min` pixels in each dimension and, where possible,
/// stays inside the image.
pub fn resize_with_handle(
    start: &SelectionRect,
    handle: Handle,
    pointer: Point,
    min: f64,
    image: Size,
) -> SelectionRect {
    let mut left = start.left();
    let mut right = start.right();
    let mut top = start.top();
    let mut bottom = start.bottom();

    if handle.moves_left() {
        left = clamp_upper_bound_wins(pointer.x, 0.0, right - min);
    } else if handle.moves_right() {
        right = clamp_lower_bound_wins(pointer.x, left + min, image.width);
    }
    if handle.moves_top() {
        top = clamp_upper_bound_wins(pointer.y, 0.0, bottom - min);
    } else if handle.moves_bottom() {
        bottom = clamp_lower_bound_wins(pointer.y, top + min, image.height);
    }

    SelectionRect::new(left, top, right - left, bottom - top)
}

fn translate_within(start: &SelectionRect, dx: f64, dy: f64, image: Size) -> SelectionRect {
    let max_x = (image.width - start.width).max(0.0);
    let max_y = (image.height - start.height).max(0.0);
    SelectionRect::new(
        (start.x + dx).clamp(0.0, max_x),
        (start.y + dy).clamp(0.0, max_y),
        start.width,
        start.height,
    )
}

fn clamp_to_image(r: &SelectionRect, min: f64, image: Size) -> SelectionRect {
    let x = r.x.clamp(0.0, (image.width - min).max(0.0));
    let y = r.y.clamp(0.0, (image.height - min).max(0.0));
    let width = r.width.min(image.width - x).max(min);
    let height = r.height.min(image.height - y).max(min);
    SelectionRect::new(x, y, width, height)
}

fn clamp_point(p: Point, image: Size) -> Point {
    Point::new(p.x.clamp(0.0, image.width), p.y.clamp(0.0, image.height))
}

// When bounds conflict the minimum-size side must win.
fn clamp_upper_bound_wins(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

fn clamp_lower_bound_wins(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}
