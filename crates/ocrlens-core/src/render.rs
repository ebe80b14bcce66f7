//! Frame description for the viewport.
//!
//! [`render`] turns the current state into a flat list of draw commands in
//! viewport coordinates. It keeps nothing between calls; the GUI maps each
//! command onto its painter.

use crate::consts::{HANDLE_MARKER_SIZE, SIZE_LABEL_MIN_HEIGHT, SIZE_LABEL_MIN_WIDTH};
use crate::geometry::{Point, Rect, Size};
use crate::selection::{Handle, SelectionState};
use crate::text_box::TextBox;
use crate::viewport::ViewportState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxStyle {
    Normal,
    Hovered,
    Selected,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// The scaled image occupies `dest`.
    Image { dest: Rect },
    /// A text box outline (and fill) in viewport space.
    Polygon {
        index: usize,
        points: [Point; 4],
        style: BoxStyle,
    },
    /// Darken everything outside the selection.
    Dim { rect: Rect },
    /// Selection border. `valid` is false when under the recognition minimum.
    SelectionOutline { rect: Rect, valid: bool },
    /// Square handle marker centred on `center`.
    HandleMarker { handle: Handle, center: Point, size: f64 },
    /// Selection size, e.g. "120 x 40".
    SizeLabel { rect: Rect, text: String },
    /// Shown below an invalid selection.
    MinSizeWarning { anchor: Point, text: String },
}

/// Build the draw commands for one frame.
pub fn render(
    boxes: &[TextBox],
    viewport: &ViewportState,
    selection: &SelectionState,
) -> Vec<DrawCommand> {
    let Some(transform) = viewport.transform() else {
        return Vec::new();
    };

    let mut commands = Vec::with_capacity(boxes.len() + 16);
    commands.push(DrawCommand::Image {
        dest: transform.image_rect(),
    });

    for (index, b) in boxes.iter().enumerate() {
        let style = if viewport.selected_index == Some(index) {
            BoxStyle::Selected
        } else if viewport.hover_index == Some(index) {
            BoxStyle::Hovered
        } else {
            BoxStyle::Normal
        };
        commands.push(DrawCommand::Polygon {
            index,
            points: b.polygon.points().map(|p| transform.to_viewport(p)),
            style,
        });
    }

    if let Some(sel) = selection.rect() {
        let screen = transform.rect_to_viewport(sel.to_rect());
        let min_recognizable = selection.limits().min_recognizable;
        let valid = sel.is_recognizable(min_recognizable);

        for rect in dim_regions(viewport.viewport_size(), screen) {
            commands.push(DrawCommand::Dim { rect });
        }
        commands.push(DrawCommand::SelectionOutline {
            rect: screen,
            valid,
        });
        for handle in Handle::ALL {
            commands.push(DrawCommand::HandleMarker {
                handle,
                center: transform.to_viewport(handle.position(sel)),
                size: HANDLE_MARKER_SIZE,
            });
        }
        if screen.width() > SIZE_LABEL_MIN_WIDTH && screen.height() > SIZE_LABEL_MIN_HEIGHT {
            commands.push(DrawCommand::SizeLabel {
                rect: screen,
                text: format!(
                    "{} x {}",
                    sel.width.round() as i64,
                    sel.height.round() as i64
                ),
            });
        }
        if !valid {
            commands.push(DrawCommand::MinSizeWarning {
                anchor: Point::new(screen.center().x, screen.max.y),
                text: format!("Min: {}px", min_recognizable.round() as i64),
            });
        }
    }

    commands
}

/// Four rectangles covering the viewport around `hole`: top, bottom, left, right.
fn dim_regions(viewport: Size, hole: Rect) -> [Rect; 4] {
    let w = viewport.width;
    let h = viewport.height;
    [
        Rect::from_min_max(Point::new(0.0, 0.0), Point::new(w, hole.min.y)),
        Rect::from_min_max(Point::new(0.0, hole.max.y), Point::new(w, h)),
        Rect::from_min_max(Point::new(0.0, hole.min.y), Point::new(hole.min.x, hole.max.y)),
        Rect::from_min_max(Point::new(hole.max.x, hole.min.y), Point::new(w, hole.max.y)),
    ]
}
