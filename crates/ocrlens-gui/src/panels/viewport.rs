use ocrlens_core::controller::{CursorHint, InputEvent, PointerButton};
use ocrlens_core::geometry::{Point, Quad, Rect};
use ocrlens_core::render::{BoxStyle, DrawCommand};

use crate::app::OcrLensApp;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 165, 0);
const INVALID_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 60, 60);

pub fn show(ctx: &egui::Context, app: &mut OcrLensApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);

        let Some(texture_id) = app.texture.as_ref().map(|t| t.id()) else {
            show_placeholder(ui, app.ui_state.loading);
            return;
        };

        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        app.controller.handle_input(InputEvent::Resized {
            width: rect.width() as f64,
            height: rect.height() as f64,
        });
        forward_input(ui, &response, app, rect);

        if response.hovered() || response.dragged() {
            ctx.set_cursor_icon(cursor_icon(app.controller.cursor()));
        }

        let painter = ui.painter_at(rect);
        for command in app.controller.frame() {
            draw_command(&painter, rect, texture_id, &command);
        }
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

/// Translate this frame's egui input into controller events, relative to `rect`.
fn forward_input(ui: &egui::Ui, response: &egui::Response, app: &mut OcrLensApp, rect: egui::Rect) {
    let local = |p: egui::Pos2| Point::new((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);
    let events = ui.input(|i| i.events.clone());
    let any_down = ui.input(|i| i.pointer.any_down());

    for event in events {
        match event {
            egui::Event::PointerMoved(pos) => {
                if rect.contains(pos) || any_down {
                    app.controller.handle_input(InputEvent::PointerMoved(local(pos)));
                } else {
                    app.controller.handle_input(InputEvent::PointerLeft);
                }
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                let Some(button) = map_button(button) else {
                    continue;
                };
                let pos = local(pos);
                if pressed {
                    if response.hovered() {
                        app.controller
                            .handle_input(InputEvent::PointerPressed { pos, button });
                    }
                } else {
                    app.controller
                        .handle_input(InputEvent::PointerReleased { pos, button });
                }
            }
            egui::Event::PointerGone => {
                app.controller.handle_input(InputEvent::PointerLeft);
            }
            _ => {}
        }
    }

    if response.hovered() {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta != 0.0 {
            if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                app.controller.handle_input(InputEvent::Scroll {
                    delta: scroll_delta as f64,
                    pos: local(pos),
                });
            }
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            app.controller.handle_input(InputEvent::DoubleClick(local(pos)));
        }
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::PointingHand => egui::CursorIcon::PointingHand,
        CursorHint::Crosshair => egui::CursorIcon::Crosshair,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::Grabbing => egui::CursorIcon::Grabbing,
        CursorHint::ResizeHorizontal => egui::CursorIcon::ResizeHorizontal,
        CursorHint::ResizeVertical => egui::CursorIcon::ResizeVertical,
        CursorHint::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        CursorHint::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
    }
}

fn to_pos(origin: egui::Rect, p: Point) -> egui::Pos2 {
    origin.min + egui::vec2(p.x as f32, p.y as f32)
}

fn to_rect(origin: egui::Rect, r: Rect) -> egui::Rect {
    egui::Rect::from_min_max(to_pos(origin, r.min), to_pos(origin, r.max))
}

fn draw_command(painter: &egui::Painter, origin: egui::Rect, texture_id: egui::TextureId, command: &DrawCommand) {
    match command {
        DrawCommand::Image { dest } => {
            painter.image(
                texture_id,
                to_rect(origin, *dest),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        DrawCommand::Polygon { points, style, .. } => {
            let (fill, stroke) = box_colors(*style);
            let convex = Quad(*points).is_convex();
            let points: Vec<egui::Pos2> = points.iter().map(|p| to_pos(origin, *p)).collect();
            if convex {
                painter.add(egui::Shape::convex_polygon(points, fill, stroke));
            } else {
                // convex_polygon would mis-fill; outline only.
                painter.add(egui::Shape::closed_line(points, stroke));
            }
        }
        DrawCommand::Dim { rect } => {
            let rect = to_rect(origin, *rect);
            if rect.is_positive() {
                painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(140));
            }
        }
        DrawCommand::SelectionOutline { rect, valid } => {
            let rect = to_rect(origin, *rect);
            if *valid {
                painter.rect_stroke(
                    rect,
                    0.0,
                    egui::Stroke::new(2.0, SELECTION_COLOR),
                    egui::epaint::StrokeKind::Outside,
                );
            } else {
                let corners = [
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                    rect.left_top(),
                ];
                painter.extend(egui::Shape::dashed_line(
                    &corners,
                    egui::Stroke::new(2.0, INVALID_COLOR),
                    6.0,
                    4.0,
                ));
            }
        }
        DrawCommand::HandleMarker { center, size, .. } => {
            let marker = egui::Rect::from_center_size(
                to_pos(origin, *center),
                egui::vec2(*size as f32, *size as f32),
            );
            painter.rect_filled(marker, 1.0, egui::Color32::WHITE);
            painter.rect_stroke(
                marker,
                1.0,
                egui::Stroke::new(1.0, SELECTION_COLOR),
                egui::epaint::StrokeKind::Inside,
            );
        }
        DrawCommand::SizeLabel { rect, text } => {
            let rect = to_rect(origin, *rect);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(13.0),
                egui::Color32::from_white_alpha(220),
            );
        }
        DrawCommand::MinSizeWarning { anchor, text } => {
            painter.text(
                to_pos(origin, *anchor) + egui::vec2(0.0, 6.0),
                egui::Align2::CENTER_TOP,
                text,
                egui::FontId::proportional(12.0),
                INVALID_COLOR,
            );
        }
    }
}

fn box_colors(style: BoxStyle) -> (egui::Color32, egui::Stroke) {
    match style {
        BoxStyle::Normal => (
            egui::Color32::from_rgba_unmultiplied(0, 160, 255, 20),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 160, 255)),
        ),
        BoxStyle::Hovered => (
            egui::Color32::from_rgba_unmultiplied(0, 200, 120, 50),
            egui::Stroke::new(1.5, egui::Color32::from_rgb(0, 200, 120)),
        ),
        BoxStyle::Selected => (
            egui::Color32::from_rgba_unmultiplied(255, 165, 0, 60),
            egui::Stroke::new(2.0, SELECTION_COLOR),
        ),
    }
}

fn show_placeholder(ui: &mut egui::Ui, loading: bool) {
    let text = if loading {
        "Loading image..."
    } else {
        "Open an image to begin"
    };
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(text)
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
