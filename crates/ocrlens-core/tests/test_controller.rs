mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use image::RgbImage;

use ocrlens_core::config::AppConfig;
use ocrlens_core::controller::{CursorHint, InputEvent, PointerButton, ViewportController};
use ocrlens_core::engine::OcrEngine;
use ocrlens_core::error::{ErrorKind, OcrLensError};
use ocrlens_core::geometry::Point;
use ocrlens_core::render::DrawCommand;
use ocrlens_core::worker::ProgressStage;

use common::{test_image, MockEngine, LEGACY_TWO_WORDS};

fn controller_with(engine: impl OcrEngine + 'static) -> ViewportController {
    let mut c = ViewportController::new(Arc::new(engine), &AppConfig::default());
    c.handle_input(InputEvent::Resized {
        width: 400.0,
        height: 300.0,
    });
    c.load_image(test_image(400, 300)).unwrap();
    c
}

/// Controller with the two legacy words recognized. Viewport equals image space.
fn recognized() -> ViewportController {
    let mut c = controller_with(MockEngine::returning(LEGACY_TWO_WORDS));
    c.recognize().unwrap();
    c.wait_for_worker();
    assert_eq!(c.boxes().len(), 2);
    c
}

fn press(c: &mut ViewportController, x: f64, y: f64, button: PointerButton) {
    c.handle_input(InputEvent::PointerPressed {
        pos: Point::new(x, y),
        button,
    });
}

fn release(c: &mut ViewportController, x: f64, y: f64, button: PointerButton) {
    c.handle_input(InputEvent::PointerReleased {
        pos: Point::new(x, y),
        button,
    });
}

fn drag(c: &mut ViewportController, from: (f64, f64), to: (f64, f64)) {
    press(c, from.0, from.1, PointerButton::Primary);
    c.handle_input(InputEvent::PointerMoved(Point::new(to.0, to.1)));
    release(c, to.0, to.1, PointerButton::Primary);
}

#[test]
fn test_click_selects_and_empty_click_clears() {
    let mut c = recognized();
    press(&mut c, 90.0, 20.0, PointerButton::Primary);
    assert_eq!(c.viewport().selected_index, Some(1));
    assert_eq!(c.selected_text(), Some("world"));
    assert_eq!(c.display_text(), "world");

    press(&mut c, 300.0, 250.0, PointerButton::Primary);
    assert_eq!(c.viewport().selected_index, None);
    assert_eq!(c.display_text(), "hello\nworld");
}

#[test]
fn test_hover_tracks_pointer() {
    let mut c = recognized();
    c.handle_input(InputEvent::PointerMoved(Point::new(20.0, 15.0)));
    assert_eq!(c.viewport().hover_index, Some(0));
    assert_eq!(c.cursor(), CursorHint::PointingHand);

    c.handle_input(InputEvent::PointerLeft);
    assert_eq!(c.viewport().hover_index, None);
    assert_eq!(c.cursor(), CursorHint::Default);
}

#[test]
fn test_pan_only_with_middle_or_secondary_button() {
    let mut c = recognized();
    press(&mut c, 10.0, 10.0, PointerButton::Middle);
    assert_eq!(c.cursor(), CursorHint::Grabbing);
    c.handle_input(InputEvent::PointerMoved(Point::new(30.0, 25.0)));
    release(&mut c, 30.0, 25.0, PointerButton::Middle);
    assert_eq!(c.viewport().pan_offset(), Point::new(20.0, 15.0));

    press(&mut c, 200.0, 200.0, PointerButton::Secondary);
    c.handle_input(InputEvent::PointerMoved(Point::new(190.0, 200.0)));
    release(&mut c, 190.0, 200.0, PointerButton::Secondary);
    assert_eq!(c.viewport().pan_offset(), Point::new(10.0, 15.0));

    drag(&mut c, (200.0, 200.0), (300.0, 250.0));
    assert_eq!(
        c.viewport().pan_offset(),
        Point::new(10.0, 15.0),
        "primary drag never pans"
    );
}

#[test]
fn test_scroll_zooms_and_double_click_fits() {
    let mut c = recognized();
    c.handle_input(InputEvent::Scroll {
        delta: 120.0,
        pos: Point::new(100.0, 100.0),
    });
    assert!(c.viewport().zoom() > 1.0);
    c.handle_input(InputEvent::DoubleClick(Point::new(5.0, 5.0)));
    assert_eq!(c.viewport().zoom(), 1.0);
    assert_eq!(c.viewport().pan_offset(), Point::ZERO);
}

#[test]
fn test_recognize_without_image() {
    let mut c = ViewportController::new(
        Arc::new(MockEngine::returning("[]")),
        &AppConfig::default(),
    );
    assert!(matches!(c.recognize(), Err(OcrLensError::NoImage)));
    assert!(c.frame().is_empty());
}

#[test]
fn test_second_recognize_is_busy() {
    let (engine, gate) = MockEngine::gated(LEGACY_TWO_WORDS);
    let mut c = controller_with(engine);
    c.recognize().unwrap();
    assert!(c.is_busy());
    let err = c.recognize().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);
    gate.send(()).unwrap();
    c.wait_for_worker();
    assert!(!c.is_busy());
    assert_eq!(c.boxes().len(), 2);
}

#[test]
fn test_success_replaces_boxes_and_clears_indices() {
    let mut c = recognized();
    press(&mut c, 20.0, 20.0, PointerButton::Primary);
    assert_eq!(c.viewport().selected_index, Some(0));

    c.recognize().unwrap();
    c.wait_for_worker();
    assert_eq!(c.viewport().selected_index, None);
    assert_eq!(c.boxes().len(), 2);
    assert!(c.status().starts_with("Found 2 text regions"), "{}", c.status());
}

#[test]
fn test_progress_ends_at_100_after_success() {
    let mut c = controller_with(MockEngine::scripted(vec![
        Ok(LEGACY_TWO_WORDS),
        Err("no model"),
        Ok(LEGACY_TWO_WORDS),
    ]));
    let run = c.recognize().unwrap();
    let started = c.progress().unwrap();
    assert_eq!((started.run, started.percent), (run, 0));

    c.wait_for_worker();
    let done = c.progress().expect("finished run keeps its progress");
    assert_eq!(done.run, run);
    assert_eq!(done.stage, ProgressStage::Finished);
    assert_eq!(done.percent, 100);
    assert!(!c.is_busy());

    c.recognize().unwrap();
    c.wait_for_worker();
    assert!(c.progress().is_none(), "failure clears progress");

    c.recognize().unwrap();
    c.wait_for_worker();
    assert_eq!(c.progress().map(|p| p.percent), Some(100));
    c.load_image(test_image(50, 50)).unwrap();
    assert!(c.progress().is_none(), "new image clears progress");
}

#[test]
fn test_failure_keeps_previous_boxes() {
    let mut c = controller_with(MockEngine::scripted(vec![
        Ok(LEGACY_TWO_WORDS),
        Err("no models"),
    ]));
    c.recognize().unwrap();
    c.wait_for_worker();
    let boxes_before = c.boxes().to_vec();
    assert_eq!(boxes_before.len(), 2);

    c.recognize().unwrap();
    c.wait_for_worker();
    assert_eq!(c.boxes(), boxes_before.as_slice());
    assert!(c.last_error().unwrap().contains("no models"));
    assert!(c.status().starts_with("Recognition failed"));
    assert!(!c.is_busy());
}

#[test]
fn test_load_image_resets_everything() {
    let mut c = recognized();
    c.handle_input(InputEvent::Scroll {
        delta: 200.0,
        pos: Point::new(50.0, 50.0),
    });
    press(&mut c, 20.0, 20.0, PointerButton::Primary);
    c.set_selection_mode(true);
    drag(&mut c, (100.0, 100.0), (200.0, 200.0));
    assert!(c.selection_rect().is_some());

    c.load_image(test_image(640, 480)).unwrap();
    assert!(c.boxes().is_empty());
    assert_eq!(c.viewport().selected_index, None);
    assert_eq!(c.viewport().zoom(), 1.0);
    assert!(c.selection_rect().is_none());
    assert_eq!(c.display_text(), "");
}

#[test]
fn test_load_during_run_discards_stale_result() {
    let (engine, gate) = MockEngine::gated(LEGACY_TWO_WORDS);
    let mut c = controller_with(engine);
    c.recognize().unwrap();
    c.load_image(test_image(100, 100)).unwrap();
    gate.send(()).unwrap();
    c.wait_for_worker();
    assert!(c.boxes().is_empty(), "result for the old image is dropped");
    assert!(!c.is_busy());
}

#[test]
fn test_empty_image_is_rejected() {
    let mut c = recognized();
    let err = c.load_image(RgbImage::new(0, 10)).unwrap_err();
    assert!(matches!(err, OcrLensError::InvalidDimensions { width: 0, height: 10 }));
    assert_eq!(c.boxes().len(), 2, "failed load leaves state alone");
}

#[test]
fn test_recognize_selection_validates_size() {
    let mut c = controller_with(MockEngine::returning(
        r#"[[[[0, 0], [10, 0], [10, 5], [0, 5]], ["part", 0.8]]]"#,
    ));
    assert!(matches!(
        c.recognize_selection(),
        Err(OcrLensError::InvalidCrop(_))
    ));

    c.toggle_selection_mode();
    drag(&mut c, (100.0, 100.0), (110.0, 150.0));
    assert!(c.selection_rect().is_some());
    let err = c.recognize_selection().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);

    drag(&mut c, (200.0, 100.0), (260.0, 140.0));
    c.recognize_selection().unwrap();
    c.wait_for_worker();
    let tl = c.boxes()[0].polygon.points()[0];
    assert_eq!((tl.x, tl.y), (200.0, 100.0));
}

#[test]
fn test_selection_mode_gestures_and_cursor() {
    let mut c = recognized();
    assert!(c.toggle_selection_mode());
    c.handle_input(InputEvent::PointerMoved(Point::new(20.0, 15.0)));
    assert_eq!(c.viewport().hover_index, None, "no hover in selection mode");
    assert_eq!(c.cursor(), CursorHint::Crosshair);

    drag(&mut c, (100.0, 100.0), (200.0, 180.0));
    c.handle_input(InputEvent::PointerMoved(Point::new(200.0, 140.0)));
    assert_eq!(c.cursor(), CursorHint::ResizeHorizontal);
    c.handle_input(InputEvent::PointerMoved(Point::new(150.0, 140.0)));
    assert_eq!(c.cursor(), CursorHint::Move);

    press(&mut c, 150.0, 140.0, PointerButton::Primary);
    assert_eq!(c.viewport().selected_index, None, "clicks do not pick boxes");
    release(&mut c, 150.0, 140.0, PointerButton::Primary);

    assert!(!c.toggle_selection_mode());
    assert!(c.selection_rect().is_none());
}

#[test]
fn test_frame_contains_selection_overlay() {
    let mut c = recognized();
    c.set_selection_mode(true);
    drag(&mut c, (100.0, 100.0), (200.0, 180.0));
    let frame = c.frame();
    assert!(frame
        .iter()
        .any(|cmd| matches!(cmd, DrawCommand::SelectionOutline { valid: true, .. })));
    assert_eq!(
        frame
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Polygon { .. }))
            .count(),
        2
    );
    assert!(c.status_line().contains("Selection 100x80 at (100, 100)"), "{}", c.status_line());
}

#[test]
fn test_scroll_zoom_mid_resize_keeps_image_space_result() {
    let mut c = recognized();
    c.set_selection_mode(true);
    drag(&mut c, (100.0, 100.0), (200.0, 180.0));

    // Grab the right edge handle at zoom 1, then zoom toward the origin mid-drag.
    press(&mut c, 200.0, 140.0, PointerButton::Primary);
    c.handle_input(InputEvent::PointerMoved(Point::new(230.0, 140.0)));
    c.handle_input(InputEvent::Scroll {
        delta: 120.0,
        pos: Point::ZERO,
    });
    assert!(c.viewport().zoom() > 1.0);

    let pointer = Point::new(300.0, 140.0);
    c.handle_input(InputEvent::PointerMoved(pointer));
    release(&mut c, pointer.x, pointer.y, PointerButton::Primary);

    let expected = c.viewport().transform().unwrap().to_image(pointer);
    let r = *c.selection_rect().unwrap();
    assert_abs_diff_eq!(r.right(), expected.x, epsilon = 1e-9);
    assert_abs_diff_eq!(r.left(), 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.top(), 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.bottom(), 180.0, epsilon = 1e-9);
}

#[test]
fn test_viewport_resize_mid_move_keeps_image_space_result() {
    let mut c = recognized();
    c.set_selection_mode(true);
    drag(&mut c, (100.0, 100.0), (200.0, 180.0));

    // Grab the body at image (150, 140), nudge, then the window doubles in size.
    press(&mut c, 150.0, 140.0, PointerButton::Primary);
    c.handle_input(InputEvent::PointerMoved(Point::new(160.0, 150.0)));
    c.handle_input(InputEvent::Resized {
        width: 800.0,
        height: 600.0,
    });

    let pointer = Point::new(400.0, 320.0);
    c.handle_input(InputEvent::PointerMoved(pointer));
    release(&mut c, pointer.x, pointer.y, PointerButton::Primary);

    let under_pointer = c.viewport().transform().unwrap().to_image(pointer);
    assert_abs_diff_eq!(under_pointer.x, 200.0, epsilon = 1e-9);
    assert_abs_diff_eq!(under_pointer.y, 160.0, epsilon = 1e-9);
    let r = *c.selection_rect().unwrap();
    assert_abs_diff_eq!(r.x, 100.0 + under_pointer.x - 150.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.y, 100.0 + under_pointer.y - 140.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.width, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.height, 80.0, epsilon = 1e-9);
}

#[test]
fn test_can_recognize_selection_tracks_size_and_busy() {
    let (engine, gate) = MockEngine::gated(LEGACY_TWO_WORDS);
    let mut c = controller_with(engine);
    assert!(!c.can_recognize_selection(), "no selection yet");

    c.set_selection_mode(true);
    drag(&mut c, (100.0, 100.0), (110.0, 150.0));
    assert!(c.selection_rect().is_some());
    assert!(!c.can_recognize_selection(), "below the recognition minimum");

    drag(&mut c, (200.0, 100.0), (260.0, 140.0));
    assert!(c.can_recognize_selection());

    c.recognize_selection().unwrap();
    assert!(!c.can_recognize_selection(), "busy while a run is in flight");
    gate.send(()).unwrap();
    c.wait_for_worker();
    assert!(c.can_recognize_selection());
}
