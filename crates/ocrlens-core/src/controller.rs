//! Composition root for the interactive viewport.
//!
//! [`ViewportController`] owns the image, the current box set, viewport and
//! selection state plus the recognition worker. Front-ends translate their
//! native input into [`InputEvent`]s, call [`ViewportController::poll_worker`]
//! once per frame and paint whatever [`ViewportController::frame`] returns.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::consts::WHEEL_ZOOM_SENSITIVITY;
use crate::engine::OcrEngine;
use crate::error::{OcrLensError, Result};
use crate::geometry::{Point, Size};
use crate::hit_test::{selection_hit, topmost_box_at, SelectionHit};
use crate::io::image_io::{image_size, load_image, validate_dimensions};
use crate::render::{render, DrawCommand};
use crate::selection::{DragGesture, Handle, SelectionRect, SelectionState};
use crate::text_box::{joined_text, TextBox};
use crate::viewport::ViewportState;
use crate::worker::{OcrWorker, ProgressStage, RunId, Waker, WorkerEvent, WorkerEventKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input in viewport coordinates (origin at the viewport's top-left corner).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved(Point),
    PointerPressed { pos: Point, button: PointerButton },
    PointerReleased { pos: Point, button: PointerButton },
    PointerLeft,
    /// Positive `delta` zooms in toward `pos`.
    Scroll { delta: f64, pos: Point },
    DoubleClick(Point),
    Resized { width: f64, height: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    PointingHand,
    Crosshair,
    Move,
    Grabbing,
    ResizeHorizontal,
    ResizeVertical,
    /// Top-left / bottom-right diagonal.
    ResizeNwSe,
    /// Top-right / bottom-left diagonal.
    ResizeNeSw,
}

impl CursorHint {
    fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::Left | Handle::Right => Self::ResizeHorizontal,
            Handle::Top | Handle::Bottom => Self::ResizeVertical,
            Handle::TopLeft | Handle::BottomRight => Self::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => Self::ResizeNeSw,
        }
    }
}

/// Progress of the run currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunProgress {
    pub run: RunId,
    pub stage: ProgressStage,
    pub percent: u8,
}

pub struct ViewportController {
    image: Option<Arc<RgbImage>>,
    boxes: Vec<TextBox>,
    viewport: ViewportState,
    selection: SelectionState,
    worker: OcrWorker,
    pointer: Option<Point>,
    pan_anchor: Option<Point>,
    progress: Option<RunProgress>,
    status: String,
    last_error: Option<String>,
}

impl ViewportController {
    pub fn new(engine: Arc<dyn OcrEngine>, config: &AppConfig) -> Self {
        Self {
            image: None,
            boxes: Vec::new(),
            viewport: ViewportState::new(config.zoom_limits()),
            selection: SelectionState::new(config.selection_limits()),
            worker: OcrWorker::new(engine),
            pointer: None,
            pan_anchor: None,
            progress: None,
            status: "Ready".into(),
            last_error: None,
        }
    }

    /// Install a callback fired whenever the worker sends an event.
    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.worker = self.worker.with_waker(waker);
        self
    }

    pub fn image(&self) -> Option<&Arc<RgbImage>> {
        self.image.as_ref()
    }

    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn worker(&self) -> &OcrWorker {
        &self.worker
    }

    pub fn is_busy(&self) -> bool {
        self.worker.is_running()
    }

    /// Progress of the latest run. A successful run stays at
    /// [`ProgressStage::Finished`] (100%) until the next run or image load;
    /// a failed run clears it.
    pub fn progress(&self) -> Option<RunProgress> {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn image_dims(&self) -> Option<Size> {
        self.viewport.image_size()
    }

    // -- Image lifecycle --

    pub fn open(&mut self, path: &Path) -> Result<()> {
        let image = load_image(path)?;
        self.load_image(image)
    }

    /// Replace the image. Boxes, indices, selection and zoom/pan are reset and
    /// any in-flight run is invalidated.
    pub fn load_image(&mut self, image: RgbImage) -> Result<()> {
        validate_dimensions(&image)?;
        let size = image_size(&image);

        self.worker.invalidate();
        self.progress = None;
        self.boxes.clear();
        self.selection.clear();
        self.pan_anchor = None;
        self.viewport.set_image(size);
        self.image = Some(Arc::new(image));
        self.last_error = None;
        self.status = format!("Loaded {}x{} image", size.width, size.height);
        info!(width = size.width, height = size.height, "Viewport image replaced");
        Ok(())
    }

    // -- Recognition --

    /// Recognize the whole image.
    pub fn recognize(&mut self) -> Result<RunId> {
        let image = self.image.clone().ok_or(OcrLensError::NoImage)?;
        let run = self.worker.submit(image, None)?;
        self.start_run(run);
        Ok(run)
    }

    /// Recognize only the selection rectangle.
    pub fn recognize_selection(&mut self) -> Result<RunId> {
        let image = self.image.clone().ok_or(OcrLensError::NoImage)?;
        let rect = self
            .selection
            .rect()
            .copied()
            .ok_or_else(|| OcrLensError::InvalidCrop("no selection".into()))?;
        let min = self.selection.limits().min_recognizable;
        if !rect.is_recognizable(min) {
            return Err(OcrLensError::InvalidCrop(format!(
                "selection {rect} is smaller than the {min}px minimum"
            )));
        }
        let crop = rect
            .to_crop_rect()
            .validated(image.width(), image.height())?;

        let run = self.worker.submit(image, Some(crop))?;
        self.start_run(run);
        Ok(run)
    }

    fn start_run(&mut self, run: RunId) {
        self.last_error = None;
        self.progress = Some(RunProgress {
            run,
            stage: ProgressStage::Initializing,
            percent: 0,
        });
        self.status = "Starting recognition".into();
    }

    /// Apply everything the worker has sent since the last call.
    ///
    /// Success replaces the box set wholesale and clears hover/selected
    /// indices. Failure keeps the previous boxes on screen.
    pub fn poll_worker(&mut self) -> Vec<WorkerEvent> {
        let events = self.worker.poll();
        for event in &events {
            self.apply_event(event);
        }
        events
    }

    /// Block until the in-flight run finishes, applying its events.
    pub fn wait_for_worker(&mut self) -> Vec<WorkerEvent> {
        let events = self.worker.wait();
        for event in &events {
            self.apply_event(event);
        }
        events
    }

    fn apply_event(&mut self, event: &WorkerEvent) {
        match &event.kind {
            WorkerEventKind::Progress(stage) => {
                self.progress = Some(RunProgress {
                    run: event.run,
                    stage: *stage,
                    percent: stage.percent(),
                });
                self.status = stage.to_string();
            }
            WorkerEventKind::Succeeded { boxes, crop, elapsed } => {
                self.boxes = boxes.clone();
                self.viewport.clear_indices();
                self.progress = Some(RunProgress {
                    run: event.run,
                    stage: ProgressStage::Finished,
                    percent: ProgressStage::Finished.percent(),
                });
                self.status = match crop {
                    Some(c) => format!(
                        "Found {} text regions in {}x{} selection ({:.1}s)",
                        boxes.len(),
                        c.width,
                        c.height,
                        elapsed.as_secs_f64()
                    ),
                    None => format!(
                        "Found {} text regions ({:.1}s)",
                        boxes.len(),
                        elapsed.as_secs_f64()
                    ),
                };
            }
            WorkerEventKind::Failed(message) => {
                self.progress = None;
                self.last_error = Some(message.clone());
                self.status = format!("Recognition failed: {message}");
            }
        }
    }

    // -- Selection mode --

    pub fn set_selection_mode(&mut self, enabled: bool) {
        self.selection.set_mode(enabled);
        if enabled {
            self.viewport.hover_index = None;
        }
        debug!(enabled, "selection mode");
    }

    /// Flip selection mode and return the new value.
    pub fn toggle_selection_mode(&mut self) -> bool {
        let enabled = !self.selection.is_active();
        self.set_selection_mode(enabled);
        enabled
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -- Zoom --

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom_reset(&mut self) {
        self.viewport.zoom_reset();
    }

    // -- Input --

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Resized { width, height } => {
                self.viewport.set_viewport_size(width, height);
            }
            InputEvent::PointerPressed { pos, button } => self.on_press(pos, button),
            InputEvent::PointerMoved(pos) => self.on_move(pos),
            InputEvent::PointerReleased { pos, button } => self.on_release(pos, button),
            InputEvent::PointerLeft => {
                self.pointer = None;
                self.viewport.hover_index = None;
            }
            InputEvent::Scroll { delta, pos } => {
                if self.image.is_some() && delta != 0.0 {
                    self.viewport
                        .zoom_at((delta * WHEEL_ZOOM_SENSITIVITY).exp(), pos);
                }
            }
            InputEvent::DoubleClick(_) => {
                if !self.selection.is_active() {
                    self.viewport.zoom_reset();
                }
            }
        }
    }

    fn on_press(&mut self, pos: Point, button: PointerButton) {
        self.pointer = Some(pos);
        let (Some(transform), Some(image)) = (self.viewport.transform(), self.image_dims()) else {
            return;
        };

        match button {
            PointerButton::Middle | PointerButton::Secondary => {
                self.pan_anchor = Some(pos);
            }
            PointerButton::Primary if self.selection.is_active() => {
                self.selection.begin_drag(pos, &transform, image);
            }
            PointerButton::Primary => {
                let hit = topmost_box_at(&self.boxes, transform.to_image(pos));
                self.viewport.selected_index = hit;
                debug!(?hit, "box click");
            }
        }
    }

    fn on_move(&mut self, pos: Point) {
        self.pointer = Some(pos);
        if let Some(anchor) = self.pan_anchor {
            self.viewport.pan_by(pos.x - anchor.x, pos.y - anchor.y);
            self.pan_anchor = Some(pos);
            return;
        }
        let (Some(transform), Some(image)) = (self.viewport.transform(), self.image_dims()) else {
            return;
        };

        if self.selection.is_dragging() {
            self.selection.update_drag(pos, &transform, image);
        } else if !self.selection.is_active() {
            self.viewport.hover_index = topmost_box_at(&self.boxes, transform.to_image(pos));
        }
    }

    fn on_release(&mut self, pos: Point, button: PointerButton) {
        self.pointer = Some(pos);
        match button {
            PointerButton::Middle | PointerButton::Secondary => self.pan_anchor = None,
            PointerButton::Primary => {
                if !self.selection.is_dragging() {
                    return;
                }
                if let (Some(transform), Some(image)) =
                    (self.viewport.transform(), self.image_dims())
                {
                    self.selection.update_drag(pos, &transform, image);
                    if let Some(rect) = self.selection.end_drag(image) {
                        debug!(%rect, "selection finished");
                    }
                }
            }
        }
    }

    /// Cursor shape for the last known pointer position.
    pub fn cursor(&self) -> CursorHint {
        if self.pan_anchor.is_some() {
            return CursorHint::Grabbing;
        }
        let (Some(pointer), Some(transform)) = (self.pointer, self.viewport.transform()) else {
            return CursorHint::Default;
        };

        if self.selection.is_active() {
            return match self.selection.gesture() {
                Some(DragGesture::Resizing { handle, .. }) => CursorHint::for_handle(*handle),
                Some(DragGesture::Moving { .. }) => CursorHint::Move,
                Some(DragGesture::Drawing { .. }) => CursorHint::Crosshair,
                None => match selection_hit(
                    self.selection.rect(),
                    &transform,
                    pointer,
                    self.selection.limits().handle_radius,
                ) {
                    SelectionHit::Handle(h) => CursorHint::for_handle(h),
                    SelectionHit::Body => CursorHint::Move,
                    SelectionHit::Outside => CursorHint::Crosshair,
                },
            };
        }

        if self.viewport.hover_index.is_some() {
            CursorHint::PointingHand
        } else {
            CursorHint::Default
        }
    }

    // -- Output --

    pub fn frame(&self) -> Vec<DrawCommand> {
        render(&self.boxes, &self.viewport, &self.selection)
    }

    pub fn selected_box(&self) -> Option<&TextBox> {
        self.viewport.selected_index.and_then(|i| self.boxes.get(i))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_box().map(|b| b.text.as_str())
    }

    pub fn all_text(&self) -> String {
        joined_text(&self.boxes)
    }

    /// Text for the side panel: the clicked box, or everything.
    pub fn display_text(&self) -> String {
        match self.selected_text() {
            Some(text) => text.to_owned(),
            None => self.all_text(),
        }
    }

    pub fn selection_rect(&self) -> Option<&SelectionRect> {
        self.selection.rect()
    }

    /// Whether [`ViewportController::recognize_selection`] would be accepted
    /// right now: an image, an idle worker and a large enough selection.
    pub fn can_recognize_selection(&self) -> bool {
        self.image.is_some() && !self.is_busy() && self.selection.recognizable_rect().is_some()
    }

    /// One-line summary: zoom, image size and selection.
    pub fn status_line(&self) -> String {
        let mut parts = vec![format!("Zoom {:.0}%", self.viewport.zoom() * 100.0)];
        if let Some(size) = self.image_dims() {
            parts.push(format!("{}x{}", size.width, size.height));
        }
        parts.push(format!("{} boxes", self.boxes.len()));
        if let Some(rect) = self.selection.rect() {
            parts.push(format!("Selection {rect}"));
        }
        parts.join(" | ")
    }
}
