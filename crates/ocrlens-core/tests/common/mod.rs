#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};

use image::{Rgb, RgbImage};

use ocrlens_core::engine::{OcrEngine, RawOcrOutput};
use ocrlens_core::error::{OcrLensError, Result};
use ocrlens_core::geometry::{Point, Quad};
use ocrlens_core::text_box::TextBox;

/// Legacy-shaped engine output with two words on one line.
pub const LEGACY_TWO_WORDS: &str = r#"[
    [[[10, 10], [60, 10], [60, 30], [10, 30]], ["hello", 0.98]],
    [[[70, 10], [120, 10], [120, 30], [70, 30]], ["world", 0.91]]
]"#;

/// Structured-shaped engine output wrapped in a page list.
pub const STRUCTURED_PAGE: &str = r#"[{
    "dt_polys": [
        [[5, 5], [45, 5], [45, 25], [5, 25]],
        [[5, 40], [80, 40], [80, 60], [5, 60]]
    ],
    "rec_texts": ["Total", "42.00"],
    "rec_scores": [0.99, 0.87]
}]"#;

/// Axis-aligned 100x100 box at the origin.
pub fn unit_square_box() -> TextBox {
    TextBox::new(Quad::from_rect(0.0, 0.0, 100.0, 100.0), "square", 0.9)
}

pub fn rect_box(x: f64, y: f64, w: f64, h: f64, text: &str) -> TextBox {
    TextBox::new(Quad::from_rect(x, y, w, h), text, 0.9)
}

/// Square with side `2 * half` around `center`, rotated by `degrees`.
pub fn rotated_square(center: Point, half: f64, degrees: f64) -> Quad {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
    Quad(corners.map(|(dx, dy)| {
        Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
    }))
}

/// Horizontal gradient so crops can be told apart.
pub fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Engine replaying scripted responses: `Ok(json)` or `Err(message)`.
/// The last response repeats once the script runs out.
///
/// A gated engine blocks inside `recognize` until the paired sender fires or
/// is dropped, which lets tests observe the worker while a run is in flight.
pub struct MockEngine {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    pub calls: Mutex<Vec<(u32, u32)>>,
    pub prepare_calls: Mutex<usize>,
}

impl MockEngine {
    pub fn scripted(responses: Vec<std::result::Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_owned).map_err(str::to_owned))
                    .collect(),
            ),
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            prepare_calls: Mutex::new(0),
        }
    }

    pub fn returning(json: &str) -> Self {
        Self::scripted(vec![Ok(json)])
    }

    pub fn failing(message: &str) -> Self {
        Self::scripted(vec![Err(message)])
    }

    pub fn gated(json: &str) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let engine = Self {
            gate: Mutex::new(Some(rx)),
            ..Self::returning(json)
        };
        (engine, tx)
    }

    pub fn recorded_calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> std::result::Result<String, String> {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        }
    }
}

impl OcrEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn prepare(&self) -> Result<()> {
        *self.prepare_calls.lock().unwrap() += 1;
        Ok(())
    }

    fn recognize(&self, image: &RgbImage) -> Result<RawOcrOutput> {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            let _ = gate.recv();
        }
        self.calls
            .lock()
            .unwrap()
            .push((image.width(), image.height()));
        match self.next_response() {
            Ok(json) => RawOcrOutput::from_json(json.as_bytes()),
            Err(message) => Err(OcrLensError::Engine(message)),
        }
    }
}
