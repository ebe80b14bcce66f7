//! Boundary to the external OCR engine.
//!
//! Engines report results in one of two JSON shapes:
//!
//! - legacy: `[[polygon, [text, confidence]], ...]`
//! - structured: `{"dt_polys": [...], "rec_texts": [...], "rec_scores": [...]}`
//!
//! either bare or wrapped in a per-page list. [`normalize`] turns any of them
//! into `Vec<TextBox>` before results reach the rest of the crate.

use std::fmt;
use std::process::Command;

use image::RgbImage;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{OcrLensError, Result};
use crate::geometry::{Point, Quad};
use crate::io::image_io::save_png;
use crate::text_box::TextBox;

/// Something that turns an image into raw OCR output.
///
/// Implementations are called from the worker thread only.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// One-time model setup. Runs on the worker thread before the first
    /// recognition so slow initialization never blocks the UI.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn recognize(&self, image: &RgbImage) -> Result<RawOcrOutput>;
}

/// `[text, confidence]` or a bare `text`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LegacyText {
    Scored(String, f64),
    Text(String),
}

/// `[polygon, text_info, ...]`. Trailing elements some engine builds append
/// are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyDetection(pub Vec<[f64; 2]>, pub LegacyText);

impl<'de> Deserialize<'de> for LegacyDetection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DetectionVisitor;

        impl<'de> Visitor<'de> for DetectionVisitor {
            type Value = LegacyDetection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a [polygon, text] detection")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let polygon = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let text = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(LegacyDetection(polygon, text))
            }
        }

        deserializer.deserialize_seq(DetectionVisitor)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct StructuredPage {
    #[serde(default)]
    pub dt_polys: Vec<Vec<[f64; 2]>>,
    #[serde(default, alias = "rec_text")]
    pub rec_texts: Vec<String>,
    #[serde(default, alias = "rec_score")]
    pub rec_scores: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawPage {
    Legacy(Vec<Option<LegacyDetection>>),
    Structured(StructuredPage),
}

/// Engine output before normalization.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawOcrOutput {
    Page(RawPage),
    /// Per-page list; only the first page is used and `null` means no text.
    Pages(Vec<Option<RawPage>>),
}

impl RawOcrOutput {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(OcrLensError::EngineOutput("engine produced no output".into()));
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Convert either engine shape into the canonical box list.
///
/// Polygons with exactly four points are kept as-is. Other point counts are
/// replaced by their bounding quad. Entries without a polygon cannot be hit
/// tested and are dropped.
pub fn normalize(raw: RawOcrOutput) -> Vec<TextBox> {
    let page = match raw {
        RawOcrOutput::Page(p) => Some(p),
        RawOcrOutput::Pages(pages) => pages.into_iter().next().flatten(),
    };

    let boxes = match page {
        None => Vec::new(),
        Some(RawPage::Legacy(dets)) => normalize_legacy(dets),
        Some(RawPage::Structured(page)) => normalize_structured(page),
    };
    debug!(count = boxes.len(), "Engine output normalized");
    boxes
}

fn normalize_legacy(dets: Vec<Option<LegacyDetection>>) -> Vec<TextBox> {
    dets.into_iter()
        .enumerate()
        .filter_map(|(idx, det)| {
            let LegacyDetection(points, text) = det?;
            let (text, score) = match text {
                LegacyText::Scored(t, s) => (t, s),
                LegacyText::Text(t) => (t, 0.0),
            };
            make_box(idx, &points, text, score)
        })
        .collect()
}

fn normalize_structured(page: StructuredPage) -> Vec<TextBox> {
    page.rec_texts
        .into_iter()
        .enumerate()
        .filter_map(|(idx, text)| {
            let score = page.rec_scores.get(idx).copied().unwrap_or(0.0);
            let points = page.dt_polys.get(idx).map(Vec::as_slice).unwrap_or(&[]);
            make_box(idx, points, text, score)
        })
        .collect()
}

fn make_box(idx: usize, points: &[[f64; 2]], text: String, score: f64) -> Option<TextBox> {
    let Some(polygon) = quad_from_points(points) else {
        warn!(index = idx, text = %text, "Dropping engine entry without a polygon");
        return None;
    };
    let confidence = if score.is_finite() { score as f32 } else { 0.0 };
    Some(TextBox::new(polygon, text, confidence))
}

fn quad_from_points(points: &[[f64; 2]]) -> Option<Quad> {
    match points {
        [] => None,
        [a, b, c, d] => Some(Quad([a, b, c, d].map(|p| Point::new(p[0], p[1])))),
        _ => {
            let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
            let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for p in points {
                min_x = min_x.min(p[0]);
                min_y = min_y.min(p[1]);
                max_x = max_x.max(p[0]);
                max_y = max_y.max(p[1]);
            }
            Some(Quad::from_rect(min_x, min_y, max_x - min_x, max_y - min_y))
        }
    }
}

/// Runs an external OCR program and reads its JSON from stdout.
///
/// Invocation: `<program> <args...> --lang <l> --det-model <d> --rec-model <r> <image.png>`.
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    language: String,
    detection_model: String,
    recognition_model: String,
}

impl CommandEngine {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            language: config.language.clone(),
            detection_model: config.detection_model.clone(),
            recognition_model: config.recognition_model.clone(),
        }
    }
}

impl OcrEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(&self, image: &RgbImage) -> Result<RawOcrOutput> {
        let input = tempfile::Builder::new()
            .prefix("ocrlens-")
            .suffix(".png")
            .tempfile()?;
        save_png(image, input.path())?;

        info!(program = %self.program, "Invoking OCR engine");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--lang")
            .arg(&self.language)
            .arg("--det-model")
            .arg(&self.detection_model)
            .arg("--rec-model")
            .arg(&self.recognition_model)
            .arg(input.path())
            .output()
            .map_err(|e| OcrLensError::Engine(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrLensError::Engine(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        RawOcrOutput::from_json(&output.stdout)
    }
}
