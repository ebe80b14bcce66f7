use serde::Serialize;

use crate::geometry::Quad;

/// One recognized text region in image-space pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBox {
    pub polygon: Quad,
    pub text: String,
    /// Recognition confidence in [0.0, 1.0].
    pub confidence: f32,
}

impl TextBox {
    pub fn new(polygon: Quad, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            polygon: self.polygon.translated(dx, dy),
            text: self.text.clone(),
            confidence: self.confidence,
        }
    }
}

/// All recognized text, one box per line, in recognition order.
pub fn joined_text(boxes: &[TextBox]) -> String {
    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
