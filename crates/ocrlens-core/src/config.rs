use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_DETECTION_MODEL, DEFAULT_ENGINE_PROGRAM, DEFAULT_HANDLE_RADIUS, DEFAULT_LANGUAGE,
    DEFAULT_MAX_ZOOM, DEFAULT_MIN_RECOGNIZABLE_SELECTION, DEFAULT_MIN_SELECTION_EXTENT,
    DEFAULT_MIN_ZOOM, DEFAULT_RECOGNITION_MODEL, DEFAULT_ZOOM_STEP,
};
use crate::error::{OcrLensError, Result};
use crate::selection::SelectionLimits;
use crate::viewport::ZoomLimits;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier per zoom-in step (> 1).
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Handle grab radius in screen pixels.
    pub handle_radius: f64,
    pub min_extent: f64,
    /// Smallest width/height (image pixels) accepted for recognition.
    pub min_recognizable: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            handle_radius: DEFAULT_HANDLE_RADIUS,
            min_extent: DEFAULT_MIN_SELECTION_EXTENT,
            min_recognizable: DEFAULT_MIN_RECOGNIZABLE_SELECTION,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// External OCR program invoked once per recognition run.
    pub program: String,
    /// Extra arguments placed before the generated flags.
    pub args: Vec<String>,
    pub language: String,
    pub detection_model: String,
    pub recognition_model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ENGINE_PROGRAM.into(),
            args: Vec::new(),
            language: DEFAULT_LANGUAGE.into(),
            detection_model: DEFAULT_DETECTION_MODEL.into(),
            recognition_model: DEFAULT_RECOGNITION_MODEL.into(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| OcrLensError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.viewport;
        if !(v.min_zoom > 0.0 && v.max_zoom.is_finite()) {
            return Err(OcrLensError::Config(format!(
                "zoom limits must be positive and finite, got {}..{}",
                v.min_zoom, v.max_zoom
            )));
        }
        if v.min_zoom > v.max_zoom {
            return Err(OcrLensError::Config(format!(
                "min_zoom {} exceeds max_zoom {}",
                v.min_zoom, v.max_zoom
            )));
        }
        if !(v.zoom_step > 1.0) {
            return Err(OcrLensError::Config(format!(
                "zoom_step must be greater than 1, got {}",
                v.zoom_step
            )));
        }

        let s = &self.selection;
        if !(s.handle_radius > 0.0 && s.min_extent > 0.0) {
            return Err(OcrLensError::Config(
                "handle_radius and min_extent must be positive".into(),
            ));
        }
        if s.min_recognizable < s.min_extent {
            return Err(OcrLensError::Config(format!(
                "min_recognizable {} is below min_extent {}",
                s.min_recognizable, s.min_extent
            )));
        }

        if self.engine.program.trim().is_empty() {
            return Err(OcrLensError::Config("engine program is empty".into()));
        }
        Ok(())
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min_zoom: self.viewport.min_zoom,
            max_zoom: self.viewport.max_zoom,
            step: self.viewport.zoom_step,
        }
    }

    pub fn selection_limits(&self) -> SelectionLimits {
        SelectionLimits {
            handle_radius: self.selection.handle_radius,
            min_extent: self.selection.min_extent,
            min_recognizable: self.selection.min_recognizable,
        }
    }
}
