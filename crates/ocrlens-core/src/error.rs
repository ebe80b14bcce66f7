use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrLensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No image loaded")]
    NoImage,

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("Unexpected engine output: {0}")]
    EngineOutput(String),

    #[error("Engine output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A recognition run is already in progress")]
    Busy,
}

/// Coarse classification used by the UI to decide how an error is surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input. Reported, never retried.
    Input,
    /// The recognition call failed. Previous results stay on screen.
    Engine,
    /// Submission rejected because a run is in flight.
    Busy,
}

impl OcrLensError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_)
            | Self::ImageError(_)
            | Self::InvalidDimensions { .. }
            | Self::NoImage
            | Self::InvalidCrop(_)
            | Self::Config(_)
            | Self::ConfigParse(_) => ErrorKind::Input,
            Self::Engine(_) | Self::EngineOutput(_) | Self::Json(_) => ErrorKind::Engine,
            Self::Busy => ErrorKind::Busy,
        }
    }
}

pub type Result<T> = std::result::Result<T, OcrLensError>;
