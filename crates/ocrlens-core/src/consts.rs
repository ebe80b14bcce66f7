/// Multiplier applied per zoom-in step (divisor per zoom-out step).
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Smallest zoom relative to fit-to-window.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Largest zoom relative to fit-to-window.
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Floor for the viewport/image scale factor when the viewport collapses to zero.
pub const SCALE_EPSILON: f64 = 1e-6;

/// Selection handle grab radius in viewport pixels. Independent of zoom.
pub const DEFAULT_HANDLE_RADIUS: f64 = 6.0;

/// Side length of the painted handle markers in viewport pixels.
pub const HANDLE_MARKER_SIZE: f64 = 10.0;

/// Smallest width/height (image pixels) a selection can be dragged down to.
pub const DEFAULT_MIN_SELECTION_EXTENT: f64 = 4.0;

/// Smallest width/height (image pixels) a selection must have to be recognized.
pub const DEFAULT_MIN_RECOGNIZABLE_SELECTION: f64 = 20.0;

/// Wheel delta to zoom factor: `factor = exp(delta * WHEEL_ZOOM_SENSITIVITY)`.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.005;

/// On-screen size above which the selection size label is drawn.
pub const SIZE_LABEL_MIN_WIDTH: f64 = 60.0;
pub const SIZE_LABEL_MIN_HEIGHT: f64 = 30.0;

pub const DEFAULT_DETECTION_MODEL: &str = "PP-OCRv4_mobile_det";
pub const DEFAULT_RECOGNITION_MODEL: &str = "en_PP-OCRv4_mobile_rec";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Program invoked by the subprocess engine unless configured otherwise.
pub const DEFAULT_ENGINE_PROGRAM: &str = "paddleocr-json";

/// Default config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "ocrlens.toml";
