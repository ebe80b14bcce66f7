use std::path::PathBuf;

use image::RgbImage;

/// Results sent from loader threads back to the UI thread.
pub enum LoaderResult {
    ImageLoaded { path: PathBuf, image: RgbImage },
    LoadFailed { path: PathBuf, message: String },
}
