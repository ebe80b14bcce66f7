//! Off-thread file dialogs and image decoding.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Context;
use image::RgbImage;
use ocrlens_core::io::image_io::load_image;

use crate::messages::LoaderResult;

/// Show the open dialog on a helper thread, then decode the chosen file.
pub fn open_dialog(tx: mpsc::Sender<LoaderResult>, ctx: egui::Context) {
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            load_into(path, &tx, &ctx);
        }
    });
}

/// Decode `path` on a helper thread.
pub fn load_path(path: PathBuf, tx: mpsc::Sender<LoaderResult>, ctx: egui::Context) {
    std::thread::Builder::new()
        .name("ocrlens-loader".into())
        .spawn(move || load_into(path, &tx, &ctx))
        .expect("Failed to spawn loader thread");
}

fn load_into(path: PathBuf, tx: &mpsc::Sender<LoaderResult>, ctx: &egui::Context) {
    let result = match decode(&path) {
        Ok(image) => LoaderResult::ImageLoaded { path, image },
        Err(e) => LoaderResult::LoadFailed {
            message: format!("{e:#}"),
            path,
        },
    };
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn decode(path: &Path) -> anyhow::Result<RgbImage> {
    load_image(path).with_context(|| format!("Failed to open {}", path.display()))
}
