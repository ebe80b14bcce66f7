use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use ocrlens_core::config::AppConfig;
use ocrlens_core::controller::ViewportController;
use ocrlens_core::engine::CommandEngine;
use ocrlens_core::error::{ErrorKind, OcrLensError};
use ocrlens_core::worker::WorkerEventKind;

use crate::convert::rgb_to_color_image;
use crate::loader;
use crate::messages::LoaderResult;
use crate::panels;
use crate::states::UIState;

pub struct OcrLensApp {
    pub controller: ViewportController,
    pub loader_tx: mpsc::Sender<LoaderResult>,
    pub loader_rx: mpsc::Receiver<LoaderResult>,
    pub texture: Option<egui::TextureHandle>,
    pub ui_state: UIState,
}

impl OcrLensApp {
    pub fn new(ctx: &egui::Context, config: &AppConfig, initial: Option<PathBuf>) -> Self {
        let (loader_tx, loader_rx) = mpsc::channel();
        let engine = Arc::new(CommandEngine::from_config(&config.engine));
        let repaint_ctx = ctx.clone();
        let controller = ViewportController::new(engine, config)
            .with_waker(Arc::new(move || repaint_ctx.request_repaint()));

        let mut app = Self {
            controller,
            loader_tx,
            loader_rx,
            texture: None,
            ui_state: UIState::default(),
        };
        app.ui_state.add_log(format!(
            "OCR engine: {} ({}, {} / {})",
            config.engine.program,
            config.engine.language,
            config.engine.detection_model,
            config.engine.recognition_model
        ));
        if let Some(path) = initial {
            app.load_path(ctx, path);
        }
        app
    }

    pub fn open_file(&mut self, ctx: &egui::Context) {
        loader::open_dialog(self.loader_tx.clone(), ctx.clone());
    }

    pub fn load_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        self.ui_state.loading = true;
        loader::load_path(path, self.loader_tx.clone(), ctx.clone());
    }

    pub fn recognize(&mut self) {
        let result = self.controller.recognize();
        self.report_submit(result, "Recognizing full image");
    }

    pub fn recognize_selection(&mut self) {
        let summary = self
            .controller
            .selection_rect()
            .map(|r| format!("Recognizing selection {r}"))
            .unwrap_or_default();
        let result = self.controller.recognize_selection();
        self.report_submit(result, &summary);
    }

    fn report_submit(&mut self, result: Result<u64, OcrLensError>, started: &str) {
        match result {
            Ok(run) => self.ui_state.add_log(format!("{started} (run {run})")),
            Err(e) => {
                let prefix = match e.kind() {
                    ErrorKind::Busy => "BUSY",
                    ErrorKind::Input => "INVALID",
                    ErrorKind::Engine => "ERROR",
                };
                self.ui_state.add_log(format!("{prefix}: {e}"));
            }
        }
    }

    /// Drain pending loader results and apply worker events.
    fn poll_results(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.loader_rx.try_recv() {
            self.ui_state.loading = false;
            match result {
                LoaderResult::ImageLoaded { path, image } => match self.controller.load_image(image) {
                    Ok(()) => {
                        self.update_viewport_texture(ctx);
                        self.ui_state
                            .add_log(format!("Opened: {}", path.display()));
                        self.ui_state.file_path = Some(path);
                    }
                    Err(e) => self.ui_state.add_log(format!("ERROR: {e}")),
                },
                LoaderResult::LoadFailed { path, message } => {
                    tracing::warn!(path = %path.display(), "Image load failed");
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
            }
        }

        for event in self.controller.poll_worker() {
            match event.kind {
                WorkerEventKind::Progress(_) => {}
                WorkerEventKind::Succeeded { boxes, elapsed, .. } => {
                    self.ui_state.add_log(format!(
                        "Found {} text regions in {}",
                        boxes.len(),
                        format_duration(elapsed)
                    ));
                }
                WorkerEventKind::Failed(message) => {
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
            }
        }
    }

    fn update_viewport_texture(&mut self, ctx: &egui::Context) {
        let Some(image) = self.controller.image() else {
            self.texture = None;
            return;
        };
        let texture = ctx.load_texture(
            "viewport",
            rgb_to_color_image(image),
            egui::TextureOptions::LINEAR,
        );
        self.texture = Some(texture);
    }
}

impl eframe::App for OcrLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results(ctx);

        panels::menu_bar::show(ctx, self);
        panels::toolbar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::text::show(ctx, self);
        panels::viewport::show(ctx, self);

        if self.ui_state.show_about {
            egui::Window::new("About ocrlens")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("ocrlens");
                        ui.label("Image text recognition viewer");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.ui_state.show_about = false;
                        }
                    });
                });
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        format!("{:.1}min", secs / 60.0)
    }
}
