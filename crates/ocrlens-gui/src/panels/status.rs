use crate::app::OcrLensApp;

pub fn show(ctx: &egui::Context, app: &mut OcrLensApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Progress bar
        if let Some(progress) = app.controller.progress() {
            let running = app.controller.is_busy();
            let text = if running {
                format!("{}... {}%", progress.stage, progress.percent)
            } else {
                format!("{} {}%", progress.stage, progress.percent)
            };
            ui.add(
                egui::ProgressBar::new(progress.percent as f32 / 100.0)
                    .text(text)
                    .animate(running),
            );
        } else if app.ui_state.loading {
            ui.add(egui::ProgressBar::new(0.0).text("Loading image...").animate(true));
        } else {
            // Invisible placeholder, same height
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }

        // Log area: fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            if let Some(path) = &app.ui_state.file_path {
                if let Some(name) = path.file_name() {
                    ui.label(name.to_string_lossy());
                    ui.separator();
                }
            }
            ui.label(app.controller.status_line());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(err) = app.controller.last_error() {
                    ui.colored_label(egui::Color32::from_rgb(230, 90, 90), err);
                } else {
                    ui.label(app.controller.status());
                }
            });
        });

        ui.add_space(2.0);
    });
}
