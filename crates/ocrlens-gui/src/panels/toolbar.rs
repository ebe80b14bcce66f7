use crate::app::OcrLensApp;

pub fn show(ctx: &egui::Context, app: &mut OcrLensApp) {
    let has_image = app.controller.image().is_some();
    let busy = app.controller.is_busy();

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!app.ui_state.loading, egui::Button::new("Open"))
                .clicked()
            {
                app.open_file(ctx);
            }

            ui.separator();

            if ui
                .add_enabled(has_image && !busy, egui::Button::new("Recognize"))
                .on_hover_text("Run OCR on the whole image")
                .clicked()
            {
                app.recognize();
            }

            let selecting = app.controller.selection().is_active();
            if ui
                .add_enabled(has_image, egui::Button::new("Select Region").selected(selecting))
                .on_hover_text("Drag on the image to choose a region")
                .clicked()
            {
                app.controller.toggle_selection_mode();
            }

            if selecting {
                if ui
                    .add_enabled(
                        app.controller.can_recognize_selection(),
                        egui::Button::new("Process Selection"),
                    )
                    .clicked()
                {
                    app.recognize_selection();
                }
                if ui
                    .add_enabled(app.controller.selection_rect().is_some(), egui::Button::new("Clear"))
                    .clicked()
                {
                    app.controller.clear_selection();
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_enabled_ui(has_image, |ui| {
                    if ui.button("Fit").clicked() {
                        app.controller.zoom_reset();
                    }
                    if ui.button("+").clicked() {
                        app.controller.zoom_in();
                    }
                    ui.label(format!("{:.0}%", app.controller.viewport().zoom() * 100.0));
                    if ui.button("-").clicked() {
                        app.controller.zoom_out();
                    }
                });
            });
        });
    });
}
