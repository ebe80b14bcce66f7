use crate::app::OcrLensApp;
use crate::panels::section_header;

pub fn show(ctx: &egui::Context, app: &mut OcrLensApp) {
    egui::SidePanel::right("text_panel")
        .default_width(320.0)
        .min_width(220.0)
        .show(ctx, |ui| {
            let count = app.controller.boxes().len();
            let header = if app.controller.selected_box().is_some() {
                "Selected text"
            } else {
                "Recognized text"
            };
            section_header(ui, header, Some(&format!("{count} regions")));

            if let Some(b) = app.controller.selected_box() {
                ui.small(format!("Confidence: {:.1}%", b.confidence * 100.0));
            }
            ui.separator();

            let text = app.controller.display_text();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!text.is_empty(), egui::Button::new("Copy"))
                    .clicked()
                {
                    ctx.copy_text(text.clone());
                    app.ui_state.add_log(format!("Copied {} characters", text.chars().count()));
                }
            });

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if text.is_empty() {
                        ui.label(
                            egui::RichText::new("Run recognition to see text here")
                                .color(egui::Color32::from_gray(120)),
                        );
                    } else {
                        ui.add(
                            egui::TextEdit::multiline(&mut text.as_str())
                                .desired_width(f32::INFINITY)
                                .code_editor(),
                        );
                    }
                });
        });
}
