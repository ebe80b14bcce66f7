use crate::app::OcrLensApp;

const OPEN: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
const QUIT: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
const RECOGNIZE: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::R);
const SELECT_MODE: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::E);
const ZOOM_IN: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Plus);
const ZOOM_OUT: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Minus);
const ZOOM_FIT: egui::KeyboardShortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Num0);

pub fn show(ctx: &egui::Context, app: &mut OcrLensApp) {
    let has_image = app.controller.image().is_some();
    let busy = app.controller.is_busy();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.add(egui::Button::new("Open...").shortcut_text(ctx.format_shortcut(&OPEN))).clicked() {
                    ui.close();
                    app.open_file(ctx);
                }

                ui.separator();

                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&QUIT))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui
                    .add_enabled(has_image, egui::Button::new("Zoom In").shortcut_text(ctx.format_shortcut(&ZOOM_IN)))
                    .clicked()
                {
                    ui.close();
                    app.controller.zoom_in();
                }
                if ui
                    .add_enabled(has_image, egui::Button::new("Zoom Out").shortcut_text(ctx.format_shortcut(&ZOOM_OUT)))
                    .clicked()
                {
                    ui.close();
                    app.controller.zoom_out();
                }
                if ui
                    .add_enabled(has_image, egui::Button::new("Fit to Window").shortcut_text(ctx.format_shortcut(&ZOOM_FIT)))
                    .clicked()
                {
                    ui.close();
                    app.controller.zoom_reset();
                }
            });

            ui.menu_button("OCR", |ui| {
                if ui
                    .add_enabled(
                        has_image && !busy,
                        egui::Button::new("Recognize Image").shortcut_text(ctx.format_shortcut(&RECOGNIZE)),
                    )
                    .clicked()
                {
                    ui.close();
                    app.recognize();
                }

                ui.separator();

                let mut selecting = app.controller.selection().is_active();
                if ui
                    .add_enabled(
                        has_image,
                        egui::Checkbox::new(&mut selecting, "Region Selection Mode"),
                    )
                    .changed()
                {
                    ui.close();
                    app.controller.set_selection_mode(selecting);
                }

                let has_selection = app.controller.selection_rect().is_some();
                if ui
                    .add_enabled(
                        app.controller.can_recognize_selection(),
                        egui::Button::new("Recognize Selection"),
                    )
                    .clicked()
                {
                    ui.close();
                    app.recognize_selection();
                }
                if ui
                    .add_enabled(has_selection, egui::Button::new("Clear Selection"))
                    .clicked()
                {
                    ui.close();
                    app.controller.clear_selection();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.ui_state.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&OPEN)) {
            app.open_file(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&QUIT)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&RECOGNIZE)) && has_image {
            app.recognize();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SELECT_MODE)) && has_image {
            let enabled = app.controller.toggle_selection_mode();
            app.ui_state.add_log(format!(
                "Region selection {}",
                if enabled { "enabled" } else { "disabled" }
            ));
        }
        if ctx.input_mut(|i| i.consume_shortcut(&ZOOM_IN)) {
            app.controller.zoom_in();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&ZOOM_OUT)) {
            app.controller.zoom_out();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&ZOOM_FIT)) {
            app.controller.zoom_reset();
        }
        if ctx.input_mut(|i| i.key_pressed(egui::Key::Escape)) && app.controller.selection().is_active() {
            app.controller.clear_selection();
        }
    });
}
