//! Toolbar rendering for `TocApp`.
//!
//! Draws the address bar, back/forward and new-chat buttons, and a button
//! that sends `getQueries` through the message router.

use eframe::egui;

use super::TocApp;

const GET_QUERIES: &str = r#"{"action":"getQueries"}"#;

impl TocApp {
    pub fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(4.0);

                let can_back = self.history_idx > 0;
                let can_fwd = self.history_idx + 1 < self.history.len();
                if ui
                    .add_enabled(can_back, egui::Button::new("\u{25C0}").min_size(egui::vec2(28.0, 24.0)))
                    .clicked()
                {
                    self.go_back();
                }
                if ui
                    .add_enabled(can_fwd, egui::Button::new("\u{25B6}").min_size(egui::vec2(28.0, 24.0)))
                    .clicked()
                {
                    self.go_forward();
                }

                let response = ui.add_sized(
                    [ui.available_width() - 260.0, 24.0],
                    egui::TextEdit::singleline(&mut self.address)
                        .hint_text("Snapshot file or URL...")
                        .font(egui::TextStyle::Monospace),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    self.open_address(ctx);
                }
                if ui.add_enabled(!self.loading, egui::Button::new("Go")).clicked() {
                    self.open_address(ctx);
                }
                if ui.button("New chat").clicked() {
                    self.new_chat();
                }
                if ui.button("getQueries").clicked() {
                    self.last_response = Some(
                        self.scheduler
                            .handle_message(GET_QUERIES)
                            .unwrap_or_else(|| "(no response)".to_string()),
                    );
                }
                if self.loading {
                    ui.spinner();
                }
            });

            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::from_rgb(255, 80, 80), error);
            }
            if let Some(response) = self.last_response.clone() {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(response).monospace().small());
                    if ui.small_button("\u{2715}").clicked() {
                        self.last_response = None;
                    }
                });
            }
        });
    }
}
