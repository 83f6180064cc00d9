//! Host page rendering for `TocApp`: the conversation and the composer.

use eframe::egui;

use chat_toc::config::{SEND_BUTTON_SELECTOR, USER_MESSAGE_SELECTOR};
use chat_toc::dom::HostDocument;
use chat_toc::engine::HostEvent;

use super::TocApp;

impl TocApp {
    pub fn draw_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - 70.0, 28.0],
                    egui::TextEdit::singleline(&mut self.composer).hint_text("Message ChatGPT"),
                );
                let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let send = ui.add_enabled(
                    !self.composer.trim().is_empty(),
                    egui::Button::new("Send").min_size(egui::vec2(60.0, 28.0)),
                );
                if send.clicked() {
                    self.click_send();
                }
                if entered {
                    self.submit_prompt();
                    response.request_focus();
                }
                self.composer_focused = response.has_focus();
            });
            ui.add_space(6.0);
        });
    }

    /// A click on the host's submit control, then the host's own handling.
    fn click_send(&mut self) {
        let target = self
            .scheduler
            .document()
            .query_all(SEND_BUTTON_SELECTOR)
            .first()
            .copied();
        if let Some(target) = target {
            self.scheduler.handle_event(HostEvent::Click { target });
        }
        self.submit_prompt();
    }

    pub fn draw_conversation(&mut self, ctx: &egui::Context) {
        let doc = self.scheduler.document();
        // Host-side index of the element the panel last scrolled to.
        let scroll_target = doc.scrolled_to().and_then(|node| {
            doc.query_all(USER_MESSAGE_SELECTOR)
                .iter()
                .position(|n| *n == node)
        });
        let messages = doc.messages();
        let title = self.title.clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(title);
            ui.separator();
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                let mut user_index = 0;
                for message in &messages {
                    let is_user = message.role == "user";
                    let layout = if is_user {
                        egui::Layout::top_down(egui::Align::Max)
                    } else {
                        egui::Layout::top_down(egui::Align::Min)
                    };
                    ui.with_layout(layout, |ui| {
                        let fill = if is_user {
                            ui.visuals().faint_bg_color
                        } else {
                            egui::Color32::TRANSPARENT
                        };
                        let frame = egui::Frame::none()
                            .fill(fill)
                            .rounding(12.0)
                            .inner_margin(egui::Margin::symmetric(12.0, 8.0));
                        let response = frame
                            .show(ui, |ui| {
                                ui.set_max_width(ui.available_width() * 0.7);
                                ui.label(&message.text);
                            })
                            .response;
                        if is_user {
                            if self.scroll_pending && scroll_target == Some(user_index) {
                                response.scroll_to_me(Some(egui::Align::Center));
                                self.scroll_pending = false;
                            }
                            user_index += 1;
                        }
                    });
                    ui.add_space(8.0);
                }
                if messages.is_empty() {
                    ui.weak("What can I help with?");
                }
            });
        });
    }
}
