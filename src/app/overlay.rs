//! The floating panel for `TocApp`.
//!
//! Placement comes entirely from the panel model: the area is drawn at
//! `Panel::rect()` and never moved by egui itself. Header presses are read
//! from raw pointer input and handed to the scheduler, which decides
//! between drag and toggle on release.

use eframe::egui;

use chat_toc::config::{
    COLLAPSED_SIZE, DRAG_HANDLE_TITLE, HEADER_HEIGHT, PANEL_ID, PANEL_TITLE, SEARCH_CLEAR_TITLE,
    SEARCH_INPUT_ID, SEARCH_PLACEHOLDER, TOGGLE_TITLE, TOGGLE_WIDTH,
};
use chat_toc::panel::Point;

use super::TocApp;

impl TocApp {
    pub fn draw_panel(&mut self, ctx: &egui::Context) {
        self.forward_pointer(ctx);

        let Some(panel) = self.scheduler.panel() else {
            return;
        };
        let rect = panel.rect();
        let collapsed = panel.is_collapsed();
        let opacity = panel
            .style()
            .get("opacity")
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(1.0);
        let (_, max_height) = panel.expanded_size();
        let entries: Vec<(String, String, bool)> = panel
            .entries()
            .iter()
            .map(|e| (e.label(), e.full_text.clone(), e.visible))
            .collect();
        let mut search_text = panel.search_box().value.clone();
        let clear_visible = panel.search_box().clear_visible;
        let wants_focus = panel.search_box().focused;

        let mut activated = None;
        let mut search_changed = false;
        let mut clear_clicked = false;

        let shown = egui::Area::new(egui::Id::new(PANEL_ID))
            .fixed_pos(egui::pos2(rect.x as f32, rect.y as f32))
            .order(egui::Order::Foreground)
            .movable(false)
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if collapsed {
                        ui.set_min_size(egui::vec2(COLLAPSED_SIZE as f32 - 12.0, COLLAPSED_SIZE as f32 - 12.0));
                        ui.centered_and_justified(|ui| {
                            ui.label(egui::RichText::new("\u{2630}").size(20.0))
                                .on_hover_text(TOGGLE_TITLE);
                        });
                        return;
                    }

                    ui.set_width(rect.width as f32 - 12.0);
                    ui.allocate_ui_with_layout(
                        egui::vec2(ui.available_width(), HEADER_HEIGHT as f32 - 12.0),
                        egui::Layout::left_to_right(egui::Align::Center),
                        |ui| {
                            ui.label("\u{22EE}\u{22EE}").on_hover_text(DRAG_HANDLE_TITLE);
                            ui.strong(PANEL_TITLE);
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.set_max_width(TOGGLE_WIDTH as f32);
                                ui.label("\u{2212}").on_hover_text(TOGGLE_TITLE);
                            });
                        },
                    );

                    ui.horizontal(|ui| {
                        let search = ui.add(
                            egui::TextEdit::singleline(&mut search_text)
                                .id_salt(SEARCH_INPUT_ID)
                                .hint_text(SEARCH_PLACEHOLDER)
                                .desired_width(ui.available_width() - 24.0),
                        );
                        if wants_focus {
                            search.request_focus();
                        }
                        search_changed = search.changed();
                        if clear_visible
                            && ui
                                .small_button("\u{2715}")
                                .on_hover_text(SEARCH_CLEAR_TITLE)
                                .clicked()
                        {
                            clear_clicked = true;
                        }
                    });
                    ui.separator();

                    let list_height = max_height as f32 - HEADER_HEIGHT as f32 - 40.0;
                    egui::ScrollArea::vertical()
                        .max_height(list_height.max(0.0))
                        .show(ui, |ui| {
                            for (index, (label, full_text, visible)) in entries.iter().enumerate() {
                                if !visible {
                                    continue;
                                }
                                let entry = ui
                                    .add(egui::Label::new(label).truncate().sense(egui::Sense::click()))
                                    .on_hover_text(full_text);
                                if entry.clicked() {
                                    activated = Some(index);
                                }
                            }
                        });
                });
            });

        if !collapsed {
            let size = shown.response.rect.size();
            if let Some(panel) = self.scheduler.panel_mut() {
                panel.set_measured_size(size.x as f64, size.y as f64);
                panel.search_box_mut().focused = false;
            }
        }
        if clear_clicked {
            self.scheduler.clear_search();
        } else if search_changed {
            self.scheduler.search_input(&search_text);
        }
        if let Some(index) = activated {
            self.scroll_pending = self.scheduler.activate_entry(index);
        }
    }

    /// Raw press, motion and release, as the host page would deliver them.
    fn forward_pointer(&mut self, ctx: &egui::Context) {
        let (pressed, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });

        if let Some(pos) = pos {
            let pointer = Point::new(pos.x as f64, pos.y as f64);
            if pressed {
                let target = self.scheduler.panel().and_then(|panel| panel.hit_test(pointer));
                if let Some(target) = target {
                    let outcome = self.scheduler.pointer_down(pointer, target);
                    log::debug!("Press on {:?}: {:?}", target, outcome);
                }
            } else if self.scheduler.is_dragging() {
                self.scheduler.pointer_move(pointer);
            }
        }

        if released && self.scheduler.is_dragging() {
            let outcome = self.scheduler.pointer_up();
            log::debug!("Release: {:?}", outcome);
        }
    }
}
