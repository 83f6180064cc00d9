//! Host navigation for `TocApp`.
//!
//! Covers the in-app (single-page) navigations that keep the panel alive
//! (`new_chat`, `go_back`, `go_forward`, `submit_prompt`) and full page loads
//! through the snapshot loader, which attach a fresh scheduler.

use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use chat_toc::dom::parser::{render_conversation, HostMessage};
use chat_toc::dom::HostDocument;
use chat_toc::engine::HostEvent;
use chat_toc::net::{load_snapshot, Snapshot, SnapshotSource, DEFAULT_LOCATION};

use super::{build_scheduler, TocApp};

impl TocApp {
    pub fn location(&self) -> String {
        self.scheduler.document().location().to_string()
    }

    /// Go to whatever is in the address bar. Known conversations are
    /// switched to in place; anything else is a full page load.
    pub fn open_address(&mut self, ctx: &egui::Context) {
        let address = self.address.trim().to_string();
        if self.sessions.contains_key(&address) {
            self.push_history(&address);
            self.show_session(&address);
        } else {
            self.load_page(SnapshotSource::parse(&address), ctx);
        }
    }

    pub fn new_chat(&mut self) {
        self.sessions.entry(DEFAULT_LOCATION.to_string()).or_default().clear();
        self.push_history(DEFAULT_LOCATION);
        self.show_session(DEFAULT_LOCATION);
    }

    pub fn go_back(&mut self) {
        if self.history_idx > 0 {
            self.history_idx -= 1;
            self.pop_to(self.history[self.history_idx].clone());
        }
    }

    pub fn go_forward(&mut self) {
        if self.history_idx + 1 < self.history.len() {
            self.history_idx += 1;
            self.pop_to(self.history[self.history_idx].clone());
        }
    }

    /// Send the composer text as a new prompt, the way the host would:
    /// the first prompt of a fresh chat moves it to its own address.
    pub fn submit_prompt(&mut self) {
        let prompt = self.composer.trim().to_string();
        if prompt.is_empty() {
            return;
        }
        self.composer.clear();

        let mut location = self.location();
        if self.scheduler.monitor().session_id(&location).is_none() {
            let messages = self.sessions.remove(&location).unwrap_or_default();
            location = format!("{}c/local-{}", DEFAULT_LOCATION, self.next_chat);
            self.next_chat += 1;
            self.sessions.insert(location.clone(), messages);
            self.push_history(&location);
        }

        let messages = self.sessions.entry(location.clone()).or_default();
        messages.push(HostMessage { role: "user".into(), text: prompt.clone() });
        messages.push(HostMessage {
            role: "assistant".into(),
            text: format!("(simulated reply to {} characters)", prompt.chars().count()),
        });
        self.show_session(&location);
    }

    fn push_history(&mut self, location: &str) {
        if self.history.get(self.history_idx).map(String::as_str) != Some(location) {
            self.history.truncate(self.history_idx + 1);
            self.history.push(location.to_string());
            self.history_idx = self.history.len() - 1;
        }
    }

    /// Re-render the host for `location` as one structural change.
    fn show_session(&mut self, location: &str) {
        let html = self.render_session(location);
        self.address = location.to_string();
        self.scheduler.mutate_document(|doc| {
            doc.set_location(location);
            doc.set_html(&html);
        });
    }

    /// Back/forward: the address changes silently, then the host re-renders.
    fn pop_to(&mut self, location: String) {
        self.address = location.clone();
        self.scheduler.document_mut().set_location(&location);
        self.scheduler.handle_event(HostEvent::PopState);
        let html = self.render_session(&location);
        self.scheduler.mutate_document(|doc| doc.set_html(&html));
    }

    fn render_session(&self, location: &str) -> String {
        let messages = self.sessions.get(location).map(Vec::as_slice).unwrap_or(&[]);
        render_conversation(&self.title, messages)
    }

    // ─── Full page loads ─────────────────────────────────────────────────

    pub fn load_page(&mut self, source: SnapshotSource, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(load_snapshot(&source));
            ctx.request_repaint();
        });
    }

    /// Poll the loader channel and attach the page when it arrives.
    pub fn check_fetch(&mut self) {
        let Some(rx) = &self.fetch_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.loading = false;
        self.fetch_rx = None;
        match result {
            Ok(snapshot) => self.attach(snapshot),
            Err(e) => {
                log::warn!("Page load failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Replace the page: the old panel goes away with it and a new
    /// scheduler starts from its page-load delay.
    fn attach(&mut self, snapshot: Snapshot) {
        let scheduler =
            match build_scheduler(&snapshot, self.viewport, &self.state_path, self.runtime.as_ref()) {
                Ok(scheduler) => scheduler,
                Err(e) => {
                    self.error = Some(e.to_string());
                    return;
                }
            };
        self.scheduler.dispose();
        self.scheduler = scheduler;
        self.started = Instant::now();
        self.title = self.scheduler.document().title().to_string();
        self.sessions
            .insert(snapshot.location.clone(), self.scheduler.document().messages());
        self.push_history(&snapshot.location);
        self.address = snapshot.location;
        self.scroll_pending = false;
    }
}
