//! `TocApp`: a desktop stand-in for the host chat page with the panel on top.
//!
//! This module declares the app state and the per-frame driver. Drawing and
//! host simulation are split across the sibling sub-modules:
//!
//! - `navigation`: loading snapshots, sessions, back/forward
//! - `toolbar`: address bar and runtime messaging request
//! - `content`: conversation view and composer
//! - `overlay`: the floating panel and raw pointer forwarding

pub mod content;
pub mod navigation;
pub mod overlay;
pub mod toolbar;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use chat_toc::config::{ContractError, HostContract, PANEL_ID, PROMPT_TEXTAREA_ID};
use chat_toc::dom::parser::{parse_html, HostMessage};
use chat_toc::dom::{HostDocument, SnapshotDocument, Viewport};
use chat_toc::engine::{HostEvent, RenderScheduler};
use chat_toc::messaging::ExtensionRuntime;
use chat_toc::net::{Snapshot, SnapshotError};
use chat_toc::panel::position::PositionStore;
use chat_toc::storage::FileStorage;

use crate::LocalRuntime;

// ─── Application state ───────────────────────────────────────────────────────

pub struct TocApp {
    pub scheduler: RenderScheduler<SnapshotDocument>,
    pub runtime: Option<LocalRuntime>,
    pub state_path: PathBuf,
    pub started: Instant,
    pub viewport: Viewport,
    // Simulated host
    pub title: String,
    pub sessions: HashMap<String, Vec<HostMessage>>,
    pub history: Vec<String>,
    pub history_idx: usize,
    pub next_chat: u32,
    pub address: String,
    pub composer: String,
    pub composer_focused: bool,
    pub scroll_pending: bool,
    // Loading
    pub loading: bool,
    pub fetch_rx: Option<mpsc::Receiver<Result<Snapshot, SnapshotError>>>,
    pub error: Option<String>,
    // Messaging
    pub last_response: Option<String>,
}

impl TocApp {
    pub fn new(
        ctx: &egui::Context,
        snapshot: Snapshot,
        state_path: PathBuf,
        runtime: Option<LocalRuntime>,
    ) -> Result<Self, ContractError> {
        let size = ctx.screen_rect().size();
        let viewport = if size.x > 0.0 && size.y > 0.0 {
            Viewport::new(size.x as f64, size.y as f64)
        } else {
            Viewport::default()
        };
        let scheduler = build_scheduler(&snapshot, viewport, &state_path, runtime.as_ref())?;
        let mut sessions = HashMap::new();
        sessions.insert(snapshot.location.clone(), scheduler.document().messages());

        Ok(Self {
            title: scheduler.document().title().to_string(),
            address: snapshot.location.clone(),
            history: vec![snapshot.location],
            scheduler,
            runtime,
            state_path,
            started: Instant::now(),
            viewport,
            sessions,
            history_idx: 0,
            next_chat: 1,
            composer: String::new(),
            composer_focused: false,
            scroll_pending: false,
            loading: false,
            fetch_rx: None,
            error: None,
            last_response: None,
        })
    }

    /// Forward window-level input the host page would see as DOM events.
    fn forward_host_events(&mut self, ctx: &egui::Context) {
        let screen = ctx.screen_rect().size();
        let viewport = Viewport::new(screen.x as f64, screen.y as f64);
        if viewport != self.viewport && viewport.width > 0.0 && viewport.height > 0.0 {
            self.viewport = viewport;
            self.scheduler.document_mut().set_viewport(viewport);
            self.scheduler.handle_event(HostEvent::Resize);
        }

        let focused = self
            .composer_focused
            .then(|| self.scheduler.document().element_by_id(PROMPT_TEXTAREA_ID))
            .flatten();
        self.scheduler.document_mut().focus(focused);

        let keys: Vec<String> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, .. } => Some(key.name().to_string()),
                    _ => None,
                })
                .collect()
        });
        for key in keys {
            self.scheduler.handle_event(HostEvent::KeyDown { key });
        }
    }
}

pub fn build_scheduler(
    snapshot: &Snapshot,
    viewport: Viewport,
    state_path: &std::path::Path,
    runtime: Option<&LocalRuntime>,
) -> Result<RenderScheduler<SnapshotDocument>, ContractError> {
    let mut doc = parse_html(&snapshot.html, &snapshot.location);
    doc.set_viewport(viewport);
    let store = PositionStore::new(Box::new(FileStorage::new(state_path)));
    let runtime = runtime.map(|rt| rt as &dyn ExtensionRuntime);
    let mut scheduler = RenderScheduler::new(doc, store, HostContract::default(), runtime)?;
    scheduler.start();
    log::info!("Host page {} attached", snapshot.location);
    Ok(scheduler)
}

impl eframe::App for TocApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_fetch();
        self.forward_host_events(ctx);

        let now = self.started.elapsed();
        for trigger in self.scheduler.tick(now) {
            log::debug!("Rebuilt panel ({:?})", trigger);
        }
        if let Some(due) = self.scheduler.next_due() {
            ctx.request_repaint_after(due.saturating_sub(now));
        }

        self.draw_toolbar(ctx);
        self.draw_composer(ctx);
        self.draw_conversation(ctx);
        if self.scheduler.document().has_overlay(PANEL_ID) {
            self.draw_panel(ctx);
        }
    }
}
