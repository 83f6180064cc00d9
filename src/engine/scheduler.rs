//! Top-level orchestration: when to rebuild, and the rebuild itself.
//!
//! The scheduler owns the single panel instance and everything attached to
//! it. Rebuilds are destroy-then-create: the old panel, its search state and
//! any drag in progress are dropped before the new instance exists, and the
//! whole sequence runs inside one call, so no callback ever sees a
//! half-built panel.
//!
//! Time only moves when the host calls [`RenderScheduler::tick`]. Every
//! trigger enqueues a rebuild on its own FIFO lane with a fixed delay;
//! nothing is coalesced or cancelled. Due rebuilds run in due-time order,
//! ties going to whichever was scheduled first.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use crate::config::{
    ContractError, HostContract, CHAT_CHANGE_DELAY, COLLAPSE_BREAKPOINT, ENTER_KEY_DELAY,
    PAGE_LOAD_DELAY, PANEL_ID, PROMPT_SUBMISSION_DELAY,
};
use crate::dom::{HostDocument, NodeId};
use crate::messaging::{ExtensionRuntime, MessageRouter};
use crate::panel::clamp::constrain_to_viewport;
use crate::panel::drag::{DragCollapseController, DragOutcome};
use crate::panel::position::PositionStore;
use crate::panel::search::SearchIndex;
use crate::panel::{HeaderTarget, Panel, Point};

use super::extract::ContentExtractor;
use super::monitor::ChangeMonitor;

/// Why a rebuild was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trigger {
    PageLoad,
    Navigation,
    Submit,
    ConfirmKey,
}

impl Trigger {
    pub fn delay(self) -> Duration {
        match self {
            Trigger::PageLoad => PAGE_LOAD_DELAY,
            Trigger::Navigation => CHAT_CHANGE_DELAY,
            Trigger::Submit => PROMPT_SUBMISSION_DELAY,
            Trigger::ConfirmKey => ENTER_KEY_DELAY,
        }
    }
}

/// Raw notifications from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Load,
    PageShow,
    /// Back/forward navigation.
    PopState,
    /// Structural change anywhere in the page.
    Mutation,
    /// The viewport changed size; the new size is read from the host.
    Resize,
    Click { target: NodeId },
    KeyDown { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRebuild {
    due: Duration,
    seq: u64,
}

/// One serialized lane of pending rebuilds per trigger kind.
#[derive(Debug, Default)]
struct TimerQueue {
    lanes: BTreeMap<Trigger, VecDeque<PendingRebuild>>,
    next_seq: u64,
}

impl TimerQueue {
    fn schedule(&mut self, trigger: Trigger, now: Duration) -> Duration {
        let due = now + trigger.delay();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.lanes
            .entry(trigger)
            .or_default()
            .push_back(PendingRebuild { due, seq });
        due
    }

    /// Earliest lane head due at or before `now`.
    fn pop_due(&mut self, now: Duration) -> Option<Trigger> {
        let trigger = self
            .lanes
            .iter()
            .filter_map(|(trigger, lane)| lane.front().map(|p| (*trigger, *p)))
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(trigger, _)| trigger)?;
        self.lanes.get_mut(&trigger)?.pop_front();
        Some(trigger)
    }

    fn next_due(&self) -> Option<Duration> {
        self.lanes.values().filter_map(|lane| lane.front()).map(|p| p.due).min()
    }

    fn len(&self) -> usize {
        self.lanes.values().map(VecDeque::len).sum()
    }

    fn pending(&self, trigger: Trigger) -> usize {
        self.lanes.get(&trigger).map_or(0, VecDeque::len)
    }

    fn clear(&mut self) {
        self.lanes.clear();
    }
}

pub struct RenderScheduler<D: HostDocument> {
    doc: D,
    contract: HostContract,
    extractor: ContentExtractor,
    monitor: ChangeMonitor,
    store: PositionStore,
    router: MessageRouter,
    panel: Option<Panel>,
    search: SearchIndex,
    drag: DragCollapseController,
    timers: TimerQueue,
    now: Duration,
    serial: u64,
    rebuilds: u64,
}

impl<D: HostDocument> RenderScheduler<D> {
    pub fn new(
        doc: D,
        store: PositionStore,
        contract: HostContract,
        runtime: Option<&dyn ExtensionRuntime>,
    ) -> Result<Self, ContractError> {
        contract.validate()?;
        let monitor = ChangeMonitor::new(&contract)?;
        Ok(Self {
            extractor: ContentExtractor::new(&contract),
            router: MessageRouter::register(runtime),
            doc,
            contract,
            monitor,
            store,
            panel: None,
            search: SearchIndex::new(),
            drag: DragCollapseController::new(),
            timers: TimerQueue::default(),
            now: Duration::ZERO,
            serial: 0,
            rebuilds: 0,
        })
    }

    /// Begin monitoring and schedule the initial, page-load-delayed build.
    pub fn start(&mut self) {
        self.monitor.init(self.doc.location());
        self.schedule(Trigger::PageLoad);
    }

    /// Tear everything down: monitor, pending rebuilds and the panel.
    pub fn dispose(&mut self) {
        self.monitor.dispose();
        self.timers.clear();
        self.remove_panel();
    }

    // ─── Time ────────────────────────────────────────────────────────────

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Advance the clock to `now` and run every rebuild that fell due,
    /// returning their triggers in execution order. Time never goes back.
    pub fn tick(&mut self, now: Duration) -> Vec<Trigger> {
        self.now = self.now.max(now);
        let mut ran = Vec::new();
        while let Some(trigger) = self.timers.pop_due(self.now) {
            log::debug!("Rebuild due ({:?})", trigger);
            self.rebuild();
            ran.push(trigger);
        }
        ran
    }

    pub fn schedule(&mut self, trigger: Trigger) -> Duration {
        let due = self.timers.schedule(trigger, self.now);
        log::debug!("Scheduled {:?} rebuild at {:?}", trigger, due);
        due
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_for(&self, trigger: Trigger) -> usize {
        self.timers.pending(trigger)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    // ─── Rebuild ─────────────────────────────────────────────────────────

    /// Replace the panel with one built from the live host content.
    ///
    /// Returns false when the host has no prompts; no panel exists then.
    /// Collapse state carries over from the previous instance; the viewport
    /// breakpoint only decides it for the first one.
    pub fn rebuild(&mut self) -> bool {
        let prior = self
            .panel
            .as_ref()
            .map(|panel| (panel.is_collapsed(), panel.expanded_width()));
        self.remove_panel();

        let items = self.extractor.extract(&self.doc);
        if items.is_empty() {
            log::debug!("No questions found, not creating TOC");
            return false;
        }

        let viewport = self.doc.viewport();
        self.serial += 1;
        let mut panel = Panel::build(self.serial, &items, viewport);
        self.extractor.assign_anchors(&mut self.doc, &items);
        self.search.set_items(items.iter().map(|item| item.display_text.as_str()));

        match prior {
            Some((collapsed, expanded_width)) => {
                panel.set_collapsed(collapsed);
                if let Some(width) = expanded_width {
                    panel.record_expanded_width(width);
                }
            }
            None if viewport.width <= COLLAPSE_BREAKPOINT => panel.set_collapsed(true),
            None => {}
        }
        if let Some(saved) = self.store.load() {
            let rect = panel.rect();
            let fitted = constrain_to_viewport(saved.x, saved.y, rect.width, rect.height, viewport);
            if fitted != saved {
                log::debug!("Saved position ({}, {}) refitted to ({}, {})", saved.x, saved.y, fitted.x, fitted.y);
            }
            panel.apply_position(fitted.x, fitted.y);
        }

        self.doc.append_overlay(PANEL_ID);
        self.panel = Some(panel);
        self.rebuilds += 1;
        log::info!("TOC created with {} entries", items.len());
        true
    }

    fn remove_panel(&mut self) {
        if self.doc.remove_overlay(PANEL_ID) {
            log::debug!("Removed previous TOC instance");
        }
        self.panel = None;
        self.search = SearchIndex::new();
        self.drag = DragCollapseController::new();
    }

    /// Number of rebuilds that produced a panel.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    // ─── Host events ─────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Load | HostEvent::PageShow => {
                self.schedule(Trigger::PageLoad);
            }
            HostEvent::Mutation => {
                if self.monitor.on_mutation(self.doc.location()).is_some() {
                    self.schedule(Trigger::Navigation);
                }
            }
            HostEvent::PopState => {
                if self.monitor.on_history(self.doc.location()).is_some() {
                    self.schedule(Trigger::Navigation);
                }
            }
            HostEvent::Resize => self.handle_resize(),
            HostEvent::Click { target } => {
                if self
                    .doc
                    .closest(target, &self.contract.send_button_selector)
                    .is_some()
                {
                    self.schedule(Trigger::Submit);
                }
            }
            HostEvent::KeyDown { key } => {
                let in_composer = self.doc.active_element_id().as_deref()
                    == Some(self.contract.prompt_textarea_id.as_str());
                if key == "Enter" && in_composer {
                    self.schedule(Trigger::ConfirmKey);
                }
            }
        }
    }

    /// Apply a change to the host tree and report it as a mutation.
    pub fn mutate_document(&mut self, change: impl FnOnce(&mut D)) {
        change(&mut self.doc);
        self.handle_event(HostEvent::Mutation);
    }

    fn handle_resize(&mut self) {
        let viewport = self.doc.viewport();
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        panel.set_viewport(viewport);
        let rect = panel.rect();
        let fitted = constrain_to_viewport(rect.x, rect.y, rect.width, rect.height, viewport);
        if fitted != rect.origin() {
            panel.apply_position(fitted.x, fitted.y);
            self.store.save(fitted.x, fitted.y);
            log::debug!("Panel refitted to ({}, {})", fitted.x, fitted.y);
        }
    }

    // ─── Panel interaction ───────────────────────────────────────────────

    pub fn pointer_down(&mut self, pointer: Point, target: HeaderTarget) -> DragOutcome {
        match self.panel.as_mut() {
            Some(panel) => self.drag.pointer_down(panel, pointer, target),
            None => DragOutcome::Ignored,
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) -> DragOutcome {
        let viewport = self.doc.viewport();
        match self.panel.as_mut() {
            Some(panel) => self.drag.pointer_move(panel, pointer, viewport),
            None => DragOutcome::Ignored,
        }
    }

    pub fn pointer_up(&mut self) -> DragOutcome {
        let viewport = self.doc.viewport();
        match self.panel.as_mut() {
            Some(panel) => self.drag.pointer_up(panel, &mut self.store, viewport),
            None => DragOutcome::Ignored,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.session().is_some()
    }

    pub fn search_input(&mut self, term: &str) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        panel.set_visibility(self.search.filter(term));
        let search_box = panel.search_box_mut();
        search_box.value = term.to_string();
        search_box.clear_visible = self.search.clear_visible();
    }

    pub fn clear_search(&mut self) {
        self.search_input("");
        if let Some(panel) = self.panel.as_mut() {
            panel.search_box_mut().focused = true;
        }
    }

    /// Scroll the host element behind entry `index` into view.
    pub fn activate_entry(&mut self, index: usize) -> bool {
        let Some(anchor) = self
            .panel
            .as_ref()
            .and_then(|panel| panel.entries().get(index))
            .map(|entry| entry.anchor_id.clone())
        else {
            return false;
        };
        match self.doc.element_by_id(&anchor) {
            Some(node) => {
                self.doc.scroll_into_view(node);
                true
            }
            None => {
                log::debug!("Anchor {} no longer in the page", anchor);
                false
            }
        }
    }

    // ─── Messaging ───────────────────────────────────────────────────────

    /// Answer a runtime message from the current host content.
    pub fn handle_message(&self, raw: &str) -> Option<String> {
        self.router
            .handle_json(raw, || self.extractor.queries(&self.doc))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut Panel> {
        self.panel.as_mut()
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Direct host access. Changes made here are not reported as
    /// mutations; use [`Self::mutate_document`] for that.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn monitor(&self) -> &ChangeMonitor {
        &self.monitor
    }

    pub fn position_store(&self) -> &PositionStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::{parse_html, render_conversation, HostMessage};
    use crate::dom::{SnapshotDocument, Viewport};
    use crate::messaging::ExtensionRuntime;
    use crate::storage::{KeyValueStorage, MemoryStorage};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn conversation(prompts: &[&str]) -> String {
        let messages: Vec<_> = prompts
            .iter()
            .flat_map(|p| {
                [
                    HostMessage { role: "user".into(), text: p.to_string() },
                    HostMessage { role: "assistant".into(), text: format!("re: {}", p) },
                ]
            })
            .collect();
        render_conversation("Chat", &messages)
    }

    fn scheduler_with(prompts: &[&str], store: PositionStore) -> RenderScheduler<SnapshotDocument> {
        let mut doc = parse_html(&conversation(prompts), "https://chatgpt.com/c/one");
        doc.set_viewport(Viewport::new(1280.0, 800.0));
        RenderScheduler::new(doc, store, HostContract::default(), None).unwrap()
    }

    fn scheduler(prompts: &[&str]) -> RenderScheduler<SnapshotDocument> {
        scheduler_with(prompts, PositionStore::new(Box::new(MemoryStorage::new())))
    }

    fn labels(s: &RenderScheduler<SnapshotDocument>) -> Vec<String> {
        s.panel().unwrap().entries().iter().map(|e| e.label()).collect()
    }

    #[test]
    fn initial_build_waits_for_page_load_delay() {
        let mut s = scheduler(&["alpha", "beta"]);
        s.start();
        assert!(s.tick(ms(2999)).is_empty());
        assert!(s.panel().is_none());
        assert_eq!(s.tick(ms(3000)), [Trigger::PageLoad]);
        assert_eq!(labels(&s), ["1. alpha", "2. beta"]);
        assert!(s.document().has_overlay(PANEL_ID));
        assert!(s.document().element_by_id("toc-question-1").is_some());
    }

    #[test]
    fn load_and_pageshow_use_page_load_delay() {
        let mut s = scheduler(&["alpha"]);
        s.tick(ms(500));
        s.handle_event(HostEvent::Load);
        s.handle_event(HostEvent::PageShow);
        assert_eq!(s.pending_for(Trigger::PageLoad), 2);
        assert_eq!(s.next_due(), Some(ms(3500)));
    }

    #[test]
    fn empty_host_builds_nothing() {
        let mut s = scheduler(&[]);
        assert!(!s.rebuild());
        assert!(s.panel().is_none());
        assert!(s.document().overlays().is_empty());
        assert_eq!(s.rebuild_count(), 0);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut s = scheduler(&["alpha", "beta", "gamma"]);
        assert!(s.rebuild());
        let first = labels(&s);
        let first_serial = s.panel().unwrap().serial();
        assert!(s.rebuild());
        assert_eq!(labels(&s), first);
        assert!(s.panel().unwrap().serial() > first_serial);
        assert_eq!(s.document().overlays(), [PANEL_ID.to_string()]);
    }

    #[test]
    fn rebuild_removes_panel_when_content_disappears() {
        let mut s = scheduler(&["alpha"]);
        s.rebuild();
        s.document_mut().set_html(&conversation(&[]));
        assert!(!s.rebuild());
        assert!(s.panel().is_none());
        assert!(!s.document().has_overlay(PANEL_ID));
    }

    #[test]
    fn triggers_are_not_coalesced() {
        let mut s = scheduler(&["alpha"]);
        let send = s.document().query_all(r#"[data-testid="send-button"]"#)[0];
        s.handle_event(HostEvent::Click { target: send });
        s.tick(ms(50));
        s.handle_event(HostEvent::Click { target: send });
        assert_eq!(s.pending_for(Trigger::Submit), 2);
        assert_eq!(s.tick(ms(200)), [Trigger::Submit, Trigger::Submit]);
        assert_eq!(s.rebuild_count(), 2);
    }

    #[test]
    fn due_rebuilds_run_in_due_order() {
        let mut s = scheduler(&["alpha"]);
        s.schedule(Trigger::Navigation);
        s.schedule(Trigger::Submit);
        s.schedule(Trigger::ConfirmKey);
        assert_eq!(s.next_due(), Some(ms(80)));
        assert_eq!(
            s.tick(ms(5000)),
            [Trigger::ConfirmKey, Trigger::Submit, Trigger::Navigation]
        );
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut s = scheduler(&["alpha"]);
        s.tick(ms(500));
        s.tick(ms(100));
        assert_eq!(s.now(), ms(500));
        assert_eq!(s.schedule(Trigger::Submit), ms(600));
    }

    #[test]
    fn click_inside_send_button_schedules_submit() {
        let mut s = scheduler(&["alpha"]);
        let send = s.document().query_all(r#"[data-testid="send-button"]"#)[0];
        let inner = s.document().query_all(r#"[data-testid="send-button"] span"#)[0];
        let textarea = s.document().element_by_id("prompt-textarea").unwrap();
        s.handle_event(HostEvent::Click { target: textarea });
        assert_eq!(s.pending(), 0);
        s.handle_event(HostEvent::Click { target: inner });
        s.handle_event(HostEvent::Click { target: send });
        assert_eq!(s.pending_for(Trigger::Submit), 2);
    }

    #[test]
    fn enter_only_counts_in_composer() {
        let mut s = scheduler(&["alpha"]);
        s.handle_event(HostEvent::KeyDown { key: "Enter".into() });
        assert_eq!(s.pending(), 0);

        let textarea = s.document().element_by_id("prompt-textarea");
        s.document_mut().focus(textarea);
        s.handle_event(HostEvent::KeyDown { key: "a".into() });
        assert_eq!(s.pending(), 0);
        s.handle_event(HostEvent::KeyDown { key: "Enter".into() });
        assert_eq!(s.pending_for(Trigger::ConfirmKey), 1);
        assert_eq!(s.next_due(), Some(ms(80)));
    }

    #[test]
    fn navigation_schedules_chat_change_rebuild() {
        let mut s = scheduler(&["alpha"]);
        s.start();
        s.mutate_document(|d| d.set_html(&conversation(&["alpha", "streaming..."])));
        assert_eq!(s.pending_for(Trigger::Navigation), 0);

        s.mutate_document(|d| {
            d.set_location("https://chatgpt.com/c/two");
            d.set_html(&conversation(&["other chat"]));
        });
        assert_eq!(s.pending_for(Trigger::Navigation), 1);
        assert_eq!(s.tick(ms(1000)), [Trigger::Navigation]);
        assert_eq!(labels(&s), ["1. other chat"]);
    }

    #[test]
    fn popstate_catches_silent_address_change() {
        let mut s = scheduler(&["alpha"]);
        s.start();
        s.document_mut().set_location("https://chatgpt.com/c/back");
        s.handle_event(HostEvent::PopState);
        assert_eq!(s.pending_for(Trigger::Navigation), 1);
        s.handle_event(HostEvent::PopState);
        assert_eq!(s.pending_for(Trigger::Navigation), 1);
    }

    #[test]
    fn stale_rebuild_still_fires_against_live_content() {
        let mut s = scheduler(&["alpha"]);
        s.start();
        s.document_mut().set_html(&conversation(&["x", "y"]));
        assert_eq!(s.tick(ms(3000)), [Trigger::PageLoad]);
        assert_eq!(labels(&s), ["1. x", "2. y"]);
    }

    #[test]
    fn saved_position_and_narrow_viewport_apply_on_build() {
        let mut mem = MemoryStorage::new();
        mem.set_item(crate::config::STORAGE_KEY, r#"{"x":40,"y":60}"#).unwrap();
        let mut s = scheduler_with(&["alpha"], PositionStore::new(Box::new(mem)));
        s.document_mut().set_viewport(Viewport::new(1024.0, 700.0));
        s.rebuild();
        let panel = s.panel().unwrap();
        assert!(panel.is_collapsed());
        assert_eq!(panel.position(), Some(Point::new(40.0, 60.0)));
    }

    #[test]
    fn wide_viewport_starts_expanded_at_default_anchor() {
        let mut s = scheduler(&["alpha"]);
        s.rebuild();
        let panel = s.panel().unwrap();
        assert!(!panel.is_collapsed());
        assert_eq!(panel.position(), None);
        assert_eq!(panel.rect().x, 1280.0 - 300.0 - 20.0);
    }

    #[test]
    fn resize_refits_and_persists() {
        let mut s = scheduler(&["alpha"]);
        s.rebuild();
        s.pointer_down(Point::new(1000.0, 90.0), HeaderTarget::Handle);
        s.pointer_move(Point::new(1200.0, 90.0));
        s.pointer_up();
        let before = s.panel().unwrap().rect();
        assert_eq!(before.x, 1280.0 - 300.0 - 10.0);

        s.document_mut().set_viewport(Viewport::new(1100.0, 800.0));
        s.handle_event(HostEvent::Resize);
        let after = s.panel().unwrap().position().unwrap();
        assert_eq!(after.x, 1100.0 - 300.0 - 10.0);
        assert_eq!(s.position_store().load(), Some(after));
    }

    #[test]
    fn resize_inside_bounds_does_not_persist() {
        let mut s = scheduler(&["alpha"]);
        s.rebuild();
        s.document_mut().set_viewport(Viewport::new(1400.0, 900.0));
        s.handle_event(HostEvent::Resize);
        assert_eq!(s.position_store().load(), None);
    }

    #[test]
    fn rebuild_discards_drag_and_search_state() {
        let mut s = scheduler(&["Hello world", "Goodbye", "hello again"]);
        s.rebuild();
        s.search_input("hello");
        let visible: Vec<_> = s.panel().unwrap().entries().iter().map(|e| e.visible).collect();
        assert_eq!(visible, [true, false, true]);
        s.pointer_down(Point::new(1000.0, 90.0), HeaderTarget::Handle);
        assert!(s.is_dragging());

        s.rebuild();
        assert!(!s.is_dragging());
        let panel = s.panel().unwrap();
        assert!(panel.entries().iter().all(|e| e.visible));
        assert_eq!(panel.search_box().value, "");
        assert!(!panel.is_lifted());
    }

    #[test]
    fn clearing_search_shows_all_and_focuses() {
        let mut s = scheduler(&["Hello world", "Goodbye", "hello again"]);
        s.rebuild();
        s.search_input("bye");
        assert!(s.panel().unwrap().search_box().clear_visible);
        s.clear_search();
        let panel = s.panel().unwrap();
        assert!(panel.entries().iter().all(|e| e.visible));
        assert!(!panel.search_box().clear_visible);
        assert!(panel.search_box().focused);
    }

    #[test]
    fn toggle_click_through_scheduler_collapses_and_persists() {
        let mut s = scheduler(&["alpha"]);
        s.rebuild();
        let x = s.panel().unwrap().rect().x;
        s.pointer_down(Point::new(1250.0, 90.0), HeaderTarget::Toggle);
        let out = s.pointer_up();
        assert!(matches!(out, DragOutcome::Toggled { collapsed: true, .. }));
        assert_eq!(s.position_store().load(), Some(Point::new(x + 300.0 - 48.0, 80.0)));
    }

    #[test]
    fn collapsed_panel_stays_collapsed_and_on_screen_across_rebuilds() {
        let mut s = scheduler(&["alpha", "beta"]);
        s.rebuild();
        s.pointer_down(Point::new(1250.0, 90.0), HeaderTarget::Toggle);
        s.pointer_up();
        let collapsed_at = s.position_store().load().unwrap();

        for round in 0..2 {
            s.rebuild();
            let panel = s.panel().unwrap();
            assert!(panel.is_collapsed(), "rebuild {}", round);
            assert_eq!(panel.expanded_width(), Some(300.0));
            let rect = panel.rect();
            assert_eq!(rect.origin(), collapsed_at);
            assert!(rect.x >= 0.0 && rect.x + rect.width <= 1280.0, "{:?}", rect);
            assert!(rect.y >= 0.0 && rect.y + rect.height <= 800.0, "{:?}", rect);
        }
        assert_eq!(s.rebuild_count(), 3);

        // Expanding after the rebuilds restores the recorded width.
        let rect = s.panel().unwrap().rect();
        s.pointer_down(Point::new(rect.x + 10.0, rect.y + 10.0), HeaderTarget::Toggle);
        s.pointer_up();
        let panel = s.panel().unwrap();
        assert!(!panel.is_collapsed());
        assert_eq!(panel.rect().x, collapsed_at.x - (300.0 - 48.0));
    }

    #[test]
    fn expanded_panel_on_narrow_viewport_is_not_recollapsed() {
        let mut s = scheduler(&["alpha"]);
        s.document_mut().set_viewport(Viewport::new(1024.0, 700.0));
        s.rebuild();
        assert!(s.panel().unwrap().is_collapsed());
        let rect = s.panel().unwrap().rect();
        s.pointer_down(Point::new(rect.x + 10.0, rect.y + 10.0), HeaderTarget::Toggle);
        s.pointer_up();
        assert!(!s.panel().unwrap().is_collapsed());

        s.rebuild();
        s.rebuild();
        let panel = s.panel().unwrap();
        assert!(!panel.is_collapsed());
        let rect = panel.rect();
        assert!(rect.x >= 10.0 && rect.x + rect.width <= 1024.0 - 10.0, "{:?}", rect);
    }

    #[test]
    fn saved_position_is_refitted_to_the_built_panel() {
        let mut mem = MemoryStorage::new();
        // Collapsed x from an earlier session; the fresh panel is expanded.
        mem.set_item(crate::config::STORAGE_KEY, r#"{"x":1212,"y":80}"#).unwrap();
        let mut s = scheduler_with(&["alpha"], PositionStore::new(Box::new(mem)));
        s.rebuild();
        let panel = s.panel().unwrap();
        assert!(!panel.is_collapsed());
        assert_eq!(panel.position(), Some(Point::new(1280.0 - 300.0 - 10.0, 80.0)));

        let mut mem = MemoryStorage::new();
        mem.set_item(crate::config::STORAGE_KEY, r#"{"x":-50,"y":5000}"#).unwrap();
        let mut s = scheduler_with(&["alpha"], PositionStore::new(Box::new(mem)));
        s.rebuild();
        let rect = s.panel().unwrap().rect();
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, 800.0 - rect.height - 10.0);
    }

    #[test]
    fn pointer_without_panel_is_ignored() {
        let mut s = scheduler(&[]);
        assert_eq!(s.pointer_down(Point::new(0.0, 0.0), HeaderTarget::Toggle), DragOutcome::Ignored);
        assert_eq!(s.pointer_up(), DragOutcome::Ignored);
    }

    #[test]
    fn activating_entry_scrolls_host() {
        let mut s = scheduler(&["alpha", "beta"]);
        s.rebuild();
        assert!(s.activate_entry(1));
        let target = s.document().element_by_id("toc-question-1");
        assert_eq!(s.document().scrolled_to(), target);
        assert!(!s.activate_entry(7));

        // Host re-rendered without telling us: anchors are gone.
        s.document_mut().set_html(&conversation(&["alpha", "beta"]));
        assert!(!s.activate_entry(0));
    }

    #[test]
    fn messaging_follows_runtime_capability() {
        struct Runtime;
        impl ExtensionRuntime for Runtime {
            fn name(&self) -> &str {
                "runtime"
            }
        }
        let request = r#"{"action":"getQueries"}"#;

        let silent = scheduler(&["alpha"]);
        assert_eq!(silent.handle_message(request), None);

        let doc = parse_html(&conversation(&["alpha", "beta"]), "https://chatgpt.com/c/x");
        let s = RenderScheduler::new(
            doc,
            PositionStore::unavailable(),
            HostContract::default(),
            Some(&Runtime),
        )
        .unwrap();
        assert_eq!(s.handle_message(request).as_deref(), Some(r#"{"queries":["alpha","beta"]}"#));
    }

    #[test]
    fn invalid_contract_is_rejected() {
        let doc = parse_html("<html></html>", "https://chatgpt.com/");
        let contract = HostContract {
            session_pattern: "(".into(),
            ..HostContract::default()
        };
        assert!(RenderScheduler::new(doc, PositionStore::unavailable(), contract, None).is_err());
    }

    #[test]
    fn dispose_drops_panel_and_pending_work() {
        let mut s = scheduler(&["alpha"]);
        s.start();
        s.rebuild();
        s.dispose();
        assert!(s.panel().is_none());
        assert_eq!(s.pending(), 0);
        assert!(!s.monitor().is_active());
        assert!(s.tick(ms(10_000)).is_empty());
    }
}
