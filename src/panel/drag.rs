//! Drag vs. click interpretation for the panel header.
//!
//! Both gestures start on the same control: a press on the toggle may turn
//! into a drag, so nothing is decided until release. Only the absence of
//! movement past [`DRAG_THRESHOLD`] makes a toggle press a click.
//!
//! ```text
//!   Idle ──down──▶ Armed ──move ≥ threshold──▶ Dragging
//!    ▲               │                            │
//!    └──────up───────┴─────────────up─────────────┘
//! ```
//!
//! Collapse state is orthogonal: a click on the toggle flips it, keeping
//! the panel's right edge where it was.

use crate::config::{COLLAPSED_SIZE, DRAG_THRESHOLD, FALLBACK_EXPANDED_WIDTH};
use crate::dom::Viewport;

use super::clamp::constrain_to_viewport;
use super::position::PositionStore;
use super::{HeaderTarget, Panel, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pressed, not yet moved past the threshold.
    Armed,
    Dragging,
}

/// One press-move-release sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin_mouse: Point,
    pub origin_element: Point,
    pub moved: bool,
    pub is_toggle_press: bool,
}

/// What a pointer event did to the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// No session to act on, or a press while one is already active.
    Ignored,
    Armed,
    /// Movement still under the threshold.
    Pending,
    Moved(Point),
    /// Released without a toggle click; the position was persisted.
    Dropped(Point),
    /// Released as a click on the toggle.
    Toggled { collapsed: bool, position: Point },
}

#[derive(Debug, Clone)]
pub struct DragCollapseController {
    session: Option<DragSession>,
    threshold: f64,
}

impl Default for DragCollapseController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragCollapseController {
    pub fn new() -> Self {
        Self {
            session: None,
            threshold: DRAG_THRESHOLD,
        }
    }

    pub fn phase(&self) -> DragPhase {
        match self.session {
            None => DragPhase::Idle,
            Some(s) if s.moved => DragPhase::Dragging,
            Some(_) => DragPhase::Armed,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Press on the header. Pins the panel at its current rectangle so the
    /// host layout cannot make it jump while the gesture runs.
    pub fn pointer_down(&mut self, panel: &mut Panel, pointer: Point, target: HeaderTarget) -> DragOutcome {
        if self.session.is_some() {
            log::debug!("Ignoring re-entrant press at ({}, {})", pointer.x, pointer.y);
            return DragOutcome::Ignored;
        }
        let origin = panel.rect().origin();
        self.session = Some(DragSession {
            origin_mouse: pointer,
            origin_element: origin,
            moved: false,
            is_toggle_press: target == HeaderTarget::Toggle,
        });
        panel.apply_position(origin.x, origin.y);
        panel.lift();
        DragOutcome::Armed
    }

    pub fn pointer_move(&mut self, panel: &mut Panel, pointer: Point, viewport: Viewport) -> DragOutcome {
        let Some(session) = self.session.as_mut() else {
            return DragOutcome::Ignored;
        };
        let dx = pointer.x - session.origin_mouse.x;
        let dy = pointer.y - session.origin_mouse.y;
        if !session.moved && dx.abs() < self.threshold && dy.abs() < self.threshold {
            return DragOutcome::Pending;
        }
        session.moved = true;

        let rect = panel.rect();
        let target = constrain_to_viewport(
            session.origin_element.x + dx,
            session.origin_element.y + dy,
            rect.width,
            rect.height,
            viewport,
        );
        panel.apply_position(target.x, target.y);
        DragOutcome::Moved(target)
    }

    pub fn pointer_up(&mut self, panel: &mut Panel, store: &mut PositionStore, viewport: Viewport) -> DragOutcome {
        let Some(session) = self.session.take() else {
            return DragOutcome::Ignored;
        };
        panel.settle();

        if !session.moved && session.is_toggle_press {
            let position = self.toggle(panel, store, viewport);
            return DragOutcome::Toggled {
                collapsed: panel.is_collapsed(),
                position,
            };
        }

        let origin = panel.rect().origin();
        store.save(origin.x, origin.y);
        DragOutcome::Dropped(origin)
    }

    /// Flip between collapsed and expanded; returns the new position.
    pub fn toggle(&mut self, panel: &mut Panel, store: &mut PositionStore, viewport: Viewport) -> Point {
        if panel.is_collapsed() {
            self.expand(panel, store, viewport)
        } else {
            self.collapse(panel, store)
        }
    }

    /// Shrink to the collapsed square, shifting right so the affordance stays
    /// at the old right edge.
    pub fn collapse(&mut self, panel: &mut Panel, store: &mut PositionStore) -> Point {
        let rect = panel.rect();
        let expanded_width = rect.width;
        panel.record_expanded_width(expanded_width);

        let target = Point::new(rect.x + expanded_width - COLLAPSED_SIZE, rect.y);
        panel.set_collapsed(true);
        panel.apply_position(target.x, target.y);
        store.save(target.x, target.y);
        log::debug!("Panel collapsed at ({}, {})", target.x, target.y);
        target
    }

    /// Grow back to the recorded width, shifting left by the same delta.
    pub fn expand(&mut self, panel: &mut Panel, store: &mut PositionStore, viewport: Viewport) -> Point {
        let rect = panel.rect();
        let expanded_width = panel.expanded_width().unwrap_or(FALLBACK_EXPANDED_WIDTH);
        let shifted_x = rect.x - (expanded_width - COLLAPSED_SIZE);

        panel.set_collapsed(false);
        let (_, expanded_height) = panel.expanded_size();
        let target = constrain_to_viewport(shifted_x, rect.y, expanded_width, expanded_height, viewport);
        panel.apply_position(target.x, target.y);
        store.save(target.x, target.y);
        log::debug!("Panel expanded at ({}, {})", target.x, target.y);
        target
    }
}
