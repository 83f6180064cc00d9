//! The injected navigation panel.
//!
//! A [`Panel`] is a self-contained value: header (drag handle, title,
//! toggle), search box and entry list, plus the inline style that pins it
//! to the viewport. It is built once per rebuild and never patched
//! incrementally; the scheduler drops it and builds a new one instead.

pub mod clamp;
pub mod drag;
pub mod position;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::config::{
    COLLAPSED_SIZE, DEFAULT_RIGHT_OFFSET, DEFAULT_TOP_OFFSET, ENTRY_HEIGHT,
    FALLBACK_EXPANDED_WIDTH, HEADER_HEIGHT, LIFTED_OPACITY, MAX_HEIGHT_RATIO, SEARCH_HEIGHT,
    TOGGLE_WIDTH, Z_INDEX_LIFTED, Z_INDEX_RESTING,
};
use crate::dom::style::{px, InlineStyle};
use crate::dom::Viewport;
use crate::engine::extract::ContentItem;

/// A point in viewport coordinates. Also the persisted position record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Header region a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    /// Drag handle or title: anywhere in the header except the toggle.
    Handle,
    Toggle,
}

/// One list entry, linked to a host element through its anchor id.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelEntry {
    /// 1-based number shown before the text (`data-toc-num`).
    pub number: usize,
    pub anchor_id: String,
    pub display_text: String,
    /// Untruncated text, shown as the entry's tooltip.
    pub full_text: String,
    pub visible: bool,
}

impl PanelEntry {
    pub fn label(&self) -> String {
        format!("{}. {}", self.number, self.display_text)
    }

    pub fn href(&self) -> String {
        format!("#{}", self.anchor_id)
    }
}

/// Search box state of the panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchBox {
    pub value: String,
    pub clear_visible: bool,
    pub focused: bool,
}

#[derive(Debug, Clone)]
pub struct Panel {
    serial: u64,
    entries: Vec<PanelEntry>,
    search: SearchBox,
    style: InlineStyle,
    collapsed: bool,
    expanded_width: Option<f64>,
    estimated_size: (f64, f64),
    measured_size: Option<(f64, f64)>,
    viewport: Viewport,
}

impl Panel {
    /// Build a fresh, unplaced panel for `items`.
    pub fn build(serial: u64, items: &[ContentItem], viewport: Viewport) -> Self {
        let entries = items
            .iter()
            .map(|item| PanelEntry {
                number: item.index + 1,
                anchor_id: item.anchor_id.clone(),
                display_text: item.display_text.clone(),
                full_text: item.full_text.clone(),
                visible: true,
            })
            .collect::<Vec<_>>();

        let content = HEADER_HEIGHT + SEARCH_HEIGHT + ENTRY_HEIGHT * entries.len() as f64;
        let height = content.min(viewport.height * MAX_HEIGHT_RATIO).max(HEADER_HEIGHT);

        let mut style = InlineStyle::default();
        style.set_property("z-index", &Z_INDEX_RESTING.to_string(), false);

        Self {
            serial,
            entries,
            search: SearchBox::default(),
            style,
            collapsed: false,
            expanded_width: None,
            estimated_size: (FALLBACK_EXPANDED_WIDTH, height),
            measured_size: None,
            viewport,
        }
    }

    /// Monotonic instance number; a new value on every rebuild.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn search_box(&self) -> &SearchBox {
        &self.search
    }

    pub fn search_box_mut(&mut self) -> &mut SearchBox {
        &mut self.search
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn expanded_width(&self) -> Option<f64> {
        self.expanded_width
    }

    pub fn record_expanded_width(&mut self, width: f64) {
        self.expanded_width = Some(width);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Record the expanded size the host actually laid out.
    pub fn set_measured_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.measured_size = Some((width, height));
        }
    }

    /// Size of the panel in its expanded form.
    pub fn expanded_size(&self) -> (f64, f64) {
        self.measured_size.unwrap_or(self.estimated_size)
    }

    /// Position pinned through inline style, if any.
    pub fn position(&self) -> Option<Point> {
        if self.style.get("position") != Some("fixed") {
            return None;
        }
        Some(Point::new(self.style.get_px("left")?, self.style.get_px("top")?))
    }

    /// Current bounding rectangle in viewport coordinates.
    ///
    /// An unpinned panel sits at its default anchor near the top-right
    /// corner of the viewport.
    pub fn rect(&self) -> Rect {
        let (width, height) = if self.collapsed {
            (COLLAPSED_SIZE, COLLAPSED_SIZE)
        } else {
            self.expanded_size()
        };
        let origin = self.position().unwrap_or_else(|| {
            Point::new(self.viewport.width - width - DEFAULT_RIGHT_OFFSET, DEFAULT_TOP_OFFSET)
        });
        Rect { x: origin.x, y: origin.y, width, height }
    }

    /// Header control under `p`, if any. A collapsed panel is all toggle.
    pub fn hit_test(&self, p: Point) -> Option<HeaderTarget> {
        let rect = self.rect();
        if !rect.contains(p) {
            return None;
        }
        if self.collapsed {
            return Some(HeaderTarget::Toggle);
        }
        if p.y >= rect.y + HEADER_HEIGHT {
            return None;
        }
        if p.x >= rect.x + rect.width - TOGGLE_WIDTH {
            Some(HeaderTarget::Toggle)
        } else {
            Some(HeaderTarget::Handle)
        }
    }

    /// Pin the panel at `(x, y)` with fixed positioning.
    pub fn apply_position(&mut self, x: f64, y: f64) {
        let left = px(x);
        let top = px(y);
        for (prop, value) in [
            ("position", "fixed"),
            ("left", left.as_str()),
            ("top", top.as_str()),
            ("right", "auto"),
            ("bottom", "auto"),
            ("margin", "0"),
            ("transform", "none"),
        ] {
            self.style.set_property(prop, value, true);
        }
    }

    /// Visual feedback while a press is in progress.
    pub fn lift(&mut self) {
        self.style.set_property("opacity", LIFTED_OPACITY, false);
        self.style.set_property("transition", "none", false);
        self.style.set_property("z-index", &Z_INDEX_LIFTED.to_string(), false);
    }

    pub fn settle(&mut self) {
        self.style.set_property("opacity", "", false);
        self.style.set_property("transition", "", false);
        self.style.set_property("z-index", &Z_INDEX_RESTING.to_string(), false);
    }

    pub fn is_lifted(&self) -> bool {
        self.style.get("opacity") == Some(LIFTED_OPACITY)
    }

    /// Apply per-entry visibility; `visible` is indexed like `entries()`.
    pub fn set_visibility(&mut self, visible: &[bool]) {
        for (entry, shown) in self.entries.iter_mut().zip(visible) {
            entry.visible = *shown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::extract::ContentItem;

    fn items(n: usize) -> Vec<ContentItem> {
        (0..n).map(|i| ContentItem::new(i, &format!("question {}", i))).collect()
    }

    #[test]
    fn entries_are_numbered_from_one() {
        let panel = Panel::build(1, &items(2), Viewport::default());
        let labels: Vec<_> = panel.entries().iter().map(|e| e.label()).collect();
        assert_eq!(labels, ["1. question 0", "2. question 1"]);
        assert_eq!(panel.entries()[1].href(), "#toc-question-1");
    }

    #[test]
    fn unpinned_panel_anchors_top_right() {
        let panel = Panel::build(1, &items(3), Viewport::new(1280.0, 800.0));
        assert_eq!(panel.position(), None);
        let rect = panel.rect();
        assert_eq!(rect.x, 1280.0 - 300.0 - 20.0);
        assert_eq!(rect.y, 80.0);
        assert_eq!(rect.height, 48.0 + 40.0 + 3.0 * 28.0);
    }

    #[test]
    fn height_is_capped_by_viewport() {
        let panel = Panel::build(1, &items(500), Viewport::new(1280.0, 800.0));
        assert_eq!(panel.rect().height, 800.0 * 0.7);
    }

    #[test]
    fn pinning_uses_important_fixed_style() {
        let mut panel = Panel::build(1, &items(1), Viewport::default());
        panel.apply_position(12.0, 34.0);
        assert_eq!(panel.position(), Some(Point::new(12.0, 34.0)));
        assert!(panel.style().is_important("position"));
        assert_eq!(panel.style().get("right"), Some("auto"));
    }

    #[test]
    fn collapsed_rect_is_square() {
        let mut panel = Panel::build(1, &items(1), Viewport::default());
        panel.apply_position(100.0, 50.0);
        panel.set_collapsed(true);
        let rect = panel.rect();
        assert_eq!((rect.width, rect.height), (48.0, 48.0));
        assert_eq!(rect.origin(), Point::new(100.0, 50.0));
    }

    #[test]
    fn header_hit_testing() {
        let mut panel = Panel::build(1, &items(2), Viewport::default());
        panel.apply_position(100.0, 100.0);
        assert_eq!(panel.hit_test(Point::new(110.0, 110.0)), Some(HeaderTarget::Handle));
        assert_eq!(panel.hit_test(Point::new(390.0, 110.0)), Some(HeaderTarget::Toggle));
        // Search box and list are not part of the header.
        assert_eq!(panel.hit_test(Point::new(110.0, 160.0)), None);
        assert_eq!(panel.hit_test(Point::new(90.0, 110.0)), None);

        panel.set_collapsed(true);
        assert_eq!(panel.hit_test(Point::new(110.0, 140.0)), Some(HeaderTarget::Toggle));
        assert_eq!(panel.hit_test(Point::new(160.0, 110.0)), None);
    }

    #[test]
    fn lift_and_settle_restore_resting_z_index() {
        let mut panel = Panel::build(1, &items(1), Viewport::default());
        panel.lift();
        assert!(panel.is_lifted());
        assert_eq!(panel.style().get("z-index"), Some("10001"));
        panel.settle();
        assert!(!panel.is_lifted());
        assert_eq!(panel.style().get("transition"), None);
        assert_eq!(panel.style().get("z-index"), Some("10000"));
    }
}
