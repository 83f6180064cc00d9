//! In-memory host page backed by a parsed HTML snapshot.
//!
//! The parsed tree is immutable; everything the engine writes (element ids,
//! focus, overlays, scroll target) lives in side tables that reset whenever
//! the tree is replaced, mirroring a host re-render.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use super::parser::{collect_messages, document_title, HostMessage};
use super::{HostDocument, NodeId, Viewport};

pub struct SnapshotDocument {
    html: Html,
    title: String,
    location: String,
    viewport: Viewport,
    assigned_ids: HashMap<NodeId, String>,
    focused: Option<NodeId>,
    scrolled_to: Option<NodeId>,
    overlays: Vec<String>,
}

impl SnapshotDocument {
    pub fn new(html: Html, location: &str, viewport: Viewport) -> Self {
        let title = document_title(&html);
        Self {
            html,
            title,
            location: location.to_string(),
            viewport,
            assigned_ids: HashMap::new(),
            focused: None,
            scrolled_to: None,
            overlays: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the whole tree. Assigned ids, focus and scroll target are lost.
    pub fn set_html(&mut self, html: &str) {
        self.html = Html::parse_document(html);
        self.title = document_title(&self.html);
        self.assigned_ids.clear();
        self.focused = None;
        self.scrolled_to = None;
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = location.to_string();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn focus(&mut self, node: Option<NodeId>) {
        self.focused = node.filter(|n| self.node(*n).is_some());
    }

    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to
    }

    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    pub fn messages(&self) -> Vec<HostMessage> {
        collect_messages(&self.html)
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    fn node(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.elements().nth(node.0)
    }

    fn ordinal(&self, target: ElementRef<'_>) -> Option<NodeId> {
        self.elements().position(|el| el == target).map(NodeId)
    }

    fn id_of(&self, ordinal: NodeId, el: ElementRef<'_>) -> Option<String> {
        if let Some(id) = self.assigned_ids.get(&ordinal) {
            return Some(id.clone());
        }
        el.value().id().map(str::to_string)
    }
}

impl HostDocument for SnapshotDocument {
    fn location(&self) -> &str {
        &self.location
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Ok(sel) = Selector::parse(selector) else {
            log::debug!("Unparsable selector {:?}, matching nothing", selector);
            return Vec::new();
        };
        self.elements()
            .enumerate()
            .filter(|(_, el)| sel.matches(el))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        Some(self.node(node)?.text().collect())
    }

    fn element_id(&self, node: NodeId) -> Option<String> {
        self.id_of(node, self.node(node)?)
    }

    fn set_element_id(&mut self, node: NodeId, id: &str) -> bool {
        if self.node(node).is_none() {
            return false;
        }
        self.assigned_ids.insert(node, id.to_string());
        true
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .enumerate()
            .find(|(i, el)| self.id_of(NodeId(*i), *el).as_deref() == Some(id))
            .map(|(i, _)| NodeId(i))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let sel = Selector::parse(selector).ok()?;
        let start = self.node(node)?;
        std::iter::once(start)
            .chain((*start).ancestors().filter_map(ElementRef::wrap))
            .find(|el| sel.matches(el))
            .and_then(|el| self.ordinal(el))
    }

    fn active_element_id(&self) -> Option<String> {
        self.element_id(self.focused?)
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if self.node(node).is_some() {
            self.scrolled_to = Some(node);
        }
    }

    fn has_overlay(&self, id: &str) -> bool {
        self.overlays.iter().any(|o| o == id)
    }

    fn remove_overlay(&mut self, id: &str) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|o| o != id);
        self.overlays.len() != before
    }

    fn append_overlay(&mut self, id: &str) {
        self.overlays.push(id.to_string());
    }
}
