pub mod parser;
pub mod snapshot;
pub mod style;

pub use snapshot::SnapshotDocument;

/// Position of an element in document order.
///
/// Only meaningful for the tree it was obtained from; any host re-render
/// invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Visible area of the host page, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Capabilities the engine needs from the page it is injected into.
///
/// Queries take CSS selector strings. An unparsable selector matches
/// nothing. Overlays are elements the engine itself appends to the page
/// (the panel); they are keyed by element id.
pub trait HostDocument {
    /// Current address of the page.
    fn location(&self) -> &str;

    fn viewport(&self) -> Viewport;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, node: NodeId) -> Option<String>;

    fn element_id(&self, node: NodeId) -> Option<String>;

    /// Returns false when the node no longer exists.
    fn set_element_id(&mut self, node: NodeId, id: &str) -> bool;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId>;

    /// Id of the element holding keyboard focus.
    fn active_element_id(&self) -> Option<String>;

    fn scroll_into_view(&mut self, node: NodeId);

    fn has_overlay(&self, id: &str) -> bool;

    /// Returns true if an overlay with this id existed.
    fn remove_overlay(&mut self, id: &str) -> bool;

    fn append_overlay(&mut self, id: &str);
}
