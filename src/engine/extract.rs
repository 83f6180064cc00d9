use crate::config::{HostContract, ANCHOR_PREFIX, MAX_QUERY_LENGTH, TRUNCATE_SUFFIX};
use crate::dom::HostDocument;

/// A user prompt as listed in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Position among the items of this extraction pass.
    pub index: usize,
    pub full_text: String,
    pub display_text: String,
    pub anchor_id: String,
}

impl ContentItem {
    pub fn new(index: usize, text: &str) -> Self {
        Self {
            index,
            full_text: text.to_string(),
            display_text: truncate_display(text),
            anchor_id: anchor_id(index),
        }
    }
}

pub fn anchor_id(index: usize) -> String {
    format!("{}{}", ANCHOR_PREFIX, index)
}

/// Shorten `text` to at most [`MAX_QUERY_LENGTH`] characters, marking the
/// cut with a trailing ellipsis.
pub fn truncate_display(text: &str) -> String {
    if text.chars().count() <= MAX_QUERY_LENGTH {
        return text.to_string();
    }
    let keep = MAX_QUERY_LENGTH - TRUNCATE_SUFFIX.chars().count();
    let mut short: String = text.chars().take(keep).collect();
    short.push_str(TRUNCATE_SUFFIX);
    short
}

/// Reads the user prompts out of the host page.
///
/// Stateless: every call re-queries the live tree, so two calls may
/// disagree if the host re-rendered in between.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    selector: String,
}

impl ContentExtractor {
    pub fn new(contract: &HostContract) -> Self {
        Self {
            selector: contract.user_message_selector.clone(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Trimmed, non-empty prompt texts in document order.
    pub fn queries(&self, doc: &dyn HostDocument) -> Vec<String> {
        doc.query_all(&self.selector)
            .into_iter()
            .filter_map(|node| doc.text_content(node))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    pub fn extract(&self, doc: &dyn HostDocument) -> Vec<ContentItem> {
        self.queries(doc)
            .iter()
            .enumerate()
            .map(|(index, text)| ContentItem::new(index, text))
            .collect()
    }

    /// Write each item's anchor id onto the host element at the same
    /// position among the selector matches. Returns how many were written.
    ///
    /// Correspondence is positional only: if empty blocks were skipped
    /// during extraction, later anchors land one element early.
    pub fn assign_anchors(&self, doc: &mut dyn HostDocument, items: &[ContentItem]) -> usize {
        let nodes = doc.query_all(&self.selector);
        let mut assigned = 0;
        for item in items {
            let written = nodes
                .get(item.index)
                .is_some_and(|node| doc.set_element_id(*node, &item.anchor_id));
            if written {
                assigned += 1;
            } else {
                log::debug!("No host element for {}, skipping", item.anchor_id);
            }
        }
        assigned
    }
}
