//! Host contract and the fixed visual/timing constants of the panel.
//!
//! Every value here is observable behaviour: the host page is addressed
//! through these selectors and ids, and the panel's geometry and rebuild
//! timing follow these numbers exactly.

use std::time::Duration;

// ─── Host document contract ──────────────────────────────────────────────────

/// User prompt blocks in the host conversation.
pub const USER_MESSAGE_SELECTOR: &str = r#"div[data-message-author-role="user"]"#;
/// The composer's submit control.
pub const SEND_BUTTON_SELECTOR: &str = r#"[data-testid="send-button"]"#;
/// Element id of the composer's text input.
pub const PROMPT_TEXTAREA_ID: &str = "prompt-textarea";
/// Address pattern; capture group 1 is the conversation id.
pub const SESSION_PATTERN: &str = r"chatgpt\.com/c/([^/?#]+)";

// ─── Panel identifiers ───────────────────────────────────────────────────────

pub const PANEL_ID: &str = "chatgpt-toc-extension";
pub const SEARCH_INPUT_ID: &str = "toc-search-input";
/// Anchor ids written onto host elements are `{ANCHOR_PREFIX}{index}`.
pub const ANCHOR_PREFIX: &str = "toc-question-";

pub const PANEL_TITLE: &str = "Table of Contents";
pub const DRAG_HANDLE_TITLE: &str = "Drag to move";
pub const TOGGLE_TITLE: &str = "Toggle Table of Contents";
pub const SEARCH_PLACEHOLDER: &str = "Search queries...";
pub const SEARCH_CLEAR_TITLE: &str = "Clear search";

// ─── Persisted state ─────────────────────────────────────────────────────────

pub const STORAGE_KEY: &str = "chatgpt-toc-position";

// ─── Rebuild delays ──────────────────────────────────────────────────────────

/// Lets the host app finish its own first render.
pub const PAGE_LOAD_DELAY: Duration = Duration::from_millis(3000);
pub const CHAT_CHANGE_DELAY: Duration = Duration::from_millis(1000);
pub const PROMPT_SUBMISSION_DELAY: Duration = Duration::from_millis(100);
pub const ENTER_KEY_DELAY: Duration = Duration::from_millis(80);

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Minimum distance kept between the panel and every viewport edge.
pub const EDGE_PADDING: f64 = 10.0;
pub const MAX_QUERY_LENGTH: usize = 70;
pub const TRUNCATE_SUFFIX: &str = "...";
/// Viewports this wide or narrower start with the panel collapsed.
pub const COLLAPSE_BREAKPOINT: f64 = 1024.0;
pub const COLLAPSED_SIZE: f64 = 48.0;
/// Expanded width assumed when none was recorded before expanding.
pub const FALLBACK_EXPANDED_WIDTH: f64 = 300.0;
/// Pointer travel (per axis) that turns a press into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Default anchor of an unplaced panel: offset from the right edge and top.
pub const DEFAULT_RIGHT_OFFSET: f64 = 20.0;
pub const DEFAULT_TOP_OFFSET: f64 = 80.0;

/// Estimated layout metrics used until the host reports a measured size.
pub const HEADER_HEIGHT: f64 = 48.0;
pub const SEARCH_HEIGHT: f64 = 40.0;
pub const ENTRY_HEIGHT: f64 = 28.0;
/// Width of the toggle control at the right end of the header.
pub const TOGGLE_WIDTH: f64 = 36.0;
/// Fraction of the viewport height an expanded panel may occupy.
pub const MAX_HEIGHT_RATIO: f64 = 0.7;

// ─── Visual feedback ─────────────────────────────────────────────────────────

pub const Z_INDEX_RESTING: u32 = 10000;
pub const Z_INDEX_LIFTED: u32 = 10001;
pub const LIFTED_OPACITY: &str = "0.8";

/// Selectors and patterns that tie the engine to one host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContract {
    pub user_message_selector: String,
    pub send_button_selector: String,
    pub prompt_textarea_id: String,
    pub session_pattern: String,
}

impl Default for HostContract {
    fn default() -> Self {
        Self {
            user_message_selector: USER_MESSAGE_SELECTOR.to_string(),
            send_button_selector: SEND_BUTTON_SELECTOR.to_string(),
            prompt_textarea_id: PROMPT_TEXTAREA_ID.to_string(),
            session_pattern: SESSION_PATTERN.to_string(),
        }
    }
}

/// Invalid entry in a [`HostContract`].
#[derive(Debug, Clone)]
pub struct ContractError {
    pub message: String,
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "host contract: {}", self.message)
    }
}

impl std::error::Error for ContractError {}

impl HostContract {
    /// Check that every selector parses and the session pattern compiles.
    pub fn validate(&self) -> Result<(), ContractError> {
        for selector in [&self.user_message_selector, &self.send_button_selector] {
            scraper::Selector::parse(selector).map_err(|e| ContractError {
                message: format!("invalid selector {:?}: {:?}", selector, e),
            })?;
        }
        regex::Regex::new(&self.session_pattern).map_err(|e| ContractError {
            message: format!("invalid session pattern: {}", e),
        })?;
        Ok(())
    }
}
