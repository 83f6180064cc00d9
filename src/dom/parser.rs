use scraper::{Html, Selector};

use crate::dom::{SnapshotDocument, Viewport};

/// Author-role attribute carried by every message block of the host.
const ROLE_ATTR: &str = "data-message-author-role";

/// One rendered message of the host conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMessage {
    pub role: String,
    pub text: String,
}

/// Parse a raw HTML snapshot of the host page.
pub fn parse_html(html: &str, url: &str) -> SnapshotDocument {
    SnapshotDocument::new(Html::parse_document(html), url, Viewport::default())
}

/// Extract the `<title>` of a parsed document.
pub fn document_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Every role-marked message block, in document order.
///
/// Blocks whose text is empty after trimming are skipped.
pub fn collect_messages(document: &Html) -> Vec<HostMessage> {
    let Ok(sel) = Selector::parse(&format!("[{}]", ROLE_ATTR)) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter_map(|el| {
            let role = el.value().attr(ROLE_ATTR)?.to_string();
            let text = el.text().collect::<String>().trim().to_string();
            (!text.is_empty()).then_some(HostMessage { role, text })
        })
        .collect()
}

/// Render a conversation back into host markup.
///
/// Produces the structure the content selector, submit selector and
/// composer id expect, so a harness can re-render after every change.
pub fn render_conversation(title: &str, messages: &[HostMessage]) -> String {
    let mut body = String::new();
    for message in messages {
        body.push_str(&format!(
            "<div {}=\"{}\"><div class=\"whitespace-pre-wrap\">{}</div></div>\n",
            ROLE_ATTR,
            escape(&message.role),
            escape(&message.text)
        ));
    }
    format!(
        "<html><head><title>{}</title></head><body>\
         <main>{}</main>\
         <form><textarea id=\"prompt-textarea\"></textarea>\
         <button data-testid=\"send-button\"><span>Send</span></button></form>\
         </body></html>",
        escape(title),
        body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
