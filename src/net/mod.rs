//! Loading host page snapshots from disk or the network.

#[cfg(feature = "fetch")]
pub mod fetch;

use std::path::PathBuf;

use crate::dom::parser::{render_conversation, HostMessage};

/// Address used for snapshots that do not carry one.
pub const DEFAULT_LOCATION: &str = "https://chatgpt.com/";

/// Error while reading, fetching or decoding a snapshot.
#[derive(Debug)]
pub struct SnapshotError {
    pub message: String,
    pub phase: &'static str,
}

impl SnapshotError {
    pub fn read(message: impl Into<String>) -> Self {
        Self { message: message.into(), phase: "read" }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self { message: message.into(), phase: "fetch" }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self { message: message.into(), phase: "decode" }
    }
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(String),
    /// Built-in sample conversation.
    Demo,
}

impl SnapshotSource {
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            SnapshotSource::Url(arg.to_string())
        } else {
            SnapshotSource::File(PathBuf::from(arg))
        }
    }
}

/// Raw host markup plus the address it was taken from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: String,
    pub location: String,
}

pub fn load_snapshot(source: &SnapshotSource) -> Result<Snapshot, SnapshotError> {
    match source {
        SnapshotSource::Demo => Ok(Snapshot {
            html: demo_conversation(),
            location: format!("{}c/demo", DEFAULT_LOCATION),
        }),
        SnapshotSource::File(path) => {
            let bytes = std::fs::read(path)
                .map_err(|e| SnapshotError::read(format!("{}: {}", path.display(), e)))?;
            let html = String::from_utf8(bytes)
                .map_err(|e| SnapshotError::decode(format!("{}: {}", path.display(), e)))?;
            Ok(Snapshot {
                html,
                location: DEFAULT_LOCATION.to_string(),
            })
        }
        SnapshotSource::Url(url) => fetch_snapshot(url),
    }
}

#[cfg(feature = "fetch")]
fn fetch_snapshot(url: &str) -> Result<Snapshot, SnapshotError> {
    let result = fetch::fetch_url(url)?;
    Ok(Snapshot {
        html: result.html,
        location: result.url,
    })
}

#[cfg(not(feature = "fetch"))]
fn fetch_snapshot(url: &str) -> Result<Snapshot, SnapshotError> {
    Err(SnapshotError::fetch(format!(
        "cannot load {}: built without the `fetch` feature",
        url
    )))
}

fn demo_conversation() -> String {
    let turns = [
        ("user", "How do I read a file line by line in Rust?"),
        ("assistant", "Wrap the file in a BufReader and iterate over lines()."),
        ("user", "What's the difference between String and &str, and when should I take one or the other as a function parameter?"),
        ("assistant", "String owns its buffer; &str borrows. Take &str unless you need ownership."),
        ("user", "Show me a minimal example of a thread pool"),
        ("assistant", "Spawn N workers that pull boxed closures from a shared channel."),
    ];
    let messages: Vec<HostMessage> = turns
        .iter()
        .map(|(role, text)| HostMessage {
            role: role.to_string(),
            text: text.to_string(),
        })
        .collect();
    render_conversation("ChatGPT", &messages)
}
