//! Reading the host, noticing changes and rebuilding the panel.

pub mod extract;
pub mod monitor;
pub mod scheduler;

pub use extract::{ContentExtractor, ContentItem};
pub use monitor::{ChangeMonitor, ChangeSignal};
pub use scheduler::{HostEvent, RenderScheduler, Trigger};
