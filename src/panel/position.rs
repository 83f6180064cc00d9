//! Best-effort persistence of the panel position.
//!
//! Losing the position is harmless, so nothing here ever reports an error
//! to the caller: write failures are logged, and anything that cannot be
//! read back as `{x, y}` counts as "no saved position".

use crate::config::STORAGE_KEY;
use crate::storage::KeyValueStorage;

use super::Point;

pub struct PositionStore {
    storage: Option<Box<dyn KeyValueStorage>>,
    key: String,
}

impl PositionStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            storage: Some(storage),
            key: STORAGE_KEY.to_string(),
        }
    }

    /// A store with no backing capability: saves vanish, loads find nothing.
    pub fn unavailable() -> Self {
        Self {
            storage: None,
            key: STORAGE_KEY.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    pub fn save(&mut self, x: f64, y: f64) {
        let Some(storage) = self.storage.as_mut() else {
            return;
        };
        let raw = match serde_json::to_string(&Point::new(x, y)) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Position ({}, {}) not serializable: {}", x, y, e);
                return;
            }
        };
        if let Err(e) = storage.set_item(&self.key, &raw) {
            log::warn!("Failed to persist panel position: {}", e);
        }
    }

    pub fn load(&self) -> Option<Point> {
        let storage = self.storage.as_ref()?;
        let raw = match storage.get_item(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::debug!("Saved position unreadable: {}", e);
                return None;
            }
        };
        let point = serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|value| point_from_json(&value));
        if point.is_none() {
            log::debug!("Discarding malformed saved position {:?}", raw);
        }
        point
    }
}

/// Only a JSON object with finite numeric `x` and `y` is a position.
fn point_from_json(value: &serde_json::Value) -> Option<Point> {
    let object = value.as_object()?;
    let x = object.get("x")?.as_f64()?;
    let y = object.get("y")?.as_f64()?;
    (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
}
