//! Cross-context request/response served to the extension runtime.
//!
//! One exchange exists: `{"action": "getQueries"}` answered with
//! `{"queries": [...]}`. The router is only live when a runtime was handed
//! in at startup; without one every request goes unanswered, which is the
//! same thing the sender sees when no listener was ever registered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "getQueries")]
    GetQueries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueriesResponse {
    pub queries: Vec<String>,
}

/// The host's extension messaging runtime.
pub trait ExtensionRuntime {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct MessageRouter {
    runtime: Option<String>,
}

impl MessageRouter {
    /// Register against `runtime`, checked once here and never again.
    pub fn register(runtime: Option<&dyn ExtensionRuntime>) -> Self {
        let runtime = runtime.map(|rt| rt.name().to_string());
        match &runtime {
            Some(name) => log::debug!("Message listener registered on {}", name),
            None => log::debug!("No extension runtime, message listener not registered"),
        }
        Self { runtime }
    }

    pub fn is_registered(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn handle(
        &self,
        request: &Request,
        queries: impl FnOnce() -> Vec<String>,
    ) -> Option<QueriesResponse> {
        self.runtime.as_ref()?;
        match request {
            Request::GetQueries => Some(QueriesResponse { queries: queries() }),
        }
    }

    /// JSON in, JSON out. Unknown or malformed requests get no response.
    pub fn handle_json(&self, raw: &str, queries: impl FnOnce() -> Vec<String>) -> Option<String> {
        self.runtime.as_ref()?;
        let request = match serde_json::from_str::<Request>(raw) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Ignoring message {:?}: {}", raw, e);
                return None;
            }
        };
        let response = self.handle(&request, queries)?;
        serde_json::to_string(&response).ok()
    }
}
