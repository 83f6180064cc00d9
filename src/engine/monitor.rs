//! Detects conversation switches in a host that never announces them.
//!
//! Two channels feed one test. Structural mutations fire constantly
//! (streaming replies, hover effects), so the mutation channel first
//! filters on "did the address change at all"; the history channel fires
//! on back/forward only. Both then ask whether the conversation id
//! captured from the address differs from the last one seen, and only
//! that raises a signal.

use regex::Regex;

use crate::config::{ContractError, HostContract};

/// "The host content may have changed." Carries nothing: receivers
/// re-read the live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Mutation,
    History,
}

pub struct ChangeMonitor {
    pattern: Regex,
    last_url: Option<String>,
    current_session: Option<String>,
    active: bool,
}

impl ChangeMonitor {
    pub fn new(contract: &HostContract) -> Result<Self, ContractError> {
        let pattern = Regex::new(&contract.session_pattern).map_err(|e| ContractError {
            message: format!("invalid session pattern: {}", e),
        })?;
        Ok(Self {
            pattern,
            last_url: None,
            current_session: None,
            active: false,
        })
    }

    /// Start observing with `location` as the baseline.
    pub fn init(&mut self, location: &str) {
        self.last_url = Some(location.to_string());
        self.current_session = self.session_id(location);
        self.active = true;
        log::debug!("Monitoring session {:?}", self.current_session);
    }

    /// Stop observing. Later notifications raise nothing until re-init.
    pub fn dispose(&mut self) {
        self.active = false;
        self.last_url = None;
        self.current_session = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_session(&self) -> Option<&str> {
        self.current_session.as_deref()
    }

    /// Conversation id captured from an address, if it has one.
    pub fn session_id(&self, location: &str) -> Option<String> {
        self.pattern
            .captures(location)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// A structural mutation was observed anywhere in the page.
    pub fn on_mutation(&mut self, location: &str) -> Option<ChangeSignal> {
        if !self.active || self.last_url.as_deref() == Some(location) {
            return None;
        }
        self.last_url = Some(location.to_string());
        self.check_session(location, Channel::Mutation)
    }

    /// A back/forward navigation was observed.
    pub fn on_history(&mut self, location: &str) -> Option<ChangeSignal> {
        if !self.active {
            return None;
        }
        self.check_session(location, Channel::History)
    }

    fn check_session(&mut self, location: &str, channel: Channel) -> Option<ChangeSignal> {
        let session = self.session_id(location);
        if session == self.current_session {
            return None;
        }
        log::info!(
            "Chat changed from {:?} to {:?} ({:?})",
            self.current_session,
            session,
            channel
        );
        self.current_session = session;
        Some(ChangeSignal)
    }
}
