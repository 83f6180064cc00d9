pub mod config;
pub mod dom;
pub mod engine;
pub mod messaging;
pub mod net;
pub mod panel;
pub mod storage;
