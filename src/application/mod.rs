//! Application layer: per-event orchestration.

pub mod event_handler;

pub use event_handler::EventHandler;
