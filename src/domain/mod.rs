//! Domain layer for the issue mirror
//!
//! This module contains the mirror's data model, its error type and the
//! port through which it talks to the issue tracker.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{MirrorError, MirrorResult};
