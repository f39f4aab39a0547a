//! Infrastructure layer module
//!
//! Process-level concerns that sit outside the mirror's domain logic:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
