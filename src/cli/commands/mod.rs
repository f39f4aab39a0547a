//! CLI command implementations.

pub mod check_config;
pub mod handle;
pub mod show_link;
