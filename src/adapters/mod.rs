//! Issue tracker adapters.

pub mod github;
pub mod mock;
