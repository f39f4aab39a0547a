//! Port trait definitions (Hexagonal Architecture)
//!
//! Adapters implement these traits so the domain stays independent of the
//! concrete issue tracker:
//! - IssueTracker: issue, comment and deletion calls

pub mod issue_tracker;

pub use issue_tracker::IssueTracker;
