//! GitHub issue tracker adapter.
//!
//! Implements [`IssueTracker`](crate::domain::ports::IssueTracker) over the
//! GitHub REST API v3 for issues and comments, and the GraphQL API for
//! issue deletion, which REST does not offer.

pub mod client;
pub mod models;

pub use client::GitHubClient;
