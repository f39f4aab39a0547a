//! issue-mirror - mirror labeled private issues into a public repository
//!
//! A private issue that carries the `public` label gets a public twin. The
//! link between the two lives in a bot comment on the private issue
//! (`linked:<owner>/<repo>#<number>`), and every later `issues` event on
//! the private side is reconciled onto the public one: edits and label
//! changes are copied, closing posts a comment, and removing the label or
//! deleting the private issue deletes the public twin.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the `IssueTracker` port
//! - **Service Layer** (`services`): link store, event classifier, reconciler
//! - **Application Layer** (`application`): per-event orchestration
//! - **Adapters** (`adapters`): GitHub REST/GraphQL client and an in-memory tracker
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::github::GitHubClient;
pub use application::EventHandler;
pub use domain::errors::{MirrorError, MirrorResult};
pub use domain::models::{
    Config, Issue, IssueAction, IssueEvent, IssueState, Link, LinkTarget, LoggingConfig,
    MirrorContext, RepoRef, RetryConfig,
};
pub use domain::ports::IssueTracker;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{classify, Decision, LinkStore, Outcome, Reconciler};
