pub mod config;
pub mod context;
pub mod event;
pub mod issue;
pub mod link;

pub use config::{Config, LoggingConfig, RetryConfig};
pub use context::MirrorContext;
pub use event::{EventRepository, IssueAction, IssueEvent};
pub use issue::{Comment, Issue, IssueState, IssueUpdate, Label, NewIssue, User};
pub use link::{Link, LinkParseError, LinkTarget, RepoRef, LINK_PREFIX};
