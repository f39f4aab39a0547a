//! Issue tracker port.
//!
//! The mirror reads and writes issues exclusively through this trait, so
//! the classification and reconciliation logic never depends on a
//! specific tracker or transport.

use async_trait::async_trait;

use crate::domain::errors::MirrorResult;
use crate::domain::models::{Comment, Issue, IssueUpdate, NewIssue, RepoRef};

/// Port for the external issue tracker.
///
/// Every method is a single round-trip. Implementations must not retry
/// mutations.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// List the first page of comments on an issue, oldest first.
    async fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Vec<Comment>>;

    /// Post a comment on an issue.
    async fn create_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> MirrorResult<Comment>;

    /// Delete a comment by id.
    async fn delete_comment(&self, repo: &RepoRef, comment_id: u64) -> MirrorResult<()>;

    /// Create an issue and return its number.
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> MirrorResult<u64>;

    /// Fetch an issue by number.
    async fn get_issue(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Issue>;

    /// Overwrite the mirrored fields of an issue.
    async fn update_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        update: &IssueUpdate,
    ) -> MirrorResult<()>;

    /// Resolve the tracker's internal identifier for an issue number.
    ///
    /// The identifier is opaque and distinct from the user-facing number.
    async fn issue_node_id(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<String>;

    /// Permanently delete an issue by its internal identifier.
    async fn delete_issue(&self, node_id: &str) -> MirrorResult<()>;
}
