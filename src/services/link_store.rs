//! Link store: reads and writes the sentinel comment that records which
//! public issue mirrors a private one.

use std::sync::Arc;

use crate::domain::errors::{MirrorError, MirrorResult};
use crate::domain::models::{Comment, Link, LinkTarget, MirrorContext, LINK_PREFIX};
use crate::domain::ports::IssueTracker;

/// Reads and writes link comments on private issues.
pub struct LinkStore {
    tracker: Arc<dyn IssueTracker>,
    ctx: MirrorContext,
}

impl LinkStore {
    /// Create a store over `tracker` for the repositories in `ctx`.
    pub fn new(tracker: Arc<dyn IssueTracker>, ctx: MirrorContext) -> Self {
        Self { tracker, ctx }
    }

    /// Find the link recorded on a private issue.
    ///
    /// The first comment by the bot account in tracker order is the link
    /// candidate; when it lacks the link prefix the issue counts as
    /// unlinked. Further prefixed bot comments mean two deliveries raced
    /// on the same issue, which is reported but tolerated.
    pub async fn find_link(&self, issue_number: u64) -> MirrorResult<Option<Link>> {
        let comments = self
            .tracker
            .list_comments(&self.ctx.private_repo, issue_number)
            .await?;

        let mut bot_comments = comments
            .iter()
            .filter(|comment| comment.is_authored_by(&self.ctx.bot_username));

        let Some(first) = bot_comments.next() else {
            tracing::debug!(issue = issue_number, "no bot comment found");
            return Ok(None);
        };

        let extra = bot_comments
            .filter(|comment| comment.body.starts_with(LINK_PREFIX))
            .count();
        if extra > 0 {
            tracing::warn!(
                issue = issue_number,
                extra_links = extra,
                "multiple link comments on private issue, using the first bot comment"
            );
        }

        let link = Self::parse_link(first)?;
        if let Some(link) = &link {
            if link.target.repo != self.ctx.public_repo {
                tracing::warn!(
                    issue = issue_number,
                    linked_repo = %link.target.repo,
                    public_repo = %self.ctx.public_repo,
                    "link points at a different repository than configured"
                );
            }
        }
        Ok(link)
    }

    /// Parse a comment as a link.
    ///
    /// Returns `Ok(None)` when the body lacks the link prefix. A body with
    /// the prefix but no valid `<owner>/<repo>#<number>` after it is a
    /// [`MirrorError::CorruptLink`].
    pub fn parse_link(comment: &Comment) -> MirrorResult<Option<Link>> {
        if !comment.body.starts_with(LINK_PREFIX) {
            return Ok(None);
        }
        let target = comment
            .body
            .parse::<LinkTarget>()
            .map_err(|err| MirrorError::CorruptLink {
                comment_id: comment.id,
                body: comment.body.clone(),
                reason: err.to_string(),
            })?;
        Ok(Some(Link {
            comment_id: comment.id,
            target,
        }))
    }

    /// Record a link on the private issue.
    pub async fn write_link(&self, issue_number: u64, target: LinkTarget) -> MirrorResult<Link> {
        let comment = self
            .tracker
            .create_comment(&self.ctx.private_repo, issue_number, &target.to_comment_body())
            .await?;
        tracing::info!(
            issue = issue_number,
            comment_id = comment.id,
            target = %target,
            "link comment written"
        );
        Ok(Link {
            comment_id: comment.id,
            target,
        })
    }

    /// Remove a link comment; nothing to do without one.
    pub async fn delete_link(&self, link: Option<&Link>) -> MirrorResult<()> {
        let Some(link) = link else {
            return Ok(());
        };
        self.tracker
            .delete_comment(&self.ctx.private_repo, link.comment_id)
            .await?;
        tracing::info!(comment_id = link.comment_id, "link comment deleted");
        Ok(())
    }
}
