//! Reconciler: carries out a [`Decision`] against the issue tracker.
//!
//! Calls are issued strictly one after another. Nothing is rolled back on
//! failure; a create whose link comment fails to post leaves an unlinked
//! public issue behind, which is logged with its number.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::MirrorResult;
use crate::domain::models::{
    Issue, IssueEvent, IssueState, IssueUpdate, Link, LinkTarget, MirrorContext, NewIssue,
};
use crate::domain::ports::IssueTracker;

use super::classifier::{Decision, SkipReason};
use super::link_store::LinkStore;

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        public_number: u64,
        link_comment_id: u64,
    },
    Updated {
        public_number: u64,
        /// A closing comment was posted on the public issue.
        closing_comment_posted: bool,
        /// The public issue's fields were overwritten.
        fields_updated: bool,
    },
    Deleted {
        public_number: Option<u64>,
        link_removed: bool,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl Outcome {
    /// One-line summary for humans.
    pub fn summary(&self) -> String {
        match self {
            Self::Created { public_number, .. } => format!("created public issue #{public_number}"),
            Self::Updated {
                public_number,
                closing_comment_posted,
                fields_updated,
            } => match (fields_updated, closing_comment_posted) {
                (false, false) => format!("public issue #{public_number} already up to date"),
                (true, false) => format!("updated public issue #{public_number}"),
                (false, true) => format!("posted closing comment on public issue #{public_number}"),
                (true, true) => {
                    format!("updated and posted closing comment on public issue #{public_number}")
                }
            },
            Self::Deleted {
                public_number: Some(number),
                ..
            } => format!("deleted public issue #{number}"),
            Self::Deleted {
                public_number: None,
                link_removed,
            } => {
                if *link_removed {
                    "removed link comment".to_string()
                } else {
                    "nothing to delete".to_string()
                }
            }
            Self::Skipped { reason } => format!("skipped: {reason}"),
        }
    }
}

/// Whether the public issue differs from the private one in any mirrored
/// field. Labels compare as sets with the public label excluded, and a
/// null body equals an empty one.
pub fn needs_update(private: &Issue, public: &Issue, public_label: &str) -> bool {
    let mut private_labels = private.label_set();
    private_labels.remove(public_label);

    private.title != public.title
        || private.body_text() != public.body_text()
        || private.state != public.state
        || private_labels != public.label_set()
}

/// Executes reconciliation steps against the tracker.
pub struct Reconciler {
    tracker: Arc<dyn IssueTracker>,
    links: LinkStore,
    ctx: MirrorContext,
}

impl Reconciler {
    /// Create a reconciler over `tracker` for the repositories in `ctx`.
    pub fn new(tracker: Arc<dyn IssueTracker>, ctx: MirrorContext) -> Self {
        let links = LinkStore::new(Arc::clone(&tracker), ctx.clone());
        Self {
            tracker,
            links,
            ctx,
        }
    }

    /// Carry out a decision for the given event.
    pub async fn apply(&self, decision: Decision, event: &IssueEvent) -> MirrorResult<Outcome> {
        match decision {
            Decision::Create => self.create(&event.issue).await,
            Decision::Update(link) => self.update(&event.issue, &link).await,
            Decision::Delete(link) => self.delete(link.as_ref()).await,
            Decision::Skip(reason) => Ok(Outcome::Skipped { reason }),
            Decision::Reject(precondition) => Err(precondition.into()),
        }
    }

    fn assignees(&self) -> Vec<String> {
        vec![self.ctx.public_assignee.clone()]
    }

    /// Create the public copy of `issue` and link it.
    pub async fn create(&self, issue: &Issue) -> MirrorResult<Outcome> {
        let new_issue = NewIssue {
            title: issue.title.clone(),
            body: issue.body.clone(),
            assignees: self.assignees(),
            labels: issue.label_names_without(&self.ctx.public_label),
        };

        let public_number = self
            .tracker
            .create_issue(&self.ctx.public_repo, &new_issue)
            .await?;
        tracing::info!(
            private_issue = issue.number,
            public_issue = public_number,
            repo = %self.ctx.public_repo,
            "public issue created"
        );

        let target = LinkTarget::new(self.ctx.public_repo.clone(), public_number);
        let link = self
            .links
            .write_link(issue.number, target)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    private_issue = issue.number,
                    public_issue = public_number,
                    error = %err,
                    "public issue created but link comment failed; public issue is now unlinked"
                );
            })?;

        Ok(Outcome::Created {
            public_number,
            link_comment_id: link.comment_id,
        })
    }

    /// Bring the linked public issue in line with `issue`.
    ///
    /// The closing comment and the field update are independent: either,
    /// both or neither may happen.
    pub async fn update(&self, issue: &Issue, link: &Link) -> MirrorResult<Outcome> {
        let public_number = link.public_number();
        let public = self
            .tracker
            .get_issue(&self.ctx.public_repo, public_number)
            .await?;

        let closing_comment_posted =
            if issue.state == IssueState::Closed && public.state == IssueState::Open {
                self.tracker
                    .create_comment(&self.ctx.public_repo, public_number, &self.ctx.closing_comment)
                    .await?;
                tracing::info!(public_issue = public_number, "closing comment posted");
                true
            } else {
                false
            };

        let fields_updated = if needs_update(issue, &public, &self.ctx.public_label) {
            let update = IssueUpdate {
                title: issue.title.clone(),
                body: issue.body.clone(),
                state: issue.state,
                assignees: self.assignees(),
                labels: issue.label_names_without(&self.ctx.public_label),
            };
            self.tracker
                .update_issue(&self.ctx.public_repo, public_number, &update)
                .await?;
            tracing::info!(
                private_issue = issue.number,
                public_issue = public_number,
                state = %issue.state,
                "public issue updated"
            );
            true
        } else {
            tracing::debug!(public_issue = public_number, "public issue already in sync");
            false
        };

        Ok(Outcome::Updated {
            public_number,
            closing_comment_posted,
            fields_updated,
        })
    }

    /// Delete the linked public issue, then the link comment.
    ///
    /// The internal identifier is looked up first and the same identifier
    /// is passed to the deletion.
    pub async fn delete(&self, link: Option<&Link>) -> MirrorResult<Outcome> {
        let public_number = link.map(Link::public_number);

        if let Some(number) = public_number {
            let node_id = self
                .tracker
                .issue_node_id(&self.ctx.public_repo, number)
                .await?;
            self.tracker.delete_issue(&node_id).await?;
            tracing::info!(public_issue = number, node_id = %node_id, "public issue deleted");
        }

        self.links.delete_link(link).await?;

        Ok(Outcome::Deleted {
            public_number,
            link_removed: link.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockIssueTracker, TrackerCall};
    use crate::domain::errors::MirrorError;
    use crate::domain::models::{Label, RepoRef};

    fn ctx() -> MirrorContext {
        MirrorContext {
            private_repo: RepoRef::new("acme", "private"),
            public_repo: RepoRef::new("acme", "pub"),
            bot_username: "mirror-bot".to_string(),
            public_assignee: "triager".to_string(),
            public_label: "public".to_string(),
            closing_comment: "Closing".to_string(),
        }
    }

    fn issue(number: u64, state: IssueState, labels: &[&str]) -> Issue {
        Issue {
            number,
            title: "Crash on save".to_string(),
            body: Some("Steps".to_string()),
            state,
            labels: labels.iter().map(|n| Label::new(*n)).collect(),
            assignees: vec![],
            closed_at: None,
        }
    }

    #[test]
    fn test_needs_update_label_order_is_irrelevant() {
        let private = issue(5, IssueState::Open, &["public", "bug", "ui"]);
        let public = issue(42, IssueState::Open, &["ui", "bug"]);
        assert!(!needs_update(&private, &public, "public"));
    }

    #[test]
    fn test_needs_update_detects_each_field() {
        let private = issue(5, IssueState::Open, &["public", "bug"]);

        let mut public = issue(42, IssueState::Open, &["bug"]);
        public.title = "Old".to_string();
        assert!(needs_update(&private, &public, "public"));

        let mut public = issue(42, IssueState::Open, &["bug"]);
        public.body = Some("Other".to_string());
        assert!(needs_update(&private, &public, "public"));

        let public = issue(42, IssueState::Open, &["bug", "wontfix"]);
        assert!(needs_update(&private, &public, "public"));

        let public = issue(42, IssueState::Closed, &["bug"]);
        assert!(needs_update(&private, &public, "public"));
    }

    #[test]
    fn test_needs_update_null_body_equals_empty() {
        let mut private = issue(5, IssueState::Open, &[]);
        private.body = None;
        let mut public = issue(42, IssueState::Open, &[]);
        public.body = Some(String::new());
        assert!(!needs_update(&private, &public, "public"));
    }

    #[tokio::test]
    async fn test_update_in_sync_makes_no_mutation() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        tracker.insert_issue(&ctx().public_repo, issue(42, IssueState::Open, &["bug"]));
        let reconciler = Reconciler::new(tracker.clone(), ctx());
        let link = Link {
            comment_id: 1,
            target: LinkTarget::new(ctx().public_repo, 42),
        };

        let outcome = reconciler
            .update(&issue(5, IssueState::Open, &["public", "bug"]), &link)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Updated {
                public_number: 42,
                closing_comment_posted: false,
                fields_updated: false
            }
        );
        assert!(tracker.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_link_is_noop() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        let reconciler = Reconciler::new(tracker.clone(), ctx());
        let outcome = reconciler.delete(None).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Deleted {
                public_number: None,
                link_removed: false
            }
        );
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_uses_resolved_node_id() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        tracker.insert_issue(&ctx().public_repo, issue(42, IssueState::Open, &[]));
        let comment_id = tracker.insert_comment(&ctx().private_repo, 5, "mirror-bot", "linked:acme/pub#42");
        let reconciler = Reconciler::new(tracker.clone(), ctx());
        let link = Link {
            comment_id,
            target: LinkTarget::new(ctx().public_repo, 42),
        };

        reconciler.delete(Some(&link)).await.unwrap();

        let calls = tracker.calls();
        assert_eq!(
            calls,
            vec![
                TrackerCall::IssueNodeId {
                    repo: ctx().public_repo,
                    issue_number: 42
                },
                TrackerCall::DeleteIssue {
                    node_id: "I_acme_pub_42".to_string()
                },
                TrackerCall::DeleteComment {
                    repo: ctx().private_repo,
                    comment_id
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_create_link_failure_leaves_public_issue() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        tracker.fail_on("create_comment");
        let reconciler = Reconciler::new(tracker.clone(), ctx());

        let err = reconciler
            .create(&issue(5, IssueState::Open, &["public"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Tracker { operation: "create_comment", .. }));
        assert!(tracker.issue(&ctx().public_repo, 100).is_some());
    }

    #[test]
    fn test_outcome_summary() {
        let outcome = Outcome::Skipped {
            reason: SkipReason::NotMirrored,
        };
        assert_eq!(outcome.summary(), "skipped: issue is not mirrored");
        let outcome = Outcome::Created {
            public_number: 7,
            link_comment_id: 1,
        };
        assert_eq!(outcome.summary(), "created public issue #7");
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = Outcome::Deleted {
            public_number: Some(42),
            link_removed: true,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "deleted");
        assert_eq!(json["public_number"], 42);
    }
}
