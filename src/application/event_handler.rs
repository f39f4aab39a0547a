//! Event handling entry point.
//!
//! Wires the link store, the classifier and the reconciler together for a
//! single webhook event: resolve the link, pick a decision, execute it.

use std::sync::Arc;

use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::MirrorResult;
use crate::domain::models::{IssueEvent, MirrorContext};
use crate::domain::ports::IssueTracker;
use crate::services::{
    classify, link_independent_skip, Decision, LinkStore, Outcome, Reconciler, SkipReason,
};

/// Handles one `issues` event end to end.
pub struct EventHandler {
    ctx: MirrorContext,
    links: LinkStore,
    reconciler: Reconciler,
}

impl EventHandler {
    /// Create a handler over `tracker` for the repositories in `ctx`.
    pub fn new(tracker: Arc<dyn IssueTracker>, ctx: MirrorContext) -> Self {
        Self {
            links: LinkStore::new(Arc::clone(&tracker), ctx.clone()),
            reconciler: Reconciler::new(tracker, ctx.clone()),
            ctx,
        }
    }

    /// The context this handler operates in.
    pub const fn context(&self) -> &MirrorContext {
        &self.ctx
    }

    /// Handle an event.
    ///
    /// Precondition failures are returned as errors without any tracker
    /// mutation; tracker failures propagate unchanged.
    pub async fn handle(&self, event: &IssueEvent) -> MirrorResult<Outcome> {
        let span = tracing::info_span!(
            "mirror_event",
            run_id = %Uuid::new_v4(),
            action = %event.action,
            issue = event.issue.number,
        );
        self.handle_inner(event).instrument(span).await
    }

    async fn handle_inner(&self, event: &IssueEvent) -> MirrorResult<Outcome> {
        if let Some(repository) = &event.repository {
            if repository.name != self.ctx.private_repo.name {
                warn!(
                    repository = %repository.name,
                    expected = %self.ctx.private_repo.name,
                    "ignoring event from another repository"
                );
                return Ok(Outcome::Skipped {
                    reason: SkipReason::ForeignRepository,
                });
            }
        }

        if let Some(reason) = link_independent_skip(event, &self.ctx.public_label) {
            let outcome = Outcome::Skipped { reason };
            info!(outcome = %outcome.summary(), "event handled");
            return Ok(outcome);
        }

        let link = self.links.find_link(event.issue.number).await?;
        let decision = classify(event, link.as_ref(), &self.ctx.public_label);
        info!(
            decision = decision.name(),
            linked_issue = link.as_ref().map(|l| l.public_number()),
            "event classified"
        );

        if let Decision::Reject(precondition) = &decision {
            warn!(?precondition, "event rejected");
        }

        let outcome = self.reconciler.apply(decision, event).await?;
        info!(outcome = %outcome.summary(), "event handled");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockIssueTracker;
    use crate::domain::models::RepoRef;

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

    #[tokio::test]
    async fn test_foreign_repository_is_skipped_without_calls() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        let handler = EventHandler::new(tracker.clone(), ctx());
        let event = IssueEvent::from_json(
            r#"{
                "action": "labeled",
                "label": { "name": "public" },
                "issue": { "number": 5, "title": "x", "state": "open", "labels": [{ "name": "public" }] },
                "repository": { "name": "elsewhere", "owner": { "login": "acme" } }
            }"#,
        )
        .unwrap();

        let outcome = handler.handle(&event).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Skipped {
                reason: SkipReason::ForeignRepository
            }
        );
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unmirrored_event_skips_before_reading_link() {
        let tracker = Arc::new(MockIssueTracker::new("mirror-bot"));
        tracker.insert_comment(&ctx().private_repo, 5, "mirror-bot", "linked:acme/pub#oops");
        let handler = EventHandler::new(tracker.clone(), ctx());
        let event = IssueEvent::from_json(
            r#"{
                "action": "edited",
                "issue": { "number": 5, "title": "x", "state": "open", "labels": [{ "name": "bug" }] },
                "repository": { "name": "private", "owner": { "login": "acme" } }
            }"#,
        )
        .unwrap();

        let outcome = handler.handle(&event).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Skipped {
                reason: SkipReason::NotMirrored
            }
        );
        assert!(tracker.calls().is_empty());
    }
}
