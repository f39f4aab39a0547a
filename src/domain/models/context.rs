//! Per-invocation settings shared by the link store and the reconciler.

use super::config::Config;
use super::event::IssueEvent;
use super::link::RepoRef;
use crate::domain::errors::{MirrorError, MirrorResult};

/// Everything the mirror needs to know about where it is operating.
///
/// Built once per event from [`Config`] and the event itself, then handed
/// to each component explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorContext {
    pub private_repo: RepoRef,
    pub public_repo: RepoRef,
    /// Login whose comments on the private issue are link candidates.
    pub bot_username: String,
    /// Single assignee of every public issue.
    pub public_assignee: String,
    /// Label that marks an issue for mirroring.
    pub public_label: String,
    pub closing_comment: String,
}

impl MirrorContext {
    /// Resolve the context for an event.
    ///
    /// The configured organization wins; otherwise the owner of the
    /// repository that sent the event is used for both repositories.
    pub fn resolve(config: &Config, event: &IssueEvent) -> MirrorResult<Self> {
        let owner = config
            .organization
            .as_deref()
            .filter(|org| !org.is_empty())
            .or_else(|| event.owner_login())
            .ok_or_else(|| {
                MirrorError::InvalidPayload(
                    "no organization configured and none in the event".to_string(),
                )
            })?;

        Ok(Self::for_owner(config, owner))
    }

    /// Build the context for repositories owned by `owner`.
    pub fn for_owner(config: &Config, owner: &str) -> Self {
        Self {
            private_repo: RepoRef::new(owner, &config.private_repo),
            public_repo: RepoRef::new(owner, &config.public_repo),
            bot_username: config.bot_username.clone(),
            public_assignee: config.public_assignee.clone(),
            public_label: config.public_label.clone(),
            closing_comment: config.closing_comment.clone(),
        }
    }
}
