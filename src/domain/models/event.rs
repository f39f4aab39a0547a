//! The `issues` webhook event.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::issue::{Issue, Label, User};
use crate::domain::errors::MirrorResult;

/// The `action` field of an `issues` webhook event.
///
/// Actions the mirror has no rule for (`assigned`, `milestoned`, ...) are
/// kept as [`IssueAction::Other`] rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueAction {
    Opened,
    Edited,
    Deleted,
    Closed,
    Reopened,
    Labeled,
    Unlabeled,
    #[serde(other)]
    Other,
}

impl IssueAction {
    /// The action as it appears in the payload.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Deleted => "deleted",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Labeled => "labeled",
            Self::Unlabeled => "unlabeled",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for IssueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal repository block of the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRepository {
    pub name: String,
    pub owner: User,
}

/// One `issues` webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    pub action: IssueAction,
    /// The label added or removed; only present on `labeled`/`unlabeled`.
    #[serde(default)]
    pub label: Option<Label>,
    /// Snapshot of the issue after the change.
    pub issue: Issue,
    /// Present when the repository belongs to an organization.
    #[serde(default)]
    pub organization: Option<User>,
    #[serde(default)]
    pub repository: Option<EventRepository>,
}

impl IssueEvent {
    /// Parse an event from its JSON payload.
    ///
    /// A payload that is not an `issues` event is a
    /// [`MirrorError::Serialization`](crate::domain::errors::MirrorError::Serialization).
    pub fn from_json(payload: &str) -> MirrorResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Whether this event adds or removes the label called `name`.
    pub fn label_is(&self, name: &str) -> bool {
        self.label.as_ref().is_some_and(|label| label.name == name)
    }

    /// Owner login of the repository the event came from: the organization
    /// when present, else the repository owner.
    pub fn owner_login(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .map(|org| org.login.as_str())
            .or_else(|| self.repository.as_ref().map(|repo| repo.owner.login.as_str()))
    }
}
