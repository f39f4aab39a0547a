//! Issue tracker data as seen by the mirror.
//!
//! These types deserialize directly from both the `issues` webhook payload
//! and the REST API responses, which share the same issue shape.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// The state as the tracker spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A user account (issue assignee or comment author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// An issue in either the private or the public repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Sequential number within the repository.
    pub number: u64,
    pub title: String,
    /// Body text; the tracker reports an empty body as null.
    #[serde(default)]
    pub body: Option<String>,
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    /// Set while the issue is closed, null once reopened.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Whether the issue is open, judged by `closed_at` the way webhook
    /// consumers see it at delivery time.
    pub const fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Whether the issue carries a label with the given name.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }

    /// Label names with `excluded` filtered out, in their original order.
    pub fn label_names_without(&self, excluded: &str) -> Vec<String> {
        self.labels
            .iter()
            .map(|label| label.name.clone())
            .filter(|name| name != excluded)
            .collect()
    }

    /// Label names as a set, for order-insensitive comparison.
    pub fn label_set(&self) -> BTreeSet<&str> {
        self.labels.iter().map(|label| label.name.as_str()).collect()
    }

    /// Body with null normalized to the empty string.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub user: User,
    #[serde(default)]
    pub body: String,
}

impl Comment {
    /// Whether the comment was written by the given account.
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.user.login == login
    }
}

/// Fields for a new issue in the public repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
}

/// A full overwrite of the mirrored fields of a public issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueUpdate {
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
}
