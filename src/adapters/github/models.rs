//! GitHub REST and GraphQL request/response models.
//!
//! These map to GitHub's JSON payloads and stay inside the adapter. Issue
//! and comment bodies reuse the domain types, which already match the
//! REST shapes.

use serde::{Deserialize, Serialize};

/// Request body for posting a comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommentRequest {
    /// The comment body (plain text or Markdown).
    pub body: String,
}

/// Response from the create-issue endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCreateIssueResponse {
    /// Issue number within the repository.
    pub number: u64,
    /// URL to view the issue in the GitHub UI.
    pub html_url: String,
}

/// A GraphQL request with variables.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

/// Envelope of every GraphQL response.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    /// Error kind, e.g. `NOT_FOUND` or `FORBIDDEN`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl<T> GraphQlResponse<T> {
    /// Joined error messages, if the response carries any.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Whether any error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind.as_deref() == Some("NOT_FOUND"))
    }
}

/// `data` of the issue id lookup query.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueIdData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryNode {
    pub issue: Option<IssueNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueNode {
    /// Global node id, distinct from the issue number.
    pub id: String,
}

/// `data` of the `deleteIssue` mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteIssueData {
    #[serde(rename = "deleteIssue")]
    pub delete_issue: Option<serde_json::Value>,
}
