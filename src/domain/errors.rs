//! Domain errors for the issue mirror.

use thiserror::Error;

/// Errors that can occur while mirroring a single issue event.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The `public` label was added but the private issue already has a link.
    #[error("Existing linked issue number already exists: {0}")]
    LinkAlreadyExists(u64),

    /// The event requires a linked public issue but none is recorded.
    #[error("No linked issue number found")]
    MissingLink,

    /// A bot comment carries the link prefix but not a valid link.
    #[error("Corrupt link comment {comment_id} ({reason}): {body:?}")]
    CorruptLink {
        comment_id: u64,
        body: String,
        reason: String,
    },

    /// A call to the issue tracker failed.
    #[error("{operation} failed: {message}")]
    Tracker {
        operation: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The webhook payload is missing data the mirror needs.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MirrorError {
    /// Build a [`MirrorError::Tracker`] for the named operation.
    pub fn tracker(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Tracker {
            operation,
            message: message.into(),
        }
    }

    /// Whether this error is a precondition violation detected before any
    /// tracker mutation was attempted.
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::LinkAlreadyExists(_) | Self::MissingLink)
    }
}

pub type MirrorResult<T> = Result<T, MirrorError>;

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        assert_eq!(
            MirrorError::LinkAlreadyExists(42).to_string(),
            "Existing linked issue number already exists: 42"
        );
        assert_eq!(
            MirrorError::MissingLink.to_string(),
            "No linked issue number found"
        );
    }

    #[test]
    fn test_is_precondition() {
        assert!(MirrorError::MissingLink.is_precondition());
        assert!(MirrorError::LinkAlreadyExists(1).is_precondition());
        assert!(!MirrorError::tracker("get_issue", "boom").is_precondition());
    }

    #[test]
    fn test_corrupt_link_display_names_reason() {
        let err = MirrorError::CorruptLink {
            comment_id: 9,
            body: "linked:acme/pub#x".to_string(),
            reason: "invalid issue number \"x\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Corrupt link comment 9 (invalid issue number "x"): "linked:acme/pub#x""#
        );
    }

    #[test]
    fn test_tracker_error_display() {
        let err = MirrorError::tracker("create_issue", "returned 403 Forbidden");
        assert_eq!(err.to_string(), "create_issue failed: returned 403 Forbidden");
    }
}
