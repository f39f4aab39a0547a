//! Event classification.
//!
//! Decides, from an event and the link already recorded on the private
//! issue, which single reconciliation step the event calls for. This is a
//! pure function; nothing here talks to the tracker.
//!
//! Events that add or remove the public label are matched first. Only
//! when the event is not such a transition does membership of the public
//! label in the issue's current labels decide.

use std::fmt;

use serde::Serialize;

use crate::domain::errors::MirrorError;
use crate::domain::models::{IssueAction, IssueEvent, Link};

/// Why an event needs no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The public label was added to an issue that is already closed.
    PublicLabelOnClosedIssue,
    /// The issue does not carry the public label.
    NotMirrored,
    /// The issue is mirrored but the action has no effect on the mirror.
    UnhandledAction(IssueAction),
    /// The event came from a repository other than the private one.
    ForeignRepository,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicLabelOnClosedIssue => f.write_str("public label added to a closed issue"),
            Self::NotMirrored => f.write_str("issue is not mirrored"),
            Self::UnhandledAction(action) => write!(f, "action '{action}' does not affect the mirror"),
            Self::ForeignRepository => f.write_str("event is not from the private repository"),
        }
    }
}

/// A condition that makes the event fail before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// A link is already recorded; carries the linked public number.
    LinkAlreadyExists(u64),
    /// A link is required but none is recorded.
    MissingLink,
}

impl From<Precondition> for MirrorError {
    fn from(precondition: Precondition) -> Self {
        match precondition {
            Precondition::LinkAlreadyExists(number) => Self::LinkAlreadyExists(number),
            Precondition::MissingLink => Self::MissingLink,
        }
    }
}

/// The reconciliation step selected for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Create the public issue and record the link.
    Create,
    /// Bring the linked public issue in line with the private one.
    Update(Link),
    /// Delete the linked public issue and the link comment; either half is
    /// skipped when there is no link.
    Delete(Option<Link>),
    /// Do nothing; the event does not concern the mirror.
    Skip(SkipReason),
    /// Fail without touching the tracker.
    Reject(Precondition),
}

impl Decision {
    /// Short name used in logs and CLI output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Skip(_) => "skip",
            Self::Reject(_) => "reject",
        }
    }
}

/// Classify an event.
pub fn classify(event: &IssueEvent, link: Option<&Link>, public_label: &str) -> Decision {
    let adds_public = event.action == IssueAction::Labeled && event.label_is(public_label);
    let removes_public = event.action == IssueAction::Unlabeled && event.label_is(public_label);

    if adds_public {
        if !event.issue.is_open() {
            return Decision::Skip(SkipReason::PublicLabelOnClosedIssue);
        }
        return match link {
            None => Decision::Create,
            Some(link) => Decision::Reject(Precondition::LinkAlreadyExists(link.public_number())),
        };
    }

    if removes_public {
        return match link {
            Some(link) => Decision::Delete(Some(link.clone())),
            None => Decision::Reject(Precondition::MissingLink),
        };
    }

    if !event.issue.has_label(public_label) {
        return Decision::Skip(SkipReason::NotMirrored);
    }

    match event.action {
        IssueAction::Edited
        | IssueAction::Labeled
        | IssueAction::Unlabeled
        | IssueAction::Closed
        | IssueAction::Reopened => link.map_or(Decision::Reject(Precondition::MissingLink), |link| {
            Decision::Update(link.clone())
        }),
        IssueAction::Deleted => Decision::Delete(link.cloned()),
        action @ (IssueAction::Opened | IssueAction::Other) => {
            Decision::Skip(SkipReason::UnhandledAction(action))
        }
    }
}

/// The skip reason for an event that is skipped whatever link is recorded.
///
/// Such events need no link lookup. Any other event returns `None`.
pub fn link_independent_skip(event: &IssueEvent, public_label: &str) -> Option<SkipReason> {
    match classify(event, None, public_label) {
        Decision::Skip(reason) => Some(reason),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Issue, IssueState, Label, LinkTarget, RepoRef,
    };
    use chrono::Utc;

    const PUBLIC: &str = "public";

    fn issue(open: bool, labels: &[&str]) -> Issue {
        Issue {
            number: 5,
            title: "Crash on save".to_string(),
            body: None,
            state: if open { IssueState::Open } else { IssueState::Closed },
            labels: labels.iter().map(|n| Label::new(*n)).collect(),
            assignees: vec![],
            closed_at: if open { None } else { Some(Utc::now()) },
        }
    }

    fn event(action: IssueAction, label: Option<&str>, issue: Issue) -> IssueEvent {
        IssueEvent {
            action,
            label: label.map(Label::new),
            issue,
            organization: None,
            repository: None,
        }
    }

    fn link(number: u64) -> Link {
        Link {
            comment_id: 900,
            target: LinkTarget::new(RepoRef::new("org", "pub"), number),
        }
    }

    #[test]
    fn test_labeled_public_open_without_link_creates() {
        let e = event(IssueAction::Labeled, Some(PUBLIC), issue(true, &["public", "bug"]));
        assert_eq!(classify(&e, None, PUBLIC), Decision::Create);
    }

    #[test]
    fn test_labeled_public_open_with_link_rejects() {
        let e = event(IssueAction::Labeled, Some(PUBLIC), issue(true, &["public"]));
        assert_eq!(
            classify(&e, Some(&link(42)), PUBLIC),
            Decision::Reject(Precondition::LinkAlreadyExists(42))
        );
    }

    #[test]
    fn test_labeled_public_closed_is_skipped() {
        let e = event(IssueAction::Labeled, Some(PUBLIC), issue(false, &["public"]));
        assert_eq!(
            classify(&e, None, PUBLIC),
            Decision::Skip(SkipReason::PublicLabelOnClosedIssue)
        );
        assert_eq!(
            classify(&e, Some(&link(3)), PUBLIC),
            Decision::Skip(SkipReason::PublicLabelOnClosedIssue)
        );
    }

    #[test]
    fn test_unlabeled_public_with_link_deletes() {
        let e = event(IssueAction::Unlabeled, Some(PUBLIC), issue(true, &["bug"]));
        assert_eq!(
            classify(&e, Some(&link(42)), PUBLIC),
            Decision::Delete(Some(link(42)))
        );
    }

    #[test]
    fn test_unlabeled_public_without_link_rejects() {
        let e = event(IssueAction::Unlabeled, Some(PUBLIC), issue(true, &[]));
        assert_eq!(
            classify(&e, None, PUBLIC),
            Decision::Reject(Precondition::MissingLink)
        );
    }

    #[test]
    fn test_mirrored_issue_changes_update() {
        for (action, label) in [
            (IssueAction::Edited, None),
            (IssueAction::Labeled, Some("bug")),
            (IssueAction::Unlabeled, Some("bug")),
            (IssueAction::Closed, None),
            (IssueAction::Reopened, None),
        ] {
            let e = event(action, label, issue(true, &["public", "bug"]));
            assert_eq!(
                classify(&e, Some(&link(7)), PUBLIC),
                Decision::Update(link(7)),
                "{action} should update"
            );
        }
    }

    #[test]
    fn test_mirrored_issue_change_without_link_rejects() {
        let e = event(IssueAction::Edited, None, issue(true, &["public"]));
        assert_eq!(
            classify(&e, None, PUBLIC),
            Decision::Reject(Precondition::MissingLink)
        );
    }

    #[test]
    fn test_deleted_mirrored_issue_deletes() {
        let e = event(IssueAction::Deleted, None, issue(true, &["public"]));
        assert_eq!(
            classify(&e, Some(&link(7)), PUBLIC),
            Decision::Delete(Some(link(7)))
        );
        assert_eq!(classify(&e, None, PUBLIC), Decision::Delete(None));
    }

    #[test]
    fn test_unmirrored_issue_is_skipped() {
        for action in [
            IssueAction::Edited,
            IssueAction::Closed,
            IssueAction::Deleted,
            IssueAction::Opened,
        ] {
            let e = event(action, None, issue(true, &["bug"]));
            assert_eq!(
                classify(&e, Some(&link(7)), PUBLIC),
                Decision::Skip(SkipReason::NotMirrored)
            );
        }
    }

    #[test]
    fn test_other_action_on_mirrored_issue_is_skipped() {
        let e = event(IssueAction::Opened, None, issue(true, &["public"]));
        assert_eq!(
            classify(&e, None, PUBLIC),
            Decision::Skip(SkipReason::UnhandledAction(IssueAction::Opened))
        );
    }

    #[test]
    fn test_custom_public_label() {
        let e = event(IssueAction::Labeled, Some("open-source"), issue(true, &["open-source"]));
        assert_eq!(classify(&e, None, "open-source"), Decision::Create);
        assert_eq!(
            classify(&e, None, PUBLIC),
            Decision::Skip(SkipReason::NotMirrored)
        );
    }

    #[test]
    fn test_precondition_into_error() {
        let err: MirrorError = Precondition::LinkAlreadyExists(42).into();
        assert_eq!(err.to_string(), "Existing linked issue number already exists: 42");
    }

    #[test]
    fn test_link_independent_skip_matches_classify() {
        let cases = [
            event(IssueAction::Edited, None, issue(true, &["bug"])),
            event(IssueAction::Labeled, Some(PUBLIC), issue(false, &["public"])),
            event(IssueAction::Opened, None, issue(true, &["public"])),
            event(IssueAction::Edited, None, issue(true, &["public"])),
            event(IssueAction::Labeled, Some(PUBLIC), issue(true, &["public"])),
            event(IssueAction::Unlabeled, Some(PUBLIC), issue(true, &[])),
            event(IssueAction::Deleted, None, issue(true, &["public"])),
        ];
        for e in &cases {
            for existing in [None, Some(link(7))] {
                let decision = classify(e, existing.as_ref(), PUBLIC);
                let expected = match decision {
                    Decision::Skip(reason) => Some(reason),
                    _ => None,
                };
                assert_eq!(link_independent_skip(e, PUBLIC), expected, "{}", e.action);
            }
        }
    }
}
