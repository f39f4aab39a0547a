//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use issue_mirror::adapters::mock::MockIssueTracker;
use issue_mirror::domain::models::{
    Config, Issue, IssueAction, IssueEvent, IssueState, Label, MirrorContext, RepoRef,
};
use issue_mirror::EventHandler;

pub const BOT: &str = "mirror-bot";
pub const ASSIGNEE: &str = "triager";
pub const CLOSING: &str = "Closing \u{2013} look for this in the next release! \u{1f603}";

pub fn config(owner: &str) -> Config {
    Config {
        organization: Some(owner.to_string()),
        private_repo: "private".to_string(),
        public_repo: "pub".to_string(),
        bot_username: BOT.to_string(),
        public_assignee: ASSIGNEE.to_string(),
        token: "ghp_test".to_string(),
        ..Default::default()
    }
}

pub fn ctx(owner: &str) -> MirrorContext {
    MirrorContext::for_owner(&config(owner), owner)
}

pub fn private_repo(owner: &str) -> RepoRef {
    RepoRef::new(owner, "private")
}

pub fn public_repo(owner: &str) -> RepoRef {
    RepoRef::new(owner, "pub")
}

pub fn issue(number: u64, title: &str, state: IssueState, labels: &[&str]) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        body: Some(format!("Body of {title}")),
        state,
        labels: labels.iter().map(|name| Label::new(*name)).collect(),
        assignees: vec![],
        closed_at: match state {
            IssueState::Open => None,
            IssueState::Closed => Some(Utc::now()),
        },
    }
}

pub fn event(action: IssueAction, label: Option<&str>, issue: Issue) -> IssueEvent {
    IssueEvent {
        action,
        label: label.map(Label::new),
        issue,
        organization: None,
        repository: None,
    }
}

/// A handler over a fresh mock tracker whose writes are authored by the bot.
pub fn handler(owner: &str) -> (Arc<MockIssueTracker>, EventHandler) {
    let tracker = Arc::new(MockIssueTracker::new(BOT));
    let handler = EventHandler::new(tracker.clone(), ctx(owner));
    (tracker, handler)
}

/// Webhook payload for an `issues` event, as GitHub delivers it.
pub fn payload(action: &str, label: Option<&str>, labels: &[&str], owner: &str) -> String {
    let mut value = serde_json::json!({
        "action": action,
        "issue": {
            "number": 5,
            "title": "Crash on save",
            "body": "Steps to reproduce",
            "state": "open",
            "closed_at": null,
            "labels": labels.iter().map(|name| serde_json::json!({ "name": name })).collect::<Vec<_>>(),
            "assignees": []
        },
        "repository": { "name": "private", "owner": { "login": owner } },
        "sender": { "login": "alice" }
    });
    if let Some(label) = label {
        value["label"] = serde_json::json!({ "name": label });
    }
    value.to_string()
}
