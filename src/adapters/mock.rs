//! In-memory issue tracker for testing.
//!
//! Keeps issues and comments per repository, records every call in order
//! and can be told to fail specific operations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::errors::{MirrorError, MirrorResult};
use crate::domain::models::{
    Comment, Issue, IssueState, IssueUpdate, Label, NewIssue, RepoRef, User,
};
use crate::domain::ports::IssueTracker;

/// A call received by [`MockIssueTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    ListComments { repo: RepoRef, issue_number: u64 },
    CreateComment { repo: RepoRef, issue_number: u64, body: String },
    DeleteComment { repo: RepoRef, comment_id: u64 },
    CreateIssue { repo: RepoRef, issue: NewIssue },
    GetIssue { repo: RepoRef, issue_number: u64 },
    UpdateIssue { repo: RepoRef, issue_number: u64, update: IssueUpdate },
    IssueNodeId { repo: RepoRef, issue_number: u64 },
    DeleteIssue { node_id: String },
}

impl TrackerCall {
    /// Whether the call changes tracker state.
    pub const fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ListComments { .. } | Self::GetIssue { .. } | Self::IssueNodeId { .. }
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    issues: HashMap<String, BTreeMap<u64, Issue>>,
    comments: HashMap<(String, u64), Vec<Comment>>,
    next_issue_number: u64,
    next_comment_id: u64,
    calls: Vec<TrackerCall>,
    failing: HashSet<&'static str>,
}

/// Mock issue tracker for testing.
#[derive(Debug)]
pub struct MockIssueTracker {
    /// Login recorded as the author of comments this tracker creates.
    actor: String,
    state: Mutex<MockState>,
}

fn node_id(repo: &RepoRef, number: u64) -> String {
    format!("I_{}_{}_{number}", repo.owner, repo.name)
}

impl MockIssueTracker {
    /// Create an empty tracker whose writes are authored by `actor`.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            state: Mutex::new(MockState {
                next_issue_number: 100,
                next_comment_id: 1_000,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed an issue.
    pub fn insert_issue(&self, repo: &RepoRef, issue: Issue) {
        let mut state = self.lock();
        state.next_issue_number = state.next_issue_number.max(issue.number + 1);
        state
            .issues
            .entry(repo.to_string())
            .or_default()
            .insert(issue.number, issue);
    }

    /// Seed a comment and return its id.
    pub fn insert_comment(&self, repo: &RepoRef, issue_number: u64, author: &str, body: &str) -> u64 {
        let mut state = self.lock();
        let id = state.next_comment_id;
        state.next_comment_id += 1;
        state
            .comments
            .entry((repo.to_string(), issue_number))
            .or_default()
            .push(Comment {
                id,
                user: User {
                    login: author.to_string(),
                },
                body: body.to_string(),
            });
        id
    }

    /// Make every future call of `operation` fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.lock().failing.insert(operation);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.lock().calls.clone()
    }

    /// Calls that changed tracker state.
    pub fn mutations(&self) -> Vec<TrackerCall> {
        self.calls().into_iter().filter(TrackerCall::is_mutation).collect()
    }

    /// Current copy of an issue, if it exists.
    pub fn issue(&self, repo: &RepoRef, number: u64) -> Option<Issue> {
        self.lock()
            .issues
            .get(&repo.to_string())
            .and_then(|issues| issues.get(&number))
            .cloned()
    }

    /// Current comments on an issue.
    pub fn comments(&self, repo: &RepoRef, issue_number: u64) -> Vec<Comment> {
        self.lock()
            .comments
            .get(&(repo.to_string(), issue_number))
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, operation: &'static str, call: TrackerCall) -> MirrorResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(MirrorError::tracker(operation, "injected failure"));
        }
        Ok(state)
    }
}

#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Vec<Comment>> {
        let state = self.record(
            "list_comments",
            TrackerCall::ListComments {
                repo: repo.clone(),
                issue_number,
            },
        )?;
        Ok(state
            .comments
            .get(&(repo.to_string(), issue_number))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> MirrorResult<Comment> {
        let mut state = self.record(
            "create_comment",
            TrackerCall::CreateComment {
                repo: repo.clone(),
                issue_number,
                body: body.to_string(),
            },
        )?;
        let comment = Comment {
            id: state.next_comment_id,
            user: User {
                login: self.actor.clone(),
            },
            body: body.to_string(),
        };
        state.next_comment_id += 1;
        state
            .comments
            .entry((repo.to_string(), issue_number))
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, repo: &RepoRef, comment_id: u64) -> MirrorResult<()> {
        let mut state = self.record(
            "delete_comment",
            TrackerCall::DeleteComment {
                repo: repo.clone(),
                comment_id,
            },
        )?;
        let key = repo.to_string();
        let mut found = false;
        for ((comment_repo, _), comments) in &mut state.comments {
            if *comment_repo == key {
                let before = comments.len();
                comments.retain(|c| c.id != comment_id);
                found |= comments.len() != before;
            }
        }
        if found {
            Ok(())
        } else {
            Err(MirrorError::NotFound(format!("comment {comment_id} in {repo}")))
        }
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> MirrorResult<u64> {
        let mut state = self.record(
            "create_issue",
            TrackerCall::CreateIssue {
                repo: repo.clone(),
                issue: issue.clone(),
            },
        )?;
        let number = state.next_issue_number;
        state.next_issue_number += 1;
        let created = Issue {
            number,
            title: issue.title.clone(),
            body: issue.body.clone(),
            state: IssueState::Open,
            labels: issue.labels.iter().map(Label::new).collect(),
            assignees: issue
                .assignees
                .iter()
                .map(|login| User {
                    login: login.clone(),
                })
                .collect(),
            closed_at: None,
        };
        state
            .issues
            .entry(repo.to_string())
            .or_default()
            .insert(number, created);
        Ok(number)
    }

    async fn get_issue(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<Issue> {
        let state = self.record(
            "get_issue",
            TrackerCall::GetIssue {
                repo: repo.clone(),
                issue_number,
            },
        )?;
        state
            .issues
            .get(&repo.to_string())
            .and_then(|issues| issues.get(&issue_number))
            .cloned()
            .ok_or_else(|| MirrorError::NotFound(format!("issue {repo}#{issue_number}")))
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        update: &IssueUpdate,
    ) -> MirrorResult<()> {
        let mut state = self.record(
            "update_issue",
            TrackerCall::UpdateIssue {
                repo: repo.clone(),
                issue_number,
                update: update.clone(),
            },
        )?;
        let issue = state
            .issues
            .get_mut(&repo.to_string())
            .and_then(|issues| issues.get_mut(&issue_number))
            .ok_or_else(|| MirrorError::NotFound(format!("issue {repo}#{issue_number}")))?;
        issue.title.clone_from(&update.title);
        issue.body.clone_from(&update.body);
        issue.labels = update.labels.iter().map(Label::new).collect();
        issue.assignees = update
            .assignees
            .iter()
            .map(|login| User {
                login: login.clone(),
            })
            .collect();
        if issue.state != update.state {
            issue.closed_at = match update.state {
                IssueState::Closed => Some(Utc::now()),
                IssueState::Open => None,
            };
        }
        issue.state = update.state;
        Ok(())
    }

    async fn issue_node_id(&self, repo: &RepoRef, issue_number: u64) -> MirrorResult<String> {
        let state = self.record(
            "issue_node_id",
            TrackerCall::IssueNodeId {
                repo: repo.clone(),
                issue_number,
            },
        )?;
        let exists = state
            .issues
            .get(&repo.to_string())
            .is_some_and(|issues| issues.contains_key(&issue_number));
        if exists {
            Ok(node_id(repo, issue_number))
        } else {
            Err(MirrorError::NotFound(format!("issue {repo}#{issue_number}")))
        }
    }

    async fn delete_issue(&self, node: &str) -> MirrorResult<()> {
        let mut state = self.record(
            "delete_issue",
            TrackerCall::DeleteIssue {
                node_id: node.to_string(),
            },
        )?;
        for (repo_key, issues) in &mut state.issues {
            let Some((owner, name)) = repo_key.split_once('/') else {
                continue;
            };
            let repo = RepoRef::new(owner, name);
            let target = issues
                .keys()
                .copied()
                .find(|number| node_id(&repo, *number) == node);
            if let Some(number) = target {
                issues.remove(&number);
                return Ok(());
            }
        }
        Err(MirrorError::NotFound(format!("issue node {node}")))
    }
}
