//! The link between a private issue and its public mirror.
//!
//! The link is stored as a bot comment on the private issue with the body
//! `linked:<owner>/<repo>#<number>`. Comments written by earlier versions
//! put a space after the colon, so that is accepted when parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix that marks a comment as a link sentinel.
pub const LINK_PREFIX: &str = "linked:";

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Create a reference from owner and repository name.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The public issue a link points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub repo: RepoRef,
    pub number: u64,
}

impl LinkTarget {
    pub const fn new(repo: RepoRef, number: u64) -> Self {
        Self { repo, number }
    }

    /// The sentinel comment body for this target.
    pub fn to_comment_body(&self) -> String {
        format!("{LINK_PREFIX}{self}")
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Why a link body could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LinkParseError(pub String);

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '#')
}

impl FromStr for LinkTarget {
    type Err = LinkParseError;

    /// Parses `<owner>/<repo>#<number>`, optionally prefixed with `linked:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(LINK_PREFIX).unwrap_or(s).trim();

        let (path, number) = s
            .rsplit_once('#')
            .ok_or_else(|| LinkParseError(format!("missing '#' in {s:?}")))?;
        let (owner, name) = path
            .split_once('/')
            .ok_or_else(|| LinkParseError(format!("missing '/' in {path:?}")))?;

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(LinkParseError(format!("invalid repository {path:?}")));
        }

        let number = number
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| LinkParseError(format!("invalid issue number {number:?}")))?;

        Ok(Self::new(RepoRef::new(owner, name), number))
    }
}

/// A link comment found on a private issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Id of the bot comment that stores the link.
    pub comment_id: u64,
    pub target: LinkTarget,
}

impl Link {
    /// Number of the linked public issue.
    pub const fn public_number(&self) -> u64 {
        self.target.number
    }
}
