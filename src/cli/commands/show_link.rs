//! Implementation of the `issue-mirror show-link` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::github::GitHubClient;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Link, MirrorContext};
use crate::domain::ports::IssueTracker;
use crate::services::LinkStore;

#[derive(Args, Debug)]
pub struct ShowLinkArgs {
    /// Private issue number
    pub number: u64,

    /// Owner of both repositories, when no organization is configured
    #[arg(long, env = "GITHUB_REPOSITORY_OWNER")]
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShowLinkOutput {
    pub private_repo: String,
    pub issue_number: u64,
    pub link: Option<Link>,
}

impl CommandOutput for ShowLinkOutput {
    fn to_human(&self) -> String {
        match &self.link {
            Some(link) => format!(
                "{}#{} -> {} (comment {})",
                self.private_repo, self.issue_number, link.target, link.comment_id
            ),
            None => format!("{}#{} is not linked", self.private_repo, self.issue_number),
        }
    }
}

pub async fn execute(args: ShowLinkArgs, config: &Config, json_mode: bool) -> Result<()> {
    let tracker: Arc<dyn IssueTracker> = Arc::new(GitHubClient::from_config(config));
    let result = run(&args, config, tracker).await?;
    output(&result, json_mode);
    Ok(())
}

pub async fn run(
    args: &ShowLinkArgs,
    config: &Config,
    tracker: Arc<dyn IssueTracker>,
) -> Result<ShowLinkOutput> {
    let owner = config
        .organization
        .as_deref()
        .filter(|org| !org.is_empty())
        .or(args.owner.as_deref())
        .context("No organization configured; pass --owner")?;

    let ctx = MirrorContext::for_owner(config, owner);
    let private_repo = ctx.private_repo.to_string();
    let link = LinkStore::new(tracker, ctx)
        .find_link(args.number)
        .await
        .with_context(|| format!("Failed to read link of {private_repo}#{}", args.number))?;

    Ok(ShowLinkOutput {
        private_repo,
        issue_number: args.number,
        link,
    })
}
