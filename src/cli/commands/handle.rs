//! Implementation of the `issue-mirror handle` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;

use crate::adapters::github::GitHubClient;
use crate::application::EventHandler;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, IssueEvent, MirrorContext};
use crate::domain::ports::IssueTracker;
use crate::services::Outcome;

/// The only webhook event the mirror reacts to.
const ISSUES_EVENT: &str = "issues";

#[derive(Args, Debug)]
pub struct HandleArgs {
    /// Path to the webhook payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Name of the webhook event that triggered the run
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = ISSUES_EVENT)]
    pub event_name: String,
}

#[derive(Debug, Serialize)]
pub struct HandleOutput {
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
    /// `None` when the event was not an `issues` event.
    pub result: Option<Outcome>,
}

impl CommandOutput for HandleOutput {
    fn to_human(&self) -> String {
        match (&self.result, self.issue_number) {
            (Some(outcome), Some(number)) => format!(
                "{} {} on issue #{number}: {}",
                style("issues").bold(),
                self.action.as_deref().unwrap_or("?"),
                outcome.summary()
            ),
            (Some(outcome), None) => outcome.summary(),
            (None, _) => format!("Ignoring '{}' event", self.event_name),
        }
    }
}

pub async fn execute(args: HandleArgs, config: &Config, json_mode: bool) -> Result<()> {
    let tracker: Arc<dyn IssueTracker> = Arc::new(GitHubClient::from_config(config));
    let result = run(&args, config, tracker).await?;
    output(&result, json_mode);
    Ok(())
}

/// Read the payload, resolve the context and handle the event.
pub async fn run(
    args: &HandleArgs,
    config: &Config,
    tracker: Arc<dyn IssueTracker>,
) -> Result<HandleOutput> {
    if args.event_name != ISSUES_EVENT {
        tracing::info!(event_name = %args.event_name, "not an issues event, nothing to do");
        return Ok(HandleOutput {
            event_name: args.event_name.clone(),
            action: None,
            issue_number: None,
            result: None,
        });
    }

    let payload = tokio::fs::read_to_string(&args.event_path)
        .await
        .with_context(|| format!("Failed to read event payload {}", args.event_path.display()))?;
    let event = IssueEvent::from_json(&payload).context("Failed to parse issues event payload")?;

    let ctx = MirrorContext::resolve(config, &event)?;
    tracing::debug!(
        private_repo = %ctx.private_repo,
        public_repo = %ctx.public_repo,
        "resolved mirror context"
    );

    let handler = EventHandler::new(tracker, ctx);
    let outcome = handler.handle(&event).await?;

    Ok(HandleOutput {
        event_name: args.event_name.clone(),
        action: Some(event.action.to_string()),
        issue_number: Some(event.issue.number),
        result: Some(outcome),
    })
}
