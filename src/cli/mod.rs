//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

#[derive(Parser, Debug)]
#[command(name = "issue-mirror")]
#[command(about = "Mirror labeled private issues into a public repository", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .github/issue-mirror.yml when present)
    #[arg(short, long, global = true, env = "ISSUE_MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle the `issues` webhook event of the current workflow run
    Handle(commands::handle::HandleArgs),

    /// Print the link recorded on a private issue
    ShowLink(commands::show_link::ShowLinkArgs),

    /// Print the resolved configuration with the token redacted
    CheckConfig(commands::check_config::CheckConfigArgs),
}

/// Report a failed command and exit with status 1.
///
/// Under GitHub Actions the message is also emitted as an `::error::`
/// workflow command so it shows up as an annotation on the run.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let message = format!("{err:#}");
    tracing::error!(error = %message, "command failed");

    if json_mode {
        let payload = serde_json::json!({ "success": false, "error": message });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
    } else {
        eprintln!("{} {message}", style("error:").red().bold());
    }

    if running_in_actions() {
        println!("::error::{}", escape_workflow_data(&message));
    }

    std::process::exit(1);
}

fn running_in_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true")
}

/// Escape a message for use as workflow command data.
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
