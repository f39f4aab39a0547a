use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the issue mirror
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Owner of both repositories; taken from the event when unset
    #[serde(default)]
    pub organization: Option<String>,

    /// Repository whose issues are mirrored
    #[serde(default)]
    pub private_repo: String,

    /// Repository that receives the mirrored issues
    #[serde(default)]
    pub public_repo: String,

    /// Login of the account that writes link comments
    #[serde(default)]
    pub bot_username: String,

    /// Login assigned to every mirrored issue
    #[serde(default)]
    pub public_assignee: String,

    /// Access token of the bot account
    #[serde(default)]
    pub token: String,

    /// Name of the label that marks an issue for mirroring
    #[serde(default = "default_public_label")]
    pub public_label: String,

    /// Comment posted on the public issue when the private one closes
    #[serde(default = "default_closing_comment")]
    pub closing_comment: String,

    /// GitHub REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GitHub GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retry policy for read-only tracker calls
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_public_label() -> String {
    "public".to_string()
}

fn default_closing_comment() -> String {
    "Closing \u{2013} look for this in the next release! \u{1f603}".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: None,
            private_repo: String::new(),
            public_repo: String::new(),
            bot_username: String::new(),
            public_assignee: String::new(),
            token: String::new(),
            public_label: default_public_label(),
            closing_comment: default_closing_comment(),
            api_url: default_api_url(),
            graphql_url: default_graphql_url(),
            logging: LoggingConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// A copy that is safe to print: the token is replaced.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.token.is_empty() {
            copy.token = "[REDACTED]".to_string();
        }
        copy
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("organization", &self.organization)
            .field("private_repo", &self.private_repo)
            .field("public_repo", &self.public_repo)
            .field("bot_username", &self.bot_username)
            .field("public_assignee", &self.public_assignee)
            .field("token", &"[REDACTED]")
            .field("public_label", &self.public_label)
            .field("closing_comment", &self.closing_comment)
            .field("api_url", &self.api_url)
            .field("graphql_url", &self.graphql_url)
            .field("logging", &self.logging)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for a copy of the log in JSON; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts; 0 disables retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            token: "ghp_supersecret".to_string(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_supersecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_redacted_copy() {
        let config = Config {
            token: "ghp_supersecret".to_string(),
            public_repo: "pub".to_string(),
            ..Default::default()
        };
        let redacted = config.redacted();
        assert_eq!(redacted.token, "[REDACTED]");
        assert_eq!(redacted.public_repo, "pub");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.public_label, "public");
        assert!(config.closing_comment.starts_with("Closing"));
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.retry.max_retries, 3);
    }
}
