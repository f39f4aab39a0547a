use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file read when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".github/issue-mirror.yml";

/// GitHub Actions inputs understood by the loader, as `INPUT_<NAME>` env vars.
const ACTION_INPUTS: &[&str] = &[
    "organization",
    "private_repo",
    "public_repo",
    "bot_username",
    "public_assignee",
    "bot_access_token",
    "public_label",
    "closing_comment",
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Private and public repository are both '{0}'")]
    SameRepository(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be positive and not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The YAML file at `path`, or `.github/issue-mirror.yml` if present
    /// 3. Environment variables (MIRROR_* prefix, `__` for nesting)
    /// 4. GitHub Actions inputs (INPUT_* prefix, highest priority)
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), Path::to_path_buf);
        if path.is_some() && !file.exists() {
            anyhow::bail!("Config file {} does not exist", file.display());
        }

        let config: Config = Self::figment(&file)
            .extract()
            .context(format!("Failed to load configuration (file: {})", file.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged providers, without extraction or validation.
    pub fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Env::prefixed("MIRROR_").split("__"))
            .merge(Self::action_inputs())
    }

    /// GitHub Actions inputs as a provider.
    ///
    /// The runner exports every declared input, set or not, so empty
    /// values are dropped instead of overriding lower layers.
    fn action_inputs() -> Serialized<BTreeMap<String, String>> {
        let inputs = ACTION_INPUTS
            .iter()
            .filter_map(|name| {
                let value = std::env::var(format!("INPUT_{}", name.to_uppercase())).ok()?;
                if value.trim().is_empty() {
                    return None;
                }
                let key = if *name == "bot_access_token" { "token" } else { *name };
                Some((key.to_string(), value))
            })
            .collect();
        Serialized::defaults(inputs)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let required = [
            ("private_repo", &config.private_repo),
            ("public_repo", &config.public_repo),
            ("bot_username", &config.bot_username),
            ("public_assignee", &config.public_assignee),
            ("token", &config.token),
            ("public_label", &config.public_label),
            ("api_url", &config.api_url),
            ("graphql_url", &config.graphql_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }

        if config.private_repo == config.public_repo {
            return Err(ConfigError::SameRepository(config.private_repo.clone()));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        // Validate retry config
        if config.retry.initial_backoff_ms == 0
            || config.retry.initial_backoff_ms > config.retry.max_backoff_ms
        {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
