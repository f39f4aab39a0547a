//! Implementation of the `issue-mirror check-config` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug, Default)]
pub struct CheckConfigArgs {}

#[derive(Debug, Serialize)]
pub struct CheckConfigOutput {
    pub valid: bool,
    pub config: Config,
}

impl CommandOutput for CheckConfigOutput {
    fn to_human(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config).unwrap_or_default();
        format!("Configuration is valid\n\n{yaml}")
    }
}

/// Print the configuration that was loaded and validated at startup.
pub fn execute(_args: CheckConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = CheckConfigOutput {
        valid: true,
        config: config.redacted(),
    };
    output(&result, json_mode);
    Ok(())
}
