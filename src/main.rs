//! issue-mirror CLI entry point.

use clap::Parser;

use issue_mirror::cli::{commands, handle_error, Cli, Commands};
use issue_mirror::infrastructure::config::ConfigLoader;
use issue_mirror::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Handle(args) => commands::handle::execute(args, &config, cli.json).await,
        Commands::ShowLink(args) => commands::show_link::execute(args, &config, cli.json).await,
        Commands::CheckConfig(args) => commands::check_config::execute(args, &config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
