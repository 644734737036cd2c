use anyhow::Result;
use clap::Parser;
use resume_builder::cli::{run, Cli};
use resume_builder::core::ConfigManager;
use resume_builder::logging::init_logging;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::load()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }

    init_logging(&config.logging, cli.debug)?;

    info!("Loaded configuration for environment: {}", config.environment);
    info!("Resume service: {}", config.service.base_url);

    run(cli, config).await
}
