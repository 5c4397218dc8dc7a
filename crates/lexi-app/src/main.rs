use clap::Parser;

mod cli;
mod commands;
mod logging;
mod pipeline;
mod settings;

#[cfg(test)]
mod tests;

use self::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = settings::load_config(cli.common.config.as_deref())?;
    settings::apply_overrides(&mut config, &cli.common);

    let log_path = logging::init(&config.paths.log_dir, &cli.command.tool_name(), cli.common.debug)?;
    tracing::info!("Log file: {}", log_path.display());
    tracing::debug!("Config: {:?}", config);

    let result = commands::run(cli.command, &cli.common, &config).await;
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
