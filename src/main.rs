use anyhow::Context;
use clap::Parser;
use cwtail::cli::Cli;
use cwtail_core::Config;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cwtail::logging::init(cli.debug_log.as_deref())?;

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let settings = cli.settings(&config, chrono::Utc::now())?;

    let report = cwtail::run(settings).await;
    if report.all_failed() {
        tracing::error!("every region failed, exiting");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
