mod adapters;
mod core;
mod global_constants;
mod ports;

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::adapters::{FilesystemFlaggedStore, SsimSimilarityScorer};
use crate::core::models::{MonitorConfig, ReferenceTemplates};
use crate::core::orchestrators::ComplianceMonitor;
use crate::global_constants::{
    APPLICATION_NAME, LOG_TAG_MAIN, MESSAGE_INTERRUPT_RECEIVED,
    MESSAGE_STOPPED_BY_USER, STARTUP_BANNER,
};
use crate::ports::XcapScreenCapturer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("{} Starting {}", LOG_TAG_MAIN, APPLICATION_NAME);
    println!("{}", STARTUP_BANNER);

    let config = MonitorConfig::from_constants();
    config.validate()?;

    let templates = ReferenceTemplates::load(&config);
    log::info!(
        "{} {} of {} reference templates loaded",
        LOG_TAG_MAIN,
        templates.len(),
        config.regions.len()
    );

    let flagged_store = FilesystemFlaggedStore::new(&config.output_directory);
    log::info!(
        "{} Flagged screenshots go to {:?}",
        LOG_TAG_MAIN,
        flagged_store.output_directory()
    );

    let monitor = ComplianceMonitor::build(
        Arc::new(config),
        Arc::new(templates),
        Arc::new(XcapScreenCapturer::initialize()),
        Arc::new(SsimSimilarityScorer::new()),
        Arc::new(flagged_store),
    );

    let cancel_token = CancellationToken::new();
    let interrupt_token = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("{} {}", LOG_TAG_MAIN, MESSAGE_INTERRUPT_RECEIVED);
                interrupt_token.cancel();
            }
            Err(error) => {
                log::error!("{} Failed to listen for interrupt: {}", LOG_TAG_MAIN, error);
            }
        }
    });

    monitor.run_loop(cancel_token).await?;

    log::info!("{} {}", LOG_TAG_MAIN, MESSAGE_STOPPED_BY_USER);
    Ok(())
}
