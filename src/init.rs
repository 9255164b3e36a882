//! Initialization helpers for the agent startup.

use crate::config::Config;
use crate::engine::{EngineState, RuleProvider, StoreRuleProvider};
use crate::logger::EventLogger;
use crate::monitor::{Action, PageMonitor};
use crate::stats::StatsCollector;
use crate::store::RuleStore;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Loads the rule set and installs the page monitor, in that order:
/// the store read completes before any monitor hook exists, so a check
/// can never race the initial load.
pub async fn init_engine(
    config: Config,
    store: Arc<dyn RuleStore>,
    stats: Arc<StatsCollector>,
    logger: Arc<EventLogger>,
    actions: mpsc::Sender<Action>,
) -> Result<(PageMonitor, Arc<dyn RuleProvider>)> {
    let provider: Arc<dyn RuleProvider> = Arc::new(StoreRuleProvider::new(store));
    let matcher = provider.load().await;

    let state = EngineState::new();
    let monitor = PageMonitor::install(config, matcher, stats, logger, state, actions)?;
    Ok((monitor, provider))
}
