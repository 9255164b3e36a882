use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;

use navguard::config::Config;
use navguard::host::AgentHost;
use navguard::init::{init_engine, setup_logging};
use navguard::logger::EventLogger;
use navguard::stats::StatsCollector;
use navguard::store::{JsonFileStore, RuleStore};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args().nth(1).unwrap_or("navguard.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting navguard...");

    if !std::path::Path::new(&config_path).exists() {
        info!("Config file not found, using defaults.");
    }

    // 3. Init Stats
    let stats_interval = if config.stats.enable {
        config.stats.log_interval_seconds
    } else {
        0
    };
    let stats = StatsCollector::new(stats_interval);

    // 4. Init Event Logger
    let logger = EventLogger::new(config.logging.clone(), Vec::new());

    // 5. Open Rule Store
    let store: Arc<dyn RuleStore> = Arc::new(JsonFileStore::new(&config.store_path));

    // 6. Load Rules & Install Monitor (load strictly precedes monitoring)
    let (actions_tx, actions_rx) = mpsc::channel(64);
    let (monitor, provider) =
        init_engine(config.clone(), store.clone(), stats, logger, actions_tx).await?;

    // 7. Run Host Loop on stdio
    let host = AgentHost::new(monitor, provider, store, actions_rx);
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    info!("Agent listening on stdio");

    // 8. Graceful Shutdown
    tokio::select! {
        result = host.run(stdin, stdout) => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
