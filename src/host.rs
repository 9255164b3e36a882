//! The stdio host: line-delimited JSON in, actions out. This is the
//! documented extension point the page-side shim talks to; nothing
//! here patches platform primitives.

use crate::engine::RuleProvider;
use crate::monitor::{Action, NavigationEvent, PageMonitor};
use crate::renderer;
use crate::store::RuleStore;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Out-of-band messages sharing the wire with navigation events.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlMessage {
    /// The blocked page rendered; credit the daily stats.
    PageShown {
        #[serde(default)]
        seconds_blocked: u64,
    },
    /// The options UI saved; re-read the store and swap the rule set.
    Reload,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Incoming {
    Control(ControlMessage),
    Navigation(NavigationEvent),
}

pub struct AgentHost {
    monitor: PageMonitor,
    provider: Arc<dyn RuleProvider>,
    store: Arc<dyn RuleStore>,
    actions_rx: mpsc::Receiver<Action>,
}

impl AgentHost {
    pub fn new(
        monitor: PageMonitor,
        provider: Arc<dyn RuleProvider>,
        store: Arc<dyn RuleStore>,
        actions_rx: mpsc::Receiver<Action>,
    ) -> Self {
        Self {
            monitor,
            provider,
            store,
            actions_rx,
        }
    }

    /// Drives the host until the reader closes. Replies to events in
    /// order; debounced checks answer out of band through the actions
    /// channel.
    pub async fn run<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let AgentHost {
            monitor,
            provider,
            store,
            mut actions_rx,
        } = self;
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                action = actions_rx.recv() => {
                    match action {
                        Some(action) => write_action(&mut writer, &action).await?,
                        // All senders gone; nothing left to forward.
                        None => break,
                    }
                }
                line = lines.next_line() => {
                    match line.context("Failed to read host input")? {
                        None => {
                            info!("Host input closed, shutting down.");
                            break;
                        }
                        Some(line) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if let Some(action) = dispatch(&monitor, &provider, &store, &line).await
                            {
                                write_action(&mut writer, &action).await?;
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

async fn dispatch(
    monitor: &PageMonitor,
    provider: &Arc<dyn RuleProvider>,
    store: &Arc<dyn RuleStore>,
    line: &str,
) -> Option<Action> {
    match serde_json::from_str::<Incoming>(line) {
        Ok(Incoming::Navigation(event)) => monitor.handle_event(event).await,
        Ok(Incoming::Control(ControlMessage::Reload)) => {
            let matcher = provider.load().await;
            monitor.update_rules(matcher);
            None
        }
        Ok(Incoming::Control(ControlMessage::PageShown { seconds_blocked })) => {
            let today = chrono::Local::now().date_naive();
            if let Err(e) =
                renderer::record_page_shown(store.as_ref(), today, seconds_blocked).await
            {
                error!("Failed to update daily stats: {:#}", e);
            }
            None
        }
        Err(e) => {
            warn!("Malformed host message, skipping: {}", e);
            None
        }
    }
}

async fn write_action<W: AsyncWrite + Unpin>(writer: &mut W, action: &Action) -> Result<()> {
    let mut line = serde_json::to_string(action).context("Failed to encode action")?;
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .context("Failed to write host output")?;
    writer.flush().await.context("Failed to flush host output")
}
