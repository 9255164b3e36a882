pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleLogSink;
pub use self::memory_sink::MemoryLogSink;
pub use self::types::{Checkpoint, EventLogAction, EventLogEntry, EventLogSink};

use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fans decision log entries out to the configured sinks. Each sink
/// drains its own bounded channel so a slow sink never stalls a check.
pub struct EventLogger {
    sinks: Vec<mpsc::Sender<EventLogEntry>>,
}

impl EventLogger {
    pub fn new(config: LoggingConfig, extra_sinks: Vec<Box<dyn EventLogSink>>) -> Arc<Self> {
        let mut sinks = Vec::new();

        for sink_type in &config.sinks {
            if sink_type == "console" {
                let console_sink = ConsoleLogSink::new(config.clone());
                sinks.push(Self::spawn_sink(Box::new(console_sink)));
            } else if sink_type == "memory" {
                let memory_sink = MemoryLogSink::new(100);
                sinks.push(Self::spawn_sink(Box::new(memory_sink)));
            } else {
                tracing::warn!("Unknown log sink type: {}", sink_type);
            }
        }

        for sink in extra_sinks {
            sinks.push(Self::spawn_sink(sink));
        }

        Arc::new(Self { sinks })
    }

    fn spawn_sink(sink: Box<dyn EventLogSink>) -> mpsc::Sender<EventLogEntry> {
        let (tx, mut rx) = mpsc::channel(1000);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                sink.log(&entry);
            }
        });
        tx
    }

    pub async fn log(&self, entry: EventLogEntry) {
        let len = self.sinks.len();
        for (i, sink) in self.sinks.iter().enumerate() {
            // Fire and forget, don't block caller if buffer full
            if i == len - 1 {
                let _ = sink.try_send(entry);
                break;
            }
            let _ = sink.try_send(entry.clone());
        }
    }
}
