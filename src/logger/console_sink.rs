use crate::config::LoggingConfig;
use crate::logger::types::{EventLogAction, EventLogEntry, EventLogSink};
use tracing::info;

pub struct ConsoleLogSink {
    config: LoggingConfig,
}

impl ConsoleLogSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl EventLogSink for ConsoleLogSink {
    fn log(&self, entry: &EventLogEntry) {
        if !self.config.enable {
            return;
        }

        let should_log = match entry.action {
            EventLogAction::Blocked | EventLogAction::Warned => self.config.log_blocked,
            EventLogAction::Allowed => self.config.log_allowed,
        };

        if should_log {
            if self.config.format == "json" {
                // Structured logging via tracing
                info!(
                    target: "page_check",
                    candidate = %entry.candidate,
                    checkpoint = ?entry.checkpoint,
                    action = ?entry.action,
                    reason = ?entry.reason,
                    matched = ?entry.matched,
                    lat = %entry.latency_us
                );
            } else {
                // Text format
                let action_str = match entry.action {
                    EventLogAction::Blocked => {
                        let reason = entry.reason.unwrap_or("unknown");
                        match &entry.matched {
                            Some(rule) => format!("blocked ({} rule: {})", reason, rule),
                            None => format!("blocked ({})", reason),
                        }
                    }
                    EventLogAction::Warned => match &entry.matched {
                        Some(rule) => format!("warned (keyword: {})", rule),
                        None => "warned".to_string(),
                    },
                    EventLogAction::Allowed => "allowed".to_string(),
                };

                info!(
                    "[{:?}] {} -> {} [{}us]",
                    entry.checkpoint, entry.candidate, action_str, entry.latency_us
                );
            }
        }
    }
}
