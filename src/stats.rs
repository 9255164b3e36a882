use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

pub const REASON_LABELS: [&str; 3] = ["domain", "keyword", "search"];

/// Seconds credited per block when no real blocked time has been
/// accumulated yet.
pub const FALLBACK_SECS_PER_BLOCK: u64 = 300;

/// In-process counters for the current agent run. Lock-free; a
/// background task dumps them through the logger periodically.
#[derive(Debug)]
pub struct StatsCollector {
    checks_total: AtomicU64,
    blocked_total: AtomicU64,
    warned_total: AtomicU64,
    blocks_by_reason: [AtomicU64; 3],

    log_interval: Duration,
}

impl StatsCollector {
    /// `log_interval_sec == 0` disables the periodic dump.
    pub fn new(log_interval_sec: u64) -> Arc<Self> {
        let stats = Arc::new(Self {
            checks_total: AtomicU64::new(0),
            blocked_total: AtomicU64::new(0),
            warned_total: AtomicU64::new(0),
            blocks_by_reason: [0; 3].map(|_| AtomicU64::new(0)),
            log_interval: Duration::from_secs(log_interval_sec),
        });

        if log_interval_sec > 0 {
            let stats_clone = stats.clone();
            tokio::spawn(async move {
                stats_clone.run_logger().await;
            });
        }

        stats
    }

    pub fn inc_checks(&self) {
        self.checks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_warned(&self) {
        self.warned_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_blocked_by_reason(&self, reason_idx: usize) {
        self.blocked_total.fetch_add(1, Ordering::Relaxed);
        if reason_idx < self.blocks_by_reason.len() {
            self.blocks_by_reason[reason_idx].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn checks_total(&self) -> u64 {
        self.checks_total.load(Ordering::Relaxed)
    }

    pub fn blocked_total(&self) -> u64 {
        self.blocked_total.load(Ordering::Relaxed)
    }

    pub fn warned_total(&self) -> u64 {
        self.warned_total.load(Ordering::Relaxed)
    }

    async fn run_logger(&self) {
        let mut interval = time::interval(self.log_interval);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let checks = self.checks_total.load(Ordering::Relaxed);
        let blocked = self.blocked_total.load(Ordering::Relaxed);
        let warned = self.warned_total.load(Ordering::Relaxed);

        let mut reason_stats = String::new();
        if blocked > 0 {
            for (i, label) in REASON_LABELS.iter().enumerate() {
                let count = self.blocks_by_reason[i].load(Ordering::Relaxed);
                if count > 0 {
                    let pct = (count as f64 / blocked as f64) * 100.0;
                    reason_stats.push_str(&format!("[{}: {} ({:.1}%)] ", label, count, pct));
                }
            }
        }

        info!(
            "STATS DUMP: Checks: {}, Blocked: {} ({:.1}%), Warned: {}, Reasons: {}",
            checks,
            blocked,
            if checks > 0 {
                (blocked as f64 / checks as f64) * 100.0
            } else {
                0.0
            },
            warned,
            reason_stats
        );
    }
}

/// Persistent daily counters shown on the blocked page. Owned by the
/// renderer side; the matching path never touches them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStats {
    pub blocks_today: u32,
    pub last_block_date: Option<NaiveDate>,
    pub total_time_blocked_secs: u64,
    pub focus_streak: u32,
}

impl DailyStats {
    /// Applies one blocked-page display. Counters reset when the stored
    /// date is not `today`; the streak extends only across consecutive
    /// days.
    pub fn record_block(&mut self, today: NaiveDate, blocked_secs: u64) {
        match self.last_block_date {
            Some(date) if date == today => {
                self.blocks_today += 1;
            }
            Some(date) => {
                self.blocks_today = 1;
                self.focus_streak = if date.succ_opt() == Some(today) {
                    self.focus_streak + 1
                } else {
                    1
                };
            }
            None => {
                self.blocks_today = 1;
                self.focus_streak = 1;
            }
        }
        self.last_block_date = Some(today);
        self.total_time_blocked_secs += blocked_secs;
    }

    /// Time-saved estimate: accumulated blocked seconds, or a flat
    /// per-block heuristic while nothing has been accumulated.
    pub fn time_saved_secs(&self) -> u64 {
        if self.total_time_blocked_secs > 0 {
            self.total_time_blocked_secs
        } else {
            self.blocks_today as u64 * FALLBACK_SECS_PER_BLOCK
        }
    }
}
