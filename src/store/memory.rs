use super::{RuleStore, StoredRules};
use crate::stats::DailyStats;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory store for tests and embedding. Can be told to fail reads
/// to exercise the fail-open path.
pub struct MemoryStore {
    rules: RwLock<StoredRules>,
    stats: RwLock<DailyStats>,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new(rules: StoredRules) -> Self {
        Self {
            rules: RwLock::new(rules),
            stats: RwLock::new(DailyStats::default()),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn set_rules(&self, rules: StoredRules) {
        *self.rules.write().unwrap() = rules;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoredRules::default())
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn load_rules(&self) -> Result<StoredRules> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("store context invalidated"));
        }
        Ok(self.rules.read().unwrap().clone())
    }

    async fn load_stats(&self) -> Result<DailyStats> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("store context invalidated"));
        }
        Ok(self.stats.read().unwrap().clone())
    }

    async fn save_stats(&self, stats: &DailyStats) -> Result<()> {
        *self.stats.write().unwrap() = stats.clone();
        Ok(())
    }
}
