mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::stats::DailyStats;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The rule portion of the store document. Missing keys default so a
/// half-written or older document still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredRules {
    pub blocked_keywords: Vec<String>,
    pub blocked_domains: Vec<String>,
    pub custom_domains: Vec<String>,
    pub is_active: bool,
}

impl Default for StoredRules {
    fn default() -> Self {
        Self {
            blocked_keywords: Vec::new(),
            blocked_domains: Vec::new(),
            custom_domains: Vec::new(),
            is_active: true,
        }
    }
}

/// Persistent key-value store shared with the options UI and the
/// blocked-page renderer. The engine reads rules once per page context
/// and only ever writes the renderer's daily stats.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn load_rules(&self) -> Result<StoredRules>;
    async fn load_stats(&self) -> Result<DailyStats>;
    async fn save_stats(&self, stats: &DailyStats) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default() {
        let rules: StoredRules = serde_json::from_str("{}").unwrap();
        assert!(rules.is_active);
        assert!(rules.blocked_keywords.is_empty());
        assert!(rules.custom_domains.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let rules: StoredRules =
            serde_json::from_str(r#"{"blocked_keywords": ["adult"], "is_active": false}"#).unwrap();
        assert_eq!(rules.blocked_keywords, vec!["adult"]);
        assert!(!rules.is_active);
    }
}
