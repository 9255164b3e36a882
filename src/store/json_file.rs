use super::{RuleStore, StoredRules};
use crate::stats::DailyStats;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// The whole on-disk document: rules at the top level, the renderer's
/// stats under their own key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreDocument {
    #[serde(flatten)]
    rules: StoredRules,
    daily_stats: DailyStats,
}

/// JSON-file-backed store, the profile-storage analog. A missing file
/// is a fresh profile (defaults), any other read failure is surfaced
/// so callers can fail open.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::default());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read rule store {}", self.path.display())
                });
            }
        };
        serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse rule store {}", self.path.display())
        })
    }

    async fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        let contents = serde_json::to_string_pretty(doc).context("Failed to encode rule store")?;
        fs::write(&self.path, contents).await.with_context(|| {
            format!("Failed to write rule store {}", self.path.display())
        })
    }
}

#[async_trait]
impl RuleStore for JsonFileStore {
    async fn load_rules(&self) -> Result<StoredRules> {
        Ok(self.read_document().await?.rules)
    }

    async fn load_stats(&self) -> Result<DailyStats> {
        Ok(self.read_document().await?.daily_stats)
    }

    async fn save_stats(&self, stats: &DailyStats) -> Result<()> {
        let mut doc = self.read_document().await?;
        doc.daily_stats = stats.clone();
        self.write_document(&doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_missing_file_is_fresh_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));

        let rules = store.load_rules().await.unwrap();
        assert!(rules.is_active);
        assert!(rules.blocked_domains.is_empty());
    }

    #[tokio::test]
    async fn test_loads_rules_and_defaults_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"blocked_keywords": ["adult"], "custom_domains": ["example.com"]}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let rules = store.load_rules().await.unwrap();
        assert_eq!(rules.blocked_keywords, vec!["adult"]);
        assert_eq!(rules.custom_domains, vec!["example.com"]);
        assert!(rules.is_active);
        assert!(rules.blocked_domains.is_empty());
    }

    #[tokio::test]
    async fn test_stats_round_trip_keeps_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"blocked_keywords": ["adult"]}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let mut stats = store.load_stats().await.unwrap();
        stats.record_block(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 60);
        store.save_stats(&stats).await.unwrap();

        let reloaded = store.load_stats().await.unwrap();
        assert_eq!(reloaded, stats);
        // Writing stats must not clobber the rules.
        let rules = store.load_rules().await.unwrap();
        assert_eq!(rules.blocked_keywords, vec!["adult"]);
    }

    #[tokio::test]
    async fn test_unreadable_store_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the store path: read fails with something
        // other than NotFound.
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_rules().await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_document_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load_rules().await.is_err());
    }
}
