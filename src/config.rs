use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[serde(default = "default_blocked_page")]
    pub blocked_page: String,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    // host -> query parameter carrying the search text
    #[serde(default = "default_search_engines")]
    pub search_engines: HashMap<String, String>,

    #[serde(default = "default_search_fields")]
    pub search_fields: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_blocked")]
    pub log_blocked: bool,
    #[serde(default = "default_log_allowed")]
    pub log_allowed: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_sinks")]
    pub sinks: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_store_path() -> String {
    "navguard-store.json".to_string()
}
fn default_blocked_page() -> String {
    "blocked.html".to_string()
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_search_engines() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("google.com".to_string(), "q".to_string());
    m.insert("bing.com".to_string(), "q".to_string());
    m.insert("duckduckgo.com".to_string(), "q".to_string());
    m.insert("search.yahoo.com".to_string(), "p".to_string());
    m.insert("ecosia.org".to_string(), "q".to_string());
    m.insert("search.brave.com".to_string(), "q".to_string());
    m.insert("startpage.com".to_string(), "query".to_string());
    m.insert("yandex.com".to_string(), "text".to_string());
    m.insert("baidu.com".to_string(), "wd".to_string());
    m.insert("youtube.com".to_string(), "search_query".to_string());
    m
}
fn default_search_fields() -> Vec<String> {
    ["q", "query", "search", "keyword", "keywords", "s", "p", "text", "wd"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_log_enable() -> bool {
    true
}
fn default_log_blocked() -> bool {
    true
}
fn default_log_allowed() -> bool {
    false
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_sinks() -> Vec<String> {
    vec!["console".to_string()]
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            blocked_page: default_blocked_page(),
            monitor: MonitorConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            search_engines: default_search_engines(),
            search_fields: default_search_fields(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            log_blocked: default_log_blocked(),
            log_allowed: default_log_allowed(),
            format: default_log_format(),
            level: default_log_level(),
            sinks: default_log_sinks(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config TOML")?;
        Ok(config)
    }

    pub fn get_search_engines_sorted(&self) -> Vec<(String, String)> {
        let mut list: Vec<_> = self
            .monitor
            .search_engines
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.monitor.debounce_ms, 100);
        assert!(config.logging.enable);
        assert!(config.monitor.search_engines.contains_key("google.com"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            store_path = "/tmp/rules.json"

            [monitor]
            debounce_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.store_path, "/tmp/rules.json");
        assert_eq!(config.monitor.debounce_ms, 50);
        assert_eq!(config.blocked_page, "blocked.html");
        assert!(!config.monitor.search_fields.is_empty());
    }
}
