use super::matcher::{DomainSource, RuleSetMatcher};
use super::traits::{RuleMatcher, RuleProvider};
use crate::store::RuleStore;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Builds matchers from the rule store, normalizing user input on the way.
pub struct StoreRuleProvider {
    store: Arc<dyn RuleStore>,
}

impl StoreRuleProvider {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// Normalizes one domain entry to a bare lowercase hostname.
    /// Users paste full URLs; comments and empties are dropped.
    fn parse_domain(entry: &str) -> Option<Box<str>> {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with('#') {
            return None;
        }

        let mut host = entry.to_lowercase();
        for scheme in ["https://", "http://"] {
            if let Some(rest) = host.strip_prefix(scheme) {
                host = rest.to_string();
                break;
            }
        }
        if let Some(idx) = host.find(['/', '?', '#']) {
            host.truncate(idx);
        }
        if let Some(idx) = host.find(':') {
            host.truncate(idx);
        }
        let host = host
            .trim_matches('.')
            .trim_start_matches("www.")
            .trim_matches('.');
        if host.is_empty() {
            return None;
        }
        Some(host.to_string().into_boxed_str())
    }

    fn parse_keyword(entry: &str) -> Option<Box<str>> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        Some(entry.to_lowercase().into_boxed_str())
    }

    fn build_matcher(
        maintained: &[String],
        custom: &[String],
        keywords: &[String],
        active: bool,
    ) -> RuleSetMatcher {
        let mut domains = FxHashMap::default();
        for entry in maintained {
            if let Some(host) = Self::parse_domain(entry) {
                domains.insert(host, DomainSource::Maintained);
            }
        }
        // Custom entries win on collision so the match reports the
        // list the user actually touched.
        for entry in custom {
            if let Some(host) = Self::parse_domain(entry) {
                domains.insert(host, DomainSource::Custom);
            }
        }

        let keywords: Vec<Box<str>> = keywords
            .iter()
            .filter_map(|k| Self::parse_keyword(k))
            .collect();

        RuleSetMatcher::new(domains, keywords, active)
    }
}

#[async_trait::async_trait]
impl RuleProvider for StoreRuleProvider {
    async fn load(&self) -> Arc<dyn RuleMatcher> {
        match self.store.load_rules().await {
            Ok(rules) => {
                let matcher = Self::build_matcher(
                    &rules.blocked_domains,
                    &rules.custom_domains,
                    &rules.blocked_keywords,
                    rules.is_active,
                );
                info!(
                    "Rule set loaded: {} domains, {} keywords, active: {}",
                    matcher.domain_count(),
                    matcher.keyword_count(),
                    matcher.is_active()
                );
                Arc::new(matcher)
            }
            Err(e) => {
                // Fail open: a broken store must never break browsing.
                error!("Rule store read failed, blocking disabled: {:#}", e);
                Arc::new(RuleSetMatcher::disabled())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_normalization() {
        assert_eq!(
            StoreRuleProvider::parse_domain(" HTTPS://WWW.Example.COM/watch?v=1 "),
            Some("example.com".to_string().into_boxed_str())
        );
        assert_eq!(
            StoreRuleProvider::parse_domain("example.com:8080"),
            Some("example.com".to_string().into_boxed_str())
        );
        assert_eq!(
            StoreRuleProvider::parse_domain("sub.example.com."),
            Some("sub.example.com".to_string().into_boxed_str())
        );
        assert_eq!(StoreRuleProvider::parse_domain("# a comment"), None);
        assert_eq!(StoreRuleProvider::parse_domain("   "), None);
        assert_eq!(StoreRuleProvider::parse_domain("https://"), None);
    }

    #[test]
    fn test_parse_keyword_normalization() {
        assert_eq!(
            StoreRuleProvider::parse_keyword("  Adult Content "),
            Some("adult content".to_string().into_boxed_str())
        );
        assert_eq!(StoreRuleProvider::parse_keyword(""), None);
    }

    #[test]
    fn test_custom_entry_wins_on_collision() {
        let matcher = StoreRuleProvider::build_matcher(
            &["example.com".to_string()],
            &["www.example.com".to_string()],
            &[],
            true,
        );
        assert_eq!(
            matcher.match_hostname("example.com"),
            Some(("example.com", DomainSource::Custom))
        );
    }

    #[test]
    fn test_build_matcher_counts() {
        let matcher = StoreRuleProvider::build_matcher(
            &["a.com".to_string(), "# skip".to_string()],
            &["b.com".to_string()],
            &["one".to_string(), " ".to_string(), "two".to_string()],
            true,
        );
        assert_eq!(matcher.domain_count(), 2);
        assert_eq!(matcher.keyword_count(), 2);
    }
}
