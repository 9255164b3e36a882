use super::matcher::DomainSource;
use std::sync::Arc;

/// The "Hot Path" engine for checking hostnames and free text.
pub trait RuleMatcher: Send + Sync {
    /// Returns the listed domain the hostname falls under, or None.
    /// Matches exact hostnames and dot-boundary subdomains only.
    fn match_hostname(&self, host: &str) -> Option<(&str, DomainSource)>;

    /// Returns the first configured keyword contained in `text`
    /// (case-insensitive), or None. Empty text never matches.
    fn match_keyword(&self, text: &str) -> Option<&str>;

    /// Global toggle. When false, both match functions report no block.
    fn is_active(&self) -> bool;
}

/// The "Control Plane" for rule loading.
#[async_trait::async_trait]
pub trait RuleProvider: Send + Sync {
    /// Reads the rule store and builds a new Matcher.
    async fn load(&self) -> Arc<dyn RuleMatcher>;
}
