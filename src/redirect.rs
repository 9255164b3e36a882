use crate::engine::{DomainSource, EngineState};
use url::form_urlencoded;

/// Match context carried to the blocked page as query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    Domain {
        domain: String,
        source: DomainSource,
        url: String,
    },
    Keyword {
        keyword: String,
        url: String,
    },
    Search {
        keyword: String,
        query: String,
    },
}

impl BlockReason {
    pub fn label(&self) -> &'static str {
        match self {
            BlockReason::Domain { .. } => "domain",
            BlockReason::Keyword { .. } => "keyword",
            BlockReason::Search { .. } => "search",
        }
    }

    /// Index into the stats reason counters; mirrors
    /// `stats::REASON_LABELS` order.
    pub fn stat_index(&self) -> usize {
        match self {
            BlockReason::Domain { .. } => 0,
            BlockReason::Keyword { .. } => 1,
            BlockReason::Search { .. } => 2,
        }
    }

    /// The rule that fired, for logging.
    pub fn matched_rule(&self) -> &str {
        match self {
            BlockReason::Domain { domain, .. } => domain,
            BlockReason::Keyword { keyword, .. } => keyword,
            BlockReason::Search { keyword, .. } => keyword,
        }
    }
}

/// Builds the blocked-page replace-navigation. The engine state latch
/// makes every call after the first a no-op for one page context, so
/// overlapping checkpoints cannot double-navigate.
pub struct Redirector {
    target: String,
    state: EngineState,
}

impl Redirector {
    pub fn new(target: String, state: EngineState) -> Self {
        Self { target, state }
    }

    /// Returns the navigation to perform, or None when one is already
    /// in flight.
    pub fn redirect(&self, reason: &BlockReason) -> Option<String> {
        if !self.state.begin_redirect() {
            return None;
        }
        Some(self.blocked_page_url(reason))
    }

    /// `<target>?reason=...&...`, all values percent-encoded.
    pub fn blocked_page_url(&self, reason: &BlockReason) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("reason", reason.label());
        match reason {
            BlockReason::Domain { domain, url, .. } => {
                params.append_pair("domain", domain);
                params.append_pair("url", url);
            }
            BlockReason::Keyword { keyword, url } => {
                params.append_pair("keyword", keyword);
                params.append_pair("url", url);
            }
            BlockReason::Search { keyword, query } => {
                params.append_pair("keyword", keyword);
                params.append_pair("query", query);
            }
        }
        format!("{}?{}", self.target, params.finish())
    }
}
