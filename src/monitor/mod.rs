mod debounce;
mod events;
mod search;

pub use debounce::Debouncer;
pub use events::{Action, FormField, NavigationEvent};
pub use search::{find_search_field, SearchEngines};

use crate::config::Config;
use crate::engine::{EngineState, RuleMatcher};
use crate::logger::{Checkpoint, EventLogAction, EventLogEntry, EventLogger};
use crate::redirect::{BlockReason, Redirector};
use crate::stats::StatsCollector;
use anyhow::{bail, Result};
use arc_swap::ArcSwap;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Reduces the shim's navigation signals to matcher checks and block
/// actions. Installed once per page context; the rule set is swapped
/// atomically on reload so the hot path never locks.
#[derive(Clone)]
pub struct PageMonitor {
    config: Config,
    rules: Arc<ArcSwap<Arc<dyn RuleMatcher>>>,
    search: Arc<SearchEngines>,
    stats: Arc<StatsCollector>,
    logger: Arc<EventLogger>,
    state: EngineState,
    redirector: Arc<Redirector>,
    debouncer: Debouncer,
    actions: mpsc::Sender<Action>,
}

impl PageMonitor {
    /// Refuses double installation for a context: the first caller
    /// claims `state`, later attempts error out.
    pub fn install(
        config: Config,
        rules: Arc<dyn RuleMatcher>,
        stats: Arc<StatsCollector>,
        logger: Arc<EventLogger>,
        state: EngineState,
        actions: mpsc::Sender<Action>,
    ) -> Result<Self> {
        if !state.try_init() {
            bail!("Page monitor already installed for this context");
        }

        let search = Arc::new(SearchEngines::new(config.get_search_engines_sorted()));
        let redirector = Arc::new(Redirector::new(config.blocked_page.clone(), state.clone()));
        let debouncer = Debouncer::new(Duration::from_millis(config.monitor.debounce_ms));

        Ok(Self {
            config,
            rules: Arc::new(ArcSwap::new(Arc::new(rules))),
            search,
            stats,
            logger,
            state,
            redirector,
            debouncer,
            actions,
        })
    }

    pub fn update_rules(&self, new_rules: Arc<dyn RuleMatcher>) {
        info!("Updating active rule set...");
        self.rules.store(Arc::new(new_rules));
    }

    pub async fn handle_event(&self, event: NavigationEvent) -> Option<Action> {
        match event {
            NavigationEvent::InitialLoad { url } => {
                // New page context: the previous navigation (if any)
                // has landed.
                self.state.reset_navigation();
                self.check_current_page(&url)
                    .await
                    .map(|redirect| Action::Redirect { url: redirect })
            }
            NavigationEvent::RouteChange { url }
            | NavigationEvent::HistoryPush { url }
            | NavigationEvent::HistoryReplace { url }
            | NavigationEvent::PopState { url } => {
                self.schedule_check(url);
                None
            }
            NavigationEvent::LinkClick { href, page_url } => {
                self.check_link(&href, page_url.as_deref()).await
            }
            NavigationEvent::FormSubmit { fields } => self.check_form(&fields).await,
            NavigationEvent::LiveInput { value } => self.check_input(&value).await,
        }
    }

    /// Route-change class signals coalesce through the debouncer; only
    /// the last URL of a burst is checked, after the quiet window.
    fn schedule_check(&self, url: String) {
        let monitor = self.clone();
        self.debouncer.schedule(async move {
            if let Some(redirect) = monitor.check_current_page(&url).await {
                // A closed channel means the host is shutting down.
                let _ = monitor.actions.send(Action::Redirect { url: redirect }).await;
            }
        });
    }

    /// Checks the effective location: hostname first, then keyword
    /// over the URL text, then the search query. First match wins and
    /// returns the blocked-page navigation to perform.
    pub async fn check_current_page(&self, raw_url: &str) -> Option<String> {
        if self.state.redirect_in_flight() {
            return None;
        }
        let start = Instant::now();

        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                debug!("Unparsable page URL {}: {}", raw_url, e);
                return None;
            }
        };
        if self.is_blocked_page(&url) {
            return None;
        }

        self.stats.inc_checks();
        match self.evaluate(&url) {
            Some(reason) => {
                self.apply_block(reason, url.as_str(), Checkpoint::Navigation, start)
                    .await
            }
            None => {
                self.log_allowed(url.as_str(), Checkpoint::Navigation, start)
                    .await;
                None
            }
        }
    }

    async fn check_link(&self, href: &str, page_url: Option<&str>) -> Option<Action> {
        if self.state.redirect_in_flight() {
            return None;
        }
        let start = Instant::now();

        // An href that cannot be resolved to a URL is not a block
        // signal; the click proceeds.
        let target = match Url::parse(href) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(page_url?).ok()?;
                base.join(href).ok()?
            }
            Err(e) => {
                debug!("Ignoring unparsable link href {}: {}", href, e);
                return None;
            }
        };

        self.stats.inc_checks();
        match self.evaluate(&target) {
            Some(reason) => self
                .apply_block(reason, target.as_str(), Checkpoint::LinkClick, start)
                .await
                .map(|redirect| Action::Cancel { redirect }),
            None => {
                self.log_allowed(target.as_str(), Checkpoint::LinkClick, start)
                    .await;
                None
            }
        }
    }

    async fn check_form(&self, fields: &[FormField]) -> Option<Action> {
        if self.state.redirect_in_flight() {
            return None;
        }
        let start = Instant::now();

        let field = find_search_field(fields, &self.config.monitor.search_fields)?;
        if field.value.trim().is_empty() {
            return None;
        }

        self.stats.inc_checks();
        let keyword = {
            let rules = self.rules.load();
            rules.match_keyword(&field.value).map(str::to_string)
        };
        match keyword {
            Some(keyword) => {
                let reason = BlockReason::Search {
                    keyword,
                    query: field.value.clone(),
                };
                self.apply_block(reason, &field.value, Checkpoint::FormSubmit, start)
                    .await
                    .map(|redirect| Action::Cancel { redirect })
            }
            None => {
                self.log_allowed(&field.value, Checkpoint::FormSubmit, start)
                    .await;
                None
            }
        }
    }

    /// Live keystrokes only ever warn; navigation stays untouched.
    async fn check_input(&self, value: &str) -> Option<Action> {
        let keyword = {
            let rules = self.rules.load();
            rules.match_keyword(value).map(str::to_string)
        }?;

        self.stats.inc_warned();
        if self.config.logging.enable {
            self.logger
                .log(EventLogEntry {
                    candidate: value.to_string(),
                    checkpoint: Checkpoint::LiveInput,
                    action: EventLogAction::Warned,
                    reason: None,
                    matched: Some(keyword.clone()),
                    latency_us: 0,
                })
                .await;
        }
        Some(Action::Warn { keyword })
    }

    fn evaluate(&self, url: &Url) -> Option<BlockReason> {
        let rules = self.rules.load();

        // (a) hostname against the domain lists
        if let Some(host) = url.host_str() {
            if let Some((domain, source)) = rules.match_hostname(host) {
                return Some(BlockReason::Domain {
                    domain: domain.to_string(),
                    source,
                    url: url.as_str().to_string(),
                });
            }
        }

        // (b) keyword over the decoded URL text. On a recognized
        // search engine the query string is left out here and checked
        // on its own below, so query hits carry the search tag.
        let search_query = self.search.query_for(url);
        let url_text = if search_query.is_some() {
            let mut trimmed = url.clone();
            trimmed.set_query(None);
            decode(trimmed.as_str())
        } else {
            decode(url.as_str())
        };
        if let Some(keyword) = rules.match_keyword(&url_text) {
            return Some(BlockReason::Keyword {
                keyword: keyword.to_string(),
                url: url.as_str().to_string(),
            });
        }

        // (c) the search query text
        if let Some(query) = search_query {
            if let Some(keyword) = rules.match_keyword(&query) {
                return Some(BlockReason::Search {
                    keyword: keyword.to_string(),
                    query,
                });
            }
        }

        None
    }

    async fn apply_block(
        &self,
        reason: BlockReason,
        candidate: &str,
        checkpoint: Checkpoint,
        start: Instant,
    ) -> Option<String> {
        // The latch in the redirector makes overlapping checkpoints
        // settle on a single navigation.
        let redirect = self.redirector.redirect(&reason)?;

        self.stats.inc_blocked_by_reason(reason.stat_index());
        match &reason {
            BlockReason::Domain { source, .. } => info!(
                "Blocking {} (domain rule: {}, list: {})",
                candidate,
                reason.matched_rule(),
                source.label()
            ),
            _ => info!(
                "Blocking {} ({} rule: {})",
                candidate,
                reason.label(),
                reason.matched_rule()
            ),
        }
        if self.config.logging.enable {
            self.logger
                .log(EventLogEntry {
                    candidate: candidate.to_string(),
                    checkpoint,
                    action: EventLogAction::Blocked,
                    reason: Some(reason.label()),
                    matched: Some(reason.matched_rule().to_string()),
                    latency_us: start.elapsed().as_micros() as u64,
                })
                .await;
        }
        Some(redirect)
    }

    async fn log_allowed(&self, candidate: &str, checkpoint: Checkpoint, start: Instant) {
        if self.config.logging.enable {
            self.logger
                .log(EventLogEntry {
                    candidate: candidate.to_string(),
                    checkpoint,
                    action: EventLogAction::Allowed,
                    reason: None,
                    matched: None,
                    latency_us: start.elapsed().as_micros() as u64,
                })
                .await;
        }
    }

    /// The blocked page itself must never be re-checked, or a keyword
    /// echoed in its parameters would redirect in a loop.
    fn is_blocked_page(&self, url: &Url) -> bool {
        let target = self.config.blocked_page.as_str();
        let target = target.split(['?', '#']).next().unwrap_or(target);
        let target = target.rsplit('/').next().unwrap_or(target);
        !target.is_empty() && url.path().rsplit('/').next() == Some(target)
    }
}

fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}
