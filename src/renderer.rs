//! Support for the blocked-page renderer: parameter decoding, safe
//! interpolation, and the daily-stats update applied on each display.
//! The renderer never decides to block; it only explains.

use crate::stats::DailyStats;
use crate::store::RuleStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::borrow::Cow;
use url::form_urlencoded;

/// Match context decoded from the blocked page's own query string.
/// Every field is optional; any subset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedPageParams {
    pub reason: Option<String>,
    pub domain: Option<String>,
    pub url: Option<String>,
    pub keyword: Option<String>,
    pub query: Option<String>,
}

impl BlockedPageParams {
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "reason" => params.reason = Some(value),
                "domain" => params.domain = Some(value),
                "url" => params.url = Some(value),
                "keyword" => params.keyword = Some(value),
                "query" => params.query = Some(value),
                _ => {}
            }
        }
        params
    }

    /// The rule text to show, with a neutral placeholder when the
    /// parameters did not survive the trip.
    pub fn matched_display(&self) -> &str {
        self.keyword
            .as_deref()
            .or(self.domain.as_deref())
            .unwrap_or("this content")
    }
}

/// Escapes interpolated text so attacker-controlled parameter values
/// can never execute as markup.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// One blocked-page display: bump the daily counters in the store and
/// return the updated record for rendering. A stats read failure
/// starts from zeroed counters rather than failing the page.
pub async fn record_page_shown(
    store: &dyn RuleStore,
    today: NaiveDate,
    blocked_secs: u64,
) -> Result<DailyStats> {
    let mut stats = store.load_stats().await.unwrap_or_default();
    stats.record_block(today, blocked_secs);
    store.save_stats(&stats).await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_params_decode_round_trip() {
        let params = BlockedPageParams::from_query(
            "?reason=search&keyword=a%26b%3Dc+d&query=%D1%81%D0%BC%D0%BE%D1%82%D1%80%D0%B5%D1%82%D1%8C",
        );
        assert_eq!(params.reason.as_deref(), Some("search"));
        assert_eq!(params.keyword.as_deref(), Some("a&b=c d"));
        assert_eq!(params.query.as_deref(), Some("смотреть"));
        assert_eq!(params.domain, None);
    }

    #[test]
    fn test_absent_fields_get_placeholder() {
        let params = BlockedPageParams::from_query("");
        assert_eq!(params, BlockedPageParams::default());
        assert_eq!(params.matched_display(), "this content");

        let params = BlockedPageParams::from_query("reason=domain&domain=example.com");
        assert_eq!(params.matched_display(), "example.com");
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let params = BlockedPageParams::from_query("reason=keyword&evil=1&keyword=adult");
        assert_eq!(params.keyword.as_deref(), Some("adult"));
    }

    #[test]
    fn test_escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & b"), "a &amp; b");
        // Untouched text borrows.
        assert!(matches!(escape_html("plain"), Cow::Borrowed("plain")));
    }

    #[tokio::test]
    async fn test_record_page_shown_persists() {
        let store = MemoryStore::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let stats = record_page_shown(&store, today, 0).await.unwrap();
        assert_eq!(stats.blocks_today, 1);
        let stats = record_page_shown(&store, today, 45).await.unwrap();
        assert_eq!(stats.blocks_today, 2);
        assert_eq!(stats.total_time_blocked_secs, 45);

        assert_eq!(store.load_stats().await.unwrap(), stats);
    }
}
