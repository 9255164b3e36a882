use super::traits::RuleMatcher;
use rustc_hash::FxHashMap;

/// Which list a blocked domain came from. Matching semantics are
/// identical for both; the source survives into logs and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainSource {
    Maintained,
    Custom,
}

impl DomainSource {
    pub fn label(&self) -> &'static str {
        match self {
            DomainSource::Maintained => "blocklist",
            DomainSource::Custom => "custom",
        }
    }
}

/// In-memory matcher over the loaded rule set.
///
/// Domains live in an FxHashMap keyed by normalized hostname; lookups
/// walk the hostname's dot-separated suffixes so `shop.example.com`
/// hits a rule for `example.com` while `notexample.com` cannot.
/// Keywords keep their store order; the first containment wins.
#[derive(Debug)]
pub struct RuleSetMatcher {
    domains: FxHashMap<Box<str>, DomainSource>,
    keywords: Vec<Box<str>>,
    active: bool,
}

impl RuleSetMatcher {
    pub fn new(
        domains: FxHashMap<Box<str>, DomainSource>,
        keywords: Vec<Box<str>>,
        active: bool,
    ) -> Self {
        Self {
            domains,
            keywords,
            active,
        }
    }

    /// The fail-open value: matches nothing, reports inactive.
    pub fn disabled() -> Self {
        Self {
            domains: FxHashMap::default(),
            keywords: Vec::new(),
            active: false,
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

impl RuleMatcher for RuleSetMatcher {
    fn match_hostname(&self, host: &str) -> Option<(&str, DomainSource)> {
        if !self.active || host.is_empty() {
            return None;
        }

        // Hosts from url::Url are already lowercase; raw callers may not be.
        let lowered;
        let host = if host.bytes().any(|b| b.is_ascii_uppercase()) {
            lowered = host.to_ascii_lowercase();
            lowered.as_str()
        } else {
            host
        };
        let host = host.trim_end_matches('.');

        // Iterative suffix match: strip one label at a time, so only
        // dot-boundary parents are ever tested.
        let mut part = host;
        loop {
            if let Some((rule, source)) = self.domains.get_key_value(part) {
                return Some((&**rule, *source));
            }

            match part.find('.') {
                Some(idx) => {
                    part = &part[idx + 1..];
                    if part.is_empty() {
                        break;
                    }
                }
                None => break,
            }
        }

        None
    }

    fn match_keyword(&self, text: &str) -> Option<&str> {
        if !self.active || text.is_empty() {
            return None;
        }

        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(&***k))
            .map(|k| &**k)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// True iff `host` equals `domain` or is a dot-boundary subdomain of it.
/// Both sides are expected lowercase.
pub fn host_within(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(domains: &[(&str, DomainSource)], keywords: &[&str], active: bool) -> RuleSetMatcher {
        let mut map = FxHashMap::default();
        for (d, s) in domains {
            map.insert(d.to_string().into_boxed_str(), *s);
        }
        let keywords = keywords
            .iter()
            .map(|k| k.to_string().into_boxed_str())
            .collect();
        RuleSetMatcher::new(map, keywords, active)
    }

    #[test]
    fn test_domain_suffix_matching() {
        let m = matcher(
            &[
                ("example.com", DomainSource::Custom),
                ("sub.ad.com", DomainSource::Maintained),
            ],
            &[],
            true,
        );

        // Exact match
        assert_eq!(
            m.match_hostname("example.com"),
            Some(("example.com", DomainSource::Custom))
        );

        // Subdomains
        assert_eq!(
            m.match_hostname("shop.example.com"),
            Some(("example.com", DomainSource::Custom))
        );
        assert_eq!(
            m.match_hostname("a.b.example.com"),
            Some(("example.com", DomainSource::Custom))
        );
        assert_eq!(
            m.match_hostname("deep.sub.ad.com"),
            Some(("sub.ad.com", DomainSource::Maintained))
        );

        // No match across a missing dot boundary
        assert_eq!(m.match_hostname("notexample.com"), None);
        assert_eq!(m.match_hostname("ad.com"), None);
        assert_eq!(m.match_hostname("google.com"), None);
    }

    #[test]
    fn test_domain_matching_normalizes_case_and_root_dot() {
        let m = matcher(&[("example.com", DomainSource::Custom)], &[], true);
        assert!(m.match_hostname("Shop.Example.COM").is_some());
        assert!(m.match_hostname("example.com.").is_some());
        assert_eq!(m.match_hostname(""), None);
    }

    #[test]
    fn test_keyword_containment() {
        let m = matcher(&[], &["adult", "casino"], true);

        assert_eq!(m.match_keyword("Adult Content Now"), Some("adult"));
        assert_eq!(m.match_keyword("best CASINO bonus"), Some("casino"));
        assert_eq!(m.match_keyword("harmless text"), None);
        assert_eq!(m.match_keyword(""), None);
    }

    #[test]
    fn test_keyword_first_match_wins_in_load_order() {
        let m = matcher(&[], &["casino", "adult"], true);
        // Both occur; the earlier configured keyword is reported.
        assert_eq!(m.match_keyword("adult casino"), Some("casino"));
    }

    #[test]
    fn test_keyword_unicode() {
        let m = matcher(&[], &["казино"], true);
        assert_eq!(m.match_keyword("лучшее КАЗИНО онлайн"), Some("казино"));
    }

    #[test]
    fn test_inactive_matches_nothing() {
        let m = matcher(
            &[("example.com", DomainSource::Custom)],
            &["adult"],
            false,
        );
        assert_eq!(m.match_hostname("example.com"), None);
        assert_eq!(m.match_keyword("adult"), None);
        assert!(!m.is_active());
    }

    #[test]
    fn test_disabled_matcher_is_empty_and_inactive() {
        let m = RuleSetMatcher::disabled();
        assert!(!m.is_active());
        assert_eq!(m.domain_count(), 0);
        assert_eq!(m.match_hostname("anything.com"), None);
    }

    #[test]
    fn test_host_within_boundary() {
        assert!(host_within("example.com", "example.com"));
        assert!(host_within("www.example.com", "example.com"));
        assert!(!host_within("notexample.com", "example.com"));
        assert!(!host_within("example.com", "www.example.com"));
    }
}
