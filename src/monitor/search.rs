use crate::engine::host_within;
use crate::monitor::events::FormField;
use url::Url;

/// Recognized search engines: hostname (with subdomains) mapped to the
/// query parameter carrying the search text.
pub struct SearchEngines {
    engines: Vec<(String, String)>,
}

impl SearchEngines {
    /// `engines` as (host, param) pairs; kept sorted for deterministic
    /// lookup when one host is a suffix of another.
    pub fn new(mut engines: Vec<(String, String)>) -> Self {
        for (host, _) in &mut engines {
            *host = host.to_lowercase();
        }
        engines.sort_by(|a, b| a.0.cmp(&b.0));
        Self { engines }
    }

    /// The decoded search text, if `url` points at a recognized engine
    /// and carries a non-blank query parameter.
    pub fn query_for(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let (_, param) = self
            .engines
            .iter()
            .find(|(engine, _)| host_within(host, engine))?;

        url.query_pairs()
            .find(|(k, _)| k == param)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn recognizes(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| self.engines.iter().any(|(engine, _)| host_within(host, engine)))
            .unwrap_or(false)
    }
}

/// Picks the search-like field out of a submitted form. Inclusive on
/// purpose: an explicit `type="search"`, a known field name, or a name
/// containing "search"/"query" all count.
pub fn find_search_field<'a>(fields: &'a [FormField], names: &[String]) -> Option<&'a FormField> {
    fields.iter().find(|f| {
        if f.kind.as_deref() == Some("search") {
            return true;
        }
        let name = f.name.to_lowercase();
        names.iter().any(|n| name == n.to_lowercase())
            || name.contains("search")
            || name.contains("query")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engines() -> SearchEngines {
        SearchEngines::new(vec![
            ("google.com".to_string(), "q".to_string()),
            ("search.yahoo.com".to_string(), "p".to_string()),
        ])
    }

    #[test]
    fn test_recognizes_engine_and_subdomains() {
        let engines = engines();
        let url = Url::parse("https://www.google.com/search?q=rust").unwrap();
        assert!(engines.recognizes(&url));
        assert_eq!(engines.query_for(&url), Some("rust".to_string()));

        let url = Url::parse("https://notgoogle.com/search?q=rust").unwrap();
        assert!(!engines.recognizes(&url));
        assert_eq!(engines.query_for(&url), None);
    }

    #[test]
    fn test_query_is_decoded() {
        let engines = engines();
        let url = Url::parse("https://google.com/search?q=Adult%20Content%20Now").unwrap();
        assert_eq!(engines.query_for(&url), Some("Adult Content Now".to_string()));
    }

    #[test]
    fn test_engine_specific_parameter() {
        let engines = engines();
        let url = Url::parse("https://search.yahoo.com/search?p=cats&q=ignored").unwrap();
        assert_eq!(engines.query_for(&url), Some("cats".to_string()));
    }

    #[test]
    fn test_blank_query_is_no_query() {
        let engines = engines();
        let url = Url::parse("https://google.com/search?q=%20%20").unwrap();
        assert_eq!(engines.query_for(&url), None);
    }

    fn field(name: &str, kind: Option<&str>, value: &str) -> FormField {
        FormField {
            name: name.to_string(),
            kind: kind.map(|k| k.to_string()),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_search_field_heuristic() {
        let names = vec!["q".to_string(), "query".to_string()];

        let fields = vec![field("csrf", None, "tok"), field("q", None, "cats")];
        assert_eq!(find_search_field(&fields, &names).unwrap().value, "cats");

        let fields = vec![field("anything", Some("search"), "dogs")];
        assert_eq!(find_search_field(&fields, &names).unwrap().value, "dogs");

        let fields = vec![field("site_search_box", None, "fish")];
        assert_eq!(find_search_field(&fields, &names).unwrap().value, "fish");

        let fields = vec![field("email", None, "a@b.c")];
        assert!(find_search_field(&fields, &names).is_none());
    }
}
