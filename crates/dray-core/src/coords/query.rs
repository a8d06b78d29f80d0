use std::collections::BTreeMap;

use serde::Serialize;
use url::form_urlencoded;

/// Query parameters a package URL may carry. Anything else fails the whole
/// parse, so typos and unsupported options surface immediately instead of
/// being ignored.
pub const RECOGNIZED_QUERY_KEYS: &[&str] = &["main", "json", "jsonp", "callback", "encoding"];

/// Returns true iff every key of `query` is recognized.
#[must_use]
pub fn query_is_valid(query: &BTreeMap<String, String>) -> bool {
    query
        .keys()
        .all(|key| RECOGNIZED_QUERY_KEYS.contains(&key.as_str()))
}

/// Parses a raw query string (no leading `?`) into a decoded map. Repeated
/// keys keep the last value.
#[must_use]
pub fn parse_query(search: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(search.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// JSONP rendering options derived from the query: `callback` (with `jsonp`
/// accepted as an alias) and an optional `encoding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonpOpts {
    pub callback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl JsonpOpts {
    /// Derives options from a decoded query map. Empty values count as
    /// absent, so `?callback=&jsonp=cb` still selects `cb`.
    #[must_use]
    pub fn from_query(query: &BTreeMap<String, String>) -> Option<Self> {
        let callback = query
            .get("callback")
            .filter(|value| !value.is_empty())
            .or_else(|| query.get("jsonp").filter(|value| !value.is_empty()))?;
        Some(Self {
            callback: callback.clone(),
            encoding: query
                .get("encoding")
                .filter(|value| !value.is_empty())
                .cloned(),
        })
    }

    /// Reserializes the options as a `?callback=...[&encoding=...]` suffix
    /// for redirect locations.
    #[must_use]
    pub fn to_search(&self) -> String {
        let mut pairs = form_urlencoded::Serializer::new(String::new());
        pairs.append_pair("callback", &self.callback);
        if let Some(encoding) = &self.encoding {
            pairs.append_pair("encoding", encoding);
        }
        format!("?{}", pairs.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_recognized_keys_are_valid() {
        assert!(query_is_valid(&query(&[])));
        assert!(query_is_valid(&query(&[("main", "browser")])));
        assert!(query_is_valid(&query(&[
            ("callback", "cb"),
            ("encoding", "utf8"),
            ("json", ""),
        ])));
    }

    #[test]
    fn test_unknown_key_is_invalid() {
        assert!(!query_is_valid(&query(&[("mian", "browser")])));
        assert!(!query_is_valid(&query(&[("main", "browser"), ("x", "1")])));
    }

    #[test]
    fn test_parse_query_decodes_pairs() {
        let parsed = parse_query("main=browser&callback=my%20cb");
        assert_eq!(parsed.get("main").map(String::as_str), Some("browser"));
        assert_eq!(parsed.get("callback").map(String::as_str), Some("my cb"));
    }

    #[test]
    fn test_parse_query_plus_is_space() {
        let parsed = parse_query("callback=my+cb");
        assert_eq!(parsed.get("callback").map(String::as_str), Some("my cb"));
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let parsed = parse_query("main=a&main=b");
        assert_eq!(parsed.get("main").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_parse_query_valueless_key() {
        let parsed = parse_query("json");
        assert_eq!(parsed.get("json").map(String::as_str), Some(""));
    }

    #[test]
    fn test_jsonp_opts_from_callback() {
        let opts = JsonpOpts::from_query(&query(&[("callback", "cb"), ("encoding", "utf8")]));
        assert_eq!(
            opts,
            Some(JsonpOpts {
                callback: "cb".to_string(),
                encoding: Some("utf8".to_string()),
            })
        );
    }

    #[test]
    fn test_jsonp_opts_from_jsonp_alias() {
        let opts = JsonpOpts::from_query(&query(&[("jsonp", "cb")]));
        assert_eq!(
            opts,
            Some(JsonpOpts {
                callback: "cb".to_string(),
                encoding: None,
            })
        );
    }

    #[test]
    fn test_jsonp_opts_callback_preferred_over_alias() {
        let opts = JsonpOpts::from_query(&query(&[("callback", "a"), ("jsonp", "b")]));
        assert_eq!(opts.map(|o| o.callback), Some("a".to_string()));
    }

    #[test]
    fn test_jsonp_opts_empty_callback_falls_through() {
        let opts = JsonpOpts::from_query(&query(&[("callback", ""), ("jsonp", "cb")]));
        assert_eq!(opts.map(|o| o.callback), Some("cb".to_string()));
    }

    #[test]
    fn test_jsonp_opts_absent_without_callback() {
        assert_eq!(JsonpOpts::from_query(&query(&[("main", "browser")])), None);
        assert_eq!(JsonpOpts::from_query(&query(&[("callback", "")])), None);
    }

    #[test]
    fn test_to_search_with_encoding() {
        let opts = JsonpOpts {
            callback: "cb".to_string(),
            encoding: Some("utf8".to_string()),
        };
        assert_eq!(opts.to_search(), "?callback=cb&encoding=utf8");
    }

    #[test]
    fn test_to_search_without_encoding() {
        let opts = JsonpOpts {
            callback: "cb".to_string(),
            encoding: None,
        };
        assert_eq!(opts.to_search(), "?callback=cb");
    }

    #[test]
    fn test_to_search_encodes_values() {
        let opts = JsonpOpts {
            callback: "my cb&x".to_string(),
            encoding: None,
        };
        assert_eq!(opts.to_search(), "?callback=my+cb%26x");
    }
}
