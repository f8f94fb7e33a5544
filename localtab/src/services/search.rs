//! Search box helpers
//!
//! Turns what the user typed into a URL: direct navigation for URLs and
//! bare domains, otherwise a query on the selected search engine.

use crate::config::{
    BAIDU_SEARCH_URL, BING_SEARCH_URL, DUCKDUCKGO_SEARCH_URL, GOOGLE_SEARCH_URL,
};
use crate::database::SearchEngine;
use url::form_urlencoded;

impl SearchEngine {
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::Google,
        SearchEngine::Bing,
        SearchEngine::Baidu,
        SearchEngine::DuckDuckGo,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SearchEngine::Google => "Google",
            SearchEngine::Bing => "Bing",
            SearchEngine::Baidu => "Baidu",
            SearchEngine::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Query URL prefix; the encoded query is appended
    pub fn base_url(self) -> &'static str {
        match self {
            SearchEngine::Google => GOOGLE_SEARCH_URL,
            SearchEngine::Bing => BING_SEARCH_URL,
            SearchEngine::Baidu => BAIDU_SEARCH_URL,
            SearchEngine::DuckDuckGo => DUCKDUCKGO_SEARCH_URL,
        }
    }

    pub fn query_url(self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{}", self.base_url(), encoded)
    }
}

/// Where the search box should navigate for `query`; `None` when blank
pub fn resolve_query(query: &str, engine: SearchEngine) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let lower = query.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(query.to_string());
    }
    if lower.starts_with("www.") || is_bare_domain(query) {
        return Some(format!("https://{}", query));
    }

    Some(engine.query_url(query))
}

/// `name.tld`: a 3-63 char label of alphanumerics and inner hyphens, then
/// an alphabetic TLD of at least two letters
fn is_bare_domain(input: &str) -> bool {
    let Some((label, tld)) = input.split_once('.') else {
        return false;
    };

    let bytes = label.as_bytes();
    let label_ok = (3..=63).contains(&bytes.len())
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-');

    let tld_ok = tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphabetic());

    label_ok && tld_ok
}
