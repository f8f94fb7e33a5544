//! Favicon discovery
//!
//! Finds an icon for a link by probing well-known paths on the site's
//! origin and returning the first one that answers.

use crate::config::{FAVICON_PATHS, FAVICON_PROBE_TIMEOUT_MS};
use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Candidate icon URLs for a site, most likely first.
///
/// Input without an http(s) scheme is treated as `https://`. Unparseable
/// input yields no candidates.
pub fn favicon_candidates(site: &str) -> Vec<String> {
    let site = site.trim();
    let full = if site.starts_with("http") {
        site.to_string()
    } else {
        format!("https://{}", site)
    };

    let Ok(url) = Url::parse(&full) else {
        return Vec::new();
    };

    let origin = url.origin();
    if !origin.is_tuple() {
        return Vec::new();
    }

    let origin = origin.ascii_serialization();
    FAVICON_PATHS
        .iter()
        .map(|path| format!("{}{}", origin, path))
        .collect()
}

/// HTTP prober for favicons
#[derive(Clone)]
pub struct FaviconService {
    client: reqwest::Client,
}

impl FaviconService {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(FAVICON_PROBE_TIMEOUT_MS))
            .build()?;
        Ok(Self { client })
    }

    /// First candidate answering with a success status, if any
    pub async fn discover(&self, site: &str) -> Option<String> {
        for candidate in favicon_candidates(site) {
            match self.client.get(&candidate).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Found favicon: {}", candidate);
                    return Some(candidate);
                }
                Ok(response) => {
                    tracing::debug!("Favicon probe {} -> {}", candidate, response.status());
                }
                Err(e) => {
                    tracing::debug!("Favicon probe {} failed: {}", candidate, e);
                }
            }
        }

        tracing::warn!("No favicon found for {}", site);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_use_origin() {
        let candidates = favicon_candidates("https://github.com/rust-lang/rust?tab=readme");

        assert_eq!(
            candidates,
            vec![
                "https://github.com/favicon.ico",
                "https://github.com/favicon.png",
                "https://github.com/apple-touch-icon.png",
                "https://github.com/icon.png",
            ]
        );
    }

    #[test]
    fn test_candidates_add_scheme_and_keep_port() {
        let candidates = favicon_candidates("localhost:8080/app");
        assert_eq!(candidates[0], "https://localhost:8080/favicon.ico");
    }

    #[test]
    fn test_candidates_for_garbage() {
        assert!(favicon_candidates("http://").is_empty());
        assert!(favicon_candidates("").is_empty());
    }

    #[tokio::test]
    async fn test_discover_unreachable_host() {
        let service = FaviconService::new().unwrap();
        // port 9 (discard) is closed on test machines; every probe fails fast
        assert_eq!(service.discover("http://127.0.0.1:9").await, None);
    }
}
