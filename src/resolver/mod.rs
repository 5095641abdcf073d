//! Redirect resolution and place-id discovery.

pub mod bridge;

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;

use crate::fetcher::{FetchError, Fetcher};

static PLACE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:place|restaurant)/(\d+)").unwrap());

/// Map platform a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Naver,
    Kakao,
    Other,
}

impl Platform {
    /// Classifies `url` by host. `kakao_hosts` lists the domains whose pages
    /// go through the bridge; subdomains match too.
    pub fn detect(url: &Url, kakao_hosts: &[String]) -> Self {
        let Some(host) = url.host_str() else {
            return Platform::Other;
        };
        let host = host.to_ascii_lowercase();
        if kakao_hosts.iter().any(|domain| host_matches(&host, domain)) {
            Platform::Kakao
        } else if host_matches(&host, "naver.com") || host == "naver.me" {
            Platform::Naver
        } else {
            Platform::Other
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub final_url: Url,
    pub platform: Platform,
    pub place_id: Option<String>,
}

/// Extracts a numeric place id from a `place/<digits>` or
/// `restaurant/<digits>` path segment.
pub fn extract_place_id(url: &str) -> Option<String> {
    PLACE_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `<base>/restaurant/<id>` on the mobile place site.
pub fn restaurant_url(place_base: &Url, place_id: &str) -> Url {
    let mut url = place_base.clone();
    url.set_path(&format!("restaurant/{place_id}"));
    url.set_query(None);
    url
}

/// The mobile home tab of a place; this is the page carrying the state blob.
pub fn place_home_url(place_base: &Url, place_id: &str) -> Url {
    let mut url = place_base.clone();
    url.set_path(&format!("restaurant/{place_id}/home"));
    url.set_query(None);
    url
}

/// Follows `url` to its final address.
///
/// Failures propagate: there is no tier below this one.
#[instrument(skip_all, fields(url = %url))]
pub async fn resolve(
    fetcher: &Fetcher,
    url: &str,
    kakao_hosts: &[String],
) -> Result<Resolution, FetchError> {
    let final_url = fetcher.resolve(url).await?;
    let platform = Platform::detect(&final_url, kakao_hosts);

    // Kakao ids live in a different namespace and must never reach the
    // Naver state fetch.
    let place_id = match platform {
        Platform::Kakao => None,
        _ => extract_place_id(final_url.as_str()),
    };

    debug!(final_url = %final_url, ?platform, ?place_id, "resolved input url");
    Ok(Resolution {
        final_url,
        platform,
        place_id,
    })
}
