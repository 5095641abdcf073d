//! Kakao Map -> Naver place conversion.
//!
//! Kakao pages carry no structured data we can use, so the place is looked up
//! on Naver by name (and, failing that, by name plus the most specific
//! locality token of its address).

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::restaurant_url;
use crate::extractor::og::OgMeta;
use crate::fetcher::{Agent, FetchError, FetchOptions, Fetcher};

const KAKAO_TITLE_SUFFIX: &str = "카카오맵";

// Search results embed place links either plainly or JSON-escaped.
static NAVER_PLACE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"place\.naver\.com\\?/(?:restaurant|place)\\?/(\d+)").unwrap()
});

/// A Naver place found for a foreign map link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgedPlace {
    pub place_id: String,
    pub url: Url,
}

/// What the Kakao page tells us about the place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHint {
    pub name: String,
    pub address: Option<String>,
}

impl SearchHint {
    pub fn from_meta(meta: &OgMeta) -> Option<Self> {
        let name = meta
            .title
            .as_deref()
            .map(strip_platform_suffix)
            .filter(|n| !n.is_empty())
            .or_else(|| {
                meta.html_title
                    .as_deref()
                    .map(strip_platform_suffix)
                    .filter(|n| !n.is_empty())
            })?;

        Some(Self {
            name: name.to_string(),
            address: meta.description.clone(),
        })
    }
}

/// `"행복식당 | 카카오맵"` -> `"행복식당"`.
pub fn strip_platform_suffix(title: &str) -> &str {
    let title = title.trim();
    match title.strip_suffix(KAKAO_TITLE_SUFFIX) {
        Some(rest) => rest.trim_end().trim_end_matches(['|', '-']).trim_end(),
        None => title,
    }
}

/// Picks the most specific locality in an address: street names
/// (`…길`, `…로`) beat neighbourhoods (`…동`, `…읍`, `…면`), which beat
/// districts (`…구`).
pub fn locality_token(address: &str) -> Option<&str> {
    const PRIORITIES: &[&[char]] = &[&['길', '로'], &['동', '읍', '면'], &['구']];

    let tokens: Vec<&str> = address.split_whitespace().collect();
    PRIORITIES.iter().find_map(|suffixes| {
        tokens
            .iter()
            .copied()
            .find(|token| token.chars().count() > 1 && token.ends_with(*suffixes))
    })
}

/// First Naver place id linked from a search result page.
pub fn find_place_id(body: &str) -> Option<String> {
    NAVER_PLACE_LINK
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct Bridge<'a> {
    fetcher: &'a Fetcher,
    search_url: &'a Url,
    place_base: &'a Url,
}

impl<'a> Bridge<'a> {
    pub fn new(fetcher: &'a Fetcher, search_url: &'a Url, place_base: &'a Url) -> Self {
        Self {
            fetcher,
            search_url,
            place_base,
        }
    }

    /// Looks up the Naver place for a Kakao page.
    ///
    /// `Ok(None)` means neither search pass found a place. Only the page
    /// fetch and the narrowed search can fail the conversion.
    #[instrument(skip_all, fields(page = %page_url))]
    pub async fn convert(&self, page_url: &Url) -> Result<Option<BridgedPlace>, FetchError> {
        let page = self
            .fetcher
            .fetch_page(page_url, FetchOptions::new(Agent::LinkPreview))
            .await?;
        let meta = OgMeta::parse(&page.body_utf8);

        let Some(hint) = SearchHint::from_meta(&meta) else {
            debug!("foreign page has no usable title");
            return Ok(None);
        };

        // A failed name search counts as no match; the narrowed search is a
        // different query and still runs.
        match self.search(&hint.name).await {
            Ok(Some(place_id)) => return Ok(Some(self.bridged(place_id))),
            Ok(None) => {}
            Err(err) => warn!(name = %hint.name, error = %err, "name search failed"),
        }

        let Some(locality) = hint.address.as_deref().and_then(locality_token) else {
            debug!(name = %hint.name, "name search found nothing and no address to narrow by");
            return Ok(None);
        };

        let narrowed = format!("{} {}", hint.name, locality);
        Ok(self.search(&narrowed).await?.map(|id| self.bridged(id)))
    }

    async fn search(&self, term: &str) -> Result<Option<String>, FetchError> {
        let page = self
            .fetcher
            .search(self.search_url, term, Agent::Mobile)
            .await?;
        let place_id = find_place_id(&page.body_utf8);
        info!(term, ?place_id, "naver place search");
        Ok(place_id)
    }

    fn bridged(&self, place_id: String) -> BridgedPlace {
        BridgedPlace {
            url: restaurant_url(self.place_base, &place_id),
            place_id,
        }
    }
}
