use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::entities::{RestaurantRecord, SCRAPED_TAG, UNKNOWN_CATEGORY};

/// Landing-page titles that say nothing about the place itself.
const GENERIC_TITLES: &[&str] = &["네이버 지도", "네이버지도", "카카오맵", "Kakao Map"];

static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| og_selector("og:title"));
static OG_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| og_selector("og:description"));
static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| og_selector("og:image"));
static OG_URL: LazyLock<Selector> = LazyLock::new(|| og_selector("og:url"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

fn og_selector(property: &str) -> Selector {
    Selector::parse(&format!(
        "meta[property='{property}'], meta[name='{property}']"
    ))
    .unwrap()
}

/// Open Graph metadata of a page, with blank values dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OgMeta {
    pub title: Option<String>,
    pub html_title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl OgMeta {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(&document)
    }

    pub fn from_document(document: &Html) -> Self {
        Self {
            title: meta_content(document, &OG_TITLE),
            html_title: document
                .select(&TITLE)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .find(|t| !t.is_empty()),
            description: meta_content(document, &OG_DESCRIPTION),
            image: meta_content(document, &OG_IMAGE),
            url: meta_content(document, &OG_URL),
        }
    }

    /// `og:title`, else the `<title>` element.
    pub fn best_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.html_title.as_deref())
    }

    /// `og:image` as an absolute URL.
    pub fn absolute_image(&self, base: &Url) -> Option<String> {
        self.image
            .as_deref()
            .and_then(|raw| absolutize_image_url(raw, base))
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Protocol-relative URLs become https; relative paths are joined on `base`.
pub fn absolutize_image_url(raw: &str, base: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    base.join(raw).ok().map(String::from)
}

/// Builds the lowest-fidelity record from a page's Open Graph tags.
///
/// `input_url` is the address the caller passed in; it is used as the record
/// URL and as the base for relative image paths when the page has no `og:url`.
pub fn fallback_record(meta: &OgMeta, input_url: &Url) -> RestaurantRecord {
    let title = meta.best_title().unwrap_or_default();
    let name = match meta.description.as_deref() {
        Some(description) if GENERIC_TITLES.contains(&title) => description,
        _ => title,
    };
    let name = if name.is_empty() {
        UNKNOWN_CATEGORY
    } else {
        name
    };

    let canonical = meta
        .url
        .clone()
        .unwrap_or_else(|| input_url.to_string());

    let mut record = RestaurantRecord::new(canonical, name);
    record.category = UNKNOWN_CATEGORY.to_string();
    record.tags = vec![SCRAPED_TAG.to_string()];
    record.description = meta.description.clone().unwrap_or_default();
    record.set_images(meta.absolute_image(input_url));
    record
}
