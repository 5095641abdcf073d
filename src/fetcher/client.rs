use crate::config::Config;
use crate::fetcher::{decode::process_response, errors::FetchError, types::PageResponse};
use reqwest::{
    Client, ClientBuilder, RequestBuilder,
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 8 * 1024 * 1024; // 8MB
const MAX_REDIRECTS: usize = 10;

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
const LINK_PREVIEW_UA: &str =
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BINARY_MIME_PREFIXES: &[&str] = &["image/", "audio/", "video/", "font/"];
const ACCEPT_LANGUAGE_KO: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Which browser a request pretends to come from.
///
/// The map platforms render different markup per client: the mobile site
/// embeds the state blob, and only crawler agents reliably get server-side
/// Open Graph tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Desktop,
    Mobile,
    LinkPreview,
}

impl Agent {
    pub fn user_agent(self) -> &'static str {
        match self {
            Agent::Desktop => DESKTOP_UA,
            Agent::Mobile => MOBILE_UA,
            Agent::LinkPreview => LINK_PREVIEW_UA,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions<'a> {
    pub agent: Agent,
    pub referer: Option<&'a str>,
}

impl<'a> FetchOptions<'a> {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            referer: None,
        }
    }

    pub fn with_referer(mut self, referer: &'a str) -> Self {
        self.referer = Some(referer);
        self
    }
}

/// Link previews are the last tier and read only meta tags, so they take any
/// textual body; every other agent needs real HTML.
fn accepts_content_type(agent: Agent, content_type: &str) -> bool {
    let mime = content_type.trim().to_ascii_lowercase();
    match agent {
        Agent::LinkPreview => !BINARY_MIME_PREFIXES
            .iter()
            .any(|prefix| mime.starts_with(prefix)),
        Agent::Desktop | Agent::Mobile => {
            mime.contains("text/html") || mime.contains("application/xhtml")
        }
    }
}

/// Shared HTTP client for every stage of a parse.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    request_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::from_reqwest_error)?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn request(&self, url: Url, options: FetchOptions<'_>) -> RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .header(USER_AGENT, options.agent.user_agent())
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_KO);
        if let Some(referer) = options.referer {
            request = request.header(REFERER, referer);
        }
        request
    }

    /// Follows every redirect for `url` and returns where it ended up.
    ///
    /// The body is never read; only the final status matters.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        let parsed_url = Url::parse(url)?;

        let response = self
            .request(parsed_url, FetchOptions::new(Agent::Desktop))
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        debug!(final_url = %response.url(), "redirects resolved");
        Ok(response.url().clone())
    }

    #[instrument(skip_all, fields(url = %url, agent = ?options.agent))]
    pub async fn fetch_page(
        &self,
        url: &Url,
        options: FetchOptions<'_>,
    ) -> Result<PageResponse, FetchError> {
        let response = self
            .request(url.clone(), options)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !accepts_content_type(options.agent, &content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Check body size after download (in case Content-Length was missing)
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        let page = process_response(final_url, status, body_bytes, &content_type);
        debug!(
            charset = ?page.charset,
            fetched_at = %page.fetched_at,
            bytes = page.body_utf8.len(),
            "page fetched"
        );
        Ok(page)
    }

    /// Runs a `GET endpoint?query=<term>` search and returns the raw page.
    pub async fn search(
        &self,
        endpoint: &Url,
        term: &str,
        agent: Agent,
    ) -> Result<PageResponse, FetchError> {
        let mut url = endpoint.clone();
        url.query_pairs_mut().append_pair("query", term);
        self.fetch_page(&url, FetchOptions::new(agent)).await
    }
}
