//! Runtime configuration for the extraction pipeline.
//!
//! Everything is read from environment variables with production defaults,
//! so a bare `Config::from_env()` talks to the real map platforms. Tests use
//! the `with_*` setters to point each endpoint at a mock server instead.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use url::Url;

pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MAPSCRAPE_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "MAPSCRAPE_CONNECT_TIMEOUT_SECS";
pub const ENV_PARSE_DEADLINE_SECS: &str = "MAPSCRAPE_PARSE_DEADLINE_SECS";
pub const ENV_NAVER_PLACE_BASE: &str = "MAPSCRAPE_NAVER_PLACE_BASE";
pub const ENV_NAVER_SEARCH_URL: &str = "MAPSCRAPE_NAVER_SEARCH_URL";
pub const ENV_GEOCODE_URL: &str = "MAPSCRAPE_GEOCODE_URL";
pub const ENV_KAKAO_HOSTS: &str = "MAPSCRAPE_KAKAO_HOSTS";
pub const ENV_GEOCODE_CLIENT_ID: &str = "NAVER_MAP_CLIENT_ID";
pub const ENV_GEOCODE_CLIENT_SECRET: &str = "NAVER_MAP_CLIENT_SECRET";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PARSE_DEADLINE_SECS: u64 = 20;
const DEFAULT_NAVER_PLACE_BASE: &str = "https://m.place.naver.com";
const DEFAULT_NAVER_SEARCH_URL: &str = "https://m.search.naver.com/search.naver";
const DEFAULT_GEOCODE_URL: &str = "https://maps.apigw.ntruss.com/map-geocode/v2/geocode";
const DEFAULT_KAKAO_HOSTS: &[&str] = &["kakao.com", "kko.to"];

/// Credential pair sent to the geocoding provider.
#[derive(Clone, PartialEq, Eq)]
pub struct GeocodeCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for GeocodeCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    request_timeout: Duration,
    connect_timeout: Duration,
    parse_deadline: Duration,
    naver_place_base: Url,
    naver_search_url: Url,
    geocode_url: Url,
    kakao_hosts: Vec<String>,
    geocode_credentials: Option<GeocodeCredentials>,
}

impl Config {
    /// Load from environment variables, falling back to production defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let geocode_credentials = match (
            env::var(ENV_GEOCODE_CLIENT_ID).ok().filter(|v| !v.is_empty()),
            env::var(ENV_GEOCODE_CLIENT_SECRET).ok().filter(|v| !v.is_empty()),
        ) {
            (Some(client_id), Some(client_secret)) => Some(GeocodeCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Ok(Self {
            request_timeout: secs_from_env(ENV_REQUEST_TIMEOUT_SECS, "request_timeout")?
                .unwrap_or(defaults.request_timeout),
            connect_timeout: secs_from_env(ENV_CONNECT_TIMEOUT_SECS, "connect_timeout")?
                .unwrap_or(defaults.connect_timeout),
            parse_deadline: secs_from_env(ENV_PARSE_DEADLINE_SECS, "parse_deadline")?
                .unwrap_or(defaults.parse_deadline),
            naver_place_base: url_from_env(ENV_NAVER_PLACE_BASE, "naver_place_base")?
                .unwrap_or(defaults.naver_place_base),
            naver_search_url: url_from_env(ENV_NAVER_SEARCH_URL, "naver_search_url")?
                .unwrap_or(defaults.naver_search_url),
            geocode_url: url_from_env(ENV_GEOCODE_URL, "geocode_url")?
                .unwrap_or(defaults.geocode_url),
            kakao_hosts: hosts_from_env(ENV_KAKAO_HOSTS).unwrap_or(defaults.kakao_hosts),
            geocode_credentials,
        })
    }

    /// Timeout applied to every individual HTTP request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    /// Upper bound for a whole `parse_url` call across all stages.
    pub fn parse_deadline(&self) -> Duration {
        self.parse_deadline
    }
    /// Mobile place site; state blobs live under `restaurant/<id>/home`.
    pub fn naver_place_base(&self) -> &Url {
        &self.naver_place_base
    }
    pub fn naver_search_url(&self) -> &Url {
        &self.naver_search_url
    }
    pub fn geocode_url(&self) -> &Url {
        &self.geocode_url
    }
    /// Domains (and their subdomains) routed through the Kakao bridge.
    pub fn kakao_hosts(&self) -> &[String] {
        &self.kakao_hosts
    }
    pub fn geocode_credentials(&self) -> Option<&GeocodeCredentials> {
        self.geocode_credentials.as_ref()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
    pub fn with_parse_deadline(mut self, deadline: Duration) -> Self {
        self.parse_deadline = deadline;
        self
    }
    pub fn with_naver_place_base(mut self, url: Url) -> Self {
        self.naver_place_base = url;
        self
    }
    pub fn with_naver_search_url(mut self, url: Url) -> Self {
        self.naver_search_url = url;
        self
    }
    pub fn with_geocode_url(mut self, url: Url) -> Self {
        self.geocode_url = url;
        self
    }
    pub fn with_kakao_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kakao_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_geocode_credentials(mut self, credentials: Option<GeocodeCredentials>) -> Self {
        self.geocode_credentials = credentials;
        self
    }
}

impl Default for Config {
    /// Production defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            parse_deadline: Duration::from_secs(DEFAULT_PARSE_DEADLINE_SECS),
            naver_place_base: Url::parse(DEFAULT_NAVER_PLACE_BASE)
                .expect("default place base is a valid url"),
            naver_search_url: Url::parse(DEFAULT_NAVER_SEARCH_URL)
                .expect("default search url is a valid url"),
            geocode_url: Url::parse(DEFAULT_GEOCODE_URL)
                .expect("default geocode url is a valid url"),
            kakao_hosts: DEFAULT_KAKAO_HOSTS.iter().map(|h| h.to_string()).collect(),
            geocode_credentials: None,
        }
    }
}

fn secs_from_env(key: &str, field: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("expected whole seconds, got {raw:?}"),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Some(Duration::from_secs(secs)))
}

/// Comma-separated host list; blank entries are dropped and an empty list
/// counts as unset.
fn hosts_from_env(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let hosts: Vec<String> = raw
        .split(',')
        .map(|host| host.trim().to_ascii_lowercase())
        .filter(|host| !host.is_empty())
        .collect();
    (!hosts.is_empty()).then_some(hosts)
}

fn url_from_env(key: &str, field: &'static str) -> Result<Option<Url>, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    Url::parse(raw.trim())
        .map(Some)
        .map_err(|err| ConfigError::InvalidValue {
            field,
            reason: err.to_string(),
        })
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_REQUEST_TIMEOUT_SECS,
            ENV_CONNECT_TIMEOUT_SECS,
            ENV_PARSE_DEADLINE_SECS,
            ENV_NAVER_PLACE_BASE,
            ENV_NAVER_SEARCH_URL,
            ENV_GEOCODE_URL,
            ENV_KAKAO_HOSTS,
            ENV_GEOCODE_CLIENT_ID,
            ENV_GEOCODE_CLIENT_SECRET,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.parse_deadline(), Duration::from_secs(20));
        assert_eq!(cfg.naver_place_base().as_str(), "https://m.place.naver.com/");
        assert!(cfg.geocode_credentials().is_none());
        assert_eq!(cfg.kakao_hosts(), ["kakao.com", "kko.to"]);
    }

    #[test]
    fn kakao_hosts_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_KAKAO_HOSTS, " Kakao.com, ,kko.to,daum.net ");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.kakao_hosts(), ["kakao.com", "kko.to", "daum.net"]);

        unsafe {
            env::set_var(ENV_KAKAO_HOSTS, " , ");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.kakao_hosts(), Config::default().kakao_hosts());
        clear_env();
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_REQUEST_TIMEOUT_SECS, "3");
            env::set_var(ENV_PARSE_DEADLINE_SECS, "15");
            env::set_var(ENV_NAVER_PLACE_BASE, "http://127.0.0.1:9000");
            env::set_var(ENV_GEOCODE_CLIENT_ID, "id");
            env::set_var(ENV_GEOCODE_CLIENT_SECRET, "secret");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.parse_deadline(), Duration::from_secs(15));
        assert_eq!(cfg.naver_place_base().as_str(), "http://127.0.0.1:9000/");
        let creds = cfg.geocode_credentials().unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        clear_env();
    }

    #[test]
    fn half_configured_credentials_are_ignored() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_GEOCODE_CLIENT_ID, "id");
        }
        let cfg = Config::from_env().unwrap();
        assert!(cfg.geocode_credentials().is_none());
        clear_env();
    }

    #[test]
    fn rejects_invalid_numbers_and_urls() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_REQUEST_TIMEOUT_SECS, "soon");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("request_timeout"));

        clear_env();
        unsafe {
            env::set_var(ENV_GEOCODE_URL, "not a url");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("geocode_url"));
        clear_env();
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = GeocodeCredentials {
            client_id: "id".into(),
            client_secret: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
