#![allow(dead_code)]

use std::fs;
use std::time::Duration;

use mapscrape::config::{Config, GeocodeCredentials};
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

/// Config with every platform endpoint pointed at `server`.
pub fn test_config(server: &MockServer) -> Config {
    let base = Url::parse(&server.uri()).unwrap();
    Config::default()
        .with_request_timeout(Duration::from_secs(5))
        .with_parse_deadline(Duration::from_secs(10))
        .with_naver_place_base(base.clone())
        .with_naver_search_url(base.join("/search.naver").unwrap())
        .with_geocode_url(base.join("/map-geocode/v2/geocode").unwrap())
}

pub fn test_credentials() -> GeocodeCredentials {
    GeocodeCredentials {
        client_id: "test-id".to_string(),
        client_secret: "test-secret".to_string(),
    }
}

pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(body.into().into_bytes())
        .insert_header("Content-Type", "text/html; charset=utf-8")
}

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}
