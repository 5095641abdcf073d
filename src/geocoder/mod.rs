//! Address -> coordinates lookup.
//!
//! The provider answers with `x` = longitude and `y` = latitude; the swap
//! into [`Coordinates`] happens here and nowhere else.

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{Config, GeocodeCredentials};
use crate::entities::Coordinates;
use crate::fetcher::FetchError;

const API_KEY_ID_HEADER: &str = "X-NCP-APIGW-API-KEY-ID";
const API_KEY_HEADER: &str = "X-NCP-APIGW-API-KEY";

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoding credentials are not configured")]
    MissingCredentials,

    #[error("geocoding request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("geocoding response could not be decoded: {0}")]
    Decode(String),

    #[error("no address candidates for {0:?}")]
    NoResults(String),

    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    addresses: Vec<AddressCandidate>,
}

#[derive(Debug, Deserialize)]
struct AddressCandidate {
    x: CoordinateValue,
    y: CoordinateValue,
}

// The provider documents strings but numbers show up in practice.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    fn to_f64(&self) -> Result<f64, GeocodeError> {
        match self {
            CoordinateValue::Number(value) => Ok(*value),
            CoordinateValue::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| GeocodeError::InvalidCoordinate(text.clone())),
        }
    }
}

/// Naver Cloud Maps geocoding client.
#[derive(Debug, Clone)]
pub struct NaverGeocoder {
    client: Client,
    endpoint: Url,
    credentials: Option<GeocodeCredentials>,
    timeout: Duration,
}

impl NaverGeocoder {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.geocode_url().clone(),
            credentials: config.geocode_credentials().cloned(),
            timeout: config.request_timeout(),
        }
    }
}

#[async_trait]
impl Geocoder for NaverGeocoder {
    #[instrument(skip_all, fields(address = %address))]
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(GeocodeError::MissingCredentials)?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("query", address);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .header(API_KEY_ID_HEADER, &credentials.client_id)
            .header(API_KEY_HEADER, &credentials.client_secret)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status }.into());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| GeocodeError::Decode(err.to_string()))?;

        let first = body
            .addresses
            .first()
            .ok_or_else(|| GeocodeError::NoResults(address.to_string()))?;

        let coords = Coordinates {
            longitude: first.x.to_f64()?,
            latitude: first.y.to_f64()?,
        };
        debug!(?coords, "geocoded");
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_and_number_coordinates() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"status":"OK","addresses":[{"roadAddress":"서울","x":"127.0","y":37.5}]}"#,
        )
        .unwrap();
        let first = &body.addresses[0];
        assert_eq!(first.x.to_f64().unwrap(), 127.0);
        assert_eq!(first.y.to_f64().unwrap(), 37.5);
    }

    #[test]
    fn missing_addresses_decode_as_empty() {
        let body: GeocodeResponse = serde_json::from_str(r#"{"status":"OK"}"#).unwrap();
        assert!(body.addresses.is_empty());
    }

    #[test]
    fn rejects_garbage_coordinates() {
        let value = CoordinateValue::Text("east".into());
        assert!(matches!(value.to_f64(), Err(GeocodeError::InvalidCoordinate(_))));
    }

    #[tokio::test]
    async fn missing_credentials_fail_fast() {
        let geocoder = NaverGeocoder::new(Client::new(), &Config::default());
        let err = geocoder.geocode("서울 중구 을지로 100").await.unwrap_err();
        assert!(matches!(err, GeocodeError::MissingCredentials));
    }
}
