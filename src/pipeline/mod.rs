//! The `parse_url` state machine.
//!
//! ```text
//! ResolvingRedirect -> [BridgingPlatform] -> ExtractingState -> DerivingFields
//!     -> ResolvingStation -> Geocoding -> Done
//!                 \ any miss -> FallingBackToOg -> Geocoding -> Done
//! ```
//!
//! Only the first step and the Open Graph tier can fail a parse; every other
//! step reports a [`StageMiss`] and hands over to the next tier.

pub mod stage;

pub use stage::{ParseError, Stage, StageMiss};

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::entities::RestaurantRecord;
use crate::extractor::{OgMeta, PlacePage, analyze_place_page, fallback_record};
use crate::fetcher::{Agent, FetchError, FetchOptions, Fetcher};
use crate::geocoder::{GeocodeError, Geocoder, NaverGeocoder};
use crate::resolver::bridge::{Bridge, BridgedPlace};
use crate::resolver::{self, Platform, place_home_url};
use crate::station::StationTable;

static DEFAULT_PARSER: OnceCell<Parser> = OnceCell::new();

/// Parses `url` with a process-wide parser configured from the environment.
///
/// Only the HTTP client and configuration are shared between calls; every
/// call scrapes live and keeps its intermediate state to itself.
pub async fn parse_url(url: &str) -> Result<RestaurantRecord, ParseError> {
    let parser = DEFAULT_PARSER
        .get_or_try_init(|| {
            let config = Config::from_env().unwrap_or_else(|err| {
                warn!(error = %err, "invalid configuration; using defaults");
                Config::default()
            });
            Parser::new(config)
        })
        .map_err(ParseError::Client)?;
    parser.parse_url(url).await
}

pub struct Parser {
    config: Config,
    fetcher: Fetcher,
    geocoder: Arc<dyn Geocoder>,
    stations: &'static StationTable,
}

impl Parser {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&config)?;
        let geocoder = Arc::new(NaverGeocoder::new(fetcher.client().clone(), &config));
        Ok(Self {
            config,
            fetcher,
            geocoder,
            stations: StationTable::seoul(),
        })
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn parse_url(&self, url: &str) -> Result<RestaurantRecord, ParseError> {
        self.parse_url_with_cancel(url, &CancellationToken::new())
            .await
    }

    /// Like [`Parser::parse_url`], aborting the in-flight request as soon as
    /// `cancel` fires.
    pub async fn parse_url_with_cancel(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RestaurantRecord, ParseError> {
        let deadline = self.config.parse_deadline();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ParseError::Cancelled),
            result = tokio::time::timeout(deadline, self.run(url)) => {
                result.map_err(|_| ParseError::DeadlineExceeded(deadline))?
            }
        }
    }

    #[instrument(skip(self))]
    async fn run(&self, url: &str) -> Result<RestaurantRecord, ParseError> {
        // 1. Redirects; the only step without a fallback
        let resolution = resolver::resolve(&self.fetcher, url, self.config.kakao_hosts())
            .await
            .map_err(ParseError::Resolve)?;
        let mut working_url = resolution.final_url;
        let mut place_id = resolution.place_id;

        // 2. Foreign platform -> Naver
        if resolution.platform == Platform::Kakao {
            match self.bridge(&working_url).await {
                Ok(bridged) => {
                    info!(place_id = %bridged.place_id, "bridged to naver place");
                    working_url = bridged.url;
                    place_id = Some(bridged.place_id);
                }
                Err(miss) => warn!(%miss, "no naver counterpart; continuing without place id"),
            }
        }

        // 3-5. State blob, fields, station
        let record = match self.place_record(place_id.as_deref(), &working_url).await {
            Ok(record) => record,
            Err(miss) => {
                debug!(%miss, stage = %Stage::FallingBackToOg, "structured extraction missed");
                self.og_fallback(url).await?
            }
        };

        // 7. Coordinates
        let record = self.geocode(record).await;
        debug!(stage = %Stage::Done, name = %record.name, "parse finished");
        Ok(record)
    }

    async fn bridge(&self, page_url: &Url) -> Result<BridgedPlace, StageMiss> {
        Bridge::new(
            &self.fetcher,
            self.config.naver_search_url(),
            self.config.naver_place_base(),
        )
        .convert(page_url)
        .await
        .map_err(|err| StageMiss::fetch(Stage::BridgingPlatform, &err))?
        .ok_or_else(|| StageMiss::new(Stage::BridgingPlatform, "search found no place"))
    }

    async fn place_record(
        &self,
        place_id: Option<&str>,
        working_url: &Url,
    ) -> Result<RestaurantRecord, StageMiss> {
        let place_id =
            place_id.ok_or_else(|| StageMiss::new(Stage::ExtractingState, "no place id"))?;

        let place_base = self.config.naver_place_base();
        let home_url = place_home_url(place_base, place_id);
        let options = FetchOptions::new(Agent::Mobile).with_referer(place_base.as_str());
        let page = self
            .fetcher
            .fetch_page(&home_url, options)
            .await
            .map_err(|err| StageMiss::fetch(Stage::ExtractingState, &err))?;

        let PlacePage { details, station } =
            analyze_place_page(&page.body_utf8, place_id, &home_url, self.stations)?;
        if station.is_none() {
            debug!(stage = %Stage::ResolvingStation, "no station for place");
        }

        let mut record = details.into_record(working_url);
        record.station = station.unwrap_or_default();
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn og_fallback(&self, input_url: &str) -> Result<RestaurantRecord, ParseError> {
        let input_url =
            Url::parse(input_url).map_err(|err| ParseError::Fallback(FetchError::from(err)))?;
        let page = self
            .fetcher
            .fetch_page(&input_url, FetchOptions::new(Agent::LinkPreview))
            .await
            .map_err(ParseError::Fallback)?;

        let meta = OgMeta::parse(&page.body_utf8);
        Ok(fallback_record(&meta, &input_url))
    }

    async fn geocode(&self, mut record: RestaurantRecord) -> RestaurantRecord {
        if record.location.trim().is_empty() || record.coordinates().is_some() {
            return record;
        }

        match self.geocoder.geocode(&record.location).await {
            Ok(coords) => record.set_coordinates(coords),
            Err(GeocodeError::MissingCredentials) => {
                debug!(stage = %Stage::Geocoding, "no geocoding credentials; record left without pin")
            }
            Err(err) => warn!(stage = %Stage::Geocoding, error = %err, "geocoding skipped"),
        }
        record
    }
}
