//! Turns a Naver Map or Kakao Map link into a normalized restaurant record.
//!
//! ```no_run
//! # async fn demo() -> Result<(), mapscrape::ParseError> {
//! let record = mapscrape::parse_url("https://naver.me/5abcdEF").await?;
//! println!("{} near {}", record.name, record.station);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod geocoder;
pub mod pipeline;
pub mod resolver;
pub mod station;

pub use config::Config;
pub use entities::{Coordinates, RestaurantRecord};
pub use pipeline::{ParseError, Parser, parse_url};
