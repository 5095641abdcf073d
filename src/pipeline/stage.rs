use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::fetcher::FetchError;

/// Steps of a single parse, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingRedirect,
    BridgingPlatform,
    ExtractingState,
    DerivingFields,
    ResolvingStation,
    FallingBackToOg,
    Geocoding,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResolvingRedirect => "resolving_redirect",
            Stage::BridgingPlatform => "bridging_platform",
            Stage::ExtractingState => "extracting_state",
            Stage::DerivingFields => "deriving_fields",
            Stage::ResolvingStation => "resolving_station",
            Stage::FallingBackToOg => "falling_back_to_og",
            Stage::Geocoding => "geocoding",
            Stage::Done => "done",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable stage failure. Never leaves the pipeline; it only decides
/// which tier runs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMiss {
    pub stage: Stage,
    pub reason: String,
}

impl StageMiss {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }

    pub fn fetch(stage: Stage, err: &FetchError) -> Self {
        Self::new(stage, err.to_string())
    }
}

impl Display for StageMiss {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

/// Failures a caller of `parse_url` has to handle.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not resolve input url: {0}")]
    Resolve(#[source] FetchError),

    #[error("open graph fallback failed: {0}")]
    Fallback(#[source] FetchError),

    #[error("parse exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("parse cancelled")]
    Cancelled,

    #[error("http client unavailable: {0}")]
    Client(#[source] FetchError),
}

impl ParseError {
    /// Stage that was running when the parse failed.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ParseError::Resolve(_) => Some(Stage::ResolvingRedirect),
            ParseError::Fallback(_) => Some(Stage::FallingBackToOg),
            ParseError::DeadlineExceeded(_) | ParseError::Cancelled | ParseError::Client(_) => None,
        }
    }
}
