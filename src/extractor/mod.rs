pub mod fields;
pub mod graph;
pub mod og;
pub mod state;

#[cfg(test)]
mod tests;

pub use fields::{PlaceDetails, derive_fields};
pub use og::{OgMeta, fallback_record};
pub use state::{StateGraph, extract_state};

use scraper::Html;
use url::Url;

use crate::pipeline::stage::{Stage, StageMiss};
use crate::station::{StationTable, resolve_station};

/// What a mobile place page yields when its state blob is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacePage {
    pub details: PlaceDetails,
    pub station: Option<String>,
}

/// Runs state extraction, field derivation and station resolution over one
/// fetched place page.
///
/// Kept synchronous: the parsed DOM is not `Send` and must not live across
/// an await point.
pub fn analyze_place_page(
    html: &str,
    place_id: &str,
    page_url: &Url,
    table: &StationTable,
) -> Result<PlacePage, StageMiss> {
    let document = Html::parse_document(html);

    // 1. Embedded state
    let graph = extract_state(&document);
    if graph.is_empty() {
        return Err(StageMiss::new(Stage::ExtractingState, "no embedded state graph"));
    }

    // 2. Business entity, menu and images
    let og_image = OgMeta::from_document(&document).absolute_image(page_url);
    let details = derive_fields(&graph, place_id, og_image).ok_or_else(|| {
        StageMiss::new(
            Stage::DerivingFields,
            format!("no business entity for place {place_id} among {} values", graph.len()),
        )
    })?;

    // 3. Nearest station
    let station = resolve_station(&document, &details.location, table);

    Ok(PlacePage { details, station })
}
