//! Nearest-subway-station labels.
//!
//! The place page itself is tried first; the road address is the fallback.
//! Both are pure functions of their input, so the same page and address
//! always produce the same label.

pub mod table;

pub use table::StationTable;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

const TRANSIT_HEADINGS: &[&str] = &["지하철", "교통"];

static SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.place_section, section").unwrap());
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, .place_section_header").unwrap());
static TRANSIT_TEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".traffic_text, .subway_item").unwrap());

// "강남역 2호선", "을지로3가역 2,3호선", or a bare "서울역".
static PAGE_STATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣0-9]+역(?:\s*[0-9]+(?:\s*,\s*[0-9]+)*\s*호선)?").unwrap());

// Station token inside an address; the trailing group keeps "역삼로" and the
// like from matching as a station.
static ADDRESS_STATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣0-9]+역)(?:[^가-힣0-9]|$)").unwrap());

/// Station label for a place, or `None` when neither source names one.
pub fn resolve_station(document: &Html, road_address: &str, table: &StationTable) -> Option<String> {
    if let Some(label) = station_from_page(document) {
        debug!(%label, "station found in page transit section");
        return Some(label);
    }
    let label = station_from_address(road_address, table);
    debug!(?label, "station from address");
    label
}

/// Reads the station from a "지하철"/"교통" section of the rendered page.
pub fn station_from_page(document: &Html) -> Option<String> {
    document
        .select(&SECTION)
        .filter(|section| is_transit_section(section))
        .flat_map(|section| section.select(&TRANSIT_TEXT).collect::<Vec<_>>())
        .find_map(|item| {
            let text = item.text().collect::<String>();
            PAGE_STATION
                .find(&text)
                .map(|m| m.as_str().trim().to_string())
        })
}

fn is_transit_section(section: &ElementRef<'_>) -> bool {
    section.select(&HEADING).any(|heading| {
        let text = heading.text().collect::<String>();
        TRANSIT_HEADINGS.iter().any(|keyword| text.contains(keyword))
    })
}

/// Finds a `…역` token in an address and annotates it from `table`.
pub fn station_from_address(address: &str, table: &StationTable) -> Option<String> {
    let name = ADDRESS_STATION.captures(address)?.get(1)?.as_str();

    if let Some(lines) = table.lines(name) {
        return Some(format!("{name} {lines}"));
    }
    if let Some((canonical, lines)) = table.fuzzy(name) {
        return Some(format!("{canonical} {lines}"));
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn reads_station_from_subway_section() {
        let doc = page(
            r#"<div class="place_section"><h2>찾아가는길</h2><span class="traffic_text">입구 앞</span></div>
               <div class="place_section"><h2>지하철</h2>
                 <div class="subway_item">강남역 2호선 11번 출구에서 185m</div>
               </div>"#,
        );
        assert_eq!(station_from_page(&doc).as_deref(), Some("강남역 2호선"));
    }

    #[test]
    fn reads_station_with_multiple_lines() {
        let doc = page(
            r#"<section><h3>대중교통</h3><p class="traffic_text">을지로3가역 2,3호선 도보 3분</p></section>"#,
        );
        assert_eq!(station_from_page(&doc).as_deref(), Some("을지로3가역 2,3호선"));
    }

    #[test]
    fn ignores_non_transit_sections() {
        let doc = page(r#"<div class="place_section"><h2>메뉴</h2><span class="traffic_text">강남역</span></div>"#);
        assert_eq!(station_from_page(&doc), None);
    }

    #[test]
    fn address_exact_match_gets_lines() {
        let table = StationTable::seoul();
        assert_eq!(
            station_from_address("서울 서초구 서초대로 1 교대역 5번출구", table).as_deref(),
            Some("교대역 (2,3호선)")
        );
    }

    #[test]
    fn address_fuzzy_match_uses_canonical_name() {
        let table = StationTable::from_entries(&[("을지로3가역", "(2,3호선)")]);
        assert_eq!(
            station_from_address("서울 중구 3가역 앞", &table).as_deref(),
            Some("을지로3가역 (2,3호선)")
        );
    }

    #[test]
    fn builtin_table_resolves_fragment() {
        assert_eq!(
            station_from_address("서울 중구 3가역 앞", StationTable::seoul()).as_deref(),
            Some("을지로3가역 (2,3호선)")
        );
    }

    #[test]
    fn unknown_station_is_returned_bare() {
        let table = StationTable::seoul();
        assert_eq!(
            station_from_address("부산 해운대구 해운대역 앞", table).as_deref(),
            Some("해운대역")
        );
    }

    #[test]
    fn street_names_starting_with_yeok_are_not_stations() {
        let table = StationTable::seoul();
        assert_eq!(station_from_address("서울 강남구 역삼로 180", table), None);
        assert_eq!(station_from_address("", table), None);
    }

    #[test]
    fn page_wins_over_address() {
        let doc = page(r#"<div class="place_section"><h2>지하철</h2><span class="subway_item">선릉역</span></div>"#);
        let label = resolve_station(&doc, "서울 강남구 강남역 앞", StationTable::seoul());
        assert_eq!(label.as_deref(), Some("선릉역"));
    }

    #[test]
    fn resolution_is_repeatable() {
        let doc = page("");
        let table = StationTable::seoul();
        let first = resolve_station(&doc, "서울 중구 을지로3가역 앞", table);
        let second = resolve_station(&doc, "서울 중구 을지로3가역 앞", table);
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("을지로3가역 (2,3호선)"));
    }
}
