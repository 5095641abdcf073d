use std::fs;
use url::Url;

use crate::entities::MENU_NOT_AVAILABLE;
use crate::extractor::{PlacePage, analyze_place_page};
use crate::pipeline::stage::Stage;
use crate::station::StationTable;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn home_url(place_id: &str) -> Url {
    Url::parse(&format!("https://m.place.naver.com/restaurant/{place_id}/home")).unwrap()
}

#[test]
fn test_analyze_full_place_page() {
    let html = fixture("place_home.html");

    let PlacePage { details, station } =
        analyze_place_page(&html, "1234567", &home_url("1234567"), StationTable::seoul()).unwrap();

    assert_eq!(details.name, "행복식당");
    assert_eq!(details.category, "한식,백반");
    assert_eq!(details.tags, vec!["한식", "백반"]);
    assert_eq!(details.description, "집밥 같은 백반집");
    assert_eq!(details.location, "서울 중구 을지로 100");
    assert_eq!(
        details.images,
        vec![
            "https://ldb-phinf.pstatic.net/place/1.jpg",
            "https://ldb-phinf.pstatic.net/place/2.jpg",
            "https://ldb-phinf.pstatic.net/place/3.jpg",
        ]
    );
    assert_eq!(
        details.menu,
        "김치찌개 (9000원), 제육볶음 (10000원), 모듬전 (변동)"
    );
    assert_eq!(station.as_deref(), Some("을지로3가역 2,3호선"));
}

#[test]
fn test_address_station_and_og_image_backfill() {
    let html = fixture("place_address_station.html");

    let PlacePage { details, station } =
        analyze_place_page(&html, "55", &home_url("55"), StationTable::seoul()).unwrap();

    assert_eq!(details.name, "을지면옥");
    assert_eq!(details.description, "평양냉면 전문점");
    assert_eq!(details.images, vec!["https://search.pstatic.net/og-only.jpg"]);
    assert_eq!(details.menu, MENU_NOT_AVAILABLE);
    assert_eq!(station.as_deref(), Some("을지로3가역 (2,3호선)"));
}

#[test]
fn test_page_without_state_misses_extraction() {
    let html = fixture("place_no_state.html");

    let miss = analyze_place_page(&html, "1234567", &home_url("1234567"), StationTable::seoul())
        .unwrap_err();
    assert_eq!(miss.stage, Stage::ExtractingState);
}

#[test]
fn test_state_without_business_misses_derivation() {
    let html = fixture("place_other_business.html");

    let miss = analyze_place_page(&html, "1234567", &home_url("1234567"), StationTable::seoul())
        .unwrap_err();
    assert_eq!(miss.stage, Stage::DerivingFields);
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><script>window.__APOLLO_STATE__ = {\"P:1\": {\"id\": \"1\", \"name\": \"깨진\"}};<body><p>Unclosed";

    // The unclosed script swallows the rest of the document as script text
    let page = analyze_place_page(html, "1", &home_url("1"), StationTable::seoul()).unwrap();
    assert_eq!(page.details.name, "깨진");
    assert_eq!(page.details.menu, MENU_NOT_AVAILABLE);
    assert_eq!(page.station, None);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::extractor::og::{OgMeta, fallback_record};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_analyze_never_panics(
            html in ".*",
            place_id in "[0-9]{1,8}",
        ) {
            let _ = analyze_place_page(&html, &place_id, &home_url(&place_id), StationTable::seoul());
        }

        #[test]
        fn test_state_blob_never_panics(body in ".*") {
            let html = format!("<script>window.__APOLLO_STATE__ = {{{body}}};</script>");
            let _ = analyze_place_page(&html, "1", &home_url("1"), StationTable::seoul());
        }

        #[test]
        fn test_og_fallback_images_bounded(html in ".*") {
            let input = Url::parse("https://example.com").unwrap();
            let record = fallback_record(&OgMeta::parse(&html), &input);
            prop_assert!(record.images.len() <= 5);
            prop_assert_eq!(record.image.is_empty(), record.images.is_empty());
        }
    }
}
