#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use reqwest::StatusCode;
use url::Url;

use mapscrape::extractor::{OgMeta, analyze_place_page, fallback_record};
use mapscrape::fetcher::decode::process_response;
use mapscrape::station::StationTable;

fuzz_target!(|data: &[u8]| {
    let page_url = Url::parse("https://m.place.naver.com/restaurant/1/home").unwrap();

    // Charset sniffing runs on raw bytes, before anything is valid UTF-8
    let page = process_response(
        page_url.clone(),
        StatusCode::OK,
        Bytes::copy_from_slice(data),
        "text/html",
    );

    // Neither tier may panic regardless of input
    let _ = analyze_place_page(&page.body_utf8, "1", &page_url, StationTable::seoul());
    let _ = fallback_record(&OgMeta::parse(&page.body_utf8), &page_url);
});
