use once_cell::sync::Lazy;

/// Seoul-area stations and the lines serving them.
///
/// Order matters: fuzzy lookups return the first matching entry, so more
/// commonly meant stations sit ahead of similarly named ones.
const SEOUL_STATIONS: &[(&str, &str)] = &[
    ("강남역", "(2호선, 신분당선)"),
    ("역삼역", "(2호선)"),
    ("선릉역", "(2호선, 수인분당선)"),
    ("삼성역", "(2호선)"),
    ("종합운동장역", "(2,9호선)"),
    ("잠실역", "(2,8호선)"),
    ("잠실새내역", "(2호선)"),
    ("건대입구역", "(2,7호선)"),
    ("뚝섬역", "(2호선)"),
    ("성수역", "(2호선)"),
    ("왕십리역", "(2,5호선, 경의중앙선, 수인분당선)"),
    ("을지로3가역", "(2,3호선)"),
    ("을지로입구역", "(2호선)"),
    ("을지로4가역", "(2,5호선)"),
    ("동대문역사문화공원역", "(2,4,5호선)"),
    ("시청역", "(1,2호선)"),
    ("종각역", "(1호선)"),
    ("종로3가역", "(1,3,5호선)"),
    ("종로5가역", "(1호선)"),
    ("동대문역", "(1,4호선)"),
    ("서울역", "(1,4호선, 공항철도, 경의중앙선)"),
    ("용산역", "(1호선, 경의중앙선)"),
    ("신촌역", "(2호선)"),
    ("홍대입구역", "(2호선, 공항철도, 경의중앙선)"),
    ("합정역", "(2,6호선)"),
    ("당산역", "(2,9호선)"),
    ("영등포구청역", "(2,5호선)"),
    ("문래역", "(2호선)"),
    ("신도림역", "(1,2호선)"),
    ("대림역", "(2,7호선)"),
    ("구로디지털단지역", "(2호선)"),
    ("가산디지털단지역", "(1,7호선)"),
    ("신림역", "(2호선, 신림선)"),
    ("서울대입구역", "(2호선)"),
    ("사당역", "(2,4호선)"),
    ("방배역", "(2호선)"),
    ("서초역", "(2호선)"),
    ("교대역", "(2,3호선)"),
    ("고속터미널역", "(3,7,9호선)"),
    ("신사역", "(3호선, 신분당선)"),
    ("압구정역", "(3호선)"),
    ("압구정로데오역", "(수인분당선)"),
    ("양재역", "(3호선, 신분당선)"),
    ("신논현역", "(9호선, 신분당선)"),
    ("논현역", "(7호선)"),
    ("학동역", "(7호선)"),
    ("강남구청역", "(7호선, 수인분당선)"),
    ("청담역", "(7호선)"),
    ("광화문역", "(5호선)"),
    ("경복궁역", "(3호선)"),
    ("안국역", "(3호선)"),
    ("충무로역", "(3,4호선)"),
    ("명동역", "(4호선)"),
    ("회현역", "(4호선)"),
    ("혜화역", "(4호선)"),
    ("삼각지역", "(4,6호선)"),
    ("이태원역", "(6호선)"),
    ("녹사평역", "(6호선)"),
    ("한강진역", "(6호선)"),
    ("공덕역", "(5,6호선, 공항철도, 경의중앙선)"),
    ("마포역", "(5호선)"),
    ("여의도역", "(5,9호선)"),
    ("여의나루역", "(5호선)"),
    ("노량진역", "(1,9호선)"),
    ("망원역", "(6호선)"),
    ("상수역", "(6호선)"),
    ("연신내역", "(3,6호선)"),
    ("불광역", "(3,6호선)"),
    ("광나루역", "(5호선)"),
    ("천호역", "(5,8호선)"),
    ("석촌역", "(8,9호선)"),
    ("가락시장역", "(3,8호선)"),
    ("문정역", "(8호선)"),
    ("노원역", "(4,7호선)"),
    ("수유역", "(4호선)"),
    ("성신여대입구역", "(4호선, 우이신설선)"),
    ("서울숲역", "(수인분당선)"),
    ("김포공항역", "(5,9호선, 공항철도, 김포골드라인, 서해선)"),
    ("판교역", "(신분당선, 경강선)"),
    ("정자역", "(신분당선, 수인분당선)"),
];

static SEOUL: Lazy<StationTable> = Lazy::new(|| StationTable::from_entries(SEOUL_STATIONS));

/// Read-only station name -> line annotation table, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationTable {
    entries: Vec<(String, String)>,
}

impl StationTable {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a (&'a str, &'a str)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, lines)| (name.to_string(), lines.to_string()))
                .collect(),
        }
    }

    /// The built-in Seoul table, built on first use.
    pub fn seoul() -> &'static StationTable {
        &SEOUL
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lines(&self, station: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == station)
            .map(|(_, lines)| lines.as_str())
    }

    /// First entry whose name contains `station`, or whose bare name
    /// (without the trailing `역`) appears inside `station`.
    pub fn fuzzy(&self, station: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|(name, _)| {
                let bare = name.strip_suffix('역').unwrap_or(name.as_str());
                name.contains(station) || (!bare.is_empty() && station.contains(bare))
            })
            .map(|(name, lines)| (name.as_str(), lines.as_str()))
    }
}
