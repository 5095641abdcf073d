use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder used whenever no menu item could be extracted.
pub const MENU_NOT_AVAILABLE: &str = "정보 없음";
/// `price_range` is never scraped; every record carries this marker.
pub const PRICE_RANGE_PLACEHOLDER: &str = "₩₩";
/// Category assigned to records produced by the Open Graph fallback.
pub const UNKNOWN_CATEGORY: &str = "Unknown";
/// Tag assigned to records produced by the Open Graph fallback.
pub const SCRAPED_TAG: &str = "Scraped";

pub const MAX_IMAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A normalized restaurant as handed to room, voting and map collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub id: String,
    pub url: String,
    pub name: String,
    pub category: String,
    pub images: Vec<String>,
    pub image: String,
    pub description: String,
    pub location: String,
    pub station: String,
    pub menu: String,
    pub price_range: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub likes: u32,
    pub dislikes: u32,
    pub dislike_reasons: Vec<String>,
}

impl RestaurantRecord {
    /// Empty record with a fresh id and every default the collaborators expect.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            url: url.into(),
            name: name.into(),
            category: String::new(),
            images: Vec::new(),
            image: String::new(),
            description: String::new(),
            location: String::new(),
            station: String::new(),
            menu: MENU_NOT_AVAILABLE.to_string(),
            price_range: PRICE_RANGE_PLACEHOLDER.to_string(),
            tags: Vec::new(),
            latitude: None,
            longitude: None,
            likes: 0,
            dislikes: 0,
            dislike_reasons: Vec::new(),
        }
    }

    /// Replaces the image list, keeping at most `MAX_IMAGES` and syncing `image`.
    pub fn set_images<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.images = images.into_iter().take(MAX_IMAGES).collect();
        self.image = self.images.first().cloned().unwrap_or_default();
    }

    /// Sets `menu`, substituting the placeholder for an empty string.
    pub fn set_menu(&mut self, menu: String) {
        self.menu = if menu.trim().is_empty() {
            MENU_NOT_AVAILABLE.to_string()
        } else {
            menu
        };
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.latitude = Some(coords.latitude);
        self.longitude = Some(coords.longitude);
    }

    /// Room-level duplicate rule: same display name or same id.
    ///
    /// Two different restaurants sharing a name collide, and re-scraping the
    /// same place yields a new id so it does not match by id. Callers rely on
    /// exactly this behaviour.
    pub fn is_same_listing(&self, other: &RestaurantRecord) -> bool {
        self.name == other.name || self.id == other.id
    }
}
