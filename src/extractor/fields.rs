use url::Url;

use crate::entities::{MAX_IMAGES, MENU_NOT_AVAILABLE, RestaurantRecord};
use crate::extractor::graph::{BusinessEntity, GraphNode, MenuEntity, image_urls, nodes};
use crate::extractor::state::StateGraph;

/// Everything the state graph tells us about one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDetails {
    pub name: String,
    pub category: String,
    pub images: Vec<String>,
    pub description: String,
    pub location: String,
    pub menu: String,
    pub tags: Vec<String>,
}

impl PlaceDetails {
    pub fn into_record(self, url: &Url) -> RestaurantRecord {
        let mut record = RestaurantRecord::new(url.as_str(), self.name);
        record.category = self.category;
        record.set_images(self.images);
        record.description = self.description;
        record.location = self.location;
        record.set_menu(self.menu);
        record.tags = self.tags;
        record
    }
}

/// Derives place details from the graph.
///
/// `og_image` is the page's own `og:image`, used only when neither the
/// business nor any menu item has a picture. Returns `None` when the graph
/// holds no business entity for `place_id`.
pub fn derive_fields(
    graph: &StateGraph,
    place_id: &str,
    og_image: Option<String>,
) -> Option<PlaceDetails> {
    let business = nodes(graph, place_id).find_map(|node| match node {
        GraphNode::Business(business) => Some(business),
        _ => None,
    })?;

    let mut menu_items = Vec::new();
    let mut menu_images = Vec::new();
    for node in nodes(graph, place_id) {
        if let GraphNode::Menu(item) = node {
            if let Some(image) = image_urls(item.images, graph).into_iter().next() {
                menu_images.push(image);
            }
            menu_items.push(format_menu_item(&item));
        }
    }

    let mut images: Vec<String> = image_urls(business.images, graph)
        .into_iter()
        .take(MAX_IMAGES)
        .collect();
    if images.is_empty() {
        images = menu_images.into_iter().take(MAX_IMAGES).collect();
    }
    if images.is_empty() {
        images.extend(og_image);
    }

    let menu = if menu_items.is_empty() {
        MENU_NOT_AVAILABLE.to_string()
    } else {
        menu_items.join(", ")
    };

    Some(PlaceDetails {
        name: business.name.to_string(),
        category: business.category.unwrap_or_default().to_string(),
        images,
        description: business
            .description
            .or(business.micro_review)
            .unwrap_or_default()
            .to_string(),
        location: location(&business).to_string(),
        menu,
        tags: category_tags(business.category.unwrap_or_default()),
    })
}

fn location<'g>(business: &BusinessEntity<'g>) -> &'g str {
    business
        .road_address
        .or(business.address)
        .unwrap_or_default()
}

/// `"김치찌개 (9000원)"` when the price has digits, the raw price otherwise.
pub fn format_menu_item(item: &MenuEntity<'_>) -> String {
    let Some(price) = item.price.as_deref().filter(|p| !p.is_empty()) else {
        return item.name.to_string();
    };
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u64>() {
        Ok(amount) => format!("{} ({}원)", item.name, amount),
        Err(_) => format!("{} ({})", item.name, price),
    }
}

/// `"한식,찌개"` -> `["한식", "찌개"]`, trimmed and de-duplicated.
pub fn category_tags(category: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in category.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
