//! Typed view over the loosely shaped state graph.
//!
//! Each cached value is classified exactly once into a [`GraphNode`]; the
//! field deriver then works with variants instead of probing raw JSON.

use serde_json::Value;

use crate::extractor::state::StateGraph;

pub const TYPENAME_KEY: &str = "__typename";
pub const MENU_TYPENAME: &str = "Menu";
const REF_KEY: &str = "__ref";
const IMAGE_URL_KEYS: &[&str] = &["origin", "url", "src", "imageUrl"];

#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode<'g> {
    Business(BusinessEntity<'g>),
    Menu(MenuEntity<'g>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessEntity<'g> {
    pub name: &'g str,
    pub category: Option<&'g str>,
    pub description: Option<&'g str>,
    pub micro_review: Option<&'g str>,
    pub road_address: Option<&'g str>,
    pub address: Option<&'g str>,
    pub images: Option<&'g Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntity<'g> {
    pub name: &'g str,
    pub price: Option<String>,
    pub images: Option<&'g Value>,
}

/// Classifies one cached value relative to the place being parsed.
///
/// A value typed as a menu is always a menu. Otherwise it is the business
/// when its id is `place_id` and it has a name, and a menu when it carries
/// a name, a price and a true `recommend` flag.
pub fn classify<'g>(value: &'g Value, place_id: &str) -> GraphNode<'g> {
    let Some(object) = value.as_object() else {
        return GraphNode::Unknown;
    };
    let typename = object.get(TYPENAME_KEY).and_then(Value::as_str);
    let name = non_empty_str(object.get("name"));

    if typename == Some(MENU_TYPENAME) {
        return match name {
            Some(name) => GraphNode::Menu(MenuEntity::new(name, value)),
            None => GraphNode::Unknown,
        };
    }

    let Some(name) = name else {
        return GraphNode::Unknown;
    };

    if id_matches(object.get("id"), place_id) {
        return GraphNode::Business(BusinessEntity {
            name,
            category: non_empty_str(object.get("category")),
            description: non_empty_str(object.get("description")),
            micro_review: first_text(object.get("microReview"))
                .or_else(|| first_text(object.get("microReviews"))),
            road_address: non_empty_str(object.get("roadAddress")),
            address: non_empty_str(object.get("address")),
            images: object.get("images"),
        });
    }

    let recommended = object.get("recommend").and_then(Value::as_bool) == Some(true);
    if recommended && object.get("price").is_some_and(|p| !p.is_null()) {
        return GraphNode::Menu(MenuEntity::new(name, value));
    }

    GraphNode::Unknown
}

impl<'g> MenuEntity<'g> {
    fn new(name: &'g str, value: &'g Value) -> Self {
        Self {
            name,
            price: value.get("price").and_then(price_text),
            images: value.get("images"),
        }
    }
}

/// Classifies every value of the graph, in graph order.
pub fn nodes<'g>(graph: &'g StateGraph, place_id: &'g str) -> impl Iterator<Item = GraphNode<'g>> {
    graph.values().map(move |value| classify(value, place_id))
}

/// Image URLs held by an `images` field.
///
/// Entries may be plain strings, objects carrying the URL under a known key,
/// or `{"__ref": key}` pointers into the same graph.
pub fn image_urls(images: Option<&Value>, graph: &StateGraph) -> Vec<String> {
    let Some(images) = images else {
        return Vec::new();
    };
    let items: Vec<&Value> = match images {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    };
    items
        .into_iter()
        .filter_map(|item| image_url(item, graph, 0))
        .collect()
}

fn image_url(item: &Value, graph: &StateGraph, depth: u8) -> Option<String> {
    match item {
        Value::String(url) if !url.trim().is_empty() => Some(url.trim().to_string()),
        Value::Object(object) => {
            if let Some(key) = object.get(REF_KEY).and_then(Value::as_str) {
                // Apollo refs are one level deep; the bound stops self-references.
                return if depth < 2 {
                    graph.get(key).and_then(|target| image_url(target, graph, depth + 1))
                } else {
                    None
                };
            }
            IMAGE_URL_KEYS
                .iter()
                .find_map(|key| non_empty_str(object.get(*key)))
                .map(str::to_string)
        }
        _ => None,
    }
}

fn id_matches(id: Option<&Value>, place_id: &str) -> bool {
    match id {
        Some(Value::String(id)) => id == place_id,
        Some(Value::Number(id)) => id.to_string() == place_id,
        _ => false,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().find_map(|item| non_empty_str(Some(item))),
        other => non_empty_str(other),
    }
}

fn price_text(price: &Value) -> Option<String> {
    match price {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
