//! Embedded client-state extraction.
//!
//! The mobile place page ships its Apollo cache as a script assignment. Both
//! the variable name and the object layout belong to the upstream site and
//! can change without notice; when they do, this stage yields an empty graph
//! and the pipeline drops to the Open Graph tier.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

static INLINE_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src])").unwrap());

static STATE_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)window\.__APOLLO_STATE__\s*=\s*(\{.*?\});").unwrap());

/// Cache key -> cached value, exactly as embedded in the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateGraph {
    entries: Map<String, Value>,
}

impl StateGraph {
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Values in the order they appear in the page.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }
}

/// All inline script bodies of the page, newline-joined.
pub fn inline_scripts(document: &Html) -> String {
    document
        .select(&INLINE_SCRIPT)
        .map(|script| script.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses the embedded state out of script text; empty on any miss.
pub fn parse_state(scripts: &str) -> StateGraph {
    let Some(object_text) = STATE_ASSIGNMENT
        .captures(scripts)
        .and_then(|caps| caps.get(1))
    else {
        debug!("no state assignment in inline scripts");
        return StateGraph::default();
    };

    match serde_json::from_str::<Value>(object_text.as_str()) {
        Ok(Value::Object(entries)) => StateGraph::from_map(entries),
        Ok(other) => {
            warn!(kind = json_kind(&other), "state assignment is not an object");
            StateGraph::default()
        }
        Err(err) => {
            warn!(error = %err, "state assignment is not valid json");
            StateGraph::default()
        }
    }
}

pub fn extract_state(document: &Html) -> StateGraph {
    parse_state(&inline_scripts(document))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
