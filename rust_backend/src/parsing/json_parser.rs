use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::core::domain::RawRecord;

/// Key under which a wrapped document stores its record array
const RECORDS_KEY: &str = "records";

/// Parse a visitor-log JSON file into raw records
pub fn parse_visits_json(json_path: &Path) -> Result<Vec<RawRecord>> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;

    parse_visits_json_str(&json_content)
}

/// Parse visitor-log JSON from a string.
///
/// Accepts a bare array of visit objects or an object holding the array
/// under `"records"`. A structurally invalid element fails the whole
/// document with the index and field path of the problem; content problems
/// such as an unparseable date are left to the normalizer.
pub fn parse_visits_json_str(json_str: &str) -> Result<Vec<RawRecord>> {
    // First validate that it's valid JSON
    let json_value: Value = serde_json::from_str(json_str).with_context(|| {
        let preview: String = json_str.chars().take(500).collect();
        format!("Invalid JSON syntax. First 500 chars: {}", preview)
    })?;

    let items = match json_value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(RECORDS_KEY) {
            Some(Value::Array(items)) => items,
            Some(other) => anyhow::bail!(
                "'{}' must be an array of visit objects, found {}",
                RECORDS_KEY,
                json_type_name(&other)
            ),
            None => anyhow::bail!(
                "JSON must be an array of visits or contain a '{}' key. Found keys: {:?}",
                RECORDS_KEY,
                map.keys().collect::<Vec<_>>()
            ),
        },
        other => anyhow::bail!(
            "JSON must be an array of visit objects, found {}",
            json_type_name(&other)
        ),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| convert_item(item, idx))
        .collect()
}

/// Deserialize one element, reporting the field path on failure
fn convert_item(item: Value, idx: usize) -> Result<RawRecord> {
    if !item.is_object() {
        anyhow::bail!(
            "Visit at index {} must be an object, found {}",
            idx,
            json_type_name(&item)
        );
    }

    serde_path_to_error::deserialize(item).map_err(|err| {
        anyhow::anyhow!(
            "Error in visit at index {}: field '{}': {}",
            idx,
            err.path(),
            err.inner()
        )
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
