//! Clip metadata flattening.
//!
//! Candidate clips arrive with free-form JSON metadata; the matching core
//! only consumes one description embedding per clip. This module flattens
//! whatever schema the metadata uses into a single deterministic
//! description string, recognizing a set of common field aliases.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ProviderError;

/// Fallback description when metadata yields nothing usable.
pub const FALLBACK_DESCRIPTION: &str = "supplementary video clip";

/// Maximum length kept from a free-text description field.
const MAX_DESCRIPTION_FIELD_LEN: usize = 100;

/// Alias table: canonical field name → accepted metadata keys, matched
/// case-insensitively in listed order.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("title", &["title", "name", "clip_name", "video_title"]),
    ("description", &["description", "desc", "summary", "content"]),
    ("category", &["category", "type", "genre"]),
    ("subject", &["subject", "topic", "theme", "focus"]),
    ("action", &["action", "activity", "shows"]),
    ("location", &["location", "place", "setting"]),
    ("objects", &["objects", "items", "products"]),
    ("mood", &["mood", "tone", "atmosphere"]),
    ("tags", &["tags", "keywords", "labels"]),
];

/// Flatten one clip's metadata object into a description string.
///
/// Deterministic: the output depends only on the metadata content, never on
/// map iteration order. Fails with `InvalidMetadata` when the value is not
/// a JSON object.
pub fn flatten_metadata(metadata: &Value) -> Result<String, ProviderError> {
    let object = metadata.as_object().ok_or_else(|| {
        ProviderError::InvalidMetadata(format!(
            "Expected a JSON object, got {}",
            value_kind(metadata)
        ))
    })?;

    // Case-insensitive view with deterministic key ordering.
    let lowered: BTreeMap<String, &Value> = object
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect();

    let field = |canonical: &str| -> Option<&Value> {
        let (_, aliases) = FIELD_ALIASES.iter().find(|(name, _)| *name == canonical)?;
        aliases
            .iter()
            .find_map(|alias| lowered.get(*alias))
            .copied()
            .filter(|v| !is_empty_value(v))
    };

    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = field("title") {
        parts.push(scalar_to_text(title));
    }
    if let Some(action) = field("action") {
        parts.push(format!("shows {}", scalar_to_text(action)));
    } else if let Some(subject) = field("subject") {
        parts.push(format!("features {}", scalar_to_text(subject)));
    }
    if let Some(objects) = field("objects") {
        parts.push(format!("with {}", list_to_text(objects, usize::MAX)));
    }
    if let Some(location) = field("location") {
        parts.push(format!("at {}", scalar_to_text(location)));
    }
    if let Some(description) = field("description") {
        let mut text = scalar_to_text(description);
        if text.chars().count() > MAX_DESCRIPTION_FIELD_LEN {
            text = text.chars().take(MAX_DESCRIPTION_FIELD_LEN - 3).collect::<String>() + "...";
        }
        if parts.is_empty() {
            parts.push(text);
        } else {
            parts.push(format!("- {text}"));
        }
    }
    if parts.is_empty() {
        if let Some(category) = field("category") {
            parts.push(format!("{} clip", scalar_to_text(category)));
        }
    }
    if parts.len() < 3 {
        if let Some(mood) = field("mood") {
            parts.push(format!("({} tone)", scalar_to_text(mood)));
        }
    }
    if parts.len() < 2 {
        if let Some(tags) = field("tags") {
            parts.push(format!("[{}]", list_to_text(tags, 3)));
        }
    }

    if parts.is_empty() {
        // Fallback: first non-empty scalar field in key order.
        for value in lowered.values() {
            if !is_empty_value(value) && (value.is_string() || value.is_number()) {
                return Ok(scalar_to_text(value));
            }
        }
        return Ok(FALLBACK_DESCRIPTION.to_string());
    }

    let joined = parts.join(" ");
    Ok(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Flatten a whole clip-metadata map, id → description.
///
/// A clip whose metadata cannot be flattened falls back to a generic
/// description naming the clip rather than failing the batch.
pub fn flatten_metadata_map(metadata: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(clip_id, value)| {
            let description = match flatten_metadata(value) {
                Ok(description) => description,
                Err(error) => {
                    tracing::warn!(clip_id = %clip_id, %error, "Failed to flatten clip metadata");
                    format!("video clip {clip_id}")
                }
            };
            (clip_id.clone(), description)
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(_) => list_to_text(value, usize::MAX),
        other => other.to_string(),
    }
}

fn list_to_text(value: &Value, limit: usize) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .take(limit)
            .map(scalar_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_text(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
