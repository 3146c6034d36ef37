//! Image gallery validation.

use serde_json::Value;

use crate::models::ImageRecord;

/// Whether `url` is usable as an image source: an absolute http(s) reference.
pub fn is_valid_image_url(url: &str) -> bool {
    url.starts_with("http")
}

/// Keep only gallery entries with a valid `url`, in their original order.
///
/// A missing or non-array gallery yields an empty list. Invalid entries are
/// dropped, never repaired, and duplicates are kept.
pub fn validate_gallery(gallery: Option<&Value>) -> Vec<ImageRecord> {
    let Some(Value::Array(entries)) = gallery else {
        return Vec::new();
    };

    entries.iter().filter_map(image_record).collect()
}

fn image_record(entry: &Value) -> Option<ImageRecord> {
    let url = entry
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| is_valid_image_url(url))?;

    let text = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(ImageRecord {
        url: url.to_string(),
        attribution: text("attribution"),
        source: text("source"),
        license: entry
            .get("license")
            .and_then(Value::as_str)
            .map(String::from),
    })
}
