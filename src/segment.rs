//! Read access to the properties of a street segment feature.

use geojson::{JsonObject, JsonValue};

/// Street name used when a segment carries none.
pub const UNKNOWN_STREET: &str = "Unknown";

/// Coerces a property value into the string form used as the join key.
///
/// Strings are used verbatim and numbers by their literal text, so `123` in a
/// GeoJSON property joins against `"123"` in the CSV. Null yields no key.
pub fn segment_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Borrowed view over a segment's properties using configured property names.
pub struct SegmentView<'a> {
    properties: Option<&'a JsonObject>,
}

impl<'a> SegmentView<'a> {
    pub fn new(properties: Option<&'a JsonObject>) -> Self {
        Self { properties }
    }

    fn get(&self, key: &str) -> Option<&'a JsonValue> {
        self.properties.and_then(|p| p.get(key))
    }

    pub fn segment_id(&self, key: &str) -> Option<String> {
        self.get(key).and_then(segment_key)
    }

    pub fn name(&self, key: &str) -> String {
        match self.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => UNKNOWN_STREET.to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Segment length in meters; absent, non-numeric or negative values read as 0.
    pub fn length_m(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(JsonValue::as_f64)
            .filter(|len| len.is_finite() && *len > 0.0)
            .unwrap_or(0.0)
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(JsonValue::as_f64)
    }
}
