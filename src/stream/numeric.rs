use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use serde_json::Number;

/// Normalizes every number a feature carries outside its coordinates: the
/// id, properties, and foreign members of the feature and its geometry.
pub fn normalize_feature(feature: &mut Feature) {
    if let Some(Id::Number(n)) = &mut feature.id
        && let Some(normalized) = normalize_number(n)
    {
        *n = normalized;
    }
    if let Some(properties) = &mut feature.properties {
        normalize_numbers(properties);
    }
    if let Some(members) = &mut feature.foreign_members {
        normalize_numbers(members);
    }
    if let Some(geometry) = &mut feature.geometry {
        normalize_geometry(geometry);
    }
}

fn normalize_geometry(geometry: &mut Geometry) {
    if let Some(members) = &mut geometry.foreign_members {
        normalize_numbers(members);
    }
    if let Value::GeometryCollection(children) = &mut geometry.value {
        children.iter_mut().for_each(normalize_geometry);
    }
}

/// Converts fixed-precision decimal literals into native JSON floats.
///
/// Numbers are parsed with arbitrary precision, so `12.3400000000000000001`
/// survives reading verbatim. Before a feature is written every non-integer
/// number is rewritten as the nearest `f64`. Integers are left as they are.
pub fn normalize_numbers(properties: &mut JsonObject) {
    for value in properties.values_mut() {
        normalize_value(value);
    }
}

pub fn normalize_value(value: &mut JsonValue) {
    match value {
        JsonValue::Number(n) => {
            if let Some(normalized) = normalize_number(n) {
                *n = normalized;
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(normalize_value),
        JsonValue::Object(map) => map.values_mut().for_each(normalize_value),
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::String(_) => {}
    }
}

fn normalize_number(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    n.as_f64().and_then(Number::from_f64)
}
