use serde_json::{Map, Value};

use crate::models::{LocationPayload, NormalizedLocation};

const TYPE_NAME_KEYS: &[&str] = &["type_name", "help_type", "disease", "category"];
const PROVINCE_KEYS: &[&str] = &["province", "province_name", "changwat"];
const DISTRICT_KEYS: &[&str] = &["district", "amphoe"];
const SUBDISTRICT_KEYS: &[&str] = &["subdistrict", "sub_district", "tambon"];
const STATUS_TEXT_KEYS: &[&str] = &["status_text", "status"];

/// Normalize a `location` payload. Never fails: anything unreadable yields
/// an all-absent location.
pub fn normalize(payload: &LocationPayload) -> NormalizedLocation {
    try_normalize(payload).unwrap_or_default()
}

/// Like [`normalize`], but `None` when a payload was present and unreadable.
pub fn try_normalize(payload: &LocationPayload) -> Option<NormalizedLocation> {
    match payload {
        LocationPayload::Absent => Some(NormalizedLocation::default()),
        LocationPayload::RawObject(map) => Some(normalize_feature(map)),
        LocationPayload::RawString(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Some(normalize_feature(&map)),
            Ok(_) => None,
            Err(e) => {
                tracing::trace!("location string is not valid JSON: {}", e);
                None
            }
        },
        LocationPayload::Other(_) => None,
    }
}

/// Convenience wrapper for a raw JSON value.
pub fn normalize_value(value: Option<&Value>) -> NormalizedLocation {
    normalize(&LocationPayload::from_value(value))
}

fn normalize_feature(feature: &Map<String, Value>) -> NormalizedLocation {
    let (longitude, latitude) = coordinates(feature);

    let empty = Map::new();
    let props = match feature.get("properties") {
        Some(Value::Object(props)) => props,
        _ => &empty,
    };

    let mut out = NormalizedLocation {
        longitude,
        latitude,
        status: first_non_empty(props, &["status"]),
        status_text: first_non_empty(props, STATUS_TEXT_KEYS),
        type_name: first_non_empty(props, TYPE_NAME_KEYS),
        province: first_non_empty(props, PROVINCE_KEYS),
        district: first_non_empty(props, DISTRICT_KEYS),
        subdistrict: first_non_empty(props, SUBDISTRICT_KEYS),
        address: first_non_empty(props, &["address"]),
        description: first_non_empty(props, &["description"]),
        sos_status: first_non_empty(props, &["sos_status"]),
    };

    if out.status.is_none() {
        out.status = out.sos_status.clone();
    }
    if out.status_text.is_none() {
        out.status_text = out.status.clone();
    }

    out
}

/// First key in `keys` whose value is a non-empty scalar, rendered as a string.
pub fn first_non_empty(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_text(props.get(*key)?))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `geometry.coordinates` as `(longitude, latitude)`.
fn coordinates(feature: &Map<String, Value>) -> (Option<f64>, Option<f64>) {
    let coords = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array);

    match coords {
        Some(coords) => (
            coords.first().and_then(coordinate),
            coords.get(1).and_then(coordinate),
        ),
        None => (None, None),
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(props: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [100.5, 13.7]},
            "properties": props,
        })
    }

    #[test]
    fn province_alias_chain() {
        let only_changwat = normalize_value(Some(&feature(json!({"changwat": "Yala"}))));
        assert_eq!(only_changwat.province.as_deref(), Some("Yala"));

        let both = normalize_value(Some(&feature(json!({"changwat": "Yala", "province": "Pattani"}))));
        assert_eq!(both.province.as_deref(), Some("Pattani"));

        let middle = normalize_value(Some(&feature(json!({"changwat": "Yala", "province_name": "Satun"}))));
        assert_eq!(middle.province.as_deref(), Some("Satun"));
    }

    #[test]
    fn empty_string_falls_through_to_next_alias() {
        let loc = normalize_value(Some(&feature(json!({
            "province": "",
            "province_name": null,
            "changwat": "Narathiwat",
            "district": "",
            "amphoe": "Mueang",
            "sub_district": "Bang Nak",
            "category": "food",
        }))));
        assert_eq!(loc.province.as_deref(), Some("Narathiwat"));
        assert_eq!(loc.district.as_deref(), Some("Mueang"));
        assert_eq!(loc.subdistrict.as_deref(), Some("Bang Nak"));
        assert_eq!(loc.type_name.as_deref(), Some("food"));
    }

    #[test]
    fn type_name_priority() {
        let loc = normalize_value(Some(&feature(json!({
            "category": "c", "disease": "d", "help_type": "h",
        }))));
        assert_eq!(loc.type_name.as_deref(), Some("h"));
    }

    #[test]
    fn unreadable_inputs_are_all_absent() {
        assert!(normalize_value(None).is_empty());
        assert!(normalize_value(Some(&Value::Null)).is_empty());
        assert!(normalize_value(Some(&json!("not json"))).is_empty());
        assert!(normalize_value(Some(&json!(42))).is_empty());
        assert!(normalize_value(Some(&json!([1, 2]))).is_empty());
        assert!(normalize_value(Some(&json!("[1, 2]"))).is_empty());
        assert!(normalize(&LocationPayload::Absent).is_empty());
        assert_eq!(try_normalize(&LocationPayload::Other(json!(42))), None);
        assert_eq!(
            try_normalize(&LocationPayload::RawString("{}".into())),
            Some(NormalizedLocation::default())
        );
    }

    #[test]
    fn sos_status_backfills_status_and_text() {
        let loc = normalize_value(Some(&json!({"properties": {"sos_status": "X"}})));
        assert_eq!(loc.status.as_deref(), Some("X"));
        assert_eq!(loc.status_text.as_deref(), Some("X"));
        assert_eq!(loc.sos_status.as_deref(), Some("X"));
    }

    #[test]
    fn status_text_prefers_its_own_key() {
        let loc = normalize_value(Some(&feature(json!({
            "status": "open", "status_text": "Waiting for help", "sos_status": "new",
        }))));
        assert_eq!(loc.status.as_deref(), Some("open"));
        assert_eq!(loc.status_text.as_deref(), Some("Waiting for help"));

        let loc = normalize_value(Some(&feature(json!({"status": "open"}))));
        assert_eq!(loc.status_text.as_deref(), Some("open"));
    }

    #[test]
    fn string_encoded_feature_matches_inline() {
        let inline = feature(json!({"province": "Songkhla", "address": "12 Moo 3"}));
        let encoded = Value::String(inline.to_string());

        let a = normalize_value(Some(&inline));
        let b = normalize_value(Some(&encoded));
        assert_eq!(a, b);
        assert_eq!(a.longitude, Some(100.5));
        assert_eq!(a.latitude, Some(13.7));
        assert_eq!(a.address.as_deref(), Some("12 Moo 3"));
    }

    #[test]
    fn missing_or_short_coordinates() {
        let no_geometry = normalize_value(Some(&json!({"properties": {}})));
        assert_eq!(no_geometry.coordinates(), None);

        let short = normalize_value(Some(&json!({"geometry": {"coordinates": [100.1]}})));
        assert_eq!(short.longitude, Some(100.1));
        assert_eq!(short.latitude, None);

        let strings = normalize_value(Some(&json!({"geometry": {"coordinates": ["100.2", "7.1"]}})));
        assert_eq!(strings.coordinates(), Some((7.1, 100.2)));

        let junk = normalize_value(Some(&json!({"geometry": {"coordinates": "nope"}, "properties": "x"})));
        assert!(junk.is_empty());
    }

    #[test]
    fn numeric_properties_rendered_as_text() {
        let loc = normalize_value(Some(&feature(json!({"status": 2, "description": {"nested": true}}))));
        assert_eq!(loc.status.as_deref(), Some("2"));
        assert_eq!(loc.description, None);
    }
}
