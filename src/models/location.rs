use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `location` attribute as it arrives on a feed record.
///
/// Older records carry the GeoJSON feature encoded as a string, newer ones
/// inline it as an object.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationPayload {
    Absent,
    RawString(String),
    RawObject(Map<String, Value>),
    /// Any other JSON type (number, bool, array). Normalizes to nothing.
    Other(Value),
}

impl LocationPayload {
    /// Borrowing form of `From<Option<Value>>`; clones the value.
    pub fn from_value(value: Option<&Value>) -> Self {
        value.cloned().into()
    }
}

impl From<Value> for LocationPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => LocationPayload::Absent,
            Value::String(s) => LocationPayload::RawString(s),
            Value::Object(map) => LocationPayload::RawObject(map),
            other => LocationPayload::Other(other),
        }
    }
}

impl From<Option<Value>> for LocationPayload {
    fn from(value: Option<Value>) -> Self {
        value.map_or(LocationPayload::Absent, LocationPayload::from)
    }
}

/// Canonical flat view of a location payload. Every field is optional and
/// defaults to absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub type_name: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub subdistrict: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub sos_status: Option<String>,
}

impl NormalizedLocation {
    pub fn is_empty(&self) -> bool {
        *self == NormalizedLocation::default()
    }

    /// Both coordinates, as `(latitude, longitude)`.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_takes_ownership_of_each_shape() {
        assert_eq!(LocationPayload::from(None), LocationPayload::Absent);
        assert_eq!(LocationPayload::from(json!(null)), LocationPayload::Absent);
        assert_eq!(
            LocationPayload::from(json!("{}")),
            LocationPayload::RawString("{}".into())
        );
        assert_eq!(LocationPayload::from(json!(42)), LocationPayload::Other(json!(42)));

        let object = json!({"properties": {"province": "Yala"}});
        let expected = object.as_object().cloned().unwrap();
        assert_eq!(
            LocationPayload::from(Some(object)),
            LocationPayload::RawObject(expected)
        );
    }

    #[test]
    fn borrowed_and_owned_forms_agree() {
        let value = json!({"geometry": {"coordinates": [100.5, 7.0]}});
        assert_eq!(
            LocationPayload::from_value(Some(&value)),
            LocationPayload::from(value.clone())
        );
        assert_eq!(LocationPayload::from_value(None), LocationPayload::Absent);
    }
}
