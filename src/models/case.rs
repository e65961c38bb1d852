use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use super::NormalizedLocation;

/// A feed record exactly as decoded.
pub type RawRecord = Map<String, Value>;

/// Top-level attributes coerced to timestamps.
pub const DATE_FIELDS: [&str; 4] = ["created_at", "updated_at", "expired_at", "date"];

/// One normalized SOS request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    pub id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub expired_at: Option<NaiveDateTime>,
    pub date: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub location: NormalizedLocation,
    /// Remaining scalar attributes of the source record, in feed key order.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl Case {
    /// The status used for display, filtering and the done/active split.
    pub fn resolved_status(&self) -> Option<&str> {
        self.location.status_text.as_deref()
    }

    /// String value of `column` for this row, if present.
    pub fn value(&self, column: &Column) -> Option<Cow<'_, str>> {
        let loc = &self.location;
        match column {
            Column::Id => borrowed(&self.id),
            Column::Province => borrowed(&loc.province),
            Column::District => borrowed(&loc.district),
            Column::Subdistrict => borrowed(&loc.subdistrict),
            Column::Status => borrowed(&loc.status),
            Column::StatusText => borrowed(&loc.status_text),
            Column::TypeName => borrowed(&loc.type_name),
            Column::SosStatus => borrowed(&loc.sos_status),
            Column::Address => borrowed(&loc.address),
            Column::Description => borrowed(&loc.description),
            Column::Latitude => loc.latitude.map(|v| Cow::Owned(v.to_string())),
            Column::Longitude => loc.longitude.map(|v| Cow::Owned(v.to_string())),
            Column::CreatedAt => timestamp(self.created_at),
            Column::UpdatedAt => timestamp(self.updated_at),
            Column::ExpiredAt => timestamp(self.expired_at),
            Column::Date => timestamp(self.date),
            Column::Other(name) => match self.fields.get(name)? {
                Value::String(s) => Some(Cow::Borrowed(s.as_str())),
                Value::Number(n) => Some(Cow::Owned(n.to_string())),
                Value::Bool(b) => Some(Cow::Owned(b.to_string())),
                _ => None,
            },
        }
    }
}

fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

/// Timestamps compare as `YYYY-MM-DD HH:MM:SS` text.
fn timestamp(value: Option<NaiveDateTime>) -> Option<Cow<'static, str>> {
    value.map(|at| Cow::Owned(at.format(TIMESTAMP_FORMAT).to_string()))
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A column that rows can be filtered or grouped on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Id,
    Province,
    District,
    Subdistrict,
    Status,
    StatusText,
    TypeName,
    SosStatus,
    Address,
    Description,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
    ExpiredAt,
    Date,
    /// Any other top-level scalar attribute of the source record.
    Other(String),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Id => "id",
            Column::Province => "province",
            Column::District => "district",
            Column::Subdistrict => "subdistrict",
            Column::Status => "status",
            Column::StatusText => "status_text",
            Column::TypeName => "type_name",
            Column::SosStatus => "sos_status",
            Column::Address => "address",
            Column::Description => "description",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
            Column::ExpiredAt => "expired_at",
            Column::Date => "date",
            Column::Other(name) => name,
        }
    }
}

impl FromStr for Column {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Column::Id,
            "province" => Column::Province,
            "district" => Column::District,
            "subdistrict" => Column::Subdistrict,
            "status" => Column::Status,
            "status_text" => Column::StatusText,
            "type_name" => Column::TypeName,
            "sos_status" => Column::SosStatus,
            "address" => Column::Address,
            "description" => Column::Description,
            "latitude" => Column::Latitude,
            "longitude" => Column::Longitude,
            "created_at" => Column::CreatedAt,
            "updated_at" => Column::UpdatedAt,
            "expired_at" => Column::ExpiredAt,
            "date" => Column::Date,
            other => Column::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, immutable set of cases produced by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CaseTable {
    rows: Vec<Case>,
}

impl CaseTable {
    pub fn new(rows: Vec<Case>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Case] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Case> for CaseTable {
    fn from_iter<I: IntoIterator<Item = Case>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CaseTable {
    type Item = &'a Case;
    type IntoIter = std::slice::Iter<'a, Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
