//! Institution records and the normalization boundary.
//!
//! Both the remote store rows (lowercase column names) and the bundled dataset
//! (camelCase keys) decode into [`RawCollege`]. [`RawCollege::normalize`] is the
//! only way to obtain an [`InstitutionRecord`], so raw backend shapes never leak
//! past the source adapter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_NAME: &str = "Unknown College";
pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_STATE: &str = "Unknown State";
pub const UNKNOWN_ID: &str = "unknown";
pub const DEFAULT_CATEGORY: &str = "Engineering";
pub const DEFAULT_LOGO: &str = "/images/logo.png";

/// Normalized in-memory representation of one listed institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionRecord {
    /// URL-safe slug, or the name when no slug exists. Never empty.
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_rank: Option<u32>,
    pub logo_ref: String,
    /// Conventionally 0–5; 0 when the source value was missing or unparseable.
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_percent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub highlight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approvals: Vec<String>,
}

/// A college row as it arrives from either source, before normalization.
///
/// Every field is optional and decoded leniently: a value of the wrong JSON
/// type becomes `None` instead of failing the row. Each spelling of a column
/// has its own field so a row carrying both still decodes; the lowercase
/// spelling wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCollege {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    pub rating: Option<Value>,
    #[serde(deserialize_with = "lenient_rank")]
    pub nirfrank: Option<u32>,
    #[serde(rename = "nirfRank", deserialize_with = "lenient_rank")]
    pub nirf_rank_camel: Option<u32>,
    #[serde(deserialize_with = "lenient_text")]
    pub highestpackage: Option<String>,
    #[serde(rename = "highestPackage", deserialize_with = "lenient_text")]
    pub highest_package_camel: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub averagepackage: Option<String>,
    #[serde(rename = "averagePackage", deserialize_with = "lenient_text")]
    pub average_package_camel: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub placementpercent: Option<String>,
    #[serde(rename = "placementPercent", deserialize_with = "lenient_text")]
    pub placement_percent_camel: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub feerange: Option<String>,
    #[serde(rename = "feeRange", deserialize_with = "lenient_text")]
    pub fee_range_camel: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub affiliation: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub approvals: Vec<String>,
}

impl RawCollege {
    /// Decode one row, or `None` when the row is not a JSON object.
    pub fn from_row(row: Value) -> Option<Self> {
        if !row.is_object() {
            return None;
        }
        serde_json::from_value(row)
            .inspect_err(|e| tracing::warn!("Could not decode college row: {}", e))
            .ok()
    }

    /// Apply the normalization rules and produce the uniform record shape.
    pub fn normalize(self) -> InstitutionRecord {
        let id = non_empty(self.slug.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or(UNKNOWN_ID)
            .to_string();

        InstitutionRecord {
            id,
            name: text_or(self.name, UNKNOWN_NAME),
            city: text_or(self.city, UNKNOWN_CITY),
            state: text_or(self.state, UNKNOWN_STATE),
            category: DEFAULT_CATEGORY.to_string(),
            national_rank: self
                .nirfrank
                .filter(|rank| *rank > 0)
                .or_else(|| self.nirf_rank_camel.filter(|rank| *rank > 0)),
            logo_ref: DEFAULT_LOGO.to_string(),
            rating: coerce_rating(self.rating.as_ref()),
            fee_range: either_text(self.feerange, self.fee_range_camel),
            placement_percent: either_text(self.placementpercent, self.placement_percent_camel),
            average_package: either_text(self.averagepackage, self.average_package_camel),
            highest_package: either_text(self.highestpackage, self.highest_package_camel),
            description: optional_text(self.description),
            highlight: false,
            affiliation: optional_text(self.affiliation),
            approvals: self
                .approvals
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .collect(),
        }
    }
}

/// Coerce any JSON value to a rating the way `Number(raw) || 0` would.
///
/// Numbers pass through, strings are trimmed and parsed (blank is 0), `true`
/// is 1. NaN, infinities and everything else become 0.
pub fn coerce_rating(raw: Option<&Value>) -> f64 {
    let value = match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if value.is_finite() { value } else { 0.0 }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn text_or(value: Option<String>, placeholder: &str) -> String {
    optional_text(value).unwrap_or_else(|| placeholder.to_string())
}

/// Absent and empty both mean "omit this line"; never `Some("")`.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The lowercase column, else its camelCase twin.
pub(crate) fn either_text(lower: Option<String>, camel: Option<String>) -> Option<String> {
    optional_text(lower).or_else(|| optional_text(camel))
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
