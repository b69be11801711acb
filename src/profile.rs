//! Single-college profile lookup.

use crate::record::{
    InstitutionRecord, RawCollege, either_text, lenient_list, lenient_rank, lenient_text,
};
use crate::source::{Catalog, RecordSource};
use ahash::AHashSet;
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum similarity for a college to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 5;

/// Detail view of one college.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeProfile {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_percent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approvals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub established: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notable_recruiters: Vec<String>,
}

/// Profile-only columns. Each spelling has its own field; the store's
/// lowercase column wins over the camelCase one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileExtras {
    #[serde(deserialize_with = "lenient_rank")]
    estd: Option<u32>,
    #[serde(deserialize_with = "lenient_rank")]
    established: Option<u32>,
    #[serde(deserialize_with = "lenient_text")]
    campusarea: Option<String>,
    #[serde(rename = "campusArea", deserialize_with = "lenient_text")]
    campus_area_camel: Option<String>,
    #[serde(deserialize_with = "lenient_rank")]
    intake: Option<u32>,
    #[serde(deserialize_with = "lenient_list")]
    notablerecruiters: Vec<String>,
    #[serde(rename = "notableRecruiters", deserialize_with = "lenient_list")]
    notable_recruiters_camel: Vec<String>,
}

impl CollegeProfile {
    /// Build a profile from a full store or dataset row.
    pub fn from_row(row: &Value) -> Option<Self> {
        let raw = RawCollege::from_row(row.clone())?;
        let extras: ProfileExtras = serde_json::from_value(row.clone())
            .inspect_err(|e| tracing::warn!("Could not decode profile columns: {}", e))
            .unwrap_or_default();
        let mut profile = Self::from_record(&raw.normalize());
        profile.established = extras
            .estd
            .filter(|year| *year > 0)
            .or_else(|| extras.established.filter(|year| *year > 0));
        profile.campus_area = either_text(extras.campusarea, extras.campus_area_camel);
        profile.intake = extras.intake.filter(|n| *n > 0);
        profile.notable_recruiters = if extras.notablerecruiters.is_empty() {
            extras.notable_recruiters_camel
        } else {
            extras.notablerecruiters
        };
        Some(profile)
    }

    /// A profile with only the fields a listing record carries.
    pub fn from_record(record: &InstitutionRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            rating: record.rating,
            national_rank: record.national_rank,
            highest_package: record.highest_package.clone(),
            average_package: record.average_package.clone(),
            placement_percent: record.placement_percent.clone(),
            fee_range: record.fee_range.clone(),
            description: record.description.clone(),
            affiliation: record.affiliation.clone(),
            approvals: record.approvals.clone(),
            established: None,
            campus_area: None,
            intake: None,
            notable_recruiters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{}", not_found_message(.id, .suggestions))]
    NotFound { id: String, suggestions: Vec<String> },
}

fn not_found_message(id: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("College '{}' not found", id)
    } else {
        format!(
            "College '{}' not found. Did you mean: {}?",
            id,
            suggestions.join(", ")
        )
    }
}

/// Resolve `id` against the store, then the static dataset, then the loaded
/// catalog. Store errors are logged and treated as a miss.
pub async fn lookup(
    source: &RecordSource,
    catalog: &Catalog,
    id: &str,
) -> Result<CollegeProfile, ProfileError> {
    let id = id.trim();

    if let Some(store) = source.store() {
        match store.fetch_by_slug(id).await {
            Ok(Some(row)) => {
                if let Some(profile) = CollegeProfile::from_row(&row) {
                    return Ok(profile);
                }
                tracing::warn!("Store row for '{}' is not an object", id);
            }
            Ok(None) => tracing::debug!("No store row for '{}'", id),
            Err(e) => tracing::warn!("Profile lookup for '{}' failed: {}", id, e),
        }
    }

    if let Some(profile) = source.dataset().find_by_slug(id).and_then(CollegeProfile::from_row) {
        return Ok(profile);
    }

    if let Some(record) = catalog.find(id) {
        return Ok(CollegeProfile::from_record(record));
    }

    Err(ProfileError::NotFound {
        id: id.to_string(),
        suggestions: suggest(id, &catalog.records),
    })
}

/// Ids of the records most similar to `query`, best first.
pub fn suggest(query: &str, records: &[InstitutionRecord]) -> Vec<String> {
    let query = query.to_lowercase();
    let mut seen = AHashSet::new();
    let mut scored: Vec<(f64, &str)> = records
        .iter()
        .filter(|record| seen.insert(record.id.as_str()))
        .map(|record| {
            let by_id = jaro_winkler::similarity(query.chars(), record.id.to_lowercase().chars());
            let by_name = jaro_winkler::similarity(query.chars(), record.name.to_lowercase().chars());
            (by_id.max(by_name), record.id.as_str())
        })
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, id)| id.to_string())
        .collect()
}
