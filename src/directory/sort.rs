//! Sort strategies for the directory listing.

use super::numeric::{fee_sort_key, placement_sort_key};
use crate::record::InstitutionRecord;
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Rank used for records without a national rank, so they sort last.
pub const UNRANKED: u32 = u32::MAX;

/// The active comparator.
///
/// Unknown keys deserialize to [`SortKey::Relevance`], the pass-through order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Also accepted as `best-match`
    #[default]
    Relevance,
    HighestRating,
    LowestFees,
    NirfRank,
    HighestPlacement,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Relevance,
        Self::HighestRating,
        Self::LowestFees,
        Self::NirfRank,
        Self::HighestPlacement,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::HighestRating => "highest-rating",
            Self::LowestFees => "lowest-fees",
            Self::NirfRank => "nirf-rank",
            Self::HighestPlacement => "highest-placement",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::HighestRating => "Highest Rating",
            Self::LowestFees => "Lowest Fees",
            Self::NirfRank => "NIRF Rank",
            Self::HighestPlacement => "Highest Placement",
        }
    }

    /// Parse a key, mapping anything unrecognised to `Relevance`.
    pub fn parse_lenient(key: &str) -> Self {
        match key.trim() {
            "highest-rating" => Self::HighestRating,
            "lowest-fees" => Self::LowestFees,
            "nirf-rank" => Self::NirfRank,
            "highest-placement" => Self::HighestPlacement,
            _ => Self::Relevance,
        }
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&key))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return a newly ordered copy of `records`. The sort is stable, so ties keep
/// their input order and `Relevance` is a plain copy.
pub fn apply(records: &[InstitutionRecord], key: SortKey) -> Vec<InstitutionRecord> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::Relevance => {}
        SortKey::HighestRating => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::LowestFees => sorted.sort_by(|a, b| {
            fee_sort_key(a.fee_range.as_deref()).total_cmp(&fee_sort_key(b.fee_range.as_deref()))
        }),
        SortKey::NirfRank => sorted.sort_by_key(|r| r.national_rank.unwrap_or(UNRANKED)),
        SortKey::HighestPlacement => sorted.sort_by(|a, b| {
            placement_sort_key(b.placement_percent.as_deref())
                .total_cmp(&placement_sort_key(a.placement_percent.as_deref()))
        }),
    }
    sorted
}
