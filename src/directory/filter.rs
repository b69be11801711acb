//! Filter state and the filter engine.

use super::numeric::{fee_lower_bound_rupees, first_decimal, package_lpa};
use crate::record::InstitutionRecord;
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RANK_RANGE: (u32, u32) = (1000, 200_000);
pub const DEFAULT_FEES_RANGE: (u64, u64) = (50_000, 500_000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementThreshold {
    /// Minimum average package, in lakhs per annum
    pub min_package: f64,
    /// Minimum placement percentage
    pub min_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingThreshold {
    /// Minimum star rating (0 disables)
    pub min: f64,
    /// Minimum number of reviews
    pub min_reviews: u32,
}

/// The structured set of constraints a session has selected.
///
/// An empty tag set or a range left at its default never constrains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Cities or states; a record matches if either equals a member
    pub location: Vec<String>,
    pub rank_range: (u32, u32),
    /// Categories
    pub branch: Vec<String>,
    /// Annual fee bounds in rupees
    pub fees_range: (u64, u64),
    pub placement: PlacementThreshold,
    pub rating: RatingThreshold,
    pub affiliation: Vec<String>,
    pub accreditation: Vec<String>,
    pub facilities: Vec<String>,
    pub special: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            location: Vec::new(),
            rank_range: DEFAULT_RANK_RANGE,
            branch: Vec::new(),
            fees_range: DEFAULT_FEES_RANGE,
            placement: PlacementThreshold::default(),
            rating: RatingThreshold::default(),
            affiliation: Vec::new(),
            accreditation: Vec::new(),
            facilities: Vec::new(),
            special: Vec::new(),
        }
    }
}

/// One axis and its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum FilterUpdate {
    Location(Vec<String>),
    RankRange((u32, u32)),
    Branch(Vec<String>),
    FeesRange((u64, u64)),
    Placement(PlacementThreshold),
    Rating(RatingThreshold),
    Affiliation(Vec<String>),
    Accreditation(Vec<String>),
    Facilities(Vec<String>),
    Special(Vec<String>),
}

/// The set-valued axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TagAxis {
    Location,
    Branch,
    Affiliation,
    Accreditation,
    Facilities,
    Special,
}

impl FilterState {
    /// Return a copy with one axis replaced.
    #[must_use]
    pub fn with(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::Location(v) => next.location = v,
            FilterUpdate::RankRange(v) => next.rank_range = v,
            FilterUpdate::Branch(v) => next.branch = v,
            FilterUpdate::FeesRange(v) => next.fees_range = v,
            FilterUpdate::Placement(v) => next.placement = v,
            FilterUpdate::Rating(v) => next.rating = v,
            FilterUpdate::Affiliation(v) => next.affiliation = v,
            FilterUpdate::Accreditation(v) => next.accreditation = v,
            FilterUpdate::Facilities(v) => next.facilities = v,
            FilterUpdate::Special(v) => next.special = v,
        }
        next
    }

    /// Return a copy with `value` removed from a tag axis.
    #[must_use]
    pub fn without_tag(&self, axis: TagAxis, value: &str) -> Self {
        let mut next = self.clone();
        next.tags_mut(axis).retain(|v| v != value);
        next
    }

    /// Return a copy with `value` added to, or removed from, a tag axis.
    #[must_use]
    pub fn toggle_tag(&self, axis: TagAxis, value: &str) -> Self {
        let mut next = self.clone();
        let tags = next.tags_mut(axis);
        if let Some(pos) = tags.iter().position(|v| v == value) {
            tags.remove(pos);
        } else {
            tags.push(value.to_string());
        }
        next
    }

    pub fn tags(&self, axis: TagAxis) -> &[String] {
        match axis {
            TagAxis::Location => &self.location,
            TagAxis::Branch => &self.branch,
            TagAxis::Affiliation => &self.affiliation,
            TagAxis::Accreditation => &self.accreditation,
            TagAxis::Facilities => &self.facilities,
            TagAxis::Special => &self.special,
        }
    }

    fn tags_mut(&mut self, axis: TagAxis) -> &mut Vec<String> {
        match axis {
            TagAxis::Location => &mut self.location,
            TagAxis::Branch => &mut self.branch,
            TagAxis::Affiliation => &mut self.affiliation,
            TagAxis::Accreditation => &mut self.accreditation,
            TagAxis::Facilities => &mut self.facilities,
            TagAxis::Special => &mut self.special,
        }
    }

    /// Number of active constraints shown next to "Clear All".
    pub fn active_count(&self) -> usize {
        let tags = self.location.len()
            + self.branch.len()
            + self.affiliation.len()
            + self.accreditation.len()
            + self.facilities.len()
            + self.special.len();
        let thresholds = [
            self.rating.min > 0.0,
            self.placement.min_package > 0.0,
            self.placement.min_percent > 0.0,
        ]
        .into_iter()
        .filter(|active| *active)
        .count();
        tags + thresholds
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    fn rank_engaged(&self) -> bool {
        self.rank_range != DEFAULT_RANK_RANGE
    }

    fn fees_engaged(&self) -> bool {
        self.fees_range != DEFAULT_FEES_RANGE
    }

    /// Evaluate every engaged axis against one record.
    pub fn matches(&self, record: &InstitutionRecord) -> bool {
        if !self.location.is_empty()
            && !self
                .location
                .iter()
                .any(|loc| *loc == record.city || *loc == record.state)
        {
            return false;
        }

        if !self.branch.is_empty() && !self.branch.contains(&record.category) {
            return false;
        }

        if self.rating.min > 0.0 && record.rating < self.rating.min {
            return false;
        }

        if self.rank_engaged() {
            let (min, max) = self.rank_range;
            match record.national_rank {
                Some(rank) if (min..=max).contains(&rank) => {}
                _ => return false,
            }
        }

        if self.fees_engaged() {
            let (min, max) = self.fees_range;
            #[allow(clippy::cast_precision_loss)]
            let (min, max) = (min as f64, max as f64);
            match record.fee_range.as_deref().and_then(fee_lower_bound_rupees) {
                Some(fee) if fee >= min && fee <= max => {}
                _ => return false,
            }
        }

        if self.placement.min_percent > 0.0 {
            let percent = record.placement_percent.as_deref().and_then(first_decimal);
            if !percent.is_some_and(|p| p >= self.placement.min_percent) {
                return false;
            }
        }

        if self.placement.min_package > 0.0 {
            let package = record.average_package.as_deref().and_then(package_lpa);
            if !package.is_some_and(|p| p >= self.placement.min_package) {
                return false;
            }
        }

        if !self.affiliation.is_empty() {
            let Some(affiliation) = record.affiliation.as_deref() else {
                return false;
            };
            if !self
                .affiliation
                .iter()
                .any(|a| a.eq_ignore_ascii_case(affiliation.trim()))
            {
                return false;
            }
        }

        if !self.accreditation.is_empty()
            && !self.accreditation.iter().any(|wanted| {
                let wanted = wanted.to_lowercase();
                record
                    .approvals
                    .iter()
                    .any(|approval| approval.to_lowercase().starts_with(&wanted))
            })
        {
            return false;
        }

        // rating.min_reviews, facilities and special have no backing data on the
        // record; they are stored and counted but not evaluated.
        true
    }
}

/// Retain the records that match `query` (case-insensitive substring of the
/// name) and every engaged axis of `filters`. Input order is preserved.
pub fn apply(
    records: &[InstitutionRecord],
    query: &str,
    filters: &FilterState,
) -> Vec<InstitutionRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| needle.is_empty() || record.name.to_lowercase().contains(&needle))
        .filter(|record| filters.matches(record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawCollege;
    use assert2::check;
    use rstest::rstest;
    use serde_json::json;

    fn record(row: serde_json::Value) -> InstitutionRecord {
        RawCollege::from_row(row).unwrap().normalize()
    }

    fn names(records: &[InstitutionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn sample() -> Vec<InstitutionRecord> {
        vec![
            record(json!({
                "name": "Delhi Technological University", "city": "Delhi", "state": "Delhi",
                "rating": 4.6, "nirfRank": 27, "feeRange": "₹1.9L - ₹2.2L/year",
                "placementPercent": "92%", "averagePackage": "15 LPA",
                "affiliation": "State University", "approvals": ["AICTE", "NAAC A"],
            })),
            record(json!({
                "name": "JSS Academy", "city": "Noida", "state": "Uttar Pradesh",
                "rating": 4.0, "feeRange": "₹1.1L - ₹1.3L/year",
                "placementPercent": "80%", "averagePackage": "5.5 LPA",
                "affiliation": "AKTU", "approvals": ["AICTE", "NBA"],
            })),
            record(json!({
                "name": "Galgotias College", "city": "Greater Noida", "state": "Uttar Pradesh",
                "rating": "3.8", "feeRange": "₹80K - ₹1.2L/year", "affiliation": "aktu",
            })),
            record(json!({"name": "Unrated Institute", "city": "Pune", "state": "Maharashtra"})),
        ]
    }

    #[test]
    fn default_filters_keep_everything() {
        let records = sample();
        check!(apply(&records, "", &FilterState::default()).len() == records.len());
    }

    #[rstest]
    #[case("delhi", vec!["Delhi Technological University"])]
    #[case("COLLEGE", vec!["Galgotias College"])]
    #[case("", vec!["Delhi Technological University", "JSS Academy", "Galgotias College", "Unrated Institute"])]
    #[case("zzz", vec![])]
    fn query_matches_name_substring(#[case] query: &str, #[case] expected: Vec<&str>) {
        let records = sample();
        let result = apply(&records, query, &FilterState::default());
        check!(names(&result) == expected);
    }

    #[test]
    fn query_does_not_match_city() {
        let records = sample();
        check!(apply(&records, "noida", &FilterState::default()).is_empty());
    }

    #[test]
    fn location_matches_city_or_state() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::Location(vec!["Delhi".into()]));
        check!(names(&apply(&records, "", &filters)) == vec!["Delhi Technological University"]);

        let filters = FilterState::default().with(FilterUpdate::Location(vec![
            "Uttar Pradesh".into(),
            "Pune".into(),
        ]));
        check!(
            names(&apply(&records, "", &filters))
                == vec!["JSS Academy", "Galgotias College", "Unrated Institute"]
        );
    }

    #[test]
    fn branch_requires_category_membership() {
        let records = sample();
        let engineering = FilterState::default().with(FilterUpdate::Branch(vec!["Engineering".into()]));
        check!(apply(&records, "", &engineering).len() == 4);

        let medical = FilterState::default().with(FilterUpdate::Branch(vec!["Medical".into()]));
        check!(apply(&records, "", &medical).is_empty());
    }

    #[test]
    fn rating_min_excludes_zero_rated() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::Rating(RatingThreshold {
            min: 0.5,
            min_reviews: 0,
        }));
        let result = apply(&records, "", &filters);
        check!(!names(&result).contains(&"Unrated Institute"));
        check!(result.len() == 3);
    }

    #[test]
    fn rank_range_needs_a_rank_once_engaged() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::RankRange((1, 50)));
        check!(names(&apply(&records, "", &filters)) == vec!["Delhi Technological University"]);
    }

    #[test]
    fn fees_range_uses_lower_bound_in_rupees() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::FeesRange((50_000, 150_000)));
        check!(names(&apply(&records, "", &filters)) == vec!["JSS Academy", "Galgotias College"]);
    }

    #[test]
    fn placement_thresholds() {
        let records = sample();
        let by_percent = FilterState::default().with(FilterUpdate::Placement(PlacementThreshold {
            min_package: 0.0,
            min_percent: 85.0,
        }));
        check!(names(&apply(&records, "", &by_percent)) == vec!["Delhi Technological University"]);

        let by_package = FilterState::default().with(FilterUpdate::Placement(PlacementThreshold {
            min_package: 5.0,
            min_percent: 0.0,
        }));
        check!(
            names(&apply(&records, "", &by_package))
                == vec!["Delhi Technological University", "JSS Academy"]
        );
    }

    #[test]
    fn affiliation_is_case_insensitive() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::Affiliation(vec!["AKTU".into()]));
        check!(names(&apply(&records, "", &filters)) == vec!["JSS Academy", "Galgotias College"]);
    }

    #[test]
    fn accreditation_matches_approval_prefix() {
        let records = sample();
        let filters = FilterState::default().with(FilterUpdate::Accreditation(vec!["NAAC".into()]));
        check!(names(&apply(&records, "", &filters)) == vec!["Delhi Technological University"]);
    }

    #[test]
    fn unbacked_axes_do_not_exclude() {
        let records = sample();
        let filters = FilterState::default()
            .with(FilterUpdate::Facilities(vec!["Hostel".into()]))
            .with(FilterUpdate::Special(vec!["Loan Assistance".into()]));
        check!(apply(&records, "", &filters).len() == records.len());
        check!(filters.active_count() == 2);
    }

    #[test]
    fn update_replaces_only_one_axis() {
        let base = FilterState::default().with(FilterUpdate::Location(vec!["Delhi".into()]));
        let next = base.with(FilterUpdate::Branch(vec!["Engineering".into()]));
        check!(next.location == vec!["Delhi".to_string()]);
        check!(next.branch == vec!["Engineering".to_string()]);
        check!(base.branch.is_empty());
    }

    #[test]
    fn toggle_and_remove_tags() {
        let state = FilterState::default()
            .toggle_tag(TagAxis::Facilities, "Hostel")
            .toggle_tag(TagAxis::Facilities, "Library");
        check!(state.tags(TagAxis::Facilities) == ["Hostel".to_string(), "Library".to_string()]);

        let state = state.toggle_tag(TagAxis::Facilities, "Hostel");
        check!(state.facilities == vec!["Library".to_string()]);

        let state = state.without_tag(TagAxis::Facilities, "Library");
        check!(state.facilities.is_empty());
    }

    #[test]
    fn active_count_sums_tags_and_thresholds() {
        let state = FilterState::default()
            .with(FilterUpdate::Location(vec!["Delhi".into(), "Noida".into()]))
            .with(FilterUpdate::Rating(RatingThreshold { min: 4.0, min_reviews: 10 }))
            .with(FilterUpdate::Placement(PlacementThreshold { min_package: 6.0, min_percent: 0.0 }))
            .with(FilterUpdate::RankRange((1, 100)));
        check!(state.active_count() == 4);
        check!(FilterState::default().active_count() == 0);
    }

    #[test]
    fn update_deserializes_from_key_value_json() {
        let update: FilterUpdate =
            serde_json::from_value(json!({"key": "rankRange", "value": [1, 100]})).unwrap();
        check!(update == FilterUpdate::RankRange((1, 100)));

        let update: FilterUpdate = serde_json::from_value(
            json!({"key": "placement", "value": {"minPercent": 80}}),
        )
        .unwrap();
        check!(
            update
                == FilterUpdate::Placement(PlacementThreshold { min_package: 0.0, min_percent: 80.0 })
        );
    }

    #[test]
    fn filter_state_wire_shape_is_camel_case() {
        let value = serde_json::to_value(FilterState::default()).unwrap();
        check!(value["rankRange"] == json!([1000, 200_000]));
        check!(value["feesRange"] == json!([50_000, 500_000]));
        check!(value["placement"] == json!({"minPackage": 0.0, "minPercent": 0.0}));
        check!(value["rating"] == json!({"min": 0.0, "minReviews": 0}));
    }
}
