//! End-to-end behavior of the filter -> sort -> paginate pipeline.

use assert2::check;
use college_directory_mcp::directory::{FilterState, FilterUpdate, SortKey, filter, paginate, sort};
use college_directory_mcp::directory::{PAGE_SIZE, run_pipeline};
use college_directory_mcp::record::RawCollege;
use college_directory_mcp::source::normalize_rows;
use college_directory_mcp::{InstitutionRecord, StaticDataset};
use rstest::{fixture, rstest};
use serde_json::json;

fn names(records: &[InstitutionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[fixture]
fn bundled() -> Vec<InstitutionRecord> {
    let dataset = StaticDataset::bundled().unwrap();
    normalize_rows(dataset.rows().to_vec())
}

#[test]
fn ratings_normalize_then_sort_highest_first() {
    let records = normalize_rows(vec![
        json!({"name": "Alpha", "rating": 4.5}),
        json!({"name": "Beta", "rating": "3"}),
        json!({"name": "Gamma"}),
    ]);
    let ratings: Vec<f64> = records.iter().map(|r| r.rating).collect();
    check!(ratings == vec![4.5, 3.0, 0.0]);

    let sorted = sort::apply(&records, SortKey::HighestRating);
    check!(names(&sorted) == vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn lowest_fees_orders_by_extracted_digits_with_missing_last() {
    let records = normalize_rows(vec![
        json!({"name": "Missing"}),
        json!({"name": "Eighty", "feeRange": "₹80K - ₹1.5L/year"}),
        json!({"name": "OnePointTwo", "feeRange": "₹1.2L - ₹1.5L/year"}),
    ]);
    let sorted = sort::apply(&records, SortKey::LowestFees);
    check!(names(&sorted) == vec!["OnePointTwo", "Eighty", "Missing"]);
}

#[test]
fn location_matches_city_or_state() {
    let records = normalize_rows(vec![
        json!({"name": "City match", "city": "Delhi", "state": "Delhi"}),
        json!({"name": "State match", "city": "New Delhi", "state": "Delhi"}),
        json!({"name": "Elsewhere", "city": "Noida", "state": "Uttar Pradesh"}),
    ]);
    let filters = FilterState::default().with(FilterUpdate::Location(vec!["Delhi".into()]));
    let kept = filter::apply(&records, "", &filters);
    check!(names(&kept) == vec!["City match", "State match"]);
}

#[test]
fn fourteen_records_paginate_into_two_pages() {
    let records: Vec<InstitutionRecord> = (0..14)
        .map(|i| {
            RawCollege::from_row(json!({"name": format!("College {i}")}))
                .unwrap()
                .normalize()
        })
        .collect();
    let page = paginate(&records, PAGE_SIZE, 2);
    check!(page.total_pages == 2);
    check!(page.items.len() == 2);
}

#[rstest]
#[case(FilterState::default())]
#[case(FilterState::default().with(FilterUpdate::Location(vec!["Ghaziabad".into()])))]
#[case(FilterState::default().with(FilterUpdate::Affiliation(vec!["aktu".into()])))]
#[case(FilterState::default().with(FilterUpdate::RankRange((1, 100))))]
#[case(FilterState::default().with(FilterUpdate::FeesRange((50_000, 150_000))))]
fn filtering_never_grows_the_list(bundled: Vec<InstitutionRecord>, #[case] filters: FilterState) {
    let kept = filter::apply(&bundled, "", &filters);
    check!(kept.len() <= bundled.len());
    check!(kept.iter().all(|r| filters.matches(r)));
}

#[rstest]
#[case("delhi")]
#[case("INSTITUTE")]
#[case("univ")]
fn query_results_contain_the_query(bundled: Vec<InstitutionRecord>, #[case] query: &str) {
    let kept = filter::apply(&bundled, query, &FilterState::default());
    check!(!kept.is_empty());
    let needle = query.to_lowercase();
    check!(kept.iter().all(|r| r.name.to_lowercase().contains(&needle)));
}

#[rstest]
fn sorting_twice_keeps_the_order(bundled: Vec<InstitutionRecord>) {
    for key in SortKey::ALL {
        let once = sort::apply(&bundled, key);
        let twice = sort::apply(&once, key);
        check!(names(&once) == names(&twice), "sort key {}", key);
    }
}

#[rstest]
fn nirf_rank_puts_unranked_last(bundled: Vec<InstitutionRecord>) {
    let sorted = sort::apply(&bundled, SortKey::NirfRank);
    let first_unranked = sorted
        .iter()
        .position(|r| r.national_rank.is_none())
        .unwrap_or(sorted.len());
    check!(sorted[first_unranked..].iter().all(|r| r.national_rank.is_none()));
    check!(sorted.first().and_then(|r| r.national_rank) == Some(17));
}

#[rstest]
fn pipeline_pages_cover_the_filtered_list(bundled: Vec<InstitutionRecord>) {
    let filters = FilterState::default();
    let first = run_pipeline(&bundled, "", &filters, SortKey::HighestRating, 1);
    let mut collected = Vec::new();
    for page in 1..=first.page.total_pages {
        collected.extend(run_pipeline(&bundled, "", &filters, SortKey::HighestRating, page).page.items);
    }
    let expected = sort::apply(&filter::apply(&bundled, "", &filters), SortKey::HighestRating);
    check!(collected == expected);
}

#[rstest]
fn accreditation_matches_approval_prefix(bundled: Vec<InstitutionRecord>) {
    let filters = FilterState::default().with(FilterUpdate::Accreditation(vec!["naac a+".into()]));
    let kept = filter::apply(&bundled, "", &filters);
    check!(!kept.is_empty());
    check!(kept.iter().all(|r| r.approvals.iter().any(|a| a.to_lowercase().starts_with("naac a+"))));
}
