//! Plain-text rendering of listings, filter state and profiles for tool output.

use crate::directory::filter::{DEFAULT_FEES_RANGE, DEFAULT_RANK_RANGE};
use crate::directory::{FilterState, Listing, PAGE_SIZE, SortKey};
use crate::profile::CollegeProfile;
use crate::record::InstitutionRecord;
use crate::source::RecordOrigin;
use std::fmt::{self, Write as _};

/// Render one page of the directory.
pub fn render_listing(listing: &Listing, origin: &RecordOrigin) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let page = &listing.page;

    writeln!(
        output,
        "Colleges: page {} of {} ({} results)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    )?;
    let mut summary = Vec::new();
    if !listing.query.is_empty() {
        summary.push(format!("Search: \"{}\"", listing.query));
    }
    summary.push(format!("Sort: {}", listing.sort.label()));
    summary.push(format!("Active filters: {}", listing.active_filters));
    writeln!(output, "{}", summary.join(" · "))?;
    if !origin.is_remote() {
        writeln!(output, "Source: {}", origin)?;
    }
    writeln!(output)?;

    if page.total_items == 0 {
        writeln!(output, "No colleges match the current search and filters.")?;
        writeln!(output, "Try clear_filters or a shorter search term.")?;
        return Ok(output);
    }

    if page.items.is_empty() {
        writeln!(
            output,
            "Page {} is outside the result set; use goto_page with 1..={}.",
            page.page, page.total_pages
        )?;
        return Ok(output);
    }

    let offset = (page.page - 1) * PAGE_SIZE;
    for (index, record) in page.items.iter().enumerate() {
        write_record(&mut output, offset + index + 1, record)?;
    }

    if page.page < page.total_pages {
        writeln!(output, "More results: goto_page {}", page.page + 1)?;
    }
    Ok(output)
}

fn write_record(output: &mut String, position: usize, record: &InstitutionRecord) -> fmt::Result {
    writeln!(output, "{}. {} ({})", position, record.name, record.id)?;

    let mut line = vec![
        format!("{}, {}", record.city, record.state),
        format!("★ {}", record.rating),
    ];
    if let Some(rank) = record.national_rank {
        line.push(format!("NIRF #{}", rank));
    }
    writeln!(output, "   {}", line.join(" · "))?;

    let stats: Vec<String> = [
        ("Fees", &record.fee_range),
        ("Placement", &record.placement_percent),
        ("Avg", &record.average_package),
        ("Highest", &record.highest_package),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
    .collect();
    if !stats.is_empty() {
        writeln!(output, "   {}", stats.join(" · "))?;
    }
    writeln!(output)
}

/// Render the active constraints of a filter state.
pub fn render_filters(filters: &FilterState, query: &str, sort: SortKey) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "Active filters: {}", filters.active_count())?;

    let tags = [
        ("Location", &filters.location),
        ("Branch", &filters.branch),
        ("Affiliation", &filters.affiliation),
        ("Accreditation", &filters.accreditation),
        ("Facilities", &filters.facilities),
        ("Special", &filters.special),
    ];
    for (label, values) in tags {
        if !values.is_empty() {
            writeln!(output, "  • {}: {}", label, values.join(", "))?;
        }
    }
    if filters.rank_range != DEFAULT_RANK_RANGE {
        writeln!(output, "  • Rank: {}–{}", filters.rank_range.0, filters.rank_range.1)?;
    }
    if filters.fees_range != DEFAULT_FEES_RANGE {
        writeln!(output, "  • Fees: ₹{}–₹{}", filters.fees_range.0, filters.fees_range.1)?;
    }
    if filters.placement.min_package > 0.0 {
        writeln!(output, "  • Min package: {} LPA", filters.placement.min_package)?;
    }
    if filters.placement.min_percent > 0.0 {
        writeln!(output, "  • Min placement: {}%", filters.placement.min_percent)?;
    }
    if filters.rating.min > 0.0 {
        writeln!(output, "  • Min rating: {}", filters.rating.min)?;
    }
    if filters.rating.min_reviews > 0 {
        writeln!(output, "  • Min reviews: {}", filters.rating.min_reviews)?;
    }

    if !query.is_empty() {
        writeln!(output, "Search: \"{}\"", query)?;
    }
    writeln!(output, "Sort: {}", sort.label())?;
    Ok(output)
}

/// Render a college profile.
pub fn render_profile(profile: &CollegeProfile) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "{}", profile.name)?;
    writeln!(output, "{}, {} · ★ {}/5", profile.city, profile.state, profile.rating)?;
    if let Some(rank) = profile.national_rank {
        writeln!(output, "NIRF rank: {}", rank)?;
    }

    if let Some(description) = &profile.description {
        writeln!(output, "\n{}", description)?;
    }

    writeln!(output, "\nPlacements:")?;
    for (label, value) in [
        ("Highest package", &profile.highest_package),
        ("Average package", &profile.average_package),
        ("Placement rate", &profile.placement_percent),
    ] {
        writeln!(output, "  {}: {}", label, value.as_deref().unwrap_or("N/A"))?;
    }
    if let Some(fees) = &profile.fee_range {
        writeln!(output, "Fees: {}", fees)?;
    }

    let mut facts = Vec::new();
    if let Some(year) = profile.established {
        facts.push(format!("Established: {}", year));
    }
    if let Some(affiliation) = &profile.affiliation {
        facts.push(format!("Affiliation: {}", affiliation));
    }
    if !profile.approvals.is_empty() {
        facts.push(format!("Approvals: {}", profile.approvals.join(", ")));
    }
    if let Some(area) = &profile.campus_area {
        facts.push(format!("Campus: {}", area));
    }
    if let Some(intake) = profile.intake {
        facts.push(format!("Intake: {}", intake));
    }
    if !facts.is_empty() {
        writeln!(output, "\nAbout:")?;
        for fact in facts {
            writeln!(output, "  • {}", fact)?;
        }
    }

    if !profile.notable_recruiters.is_empty() {
        writeln!(output, "\nNotable recruiters: {}", profile.notable_recruiters.join(", "))?;
    }
    Ok(output)
}
