//! Listing and navigation handlers.

use crate::directory::{SortKey, run_pipeline};
use crate::render::render_listing;
use crate::state::DirectoryState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct BrowseRequest {
    /// One-off search text; the session's search is used when omitted
    #[serde(default)]
    pub query: Option<String>,
    /// One-off sort key; the session's sort is used when omitted
    #[serde(default)]
    pub sort: Option<SortKey>,
    /// One-off page number; the session's page is used when omitted
    #[serde(default)]
    pub page: Option<usize>,
}

/// Render the current page. Overrides apply to this call only.
pub async fn handle_browse(
    state: &Arc<DirectoryState>,
    request: BrowseRequest,
) -> Result<String, String> {
    let catalog = state.catalog().await;
    let session = state.session().await.clone();

    let query = request.query.as_deref().unwrap_or(&session.query);
    let sort = request.sort.unwrap_or(session.sort);
    let page = request.page.unwrap_or(session.page);

    let listing = run_pipeline(&catalog.records, query, &session.filters, sort, page);
    render_listing(&listing, &catalog.origin).map_err(|e| e.to_string())
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetSearchRequest {
    /// Case-insensitive text matched against college names; empty clears the search
    pub query: String,
}

pub async fn handle_set_search(
    state: &Arc<DirectoryState>,
    request: SetSearchRequest,
) -> Result<String, String> {
    state.session().await.set_query(request.query.trim());
    handle_browse(state, BrowseRequest::default()).await
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetSortRequest {
    /// relevance, highest-rating, lowest-fees, nirf-rank or highest-placement
    pub sort: SortKey,
}

pub async fn handle_set_sort(
    state: &Arc<DirectoryState>,
    request: SetSortRequest,
) -> Result<String, String> {
    state.session().await.set_sort(request.sort);
    handle_browse(state, BrowseRequest::default()).await
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GotoPageRequest {
    /// 1-based page number; clamped to the available pages
    pub page: usize,
}

pub async fn handle_goto_page(
    state: &Arc<DirectoryState>,
    request: GotoPageRequest,
) -> Result<String, String> {
    let catalog = state.catalog().await;
    let selected = state
        .session()
        .await
        .goto_page(request.page, &catalog.records);
    if selected != request.page {
        tracing::debug!("Requested page {} clamped to {}", request.page, selected);
    }
    handle_browse(state, BrowseRequest::default()).await
}

/// Drop the cached catalog and reload it.
pub async fn handle_refresh_catalog(state: &Arc<DirectoryState>) -> Result<String, String> {
    let catalog = state.refresh().await;
    Ok(format!(
        "Catalog reloaded: {} colleges from {}",
        catalog.records.len(),
        catalog.origin
    ))
}
