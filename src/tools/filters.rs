//! Filter-state handlers.

use crate::directory::{FilterUpdate, TagAxis};
use crate::render::render_filters;
use crate::state::DirectoryState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFilterRequest {
    /// The axis to replace, e.g. `{"key": "rankRange", "value": [1, 100]}`
    pub update: FilterUpdate,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TagRequest {
    /// location, branch, affiliation, accreditation, facilities or special
    pub axis: TagAxis,
    pub value: String,
}

async fn describe(state: &Arc<DirectoryState>, prefix: &str) -> Result<String, String> {
    let catalog = state.catalog().await;
    let session = state.session().await;
    let listing = session.listing(&catalog.records);
    let filters = render_filters(&session.filters, &session.query, session.sort)
        .map_err(|e| e.to_string())?;
    Ok(format!(
        "{}\n{}Matching colleges: {}\n",
        prefix, filters, listing.page.total_items
    ))
}

pub async fn handle_update_filter(
    state: &Arc<DirectoryState>,
    request: UpdateFilterRequest,
) -> Result<String, String> {
    state.session().await.update_filter(request.update);
    describe(state, "Filter updated.").await
}

pub async fn handle_toggle_tag(
    state: &Arc<DirectoryState>,
    request: TagRequest,
) -> Result<String, String> {
    let value = request.value.trim();
    if value.is_empty() {
        return Err("Tag value must not be empty".to_string());
    }
    state.session().await.toggle_tag(request.axis, value);
    describe(state, "Filter toggled.").await
}

pub async fn handle_remove_tag(
    state: &Arc<DirectoryState>,
    request: TagRequest,
) -> Result<String, String> {
    state.session().await.remove_tag(request.axis, request.value.trim());
    describe(state, "Filter removed.").await
}

pub async fn handle_clear_filters(state: &Arc<DirectoryState>) -> Result<String, String> {
    state.session().await.clear_filters();
    describe(state, "All filters cleared.").await
}
