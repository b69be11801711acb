use crate::render::render_profile;
use crate::state::DirectoryState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCollegeRequest {
    /// College id (slug) as shown in the listing, e.g. `iiit-delhi`
    pub id: String,
}

pub async fn handle_get_college(
    state: &Arc<DirectoryState>,
    request: GetCollegeRequest,
) -> Result<String, String> {
    let profile = state
        .profile(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    render_profile(&profile).map_err(|e| e.to_string())
}
