use crate::state::DirectoryState;
use std::sync::Arc;

/// Health report as pretty-printed JSON.
pub async fn handle_health(state: &Arc<DirectoryState>) -> Result<String, String> {
    let report = state.health().await;
    serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
}
