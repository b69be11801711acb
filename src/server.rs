//! MCP server exposing the college directory as tools.

use crate::enquiry::{CollegeLead, NewsletterSignup, StudentEnquiry};
use crate::state::DirectoryState;
use crate::tools::{
    BrowseRequest, GetCollegeRequest, GotoPageRequest, SetSearchRequest, SetSortRequest,
    TagRequest, UpdateFilterRequest, handle_browse, handle_clear_filters, handle_get_college,
    handle_goto_page, handle_health, handle_refresh_catalog, handle_remove_tag, handle_set_search,
    handle_set_sort, handle_submit_college_lead, handle_submit_enquiry,
    handle_subscribe_newsletter, handle_toggle_tag, handle_update_filter,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for browsing colleges. One instance serves one client session.
#[derive(Clone)]
pub struct DirectoryServer {
    /// Shared directory state (catalog cache, profiles, session)
    state: Arc<DirectoryState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DirectoryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DirectoryServer {
    pub fn new(state: Arc<DirectoryState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<DirectoryState> {
        &self.state
    }

    #[tool(
        description = "List colleges for the current session: search, filters and sort applied, 12 per page. Optional query, sort and page override the session for this call only.",
        input_schema = inline_schema_for_type::<BrowseRequest>()
    )]
    async fn browse_colleges(
        &self,
        Parameters(request): Parameters<BrowseRequest>,
    ) -> std::result::Result<String, String> {
        handle_browse(&self.state, request).await
    }

    #[tool(
        description = "Replace one filter axis (location, branch, rankRange, feesRange, placement, rating, affiliation, accreditation, facilities, special). Resets to page 1.",
        input_schema = inline_schema_for_type::<UpdateFilterRequest>()
    )]
    async fn update_filter(
        &self,
        Parameters(request): Parameters<UpdateFilterRequest>,
    ) -> std::result::Result<String, String> {
        handle_update_filter(&self.state, request).await
    }

    #[tool(
        description = "Add a value to a tag filter, or remove it if already selected. Resets to page 1.",
        input_schema = inline_schema_for_type::<TagRequest>()
    )]
    async fn toggle_filter_tag(
        &self,
        Parameters(request): Parameters<TagRequest>,
    ) -> std::result::Result<String, String> {
        handle_toggle_tag(&self.state, request).await
    }

    #[tool(
        description = "Remove a value from a tag filter. Resets to page 1.",
        input_schema = inline_schema_for_type::<TagRequest>()
    )]
    async fn remove_filter_tag(
        &self,
        Parameters(request): Parameters<TagRequest>,
    ) -> std::result::Result<String, String> {
        handle_remove_tag(&self.state, request).await
    }

    #[tool(description = "Reset every filter to its default. Resets to page 1.")]
    async fn clear_filters(&self) -> std::result::Result<String, String> {
        handle_clear_filters(&self.state).await
    }

    #[tool(
        description = "Set the free-text search matched against college names. Resets to page 1.",
        input_schema = inline_schema_for_type::<SetSearchRequest>()
    )]
    async fn set_search(
        &self,
        Parameters(request): Parameters<SetSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_search(&self.state, request).await
    }

    #[tool(
        description = "Set the sort order. Unknown keys fall back to relevance. Resets to page 1.",
        input_schema = inline_schema_for_type::<SetSortRequest>()
    )]
    async fn set_sort(
        &self,
        Parameters(request): Parameters<SetSortRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_sort(&self.state, request).await
    }

    #[tool(
        description = "Go to a page of the current results. Out-of-range pages are clamped.",
        input_schema = inline_schema_for_type::<GotoPageRequest>()
    )]
    async fn goto_page(
        &self,
        Parameters(request): Parameters<GotoPageRequest>,
    ) -> std::result::Result<String, String> {
        handle_goto_page(&self.state, request).await
    }

    #[tool(
        description = "Show the full profile of one college by id, including placements, fees, approvals and recruiters.",
        input_schema = inline_schema_for_type::<GetCollegeRequest>()
    )]
    async fn get_college(
        &self,
        Parameters(request): Parameters<GetCollegeRequest>,
    ) -> std::result::Result<String, String> {
        handle_get_college(&self.state, request).await
    }

    #[tool(
        description = "Request a counsellor callback. Requires a name and a phone number with at least 10 digits.",
        input_schema = inline_schema_for_type::<StudentEnquiry>()
    )]
    async fn submit_enquiry(
        &self,
        Parameters(request): Parameters<StudentEnquiry>,
    ) -> std::result::Result<String, String> {
        handle_submit_enquiry(&self.state, request).await
    }

    #[tool(
        description = "Register a college's interest in being listed.",
        input_schema = inline_schema_for_type::<CollegeLead>()
    )]
    async fn submit_college_lead(
        &self,
        Parameters(request): Parameters<CollegeLead>,
    ) -> std::result::Result<String, String> {
        handle_submit_college_lead(&self.state, request).await
    }

    #[tool(
        description = "Subscribe an email address to the newsletter.",
        input_schema = inline_schema_for_type::<NewsletterSignup>()
    )]
    async fn subscribe_newsletter(
        &self,
        Parameters(request): Parameters<NewsletterSignup>,
    ) -> std::result::Result<String, String> {
        handle_subscribe_newsletter(&self.state, request).await
    }

    #[tool(description = "Discard the cached college catalog and reload it from the store.")]
    async fn refresh_catalog(&self) -> std::result::Result<String, String> {
        handle_refresh_catalog(&self.state).await
    }

    #[tool(description = "Report server status, environment and where the catalog was loaded from.")]
    async fn health(&self) -> std::result::Result<String, String> {
        handle_health(&self.state).await
    }
}

#[tool_handler]
impl ServerHandler for DirectoryServer {
    fn get_info(&self) -> ServerInfo {
        // ServerInfo is non-exhaustive; start from the default and fill in.
        let mut info = ServerInfo::default();
        info.protocol_version = ProtocolVersion::V_2024_11_05;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(
            "college-directory-mcp: browse engineering colleges. \
             Use set_search, update_filter, toggle_filter_tag and set_sort to narrow the list, \
             browse_colleges and goto_page to read it, and get_college for a full profile. \
             If the hosted store is unavailable the bundled dataset is served instead."
                .to_string(),
        );
        info
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// so enums such as the sort key and tag axis are listed inline instead of behind `$ref`.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
