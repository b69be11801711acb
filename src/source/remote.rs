//! PostgREST client for the hosted relational store.

use super::{LISTING_COLUMNS, RecordStore};
use crate::config::StoreConfig;
use crate::error::StoreError;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Talks to `{url}/rest/v1/{table}` with the project's anonymous key.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl std::fmt::Debug for PostgrestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key is a credential; keep it out of logs.
        f.debug_struct("PostgrestStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl PostgrestStore {
    /// Build a client from configuration. Fails with [`StoreError::Unconfigured`]
    /// when the URL or key is missing.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let (Some(url), Some(api_key)) = (&config.url, &config.api_key) else {
            return Err(StoreError::Unconfigured);
        };

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| StoreError::Transport {
                table: config.table.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
            table: config.table.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                table: table.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            table: table.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_rows(&self, query: &[(&str, &str)]) -> Result<Vec<Value>, StoreError> {
        let request = self.client.get(self.endpoint(&self.table)).query(query);
        let response = self.send(&self.table, request).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode {
                table: self.table.clone(),
                reason: e.to_string(),
            })
    }
}

/// Query string for the listing request.
pub fn listing_query() -> [(&'static str, &'static str); 2] {
    [("select", LISTING_COLUMNS), ("order", "rating.desc")]
}

/// Query string for a single-row lookup by slug.
pub fn slug_query(slug: &str) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        ("slug", format!("eq.{}", slug)),
        ("limit", "1".to_string()),
    ]
}

impl RecordStore for PostgrestStore {
    fn fetch_listing(&self) -> BoxFuture<'_, Result<Vec<Value>, StoreError>> {
        async move {
            let rows = self.get_rows(&listing_query()).await?;
            tracing::debug!("Fetched {} rows from {}", rows.len(), self.table);
            Ok(rows)
        }
        .boxed()
    }

    fn fetch_by_slug<'a>(
        &'a self,
        slug: &'a str,
    ) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        async move {
            let query = slug_query(slug);
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
            let mut rows = self.get_rows(&pairs).await?;
            Ok(if rows.is_empty() {
                None
            } else {
                Some(rows.swap_remove(0))
            })
        }
        .boxed()
    }

    fn insert<'a>(&'a self, table: &'a str, rows: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            let request = self
                .client
                .post(self.endpoint(table))
                .header("Prefer", "return=minimal")
                .json(&rows);
            self.send(table, request).await?;
            Ok(())
        }
        .boxed()
    }
}
