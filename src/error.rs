//! Error handling types and utilities.

/// A specialized Result type for application-level plumbing.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at startup, configuration and seeding boundaries.
pub type Result<T> = anyhow::Result<T>;

/// Error returned by a [`RecordStore`](crate::source::RecordStore) request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No remote store URL/key is configured.
    #[error("record store is not configured")]
    Unconfigured,
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("request to {table} failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// The store answered with a non-success status.
    #[error("{table} returned HTTP {status}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },
    /// The response body was not the JSON shape we asked for.
    #[error("could not decode response from {table}: {reason}")]
    Decode { table: String, reason: String },
}

impl StoreError {
    /// Short machine-friendly label used in logs and health output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("store.url is set but store.api_key is missing (set SUPABASE_ANON_KEY)")]
    MissingApiKey,
}
