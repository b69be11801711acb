//! Fail-soft record loading: remote store first, static dataset on any failure.

use super::{RecordStore, StaticDataset};
use crate::error::StoreError;
use crate::record::{InstitutionRecord, RawCollege};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Why the remote store was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Unconfigured,
    EmptyResult,
    StoreError { kind: &'static str, message: String },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "store not configured"),
            Self::EmptyResult => write!(f, "store returned no rows"),
            Self::StoreError { kind, message } => write!(f, "store error ({}): {}", kind, message),
        }
    }
}

impl From<StoreError> for FallbackReason {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unconfigured => Self::Unconfigured,
            other => Self::StoreError {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    Remote,
    Fallback(FallbackReason),
}

impl RecordOrigin {
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote)
    }
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Fallback(reason) => write!(f, "static dataset ({})", reason),
        }
    }
}

impl Serialize for RecordOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A fully materialized record list and where it came from.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<InstitutionRecord>,
    pub origin: RecordOrigin,
    pub loaded_at: Instant,
    pub loaded_at_wall: SystemTime,
}

impl Catalog {
    pub fn new(records: Vec<InstitutionRecord>, origin: RecordOrigin) -> Self {
        Self {
            records,
            origin,
            loaded_at: Instant::now(),
            loaded_at_wall: SystemTime::now(),
        }
    }

    /// Milliseconds since the Unix epoch at load time.
    pub fn loaded_at_millis(&self) -> u128 {
        self.loaded_at_wall
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<&InstitutionRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Decode and normalize raw rows, skipping anything that is not an object.
pub fn normalize_rows(rows: Vec<Value>) -> Vec<InstitutionRecord> {
    let total = rows.len();
    let records: Vec<InstitutionRecord> = rows
        .into_iter()
        .filter_map(RawCollege::from_row)
        .map(RawCollege::normalize)
        .collect();
    if records.len() < total {
        tracing::warn!("Skipped {} malformed rows", total - records.len());
    }
    records
}

/// The record source adapter. Optionally holds a remote store and always
/// holds the static dataset.
#[derive(Debug, Clone)]
pub struct RecordSource {
    store: Option<Arc<dyn RecordStore>>,
    dataset: Arc<StaticDataset>,
}

impl RecordSource {
    pub fn new(store: Option<Arc<dyn RecordStore>>, dataset: StaticDataset) -> Self {
        Self {
            store,
            dataset: Arc::new(dataset),
        }
    }

    pub fn store(&self) -> Option<&Arc<dyn RecordStore>> {
        self.store.as_ref()
    }

    pub fn dataset(&self) -> &StaticDataset {
        &self.dataset
    }

    /// Remote rows, normalized. Empty results count as a failure.
    pub async fn try_remote(&self) -> Result<Vec<InstitutionRecord>, FallbackReason> {
        let store = self.store.as_ref().ok_or(FallbackReason::Unconfigured)?;
        let rows = store.fetch_listing().await?;
        if rows.is_empty() {
            return Err(FallbackReason::EmptyResult);
        }
        Ok(normalize_rows(rows))
    }

    /// The static dataset, normalized the same way.
    pub fn load_static(&self) -> Vec<InstitutionRecord> {
        normalize_rows(self.dataset.rows().to_vec())
    }

    /// Remote if possible, static otherwise. Never fails.
    pub async fn load(&self) -> Catalog {
        match self.try_remote().await {
            Ok(records) => {
                tracing::info!("Loaded {} colleges from the store", records.len());
                Catalog::new(records, RecordOrigin::Remote)
            }
            Err(reason) => {
                tracing::warn!("Falling back to static dataset: {}", reason);
                Catalog::new(self.load_static(), RecordOrigin::Fallback(reason))
            }
        }
    }
}
