//! Shared test fixtures for integration tests.
//!
//! [`MockStore`] is an in-memory [`RecordStore`] that records every call, so
//! tests can drive the adapter, the profile lookup and lead capture without a
//! network.

use college_directory_mcp::error::StoreError;
use college_directory_mcp::source::{RecordSource, RecordStore, StaticDataset};
use college_directory_mcp::{DirectoryState, StateSettings};
use futures::FutureExt;
use futures::future::BoxFuture;
use rstest::fixture;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A failure the mock reports as an HTTP status.
#[derive(Debug, Clone)]
pub struct MockFailure {
    pub status: u16,
    pub body: String,
}

impl MockFailure {
    fn to_error(&self, table: &str) -> StoreError {
        StoreError::Status {
            table: table.to_string(),
            status: self.status,
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Default)]
#[allow(dead_code)] // Used across different integration test crates
pub struct MockStore {
    rows: Vec<Value>,
    listing_failure: Option<MockFailure>,
    insert_failure: Option<MockFailure>,
    delay: Duration,
    listing_calls: AtomicUsize,
    slug_calls: AtomicUsize,
    inserts: Mutex<Vec<(String, Value)>>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl MockStore {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            listing_failure: Some(MockFailure {
                status,
                body: body.to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn rejecting_inserts(mut self, status: u16, body: &str) -> Self {
        self.insert_failure = Some(MockFailure {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn slug_calls(&self) -> usize {
        self.slug_calls.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> Vec<(String, Value)> {
        self.inserts.lock().unwrap().clone()
    }
}

impl RecordStore for MockStore {
    fn fetch_listing(&self) -> BoxFuture<'_, Result<Vec<Value>, StoreError>> {
        async move {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.listing_failure {
                Some(failure) => Err(failure.to_error("colleges")),
                None => Ok(self.rows.clone()),
            }
        }
        .boxed()
    }

    fn fetch_by_slug<'a>(
        &'a self,
        slug: &'a str,
    ) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        async move {
            self.slug_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(failure) = &self.listing_failure {
                return Err(failure.to_error("colleges"));
            }
            Ok(self
                .rows
                .iter()
                .find(|row| row.get("slug").and_then(Value::as_str) == Some(slug))
                .cloned())
        }
        .boxed()
    }

    fn insert<'a>(&'a self, table: &'a str, rows: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            if let Some(failure) = &self.insert_failure {
                return Err(failure.to_error(table));
            }
            self.inserts.lock().unwrap().push((table.to_string(), rows));
            Ok(())
        }
        .boxed()
    }
}

/// Rows in the store's lowercase column shape.
#[allow(dead_code)]
pub fn remote_rows() -> Vec<Value> {
    vec![
        json!({"name": "Delhi Technological University", "slug": "dtu", "city": "New Delhi",
               "state": "Delhi", "rating": 4.5, "placementpercent": "93%",
               "averagepackage": "16 LPA", "feerange": "₹1.9L - ₹2.2L/year",
               "estd": 1941, "notablerecruiters": ["Google"]}),
        json!({"name": "KIET Group of Institutions", "slug": "kiet", "city": "Ghaziabad",
               "state": "Uttar Pradesh", "rating": "4.2", "placementpercent": "89%",
               "feeRange": "₹1.4L - ₹1.7L/year"}),
        json!({"name": "Sharda University", "slug": "sharda-university", "city": "Greater Noida",
               "state": "Uttar Pradesh", "rating": null}),
    ]
}

/// Rows in the static dataset's camelCase shape.
#[allow(dead_code)]
pub fn dataset_rows() -> Vec<Value> {
    vec![
        json!({"name": "IIIT Delhi", "slug": "iiit-delhi", "city": "New Delhi", "state": "Delhi",
               "rating": 4.5, "placementPercent": "95%", "feeRange": "₹80K - ₹1.5L/year",
               "estd": 2008, "campusArea": "25 acres", "affiliation": "Autonomous",
               "approvals": ["UGC", "AICTE"]}),
        json!({"name": "ABES Institute of Technology", "slug": "abes-it", "city": "Ghaziabad",
               "state": "Uttar Pradesh", "rating": 4.3, "feeRange": "₹1.2L - ₹1.5L/year",
               "affiliation": "AKTU", "approvals": ["AICTE", "NAAC A"]}),
    ]
}

/// Build shared state over an optional mock store and the given dataset rows.
#[allow(dead_code)]
pub fn state_with(store: Option<Arc<MockStore>>, rows: Vec<Value>) -> Arc<DirectoryState> {
    let store = store.map(|s| s as Arc<dyn RecordStore>);
    let source = RecordSource::new(store, StaticDataset::from_rows(rows));
    Arc::new(DirectoryState::new(source, StateSettings::default()))
}

/// State with no remote store, serving [`dataset_rows`].
#[fixture]
#[allow(dead_code)]
pub fn offline_state() -> Arc<DirectoryState> {
    college_directory_mcp::tracing::init();
    state_with(None, dataset_rows())
}

/// State over the bundled dataset, no store.
#[fixture]
#[allow(dead_code)]
pub fn bundled_state() -> Arc<DirectoryState> {
    college_directory_mcp::tracing::init();
    let dataset = StaticDataset::bundled().expect("bundled dataset parses");
    Arc::new(DirectoryState::new(
        RecordSource::new(None, dataset),
        StateSettings::default(),
    ))
}
