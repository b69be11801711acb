//! Record sources: the hosted store, the bundled dataset, and the fail-soft
//! adapter that chooses between them.

pub mod adapter;
pub mod dataset;
pub mod remote;

pub use adapter::{Catalog, FallbackReason, RecordOrigin, RecordSource, normalize_rows};
pub use dataset::{SeedReport, StaticDataset, seed_store};
pub use remote::PostgrestStore;

use crate::error::StoreError;
use futures::future::BoxFuture;
use serde_json::Value;

/// Columns requested for the directory listing.
pub const LISTING_COLUMNS: &str = "name,slug,city,state,rating,highestpackage,averagepackage,placementpercent,description,feerange,feeRange";

pub const ENQUIRIES_TABLE: &str = "enquiries";
pub const COLLEGE_LEADS_TABLE: &str = "college_leads";
pub const NEWSLETTER_TABLE: &str = "newsletter_subscribers";

/// A queryable, hosted collection of college rows plus the lead-capture tables.
///
/// Object-safe so the server can hold an `Arc<dyn RecordStore>` and tests can
/// substitute an in-memory store.
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// All college rows with [`LISTING_COLUMNS`], ordered by rating descending.
    fn fetch_listing(&self) -> BoxFuture<'_, Result<Vec<Value>, StoreError>>;

    /// The full row whose `slug` equals `slug`, if any.
    fn fetch_by_slug<'a>(&'a self, slug: &'a str)
    -> BoxFuture<'a, Result<Option<Value>, StoreError>>;

    /// Insert one row (an object) or many rows (an array) into `table`.
    fn insert<'a>(&'a self, table: &'a str, rows: Value) -> BoxFuture<'a, Result<(), StoreError>>;
}
