//! The college directory pipeline: filter, sort and paginate normalized records.
//!
//! Everything in here is synchronous and pure. The only async step, loading
//! the records, lives in [`crate::source`].

pub mod filter;
pub mod numeric;
pub mod paginate;
pub mod session;
pub mod sort;

pub use filter::{FilterState, FilterUpdate, PlacementThreshold, RatingThreshold, TagAxis};
pub use paginate::{PAGE_SIZE, Page, paginate};
pub use session::{Listing, Session, run_pipeline};
pub use sort::SortKey;
