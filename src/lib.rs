pub mod cli;
pub mod config;
pub mod directory;
pub mod enquiry;
pub mod error;
pub mod profile;
pub mod record;
pub mod render;
pub mod server;
pub mod source;
pub mod state;
pub mod tools;
pub mod tracing;

pub use directory::{FilterState, FilterUpdate, Listing, Page, Session, SortKey, TagAxis};
pub use profile::{CollegeProfile, ProfileError};
pub use record::InstitutionRecord;
pub use server::DirectoryServer;
pub use source::{Catalog, RecordSource, RecordStore, StaticDataset};
pub use state::{DirectoryState, StateSettings};
