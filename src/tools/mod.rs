//! MCP tool handlers. Each takes the shared state and returns rendered text.

pub mod browse;
pub mod filters;
pub mod health;
pub mod leads;
pub mod profile;

pub use browse::*;
pub use filters::*;
pub use health::*;
pub use leads::*;
pub use profile::*;
