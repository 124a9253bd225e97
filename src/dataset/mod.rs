//! Line-list dataset handling.
//!
//! This module loads the raw case table from CSV and cleans it into the
//! immutable table the analysis layer works on.

pub mod cleaner;
pub mod loader;

pub use cleaner::clean_cases;
pub use loader::{load_cases, DatasetError, RawCase};
