//! Static relic catalog content.
//!
//! Catalog data ships as JSON (the same wire shape the API layer speaks).
//! Loaders validate structure on the way in so a repository is never
//! seeded with relics the engine would later reject.

mod builtin;
mod catalog;
mod loader;

pub use builtin::builtin;
pub use catalog::{Catalog, CatalogIssue};
pub use loader::{load_catalog_file, load_catalog_str};
