//! Importers for rule catalogs and character rosters.
//!
//! Both formats are plain JSON: the catalog is a `CatalogDocument`, the
//! roster an array of stored character snapshots.

mod json;

pub use json::{ImportError, JsonImporter};
