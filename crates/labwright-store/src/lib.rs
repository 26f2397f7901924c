//! Labwright Storage Layer
//!
//! Persistence and lifecycle for the lab catalog.
//!
//! # Architecture
//!
//! - [`JsonCatalogFile`]: the catalog as one JSON document on disk
//! - [`CatalogStore`]: process-wide owner of the loaded catalog, handing out
//!   read-only snapshots to resolution runs and refusing edits while any run
//!   is in flight
//! - Documentation ingestion: requirement slots derived from manufacturer
//!   datasheet text
//!
//! # Examples
//!
//! ```no_run
//! use labwright_store::{CatalogStore, JsonCatalogFile};
//!
//! let store = CatalogStore::open(JsonCatalogFile::new("catalog.json")).unwrap();
//! let snapshot = store.snapshot().unwrap();
//! println!("{} items", snapshot.catalog().len());
//! ```

#![warn(missing_docs)]

pub mod docs;
pub mod document;
mod json_file;
mod store;

pub use docs::{parse_requirements, slots_from_doc};
pub use document::{ItemRecord, SlotRecord};
pub use json_file::JsonCatalogFile;
pub use store::{CatalogSnapshot, CatalogStore};

use labwright_domain::{CatalogError, CatalogIssue};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a catalog document
#[derive(Error, Debug)]
pub enum LoadError {
    /// Catalog file does not exist
    #[error("Catalog file not found: {0}")]
    Missing(PathBuf),

    /// Catalog file holds no items
    #[error("Catalog file is empty: {0}")]
    Empty(PathBuf),

    /// Catalog file is not a valid catalog document
    #[error("Malformed catalog document: {0}")]
    Malformed(String),

    /// Catalog parsed but has structural problems
    #[error("Invalid catalog: {}", format_issues(.0))]
    Invalid(Vec<CatalogIssue>),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog construction failed (duplicate or empty names)
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn format_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during catalog store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Edits are refused while resolution runs hold snapshots
    #[error("Catalog is in use by {0} resolution run(s); try again when they finish")]
    Busy(usize),

    /// Loading or saving failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Catalog edit failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Edit would leave the catalog with structural problems
    #[error("Edit rejected: {}", format_issues(.0))]
    Invalid(Vec<CatalogIssue>),

    /// Internal state lock was poisoned
    #[error("Catalog store lock poisoned: {0}")]
    Lock(String),
}
