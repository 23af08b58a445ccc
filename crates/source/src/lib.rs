//! Conso Source - tabular inputs for the consumption dashboard
//!
//! Reads the event log and the reference tables from CSV exports and turns
//! them into typed records:
//!
//! - **Events**: one consumption record per row
//! - **Contacts / Companies**: raw rows whose tag lists are still serialized text
//! - **Catalogs**: id → display name lookups (organizations, users, job types,
//!   sectors, sector classes, workforce and sales brackets)
//!
//! Everything is bundled in an immutable [`Snapshot`] together with the
//! [`Fingerprint`] of the files it was read from, so callers can detect when
//! the sources changed on disk.
//!
//! # Usage
//!
//! ```ignore
//! use conso_source::{SnapshotLoader, SourcePaths};
//!
//! let loader = SnapshotLoader::new(SourcePaths::in_dir("data"));
//! let snapshot = loader.load()?;
//! println!("{} events", snapshot.events.len());
//! ```

pub mod catalog;
pub mod error;
pub mod loader;
pub mod parse;
pub mod records;
pub mod snapshot;
pub mod table;

pub use catalog::{Catalog, CatalogKind, Catalogs, SectorCatalog};
pub use error::{Result, SourceError};
pub use loader::{SnapshotLoader, SourcePaths};
pub use records::{CompanyRecord, ContactRecord, Event};
pub use snapshot::{FileStamp, Fingerprint, LoadStats, Snapshot};
pub use table::Table;
