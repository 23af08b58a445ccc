//! Snapshot loader
//!
//! Discovers the event files, reads every reference table and assembles a
//! [`Snapshot`]. Any missing file or column aborts the load.
//!
//! # File Layout
//!
//! ```text
//! {data_dir}/
//! ├── consumption_histories*.csv   (one or more event exports)
//! ├── organizations.csv
//! ├── users.csv
//! ├── contacts.csv
//! ├── companies.csv
//! ├── job_types.csv
//! ├── sectors.csv
//! ├── sector_classes.csv
//! ├── workforce_brackets.csv
//! └── sales_brackets.csv
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::catalog::{Catalog, CatalogKind, Catalogs, SectorCatalog};
use crate::error::{Result, SourceError};
use crate::records::{CompanyRecord, ContactRecord, Event};
use crate::snapshot::{FileStamp, Fingerprint, LoadStats, Snapshot};
use crate::table::Table;

/// Locations of every source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Event file path or glob pattern
    pub events: String,
    pub organizations: PathBuf,
    pub users: PathBuf,
    pub contacts: PathBuf,
    pub companies: PathBuf,
    pub job_types: PathBuf,
    pub sectors: PathBuf,
    pub sector_classes: PathBuf,
    pub workforce_brackets: PathBuf,
    pub sales_brackets: PathBuf,
}

impl SourcePaths {
    /// Default file names inside a directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            events: dir.join("consumption_histories*.csv").display().to_string(),
            organizations: dir.join("organizations.csv"),
            users: dir.join("users.csv"),
            contacts: dir.join("contacts.csv"),
            companies: dir.join("companies.csv"),
            job_types: dir.join("job_types.csv"),
            sectors: dir.join("sectors.csv"),
            sector_classes: dir.join("sector_classes.csv"),
            workforce_brackets: dir.join("workforce_brackets.csv"),
            sales_brackets: dir.join("sales_brackets.csv"),
        }
    }

    /// Reference tables as (table name, path) in load order
    fn references(&self) -> [(&'static str, &Path); 9] {
        [
            ("contacts", self.contacts.as_path()),
            ("companies", self.companies.as_path()),
            (CatalogKind::Organizations.as_str(), self.organizations.as_path()),
            (CatalogKind::Users.as_str(), self.users.as_path()),
            (CatalogKind::JobTypes.as_str(), self.job_types.as_path()),
            (CatalogKind::Sectors.as_str(), self.sectors.as_path()),
            (CatalogKind::SectorClasses.as_str(), self.sector_classes.as_path()),
            (
                CatalogKind::WorkforceBrackets.as_str(),
                self.workforce_brackets.as_path(),
            ),
            (
                CatalogKind::SalesBrackets.as_str(),
                self.sales_brackets.as_path(),
            ),
        ]
    }
}

/// Builds snapshots from a fixed set of source paths
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    paths: SourcePaths,
}

impl SnapshotLoader {
    /// Create a loader
    pub fn new(paths: SourcePaths) -> Self {
        Self { paths }
    }

    /// Configured paths
    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// Event files matching the configured pattern, in sorted path order
    pub fn discover_event_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = glob::glob(&self.paths.events)?
            .collect::<std::result::Result<_, _>>()?;
        files.retain(|p| p.is_file());
        files.sort();

        if files.is_empty() {
            return Err(SourceError::NoDataFiles(self.paths.events.clone()));
        }

        tracing::debug!(
            pattern = %self.paths.events,
            file_count = files.len(),
            "discovered event files"
        );

        Ok(files)
    }

    /// Current fingerprint of every source file
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let event_files = self.discover_event_files()?;
        self.fingerprint_of(&event_files)
    }

    fn fingerprint_of(&self, event_files: &[PathBuf]) -> Result<Fingerprint> {
        let mut stamps = Vec::with_capacity(event_files.len() + 9);
        for path in event_files {
            stamps.push(FileStamp::of("events", path)?);
        }
        for (table, path) in self.paths.references() {
            stamps.push(FileStamp::of(table, path)?);
        }
        Ok(Fingerprint::new(stamps))
    }

    /// Read every source table into a new snapshot
    pub fn load(&self) -> Result<Snapshot> {
        let start = Instant::now();

        let event_files = self.discover_event_files()?;
        let fingerprint = self.fingerprint_of(&event_files)?;

        let mut events = Vec::new();
        let mut unparsed_dates = 0;
        for path in &event_files {
            let table = Table::read_csv("events", path)?;
            let (mut batch, bad_dates) = Event::from_table(&table)?;
            unparsed_dates += bad_dates;
            events.append(&mut batch);
        }

        if unparsed_dates > 0 {
            tracing::warn!(
                rows = unparsed_dates,
                "events with unparseable creation_date kept with a null date"
            );
        }

        let contacts = ContactRecord::from_table(&Table::read_csv("contacts", &self.paths.contacts)?)?;
        let companies =
            CompanyRecord::from_table(&Table::read_csv("companies", &self.paths.companies)?)?;
        let catalogs = self.load_catalogs()?;

        let stats = LoadStats {
            event_files: event_files.len(),
            unparsed_dates,
        };

        tracing::info!(
            events = events.len(),
            contacts = contacts.len(),
            companies = companies.len(),
            event_files = stats.event_files,
            time_ms = start.elapsed().as_millis() as u64,
            "loaded source snapshot"
        );

        Ok(Snapshot {
            events,
            contacts,
            companies,
            catalogs,
            fingerprint,
            stats,
        })
    }

    fn load_catalogs(&self) -> Result<Catalogs> {
        let catalog = |kind: CatalogKind, path: &Path| -> Result<Catalog> {
            Catalog::from_table(kind, &Table::read_csv(kind.as_str(), path)?)
        };

        Ok(Catalogs {
            organizations: catalog(CatalogKind::Organizations, &self.paths.organizations)?,
            users: catalog(CatalogKind::Users, &self.paths.users)?,
            job_types: catalog(CatalogKind::JobTypes, &self.paths.job_types)?,
            sectors: SectorCatalog::from_table(&Table::read_csv(
                CatalogKind::Sectors.as_str(),
                &self.paths.sectors,
            )?)?,
            sector_classes: catalog(CatalogKind::SectorClasses, &self.paths.sector_classes)?,
            workforce_brackets: catalog(
                CatalogKind::WorkforceBrackets,
                &self.paths.workforce_brackets,
            )?,
            sales_brackets: catalog(CatalogKind::SalesBrackets, &self.paths.sales_brackets)?,
        })
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
