//! Immutable snapshot of every source table
//!
//! A snapshot is built once and never mutated. Its [`Fingerprint`] records
//! the size and modification time of each file it was read from; comparing
//! it against a fresh fingerprint tells whether the sources changed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::catalog::Catalogs;
use crate::error::{Result, SourceError};
use crate::records::{CompanyRecord, ContactRecord, Event};

/// Identity of one source file at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    /// Stat a file belonging to `table`
    pub fn of(table: &'static str, path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::MissingFile {
                table,
                path: path.display().to_string(),
            },
            _ => SourceError::Io(e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Identity of a complete set of source files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    files: Vec<FileStamp>,
}

impl Fingerprint {
    /// Create from file stamps (order matters)
    pub fn new(files: Vec<FileStamp>) -> Self {
        Self { files }
    }

    /// Stamped files
    pub fn files(&self) -> &[FileStamp] {
        &self.files
    }
}

/// Load statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of event files concatenated
    pub event_files: usize,
    /// Events kept with a null `creation_date`
    pub unparsed_dates: usize,
}

/// Everything read from the sources, frozen
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub contacts: Vec<ContactRecord>,
    pub companies: Vec<CompanyRecord>,
    pub catalogs: Catalogs,
    pub fingerprint: Fingerprint,
    pub stats: LoadStats,
}

impl Snapshot {
    /// Check whether this snapshot was built from the given files
    pub fn is_current(&self, fingerprint: &Fingerprint) -> bool {
        &self.fingerprint == fingerprint
    }
}
