//! Reference catalogs
//!
//! Immutable id → display name lookups. Keys are unique: when a source
//! table repeats an id, the first row wins and later rows are counted as
//! duplicates. This keeps every join against a catalog one-to-one.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::parse::{clean_text, parse_id_cell};
use crate::table::Table;

/// Which reference table a catalog was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Organizations,
    Users,
    JobTypes,
    Sectors,
    SectorClasses,
    WorkforceBrackets,
    SalesBrackets,
}

impl CatalogKind {
    /// Table name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Users => "users",
            Self::JobTypes => "job_types",
            Self::Sectors => "sectors",
            Self::SectorClasses => "sector_classes",
            Self::WorkforceBrackets => "workforce_brackets",
            Self::SalesBrackets => "sales_brackets",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An id → name lookup table
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: CatalogKind,
    /// Entries in first-seen order
    entries: Vec<(i64, Option<String>)>,
    index: HashMap<i64, usize>,
    duplicates: usize,
}

impl Catalog {
    /// Create an empty catalog
    pub fn empty(kind: CatalogKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            index: HashMap::new(),
            duplicates: 0,
        }
    }

    /// Build from (id, name) pairs, keeping the first occurrence of each id
    ///
    /// Pairs without an id are ignored.
    pub fn from_pairs<I, S>(kind: CatalogKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<i64>, Option<S>)>,
        S: Into<String>,
    {
        let mut catalog = Self::empty(kind);
        for (id, name) in pairs {
            if let Some(id) = id {
                catalog.insert(id, name.map(Into::into));
            }
        }
        catalog
    }

    /// Build from a reference table
    ///
    /// Users are labelled `first_name last_name`; job types read `name`,
    /// falling back to a `type` column; every other kind reads `name`.
    pub fn from_table(kind: CatalogKind, table: &Table) -> Result<Self> {
        let ids = table.text("id")?;

        let names: Vec<Option<String>> = match kind {
            CatalogKind::Users => {
                let first = table.text("first_name")?;
                let last = table.text("last_name")?;
                first
                    .iter()
                    .zip(&last)
                    .map(|(f, l)| full_name(f.as_deref(), l.as_deref()))
                    .collect()
            }
            CatalogKind::JobTypes if !table.has_column("name") => table.text("type")?,
            _ => table.text("name")?,
        };

        let pairs = ids.iter().zip(names).map(|(id, name)| {
            let name = clean_text(name.as_deref()).map(str::to_string);
            (parse_id_cell(id.as_deref()), name)
        });
        let catalog = Self::from_pairs(kind, pairs);

        if catalog.duplicates > 0 {
            tracing::warn!(
                catalog = %kind,
                duplicates = catalog.duplicates,
                "duplicate ids in reference table, keeping first occurrence"
            );
        }
        tracing::debug!(catalog = %kind, entries = catalog.len(), "built catalog");

        Ok(catalog)
    }

    fn insert(&mut self, id: i64, name: Option<String>) {
        if self.index.contains_key(&id) {
            self.duplicates += 1;
            return;
        }
        self.index.insert(id, self.entries.len());
        self.entries.push((id, name));
    }

    /// Catalog kind
    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    /// Display name for an id
    pub fn name(&self, id: i64) -> Option<&str> {
        self.index
            .get(&id)
            .and_then(|&i| self.entries[i].1.as_deref())
    }

    /// Check whether an id is known
    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    /// First id whose name equals `name` (case-insensitive)
    pub fn id_by_name(&self, name: &str) -> Option<i64> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|(_, n)| n.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .map(|(id, _)| *id)
    }

    /// Iterate (id, name) in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (i64, Option<&str>)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_deref()))
    }

    /// Number of distinct ids
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows dropped because their id was already present
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [clean_text(first), clean_text(last)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Sectors with their parent class
#[derive(Debug, Clone)]
pub struct SectorCatalog {
    names: Catalog,
    classes: HashMap<i64, i64>,
}

impl SectorCatalog {
    /// Build from the sectors table (`id`, `name`, `class`)
    ///
    /// `class` must exist as a column; blank cells leave a sector unclassified.
    pub fn from_table(table: &Table) -> Result<Self> {
        let names = Catalog::from_table(CatalogKind::Sectors, table)?;

        let ids = table.text("id")?;
        let parents = table.text("class")?;
        let mut seen = HashSet::new();
        let mut classes = HashMap::new();
        for (id, parent) in ids.iter().zip(&parents) {
            let Some(id) = parse_id_cell(id.as_deref()) else {
                continue;
            };
            // first occurrence wins, as for names
            if seen.insert(id)
                && let Some(parent) = parse_id_cell(parent.as_deref())
            {
                classes.insert(id, parent);
            }
        }

        Ok(Self { names, classes })
    }

    /// Create an empty sector catalog
    pub fn empty() -> Self {
        Self {
            names: Catalog::empty(CatalogKind::Sectors),
            classes: HashMap::new(),
        }
    }

    /// Build from (id, name, class) triples
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, &'static str, Option<i64>)>,
    {
        let rows: Vec<_> = rows.into_iter().collect();
        let names = Catalog::from_pairs(
            CatalogKind::Sectors,
            rows.iter().map(|(id, name, _)| (Some(*id), Some(*name))),
        );
        let mut classes = HashMap::new();
        for (id, _, class) in &rows {
            if let Some(class) = class {
                classes.entry(*id).or_insert(*class);
            }
        }
        Self { names, classes }
    }

    /// Parent class of a sector
    pub fn class_of(&self, sector_id: i64) -> Option<i64> {
        self.classes.get(&sector_id).copied()
    }

    /// Sector names
    pub fn names(&self) -> &Catalog {
        &self.names
    }
}

/// Every reference catalog of a snapshot
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub organizations: Catalog,
    pub users: Catalog,
    pub job_types: Catalog,
    pub sectors: SectorCatalog,
    pub sector_classes: Catalog,
    pub workforce_brackets: Catalog,
    pub sales_brackets: Catalog,
}

impl Catalogs {
    /// Look up a catalog by kind
    pub fn get(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::Organizations => &self.organizations,
            CatalogKind::Users => &self.users,
            CatalogKind::JobTypes => &self.job_types,
            CatalogKind::Sectors => self.sectors.names(),
            CatalogKind::SectorClasses => &self.sector_classes,
            CatalogKind::WorkforceBrackets => &self.workforce_brackets,
            CatalogKind::SalesBrackets => &self.sales_brackets,
        }
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            organizations: Catalog::empty(CatalogKind::Organizations),
            users: Catalog::empty(CatalogKind::Users),
            job_types: Catalog::empty(CatalogKind::JobTypes),
            sectors: SectorCatalog::empty(),
            sector_classes: Catalog::empty(CatalogKind::SectorClasses),
            workforce_brackets: Catalog::empty(CatalogKind::WorkforceBrackets),
            sales_brackets: Catalog::empty(CatalogKind::SalesBrackets),
        }
    }
}
