//! Categorical dimensions and breakdown results

use std::fmt;

use conso_source::{CatalogKind, Catalogs};
use serde::{Deserialize, Serialize};

use crate::enrich::EnrichedRow;
use crate::error::{AnalyticsError, Result};

/// Label of the row collecting null and unresolved codes
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A categorical dimension of the enriched table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Type,
    Organization,
    User,
    JobType,
    Hierarchy,
    CompanySize,
    StructureType,
    WorkforceBracket,
    RevenueBracket,
    Sector,
    SectorClass,
}

impl Dimension {
    pub const ALL: [Dimension; 11] = [
        Self::Type,
        Self::Organization,
        Self::User,
        Self::JobType,
        Self::Hierarchy,
        Self::CompanySize,
        Self::StructureType,
        Self::WorkforceBracket,
        Self::RevenueBracket,
        Self::Sector,
        Self::SectorClass,
    ];

    /// Parse a dimension name
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "type" | "types" => Ok(Self::Type),
            "organization" | "organizations" | "org" | "orgs" => Ok(Self::Organization),
            "user" | "users" => Ok(Self::User),
            "job_type" | "job_types" | "job" => Ok(Self::JobType),
            "hierarchy" | "hierarchical" | "level" => Ok(Self::Hierarchy),
            "company_size" | "size" => Ok(Self::CompanySize),
            "structure_type" | "structure" => Ok(Self::StructureType),
            "workforce" | "workforce_bracket" | "effectif" => Ok(Self::WorkforceBracket),
            "revenue" | "revenue_bracket" | "sales" | "ca" => Ok(Self::RevenueBracket),
            "sector" | "secteur" => Ok(Self::Sector),
            "sector_class" | "class" => Ok(Self::SectorClass),
            _ => Err(AnalyticsError::InvalidDimension(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Organization => "organization",
            Self::User => "user",
            Self::JobType => "job_type",
            Self::Hierarchy => "hierarchy",
            Self::CompanySize => "company_size",
            Self::StructureType => "structure_type",
            Self::WorkforceBracket => "workforce_bracket",
            Self::RevenueBracket => "revenue_bracket",
            Self::Sector => "sector",
            Self::SectorClass => "sector_class",
        }
    }

    /// Raw code of a row along this dimension
    pub fn code(&self, row: &EnrichedRow) -> Option<i64> {
        match self {
            Self::Type => row.type_id,
            Self::Organization => row.organization_id,
            Self::User => row.user_id,
            Self::JobType => row.contact.job_type_id,
            Self::Hierarchy => row.contact.hierarchical_id,
            Self::CompanySize => row.company.company_size,
            Self::StructureType => row.company.structure_type,
            Self::WorkforceBracket => row.company.workforce_bracket,
            Self::RevenueBracket => row.company.revenue_bracket,
            Self::Sector => row.company.sector,
            Self::SectorClass => row.sector_class,
        }
    }

    /// Catalog resolving codes to names, if any
    pub fn catalog(&self) -> Option<CatalogKind> {
        match self {
            Self::Organization => Some(CatalogKind::Organizations),
            Self::User => Some(CatalogKind::Users),
            Self::JobType => Some(CatalogKind::JobTypes),
            Self::WorkforceBracket => Some(CatalogKind::WorkforceBrackets),
            Self::RevenueBracket => Some(CatalogKind::SalesBrackets),
            Self::Sector => Some(CatalogKind::Sectors),
            Self::SectorClass => Some(CatalogKind::SectorClasses),
            Self::Type | Self::Hierarchy | Self::CompanySize | Self::StructureType => None,
        }
    }

    /// Resolve a row to `(code, label)`; `None` means the Unknown bucket
    pub fn resolve(&self, row: &EnrichedRow, catalogs: &Catalogs) -> Option<(i64, String)> {
        let code = self.code(row)?;
        let label = match self.catalog() {
            Some(kind) => catalogs.get(kind).name(code)?.to_string(),
            None if *self == Self::Hierarchy => row
                .contact
                .hierarchical_name
                .clone()
                .unwrap_or_else(|| code.to_string()),
            None => code.to_string(),
        };
        Some((code, label))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    /// Raw code, `None` for the Unknown row
    pub code: Option<i64>,
    /// Display name
    pub label: String,
    /// Matching rows
    pub count: u64,
    /// Share of the filtered rows in percent, 2 decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl BreakdownRow {
    pub fn is_unknown(&self) -> bool {
        self.code.is_none()
    }
}

/// Counts per category, sorted by descending count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub rows: Vec<BreakdownRow>,
    /// Number of filtered rows (before any truncation)
    pub total: u64,
}

impl Breakdown {
    /// Keep the first `limit` categories
    pub fn truncate(mut self, limit: usize) -> Self {
        self.rows.truncate(limit);
        self
    }

    /// Fill `rate` for every category
    pub fn with_rates(mut self) -> Self {
        for row in &mut self.rows {
            row.rate = Some(rate(row.count, self.total));
        }
        self
    }

    /// The Unknown row, if any row was unresolved
    pub fn unknown(&self) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.is_unknown())
    }

    /// `(label, count)` pairs in display order
    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.rows.iter().map(|r| (r.label.as_str(), r.count)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Percentage of `count` in `total`, rounded to 2 decimals
pub fn rate(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}
