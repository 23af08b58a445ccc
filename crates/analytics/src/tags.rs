//! Tag list decoding
//!
//! Contacts and companies carry their categories as JSON text:
//!
//! ```text
//! [{"name": "Secteur", "list": [{"id": 5, "name": "Retail"}]}, ...]
//! ```
//!
//! This module decodes that text into typed [`TagEntry`] values and reduces
//! them to flat attribute records. Decoding never fails towards the caller
//! of [`CompanyAttributes::extract`] or [`ContactAttributes::extract`]:
//! absent or malformed text yields the all-null record. The `try_*` and
//! `*_with_errors` variants expose the decode errors for accounting.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use conso_source::parse::{parse_id, whole_number};

/// Malformed serialized tag text
#[derive(Debug, Error)]
#[error("malformed tag list: {0}")]
pub struct TagDecodeError(#[from] serde_json::Error);

/// Leaf of a tag entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

/// One tagged entry with its nested items
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub list: Vec<TagItem>,
}

impl TagEntry {
    /// First nested item, if any
    pub fn first_item(&self) -> Option<&TagItem> {
        self.list.first()
    }
}

/// Entry of a job-type list: either a full entry or a bare id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum JobTypeRef {
    Entry(TagEntry),
    Id(#[serde(deserialize_with = "required_lenient_id")] Option<i64>),
}

impl JobTypeRef {
    /// Job type id carried by this reference
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Entry(entry) => entry.id,
            Self::Id(id) => *id,
        }
    }
}

/// Scalar as found in loosely typed JSON
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_id(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(v) => whole_number(v),
            Self::Text(s) => parse_id(&s),
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Text(s) => Some(s).filter(|s| !s.trim().is_empty()),
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_id))
}

fn required_lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Scalar::deserialize(d)?.into_id())
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_text))
}

fn nullable_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<TagItem>, D::Error> {
    Ok(Option::<Vec<TagItem>>::deserialize(d)?.unwrap_or_default())
}

/// Decode a tag list; `null` decodes to an empty list
pub fn decode_tag_list(text: &str) -> Result<Vec<TagEntry>, TagDecodeError> {
    Ok(serde_json::from_str::<Option<Vec<TagEntry>>>(text)?.unwrap_or_default())
}

/// Decode a job-type list; `null` decodes to an empty list
pub fn decode_job_types(text: &str) -> Result<Vec<JobTypeRef>, TagDecodeError> {
    Ok(serde_json::from_str::<Option<Vec<JobTypeRef>>>(text)?.unwrap_or_default())
}

// =============================================================================
// Company categories
// =============================================================================

/// Company category carried in a company's tag list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyCategory {
    Sector,
    CompanySize,
    RevenueBracket,
    WorkforceBracket,
    StructureType,
}

impl CompanyCategory {
    /// Every category, in output order
    pub const ALL: [Self; 5] = [
        Self::Sector,
        Self::CompanySize,
        Self::RevenueBracket,
        Self::WorkforceBracket,
        Self::StructureType,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sector => "Sector",
            Self::CompanySize => "Company-Size",
            Self::RevenueBracket => "Revenue-Bracket",
            Self::WorkforceBracket => "Workforce-Bracket",
            Self::StructureType => "Structure-Type",
        }
    }

    /// Names this category is exported under (canonical first)
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Sector => &["Sector", "Secteur", "Secteur d'activité"],
            Self::CompanySize => &["Company-Size", "Taille", "Taille d'entreprise"],
            Self::RevenueBracket => &[
                "Revenue-Bracket",
                "Chiffre d'affaires",
                "Tranche de CA",
                "Tranche de chiffre d'affaires",
            ],
            Self::WorkforceBracket => &["Workforce-Bracket", "Effectif", "Tranche d'effectif"],
            Self::StructureType => &["Structure-Type", "Type de structure"],
        }
    }

    /// Map a tag entry name to its category (case-insensitive)
    pub fn from_tag_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|category| {
            category
                .aliases()
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }
}

/// Flat company attributes, one value per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompanyAttributes {
    pub sector: Option<i64>,
    pub company_size: Option<i64>,
    pub revenue_bracket: Option<i64>,
    pub workforce_bracket: Option<i64>,
    pub structure_type: Option<i64>,
}

impl CompanyAttributes {
    /// Extract from serialized text; absent or malformed text gives all-null
    pub fn extract(text: Option<&str>) -> Self {
        Self::try_extract(text).unwrap_or_default()
    }

    /// Extract from serialized text, reporting decode failures
    pub fn try_extract(text: Option<&str>) -> Result<Self, TagDecodeError> {
        match text {
            Some(text) => Ok(Self::from_entries(&decode_tag_list(text)?)),
            None => Ok(Self::default()),
        }
    }

    /// Reduce decoded entries: the first entry of each category decides
    pub fn from_entries(entries: &[TagEntry]) -> Self {
        let mut attrs = Self::default();
        let mut seen = [false; CompanyCategory::ALL.len()];

        for entry in entries {
            let Some(category) = entry.name.as_deref().and_then(CompanyCategory::from_tag_name)
            else {
                continue;
            };
            let slot = category as usize;
            if seen[slot] {
                continue;
            }
            seen[slot] = true;
            *attrs.slot_mut(category) = entry.first_item().and_then(|item| item.id);
        }

        attrs
    }

    /// Value of one category
    pub fn get(&self, category: CompanyCategory) -> Option<i64> {
        match category {
            CompanyCategory::Sector => self.sector,
            CompanyCategory::CompanySize => self.company_size,
            CompanyCategory::RevenueBracket => self.revenue_bracket,
            CompanyCategory::WorkforceBracket => self.workforce_bracket,
            CompanyCategory::StructureType => self.structure_type,
        }
    }

    fn slot_mut(&mut self, category: CompanyCategory) -> &mut Option<i64> {
        match category {
            CompanyCategory::Sector => &mut self.sector,
            CompanyCategory::CompanySize => &mut self.company_size,
            CompanyCategory::RevenueBracket => &mut self.revenue_bracket,
            CompanyCategory::WorkforceBracket => &mut self.workforce_bracket,
            CompanyCategory::StructureType => &mut self.structure_type,
        }
    }

    /// Check whether every category is null
    pub fn is_empty(&self) -> bool {
        CompanyCategory::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

// =============================================================================
// Contact attributes
// =============================================================================

/// Flat contact attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ContactAttributes {
    /// Primary job type (first entry of the job-type list)
    pub job_type_id: Option<i64>,
    /// First item of the first hierarchical tag
    pub hierarchical_id: Option<i64>,
    pub hierarchical_name: Option<String>,
}

impl ContactAttributes {
    /// Extract from the two serialized lists; each is decoded independently
    pub fn extract(tag_list: Option<&str>, job_type_list: Option<&str>) -> Self {
        Self::extract_with_errors(tag_list, job_type_list).0
    }

    /// Extract, also returning the decode errors of either list
    pub fn extract_with_errors(
        tag_list: Option<&str>,
        job_type_list: Option<&str>,
    ) -> (Self, Vec<TagDecodeError>) {
        let mut errors = Vec::new();
        let mut attrs = Self::default();

        match job_type_list.map(decode_job_types).transpose() {
            Ok(refs) => attrs.job_type_id = refs.and_then(|r| r.first().and_then(JobTypeRef::id)),
            Err(e) => errors.push(e),
        }

        match tag_list.map(decode_tag_list).transpose() {
            Ok(entries) => {
                let item = entries
                    .as_ref()
                    .and_then(|e| e.first())
                    .and_then(TagEntry::first_item);
                if let Some(item) = item {
                    attrs.hierarchical_id = item.id;
                    attrs.hierarchical_name = item.name.clone();
                }
            }
            Err(e) => errors.push(e),
        }

        (attrs, errors)
    }
}
