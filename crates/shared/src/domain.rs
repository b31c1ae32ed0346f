use serde::{Deserialize, Serialize};
use url::Url;

/// The two filterable axes of the directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Role,
    Region,
}

impl FilterCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterCategory::Role => "role",
            FilterCategory::Region => "region",
        }
    }
}

impl std::fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One public roster entry. Immutable once fetched; identity for a session
/// is (name, position in the source array).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologistEntry {
    pub name: String,
    pub role: String,
    pub region: String,
    pub location: String,
    pub link: Url,
    pub order: i64,
    pub featured: bool,
}

/// A selectable filter value, derived from the roster at load time. Toggling
/// flips `active`; the facet set itself never grows or shrinks afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFacet {
    pub label: String,
    pub category: FilterCategory,
    pub active: bool,
}

impl FilterFacet {
    pub fn inactive(label: impl Into<String>, category: FilterCategory) -> Self {
        Self {
            label: label.into(),
            category,
            active: false,
        }
    }
}
