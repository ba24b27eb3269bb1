use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read domain definitions: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse domain definitions: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Definitions version for compatibility checking
pub const DEFINITIONS_VERSION: &str = "1.0.0";

/// Placeholder for classification fields of families missing from the dictionary
pub const NOT_AVAILABLE: &str = "N/A";

/// ECOD classification of one F-group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Dotted ECOD identifier, e.g. `1.1.1.1`
    pub f_id: String,
    pub architecture: String,
    /// X-group name, with the H- or T-group substituted when ECOD leaves it unnamed
    pub x_group: String,
    pub t_group: String,
}

/// Serializable definitions format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionsData {
    pub version: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub families: BTreeMap<String, Classification>,
}

/// Classification dictionary keyed by F-group name (the hmmscan model name)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDefinitions {
    families: BTreeMap<String, Classification>,
    source: Option<String>,
}

impl DomainDefinitions {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Load definitions from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be read, or
    /// `CatalogError::ParseError` if it is not a definitions document.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse definitions from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: DefinitionsData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != DEFINITIONS_VERSION {
            warn!(
                "Domain definitions version mismatch (expected {}, found {})",
                DEFINITIONS_VERSION, data.version
            );
        }

        Ok(Self {
            families: data.families,
            source: data.source,
        })
    }

    /// Export definitions to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = DefinitionsData {
            version: DEFINITIONS_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            source: self.source.clone(),
            families: self.families.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Add a family; the first definition of a name wins
    pub fn insert(&mut self, family: impl Into<String>, class: Classification) -> bool {
        match self.families.entry(family.into()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(class);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Look up a family by F-group name
    pub fn get(&self, family: &str) -> Option<&Classification> {
        self.families.get(family)
    }

    /// Record where the definitions came from
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = Some(source.into());
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Families in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Classification)> {
        self.families.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Check if the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(f_id: &str) -> Classification {
        Classification {
            f_id: f_id.to_string(),
            architecture: "alpha arrays".to_string(),
            x_group: "ARM repeat".to_string(),
            t_group: "ARM repeat".to_string(),
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut defs = DomainDefinitions::new();
        assert!(defs.insert("F_one", class("1.1.1.1")));
        assert!(!defs.insert("F_one", class("2.2.2.2")));
        assert_eq!(defs.len(), 1);
        assert_eq!(defs.get("F_one").unwrap().f_id, "1.1.1.1");
    }

    #[test]
    fn test_get_nonexistent() {
        let defs = DomainDefinitions::new();
        assert!(defs.is_empty());
        assert!(defs.get("missing").is_none());
    }

    #[test]
    fn test_definitions_json_roundtrip() {
        let mut defs = DomainDefinitions::new();
        defs.insert("F_one", class("1.1.1.1"));
        defs.insert("F_two", class("2.1.1.3"));
        defs.set_source("ecod.latest.domains.txt");

        let json = defs.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("created_at"));

        let loaded = DomainDefinitions::from_json(&json).unwrap();
        assert_eq!(loaded, defs);
        assert_eq!(loaded.source(), Some("ecod.latest.domains.txt"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.json");
        let mut defs = DomainDefinitions::new();
        defs.insert("F_one", class("1.1.1.1"));
        std::fs::write(&path, defs.to_json().unwrap()).unwrap();

        let loaded = DomainDefinitions::load_from_file(&path).unwrap();
        assert_eq!(loaded.get("F_one").unwrap().architecture, "alpha arrays");
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            DomainDefinitions::from_json("{\"families\": 3}"),
            Err(CatalogError::ParseError(_))
        ));
    }
}
