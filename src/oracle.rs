//! Property location metadata.
//!
//! The parser asks a [`MetadataOracle`] where each property referenced by an
//! expression is stored. [`PropertyMapping`] is an oracle backed by a JSON
//! document, used by the CLI and handy in tests:
//!
//! ```
//! use wim_xpath::oracle::{MetadataOracle, PropertyMapping};
//!
//! let mapping = PropertyMapping::from_json_str(r#"{
//!     "repository": { "PersonAccount": ["uid", "cn"], "*": ["uniqueName"] },
//!     "lookaside":  { "PersonAccount": ["favouriteColour"] }
//! }"#).unwrap();
//!
//! assert!(mapping.is_property_in_repository("uid", "PersonAccount").unwrap());
//! assert!(mapping.is_property_in_repository("uniqueName", "Group").unwrap());
//! assert!(mapping.is_property_in_lookaside("favouriteColour", "PersonAccount").unwrap());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Opaque failure of the metadata source itself.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Answers where a property of an entity type is stored.
///
/// Implementations are treated as query-only: the parser may call them any
/// number of times and in any order.
pub trait MetadataOracle {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError>;

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError>;
}

impl<T: MetadataOracle + ?Sized> MetadataOracle for &T {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_repository(property, entity_type)
    }

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_lookaside(property, entity_type)
    }
}

impl<T: MetadataOracle + ?Sized> MetadataOracle for Box<T> {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_repository(property, entity_type)
    }

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_lookaside(property, entity_type)
    }
}

impl<T: MetadataOracle + ?Sized> MetadataOracle for Arc<T> {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_repository(property, entity_type)
    }

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        (**self).is_property_in_lookaside(property, entity_type)
    }
}

/// Errors loading a [`PropertyMapping`].
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("cannot read mapping file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mapping document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Entity type key that applies to every entity type.
pub const ANY_ENTITY_TYPE: &str = "*";

/// Static property-to-store mapping, keyed by entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyMapping {
    #[serde(default)]
    repository: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    lookaside: BTreeMap<String, BTreeSet<String>>,
}

impl PropertyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mapping = Self::from_json_str(&text)?;
        debug!(
            path = %path.display(),
            repository_types = mapping.repository.len(),
            lookaside_types = mapping.lookaside.len(),
            "loaded property mapping"
        );
        Ok(mapping)
    }

    /// Records `property` of `entity_type` as stored in the repository.
    pub fn with_repository(mut self, entity_type: &str, property: &str) -> Self {
        self.repository
            .entry(entity_type.to_string())
            .or_default()
            .insert(property.to_string());
        self
    }

    /// Records `property` of `entity_type` as stored in the look-aside store.
    pub fn with_lookaside(mut self, entity_type: &str, property: &str) -> Self {
        self.lookaside
            .entry(entity_type.to_string())
            .or_default()
            .insert(property.to_string());
        self
    }

    fn lookup(table: &BTreeMap<String, BTreeSet<String>>, property: &str, entity_type: &str) -> bool {
        [entity_type, ANY_ENTITY_TYPE]
            .iter()
            .filter_map(|key| table.get(*key))
            .any(|props| props.contains(property))
    }
}

impl MetadataOracle for PropertyMapping {
    fn is_property_in_repository(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        Ok(Self::lookup(&self.repository, property, entity_type))
    }

    fn is_property_in_lookaside(&self, property: &str, entity_type: &str) -> Result<bool, OracleError> {
        Ok(Self::lookup(&self.lookaside, property, entity_type))
    }
}

#[test]
fn test_builder_and_wildcard() {
    let mapping = PropertyMapping::new()
        .with_repository("PersonAccount", "uid")
        .with_lookaside(ANY_ENTITY_TYPE, "nickname");

    assert!(mapping.is_property_in_repository("uid", "PersonAccount").unwrap());
    assert!(!mapping.is_property_in_repository("uid", "Group").unwrap());
    assert!(mapping.is_property_in_lookaside("nickname", "Group").unwrap());
    assert!(!mapping.is_property_in_lookaside("uid", "PersonAccount").unwrap());
}

#[test]
fn test_unknown_fields_rejected() {
    let err = PropertyMapping::from_json_str(r#"{"repo": {}}"#).unwrap_err();
    assert!(matches!(err, MappingError::Json(_)));
}

#[test]
fn test_missing_file() {
    let err = PropertyMapping::from_path("/nonexistent/mapping.json").unwrap_err();
    assert!(matches!(err, MappingError::Io { .. }));
}
