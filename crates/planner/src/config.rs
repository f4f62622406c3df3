//! Compiler configuration.
//!
//! Everything here is read-only during compilation; one `CompilerConfig`
//! can be shared by any number of concurrent compilations.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full-text token meaning "every document in the catalog".
pub const MATCH_ALL_DOCUMENTS: &str = "match-all-catalog-documents";

/// Open lower bound of full-text range queries.
pub const SENTINEL_MIN: &str = "00000101";

/// Open upper bound of full-text range queries.
pub const SENTINEL_MAX: &str = "30000101";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Token emitted when a node has no textual predicate of its own.
    pub match_all: String,

    /// Full-text field that identifier filters are matched against.
    pub id_property: String,

    /// Prefix table for SQL property paths.
    pub namespaces: NamespaceTable,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            match_all: MATCH_ALL_DOCUMENTS.to_string(),
            id_property: "Identifier".to_string(),
            namespaces: NamespaceTable::default(),
        }
    }
}

impl CompilerConfig {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.namespaces = namespaces;
        self
    }
}

/// Maps namespace prefixes (`wrs`, `rim`, ...) to the schema labels stored
/// in the `TextValues.path` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceTable {
    pub labels: BTreeMap<String, String>,

    /// Prefix assumed for properties written without one.
    pub default_prefix: Option<String>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        NamespaceTable::empty()
            .with_label("wrs", "Web Registry Service v0.9")
            .with_label("rim", "Ebrim v2.5")
            .with_label("dc", "Dublin Core")
            .with_label("dct", "Dublin Core Terms")
    }
}

impl NamespaceTable {
    pub fn empty() -> Self {
        NamespaceTable {
            labels: BTreeMap::new(),
            default_prefix: None,
        }
    }

    pub fn with_label(mut self, prefix: &str, label: &str) -> Self {
        self.labels.insert(prefix.to_string(), label.to_string());
        self
    }

    pub fn with_default_prefix(mut self, prefix: &str) -> Self {
        self.default_prefix = Some(prefix.to_string());
        self
    }

    pub fn label(&self, prefix: &str) -> Option<&str> {
        self.labels.get(prefix).map(String::as_str)
    }

    /// Resolves `prefix:Local` into `<label>:Local`.
    pub fn resolve(&self, property: &str) -> Result<String> {
        let (prefix, local) = match property.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => {
                let prefix = self.default_prefix.as_deref().ok_or_else(|| {
                    CompileError::InvalidPropertyPath(format!(
                        "'{property}' has no namespace prefix and no default prefix is configured"
                    ))
                })?;
                (prefix, property)
            }
        };

        if prefix.is_empty() || local.is_empty() {
            return Err(CompileError::InvalidPropertyPath(format!(
                "'{property}' is not of the form prefix:name"
            )));
        }

        let label = self.label(prefix).ok_or_else(|| {
            CompileError::InvalidPropertyPath(format!("unknown namespace prefix '{prefix}'"))
        })?;

        Ok(format!("{label}:{local}"))
    }
}
