//! Compiles OGC catalog filter trees into full-text queries, spatial
//! predicate chains and SQL over the attribute-value schema.

use crate::{
    config::CompilerConfig,
    error::{CompileError, Result},
    query::{compiled::CompiledQuery, decompose::Decomposer, sql::Sql, text::FullText},
};
use model::FilterNode;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub mod config;
pub mod error;
pub mod query;

pub use crate::query::compiled::{Distance, SerialChain, SpatialPredicate, SpatialTest};

/// Back end a filter is compiled for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    Text,
    Sql,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Text => write!(f, "text"),
            Target::Sql => write!(f, "sql"),
        }
    }
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "full-text" | "fulltext" => Ok(Target::Text),
            "sql" => Ok(Target::Sql),
            other => Err(CompileError::InvalidFilter(format!(
                "unknown compilation target '{other}'"
            ))),
        }
    }
}

/// Compiles a filter tree into a full-text query tree.
pub fn compile_text(node: &FilterNode, config: &CompilerConfig) -> Result<CompiledQuery> {
    Decomposer::new(&FullText::new(config)).compile(node)
}

/// Compiles a filter tree into SQL over the `Forms` / `TextValues` schema.
pub fn compile_sql(node: &FilterNode, config: &CompilerConfig) -> Result<CompiledQuery> {
    Decomposer::new(&Sql::new(config)).compile(node)
}

/// Compiles a filter tree for the chosen back end.
pub fn compile(node: &FilterNode, target: Target, config: &CompilerConfig) -> Result<CompiledQuery> {
    match target {
        Target::Text => compile_text(node, config),
        Target::Sql => compile_sql(node, config),
    }
}
