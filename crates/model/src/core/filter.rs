//! Typed filter expression tree.
//!
//! A `FilterNode` is produced by a front end (CQL text, or a translated
//! OGC filter document) and consumed by the query compilers in `planner`.

use crate::core::{
    geometry::{Geometry, Units},
    literal::Literal,
    operator::{ComparisonOp, LogicalOp, SpatialOp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterNode {
    Comparison(Comparison),
    Logical {
        op: LogicalOp,
        operands: Vec<FilterNode>,
    },
    Spatial(SpatialFilter),
    IdFilter {
        ids: BTreeSet<String>,
    },
}

/// Property comparison, e.g. `Title = 'VM'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub property: String,
    pub op: ComparisonOp,
    pub value: Literal,
    /// Upper bound, BETWEEN only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_value: Option<Literal>,
    /// Pattern tokens, LIKE only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<LikeSpec>,
}

/// Wildcard tokens of a LIKE pattern as written by the filter author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSpec {
    pub wildcard: char,
    pub single_char: char,
    pub escape: char,
}

impl Default for LikeSpec {
    fn default() -> Self {
        LikeSpec {
            wildcard: '%',
            single_char: '_',
            escape: '\\',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialFilter {
    pub op: SpatialOp,
    pub property: String,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
}

impl FilterNode {
    pub fn compare(property: &str, op: ComparisonOp, value: impl Into<Literal>) -> Self {
        FilterNode::Comparison(Comparison {
            property: property.to_string(),
            op,
            value: value.into(),
            upper_value: None,
            like: None,
        })
    }

    pub fn eq(property: &str, value: impl Into<Literal>) -> Self {
        Self::compare(property, ComparisonOp::Eq, value)
    }

    pub fn neq(property: &str, value: impl Into<Literal>) -> Self {
        Self::compare(property, ComparisonOp::Neq, value)
    }

    pub fn is_null(property: &str) -> Self {
        Self::compare(property, ComparisonOp::IsNull, Literal::String(String::new()))
    }

    pub fn between(property: &str, lower: impl Into<Literal>, upper: impl Into<Literal>) -> Self {
        FilterNode::Comparison(Comparison {
            property: property.to_string(),
            op: ComparisonOp::Between,
            value: lower.into(),
            upper_value: Some(upper.into()),
            like: None,
        })
    }

    pub fn like(property: &str, pattern: &str, spec: LikeSpec) -> Self {
        FilterNode::Comparison(Comparison {
            property: property.to_string(),
            op: ComparisonOp::Like,
            value: Literal::String(pattern.to_string()),
            upper_value: None,
            like: Some(spec),
        })
    }

    pub fn logical(op: LogicalOp, operands: Vec<FilterNode>) -> Self {
        FilterNode::Logical { op, operands }
    }

    pub fn and(operands: Vec<FilterNode>) -> Self {
        Self::logical(LogicalOp::And, operands)
    }

    pub fn or(operands: Vec<FilterNode>) -> Self {
        Self::logical(LogicalOp::Or, operands)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: FilterNode) -> Self {
        Self::logical(LogicalOp::Not, vec![operand])
    }

    pub fn spatial(op: SpatialOp, property: &str, geometry: Geometry) -> Self {
        FilterNode::Spatial(SpatialFilter {
            op,
            property: property.to_string(),
            geometry,
            distance: None,
            units: None,
        })
    }

    pub fn distance(
        op: SpatialOp,
        property: &str,
        geometry: Geometry,
        distance: f64,
        units: Units,
    ) -> Self {
        FilterNode::Spatial(SpatialFilter {
            op,
            property: property.to_string(),
            geometry,
            distance: Some(distance),
            units: Some(units),
        })
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterNode::IdFilter {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of nodes in the tree, leaves included.
    pub fn size(&self) -> usize {
        match self {
            FilterNode::Logical { operands, .. } => {
                1 + operands.iter().map(FilterNode::size).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Whether any spatial predicate occurs in the tree.
    pub fn has_spatial(&self) -> bool {
        match self {
            FilterNode::Spatial(_) => true,
            FilterNode::Logical { operands, .. } => operands.iter().any(FilterNode::has_spatial),
            FilterNode::Comparison(_) | FilterNode::IdFilter { .. } => false,
        }
    }
}
