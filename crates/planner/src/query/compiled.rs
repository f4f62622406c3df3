//! Output of the query compilers.

use model::{Geometry, LogicalOp, SpatialOp, Units};
use serde::{Deserialize, Serialize};

/// One node of a compiled filter.
///
/// `main_text` and `spatial_predicate` are this node's own predicate;
/// `logical_operator` says how the caller combines them with each other and
/// with every entry of `sub_queries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub main_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_predicate: Option<SpatialPredicate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOp>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_queries: Vec<CompiledQuery>,
}

impl CompiledQuery {
    pub fn text(main_text: impl Into<String>) -> Self {
        CompiledQuery {
            main_text: main_text.into(),
            spatial_predicate: None,
            logical_operator: None,
            sub_queries: Vec::new(),
        }
    }

    pub fn is_flattened(&self) -> bool {
        self.sub_queries.is_empty()
    }

    /// A grouping node carries no predicate of its own: its text is the
    /// match-all token, it has no spatial part, and its meaning lives in
    /// `sub_queries`. Under NOT it stands for the whole catalog minus its
    /// sub-query.
    pub fn is_grouping(&self, match_all: &str) -> bool {
        self.main_text == match_all
            && self.spatial_predicate.is_none()
            && !self.sub_queries.is_empty()
    }

    /// Nesting depth of `sub_queries`; a flattened node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .sub_queries
            .iter()
            .map(CompiledQuery::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Structured predicate evaluated by the spatial index stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpatialPredicate {
    Test(SpatialTest),
    Chain(SerialChain),
}

impl SpatialPredicate {
    pub fn as_test(&self) -> Option<&SpatialTest> {
        match self {
            SpatialPredicate::Test(test) => Some(test),
            SpatialPredicate::Chain(_) => None,
        }
    }

    pub fn as_chain(&self) -> Option<&SerialChain> {
        match self {
            SpatialPredicate::Chain(chain) => Some(chain),
            SpatialPredicate::Test(_) => None,
        }
    }

    /// Number of leaf tests, nested chains included.
    pub fn test_count(&self) -> usize {
        match self {
            SpatialPredicate::Test(_) => 1,
            SpatialPredicate::Chain(chain) => chain
                .predicates
                .iter()
                .map(SpatialPredicate::test_count)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialTest {
    pub op: SpatialOp,
    pub property: String,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub units: Units,
}

impl Distance {
    pub fn meters(&self) -> f64 {
        self.units.to_meters(self.value)
    }
}

/// Flattened n-ary spatial boolean.
///
/// `connectors[i]` joins `predicates[i]` and `predicates[i + 1]`, applied
/// left to right. A negated chain holds exactly one predicate and no
/// connectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialChain {
    pub predicates: Vec<SpatialPredicate>,
    pub connectors: Vec<LogicalOp>,
    #[serde(default)]
    pub negated: bool,
}

impl SerialChain {
    /// Joins `predicates` with `op` between every consecutive pair.
    pub fn joined(op: LogicalOp, predicates: Vec<SpatialPredicate>) -> Self {
        let connectors = vec![op; predicates.len().saturating_sub(1)];
        SerialChain {
            predicates,
            connectors,
            negated: false,
        }
    }

    pub fn negation(predicate: SpatialPredicate) -> Self {
        SerialChain {
            predicates: vec![predicate],
            connectors: Vec::new(),
            negated: true,
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        if self.negated {
            self.predicates.len() == 1 && self.connectors.is_empty()
        } else {
            !self.predicates.is_empty() && self.connectors.len() == self.predicates.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(op: SpatialOp) -> SpatialPredicate {
        SpatialPredicate::Test(SpatialTest {
            op,
            property: "Geometry".to_string(),
            geometry: Geometry::envelope(0.0, 0.0, 1.0, 1.0),
            distance: None,
        })
    }

    #[test]
    fn test_joined_chain_connectors() {
        let chain = SerialChain::joined(
            LogicalOp::Or,
            vec![
                test(SpatialOp::Intersects),
                test(SpatialOp::Within),
                test(SpatialOp::Touches),
            ],
        );
        assert_eq!(chain.connectors, vec![LogicalOp::Or, LogicalOp::Or]);
        assert!(chain.is_well_formed());
        assert!(!chain.negated);
    }

    #[test]
    fn test_negation_chain_shape() {
        let chain = SerialChain::negation(test(SpatialOp::Disjoint));
        assert!(chain.negated);
        assert_eq!(chain.len(), 1);
        assert!(chain.connectors.is_empty());
        assert!(chain.is_well_formed());
    }

    #[test]
    fn test_count_nested_tests() {
        let inner = SpatialPredicate::Chain(SerialChain::joined(
            LogicalOp::And,
            vec![test(SpatialOp::Intersects), test(SpatialOp::Overlaps)],
        ));
        let outer = SpatialPredicate::Chain(SerialChain::joined(
            LogicalOp::Or,
            vec![inner, test(SpatialOp::Within)],
        ));
        assert_eq!(outer.test_count(), 3);
    }

    #[test]
    fn test_compiled_query_json_omits_empty_parts() {
        let json = serde_json::to_value(CompiledQuery::text("Title:\"VM\"")).unwrap();
        assert_eq!(json, serde_json::json!({ "main_text": "Title:\"VM\"" }));
    }
}
