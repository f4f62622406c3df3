//! Tree decomposer.
//!
//! Walks a `FilterNode` bottom-up and decides, node by node, whether the
//! operands can be flattened into a single (text, spatial) pair or must be
//! split into a primary predicate plus an ordered list of sub-queries.
//! Textual leaves are delegated to a `QueryTarget`, spatial leaves to the
//! spatial chain builder.
//!
//! Shapes produced for an AND/OR node, in order of preference:
//!
//! - every operand textual: one fused fragment, e.g. `(A AND B)`;
//! - every operand spatial: one serial chain;
//! - one textual operand, the rest spatial: a pair joined by the node's
//!   operator;
//! - anything else: the first operand that can stand alone becomes this
//!   node's own predicate and the others become sub-queries, in order.
//!
//! NOT is never distributed over its operand: it negates a textual
//! fragment (or defers the negation to the caller), wraps spatial parts in
//! a NOT chain, and negates each sub-query of a split node in place.

use crate::{
    error::{CompileError, Result},
    query::{
        compiled::{CompiledQuery, SpatialPredicate},
        spatial,
        target::{Negation, QueryTarget},
    },
};
use model::{FilterNode, LogicalOp};
use tracing::{debug, trace};

/// Node being compiled, with the target's unrendered fragment as text.
/// `None` text renders as the match-all token.
#[derive(Debug, Clone, PartialEq)]
struct Compiled<F> {
    text: Option<F>,
    spatial: Option<SpatialPredicate>,
    op: Option<LogicalOp>,
    subs: Vec<Compiled<F>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    PureText,
    PureSpatial,
    NegatedText,
    Pair(LogicalOp),
    Nested,
}

impl<F> Compiled<F> {
    fn text(text: F) -> Self {
        Compiled {
            text: Some(text),
            spatial: None,
            op: None,
            subs: Vec::new(),
        }
    }

    fn spatial(predicate: SpatialPredicate) -> Self {
        Compiled {
            text: None,
            spatial: Some(predicate),
            op: None,
            subs: Vec::new(),
        }
    }

    fn grouping(op: LogicalOp, subs: Vec<Compiled<F>>) -> Self {
        Compiled {
            text: None,
            spatial: None,
            op: Some(op),
            subs,
        }
    }

    fn shape(&self) -> Shape {
        if !self.subs.is_empty() {
            return Shape::Nested;
        }
        match (&self.text, &self.spatial, self.op) {
            (Some(_), None, None) => Shape::PureText,
            (None, Some(_), None) => Shape::PureSpatial,
            (Some(_), None, Some(LogicalOp::Not)) => Shape::NegatedText,
            (Some(_), Some(_), Some(op)) => Shape::Pair(op),
            _ => Shape::Nested,
        }
    }

    fn is_not_grouping(&self) -> bool {
        self.text.is_none()
            && self.spatial.is_none()
            && self.op == Some(LogicalOp::Not)
            && self.subs.len() == 1
    }
}

pub struct Decomposer<'a, T: QueryTarget> {
    target: &'a T,
}

impl<'a, T: QueryTarget> Decomposer<'a, T> {
    pub fn new(target: &'a T) -> Self {
        Self { target }
    }

    /// Compiles a whole filter tree. Any failure aborts the compilation.
    pub fn compile(&self, node: &FilterNode) -> Result<CompiledQuery> {
        debug!(
            backend = self.target.name(),
            nodes = node.size(),
            "Compiling filter"
        );

        let compiled = self.compile_node(node)?;
        let query = self.finish(compiled);

        debug!(
            backend = self.target.name(),
            depth = query.depth(),
            flattened = query.is_flattened(),
            "Filter compiled"
        );
        Ok(query)
    }

    fn compile_node(&self, node: &FilterNode) -> Result<Compiled<T::Fragment>> {
        match node {
            FilterNode::Comparison(comparison) => {
                Ok(Compiled::text(self.target.comparison(comparison)?))
            }
            FilterNode::IdFilter { ids } => Ok(Compiled::text(self.target.ids(ids)?)),
            FilterNode::Spatial(filter) => {
                if !self.target.supports_spatial() {
                    return Err(CompileError::unsupported(
                        filter.op,
                        format!(
                            "the {} target cannot express spatial predicates",
                            self.target.name()
                        ),
                    ));
                }
                Ok(Compiled::spatial(spatial::compile_filter(filter)?))
            }
            FilterNode::Logical {
                op: LogicalOp::Not,
                operands,
            } => {
                let [operand] = operands.as_slice() else {
                    return Err(CompileError::InvalidFilter(format!(
                        "NOT takes exactly one operand, got {}",
                        operands.len()
                    )));
                };
                let compiled = self.compile_node(operand)?;
                Ok(self.negate(compiled))
            }
            FilterNode::Logical { op, operands } => {
                if operands.len() < 2 {
                    return Err(CompileError::InvalidFilter(format!(
                        "{op} needs at least two operands, got {}",
                        operands.len()
                    )));
                }
                let compiled = operands
                    .iter()
                    .map(|operand| self.compile_node(operand))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.junction(*op, compiled))
            }
        }
    }

    fn junction(
        &self,
        op: LogicalOp,
        compiled: Vec<Compiled<T::Fragment>>,
    ) -> Compiled<T::Fragment> {
        let shapes: Vec<Shape> = compiled.iter().map(Compiled::shape).collect();
        let texts = shapes.iter().filter(|s| **s == Shape::PureText).count();
        let spatials = shapes.iter().filter(|s| **s == Shape::PureSpatial).count();

        if texts == compiled.len() {
            let parts: Vec<T::Fragment> = compiled.iter().filter_map(|c| c.text.clone()).collect();
            if let Some(fused) = self.target.combine(op, &parts) {
                trace!(%op, operands = parts.len(), "Fused textual operands");
                return Compiled::text(fused);
            }
            debug!(
                %op,
                backend = self.target.name(),
                "Target cannot fuse operands; splitting into sub-queries"
            );
        } else if spatials == compiled.len() {
            let predicates = compiled.into_iter().filter_map(|c| c.spatial).collect();
            trace!(%op, "Merged spatial operands into one chain");
            return Compiled::spatial(spatial::merge(op, predicates));
        } else if texts == 1 && texts + spatials == compiled.len() {
            let mut text = None;
            let mut predicates = Vec::with_capacity(spatials);
            for operand in compiled {
                if let Some(predicate) = operand.spatial {
                    predicates.push(predicate);
                } else if let Some(fragment) = operand.text {
                    text = Some(self.target.group(fragment));
                }
            }
            trace!(%op, spatial = predicates.len(), "Paired textual and spatial operands");
            return Compiled {
                text,
                spatial: Some(spatial::merge(op, predicates)),
                op: Some(op),
                subs: Vec::new(),
            };
        }

        self.split(op, compiled)
    }

    /// First standalone operand becomes the primary, the rest sub-queries.
    fn split(&self, op: LogicalOp, mut compiled: Vec<Compiled<T::Fragment>>) -> Compiled<T::Fragment> {
        let primary = compiled.iter().position(|c| match c.shape() {
            Shape::PureText | Shape::PureSpatial => true,
            Shape::Pair(pair_op) => pair_op == op,
            Shape::NegatedText | Shape::Nested => false,
        });

        let (text, spatial) = match primary {
            Some(index) => {
                let primary = compiled.remove(index);
                (primary.text, primary.spatial)
            }
            None => (None, None),
        };

        let subs: Vec<_> = compiled
            .into_iter()
            .map(|mut sub| {
                sub.op.get_or_insert(op);
                sub
            })
            .collect();

        trace!(
            %op,
            primary = ?primary,
            sub_queries = subs.len(),
            "Split operands into sub-queries"
        );

        Compiled {
            text,
            spatial,
            op: Some(op),
            subs,
        }
    }

    fn negate(&self, mut compiled: Compiled<T::Fragment>) -> Compiled<T::Fragment> {
        if compiled.subs.is_empty() {
            return self.negate_branch(compiled);
        }

        if compiled.is_not_grouping() {
            if let Some(inner) = compiled.subs.pop() {
                trace!("Cancelled double negation of a sub-query");
                return inner;
            }
        }

        let op = compiled.op;
        compiled.subs = std::mem::take(&mut compiled.subs)
            .into_iter()
            .map(|sub| self.negate_sub(sub, op))
            .collect();
        compiled
    }

    /// Negates a sub-query of a split node. The negation lives in the
    /// sub-query's own operator; `parent` is the operator it falls back to
    /// when an earlier negation cancels.
    fn negate_sub(
        &self,
        mut sub: Compiled<T::Fragment>,
        parent: Option<LogicalOp>,
    ) -> Compiled<T::Fragment> {
        if sub.op == Some(LogicalOp::Not) {
            if sub.is_not_grouping() {
                if let Some(mut inner) = sub.subs.pop() {
                    inner.op = inner.op.or(parent);
                    return inner;
                }
            }
            sub.op = parent;
            return sub;
        }

        if !sub.subs.is_empty() {
            return Compiled::grouping(LogicalOp::Not, vec![sub]);
        }
        let has_spatial = sub.spatial.is_some();
        match (sub.text.take(), has_spatial) {
            (Some(text), false) => match self.target.negate(text) {
                Negation::Fused(fragment) => Compiled {
                    text: Some(fragment),
                    ..sub
                },
                Negation::Deferred(fragment) => Compiled {
                    text: Some(fragment),
                    op: Some(LogicalOp::Not),
                    ..sub
                },
            },
            (Some(text), true) => Compiled::grouping(
                LogicalOp::Not,
                vec![Compiled {
                    text: Some(text),
                    ..sub
                }],
            ),
            (None, _) => Compiled {
                op: Some(LogicalOp::Not),
                ..sub
            },
        }
    }

    /// Negates one branch without looking inside its sub-queries.
    fn negate_branch(&self, compiled: Compiled<T::Fragment>) -> Compiled<T::Fragment> {
        if compiled.subs.is_empty() {
            return match (compiled.text, compiled.spatial) {
                (Some(text), None) => self.negate_text(text, compiled.op),
                (None, Some(predicate)) => Compiled {
                    text: None,
                    spatial: Some(spatial::negate(predicate)),
                    op: compiled.op,
                    subs: Vec::new(),
                },
                (text, spatial) => Compiled::grouping(
                    LogicalOp::Not,
                    vec![Compiled {
                        text,
                        spatial,
                        op: compiled.op,
                        subs: Vec::new(),
                    }],
                ),
            };
        }
        Compiled::grouping(LogicalOp::Not, vec![compiled])
    }

    fn negate_text(&self, text: T::Fragment, op: Option<LogicalOp>) -> Compiled<T::Fragment> {
        if op == Some(LogicalOp::Not) {
            return Compiled::text(text);
        }
        match self.target.negate(text) {
            Negation::Fused(fragment) => Compiled {
                text: Some(fragment),
                spatial: None,
                op,
                subs: Vec::new(),
            },
            Negation::Deferred(fragment) => Compiled {
                text: Some(fragment),
                spatial: None,
                op: Some(LogicalOp::Not),
                subs: Vec::new(),
            },
        }
    }

    fn finish(&self, compiled: Compiled<T::Fragment>) -> CompiledQuery {
        let main_text = match &compiled.text {
            Some(fragment) => self.target.render(fragment),
            None => self.target.match_all(),
        };
        CompiledQuery {
            main_text,
            spatial_predicate: compiled.spatial,
            logical_operator: compiled.op,
            sub_queries: compiled
                .subs
                .into_iter()
                .map(|sub| self.finish(sub))
                .collect(),
        }
    }
}
