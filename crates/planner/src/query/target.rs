//! Defines the `QueryTarget` trait for back-end specific query text.

use crate::error::Result;
use model::{Comparison, LogicalOp};
use std::{collections::BTreeSet, fmt::Debug};

/// Outcome of negating a textual fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Negation<F> {
    /// The target expressed the negation inside the fragment itself.
    Fused(F),

    /// The fragment is unchanged; the caller must subtract it, signalled
    /// by a NOT logical operator on the compiled node.
    Deferred(F),
}

/// A query language the decomposer can emit.
///
/// `Fragment` is the target's textual predicate before rendering, so that
/// targets able to merge predicates (SQL conjunctions) can do so while the
/// tree is still being walked.
pub trait QueryTarget {
    type Fragment: Clone + Debug + PartialEq;

    /// Returns the name of the target (e.g. "full-text", "SQL").
    fn name(&self) -> &'static str;

    /// Compiles one comparison leaf.
    fn comparison(&self, comparison: &Comparison) -> Result<Self::Fragment>;

    /// Compiles an identifier filter leaf.
    fn ids(&self, ids: &BTreeSet<String>) -> Result<Self::Fragment>;

    /// Whether spatial predicates can accompany this target's text.
    fn supports_spatial(&self) -> bool;

    /// Fuses the fragments of an AND/OR node into one fragment, or returns
    /// `None` when the target cannot express the combination in place.
    fn combine(&self, op: LogicalOp, parts: &[Self::Fragment]) -> Option<Self::Fragment>;

    /// Wraps the lone textual operand of a text + spatial pair.
    fn group(&self, part: Self::Fragment) -> Self::Fragment;

    fn negate(&self, part: Self::Fragment) -> Negation<Self::Fragment>;

    fn render(&self, part: &Self::Fragment) -> String;

    /// Text standing for every document in the catalog.
    fn match_all(&self) -> String;
}
