//! Full-text query target.
//!
//! Comparisons become `field:value` clauses; AND/OR nodes over textual
//! operands become parenthesized boolean expressions. Negation is never
//! written into the text: the compiled node carries a NOT operator and the
//! caller subtracts the matches from the catalog.

use crate::{
    config::{CompilerConfig, SENTINEL_MAX, SENTINEL_MIN},
    error::{CompileError, Result},
    query::target::{Negation, QueryTarget},
};
use model::{Comparison, ComparisonOp, Literal, LogicalOp};
use std::collections::BTreeSet;
use tracing::warn;

pub mod format;

pub struct FullText<'a> {
    config: &'a CompilerConfig,
}

impl<'a> FullText<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }
}

impl QueryTarget for FullText<'_> {
    type Fragment = String;

    fn name(&self) -> &'static str {
        "full-text"
    }

    fn comparison(&self, comparison: &Comparison) -> Result<String> {
        compile_comparison(comparison, self.config)
    }

    fn ids(&self, ids: &BTreeSet<String>) -> Result<String> {
        compile_ids(ids, self.config)
    }

    fn supports_spatial(&self) -> bool {
        true
    }

    fn combine(&self, op: LogicalOp, parts: &[String]) -> Option<String> {
        let separator = format!(" {op} ");
        Some(format!("({})", parts.join(&separator)))
    }

    fn group(&self, part: String) -> String {
        format!("({part})")
    }

    fn negate(&self, part: String) -> Negation<String> {
        Negation::Deferred(part)
    }

    fn render(&self, part: &String) -> String {
        part.clone()
    }

    fn match_all(&self) -> String {
        self.config.match_all.clone()
    }
}

/// Compiles one comparison into a full-text clause.
pub fn compile_comparison(comparison: &Comparison, config: &CompilerConfig) -> Result<String> {
    let property = comparison.property.as_str();
    if property.is_empty() {
        return Err(CompileError::InvalidFilter(format!(
            "{} comparison without a property",
            comparison.op
        )));
    }

    if comparison.like.is_some() && comparison.op != ComparisonOp::Like {
        warn!(
            property,
            op = %comparison.op,
            "Ignoring LIKE tokens on a non-LIKE comparison"
        );
    }

    let value = &comparison.value;
    let clause = match comparison.op {
        ComparisonOp::Eq => format!("{property}:\"{}\"", format::term(value)),
        ComparisonOp::Neq => format!(
            "{} NOT {property}:\"{}\"",
            config.match_all,
            format::term(value)
        ),
        ComparisonOp::Like => {
            let pattern = value.as_str().ok_or_else(|| {
                CompileError::unsupported(
                    ComparisonOp::Like,
                    format!("pattern on '{property}' must be a string, got {value}"),
                )
            })?;
            let spec = comparison.like.unwrap_or_default();
            format!("{property}:{}", format::like_pattern(pattern, spec))
        }
        ComparisonOp::IsNull => format!("{property}:null"),
        ComparisonOp::Gt => lower_bound(property, value, false),
        ComparisonOp::Gte => lower_bound(property, value, true),
        ComparisonOp::Lt => upper_bound(property, value, false),
        ComparisonOp::Lte => upper_bound(property, value, true),
        ComparisonOp::Between => {
            let upper = comparison.upper_value.as_ref().ok_or_else(|| {
                CompileError::InvalidFilter(format!(
                    "BETWEEN on '{property}' is missing its upper bound"
                ))
            })?;
            format!(
                "{}{}",
                lower_bound(property, value, true),
                upper_bound(property, upper, true)
            )
        }
    };
    Ok(clause)
}

/// Compiles an identifier filter against the configured id field.
pub fn compile_ids(ids: &BTreeSet<String>, config: &CompilerConfig) -> Result<String> {
    let clauses: Vec<String> = ids
        .iter()
        .map(|id| format!("{}:\"{id}\"", config.id_property))
        .collect();

    match clauses.len() {
        0 => Err(CompileError::InvalidFilter(
            "identifier filter without identifiers".to_string(),
        )),
        1 => Ok(clauses.concat()),
        _ => Ok(format!("({})", clauses.join(" OR "))),
    }
}

fn lower_bound(property: &str, value: &Literal, inclusive: bool) -> String {
    let (open, close) = brackets(inclusive);
    format!("{property}:{open}{}  {SENTINEL_MAX}{close}", format::bound(value))
}

fn upper_bound(property: &str, value: &Literal, inclusive: bool) -> String {
    let (open, close) = brackets(inclusive);
    format!("{property}:{open}{SENTINEL_MIN} {}{close}", format::bound(value))
}

fn brackets(inclusive: bool) -> (char, char) {
    if inclusive { ('[', ']') } else { ('{', '}') }
}
