//! SQL target over the `Forms` / `TextValues` attribute-value schema.
//!
//! Each attribute condition joins one more `TextValues` row to the form.
//! Conjunctions merge into a single statement, disjunctions become
//! `UNION`s of statements.

use crate::{
    config::{CompilerConfig, NamespaceTable},
    error::{CompileError, Result},
    query::target::{Negation, QueryTarget},
};
use ast::{Comparator, Condition, Select, SqlFragment, ValueTest};
use model::{Comparison, ComparisonOp, LikeSpec, LogicalOp};
use renderer::{Render, Renderer};
use std::collections::BTreeSet;
use tracing::{trace, warn};

pub mod ast;
pub mod renderer;

pub struct Sql<'a> {
    namespaces: &'a NamespaceTable,
}

impl<'a> Sql<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self {
            namespaces: &config.namespaces,
        }
    }
}

impl QueryTarget for Sql<'_> {
    type Fragment = SqlFragment;

    fn name(&self) -> &'static str {
        "SQL"
    }

    fn comparison(&self, comparison: &Comparison) -> Result<SqlFragment> {
        let condition = compile_condition(comparison, self.namespaces)?;
        Ok(SqlFragment::Select(Select::single(condition)))
    }

    fn ids(&self, ids: &BTreeSet<String>) -> Result<SqlFragment> {
        if ids.is_empty() {
            return Err(CompileError::InvalidFilter(
                "identifier filter without identifiers".to_string(),
            ));
        }
        Ok(SqlFragment::Select(Select::single(Condition::FormIds {
            ids: ids.iter().cloned().collect(),
            negated: false,
        })))
    }

    fn supports_spatial(&self) -> bool {
        false
    }

    fn combine(&self, op: LogicalOp, parts: &[SqlFragment]) -> Option<SqlFragment> {
        match op {
            LogicalOp::And => {
                let mut merged = Select::default();
                for part in parts {
                    match part {
                        SqlFragment::Select(select) => {
                            merged.conditions.extend(select.conditions.iter().cloned())
                        }
                        SqlFragment::Union(_) => return None,
                    }
                }
                Some(SqlFragment::Select(merged))
            }
            LogicalOp::Or => Some(SqlFragment::Union(
                parts
                    .iter()
                    .flat_map(|part| part.branches().iter().cloned())
                    .collect(),
            )),
            LogicalOp::Not => None,
        }
    }

    fn group(&self, part: SqlFragment) -> SqlFragment {
        part
    }

    fn negate(&self, part: SqlFragment) -> Negation<SqlFragment> {
        match part {
            SqlFragment::Select(select) if select.conditions.len() == 1 => {
                Negation::Fused(SqlFragment::Select(invert_all(select)))
            }
            // NOT (a AND b) == (NOT a) OR (NOT b)
            SqlFragment::Select(select) if !select.conditions.is_empty() => {
                trace!(
                    conditions = select.conditions.len(),
                    "Inverted conjunction into a union"
                );
                Negation::Fused(SqlFragment::Union(
                    select
                        .conditions
                        .into_iter()
                        .map(|condition| Select::single(condition.negate()))
                        .collect(),
                ))
            }
            // NOT (a OR b) == (NOT a) AND (NOT b), only for single-condition branches
            SqlFragment::Union(branches) if branches.iter().all(|b| b.conditions.len() == 1) => {
                trace!(branches = branches.len(), "Inverted union into a conjunction");
                Negation::Fused(SqlFragment::Select(Select {
                    conditions: branches
                        .into_iter()
                        .flat_map(|b| b.conditions)
                        .map(Condition::negate)
                        .collect(),
                }))
            }
            other => Negation::Deferred(other),
        }
    }

    fn render(&self, part: &SqlFragment) -> String {
        let mut renderer = Renderer::new();
        part.render(&mut renderer);
        renderer.finish()
    }

    fn match_all(&self) -> String {
        self.render(&SqlFragment::Select(Select::default()))
    }
}

/// Compiles one comparison into a standalone SQL statement.
pub fn compile_comparison(comparison: &Comparison, config: &CompilerConfig) -> Result<String> {
    let target = Sql::new(config);
    let fragment = target.comparison(comparison)?;
    Ok(target.render(&fragment))
}

fn invert_all(select: Select) -> Select {
    Select {
        conditions: select
            .conditions
            .into_iter()
            .map(Condition::negate)
            .collect(),
    }
}

fn compile_condition(comparison: &Comparison, namespaces: &NamespaceTable) -> Result<Condition> {
    let path = namespaces.resolve(&comparison.property)?;

    if comparison.like.is_some() && comparison.op != ComparisonOp::Like {
        warn!(
            property = comparison.property.as_str(),
            op = %comparison.op,
            "Ignoring LIKE tokens on a non-LIKE comparison"
        );
    }

    let value = comparison.value.clone();
    let test = match comparison.op {
        ComparisonOp::Eq => ValueTest::Compare {
            op: Comparator::Eq,
            value,
        },
        ComparisonOp::Neq => ValueTest::Compare {
            op: Comparator::NotEq,
            value,
        },
        ComparisonOp::Gt => ValueTest::Compare {
            op: Comparator::Gt,
            value,
        },
        ComparisonOp::Gte => ValueTest::Compare {
            op: Comparator::GtEq,
            value,
        },
        ComparisonOp::Lt => ValueTest::Compare {
            op: Comparator::Lt,
            value,
        },
        ComparisonOp::Lte => ValueTest::Compare {
            op: Comparator::LtEq,
            value,
        },
        ComparisonOp::Like => {
            let pattern = value.as_str().ok_or_else(|| {
                CompileError::unsupported(
                    ComparisonOp::Like,
                    format!("pattern on '{path}' must be a string, got {value}"),
                )
            })?;
            let (pattern, escaped) = like_pattern(pattern, comparison.like.unwrap_or_default());
            ValueTest::Like {
                pattern,
                escaped,
                negated: false,
            }
        }
        ComparisonOp::IsNull => ValueTest::IsNull { negated: false },
        ComparisonOp::Between => {
            let upper = comparison.upper_value.clone().ok_or_else(|| {
                CompileError::InvalidFilter(format!(
                    "BETWEEN on '{path}' is missing its upper bound"
                ))
            })?;
            ValueTest::Between {
                lower: value,
                upper,
                negated: false,
            }
        }
    };

    Ok(Condition::Attribute { path, test })
}

/// Rewrites a LIKE pattern with SQL wildcards. Returns the pattern and
/// whether it contains backslash escapes.
fn like_pattern(pattern: &str, spec: LikeSpec) -> (String, bool) {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    let mut chars = pattern.chars();

    let mut push_literal = |out: &mut String, c: char| {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
            escaped = true;
        }
        out.push(c);
    };

    while let Some(c) = chars.next() {
        if c == spec.escape {
            let literal = chars.next().unwrap_or(c);
            push_literal(&mut out, literal);
        } else if c == spec.wildcard {
            out.push('%');
        } else if c == spec.single_char {
            out.push('_');
        } else {
            push_literal(&mut out, c);
        }
    }
    (out, escaped)
}
