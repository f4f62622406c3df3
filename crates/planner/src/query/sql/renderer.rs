//! Defines the rendering trait and context for converting the SQL AST to text.

use crate::query::sql::ast::{Condition, Select, SqlFragment, ValueTest};
use model::Literal;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL text and the join alias counter of the statement
/// being rendered. The counter restarts for every `SELECT`.
#[derive(Debug, Default)]
pub struct Renderer {
    pub sql: String,
    alias: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the renderer and returns the final SQL string.
    pub fn finish(self) -> String {
        self.sql
    }

    fn begin_statement(&mut self) {
        self.alias = 0;
    }

    fn next_alias(&mut self) -> String {
        self.alias += 1;
        format!("v{}", self.alias)
    }

    fn push_literal(&mut self, value: &Literal) {
        self.push_quoted(&value.to_string());
    }

    fn push_quoted(&mut self, value: &str) {
        self.sql.push('\'');
        self.sql.push_str(&value.replace('\'', "''"));
        self.sql.push('\'');
    }
}

impl Render for SqlFragment {
    fn render(&self, r: &mut Renderer) {
        match self {
            SqlFragment::Select(select) => select.render(r),
            SqlFragment::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(" UNION ");
                    }
                    r.sql.push('(');
                    branch.render(r);
                    r.sql.push(')');
                }
            }
        }
    }
}

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.begin_statement();

        // 1. SELECT ... FROM
        r.sql.push_str("SELECT DISTINCT id, catalog FROM Forms");
        for i in 1..=self.join_count() {
            r.sql.push_str(&format!(", TextValues v{i}"));
        }

        // 2. WHERE
        for (i, condition) in self.conditions.iter().enumerate() {
            r.sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            condition.render(r);
        }
    }
}

impl Render for Condition {
    fn render(&self, r: &mut Renderer) {
        match self {
            Condition::Attribute { path, test } => {
                let alias = r.next_alias();
                r.sql.push_str(&format!("{alias}.path = "));
                r.push_quoted(path);
                r.sql.push_str(" AND ");
                render_test(test, &alias, r);
                r.sql.push_str(&format!(" AND {alias}.form = id"));
            }
            Condition::FormIds { ids, negated } => {
                r.sql
                    .push_str(if *negated { "id NOT IN (" } else { "id IN (" });
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    r.push_quoted(id);
                }
                r.sql.push(')');
            }
        }
    }
}

fn render_test(test: &ValueTest, alias: &str, r: &mut Renderer) {
    r.sql.push_str(&format!("{alias}.value "));
    match test {
        ValueTest::Compare { op, value } => {
            r.sql.push_str(op.as_str());
            r.sql.push(' ');
            r.push_literal(value);
        }
        ValueTest::Like {
            pattern,
            escaped,
            negated,
        } => {
            r.sql.push_str(if *negated { "NOT LIKE " } else { "LIKE " });
            r.push_quoted(pattern);
            if *escaped {
                r.sql.push_str(" ESCAPE '\\'");
            }
        }
        ValueTest::IsNull { negated } => {
            r.sql
                .push_str(if *negated { "IS NOT NULL" } else { "IS NULL" });
        }
        ValueTest::Between {
            lower,
            upper,
            negated,
        } => {
            r.sql
                .push_str(if *negated { "NOT BETWEEN " } else { "BETWEEN " });
            r.push_literal(lower);
            r.sql.push_str(" AND ");
            r.push_literal(upper);
        }
    }
}
