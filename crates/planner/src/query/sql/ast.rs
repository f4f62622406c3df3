//! Defines the AST for statements over the attribute-value schema.
//!
//! Every statement selects `id, catalog` from `Forms`, joined to one
//! aliased `TextValues` row per attribute condition.

use model::Literal;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlFragment {
    /// One statement whose conditions are all AND-ed.
    Select(Select),

    /// `(SELECT ...) UNION (SELECT ...)`, each branch independent.
    Union(Vec<Select>),
}

impl SqlFragment {
    /// Statements of this fragment, one per UNION branch.
    pub fn branches(&self) -> &[Select] {
        match self {
            SqlFragment::Select(select) => std::slice::from_ref(select),
            SqlFragment::Union(branches) => branches,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// Conjunction forming the WHERE clause, in filter order.
    pub conditions: Vec<Condition>,
}

impl Select {
    pub fn single(condition: Condition) -> Self {
        Select {
            conditions: vec![condition],
        }
    }

    /// Number of `TextValues` aliases the statement joins.
    pub fn join_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.uses_alias()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Test on one attribute row: `vN.path = '<path>' AND <test> AND vN.form = id`.
    Attribute { path: String, test: ValueTest },

    /// `id IN (...)` on the form itself.
    FormIds { ids: Vec<String>, negated: bool },
}

impl Condition {
    pub fn uses_alias(&self) -> bool {
        matches!(self, Condition::Attribute { .. })
    }

    /// Inverts the condition in place.
    pub fn negate(self) -> Self {
        match self {
            Condition::Attribute { path, test } => Condition::Attribute {
                path,
                test: test.negate(),
            },
            Condition::FormIds { ids, negated } => Condition::FormIds {
                ids,
                negated: !negated,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueTest {
    Compare { op: Comparator, value: Literal },
    Like {
        pattern: String,
        /// Pattern contains backslash escapes and needs an ESCAPE clause.
        escaped: bool,
        negated: bool,
    },
    IsNull { negated: bool },
    Between {
        lower: Literal,
        upper: Literal,
        negated: bool,
    },
}

impl ValueTest {
    pub fn negate(self) -> Self {
        match self {
            ValueTest::Compare { op, value } => ValueTest::Compare {
                op: op.inverse(),
                value,
            },
            ValueTest::Like {
                pattern,
                escaped,
                negated,
            } => ValueTest::Like {
                pattern,
                escaped,
                negated: !negated,
            },
            ValueTest::IsNull { negated } => ValueTest::IsNull { negated: !negated },
            ValueTest::Between {
                lower,
                upper,
                negated,
            } => ValueTest::Between {
                lower,
                upper,
                negated: !negated,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,    // =
    NotEq, // !=
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=
}

impl Comparator {
    pub fn inverse(self) -> Self {
        match self {
            Comparator::Eq => Comparator::NotEq,
            Comparator::NotEq => Comparator::Eq,
            Comparator::Lt => Comparator::GtEq,
            Comparator::LtEq => Comparator::Gt,
            Comparator::Gt => Comparator::LtEq,
            Comparator::GtEq => Comparator::Lt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::NotEq => "!=",
            Comparator::Lt => "<",
            Comparator::LtEq => "<=",
            Comparator::Gt => ">",
            Comparator::GtEq => ">=",
        }
    }
}
