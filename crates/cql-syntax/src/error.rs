use crate::parser::Rule;
use pest::error::LineColLocation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CqlError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid literal '{literal}': {reason}")]
    InvalidLiteral { literal: String, reason: String },

    #[error("Unknown distance units: {0}")]
    UnknownUnits(String),
}

impl CqlError {
    pub(crate) fn syntax(at: (usize, usize), message: impl Into<String>) -> Self {
        CqlError::Syntax {
            line: at.0,
            column: at.1,
            message: message.into(),
        }
    }

    pub(crate) fn literal(literal: &str, reason: impl ToString) -> Self {
        CqlError::InvalidLiteral {
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<pest::error::Error<Rule>> for CqlError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            LineColLocation::Pos(pos) => pos,
            LineColLocation::Span(start, _) => start,
        };
        CqlError::Syntax {
            line,
            column,
            message: err.variant.message().into_owned(),
        }
    }
}
