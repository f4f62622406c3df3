use thiserror::Error;

/// Failures raised while compiling a filter tree. Any of these aborts the
/// whole compilation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported operator {operator}: {context}")]
    UnsupportedOperator { operator: String, context: String },

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Invalid property path: {0}")]
    InvalidPropertyPath(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl CompileError {
    pub fn unsupported(operator: impl ToString, context: impl Into<String>) -> Self {
        CompileError::UnsupportedOperator {
            operator: operator.to_string(),
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
