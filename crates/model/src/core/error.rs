use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown distance units: {0}")]
    UnknownUnits(String),
}
