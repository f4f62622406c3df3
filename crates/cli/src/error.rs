use cql_syntax::CqlError;
use planner::error::CompileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    InputRead(#[from] std::io::Error),

    #[error("Failed to parse the filter as CQL: {0}")]
    CqlParse(#[from] CqlError),

    #[error("Failed to deserialize JSON input: {0}")]
    JsonDeserialize(#[from] serde_json::Error),

    #[error("Failed to compile the filter: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Invalid compilation target: {0}")]
    InvalidTarget(String),

    #[error("No filter given: pass --cql or --filter")]
    MissingInput,
}
