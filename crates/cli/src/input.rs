use crate::{commands::FilterInput, error::CliError};
use model::FilterNode;
use planner::config::CompilerConfig;
use tracing::debug;

pub async fn load_filter(input: &FilterInput) -> Result<FilterNode, CliError> {
    if let Some(cql) = &input.cql {
        return Ok(cql_syntax::parse(cql)?);
    }

    let path = input.filter.as_deref().ok_or(CliError::MissingInput)?;
    let source = tokio::fs::read_to_string(path).await?;
    debug!(path, from_ast = input.from_ast, "Loaded filter file");

    if input.from_ast {
        // The file already holds a serialized filter tree
        Ok(serde_json::from_str(&source)?)
    } else {
        Ok(cql_syntax::parse(&source)?)
    }
}

pub async fn load_config(path: Option<&str>) -> Result<CompilerConfig, CliError> {
    match path {
        Some(path) => {
            let source = tokio::fs::read_to_string(path).await?;
            debug!(path, "Loaded compiler configuration");
            Ok(CompilerConfig::from_json(&source)?)
        }
        None => Ok(CompilerConfig::default()),
    }
}
