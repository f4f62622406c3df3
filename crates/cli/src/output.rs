use crate::error::CliError;
use serde::Serialize;

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(CliError::JsonSerialize)
}

pub async fn write_json(json: String, path: String) -> Result<(), CliError> {
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub fn print_json(json: &str) {
    println!("{json}");
}
