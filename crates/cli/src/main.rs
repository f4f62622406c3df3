use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use planner::Target;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod input;
mod output;

#[derive(Parser)]
#[command(
    name = "filterc",
    version = "0.1.0",
    about = "Catalog filter compiler"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays valid JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            target,
            config,
            pretty,
            output,
        } => {
            let target: Target = target
                .parse()
                .map_err(|_| CliError::InvalidTarget(target.clone()))?;
            let config = input::load_config(config.as_deref()).await?;
            let node = input::load_filter(&input).await?;

            info!(%target, nodes = node.size(), "Compiling filter");
            let query = planner::compile(&node, target, &config)?;
            let json = output::to_json(&query, pretty)?;

            match output {
                Some(path) => output::write_json(json, path).await?,
                None => output::print_json(&json),
            }
        }
        Commands::Ast { input, pretty } => {
            let node = input::load_filter(&input).await?;
            let json = output::to_json(&node, pretty)?;
            output::print_json(&json);
        }
    }

    Ok(())
}
