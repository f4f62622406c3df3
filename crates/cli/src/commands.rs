use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter into a query tree
    Compile {
        #[command(flatten)]
        input: FilterInput,

        #[arg(long, default_value = "text", help = "Query target: text or sql")]
        target: String,

        #[arg(long, help = "Compiler configuration file (JSON)")]
        config: Option<String>,

        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,

        #[arg(
            long,
            help = "If specified, writes the compiled query to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the parsed filter tree as JSON
    Ast {
        #[command(flatten)]
        input: FilterInput,

        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,
    },
}

#[derive(Args)]
pub struct FilterInput {
    #[arg(long, conflicts_with = "filter", help = "Filter written in CQL")]
    pub cql: Option<String>,

    #[arg(long, help = "File holding the filter")]
    pub filter: Option<String>,

    #[arg(
        long,
        requires = "filter",
        help = "Treat the filter file as an already parsed JSON tree, skipping parsing step"
    )]
    pub from_ast: bool,
}
