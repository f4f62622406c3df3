use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/cql.pest"]
pub struct CqlParser;
