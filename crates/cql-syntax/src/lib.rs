//! CQL text front end: parses catalog filter expressions into `FilterNode`
//! trees.
//!
//! ```text
//! Title = 'VM' AND (Abstract LIKE 'cloud%' OR INTERSECTS(Geometry, POINT(4 50)))
//! ```

pub mod builder;
pub mod error;
pub mod parser;

pub use builder::parse;
pub use error::CqlError;
