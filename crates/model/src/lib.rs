pub mod core;

pub use crate::core::{
    error::ModelError,
    filter::{Comparison, FilterNode, LikeSpec, SpatialFilter},
    geometry::{Coord, Geometry, Units},
    literal::Literal,
    operator::{ComparisonOp, LogicalOp, SpatialOp},
};
