pub mod error;
pub mod filter;
pub mod geometry;
pub mod literal;
pub mod operator;
