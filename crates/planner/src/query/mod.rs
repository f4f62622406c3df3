pub mod compiled;
pub mod decompose;
pub mod spatial;
pub mod sql;
pub mod target;
pub mod text;
