//! Fixed input tables: the observed lineage pairs and the top-model table.

pub mod observed;
pub mod top_models;

pub use observed::*;
pub use top_models::*;
