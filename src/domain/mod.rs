//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - categories and per-category survival shapes (`Category`, `ShapeParams`)
//! - full parameter assignments (`ParameterCombination`) and sweep winners (`FitResult`)
//! - tabular records with the column names downstream tooling reads

pub mod types;

pub use types::*;
