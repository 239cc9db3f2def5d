//! Grid-search fitting and model ranking.
//!
//! Responsibilities:
//!
//! - describe model families as parameter grids (presets or JSON)
//! - validate grids and prune implausible Dos shapes before the sweep
//! - evaluate every combination (parallel) and keep the minimum SSR
//! - turn residuals into likelihoods and rank families by AIC

pub mod families;
pub mod grid;
pub mod search;
pub mod selection;

pub use families::*;
pub use grid::*;
pub use search::*;
pub use selection::*;
