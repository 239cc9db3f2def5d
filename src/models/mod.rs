//! Survival / retention model implementations.
//!
//! Everything here is a small pure function so the sweep, the residual table
//! and the surface export all share one evaluation path.

pub mod evaluation;
pub mod ratio;
pub mod surface;
pub mod survival;

pub use evaluation::*;
pub use ratio::*;
pub use surface::*;
pub use survival::*;
