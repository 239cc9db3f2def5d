//! Input/output helpers.
//!
//! - CSV tables for best fits, residuals, likelihoods and surfaces (`export`)
//! - CSV readers feeding the likelihood and AIC steps (`ingest`)
//! - grid JSON in, run-summary JSON out (`config`)

pub mod config;
pub mod export;
pub mod ingest;

pub use config::*;
pub use export::*;
pub use ingest::*;
