//! `dup-retention` library crate.
//!
//! The binary (`dupret`) is a thin wrapper around this library so that the
//! survival model, the grid search and the selection steps are testable
//! without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod models;
pub mod report;
