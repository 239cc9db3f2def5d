//! Grid JSON input and run-summary JSON output.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::BestFitRecord;
use crate::error::AppError;
use crate::fit::{ModelFamily, SearchOutcome};

/// Portable record of one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummaryFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub family: String,
    pub evaluated: usize,
    pub pruned_dos: usize,
    pub non_finite: usize,
    pub elapsed_secs: f64,
    pub best: BestFitRecord,
}

impl FitSummaryFile {
    pub fn from_outcome(outcome: &SearchOutcome, generated_at: DateTime<Local>) -> Self {
        Self {
            tool: "dupret".to_string(),
            generated_at,
            family: outcome.family.clone(),
            evaluated: outcome.evaluated,
            pruned_dos: outcome.pruned_dos,
            non_finite: outcome.non_finite,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            best: BestFitRecord::from(&outcome.best),
        }
    }
}

/// Read a custom model family from a grid JSON file.
///
/// Only parsing happens here; `ParameterGrid::validate` runs before the sweep.
pub fn read_grid_json(path: &Path) -> Result<ModelFamily, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open grid JSON '{}': {e}", path.display())))?;
    let family: ModelFamily = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid grid JSON '{}': {e}", path.display())))?;
    Ok(family)
}

pub fn write_summary_json(path: &Path, summary: &FitSummaryFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::io(format!("Failed to write summary JSON: {e}")))?;
    log::info!("Wrote run summary to {}", path.display());
    Ok(())
}
