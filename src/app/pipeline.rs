//! Shared "fit pipeline" logic used by the `fit` and `evaluate` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve family -> load data -> sweep -> re-evaluate winner -> residual rows

use crate::data::{observed_dataset, ObservedDataPoint};
use crate::domain::{FitConfig, GridSource, ResidualRow, SearchOptions};
use crate::error::AppError;
use crate::fit::{grid_search, preset, ModelFamily, SearchOutcome};
use crate::io::read_grid_json;
use crate::models::{evaluate_dataset, DatasetEvaluation};
use crate::report::residual_rows;

/// All computed outputs of a single sweep.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub family: ModelFamily,
    pub points: Vec<ObservedDataPoint>,
    pub outcome: SearchOutcome,
    /// Per-point evaluation of the winning combination.
    pub evaluation: DatasetEvaluation,
    pub residuals: Vec<ResidualRow>,
}

pub fn resolve_family(source: &GridSource) -> Result<ModelFamily, AppError> {
    match source {
        GridSource::Preset(kind) => Ok(preset(*kind)),
        GridSource::File(path) => read_grid_json(path),
    }
}

/// Execute the full pipeline for a `fit` config.
pub fn run_fit(config: &FitConfig) -> Result<FitRun, AppError> {
    let family = resolve_family(&config.grid)?;
    run_family(family, &config.search)
}

/// Sweep an already resolved family against the built-in dataset.
pub fn run_family(family: ModelFamily, search: &SearchOptions) -> Result<FitRun, AppError> {
    let points = observed_dataset()?;
    let outcome = grid_search(&family, &points, search)?;

    let evaluation = evaluate_dataset(&points, &outcome.best.combination)?;
    let residuals = residual_rows(
        &points,
        &outcome.best.combination,
        &evaluation,
        outcome.best.model_number,
        &family.name,
    );

    Ok(FitRun {
        family,
        points,
        outcome,
        evaluation,
        residuals,
    })
}
