//! Evaluate a full combination against observed data points.

use crate::data::ObservedDataPoint;
use crate::domain::{Category, CategoryTriple, ParameterCombination, PointEvaluation};
use crate::error::AppError;
use crate::models::{expected_ratio, residual, survival_probability};

/// All per-point evaluations of one combination plus its SSR.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEvaluation {
    pub points: Vec<PointEvaluation>,
    pub sum_of_squared_residuals: f64,
}

/// Survival of each category at `time`.
pub fn category_survival(combination: &ParameterCombination, time: f64) -> CategoryTriple<f64> {
    let survival = |category: Category| survival_probability(&combination.shape(category), time);
    CategoryTriple::new(
        survival(Category::AltFunc),
        survival(Category::Dos),
        survival(Category::Non),
    )
}

/// Score a ratio against its observation.
///
/// Shared with the sweep, which feeds pre-tabulated survivals instead of
/// recomputing them per combination.
pub fn score_point(
    survival_t1: CategoryTriple<f64>,
    survival_t2: CategoryTriple<f64>,
    combination: &ParameterCombination,
    observed_ratio: f64,
) -> Result<PointEvaluation, AppError> {
    let expected = expected_ratio(
        &survival_t1,
        &survival_t2,
        &combination.composition,
        combination.switch_fraction,
    )?;
    let signed = residual(observed_ratio, expected);
    Ok(PointEvaluation {
        survival_t1,
        survival_t2,
        expected_ratio: expected,
        residual: signed,
        absolute_residual: signed.abs(),
    })
}

/// Evaluate one data point (six survival calls, one ratio, one residual).
pub fn evaluate_point(
    point: &ObservedDataPoint,
    combination: &ParameterCombination,
) -> Result<PointEvaluation, AppError> {
    score_point(
        category_survival(combination, point.t1),
        category_survival(combination, point.t2),
        combination,
        point.observed_ratio,
    )
}

/// Evaluate every data point and accumulate the sum of squared residuals.
pub fn evaluate_dataset(
    points: &[ObservedDataPoint],
    combination: &ParameterCombination,
) -> Result<DatasetEvaluation, AppError> {
    let mut evaluations = Vec::with_capacity(points.len());
    let mut ssr = 0.0;
    for point in points {
        let eval = evaluate_point(point, combination)?;
        ssr += eval.absolute_residual * eval.absolute_residual;
        evaluations.push(eval);
    }
    Ok(DatasetEvaluation {
        points: evaluations,
        sum_of_squared_residuals: ssr,
    })
}
