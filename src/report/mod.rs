//! Reporting utilities: residual tables and top-model summaries.

pub mod format;

pub use format::*;

use crate::data::{ObservedDataPoint, TopModel};
use crate::domain::{BestFitRecord, ModelSummaryRecord, ParameterCombination, ResidualRow};
use crate::error::{AppError, ErrorKind};
use crate::models::{evaluate_dataset, DatasetEvaluation};

/// One residual row per data point of an evaluated combination.
pub fn residual_rows(
    points: &[ObservedDataPoint],
    combination: &ParameterCombination,
    evaluation: &DatasetEvaluation,
    model_identifier: usize,
    model_category: &str,
) -> Vec<ResidualRow> {
    let ParameterCombination {
        alt_func,
        dos,
        non,
        composition,
        switch_fraction,
    } = *combination;

    points
        .iter()
        .zip(&evaluation.points)
        .enumerate()
        .map(|(data_point_identifier, (point, eval))| ResidualRow {
            t1: point.t1,
            t2: point.t2,
            expected_pratio: eval.expected_ratio,
            b_alt: alt_func.b,
            c_alt: alt_func.c,
            d_alt: alt_func.d,
            f_alt: alt_func.f,
            b_dos: dos.b,
            c_dos: dos.c,
            d_dos: dos.d,
            f_dos: dos.f,
            b_non: non.b,
            c_non: non.c,
            d_non: non.d,
            f_non: non.f,
            percent_alt: composition.alt,
            percent_dos: composition.dos,
            percent_non: composition.non,
            percent_switch: switch_fraction,
            observed_pratio: point.observed_ratio,
            residual: eval.residual,
            absolute_residual: eval.absolute_residual,
            model_identifier,
            data_point_identifier,
            model_category: model_category.to_string(),
        })
        .collect()
}

/// Residual tables for a list of fixed models.
#[derive(Debug, Clone)]
pub struct TopModelReport {
    pub rows: Vec<ResidualRow>,
    /// One SSR row per model, in input order.
    pub summaries: Vec<ModelSummaryRecord>,
    /// Lowest finite SSR (first on ties).
    pub minimum: ModelSummaryRecord,
}

/// Evaluate each model against the data; model identifiers are list positions.
pub fn top_model_report(points: &[ObservedDataPoint], models: &[TopModel]) -> Result<TopModelReport, AppError> {
    let mut rows = Vec::with_capacity(points.len() * models.len());
    let mut summaries = Vec::with_capacity(models.len());
    let mut minimum: Option<usize> = None;

    for (model_identifier, model) in models.iter().enumerate() {
        let category = model.family.name();
        let evaluation = evaluate_dataset(points, &model.combination)?;
        let ssr = evaluation.sum_of_squared_residuals;

        rows.extend(residual_rows(
            points,
            &model.combination,
            &evaluation,
            model_identifier,
            category,
        ));
        summaries.push(ModelSummaryRecord::new(
            BestFitRecord::new(model_identifier, &model.combination, ssr),
            category,
        ));

        if ssr.is_finite() && minimum.is_none_or(|m| ssr < summaries[m].sum_of_squared_residuals) {
            minimum = Some(model_identifier);
        }
        log::debug!("Model {model_identifier} ({category}): SSR {ssr}");
    }

    let minimum = minimum.ok_or_else(|| {
        AppError::new(ErrorKind::EmptyResult, "No model produced a finite sum of squared residuals.")
    })?;

    Ok(TopModelReport {
        rows,
        minimum: summaries[minimum].clone(),
        summaries,
    })
}
