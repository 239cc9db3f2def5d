//! Model selection: residual likelihoods and AIC ranking.
//!
//! The likelihood step pools every residual of every model to get one mean
//! and one sample standard deviation, then scores each residual by its tail
//! probability under that normal distribution:
//!
//! ```text
//! p(r) = 1 - Φ(r)   if r > mean
//! p(r) = Φ(r)       otherwise
//! L    = Π p(r)     per model
//! ```
//!
//! AIC is then `2k - 2 ln L`; the lowest value wins.

use std::collections::HashMap;

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use crate::domain::{FamilyKind, LikelihoodRecord, ResidualRow};
use crate::error::{AppError, ErrorKind};

/// Residuals of one model, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResiduals {
    pub model_identifier: usize,
    pub model_category: String,
    pub residuals: Vec<f64>,
}

/// Group residual rows by `model_identifier`, keeping first-seen order.
pub fn group_residuals(rows: &[ResidualRow]) -> Vec<ModelResiduals> {
    let mut order: Vec<ModelResiduals> = Vec::new();
    let mut slot: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        let i = *slot.entry(row.model_identifier).or_insert_with(|| {
            order.push(ModelResiduals {
                model_identifier: row.model_identifier,
                model_category: row.model_category.clone(),
                residuals: Vec::new(),
            });
            order.len() - 1
        });
        order[i].residuals.push(row.residual);
    }
    order
}

/// Built-in families use their likelihood-table spelling (`3_mix_dup`);
/// other categories pass through unchanged.
fn likelihood_category(category: &str) -> String {
    match FamilyKind::from_name(category) {
        Some(kind) => kind.likelihood_name().to_string(),
        None => category.to_string(),
    }
}

/// Likelihood of each model's residuals under the pooled normal.
pub fn residual_likelihoods(groups: &[ModelResiduals]) -> Result<Vec<LikelihoodRecord>, AppError> {
    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.residuals.iter().copied()).collect();
    if pooled.len() < 2 {
        return Err(AppError::config(format!(
            "Need at least 2 residuals to estimate a spread (got {}).",
            pooled.len()
        )));
    }

    let mean = pooled.iter().mean();
    let sd = pooled.iter().std_dev();
    let normal = Normal::new(mean, sd).map_err(|e| {
        AppError::new(
            ErrorKind::Degenerate,
            format!("Residuals do not define a normal distribution (mean={mean}, sd={sd}): {e}"),
        )
    })?;
    log::debug!("Pooled residuals: n={}, mean={mean}, sd={sd}", pooled.len());

    let likelihoods: Vec<f64> = groups
        .iter()
        .map(|g| {
            g.residuals
                .iter()
                .map(|&r| {
                    if r > mean {
                        1.0 - normal.cdf(r)
                    } else {
                        normal.cdf(r)
                    }
                })
                .product()
        })
        .collect();

    let total: f64 = likelihoods.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(AppError::new(
            ErrorKind::Degenerate,
            format!("Likelihoods sum to {total}; cannot normalize."),
        ));
    }

    Ok(groups
        .iter()
        .zip(likelihoods)
        .map(|(g, likelihood)| LikelihoodRecord {
            model_category: likelihood_category(&g.model_category),
            mean,
            sd,
            likelihood,
            normalized_likelihood: likelihood / total,
        })
        .collect())
}

/// Which likelihood column feeds the AIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LikelihoodBasis {
    #[default]
    Actual,
    Normalized,
}

impl LikelihoodBasis {
    /// Prefix of the default report file name.
    pub fn label(self) -> &'static str {
        match self {
            LikelihoodBasis::Actual => "Actual",
            LikelihoodBasis::Normalized => "Normalized",
        }
    }

    fn pick(self, record: &LikelihoodRecord) -> f64 {
        match self {
            LikelihoodBasis::Actual => record.likelihood,
            LikelihoodBasis::Normalized => record.normalized_likelihood,
        }
    }
}

/// `2k - 2 ln L`.
pub fn aic(likelihood: f64, param_count: usize) -> f64 {
    2.0 * param_count as f64 - 2.0 * likelihood.ln()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AicEntry {
    pub model_category: String,
    pub param_count: usize,
    pub likelihood: f64,
    pub aic: f64,
}

/// AIC per model in input order plus the index of the minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct AicRanking {
    pub entries: Vec<AicEntry>,
    pub best: usize,
}

impl AicRanking {
    pub fn best_entry(&self) -> &AicEntry {
        &self.entries[self.best]
    }

    /// AIC values, ascending.
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.entries.iter().map(|e| e.aic).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }
}

/// Parameter counts of the built-in families, looked up by category name.
pub fn default_param_counts(records: &[LikelihoodRecord]) -> Result<Vec<usize>, AppError> {
    records
        .iter()
        .map(|r| {
            FamilyKind::from_name(&r.model_category)
                .map(FamilyKind::param_count)
                .ok_or_else(|| {
                    AppError::config(format!(
                        "Unknown model category '{}'; pass explicit parameter counts.",
                        r.model_category
                    ))
                })
        })
        .collect()
}

/// Compute AIC for every record and pick the lowest.
///
/// Ties keep the first record; `NaN` never wins.
pub fn rank_by_aic(
    records: &[LikelihoodRecord],
    param_counts: &[usize],
    basis: LikelihoodBasis,
) -> Result<AicRanking, AppError> {
    if records.is_empty() {
        return Err(AppError::new(ErrorKind::EmptyResult, "No likelihood records to rank."));
    }
    if records.len() != param_counts.len() {
        return Err(AppError::config(format!(
            "Got {} parameter counts for {} models.",
            param_counts.len(),
            records.len()
        )));
    }

    let entries: Vec<AicEntry> = records
        .iter()
        .zip(param_counts)
        .map(|(r, &k)| {
            let likelihood = basis.pick(r);
            AicEntry {
                model_category: r.model_category.clone(),
                param_count: k,
                likelihood,
                aic: aic(likelihood, k),
            }
        })
        .collect();

    let mut best: Option<usize> = None;
    for (i, e) in entries.iter().enumerate() {
        if e.aic.is_nan() {
            continue;
        }
        if best.is_none_or(|b| e.aic < entries[b].aic) {
            best = Some(i);
        }
    }
    let best = best.ok_or_else(|| {
        AppError::new(ErrorKind::Degenerate, "Every AIC value is NaN.")
    })?;

    Ok(AicRanking { entries, best })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(model: usize, category: &str, residual: f64) -> ResidualRow {
        ResidualRow {
            t1: 0.5,
            t2: 0.1,
            expected_pratio: 1.0 - residual,
            b_alt: 5.0,
            c_alt: 1.0,
            d_alt: 5.0,
            f_alt: 2.0,
            b_dos: -12.0,
            c_dos: 0.6,
            d_dos: -0.03,
            f_dos: 0.03,
            b_non: 0.0,
            c_non: 1.0,
            d_non: 10.01,
            f_non: 0.01,
            percent_alt: 0.0,
            percent_dos: 0.0,
            percent_non: 1.0,
            percent_switch: 0.0,
            observed_pratio: 1.0,
            residual,
            absolute_residual: residual.abs(),
            model_identifier: model,
            data_point_identifier: 0,
            model_category: category.to_string(),
        }
    }

    fn record(category: &str, likelihood: f64) -> LikelihoodRecord {
        LikelihoodRecord {
            model_category: category.to_string(),
            mean: 0.0,
            sd: 1.0,
            likelihood,
            normalized_likelihood: likelihood,
        }
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let rows = vec![row(2, "ind", 0.1), row(1, "3mix_dup", 0.2), row(2, "ind", 0.3)];
        let groups = group_residuals(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].model_identifier, 2);
        assert_eq!(groups[0].residuals, vec![0.1, 0.3]);
        assert_eq!(groups[1].model_category, "3mix_dup");
    }

    #[test]
    fn likelihood_table_spells_three_mix_families_with_underscore() {
        let rows = vec![
            row(0, "3mix_dup", 0.1),
            row(1, "ind", -0.2),
            row(2, "3mix_mut", 0.05),
            row(3, "other", 0.3),
        ];
        let records = residual_likelihoods(&group_residuals(&rows)).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.model_category.as_str()).collect();
        assert_eq!(names, ["3_mix_dup", "ind", "3_mix_mut", "other"]);
        assert_eq!(default_param_counts(&records[..3]).unwrap(), vec![10, 0, 11]);
    }

    #[test]
    fn likelihood_uses_pooled_tails() {
        let rows = vec![row(0, "a", -0.1), row(0, "a", 0.1), row(1, "b", 0.3), row(1, "b", -0.3)];
        let records = residual_likelihoods(&group_residuals(&rows)).unwrap();

        let pooled = [-0.1, 0.1, 0.3, -0.3];
        let mean = 0.0;
        let sd = (pooled.iter().map(|r: &f64| r * r).sum::<f64>() / 3.0).sqrt();
        let normal = Normal::new(mean, sd).unwrap();
        let expected_a = normal.cdf(-0.1) * (1.0 - normal.cdf(0.1));
        let expected_b = (1.0 - normal.cdf(0.3)) * normal.cdf(-0.3);

        assert!((records[0].mean - mean).abs() < 1e-12);
        assert!((records[0].sd - sd).abs() < 1e-12);
        assert!((records[0].likelihood - expected_a).abs() < 1e-12);
        assert!((records[1].likelihood - expected_b).abs() < 1e-12);
        // Smaller residuals are more likely.
        assert!(records[0].likelihood > records[1].likelihood);

        let norm_sum: f64 = records.iter().map(|r| r.normalized_likelihood).sum();
        assert!((norm_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_residuals_are_degenerate() {
        let rows = vec![row(0, "a", 0.2), row(0, "a", 0.2)];
        let err = residual_likelihoods(&group_residuals(&rows)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Degenerate);
    }

    #[test]
    fn aic_formula() {
        assert!((aic(1.0, 3) - 6.0).abs() < 1e-12);
        assert!((aic(0.5, 0) - 2.0 * 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn parameter_counts_resolve_both_spellings() {
        let records = vec![record("3_mix_dup", 0.1), record("ind", 0.1), record("3mix_mut", 0.1)];
        assert_eq!(default_param_counts(&records).unwrap(), vec![10, 0, 11]);
        assert!(default_param_counts(&[record("mystery", 0.1)]).is_err());
    }

    #[test]
    fn ranking_picks_minimum_and_first_on_tie() {
        let records = vec![record("a", 0.01), record("b", 0.02), record("c", 0.02)];
        let ranking = rank_by_aic(&records, &[1, 1, 1], LikelihoodBasis::Actual).unwrap();
        assert_eq!(ranking.best, 1);
        assert_eq!(ranking.best_entry().model_category, "b");

        let sorted = ranking.sorted_values();
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn parameter_penalty_can_flip_the_winner() {
        let records = vec![record("simple", 0.01), record("complex", 0.02)];
        let ranking = rank_by_aic(&records, &[0, 5], LikelihoodBasis::Actual).unwrap();
        assert_eq!(ranking.best_entry().model_category, "simple");
    }

    #[test]
    fn mismatched_counts_rejected() {
        let records = vec![record("a", 0.1)];
        assert!(rank_by_aic(&records, &[1, 2], LikelihoodBasis::Actual).is_err());
    }
}
