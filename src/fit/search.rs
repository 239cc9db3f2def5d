//! Exhaustive grid search for the minimum-SSR combination of one family.
//!
//! Survivals only depend on one category's shape and one time, so they are
//! tabulated once per (shape, data point) before the sweep. The sweep itself
//! is a parallel map over flat enumeration indices followed by a
//! deterministic min-reduction:
//!
//! - a finite score beats a non-finite one
//! - a lower score wins
//! - equal scores keep the lower index (first in enumeration order)
//!
//! which makes the winner independent of thread count and scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::data::ObservedDataPoint;
use crate::domain::{CategoryTriple, FitResult, SearchOptions, ShapeParams};
use crate::error::{AppError, ErrorKind};
use crate::fit::grid::{ModelFamily, SweepPlan};
use crate::models::{score_point, survival_probability};

/// Result of a completed sweep.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub family: String,
    pub best: FitResult,
    /// Combinations scored (after Dos pruning).
    pub evaluated: usize,
    /// Dos `(b, c, d)` triples removed before the sweep.
    pub pruned_dos: usize,
    /// Combinations whose score was `NaN`/`inf`.
    pub non_finite: usize,
    pub elapsed: Duration,
}

/// Running minimum of a (partial) sweep.
#[derive(Debug, Clone, Copy, Default)]
struct SearchState {
    best: Option<(usize, f64)>,
    evaluated: usize,
    non_finite: usize,
    /// Finite scores rejected by the ceiling.
    above_ceiling: usize,
}

impl SearchState {
    fn merge(self, other: SearchState) -> SearchState {
        let best = match (self.best, other.best) {
            (None, b) | (b, None) => b,
            (Some(a), Some(b)) => Some(if beats(b, a) { b } else { a }),
        };
        SearchState {
            best,
            evaluated: self.evaluated + other.evaluated,
            non_finite: self.non_finite + other.non_finite,
            above_ceiling: self.above_ceiling + other.above_ceiling,
        }
    }

    fn single(index: usize, ssr: f64, ceiling: Option<f64>) -> SearchState {
        let mut state = SearchState {
            evaluated: 1,
            ..SearchState::default()
        };
        if !ssr.is_finite() {
            state.non_finite = 1;
        } else if ceiling.is_some_and(|c| ssr >= c) {
            state.above_ceiling = 1;
        } else {
            state.best = Some((index, ssr));
        }
        state
    }
}

/// `true` when `a` should replace `b` as the running minimum.
fn beats(a: (usize, f64), b: (usize, f64)) -> bool {
    a.1 < b.1 || (a.1 == b.1 && a.0 < b.0)
}

/// Survival of every shape at every data point's `(t1, t2)`.
struct SurvivalTable {
    /// `[shape][point] -> (S(t1), S(t2))`
    alt: Vec<Vec<(f64, f64)>>,
    dos: Vec<Vec<(f64, f64)>>,
    non: Vec<Vec<(f64, f64)>>,
}

impl SurvivalTable {
    fn build(plan: &SweepPlan, points: &[ObservedDataPoint]) -> Self {
        let tabulate = |shapes: &[ShapeParams]| -> Vec<Vec<(f64, f64)>> {
            shapes
                .par_iter()
                .map(|shape| {
                    points
                        .iter()
                        .map(|p| (survival_probability(shape, p.t1), survival_probability(shape, p.t2)))
                        .collect()
                })
                .collect()
        };
        Self {
            alt: tabulate(&plan.alt_shapes),
            dos: tabulate(&plan.dos_shapes),
            non: tabulate(&plan.non_shapes),
        }
    }
}

/// Sweep a family's grid against the observed data.
pub fn grid_search(
    family: &ModelFamily,
    points: &[ObservedDataPoint],
    opts: &SearchOptions,
) -> Result<SearchOutcome, AppError> {
    let started = Instant::now();
    family.grid.validate()?;

    if points.is_empty() {
        return Err(AppError::new(ErrorKind::EmptyResult, "No data points to fit."));
    }
    if let Some(ceiling) = opts.ssr_ceiling
        && !(ceiling.is_finite() && ceiling > 0.0)
    {
        return Err(AppError::config(format!(
            "SSR ceiling must be finite and > 0 (got {ceiling})."
        )));
    }

    let plan = SweepPlan::new(&family.grid)?;
    if plan.is_empty() {
        let reason = if plan.dos_shapes.is_empty() && plan.pruned_dos > 0 {
            "every Dos shape was pruned by the hazard rule"
        } else {
            "at least one axis is empty"
        };
        return Err(AppError::new(
            ErrorKind::EmptyResult,
            format!("Family '{}' has no combinations to evaluate: {reason}.", family.name),
        ));
    }

    log::info!(
        "Sweeping '{}': {} combinations ({} Dos triples pruned), {} data points",
        family.name,
        plan.len(),
        plan.pruned_dos,
        points.len()
    );

    let table = SurvivalTable::build(&plan, points);
    log::debug!(
        "Tabulated survivals for {} Alt, {} Dos, {} Non shapes",
        table.alt.len(),
        table.dos.len(),
        table.non.len()
    );

    let cancelled = AtomicBool::new(false);
    let state = (0..plan.len())
        .into_par_iter()
        .map(|index| {
            if let Some(limit) = opts.deadline
                && (cancelled.load(Ordering::Relaxed) || started.elapsed() > limit)
            {
                cancelled.store(true, Ordering::Relaxed);
                return Err(AppError::new(
                    ErrorKind::Cancelled,
                    format!(
                        "Sweep of '{}' exceeded its deadline of {:.1}s.",
                        family.name,
                        limit.as_secs_f64()
                    ),
                ));
            }
            let ssr = score_index(&plan, &table, points, index)?;
            Ok(SearchState::single(index, ssr, opts.ssr_ceiling))
        })
        .try_reduce(SearchState::default, |a, b| Ok(a.merge(b)))?;

    let elapsed = started.elapsed();
    if state.non_finite > 0 {
        log::debug!("{} combinations scored non-finite", state.non_finite);
    }

    let Some((index, ssr)) = state.best else {
        return Err(if state.non_finite == state.evaluated {
            AppError::new(
                ErrorKind::Degenerate,
                format!(
                    "Every combination of '{}' produced a non-finite score.",
                    family.name
                ),
            )
        } else {
            AppError::new(
                ErrorKind::EmptyResult,
                format!(
                    "No combination of '{}' scored below the SSR ceiling ({} above it).",
                    family.name, state.above_ceiling
                ),
            )
        });
    };

    log::info!(
        "Best '{}' combination #{index} with SSR {ssr:.6} ({:.2}s)",
        family.name,
        elapsed.as_secs_f64()
    );

    Ok(SearchOutcome {
        family: family.name.clone(),
        best: FitResult {
            model_number: index,
            combination: plan.combination(index),
            sum_of_squared_residuals: ssr,
        },
        evaluated: state.evaluated,
        pruned_dos: plan.pruned_dos,
        non_finite: state.non_finite,
        elapsed,
    })
}

/// SSR of the combination at `index`, using tabulated survivals.
fn score_index(
    plan: &SweepPlan,
    table: &SurvivalTable,
    points: &[ObservedDataPoint],
    index: usize,
) -> Result<f64, AppError> {
    let ix = plan.axis_index(index);
    let combination = plan.combination_at(&ix);
    let (alt, dos, non) = (&table.alt[ix.alt], &table.dos[ix.dos], &table.non[ix.non]);

    let mut ssr = 0.0;
    for (p, point) in points.iter().enumerate() {
        let st1 = CategoryTriple::new(alt[p].0, dos[p].0, non[p].0);
        let st2 = CategoryTriple::new(alt[p].1, dos[p].1, non[p].1);
        let eval = score_point(st1, st2, &combination, point.observed_ratio)?;
        ssr += eval.absolute_residual * eval.absolute_residual;
    }
    Ok(ssr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observed_dataset;
    use crate::domain::{Composition, FamilyKind};
    use crate::fit::families::{preset, single_point_grid};
    use crate::models::evaluate_dataset;

    #[test]
    fn merge_prefers_lower_score_then_lower_index() {
        let a = SearchState::single(7, 0.5, None);
        let b = SearchState::single(3, 0.5, None);
        let c = SearchState::single(9, 0.1, None);
        assert_eq!(a.merge(b).best, Some((3, 0.5)));
        assert_eq!(b.merge(a).best, Some((3, 0.5)));
        assert_eq!(a.merge(c).best, Some((9, 0.1)));
    }

    #[test]
    fn non_finite_never_wins() {
        let nan = SearchState::single(0, f64::NAN, None);
        let inf = SearchState::single(1, f64::INFINITY, None);
        let ok = SearchState::single(2, 3.0, None);
        let merged = nan.merge(inf).merge(ok);
        assert_eq!(merged.best, Some((2, 3.0)));
        assert_eq!(merged.non_finite, 2);
        assert_eq!(merged.evaluated, 3);
    }

    #[test]
    fn ceiling_rejects_scores_at_or_above() {
        let state = SearchState::single(0, 1.0, Some(1.0));
        assert_eq!(state.best, None);
        assert_eq!(state.above_ceiling, 1);
    }

    #[test]
    fn independence_matches_direct_evaluation() {
        let data = observed_dataset().unwrap();
        let outcome = grid_search(&preset(FamilyKind::Ind), &data, &SearchOptions::default()).unwrap();
        assert_eq!(outcome.best.model_number, 0);
        assert_eq!(outcome.evaluated, 1);

        let direct = evaluate_dataset(&data, &outcome.best.combination).unwrap();
        assert_eq!(outcome.best.sum_of_squared_residuals, direct.sum_of_squared_residuals);
    }

    #[test]
    fn ties_resolve_to_first_enumerated() {
        // Alt is absent, so its shape cannot change the score.
        let data = observed_dataset().unwrap();
        let mut grid = single_point_grid();
        grid.b_alt_func = vec![15.0, 5.0, 10.0];
        let family = ModelFamily::new("tie", grid);

        let outcome = grid_search(&family, &data, &SearchOptions::default()).unwrap();
        assert_eq!(outcome.best.model_number, 0);
        assert_eq!(outcome.best.combination.alt_func.b, 15.0);
    }

    #[test]
    fn empty_axis_is_an_empty_result() {
        let data = observed_dataset().unwrap();
        let mut grid = single_point_grid();
        grid.switches.clear();
        let err = grid_search(&ModelFamily::new("empty", grid), &data, &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn fully_pruned_dos_is_an_empty_result() {
        let data = observed_dataset().unwrap();
        let mut grid = single_point_grid();
        grid.b_dos = vec![-50.0];
        grid.c_dos = vec![0.025];
        grid.compositions = vec![Composition::new(0.5, 0.5, 0.0)];
        let err = grid_search(&ModelFamily::new("pruned", grid), &data, &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn invalid_grid_is_a_config_error() {
        let data = observed_dataset().unwrap();
        let mut grid = single_point_grid();
        grid.compositions = vec![Composition::new(0.4, 0.4, 0.4)];
        let err = grid_search(&ModelFamily::new("bad", grid), &data, &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn zero_deadline_cancels() {
        let data = observed_dataset().unwrap();
        let opts = SearchOptions {
            deadline: Some(Duration::ZERO),
            ssr_ceiling: None,
        };
        let err = grid_search(&preset(FamilyKind::NonDosDup), &data, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn tight_ceiling_is_an_empty_result() {
        let data = observed_dataset().unwrap();
        let opts = SearchOptions {
            deadline: None,
            ssr_ceiling: Some(1e-12),
        };
        let err = grid_search(&preset(FamilyKind::Ind), &data, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn exact_fit_is_a_zero_score_not_an_empty_result() {
        let data = [ObservedDataPoint::new("flat", crate::data::Lineage::Plant, 20.0, 60.0, 1.0).unwrap()];
        let family = preset(FamilyKind::Ind);

        // Only Non is present, so the expected ratio is 1 up to rounding.
        let outcome = grid_search(&family, &data, &SearchOptions::default()).unwrap();
        assert!(outcome.best.sum_of_squared_residuals < 1e-24);
        assert_eq!(outcome.best.model_number, 0);

        let opts = SearchOptions {
            deadline: None,
            ssr_ceiling: Some(1e-12),
        };
        let outcome = grid_search(&family, &data, &opts).unwrap();
        assert!(outcome.best.sum_of_squared_residuals < 1e-24);
    }
}
