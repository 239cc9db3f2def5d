//! Probability-ratio surface over a `t1 × t2` grid.
//!
//! Both axes start at 0.01 and advance by repeated addition of 0.01, so cell
//! coordinates carry the same accumulated rounding the legacy tables show
//! (e.g. `0.060000000000000005`).

use crate::domain::{ParameterCombination, SurfaceRow};
use crate::error::AppError;
use crate::models::{category_survival, expected_ratio};

pub const SURFACE_START: f64 = 0.01;
pub const SURFACE_STEP: f64 = 0.01;
/// Default steps per axis (0.01 ..= 0.99).
pub const DEFAULT_SURFACE_STEPS: usize = 99;

/// Evaluate the ratio at every `(t1, t2)` cell, t1 outer.
pub fn pratio_surface(
    combination: &ParameterCombination,
    steps: usize,
) -> Result<Vec<SurfaceRow>, AppError> {
    if steps == 0 {
        return Err(AppError::config("Surface steps must be >= 1."));
    }

    let mut rows = Vec::with_capacity(steps * steps);
    let mut t1 = SURFACE_START;
    for _ in 0..steps {
        let st1 = category_survival(combination, t1);
        let mut t2 = SURFACE_START;
        for _ in 0..steps {
            let st2 = category_survival(combination, t2);
            let pratio = expected_ratio(
                &st1,
                &st2,
                &combination.composition,
                combination.switch_fraction,
            )?;
            rows.push(SurfaceRow {
                t1,
                t2,
                pratio,
                alt_surv_t1: st1.alt,
                dos_surv_t1: st1.dos,
                non_surv_t1: st1.non,
                alt_surv_t2: st2.alt,
                dos_surv_t2: st2.dos,
                non_surv_t2: st2.non,
                log_pratio: pratio.log10(),
            });
            t2 += SURFACE_STEP;
        }
        t1 += SURFACE_STEP;
    }
    Ok(rows)
}
