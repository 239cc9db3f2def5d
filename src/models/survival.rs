//! Duplicate-copy survival curve.
//!
//! ```text
//! S(t) = exp(-d·t - f·Σ_{n=0}^{99} (-b)^n · t^(c·n+1) / (c·n·n! + n!))
//! ```
//!
//! The series is a truncated expansion of the hazard integral. It is not
//! checked for convergence: large `|b|·t` can lose accuracy or overflow, and
//! such values are returned as-is (`inf`/`NaN`) for the caller to rank as
//! non-competitive.

use statrs::function::factorial::factorial;

use crate::domain::ShapeParams;

/// Number of series terms.
pub const SERIES_TERMS: u64 = 100;

/// Time at which the Dos plausibility hazard is evaluated.
pub const DOS_HAZARD_TIME: f64 = 0.02;
/// A Dos shape is plausible only when its hazard at `DOS_HAZARD_TIME` is below this.
pub const DOS_HAZARD_LIMIT: f64 = 0.1;

/// Probability that a duplicate copy survives to `time` (substitution units).
pub fn survival_probability(shape: &ShapeParams, time: f64) -> f64 {
    let ShapeParams { b, c, d, f } = *shape;

    let mut summation = 0.0;
    for n in 0..SERIES_TERMS {
        let n_fac = factorial(n);
        let n_f = n as f64;
        // `+ n!` keeps the n = 0 denominator at 1.
        let beta = ((-b).powf(n_f) * time.powf(c * n_f + 1.0)) / (c * n_f * n_fac + n_fac);
        summation += beta;
    }

    (-d * time - f * summation).exp()
}

/// Instantaneous Dos hazard `f·exp(-b·0.02^c + d)`.
pub fn dos_hazard(shape: &ShapeParams) -> f64 {
    shape.f * ((-shape.b * DOS_HAZARD_TIME.powf(shape.c)) + shape.d).exp()
}

/// `true` when the Dos shape passes the plausibility filter. `NaN` fails.
pub fn is_plausible_dos(shape: &ShapeParams) -> bool {
    dos_hazard(shape) < DOS_HAZARD_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_at_time_zero_is_one() {
        let shapes = [
            ShapeParams::new(35.0, 0.5, 50.0, 10.0),
            ShapeParams::dos(-12.0, 0.6, -0.03),
            ShapeParams::non(10.01, 0.01),
        ];
        for shape in shapes {
            assert_eq!(survival_probability(&shape, 0.0), 1.0);
        }
    }

    #[test]
    fn non_shape_reduces_to_exponential() {
        // b = 0 kills every term past n = 0, leaving Σ = t.
        let shape = ShapeParams::non(10.01, 5.0);
        for &t in &[0.05_f64, 0.3, 0.99] {
            let expected = (-(10.01 + 5.0) * t).exp();
            assert!((survival_probability(&shape, t) - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn survival_is_a_probability_for_non_negative_rates() {
        let shapes = [
            ShapeParams::new(5.0, 1.0, 5.0, 2.0),
            ShapeParams::new(30.0, 3.0, 0.5, 5.0),
            ShapeParams::non(20.0, 50.0),
        ];
        for shape in shapes {
            for i in 1..=20 {
                let t = i as f64 * 0.05;
                let s = survival_probability(&shape, t);
                assert!(s > 0.0 && s <= 1.0, "S({t}) = {s} for {shape:?}");
            }
        }
    }

    #[test]
    fn overflowing_series_is_returned_not_raised() {
        let shape = ShapeParams::new(-1.0e6, 0.5, 0.0, 0.0);
        assert!(survival_probability(&shape, 1.0).is_nan());
    }

    #[test]
    fn dos_hazard_filter() {
        let kept = ShapeParams::dos(-12.0, 0.6, -0.03);
        assert!(dos_hazard(&kept) < DOS_HAZARD_LIMIT);
        assert!(is_plausible_dos(&kept));

        let pruned = ShapeParams::dos(-50.0, 0.025, -0.03);
        assert!(dos_hazard(&pruned) >= DOS_HAZARD_LIMIT);
        assert!(!is_plausible_dos(&pruned));
    }

    #[test]
    fn dos_hazard_matches_formula() {
        let shape = ShapeParams::dos(-20.0, 0.8, -0.03);
        let expected = 0.03 * (20.0 * 0.02_f64.powf(0.8) - 0.03).exp();
        assert!((dos_hazard(&shape) - expected).abs() < 1e-15);
    }
}
