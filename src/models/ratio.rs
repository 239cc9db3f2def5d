//! Expected probability ratio (pratio) of the three-category mixture.
//!
//! For each category with starting fraction `p` and survivals `S1`, `S2`:
//!
//! ```text
//! retained at t1          ret      = 2·p·S1
//! retained, retained      ret_ret  = ret·S2
//! lost at t1              noret    = (1 - S1)·p
//! lost, then retained     noret_ret = noret·S2
//!
//! pratio = (Σ ret_ret / Σ noret_ret) · (Σ noret / Σ ret)
//! ```
//!
//! Alt_func is the only category with a switch term: a fraction `s` of its
//! retained-retained mass follows the Non survival at t2 instead of its own.

use crate::domain::{CategoryTriple, Composition};
use crate::error::{AppError, ErrorKind};

/// Expected pratio for one `(t1, t2)` pair.
///
/// Fails only when every composition fraction is zero; any other zero
/// division or overflow comes back as a non-finite value.
pub fn expected_ratio(
    survival_t1: &CategoryTriple<f64>,
    survival_t2: &CategoryTriple<f64>,
    composition: &Composition,
    switch_fraction: f64,
) -> Result<f64, AppError> {
    if composition.alt == 0.0 && composition.dos == 0.0 && composition.non == 0.0 {
        return Err(AppError::new(
            ErrorKind::Degenerate,
            "Degenerate composition: every category starts at 0%, the probability ratio is undefined.",
        ));
    }

    let pct = composition.as_triple();
    let ret = pct.map(|cat, p| 2.0 * p * survival_t1.get(cat));

    let alt_ret_ret_switch = ret.alt * survival_t2.non * switch_fraction;
    let alt_ret_ret_stay = ret.alt * survival_t2.alt * (1.0 - switch_fraction);
    let dos_ret_ret = ret.dos * survival_t2.dos;
    let non_ret_ret = ret.non * survival_t2.non;

    let noret = pct.map(|cat, p| (1.0 - survival_t1.get(cat)) * p);
    let noret_ret = noret.map(|cat, mass| mass * survival_t2.get(cat));

    let retained_then_retained = alt_ret_ret_stay + alt_ret_ret_switch + dos_ret_ret + non_ret_ret;
    let lost_then_retained = noret_ret.alt + noret_ret.dos + noret_ret.non;
    let lost_at_t1 = noret.alt + noret.dos + noret.non;
    let retained_at_t1 = ret.alt + ret.dos + ret.non;

    Ok((retained_then_retained / lost_then_retained) * (lost_at_t1 / retained_at_t1))
}

/// Signed residual `observed - expected`.
pub fn residual(observed: f64, expected: f64) -> f64 {
    observed - expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(a: f64, d: f64, n: f64) -> CategoryTriple<f64> {
        CategoryTriple::new(a, d, n)
    }

    #[test]
    fn single_category_closed_form() {
        // Only Non present, so the two odds cancel exactly.
        let st1 = triple(0.5, 0.5, 0.4);
        let st2 = triple(0.5, 0.5, 0.2);
        let comp = Composition::new(0.0, 0.0, 1.0);
        let r = expected_ratio(&st1, &st2, &comp, 0.0).unwrap();
        // ret = 0.8, ret_ret = 0.16, noret = 0.6, noret_ret = 0.12
        let expected = (0.16 / 0.12) * (0.6 / 0.8);
        assert!((r - expected).abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invariant_under_category_relabelling_without_switch() {
        let st1 = triple(0.7, 0.4, 0.1);
        let st2 = triple(0.5, 0.3, 0.05);
        let comp = Composition::new(0.6, 0.3, 0.1);
        let base = expected_ratio(&st1, &st2, &comp, 0.0).unwrap();

        // Rotate Alt -> Dos -> Non -> Alt consistently.
        let st1_r = triple(st1.non, st1.alt, st1.dos);
        let st2_r = triple(st2.non, st2.alt, st2.dos);
        let comp_r = Composition::new(comp.non, comp.alt, comp.dos);
        let rotated = expected_ratio(&st1_r, &st2_r, &comp_r, 0.0).unwrap();

        assert!((base - rotated).abs() < 1e-12);
    }

    #[test]
    fn switch_routes_alt_mass_through_non_survival() {
        let st1 = triple(0.8, 0.5, 0.3);
        let st2 = triple(0.6, 0.4, 0.1);
        let comp = Composition::new(0.9, 0.0, 0.1);

        let none = expected_ratio(&st1, &st2, &comp, 0.0).unwrap();
        let some = expected_ratio(&st1, &st2, &comp, 0.2).unwrap();
        assert!(some < none);

        // Hand computation for s = 0.2.
        let alt_ret = 2.0 * 0.9 * 0.8;
        let non_ret = 2.0 * 0.1 * 0.3;
        let ret_ret = alt_ret * 0.6 * 0.8 + alt_ret * 0.1 * 0.2 + non_ret * 0.1;
        let alt_noret = 0.2 * 0.9;
        let non_noret = 0.7 * 0.1;
        let noret_ret = alt_noret * 0.6 + non_noret * 0.1;
        let expected = (ret_ret / noret_ret) * ((alt_noret + non_noret) / (alt_ret + non_ret));
        assert!((some - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_composition_is_a_hard_error() {
        let st = triple(0.5, 0.5, 0.5);
        let err = expected_ratio(&st, &st, &Composition::new(0.0, 0.0, 0.0), 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Degenerate);
    }

    #[test]
    fn certain_survival_gives_non_finite_ratio() {
        // S1 = 1 leaves nothing lost at t1, which ends in inf * 0.
        let st = triple(1.0, 1.0, 1.0);
        let r = expected_ratio(&st, &st, &Composition::new(0.2, 0.3, 0.5), 0.0).unwrap();
        assert!(!r.is_finite());
    }

    #[test]
    fn residual_keeps_sign() {
        assert!((residual(0.9, 1.0) + 0.1).abs() < 1e-12);
        assert!((residual(1.0, 0.9) - 0.1).abs() < 1e-12);
    }
}
