//! Preset model families.
//!
//! Each preset fixes which categories are present, how finely their shape
//! parameters are swept, and whether Alt_func may switch to Non-like decay.

use crate::domain::{Composition, FamilyKind};
use crate::fit::grid::{ModelFamily, ParameterGrid};

const ALT_B: [f64; 5] = [5.0, 10.0, 15.0, 30.0, 35.0];
const ALT_C: [f64; 4] = [0.5, 1.0, 3.0, 5.0];
const ALT_D: [f64; 5] = [50.0, 5.0, 0.5, 0.05, 0.0005];
const ALT_F: [f64; 5] = [0.5, 2.0, 5.0, 8.0, 10.0];

const DOS_B: [f64; 9] = [-1.0, -10.0, -12.0, -14.0, -16.0, -18.0, -20.0, -30.0, -50.0];
const DOS_C: [f64; 6] = [0.025, 0.05, 0.2, 0.4, 0.6, 0.8];
const DOS_D: [f64; 5] = [-0.03, -0.0003, -0.000003, -0.00000003, -0.0000000003];

// Absent categories still need a shape; these keep their survivals finite.
const FIXED_ALT: [f64; 4] = [35.0, 0.5, 50.0, 10.0];
const FIXED_DOS: [f64; 3] = [-12.0, 0.6, -0.03];

const NON_D_BASE: f64 = 10.01;
const NON_F_BASE: f64 = 0.01;

const MUT_SWITCHES: [f64; 3] = [0.1, 0.2, 0.5];

/// Aligned `(alt, dos, non)` triples of the three-category families.
const THREE_MIX: [(f64, f64, f64); 11] = [
    (0.80, 0.10, 0.10),
    (0.10, 0.10, 0.80),
    (0.10, 0.80, 0.10),
    (0.60, 0.10, 0.30),
    (0.60, 0.20, 0.20),
    (0.60, 0.30, 0.10),
    (0.40, 0.40, 0.20),
    (0.40, 0.20, 0.40),
    (0.20, 0.40, 0.40),
    (0.20, 0.60, 0.20),
    (0.20, 0.20, 0.60),
];

/// Majority/minority splits shared by the two-category families.
const PAIR_SPLITS: [(f64, f64); 5] = [(0.9, 0.1), (0.8, 0.2), (0.6, 0.4), (0.2, 0.8), (0.1, 0.9)];

fn three_mix() -> Vec<Composition> {
    THREE_MIX
        .iter()
        .map(|&(a, d, n)| Composition::new(a, d, n))
        .collect()
}

fn pairs(build: impl Fn(f64, f64) -> Composition) -> Vec<Composition> {
    PAIR_SPLITS.iter().map(|&(x, y)| build(x, y)).collect()
}

#[derive(Clone, Copy)]
enum Sweep {
    Full,
    Fixed,
}

fn alt_axes(sweep: Sweep) -> [Vec<f64>; 4] {
    match sweep {
        Sweep::Full => [ALT_B.to_vec(), ALT_C.to_vec(), ALT_D.to_vec(), ALT_F.to_vec()],
        Sweep::Fixed => FIXED_ALT.map(|v| vec![v]),
    }
}

fn dos_axes(sweep: Sweep) -> [Vec<f64>; 3] {
    match sweep {
        Sweep::Full => [DOS_B.to_vec(), DOS_C.to_vec(), DOS_D.to_vec()],
        Sweep::Fixed => FIXED_DOS.map(|v| vec![v]),
    }
}

fn build_grid(
    alt: Sweep,
    dos: Sweep,
    d_non: &[f64],
    f_non: &[f64],
    compositions: Vec<Composition>,
    switches: &[f64],
) -> ParameterGrid {
    let [b_alt_func, c_alt_func, d_alt_func, f_alt_func] = alt_axes(alt);
    let [b_dos, c_dos, d_dos] = dos_axes(dos);
    ParameterGrid {
        b_alt_func,
        c_alt_func,
        d_alt_func,
        f_alt_func,
        b_dos,
        c_dos,
        d_dos,
        d_non: d_non.to_vec(),
        f_non: f_non.to_vec(),
        compositions,
        switches: switches.to_vec(),
    }
}

/// The preset grid for a family.
pub fn preset(kind: FamilyKind) -> ModelFamily {
    use Sweep::{Fixed, Full};

    let grid = match kind {
        FamilyKind::ThreeMixDup => build_grid(
            Full,
            Full,
            &[NON_D_BASE],
            &[NON_F_BASE, 5.0, 20.0, 50.0],
            three_mix(),
            &[0.0],
        ),
        FamilyKind::AltDosDup => build_grid(
            Full,
            Full,
            &[NON_D_BASE],
            &[NON_F_BASE],
            pairs(|alt, dos| Composition::new(alt, dos, 0.0)),
            &[0.0],
        ),
        FamilyKind::AltNonDup => build_grid(
            Full,
            Fixed,
            &[NON_D_BASE, 20.0],
            &[NON_F_BASE, 5.0, 20.0, 50.0],
            pairs(|alt, non| Composition::new(alt, 0.0, non)),
            &[0.0],
        ),
        FamilyKind::NonDosDup => build_grid(
            Fixed,
            Full,
            &[NON_D_BASE, 20.0],
            &[NON_F_BASE, 5.0, 10.0, 20.0, 50.0],
            pairs(|dos, non| Composition::new(0.0, dos, non)),
            &[0.0],
        ),
        FamilyKind::AltNonMut => build_grid(
            Full,
            Fixed,
            &[NON_D_BASE, 20.0],
            &[NON_F_BASE, 5.0, 20.0, 50.0],
            pairs(|alt, non| Composition::new(alt, 0.0, non)),
            &MUT_SWITCHES,
        ),
        FamilyKind::Ind => build_grid(
            Fixed,
            Fixed,
            &[NON_D_BASE],
            &[NON_F_BASE],
            vec![Composition::new(0.0, 0.0, 1.0)],
            &[0.0],
        ),
        FamilyKind::ThreeMixMut => build_grid(
            Full,
            Full,
            &[NON_D_BASE],
            &[NON_F_BASE, 5.0, 20.0, 50.0],
            three_mix(),
            &MUT_SWITCHES,
        ),
    };
    ModelFamily::new(kind.name(), grid)
}

/// Every preset, in listing order.
pub fn presets() -> Vec<ModelFamily> {
    FamilyKind::ALL.iter().map(|&kind| preset(kind)).collect()
}

/// Independence-shaped grid with one value per axis.
#[cfg(test)]
pub(crate) fn single_point_grid() -> ParameterGrid {
    preset(FamilyKind::Ind).grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::grid::SweepPlan;

    #[test]
    fn preset_names_follow_kind() {
        for family in presets() {
            assert!(FamilyKind::from_name(&family.name).is_some(), "{}", family.name);
        }
    }

    #[test]
    fn independence_is_a_single_combination() {
        let plan = SweepPlan::new(&preset(FamilyKind::Ind).grid).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.pruned_dos, 0);
    }

    #[test]
    fn absent_categories_have_zero_fraction() {
        for comp in preset(FamilyKind::AltNonDup).grid.compositions {
            assert_eq!(comp.dos, 0.0);
        }
        for comp in preset(FamilyKind::NonDosDup).grid.compositions {
            assert_eq!(comp.alt, 0.0);
        }
        for comp in preset(FamilyKind::AltDosDup).grid.compositions {
            assert_eq!(comp.non, 0.0);
        }
    }

    #[test]
    fn only_mutation_families_switch() {
        for family in presets() {
            let switches = &family.grid.switches;
            if family.name.ends_with("_mut") {
                assert_eq!(switches, &MUT_SWITCHES.to_vec());
            } else {
                assert_eq!(switches, &vec![0.0]);
            }
        }
    }

    #[test]
    fn sweep_size_is_product_of_effective_axes() {
        let grid = preset(FamilyKind::AltNonDup).grid;
        let plan = SweepPlan::new(&grid).unwrap();
        assert_eq!(plan.len(), 500 * 8 * 5);
    }
}
