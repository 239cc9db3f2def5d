//! Parameter grids and their enumeration order.
//!
//! A sweep visits the Cartesian product of its axes in a fixed nesting order
//! (outer → inner):
//!
//! ```text
//! b_alt, c_alt, d_alt, f_alt, b_dos, c_dos, d_dos, d_non, f_non, composition, switch
//! ```
//!
//! Compositions are one axis of aligned `(alt, dos, non)` triples, never a
//! cross product, so every candidate sums to 1 by construction. The Dos
//! `(b, c, d)` sub-grid is filtered by the hazard rule up front; what remains
//! is a mixed-radix product whose flat index is the model number reported for
//! the winning combination.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Composition, ParameterCombination, ShapeParams, NON_B, NON_C,
};
use crate::error::AppError;
use crate::models::is_plausible_dos;

/// Tolerance for a composition triple to count as summing to 1.
pub const COMPOSITION_TOLERANCE: f64 = 1e-9;

/// Candidate values for every swept parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub b_alt_func: Vec<f64>,
    pub c_alt_func: Vec<f64>,
    pub d_alt_func: Vec<f64>,
    pub f_alt_func: Vec<f64>,
    pub b_dos: Vec<f64>,
    pub c_dos: Vec<f64>,
    /// `f_dos = -d_dos` is derived, not swept.
    pub d_dos: Vec<f64>,
    pub d_non: Vec<f64>,
    pub f_non: Vec<f64>,
    pub compositions: Vec<Composition>,
    pub switches: Vec<f64>,
}

/// A named grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFamily {
    pub name: String,
    #[serde(flatten)]
    pub grid: ParameterGrid,
}

impl ModelFamily {
    pub fn new(name: impl Into<String>, grid: ParameterGrid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// A one-point family for a user-specified combination.
    ///
    /// The combination goes through [`ParameterCombination::validate`], so an
    /// implausible Dos shape is an error rather than a silently empty sweep.
    pub fn explicit(
        name: impl Into<String>,
        combination: &ParameterCombination,
    ) -> Result<Self, AppError> {
        combination.validate()?;
        Ok(Self::new(name, ParameterGrid::single(combination)))
    }
}

impl ParameterCombination {
    /// Assemble a combination and check it against every model constraint.
    pub fn new(
        alt_func: ShapeParams,
        dos: ShapeParams,
        non: ShapeParams,
        composition: Composition,
        switch_fraction: f64,
    ) -> Result<Self, AppError> {
        let combination = Self {
            alt_func,
            dos,
            non,
            composition,
            switch_fraction,
        };
        combination.validate()?;
        Ok(combination)
    }

    /// Grid constraints plus the Dos hazard rule, which a grid only uses for
    /// pruning.
    pub fn validate(&self) -> Result<(), AppError> {
        let (dos, non) = (self.dos, self.non);
        if dos.f != -dos.d {
            return Err(AppError::config(format!(
                "Dos f must equal -d (got d={}, f={}).",
                dos.d, dos.f
            )));
        }
        if non.b != NON_B || non.c != NON_C {
            return Err(AppError::config(format!(
                "Non b and c are fixed at {NON_B} and {NON_C} (got b={}, c={}).",
                non.b, non.c
            )));
        }

        ParameterGrid::single(self).validate()?;

        if !is_plausible_dos(&dos) {
            return Err(AppError::config(format!(
                "Dos shape (b={}, c={}, d={}) fails the hazard rule: f·exp(-b·0.02^c + d) must be < 0.1.",
                dos.b, dos.c, dos.d
            )));
        }
        Ok(())
    }
}

impl ParameterGrid {
    fn single(combination: &ParameterCombination) -> Self {
        let ParameterCombination {
            alt_func,
            dos,
            non,
            composition,
            switch_fraction,
        } = *combination;
        Self {
            b_alt_func: vec![alt_func.b],
            c_alt_func: vec![alt_func.c],
            d_alt_func: vec![alt_func.d],
            f_alt_func: vec![alt_func.f],
            b_dos: vec![dos.b],
            c_dos: vec![dos.c],
            d_dos: vec![dos.d],
            d_non: vec![non.d],
            f_non: vec![non.f],
            compositions: vec![composition],
            switches: vec![switch_fraction],
        }
    }

    /// Reject malformed or constraint-violating axes before any sweep.
    ///
    /// Empty axes are not an error here; they make the sweep report an empty
    /// result instead.
    pub fn validate(&self) -> Result<(), AppError> {
        check_axis("b_alt_func", &self.b_alt_func, |v| v > 0.0, "> 0")?;
        check_axis("c_alt_func", &self.c_alt_func, |v| v > 0.0, "> 0")?;
        check_axis("d_alt_func", &self.d_alt_func, |v| v > 0.0, "> 0")?;
        check_axis("f_alt_func", &self.f_alt_func, |v| v > 0.0, "> 0")?;
        check_axis("b_dos", &self.b_dos, |v| v < 0.0, "< 0")?;
        check_axis("c_dos", &self.c_dos, |v| v > 0.0 && v <= 1.0, "in (0, 1]")?;
        check_axis("d_dos", &self.d_dos, |v| v <= 0.0, "<= 0 (f_dos = -d_dos)")?;
        check_axis("d_non", &self.d_non, |v| v > 10.0, "> 10")?;
        check_axis("f_non", &self.f_non, |v| v > 0.0, "> 0")?;
        check_axis("switches", &self.switches, |v| (0.0..=1.0).contains(&v), "in [0, 1]")?;

        for (i, comp) in self.compositions.iter().enumerate() {
            let parts = [comp.alt, comp.dos, comp.non];
            if parts.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
                return Err(AppError::config(format!(
                    "Composition #{i} ({}, {}, {}) has a fraction outside [0, 1].",
                    comp.alt, comp.dos, comp.non
                )));
            }
            if (comp.total() - 1.0).abs() > COMPOSITION_TOLERANCE {
                return Err(AppError::config(format!(
                    "Composition #{i} ({}, {}, {}) sums to {}, not 1.",
                    comp.alt,
                    comp.dos,
                    comp.non,
                    comp.total()
                )));
            }
        }
        Ok(())
    }

    /// Alt shapes in `b, c, d, f` nesting order.
    pub fn alt_shapes(&self) -> Vec<ShapeParams> {
        let mut out = Vec::with_capacity(
            self.b_alt_func.len() * self.c_alt_func.len() * self.d_alt_func.len() * self.f_alt_func.len(),
        );
        for &b in &self.b_alt_func {
            for &c in &self.c_alt_func {
                for &d in &self.d_alt_func {
                    for &f in &self.f_alt_func {
                        out.push(ShapeParams::new(b, c, d, f));
                    }
                }
            }
        }
        out
    }

    /// Dos shapes in `b, c, d` nesting order, split into (kept, pruned count).
    pub fn dos_shapes(&self) -> (Vec<ShapeParams>, usize) {
        let mut kept = Vec::new();
        let mut pruned = 0;
        for &b in &self.b_dos {
            for &c in &self.c_dos {
                for &d in &self.d_dos {
                    let shape = ShapeParams::dos(b, c, d);
                    if is_plausible_dos(&shape) {
                        kept.push(shape);
                    } else {
                        log::trace!("Pruned Dos shape b={b} c={c} d={d}");
                        pruned += 1;
                    }
                }
            }
        }
        (kept, pruned)
    }

    /// Non shapes in `d, f` nesting order.
    pub fn non_shapes(&self) -> Vec<ShapeParams> {
        let mut out = Vec::with_capacity(self.d_non.len() * self.f_non.len());
        for &d in &self.d_non {
            for &f in &self.f_non {
                out.push(ShapeParams::non(d, f));
            }
        }
        out
    }
}

fn check_axis(
    name: &str,
    values: &[f64],
    valid: impl Fn(f64) -> bool,
    rule: &str,
) -> Result<(), AppError> {
    for &v in values {
        if !v.is_finite() || !valid(v) {
            return Err(AppError::config(format!(
                "Invalid {name} value {v}: must be finite and {rule}."
            )));
        }
    }
    Ok(())
}

/// Position of one combination along each (flattened) axis group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisIndex {
    pub alt: usize,
    pub dos: usize,
    pub non: usize,
    pub composition: usize,
    pub switch: usize,
}

/// The pruned, enumerable form of a grid.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub alt_shapes: Vec<ShapeParams>,
    pub dos_shapes: Vec<ShapeParams>,
    pub non_shapes: Vec<ShapeParams>,
    pub compositions: Vec<Composition>,
    pub switches: Vec<f64>,
    /// Dos `(b, c, d)` triples removed by the hazard rule.
    pub pruned_dos: usize,
    len: usize,
}

impl SweepPlan {
    pub fn new(grid: &ParameterGrid) -> Result<Self, AppError> {
        let alt_shapes = grid.alt_shapes();
        let (dos_shapes, pruned_dos) = grid.dos_shapes();
        let non_shapes = grid.non_shapes();

        let len = [
            alt_shapes.len(),
            dos_shapes.len(),
            non_shapes.len(),
            grid.compositions.len(),
            grid.switches.len(),
        ]
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| AppError::config("Parameter grid is too large to enumerate."))?;

        Ok(Self {
            alt_shapes,
            dos_shapes,
            non_shapes,
            compositions: grid.compositions.clone(),
            switches: grid.switches.clone(),
            pruned_dos,
            len,
        })
    }

    /// Number of combinations that will be evaluated.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode a flat enumeration index (switch innermost).
    pub fn axis_index(&self, index: usize) -> AxisIndex {
        let mut rest = index;
        let switch = rest % self.switches.len();
        rest /= self.switches.len();
        let composition = rest % self.compositions.len();
        rest /= self.compositions.len();
        let non = rest % self.non_shapes.len();
        rest /= self.non_shapes.len();
        let dos = rest % self.dos_shapes.len();
        rest /= self.dos_shapes.len();
        AxisIndex {
            alt: rest,
            dos,
            non,
            composition,
            switch,
        }
    }

    pub fn combination_at(&self, ix: &AxisIndex) -> ParameterCombination {
        ParameterCombination {
            alt_func: self.alt_shapes[ix.alt],
            dos: self.dos_shapes[ix.dos],
            non: self.non_shapes[ix.non],
            composition: self.compositions[ix.composition],
            switch_fraction: self.switches[ix.switch],
        }
    }

    /// The combination at a flat enumeration index.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn combination(&self, index: usize) -> ParameterCombination {
        self.combination_at(&self.axis_index(index))
    }
}
