//! Best combination of each family from the 2024-03-16 coarse sweep.
//!
//! These feed the residual table (and from there the likelihood / AIC steps)
//! and the probability-ratio surfaces.

use crate::domain::{Composition, FamilyKind, ParameterCombination, ShapeParams};
use crate::error::AppError;

/// A named, fully specified combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopModel {
    pub family: FamilyKind,
    pub combination: ParameterCombination,
}

struct Row {
    family: FamilyKind,
    composition: (f64, f64, f64),
    alt: (f64, f64, f64, f64),
    dos: (f64, f64, f64),
    non: (f64, f64),
    switch: f64,
}

const ROWS: [Row; 7] = [
    Row {
        family: FamilyKind::ThreeMixDup,
        composition: (0.8, 0.1, 0.1),
        alt: (10.0, 1.0, 5.0, 2.0),
        dos: (-12.0, 0.6, -0.03),
        non: (10.01, 0.01),
        switch: 0.0,
    },
    Row {
        family: FamilyKind::AltDosDup,
        composition: (0.9, 0.1, 0.0),
        alt: (5.0, 5.0, 0.0005, 2.0),
        dos: (-20.0, 0.6, -0.0003),
        non: (10.01, 0.01),
        switch: 0.0,
    },
    Row {
        family: FamilyKind::AltNonDup,
        composition: (0.6, 0.0, 0.4),
        alt: (5.0, 1.0, 5.0, 10.0),
        dos: (-12.0, 0.6, -0.03),
        non: (10.01, 0.01),
        switch: 0.0,
    },
    Row {
        family: FamilyKind::NonDosDup,
        composition: (0.0, 0.1, 0.9),
        alt: (35.0, 0.5, 50.0, 10.0),
        dos: (-20.0, 0.8, -0.03),
        non: (10.01, 0.01),
        switch: 0.0,
    },
    Row {
        family: FamilyKind::AltNonMut,
        composition: (0.9, 0.0, 0.1),
        alt: (5.0, 5.0, 0.5, 8.0),
        dos: (-12.0, 0.6, -0.03),
        non: (10.01, 0.01),
        switch: 0.2,
    },
    Row {
        family: FamilyKind::Ind,
        composition: (0.0, 0.0, 1.0),
        alt: (35.0, 0.5, 50.0, 10.0),
        dos: (-12.0, 0.6, -0.03),
        non: (10.01, 0.01),
        switch: 0.0,
    },
    Row {
        family: FamilyKind::ThreeMixMut,
        composition: (0.8, 0.1, 0.1),
        alt: (30.0, 3.0, 0.5, 5.0),
        dos: (-12.0, 0.6, -0.03),
        non: (10.01, 5.0),
        switch: 0.1,
    },
];

/// The seven top models in family order.
pub fn top_models() -> Result<Vec<TopModel>, AppError> {
    ROWS.iter()
        .map(|row| {
            let (alt, dos, non) = row.composition;
            let (b_alt, c_alt, d_alt, f_alt) = row.alt;
            let (b_dos, c_dos, d_dos) = row.dos;
            let (d_non, f_non) = row.non;
            let combination = ParameterCombination::new(
                ShapeParams::new(b_alt, c_alt, d_alt, f_alt),
                ShapeParams::dos(b_dos, c_dos, d_dos),
                ShapeParams::non(d_non, f_non),
                Composition::new(alt, dos, non),
                row.switch,
            )?;
            Ok(TopModel {
                family: row.family,
                combination,
            })
        })
        .collect()
}

/// Look up the top model of one family.
pub fn top_model(family: FamilyKind) -> Result<TopModel, AppError> {
    top_models()?
        .into_iter()
        .find(|m| m.family == family)
        .ok_or_else(|| AppError::config(format!("No stored top model for family '{}'.", family.name())))
}
