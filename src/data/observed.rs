//! Compiled-in lineage-pair observations.
//!
//! Eleven paired duplication events (one fish, ten plant) with divergence
//! times in millions of years and the observed retention probability ratio.
//! Times are converted to substitution units with a per-lineage rate.

use crate::error::AppError;

/// Substitutions per site per year, fish (Fu et al. 2010).
pub const FISH_SUBSTITUTION_RATE: f64 = 0.000_000_004_13;
/// Substitutions per site per year, plants (Wolfe et al. 1987; Schultz et al. 1999).
pub const PLANT_SUBSTITUTION_RATE: f64 = 0.000_000_006;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    Fish,
    Plant,
}

impl Lineage {
    pub fn substitution_rate(self) -> f64 {
        match self {
            Lineage::Fish => FISH_SUBSTITUTION_RATE,
            Lineage::Plant => PLANT_SUBSTITUTION_RATE,
        }
    }

    /// Convert a divergence time in million years to substitution units.
    pub fn to_substitution_time(self, mya: f64) -> f64 {
        mya * 1_000_000.0 * self.substitution_rate()
    }
}

/// One empirical lineage-pair record.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedDataPoint {
    pub name: &'static str,
    pub lineage: Lineage,
    pub t1_mya: f64,
    pub t2_mya: f64,
    pub t1: f64,
    pub t2: f64,
    pub observed_ratio: f64,
}

impl ObservedDataPoint {
    pub fn new(
        name: &'static str,
        lineage: Lineage,
        t1_mya: f64,
        t2_mya: f64,
        observed_ratio: f64,
    ) -> Result<Self, AppError> {
        if !(t1_mya.is_finite() && t2_mya.is_finite() && t1_mya >= 0.0 && t2_mya >= 0.0) {
            return Err(AppError::config(format!(
                "Invalid divergence times for '{name}': t1={t1_mya} t2={t2_mya} (must be finite and >= 0)."
            )));
        }
        if !observed_ratio.is_finite() {
            return Err(AppError::config(format!(
                "Invalid observed ratio for '{name}': {observed_ratio}."
            )));
        }
        Ok(Self {
            name,
            lineage,
            t1_mya,
            t2_mya,
            t1: lineage.to_substitution_time(t1_mya),
            t2: lineage.to_substitution_time(t2_mya),
            observed_ratio,
        })
    }
}

const OBSERVATIONS: [(&str, Lineage, f64, f64, f64); 11] = [
    ("Atlantic Salmon", Lineage::Fish, 240.0, 80.0, 0.97),
    ("Nick's Phalaenopsis equestrius", Lineage::Plant, 54.0, 76.0, 0.94),
    ("Nick's Pair 1 Panicum halli", Lineage::Plant, 8.0, 99.0, 0.92),
    ("Nick's Pair 1 Oryza brachyantha", Lineage::Plant, 8.0, 99.0, 0.93),
    ("Nick's Pair 2 Panicum halli", Lineage::Plant, 25.0, 99.0, 0.88),
    ("Nick's Pair 2 Oryza brachyantha", Lineage::Plant, 25.0, 99.0, 0.87),
    ("Nick's Pair 3 Panicum halli", Lineage::Plant, 17.0, 107.0, 0.87),
    ("Nick's Pair 3 Oryza brachyantha", Lineage::Plant, 17.0, 107.0, 0.86),
    ("Nick's Pair 3 Ananas comosus", Lineage::Plant, 17.0, 107.0, 0.87),
    ("Nick's Pair 4 Elaeis guineensis", Lineage::Plant, 49.0, 75.0, 0.91),
    ("Nick's Pair 4 Phoenix dactylifera", Lineage::Plant, 49.0, 75.0, 0.90),
];

/// The fixed 11-point dataset, in table order.
pub fn observed_dataset() -> Result<Vec<ObservedDataPoint>, AppError> {
    OBSERVATIONS
        .iter()
        .map(|&(name, lineage, t1_mya, t2_mya, ratio)| {
            ObservedDataPoint::new(name, lineage, t1_mya, t2_mya, ratio)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_has_eleven_points_in_order() {
        let data = observed_dataset().unwrap();
        assert_eq!(data.len(), 11);
        assert_eq!(data[0].name, "Atlantic Salmon");
        assert_eq!(data[10].name, "Nick's Pair 4 Phoenix dactylifera");
    }

    #[test]
    fn times_use_lineage_rates() {
        let data = observed_dataset().unwrap();
        let salmon = &data[0];
        assert!((salmon.t1 - 240.0e6 * 4.13e-9).abs() < 1e-12);
        assert!((salmon.t2 - 80.0e6 * 4.13e-9).abs() < 1e-12);

        let orchid = &data[1];
        assert!((orchid.t1 - 0.324).abs() < 1e-12);
        assert!((orchid.t2 - 0.456).abs() < 1e-12);
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = ObservedDataPoint::new("bad", Lineage::Plant, -1.0, 5.0, 0.9).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
