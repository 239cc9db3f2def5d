//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - used in-memory during the sweep
//! - exported to CSV/JSON with the column names downstream scripts expect
//! - reloaded for the likelihood / AIC steps

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Gene-duplicate fate category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Duplicates that can sub- or neofunctionalize.
    AltFunc,
    /// Dosage-sensitive duplicates.
    Dos,
    /// Duplicates retained only by chance.
    Non,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::AltFunc, Category::Dos, Category::Non];

    pub fn display_name(self) -> &'static str {
        match self {
            Category::AltFunc => "Alt_func",
            Category::Dos => "Dos",
            Category::Non => "Non",
        }
    }
}

/// One value per category.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTriple<T> {
    pub alt: T,
    pub dos: T,
    pub non: T,
}

impl<T: Copy> CategoryTriple<T> {
    pub fn new(alt: T, dos: T, non: T) -> Self {
        Self { alt, dos, non }
    }

    pub fn get(&self, category: Category) -> T {
        match category {
            Category::AltFunc => self.alt,
            Category::Dos => self.dos,
            Category::Non => self.non,
        }
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(Category, T) -> U) -> CategoryTriple<U> {
        CategoryTriple {
            alt: f(Category::AltFunc, self.alt),
            dos: f(Category::Dos, self.dos),
            non: f(Category::Non, self.non),
        }
    }
}

/// Survival-curve shape parameters `(b, c, d, f)` for one category.
///
/// `b` and `c` shape the transition from the instantaneous to the asymptotic
/// loss rate; `d + f` is the loss rate of fully redundant copies and `d` the
/// loss rate of singletons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub f: f64,
}

impl ShapeParams {
    pub fn new(b: f64, c: f64, d: f64, f: f64) -> Self {
        Self { b, c, d, f }
    }

    /// Dos shape from its swept `(b, c, d)`; `f = -d` is enforced.
    pub fn dos(b: f64, c: f64, d: f64) -> Self {
        Self { b, c, d, f: -d }
    }

    /// Non shape from its swept `(d, f)`; `b = 0`, `c = 1` by definition.
    pub fn non(d: f64, f: f64) -> Self {
        Self {
            b: NON_B,
            c: NON_C,
            d,
            f,
        }
    }
}

/// Fixed Non-category `b`.
pub const NON_B: f64 = 0.0;
/// Fixed Non-category `c`.
pub const NON_C: f64 = 1.0;

/// Fractions of the starting genome in each category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub alt: f64,
    pub dos: f64,
    pub non: f64,
}

impl Composition {
    pub fn new(alt: f64, dos: f64, non: f64) -> Self {
        Self { alt, dos, non }
    }

    pub fn total(&self) -> f64 {
        self.alt + self.dos + self.non
    }

    pub fn as_triple(&self) -> CategoryTriple<f64> {
        CategoryTriple::new(self.alt, self.dos, self.non)
    }
}

/// One concrete assignment of all 16 scalar parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterCombination {
    pub alt_func: ShapeParams,
    pub dos: ShapeParams,
    pub non: ShapeParams,
    pub composition: Composition,
    pub switch_fraction: f64,
}

impl ParameterCombination {
    pub fn shape(&self, category: Category) -> ShapeParams {
        match category {
            Category::AltFunc => self.alt_func,
            Category::Dos => self.dos,
            Category::Non => self.non,
        }
    }
}

/// Built-in model families (the 2024-03-16 coarse sweep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FamilyKind {
    /// 3 mixture, gene duplicability.
    #[value(name = "3mix_dup", alias = "3_mix_dup")]
    #[serde(rename = "3mix_dup")]
    ThreeMixDup,
    /// 2 mixture (Alt + Dos), gene duplicability.
    #[value(name = "alt_dos_dup")]
    #[serde(rename = "alt_dos_dup")]
    AltDosDup,
    /// 2 mixture (Alt + Non), gene duplicability.
    #[value(name = "alt_non_dup")]
    #[serde(rename = "alt_non_dup")]
    AltNonDup,
    /// 2 mixture (Non + Dos), gene duplicability.
    #[value(name = "non_dos_dup")]
    #[serde(rename = "non_dos_dup")]
    NonDosDup,
    /// 2 mixture (Alt + Non), mutational opportunity.
    #[value(name = "alt_non_mut")]
    #[serde(rename = "alt_non_mut")]
    AltNonMut,
    /// Independence model.
    #[value(name = "ind")]
    #[serde(rename = "ind")]
    Ind,
    /// 3 mixture, mutational opportunity.
    #[value(name = "3mix_mut", alias = "3_mix_mut")]
    #[serde(rename = "3mix_mut")]
    ThreeMixMut,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 7] = [
        FamilyKind::ThreeMixDup,
        FamilyKind::AltDosDup,
        FamilyKind::AltNonDup,
        FamilyKind::NonDosDup,
        FamilyKind::AltNonMut,
        FamilyKind::Ind,
        FamilyKind::ThreeMixMut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::ThreeMixDup => "3mix_dup",
            FamilyKind::AltDosDup => "alt_dos_dup",
            FamilyKind::AltNonDup => "alt_non_dup",
            FamilyKind::NonDosDup => "non_dos_dup",
            FamilyKind::AltNonMut => "alt_non_mut",
            FamilyKind::Ind => "ind",
            FamilyKind::ThreeMixMut => "3mix_mut",
        }
    }

    /// Name written to the likelihood and AIC tables.
    pub fn likelihood_name(self) -> &'static str {
        match self {
            FamilyKind::ThreeMixDup => "3_mix_dup",
            FamilyKind::ThreeMixMut => "3_mix_mut",
            other => other.name(),
        }
    }

    /// Free-parameter count used for AIC.
    pub fn param_count(self) -> usize {
        match self {
            FamilyKind::ThreeMixDup => 10,
            FamilyKind::AltDosDup => 8,
            FamilyKind::AltNonDup => 6,
            FamilyKind::NonDosDup => 5,
            FamilyKind::AltNonMut => 7,
            FamilyKind::Ind => 0,
            FamilyKind::ThreeMixMut => 11,
        }
    }

    /// Resolve a family from its table name. Accepts both `3mix_dup` and the
    /// `3_mix_dup` spelling used by the likelihood tables.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace("3_mix", "3mix");
        FamilyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
    }
}

/// Winning combination of one sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// Position of the combination in the (pruned) enumeration order.
    pub model_number: usize,
    pub combination: ParameterCombination,
    pub sum_of_squared_residuals: f64,
}

/// Per-data-point evaluation of one combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEvaluation {
    pub survival_t1: CategoryTriple<f64>,
    pub survival_t2: CategoryTriple<f64>,
    pub expected_ratio: f64,
    pub residual: f64,
    pub absolute_residual: f64,
}

/// Best-fit output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestFitRecord {
    pub model_number: usize,
    pub sum_of_squared_residuals: f64,
    pub b_alt_func: f64,
    pub c_alt_func: f64,
    pub d_alt_func: f64,
    pub f_alt_func: f64,
    pub b_dos: f64,
    pub c_dos: f64,
    pub d_dos: f64,
    pub f_dos: f64,
    pub b_non: f64,
    pub c_non: f64,
    pub d_non: f64,
    pub f_non: f64,
    pub alt_percent: f64,
    pub dos_percent: f64,
    pub non_percent: f64,
    pub percent_switch: f64,
}

impl BestFitRecord {
    pub fn new(model_number: usize, combination: &ParameterCombination, ssr: f64) -> Self {
        let ParameterCombination {
            alt_func,
            dos,
            non,
            composition,
            switch_fraction,
        } = *combination;
        Self {
            model_number,
            sum_of_squared_residuals: ssr,
            b_alt_func: alt_func.b,
            c_alt_func: alt_func.c,
            d_alt_func: alt_func.d,
            f_alt_func: alt_func.f,
            b_dos: dos.b,
            c_dos: dos.c,
            d_dos: dos.d,
            f_dos: dos.f,
            b_non: non.b,
            c_non: non.c,
            d_non: non.d,
            f_non: non.f,
            alt_percent: composition.alt,
            dos_percent: composition.dos,
            non_percent: composition.non,
            percent_switch: switch_fraction,
        }
    }
}

impl From<&FitResult> for BestFitRecord {
    fn from(fit: &FitResult) -> Self {
        BestFitRecord::new(fit.model_number, &fit.combination, fit.sum_of_squared_residuals)
    }
}

/// Best-fit row tagged with its model category (top-model summary tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummaryRecord {
    pub model_number: usize,
    pub sum_of_squared_residuals: f64,
    pub b_alt_func: f64,
    pub c_alt_func: f64,
    pub d_alt_func: f64,
    pub f_alt_func: f64,
    pub b_dos: f64,
    pub c_dos: f64,
    pub d_dos: f64,
    pub f_dos: f64,
    pub b_non: f64,
    pub c_non: f64,
    pub d_non: f64,
    pub f_non: f64,
    pub alt_percent: f64,
    pub dos_percent: f64,
    pub non_percent: f64,
    pub percent_switch: f64,
    pub model_category: String,
}

impl ModelSummaryRecord {
    pub fn new(record: BestFitRecord, model_category: impl Into<String>) -> Self {
        Self {
            model_number: record.model_number,
            sum_of_squared_residuals: record.sum_of_squared_residuals,
            b_alt_func: record.b_alt_func,
            c_alt_func: record.c_alt_func,
            d_alt_func: record.d_alt_func,
            f_alt_func: record.f_alt_func,
            b_dos: record.b_dos,
            c_dos: record.c_dos,
            d_dos: record.d_dos,
            f_dos: record.f_dos,
            b_non: record.b_non,
            c_non: record.c_non,
            d_non: record.d_non,
            f_non: record.f_non,
            alt_percent: record.alt_percent,
            dos_percent: record.dos_percent,
            non_percent: record.non_percent,
            percent_switch: record.percent_switch,
            model_category: model_category.into(),
        }
    }
}

/// One row of the per-data-point residual table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualRow {
    pub t1: f64,
    pub t2: f64,
    pub expected_pratio: f64,
    pub b_alt: f64,
    pub c_alt: f64,
    pub d_alt: f64,
    pub f_alt: f64,
    pub b_dos: f64,
    pub c_dos: f64,
    pub d_dos: f64,
    pub f_dos: f64,
    pub b_non: f64,
    pub c_non: f64,
    pub d_non: f64,
    pub f_non: f64,
    pub percent_alt: f64,
    pub percent_dos: f64,
    pub percent_non: f64,
    pub percent_switch: f64,
    pub observed_pratio: f64,
    pub residual: f64,
    #[serde(rename = "absolute residual")]
    pub absolute_residual: f64,
    pub model_identifier: usize,
    pub data_point_identifier: usize,
    pub model_category: String,
}

/// One row of the likelihood table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodRecord {
    #[serde(rename = "Model_Category")]
    pub model_category: String,
    #[serde(rename = "Mean")]
    pub mean: f64,
    #[serde(rename = "SD")]
    pub sd: f64,
    #[serde(rename = "Likelihood")]
    pub likelihood: f64,
    #[serde(rename = "Normalized_Likelihood")]
    pub normalized_likelihood: f64,
}

/// One cell of the t1 × t2 probability-ratio surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRow {
    pub t1: f64,
    pub t2: f64,
    pub pratio: f64,
    pub alt_surv_t1: f64,
    pub dos_surv_t1: f64,
    pub non_surv_t1: f64,
    pub alt_surv_t2: f64,
    pub dos_surv_t2: f64,
    pub non_surv_t2: f64,
    #[serde(rename = "log of pratio")]
    pub log_pratio: f64,
}

/// Where a sweep's parameter grid comes from.
#[derive(Debug, Clone)]
pub enum GridSource {
    Preset(FamilyKind),
    File(PathBuf),
}

/// Sweep controls that do not change the winning combination.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Abort with `Cancelled` once this much wall-clock time has elapsed.
    pub deadline: Option<Duration>,
    /// Only accept scores strictly below this bound (the legacy `1.0`
    /// starting minimum, opt-in).
    pub ssr_ceiling: Option<f64>,
}

/// A `fit` run as understood by the pipeline (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub grid: GridSource,
    pub search: SearchOptions,
    /// Best-fit CSV path; `None` means `<family>_sum_of_squares_minimum.csv`.
    pub output: Option<PathBuf>,
    /// Optional per-data-point residual table of the winner.
    pub residuals: Option<PathBuf>,
    /// Optional JSON run summary.
    pub json: Option<PathBuf>,
}
