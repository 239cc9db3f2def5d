//! Command-line parsing for the duplicate-retention model fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! search and selection code. Everything here is converted into plain config
//! structs by `app` before any work happens.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Composition, FamilyKind, ParameterCombination, ShapeParams};
use crate::error::{AppError, ErrorKind};
use crate::fit::LikelihoodBasis;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dupret", version, about = "Gene-duplicate retention model fitting")]
pub struct Cli {
    /// Worker threads for the sweep (0 = one per core).
    #[arg(long, global = true, env = "DUPRET_THREADS", default_value_t = 0)]
    pub threads: usize,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Grid-search one model family and write its best combination.
    Fit(FitArgs),
    /// Evaluate a single, fully specified combination.
    Evaluate(EvaluateArgs),
    /// Residual tables for the fixed top model of every family.
    Residuals(ResidualsArgs),
    /// Likelihood of each model from a residual table.
    Likelihood(LikelihoodArgs),
    /// Rank models by AIC from a likelihood table.
    Aic(AicArgs),
    /// Probability-ratio surface over a t1 × t2 grid.
    Surface(SurfaceArgs),
    /// List the built-in families.
    Families,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Built-in family to sweep.
    #[arg(long, value_enum, required_unless_present = "grid", conflicts_with = "grid")]
    pub family: Option<FamilyKind>,

    /// Custom grid JSON instead of a built-in family.
    #[arg(long, value_name = "JSON")]
    pub grid: Option<PathBuf>,

    /// Best-fit CSV (default `<family>_sum_of_squares_minimum.csv`).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Also write the winner's per-point residual table.
    #[arg(long, value_name = "CSV")]
    pub residuals: Option<PathBuf>,

    /// Write a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Abort the sweep after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<f64>,

    /// Only accept combinations whose SSR is below this value.
    #[arg(long)]
    pub ssr_ceiling: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub params: ExplicitParams,

    /// Model category written to the output tables.
    #[arg(long, default_value = "other")]
    pub name: String,

    /// Best-fit CSV (default `<name>_sum_of_squares_minimum.csv`).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "CSV")]
    pub residuals: Option<PathBuf>,

    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// A single combination spelled out flag by flag.
///
/// Every flag is optional at the parser level so `surface` can take either a
/// top model or explicit values; missing flags are reported by
/// [`ExplicitParams::to_combination`].
#[derive(Debug, Args, Clone, Default)]
pub struct ExplicitParams {
    #[arg(long)]
    pub b_alt: Option<f64>,
    #[arg(long)]
    pub c_alt: Option<f64>,
    #[arg(long)]
    pub d_alt: Option<f64>,
    #[arg(long)]
    pub f_alt: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub b_dos: Option<f64>,
    #[arg(long)]
    pub c_dos: Option<f64>,
    /// `f_dos` is always `-d_dos`.
    #[arg(long, allow_negative_numbers = true)]
    pub d_dos: Option<f64>,
    #[arg(long)]
    pub d_non: Option<f64>,
    #[arg(long)]
    pub f_non: Option<f64>,
    /// Alt_func fraction.
    #[arg(long)]
    pub alt: Option<f64>,
    /// Dos fraction.
    #[arg(long)]
    pub dos: Option<f64>,
    /// Non fraction.
    #[arg(long)]
    pub non: Option<f64>,
    /// Fraction of Alt_func copies that switch to Non-like decay.
    #[arg(long)]
    pub switch: Option<f64>,
}

impl ExplicitParams {
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|(_, v)| v.is_none())
    }

    fn values(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("--b-alt", self.b_alt),
            ("--c-alt", self.c_alt),
            ("--d-alt", self.d_alt),
            ("--f-alt", self.f_alt),
            ("--b-dos", self.b_dos),
            ("--c-dos", self.c_dos),
            ("--d-dos", self.d_dos),
            ("--d-non", self.d_non),
            ("--f-non", self.f_non),
            ("--alt", self.alt),
            ("--dos", self.dos),
            ("--non", self.non),
            ("--switch", self.switch),
        ]
    }

    /// Assemble and validate the combination.
    ///
    /// `--switch` defaults to 0; every other flag is required.
    pub fn to_combination(&self) -> Result<ParameterCombination, AppError> {
        let values = self.values();
        let missing: Vec<&str> = values[..12]
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(flag, _)| *flag)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::new(
                ErrorKind::Usage,
                format!("Missing parameter flags: {}", missing.join(", ")),
            ));
        }

        let [b_alt, c_alt, d_alt, f_alt, b_dos, c_dos, d_dos, d_non, f_non, alt, dos, non, switch] =
            values.map(|(_, v)| v.unwrap_or(0.0));

        ParameterCombination::new(
            ShapeParams::new(b_alt, c_alt, d_alt, f_alt),
            ShapeParams::dos(b_dos, c_dos, d_dos),
            ShapeParams::non(d_non, f_non),
            Composition::new(alt, dos, non),
            switch,
        )
    }
}

#[derive(Debug, Args, Clone)]
pub struct ResidualsArgs {
    /// Per-data-point residual table.
    #[arg(long, default_value = "residuals_model_selection.csv")]
    pub output: PathBuf,

    /// Per-model SSR table.
    #[arg(long, default_value = "top_model_selection_sum_of_squares.csv")]
    pub summary: PathBuf,

    /// Single-row table with the lowest SSR.
    #[arg(long, default_value = "top_model_selection_sum_of_squares_minimum.csv")]
    pub minimum: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct LikelihoodArgs {
    /// Residual table written by `dupret residuals`.
    #[arg(long, value_name = "CSV")]
    pub residuals: PathBuf,

    #[arg(short = 'o', long, default_value = "likelihood_residuals.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct AicArgs {
    /// Likelihood table written by `dupret likelihood`.
    #[arg(long, value_name = "CSV")]
    pub likelihoods: PathBuf,

    /// Which likelihood column to use.
    #[arg(long, value_enum, default_value_t = LikelihoodBasis::Actual)]
    pub basis: LikelihoodBasis,

    /// Parameter count per model, in table order (default: by family name).
    #[arg(long, value_delimiter = ',')]
    pub params: Option<Vec<usize>>,

    /// Report path (default `<Actual|Normalized>_AIC_output.txt`).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SurfaceArgs {
    /// Use the stored top model of this family.
    #[arg(long, value_enum)]
    pub model: Option<FamilyKind>,

    #[command(flatten)]
    pub params: ExplicitParams,

    /// Steps per axis, starting at 0.01 with step 0.01.
    #[arg(long, default_value_t = crate::models::DEFAULT_SURFACE_STEPS)]
    pub steps: usize,

    /// Surface CSV (default `<model>_pratio_surface.csv`).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}
