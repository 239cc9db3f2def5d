//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments and sizes the rayon pool
//! - dispatches to the sweep / residual / likelihood / AIC / surface steps
//! - prints summaries and writes the output tables

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use clap::Parser;

use crate::cli::{
    AicArgs, Cli, Command, EvaluateArgs, FitArgs, LikelihoodArgs, ResidualsArgs, SurfaceArgs,
};
use crate::data::{observed_dataset, top_model, top_models};
use crate::domain::{BestFitRecord, FamilyKind, FitConfig, GridSource, SearchOptions};
use crate::error::{AppError, ErrorKind};
use crate::fit::{
    default_param_counts, group_residuals, presets, rank_by_aic, residual_likelihoods, ModelFamily,
    SweepPlan,
};
use crate::io::{
    read_likelihood_csv, read_residuals_csv, write_aic_report, write_best_fit_csv,
    write_likelihood_csv, write_model_summary_csv, write_residuals_csv, write_summary_json,
    write_surface_csv, format_aic_report, FitSummaryFile,
};
use crate::models::pratio_surface;
use crate::report::{
    format_family_listing, format_fit_summary, format_likelihoods, format_model_summaries,
    top_model_report, FamilyListing,
};

pub mod pipeline;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Entry point for the `dupret` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    configure_threads(cli.threads)?;

    log::info!("start time: {}", Local::now().format(TIME_FORMAT));
    let result = match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Evaluate(args) => handle_evaluate(&args),
        Command::Residuals(args) => handle_residuals(&args),
        Command::Likelihood(args) => handle_likelihood(&args),
        Command::Aic(args) => handle_aic(&args),
        Command::Surface(args) => handle_surface(&args),
        Command::Families => handle_families(),
    };
    log::info!("end time: {}", Local::now().format(TIME_FORMAT));
    result
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A second init (tests, embedding) keeps the first logger.
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn configure_threads(threads: usize) -> Result<(), AppError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| AppError::config(format!("Failed to configure {threads} worker threads: {e}")))?;
    log::debug!("Using {} rayon threads", rayon::current_num_threads());
    Ok(())
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let run = pipeline::run_fit(&config)?;
    write_fit_outputs(&run, config.output.as_deref(), config.residuals.as_deref(), config.json.as_deref())
}

fn handle_evaluate(args: &EvaluateArgs) -> Result<(), AppError> {
    let combination = args.params.to_combination()?;
    let family = ModelFamily::explicit(args.name.clone(), &combination)?;
    let run = pipeline::run_family(family, &SearchOptions::default())?;
    write_fit_outputs(&run, args.output.as_deref(), args.residuals.as_deref(), args.json.as_deref())
}

fn write_fit_outputs(
    run: &pipeline::FitRun,
    output: Option<&Path>,
    residuals: Option<&Path>,
    json: Option<&Path>,
) -> Result<(), AppError> {
    println!("{}", format_fit_summary(&run.outcome, &run.points, &run.evaluation));

    let default_output = PathBuf::from(format!("{}_sum_of_squares_minimum.csv", run.family.name));
    write_best_fit_csv(
        output.unwrap_or(&default_output),
        &[BestFitRecord::from(&run.outcome.best)],
    )?;
    if let Some(path) = residuals {
        write_residuals_csv(path, &run.residuals)?;
    }
    if let Some(path) = json {
        write_summary_json(path, &FitSummaryFile::from_outcome(&run.outcome, Local::now()))?;
    }
    Ok(())
}

fn handle_residuals(args: &ResidualsArgs) -> Result<(), AppError> {
    let points = observed_dataset()?;
    let report = top_model_report(&points, &top_models()?)?;
    println!("{}", format_model_summaries(&report));

    write_residuals_csv(&args.output, &report.rows)?;
    write_model_summary_csv(&args.summary, &report.summaries)?;
    write_model_summary_csv(&args.minimum, std::slice::from_ref(&report.minimum))?;
    Ok(())
}

fn handle_likelihood(args: &LikelihoodArgs) -> Result<(), AppError> {
    let rows = read_residuals_csv(&args.residuals)?;
    let records = residual_likelihoods(&group_residuals(&rows))?;
    println!("{}", format_likelihoods(&records));
    write_likelihood_csv(&args.output, &records)
}

fn handle_aic(args: &AicArgs) -> Result<(), AppError> {
    let records = read_likelihood_csv(&args.likelihoods)?;
    let counts = match &args.params {
        Some(counts) => counts.clone(),
        None => default_param_counts(&records)?,
    };
    let ranking = rank_by_aic(&records, &counts, args.basis)?;
    print!("{}", format_aic_report(&ranking));

    let default_output = PathBuf::from(format!("{}_AIC_output.txt", args.basis.label()));
    write_aic_report(args.output.as_deref().unwrap_or(&default_output), &ranking)
}

fn handle_surface(args: &SurfaceArgs) -> Result<(), AppError> {
    let (name, combination) = match args.model {
        Some(_) if !args.params.is_empty() => {
            return Err(AppError::new(
                ErrorKind::Usage,
                "Use either --model or explicit parameter flags, not both.",
            ));
        }
        Some(kind) => {
            let model = top_model(kind)?;
            (kind.name().to_string(), model.combination)
        }
        None => ("other".to_string(), args.params.to_combination()?),
    };

    let rows = pratio_surface(&combination, args.steps)?;
    let default_output = PathBuf::from(format!("{name}_pratio_surface.csv"));
    write_surface_csv(args.output.as_deref().unwrap_or(&default_output), &rows)
}

fn handle_families() -> Result<(), AppError> {
    let mut entries = Vec::new();
    for family in presets() {
        let plan = SweepPlan::new(&family.grid)?;
        let param_count = FamilyKind::from_name(&family.name)
            .map(|kind| kind.param_count())
            .unwrap_or_default();
        entries.push(FamilyListing {
            name: family.name,
            param_count,
            combinations: plan.len(),
            pruned_dos: plan.pruned_dos,
        });
    }
    print!("{}", format_family_listing(&entries));
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let grid = match (&args.family, &args.grid) {
        (Some(kind), None) => GridSource::Preset(*kind),
        (None, Some(path)) => GridSource::File(path.clone()),
        _ => {
            return Err(AppError::new(
                ErrorKind::Usage,
                "Pass exactly one of --family or --grid.",
            ));
        }
    };

    let deadline = args
        .deadline_secs
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|e| {
                AppError::new(ErrorKind::Usage, format!("Invalid --deadline-secs {secs}: {e}"))
            })
        })
        .transpose()?;

    Ok(FitConfig {
        grid,
        search: SearchOptions {
            deadline,
            ssr_ceiling: args.ssr_ceiling,
        },
        output: args.output.clone(),
        residuals: args.residuals.clone(),
        json: args.json.clone(),
    })
}
