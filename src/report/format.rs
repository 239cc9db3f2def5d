//! Formatted terminal output.
//!
//! We keep formatting code in one place so the search and selection code
//! stays free of presentation details.

use crate::data::ObservedDataPoint;
use crate::domain::{Composition, LikelihoodRecord, ParameterCombination, ShapeParams};
use crate::fit::SearchOutcome;
use crate::models::DatasetEvaluation;
use crate::report::TopModelReport;

/// One line of the `families` listing.
#[derive(Debug, Clone)]
pub struct FamilyListing {
    pub name: String,
    pub param_count: usize,
    pub combinations: usize,
    pub pruned_dos: usize,
}

/// Format the summary of one sweep plus the winner's per-point fit.
pub fn format_fit_summary(
    outcome: &SearchOutcome,
    points: &[ObservedDataPoint],
    evaluation: &DatasetEvaluation,
) -> String {
    let mut out = String::new();

    out.push_str("=== dupret - duplicate retention grid search ===\n");
    out.push_str(&format!("Family: {}\n", outcome.family));
    out.push_str(&format!(
        "Combinations: evaluated={} | non-finite={} | Dos triples pruned={}\n",
        outcome.evaluated, outcome.non_finite, outcome.pruned_dos
    ));
    out.push_str(&format!("Elapsed: {:.2}s\n", outcome.elapsed.as_secs_f64()));

    out.push_str("\nBest combination:\n");
    out.push_str(&format!("- model_number: {}\n", outcome.best.model_number));
    out.push_str(&format!(
        "- sum_of_squared_residuals: {:.6}\n",
        outcome.best.sum_of_squared_residuals
    ));
    out.push_str(&format_combination(&outcome.best.combination));
    out.push('\n');

    out.push_str(&format_point_table(points, evaluation));
    out
}

/// Parameter block for a single combination.
pub fn format_combination(combination: &ParameterCombination) -> String {
    let mut out = String::new();
    out.push_str(&format!("- Alt_func: {}\n", fmt_shape(&combination.alt_func)));
    out.push_str(&format!("- Dos     : {}\n", fmt_shape(&combination.dos)));
    out.push_str(&format!("- Non     : {}\n", fmt_shape(&combination.non)));
    out.push_str(&format!("- mix     : {}\n", fmt_composition(&combination.composition)));
    out.push_str(&format!("- switch  : {}\n", combination.switch_fraction));
    out
}

/// Observed vs expected ratio per data point.
pub fn format_point_table(points: &[ObservedDataPoint], evaluation: &DatasetEvaluation) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<22} {:>8} {:>8} {:>10} {:>10} {:>10}",
            "species", "t1", "t2", "observed", "expected", "residual"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<22} {:-<8} {:-<8} {:-<10} {:-<10} {:-<10}", "", "", "", "", "", ""),
    );

    for (point, eval) in points.iter().zip(&evaluation.points) {
        push_line(
            &mut out,
            format!(
                "{:<22} {:>8.4} {:>8.4} {:>10.4} {:>10.4} {:>10.4}",
                truncate(point.name, 22),
                point.t1,
                point.t2,
                point.observed_ratio,
                eval.expected_ratio,
                eval.residual
            ),
        );
    }
    out
}

pub fn format_family_listing(entries: &[FamilyListing]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<12} {:>3} {:>12} {:>12}", "family", "k", "combinations", "dos_pruned"),
    );
    push_line(&mut out, format!("{:-<12} {:-<3} {:-<12} {:-<12}", "", "", "", ""));
    for e in entries {
        push_line(
            &mut out,
            format!(
                "{:<12} {:>3} {:>12} {:>12}",
                e.name, e.param_count, e.combinations, e.pruned_dos
            ),
        );
    }
    out
}

/// SSR per fixed model with the minimum marked.
pub fn format_model_summaries(report: &TopModelReport) -> String {
    let mut out = String::new();
    out.push_str("Model SSR:\n");
    for s in &report.summaries {
        let chosen = if s.model_number == report.minimum.model_number { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:>2} {:<12} SSR={:.6}\n",
            s.model_number, s.model_category, s.sum_of_squared_residuals
        ));
    }
    out
}

pub fn format_likelihoods(records: &[LikelihoodRecord]) -> String {
    let mut out = String::new();
    if let Some(first) = records.first() {
        out.push_str(&format!("Pooled residuals: mean={:.6} sd={:.6}\n", first.mean, first.sd));
    }
    for r in records {
        out.push_str(&format!(
            "  {:<12} L={:.6e} normalized={:.6}\n",
            r.model_category, r.likelihood, r.normalized_likelihood
        ));
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_shape(s: &ShapeParams) -> String {
    format!("b={} c={} d={} f={}", s.b, s.c, s.d, s.f)
}

fn fmt_composition(c: &Composition) -> String {
    format!("alt={} dos={} non={}", c.alt, c.dos, c.non)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
