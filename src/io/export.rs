//! Export result tables to CSV and the AIC report to text.
//!
//! Column names are the ones downstream scripts read, so every table is
//! written straight from its `serde` row type. Writers take any `Write` and
//! have a path-based wrapper for the CLI.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{BestFitRecord, LikelihoodRecord, ModelSummaryRecord, ResidualRow, SurfaceRow};
use crate::error::AppError;
use crate::fit::AicRanking;

/// Serialize `rows` as CSV (header from the first row's field names).
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T], what: &str) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write {what} row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush {what}: {e}")))?;
    Ok(())
}

fn create(path: &Path, what: &str) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {what} '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_csv_file<T: Serialize>(path: &Path, rows: &[T], what: &str) -> Result<(), AppError> {
    write_csv(create(path, what)?, rows, what)?;
    log::info!("Wrote {} {what} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_best_fit_csv(path: &Path, records: &[BestFitRecord]) -> Result<(), AppError> {
    write_csv_file(path, records, "best-fit CSV")
}

pub fn write_model_summary_csv(path: &Path, records: &[ModelSummaryRecord]) -> Result<(), AppError> {
    write_csv_file(path, records, "model summary CSV")
}

pub fn write_residuals_csv(path: &Path, rows: &[ResidualRow]) -> Result<(), AppError> {
    write_csv_file(path, rows, "residual CSV")
}

pub fn write_likelihood_csv(path: &Path, records: &[LikelihoodRecord]) -> Result<(), AppError> {
    write_csv_file(path, records, "likelihood CSV")
}

pub fn write_surface_csv(path: &Path, rows: &[SurfaceRow]) -> Result<(), AppError> {
    write_csv_file(path, rows, "surface CSV")
}

/// Plain-text AIC report.
///
/// ```text
/// Model <name>: AIC = <v>
/// ...
///
/// Best Model: Model <name> with AIC = <v>
///
/// Ordered List of AIC Values
/// [v1 v2 ...]
/// ```
pub fn format_aic_report(ranking: &AicRanking) -> String {
    let mut out = String::new();
    for e in &ranking.entries {
        out.push_str(&format!("Model {}: AIC = {}\n", e.model_category, e.aic));
    }

    let best = ranking.best_entry();
    out.push_str(&format!(
        "\nBest Model: Model {} with AIC = {}\n",
        best.model_category, best.aic
    ));

    let ordered: Vec<String> = ranking.sorted_values().iter().map(|v| v.to_string()).collect();
    out.push_str("\nOrdered List of AIC Values\n");
    out.push_str(&format!("[{}]\n", ordered.join(" ")));
    out
}

pub fn write_aic_report(path: &Path, ranking: &AicRanking) -> Result<(), AppError> {
    let mut out = create(path, "AIC report")?;
    out.write_all(format_aic_report(ranking).as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| AppError::io(format!("Failed to write AIC report '{}': {e}", path.display())))?;
    log::info!("Wrote AIC report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::top_model;
    use crate::domain::FamilyKind;
    use crate::fit::{AicEntry, AicRanking};

    fn header_of(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn best_fit_header_matches_downstream_columns() {
        let model = top_model(FamilyKind::AltNonMut).unwrap();
        let record = BestFitRecord::new(42, &model.combination, 0.0123);
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record], "best-fit CSV").unwrap();

        assert_eq!(
            header_of(&buf),
            "model_number,sum_of_squared_residuals,b_alt_func,c_alt_func,d_alt_func,f_alt_func,\
             b_dos,c_dos,d_dos,f_dos,b_non,c_non,d_non,f_non,alt_percent,dos_percent,non_percent,percent_switch"
        );
        let body = String::from_utf8(buf).unwrap();
        assert!(body.lines().nth(1).unwrap().starts_with("42,0.0123,5.0,5.0,0.5,8.0"));
    }

    #[test]
    fn summary_header_appends_category() {
        let model = top_model(FamilyKind::Ind).unwrap();
        let record = ModelSummaryRecord::new(BestFitRecord::new(0, &model.combination, 0.1), "ind");
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record], "summary").unwrap();
        assert!(header_of(&buf).ends_with(",percent_switch,model_category"));
        assert!(String::from_utf8(buf).unwrap().trim_end().ends_with(",ind"));
    }

    #[test]
    fn renamed_columns_are_written_verbatim() {
        let likelihood = LikelihoodRecord {
            model_category: "ind".into(),
            mean: 0.0,
            sd: 1.0,
            likelihood: 0.5,
            normalized_likelihood: 1.0,
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &[likelihood], "likelihood").unwrap();
        assert_eq!(header_of(&buf), "Model_Category,Mean,SD,Likelihood,Normalized_Likelihood");

        let row = SurfaceRow {
            t1: 0.01,
            t2: 0.01,
            pratio: 1.0,
            alt_surv_t1: 1.0,
            dos_surv_t1: 1.0,
            non_surv_t1: 1.0,
            alt_surv_t2: 1.0,
            dos_surv_t2: 1.0,
            non_surv_t2: 1.0,
            log_pratio: 0.0,
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &[row], "surface").unwrap();
        assert!(header_of(&buf).ends_with(",non_surv_t2,log of pratio"));
    }

    #[test]
    fn aic_report_layout() {
        let ranking = AicRanking {
            entries: vec![
                AicEntry {
                    model_category: "3mix_dup".into(),
                    param_count: 10,
                    likelihood: 0.0,
                    aic: 30.5,
                },
                AicEntry {
                    model_category: "ind".into(),
                    param_count: 0,
                    likelihood: 0.0,
                    aic: 12.25,
                },
            ],
            best: 1,
        };
        let text = format_aic_report(&ranking);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Model 3mix_dup: AIC = 30.5");
        assert_eq!(lines[1], "Model ind: AIC = 12.25");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Best Model: Model ind with AIC = 12.25");
        assert_eq!(lines[5], "Ordered List of AIC Values");
        assert_eq!(lines[6], "[12.25 30.5]");
    }
}
