//! CSV ingest for the selection steps.
//!
//! The residual and likelihood tables are read back by column name, so files
//! written by older tooling with extra or reordered columns still load. A
//! malformed row is a hard error that names its line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{LikelihoodRecord, ResidualRow};
use crate::error::AppError;

/// Deserialize every row of a headed CSV.
pub fn read_csv<R: Read, T: DeserializeOwned>(reader: R, what: &str) -> Result<Vec<T>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        // +2: 1-based lines, header on line 1.
        let line = idx + 2;
        let row: T = result.map_err(|e| AppError::io(format!("Invalid {what} row at line {line}: {e}")))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_csv_file<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open {what} '{}': {e}", path.display())))?;
    let rows = read_csv(file, what)?;
    log::info!("Read {} {what} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_residuals_csv(path: &Path) -> Result<Vec<ResidualRow>, AppError> {
    read_csv_file(path, "residual CSV")
}

pub fn read_likelihood_csv(path: &Path) -> Result<Vec<LikelihoodRecord>, AppError> {
    read_csv_file(path, "likelihood CSV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn likelihood_table_reads_by_column_name() {
        let text = "Model_Category,Mean,SD,Likelihood,Normalized_Likelihood\n\
                    3_mix_dup, 0.01,0.1,2.5e-5,0.25\n\
                    ind,0.01,0.1,7.5e-5,0.75\n";
        let rows: Vec<LikelihoodRecord> = read_csv(text.as_bytes(), "likelihood").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].model_category, "3_mix_dup");
        assert!((rows[0].mean - 0.01).abs() < 1e-15);
        assert!((rows[1].normalized_likelihood - 0.75).abs() < 1e-15);
    }

    #[test]
    fn bad_row_names_its_line() {
        let text = "Model_Category,Mean,SD,Likelihood,Normalized_Likelihood\n\
                    ind,0.01,0.1,abc,0.75\n";
        let err = read_csv::<_, LikelihoodRecord>(text.as_bytes(), "likelihood").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn residual_table_reads_spaced_header() {
        let text = "t1,t2,expected_pratio,b_alt,c_alt,d_alt,f_alt,b_dos,c_dos,d_dos,f_dos,\
                    b_non,c_non,d_non,f_non,percent_alt,percent_dos,percent_non,percent_switch,\
                    observed_pratio,residual,absolute residual,model_identifier,data_point_identifier,model_category\n\
                    0.5,0.1,1.0,5,1,5,2,-12,0.6,-0.03,0.03,0,1,10.01,0.01,0.6,0,0.4,0,0.97,-0.03,0.03,2,0,alt_non_dup\n";
        let rows: Vec<ResidualRow> = read_csv(text.as_bytes(), "residual").unwrap();
        assert_eq!(rows[0].model_identifier, 2);
        assert_eq!(rows[0].model_category, "alt_non_dup");
        assert!((rows[0].absolute_residual - 0.03).abs() < 1e-15);
    }
}
