//! Comma-delimited numeric inputs: features, responses, group indices and the
//! overlapping-group field vector.
//!
//! Files carry no header. An empty field reads as `0.0`, which is how a
//! trailing delimiter ends up as the sentinel zero of a field vector.

use csv::{ReaderBuilder, Trim};
use ndarray::{Array1, Array2};
use std::io::Read;
use std::path::Path;

use crate::error::SglError;

/// Read-only inputs shared by every fit of a sweep.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// features × samples
    pub features: Array2<f64>,
    /// one value per sample
    pub responses: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, responses: Array1<f64>) -> Result<Self, SglError> {
        check_sample_counts(&features, &responses)?;
        Ok(Self {
            features,
            responses,
        })
    }

    pub fn load(features: &Path, responses: &Path) -> Result<Self, SglError> {
        let features = load_features(features)?;
        let responses = load_responses(responses)?;
        Self::new(features, responses)
    }

    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }
}

pub fn check_sample_counts(features: &Array2<f64>, responses: &Array1<f64>) -> Result<(), SglError> {
    if features.ncols() != responses.len() {
        return Err(SglError::SampleCountMismatch {
            features: features.ncols(),
            responses: responses.len(),
        });
    }
    Ok(())
}

/// Reads every record as a row of numbers.
pub fn parse_numeric_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<Vec<f64>>, SglError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let record = rec.map_err(|source| SglError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row = Vec::with_capacity(record.len());
        for (j, raw) in record.iter().enumerate() {
            let value = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>().map_err(|e| {
                    SglError::data(path, format!("row {}, column {}: '{raw}' ({e})", i + 1, j + 1))
                })?
            };
            if !value.is_finite() {
                return Err(SglError::data(
                    path,
                    format!("non-finite value at row {}, column {}", i + 1, j + 1),
                ));
            }
            row.push(value);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn read_rows(path: &Path) -> Result<Vec<Vec<f64>>, SglError> {
    let file = std::fs::File::open(path).map_err(|e| SglError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let rows = parse_numeric_rows(file, path)?;
    if rows.is_empty() {
        return Err(SglError::data(path, "file has no rows"));
    }
    Ok(rows)
}

/// Rows of equal width, transposed: file rows become matrix columns.
fn transposed(rows: &[Vec<f64>], path: &Path) -> Result<Array2<f64>, SglError> {
    let width = rows[0].len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(SglError::data(
            path,
            format!(
                "row width mismatch: row {} has {} fields, expected {width}",
                i + 1,
                row.len()
            ),
        ));
    }
    let mut out = Array2::<f64>::zeros((width, rows.len()));
    for (j, row) in rows.iter().enumerate() {
        for (i, &v) in row.iter().enumerate() {
            out[[i, j]] = v;
        }
    }
    Ok(out)
}

/// One sample per line, one feature per column; returned features × samples.
pub fn load_features(path: &Path) -> Result<Array2<f64>, SglError> {
    let rows = read_rows(path)?;
    transposed(&rows, path)
}

/// All values in reading order.
pub fn load_responses(path: &Path) -> Result<Array1<f64>, SglError> {
    let rows = read_rows(path)?;
    Ok(rows.into_iter().flatten().collect())
}

/// One group per line (`start,end[,weight]`); returned fields × groups.
pub fn load_group_index(path: &Path) -> Result<Array2<f64>, SglError> {
    let rows = read_rows(path)?;
    transposed(&rows, path)
}

/// Field vector with the trailing sentinel zero removed.
pub fn load_field(path: &Path) -> Result<Array1<f64>, SglError> {
    let rows = read_rows(path)?;
    Ok(strip_trailing_sentinel(rows.into_iter().flatten().collect()))
}

pub fn strip_trailing_sentinel(field: Array1<f64>) -> Array1<f64> {
    match field.as_slice() {
        Some([head @ .., last]) if *last == 0.0 => Array1::from(head.to_vec()),
        _ => field,
    }
}
