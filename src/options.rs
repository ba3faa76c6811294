//! SLEP option files and the typed solver settings derived from them.
//!
//! An options file holds one `key<TAB>value` pair per line. Keys follow the
//! SLEP toolkit naming (`maxIter`, `tol`, `tFlag`, `rFlag`, ...).

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SglError;
use crate::types::NO_FILE;

/// Raw option name to option value mapping.
pub type SlepOptions = BTreeMap<String, String>;

/// Reads an options file. A missing or unreadable file (or the `-` sentinel)
/// yields an empty mapping.
pub fn read_slep_options(path: &Path) -> SlepOptions {
    log::info!("Processing SLEP options file: {}...", path.display());
    if path.as_os_str() == NO_FILE {
        return SlepOptions::new();
    }
    match File::open(path) {
        Ok(file) => parse_slep_options(BufReader::new(file)),
        Err(e) => {
            log::debug!(
                "SLEP options file '{}' not readable ({e}); using defaults",
                path.display()
            );
            SlepOptions::new()
        }
    }
}

/// Splits every line at its first tab. Lines without a tab are skipped; the
/// value keeps any further tabs verbatim. Later duplicates win. Invalid UTF-8
/// is replaced within its line and reading continues.
pub fn parse_slep_options<R: BufRead>(reader: R) -> SlepOptions {
    let mut opts = SlepOptions::new();
    for chunk in reader.split(b'\n') {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                log::warn!("stopped reading SLEP options early: {e}");
                break;
            }
        };
        let line = String::from_utf8_lossy(&bytes);
        if let Some((key, value)) = line.split_once('\t') {
            opts.insert(key.to_string(), value.to_string());
        }
    }
    opts
}

/// Stopping rule of the accelerated gradient loop (SLEP `tFlag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// |f(k) - f(k-1)| <= tol
    ObjectiveChange,
    /// |f(k) - f(k-1)| <= tol * f(k-1)
    RelativeObjectiveChange,
    /// f(k) <= tol
    ObjectiveValue,
    /// ||x(k) - x(k-1)|| <= tol
    StepNorm,
    /// ||x(k) - x(k-1)|| <= tol * max(||x(k-1)||, 1)
    RelativeStepNorm,
    /// run exactly maxIter iterations
    MaxIterations,
}

impl Termination {
    fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::ObjectiveChange),
            1 => Some(Self::RelativeObjectiveChange),
            2 => Some(Self::ObjectiveValue),
            3 => Some(Self::StepNorm),
            4 => Some(Self::RelativeStepNorm),
            5 => Some(Self::MaxIterations),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolverSettings {
    pub max_iter: usize,
    pub tol: f64,
    pub termination: Termination,
    /// When set, λ values are ratios of the data-dependent λ maxima.
    pub ratio_lambdas: bool,
    /// Inner sweeps of the overlapping-group proximal step.
    pub max_dual_iter: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-4,
            termination: Termination::RelativeObjectiveChange,
            ratio_lambdas: false,
            max_dual_iter: 200,
        }
    }
}

impl SolverSettings {
    pub fn from_slep_options(opts: &SlepOptions) -> Result<Self, SglError> {
        let mut settings = Self::default();
        for (key, value) in opts {
            let raw = value.trim();
            match key.as_str() {
                "maxIter" => settings.max_iter = parse_positive(key, value, raw)?,
                "maxDualIter" => settings.max_dual_iter = parse_positive(key, value, raw)?,
                "tol" => {
                    let tol = raw
                        .parse::<f64>()
                        .map_err(|e| invalid(key, value, e.to_string()))?;
                    if !tol.is_finite() || tol < 0.0 {
                        return Err(invalid(key, value, "must be finite and non-negative"));
                    }
                    settings.tol = tol;
                }
                "tFlag" => {
                    settings.termination = raw
                        .parse::<u8>()
                        .ok()
                        .and_then(Termination::from_flag)
                        .ok_or_else(|| invalid(key, value, "expected an integer in 0..=5"))?;
                }
                "rFlag" => {
                    settings.ratio_lambdas = match raw {
                        "0" => false,
                        "1" => true,
                        _ => return Err(invalid(key, value, "expected 0 or 1")),
                    };
                }
                _ => log::debug!("ignoring unsupported SLEP option '{key}'"),
            }
        }
        Ok(settings)
    }
}

fn parse_positive(key: &str, value: &str, raw: &str) -> Result<usize, SglError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(invalid(key, value, "must be at least 1")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(key, value, e.to_string())),
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> SglError {
    SglError::InvalidOption {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}
