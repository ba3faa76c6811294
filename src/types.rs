use ndarray::Array1;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

use crate::error::SglError;

/// Sentinel path meaning "no file supplied".
pub const NO_FILE: &str = "-";

/// Model variant selector shared by the solver, the model writer and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupVariant {
    /// Contiguous, disjoint groups.
    Disjoint,
    /// Groups may share features; membership comes from the field vector.
    Overlapping,
}

impl GroupVariant {
    pub fn solver_name(self) -> &'static str {
        match self {
            Self::Disjoint => "sg_lasso_leastr",
            Self::Overlapping => "overlapping_sg_lasso_leastr",
        }
    }
}

/// One point of the regularization grid: λ1 (per-feature sparsity) and
/// λ2 (per-group sparsity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LambdaPair {
    pub lambda1: f64,
    pub lambda2: f64,
}

impl LambdaPair {
    pub fn new(lambda1: f64, lambda2: f64) -> Result<Self, SglError> {
        let pair = Self { lambda1, lambda2 };
        pair.validate()?;
        Ok(pair)
    }

    pub fn validate(&self) -> Result<(), SglError> {
        let reason = if !self.lambda1.is_finite() || !self.lambda2.is_finite() {
            Some("values must be finite")
        } else if self.lambda1 < 0.0 || self.lambda2 < 0.0 {
            Some("values must be non-negative")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(SglError::InvalidLambda {
                lambda1: self.lambda1,
                lambda2: self.lambda2,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for LambdaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            shortest_repr(self.lambda1),
            shortest_repr(self.lambda2)
        )
    }
}

/// λ-list values are widened `f32`s; they print at single precision so
/// `0.1` reads back as `0.1`.
fn shortest_repr(value: f64) -> String {
    let narrow = value as f32;
    if f64::from(narrow) == value {
        narrow.to_string()
    } else {
        value.to_string()
    }
}

#[repr(transparent)]
#[derive(Clone, Debug, PartialEq)]
pub struct Coefficients(pub Array1<f64>);

impl Coefficients {
    pub fn non_zero_count(&self) -> usize {
        self.0.iter().filter(|&&v| v != 0.0).count()
    }
}

impl Deref for Coefficients {
    type Target = Array1<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Array1<f64>> for Coefficients {
    fn from(values: Array1<f64>) -> Self {
        Self(values)
    }
}
