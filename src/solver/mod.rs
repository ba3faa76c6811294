//! Fitting backends behind the traits the regularization-path driver uses.
//!
//! The driver only needs a way to fit one λ pair and, from the result, a
//! non-zero count and an XML serialization. `SgLassoLeastR` and
//! `OverlappingSgLassoLeastR` implement that contract for the two group
//! variants on top of a shared accelerated-gradient core.

use std::io::{self, Write};

use crate::error::SglError;
use crate::types::LambdaPair;

pub mod fista;
pub mod overlapping;
pub mod prox;
pub mod sgl;

pub use overlapping::OverlappingSgLassoLeastR;
pub use sgl::SgLassoLeastR;

/// A model produced for one λ pair, consumed by a sink and then dropped.
pub trait FittedModel {
    /// Number of exactly non-zero coefficients.
    fn non_zero_feature_count(&self) -> usize;

    /// Number of groups with at least one non-zero coefficient, when the
    /// model knows its groups.
    fn non_zero_group_count(&self) -> Option<usize> {
        None
    }

    fn write_xml(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Fits one model per λ pair over inputs fixed at construction.
pub trait Solver {
    type Model: FittedModel;

    fn fit(&self, lambda: LambdaPair) -> Result<Self::Model, SglError>;
}
