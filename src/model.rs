use std::io::{self, Write};

use crate::solver::FittedModel;
use crate::types::{Coefficients, GroupVariant, LambdaPair};

/// Result of one sparse-group-lasso least-squares fit.
#[derive(Debug, Clone)]
pub struct SparseGroupLassoModel {
    pub variant: GroupVariant,
    /// λ pair as requested by the caller.
    pub lambda: LambdaPair,
    /// λ pair after ratio scaling, as used in the objective.
    pub effective_lambda: LambdaPair,
    pub coefficients: Coefficients,
    pub non_zero_groups: usize,
    pub iterations: usize,
    pub objective: f64,
    pub converged: bool,
}

impl FittedModel for SparseGroupLassoModel {
    fn non_zero_feature_count(&self) -> usize {
        self.coefficients.non_zero_count()
    }

    fn non_zero_group_count(&self) -> Option<usize> {
        Some(self.non_zero_groups)
    }

    fn write_xml(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        writeln!(out, r#"<model solver="{}">"#, self.variant.solver_name())?;
        writeln!(out, "  <lambda1>{}</lambda1>", self.lambda.lambda1)?;
        writeln!(out, "  <lambda2>{}</lambda2>", self.lambda.lambda2)?;
        writeln!(
            out,
            "  <effective_lambda1>{}</effective_lambda1>",
            self.effective_lambda.lambda1
        )?;
        writeln!(
            out,
            "  <effective_lambda2>{}</effective_lambda2>",
            self.effective_lambda.lambda2
        )?;
        writeln!(out, "  <iterations>{}</iterations>", self.iterations)?;
        writeln!(out, "  <converged>{}</converged>", self.converged)?;
        writeln!(out, "  <objective>{}</objective>", self.objective)?;
        writeln!(
            out,
            "  <non_zero_features>{}</non_zero_features>",
            self.non_zero_feature_count()
        )?;
        writeln!(
            out,
            "  <non_zero_groups>{}</non_zero_groups>",
            self.non_zero_groups
        )?;
        writeln!(out, r#"  <weights count="{}">"#, self.coefficients.len())?;
        for w in self.coefficients.iter() {
            writeln!(out, "    <item>{w}</item>")?;
        }
        writeln!(out, "  </weights>")?;
        writeln!(out, "</model>")?;
        Ok(())
    }
}
