use ndarray::{Array1, Array2};

use crate::dataset::Dataset;
use crate::error::SglError;
use crate::groups::GroupLayout;
use crate::model::SparseGroupLassoModel;
use crate::options::SolverSettings;
use crate::solver::Solver;
use crate::solver::fista::LeastSquaresProblem;
use crate::solver::prox::{shrink_overlapping_groups, soft_threshold};
use crate::types::{GroupVariant, LambdaPair};

/// Sparse-group lasso whose groups may share features. Group membership is
/// read through the field vector.
#[derive(Debug, Clone)]
pub struct OverlappingSgLassoLeastR<'a> {
    problem: LeastSquaresProblem<'a>,
    layout: GroupLayout,
    settings: SolverSettings,
}

impl<'a> OverlappingSgLassoLeastR<'a> {
    pub fn new(
        dataset: &'a Dataset,
        group_index: &Array2<f64>,
        field: &Array1<f64>,
        settings: SolverSettings,
    ) -> Result<Self, SglError> {
        let layout = GroupLayout::overlapping(group_index, field, dataset.n_features())?;
        Ok(Self {
            problem: LeastSquaresProblem::new(dataset)?,
            layout,
            settings,
        })
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }
}

impl Solver for OverlappingSgLassoLeastR<'_> {
    type Model = SparseGroupLassoModel;

    fn fit(&self, lambda: LambdaPair) -> Result<SparseGroupLassoModel, SglError> {
        let effective = self
            .problem
            .effective_lambdas(lambda, &self.layout, &self.settings)?;
        let LambdaPair { lambda1, lambda2 } = effective;
        let layout = &self.layout;
        let max_dual_iter = self.settings.max_dual_iter;

        // prox of ℓ1 + overlapping group norms = group prox after soft-thresholding.
        let outcome = self.problem.minimize(
            &self.settings,
            |beta| {
                lambda1 * beta.iter().map(|b| b.abs()).sum::<f64>() + lambda2 * layout.penalty(beta)
            },
            |v, step| {
                soft_threshold(v, lambda1 * step);
                shrink_overlapping_groups(v, layout, lambda2 * step, max_dual_iter);
            },
        )?;

        Ok(SparseGroupLassoModel {
            variant: GroupVariant::Overlapping,
            lambda,
            effective_lambda: effective,
            non_zero_groups: layout.non_zero_groups(outcome.beta.view()),
            coefficients: outcome.beta,
            iterations: outcome.iterations,
            objective: outcome.objective,
            converged: outcome.converged,
        })
    }
}
