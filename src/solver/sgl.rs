use ndarray::Array2;

use crate::dataset::Dataset;
use crate::error::SglError;
use crate::groups::GroupLayout;
use crate::model::SparseGroupLassoModel;
use crate::options::SolverSettings;
use crate::solver::Solver;
use crate::solver::fista::LeastSquaresProblem;
use crate::solver::prox::{shrink_disjoint_groups, soft_threshold};
use crate::types::{GroupVariant, LambdaPair};

/// Sparse-group lasso with contiguous, disjoint groups.
#[derive(Debug, Clone)]
pub struct SgLassoLeastR<'a> {
    problem: LeastSquaresProblem<'a>,
    layout: GroupLayout,
    settings: SolverSettings,
}

impl<'a> SgLassoLeastR<'a> {
    pub fn new(
        dataset: &'a Dataset,
        group_index: &Array2<f64>,
        settings: SolverSettings,
    ) -> Result<Self, SglError> {
        let layout = GroupLayout::disjoint(group_index, dataset.n_features())?;
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

impl Solver for SgLassoLeastR<'_> {
    type Model = SparseGroupLassoModel;

    fn fit(&self, lambda: LambdaPair) -> Result<SparseGroupLassoModel, SglError> {
        let effective = self
            .problem
            .effective_lambdas(lambda, &self.layout, &self.settings)?;
        let LambdaPair { lambda1, lambda2 } = effective;
        let layout = &self.layout;

        let outcome = self.problem.minimize(
            &self.settings,
            |beta| {
                lambda1 * beta.iter().map(|b| b.abs()).sum::<f64>() + lambda2 * layout.penalty(beta)
            },
            |v, step| {
                soft_threshold(v, lambda1 * step);
                shrink_disjoint_groups(v, layout, lambda2 * step);
            },
        )?;

        Ok(SparseGroupLassoModel {
            variant: GroupVariant::Disjoint,
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
