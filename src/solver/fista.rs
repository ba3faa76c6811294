//! Accelerated proximal gradient for ½‖Aβ − y‖² plus a penalty given by its
//! proximal map, with SLEP-style termination rules.

use faer::{Mat, Side};
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::dataset::Dataset;
use crate::error::SglError;
use crate::groups::GroupLayout;
use crate::options::{SolverSettings, Termination};
use crate::solver::prox::soft_threshold;
use crate::types::{Coefficients, LambdaPair};

/// Least-squares data term over a shared, read-only dataset.
#[derive(Debug, Clone)]
pub struct LeastSquaresProblem<'a> {
    /// features × samples, i.e. Aᵀ
    features: ArrayView2<'a, f64>,
    responses: ArrayView1<'a, f64>,
    /// Aᵀy
    correlation: Array1<f64>,
    lipschitz: f64,
}

#[derive(Debug, Clone)]
pub struct FistaOutcome {
    pub beta: Coefficients,
    pub iterations: usize,
    pub objective: f64,
    pub converged: bool,
}

impl<'a> LeastSquaresProblem<'a> {
    pub fn new(dataset: &'a Dataset) -> Result<Self, SglError> {
        if dataset.n_features() == 0 || dataset.n_samples() == 0 {
            return Err(SglError::Solver(format!(
                "empty design: {} features, {} samples",
                dataset.n_features(),
                dataset.n_samples()
            )));
        }
        let features = dataset.features.view();
        let responses = dataset.responses.view();
        let correlation = features.dot(&responses);
        let lipschitz = top_eigenvalue(features)?;
        log::debug!("least-squares Lipschitz constant {lipschitz:.6e}");
        Ok(Self {
            features,
            responses,
            correlation,
            lipschitz,
        })
    }

    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    pub fn lipschitz(&self) -> f64 {
        self.lipschitz
    }

    /// Aβ − y
    fn residual(&self, beta: &Array1<f64>) -> Array1<f64> {
        self.features.t().dot(beta) - &self.responses
    }

    fn loss(&self, beta: &Array1<f64>) -> f64 {
        let r = self.residual(beta);
        0.5 * r.dot(&r)
    }

    /// Resolves ratio-mode λ values (SLEP `rFlag = 1`) against the data:
    /// λ1 = z1·‖Aᵀy‖∞ and λ2 = z2·max_g ‖soft(Aᵀy, λ1)_g‖₂ / w_g.
    pub fn effective_lambdas(
        &self,
        requested: LambdaPair,
        layout: &GroupLayout,
        settings: &SolverSettings,
    ) -> Result<LambdaPair, SglError> {
        requested.validate()?;
        if !settings.ratio_lambdas {
            return Ok(requested);
        }
        if requested.lambda1 > 1.0 || requested.lambda2 > 1.0 {
            return Err(SglError::InvalidLambda {
                lambda1: requested.lambda1,
                lambda2: requested.lambda2,
                reason: "ratio-mode values must lie in [0, 1]".to_string(),
            });
        }
        let lambda1_max = self.correlation.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let lambda1 = requested.lambda1 * lambda1_max;

        let mut shrunk = self.correlation.clone();
        soft_threshold(&mut shrunk, lambda1);
        let lambda2_max = layout
            .groups()
            .iter()
            .filter(|g| g.weight > 0.0)
            .map(|g| GroupLayout::group_norm(g, shrunk.view()) / g.weight)
            .fold(0.0_f64, f64::max);

        Ok(LambdaPair {
            lambda1,
            lambda2: requested.lambda2 * lambda2_max,
        })
    }

    /// FISTA from β = 0 with step 1/L. `penalty` evaluates the non-smooth term
    /// and `prox` applies its proximal map for the given step.
    pub fn minimize<P, X>(
        &self,
        settings: &SolverSettings,
        penalty: P,
        mut prox: X,
    ) -> Result<FistaOutcome, SglError>
    where
        P: Fn(ArrayView1<'_, f64>) -> f64,
        X: FnMut(&mut Array1<f64>, f64),
    {
        let p = self.n_features();
        let step = if self.lipschitz > 0.0 {
            1.0 / self.lipschitz
        } else {
            1.0
        };

        let mut beta = Array1::<f64>::zeros(p);
        let mut beta_prev = beta.clone();
        let mut t_prev = 1.0_f64;
        let mut objective_prev = self.loss(&beta) + penalty(beta.view());
        let mut objective = objective_prev;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < settings.max_iter {
            iterations += 1;
            let t = 0.5 * (1.0 + (1.0 + 4.0 * t_prev * t_prev).sqrt());
            let momentum = (t_prev - 1.0) / t;
            let search = &beta + &((&beta - &beta_prev) * momentum);

            let gradient = self.features.dot(&self.residual(&search));
            let mut candidate = &search - &(gradient * step);
            prox(&mut candidate, step);
            // Gradient-based momentum restart (O'Donoghue & Candès).
            let restart = (&search - &candidate).dot(&(&candidate - &beta)) > 0.0;

            objective = self.loss(&candidate) + penalty(candidate.view());
            if !objective.is_finite() {
                return Err(SglError::Solver(format!(
                    "objective became non-finite at iteration {iterations}"
                )));
            }

            let delta = &candidate - &beta;
            let step_norm = delta.dot(&delta).sqrt();
            let prev_norm = beta.dot(&beta).sqrt();
            beta_prev = std::mem::replace(&mut beta, candidate);
            t_prev = if restart { 1.0 } else { t };

            converged = match settings.termination {
                Termination::ObjectiveChange => (objective - objective_prev).abs() <= settings.tol,
                Termination::RelativeObjectiveChange => {
                    (objective - objective_prev).abs() <= settings.tol * objective_prev
                }
                Termination::ObjectiveValue => objective <= settings.tol,
                Termination::StepNorm => step_norm <= settings.tol,
                Termination::RelativeStepNorm => step_norm <= settings.tol * prev_norm.max(1.0),
                Termination::MaxIterations => iterations >= settings.max_iter,
            };
            if converged {
                break;
            }
            objective_prev = objective;
        }

        if !converged {
            log::debug!(
                "accelerated gradient stopped at maxIter={} without meeting {:?}",
                settings.max_iter,
                settings.termination
            );
        }

        Ok(FistaOutcome {
            beta: Coefficients::from(beta),
            iterations,
            objective,
            converged,
        })
    }
}

/// Largest eigenvalue of AᵀA, with `features` = Aᵀ. Decomposes the smaller
/// of AᵀA and AAᵀ; both share their non-zero spectrum.
fn top_eigenvalue(features: ArrayView2<'_, f64>) -> Result<f64, SglError> {
    let gram = if features.nrows() <= features.ncols() {
        features.dot(&features.t())
    } else {
        features.t().dot(&features)
    };
    let n = gram.nrows();
    let gram = Mat::from_fn(n, n, |i, j| gram[[i, j]]);
    let eigen = gram
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| SglError::Solver(format!("Gram eigendecomposition failed: {e:?}")))?;
    let values = eigen.S().column_vector().as_mat();
    Ok((0..values.nrows())
        .map(|i| values[(i, 0)])
        .fold(0.0_f64, f64::max))
}
