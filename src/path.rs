//! Regularization-path driver.
//!
//! Pairs are visited strictly in input order. With gene-count pruning active,
//! two scalars decide which pairs are fit: a ceiling on λ2 and the smallest
//! λ2 seen so far. Pruning assumes that, for a fixed λ1, the number of
//! selected features does not decrease as λ2 decreases. Nothing checks that
//! assumption; a non-monotone solver can make the sweep skip or stop early on
//! pairs that would have selected enough features.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::SglError;
use crate::label::{single_output_path, sweep_output_path};
use crate::sink::{ModelSink, PersistOutcome};
use crate::solver::{FittedModel, Solver};
use crate::types::LambdaPair;

/// Whether the sweep prunes on the selected-feature count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pruning {
    /// Every pair is fit and persisted.
    Disabled,
    /// A fit with at most `threshold` non-zero features tightens the λ2
    /// ceiling, or ends the sweep when it happened at the smallest λ2 so far.
    /// A negative threshold never triggers.
    GeneCount { threshold: i64 },
}

/// Decision taken after a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Continue,
    /// The ceiling dropped to this pair's λ2.
    Tighten,
    /// No further pair is visited.
    Stop,
}

/// Pruning state carried across one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PruningState {
    /// Pairs with λ2 above this are skipped without fitting.
    pub max_group_threshold: f64,
    /// Running minimum of every λ2 visited, skipped pairs included.
    pub min_group_seen: f64,
}

impl Default for PruningState {
    fn default() -> Self {
        Self {
            max_group_threshold: 1.0,
            min_group_seen: 1.0,
        }
    }
}

impl PruningState {
    /// Registers a visit and reports whether the pair should be fit.
    pub fn admit(&mut self, lambda2: f64) -> bool {
        self.min_group_seen = self.min_group_seen.min(lambda2);
        lambda2 <= self.max_group_threshold
    }

    /// Applies the outcome of a fit at `lambda2`.
    pub fn record(&mut self, lambda2: f64, non_zero: usize, threshold: i64) -> Verdict {
        if i64::try_from(non_zero).unwrap_or(i64::MAX) > threshold {
            return Verdict::Continue;
        }
        if lambda2 == self.min_group_seen {
            return Verdict::Stop;
        }
        self.max_group_threshold = lambda2;
        Verdict::Tighten
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairOutcome {
    /// λ2 exceeded the ceiling in force when the pair was visited.
    Skipped { ceiling: f64 },
    Fitted {
        non_zero_features: usize,
        non_zero_groups: Option<usize>,
        output: PersistOutcome,
        verdict: Verdict,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRecord {
    pub lambda: LambdaPair,
    pub outcome: PairOutcome,
}

/// Every visited pair in visiting order. Pairs after an early stop are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub pruning: Pruning,
    pub records: Vec<PairRecord>,
    pub stopped_early: bool,
    pub final_state: Option<PruningState>,
}

impl SweepReport {
    pub fn fitted(&self) -> impl Iterator<Item = &PairRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, PairOutcome::Fitted { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, PairOutcome::Skipped { .. }))
            .count()
    }
}

/// Drives one solver over a λ grid and routes each model to a sink.
pub struct PathDriver<'s, S: Solver, K: ModelSink> {
    solver: &'s S,
    sink: K,
    output_prefix: PathBuf,
    pruning: Pruning,
}

impl<'s, S: Solver, K: ModelSink> PathDriver<'s, S, K> {
    pub fn new(solver: &'s S, sink: K, output_prefix: impl Into<PathBuf>, pruning: Pruning) -> Self {
        Self {
            solver,
            sink,
            output_prefix: output_prefix.into(),
            pruning,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Fits exactly once and writes `<prefix>.xml`; pruning does not apply.
    pub fn run_single(&mut self, pair: LambdaPair) -> Result<PairRecord, SglError> {
        let model = self.solver.fit(pair)?;
        let output = self
            .sink
            .persist(&model, &single_output_path(&self.output_prefix));
        let non_zero_features = model.non_zero_feature_count();
        log::info!("Non-zero gene count: {non_zero_features}");
        Ok(PairRecord {
            lambda: pair,
            outcome: PairOutcome::Fitted {
                non_zero_features,
                non_zero_groups: model.non_zero_group_count(),
                output,
                verdict: Verdict::Continue,
            },
        })
    }

    /// Visits `pairs` in order. Solver failures abort the sweep; output
    /// failures do not.
    pub fn run_sweep(&mut self, pairs: &[LambdaPair]) -> Result<SweepReport, SglError> {
        let mut state = PruningState::default();
        let mut records = Vec::with_capacity(pairs.len());
        let mut targets: HashMap<PathBuf, LambdaPair> = HashMap::new();
        let mut stopped_early = false;

        for &pair in pairs {
            log::info!("{pair}");

            let threshold = match self.pruning {
                Pruning::Disabled => None,
                Pruning::GeneCount { threshold } => Some(threshold),
            };
            if threshold.is_some() {
                let ceiling = state.max_group_threshold;
                if !state.admit(pair.lambda2) {
                    log::info!("Skipping this lambda value due to gene count thresholding...");
                    records.push(PairRecord {
                        lambda: pair,
                        outcome: PairOutcome::Skipped { ceiling },
                    });
                    continue;
                }
            }

            let model = self.solver.fit(pair)?;

            let path = sweep_output_path(&self.output_prefix, pair);
            if let Some(previous) = targets.insert(path.clone(), pair)
                && previous != pair
            {
                log::warn!(
                    "lambda pairs ({previous}) and ({pair}) share the output label '{}'; \
                     the earlier model is overwritten",
                    path.display()
                );
            }
            let output = self.sink.persist(&model, &path);

            let non_zero_features = model.non_zero_feature_count();
            log::info!("Non-zero gene count: {non_zero_features}");

            let verdict = match threshold {
                Some(threshold) => state.record(pair.lambda2, non_zero_features, threshold),
                None => Verdict::Continue,
            };
            records.push(PairRecord {
                lambda: pair,
                outcome: PairOutcome::Fitted {
                    non_zero_features,
                    non_zero_groups: model.non_zero_group_count(),
                    output,
                    verdict,
                },
            });

            if verdict == Verdict::Stop {
                log::info!("Skipping all further lambda pairs due to gene count thresholding...");
                stopped_early = true;
                break;
            }
        }

        Ok(SweepReport {
            pruning: self.pruning,
            records,
            stopped_early,
            final_state: match self.pruning {
                Pruning::Disabled => None,
                Pruning::GeneCount { .. } => Some(state),
            },
        })
    }
}
