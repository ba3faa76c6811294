#![deny(dead_code)]
#![deny(unused_imports)]

pub mod cli;
pub mod dataset;
pub mod error;
pub mod groups;
pub mod label;
pub mod lambda;
pub mod model;
pub mod options;
pub mod path;
pub mod sink;
pub mod solver;
pub mod types;

pub use dataset::Dataset;
pub use error::SglError;
pub use groups::{Group, GroupLayout};
pub use label::{lambda_label, single_output_path, sweep_output_path};
pub use lambda::{parse_lambda_list, read_lambda_list};
pub use model::SparseGroupLassoModel;
pub use options::{SlepOptions, SolverSettings, Termination, parse_slep_options, read_slep_options};
pub use path::{PairOutcome, PairRecord, PathDriver, Pruning, PruningState, SweepReport, Verdict};
pub use sink::{FileModelSink, ModelSink, PersistOutcome};
pub use solver::{FittedModel, OverlappingSgLassoLeastR, SgLassoLeastR, Solver};
pub use types::{Coefficients, GroupVariant, LambdaPair, NO_FILE};
