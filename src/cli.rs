//! Command-line layer shared by `sg_lasso_leastr` and
//! `overlapping_sg_lasso_leastr`. The only module allowed to touch the terminal.

use clap::Args;
use comfy_table::{Cell, ContentArrangement, Row, Table, presets::UTF8_FULL};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::dataset::{Dataset, load_field, load_group_index};
use crate::error::SglError;
use crate::lambda::read_lambda_list;
use crate::options::{SolverSettings, read_slep_options};
use crate::path::{PairOutcome, PathDriver, Pruning, SweepReport};
use crate::sink::FileModelSink;
use crate::solver::{OverlappingSgLassoLeastR, SgLassoLeastR, Solver};
use crate::types::{LambdaPair, NO_FILE};

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Input features file (one sample per line, comma separated).
    #[arg(short = 'f', long = "features")]
    pub features: PathBuf,
    /// Group indices file (one `start,end[,weight]` line per group, 1-based).
    #[arg(short = 'n', long = "groups")]
    pub groups: PathBuf,
    /// Response file (one value per sample).
    #[arg(short = 'r', long = "response")]
    pub response: PathBuf,
    /// Output path prefix for the XML models.
    #[arg(short = 'w', long = "output")]
    pub output: PathBuf,
    /// File of tab-separated SLEP options.
    #[arg(short = 's', long = "slep", default_value = NO_FILE)]
    pub slep: PathBuf,
    /// File of `lambda1 lambda2` pairs; enables sweep mode.
    #[arg(short = 'l', long = "lambda_list", default_value = NO_FILE)]
    pub lambda_list: PathBuf,
    /// Individual feature sparsity (single mode).
    #[arg(short = 'z', long = "lambda1", default_value_t = 0.1)]
    pub lambda1: f64,
    /// Group feature sparsity (single mode).
    #[arg(short = 'y', long = "lambda2", default_value_t = 0.1)]
    pub lambda2: f64,
    /// Also write the per-pair summary as JSON.
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
}

impl CommonArgs {
    fn sweep_requested(&self) -> bool {
        self.lambda_list.as_os_str() != NO_FILE
    }
}

/// `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub fn run_disjoint(args: &CommonArgs, gene_count_threshold: i64) -> Result<(), SglError> {
    let dataset = Dataset::load(&args.features, &args.response)?;
    let group_index = load_group_index(&args.groups)?;
    let settings = SolverSettings::from_slep_options(&read_slep_options(&args.slep))?;
    let solver = SgLassoLeastR::new(&dataset, &group_index, settings)?;
    log::debug!(
        "{} groups over {} features, {} samples",
        solver.layout().groups().len(),
        dataset.n_features(),
        dataset.n_samples()
    );
    drive(
        &solver,
        args,
        Pruning::GeneCount {
            threshold: gene_count_threshold,
        },
    )
}

pub fn run_overlapping(args: &CommonArgs, field: &Path) -> Result<(), SglError> {
    let dataset = Dataset::load(&args.features, &args.response)?;
    let group_index = load_group_index(&args.groups)?;
    let field = load_field(field)?;
    let settings = SolverSettings::from_slep_options(&read_slep_options(&args.slep))?;
    let solver = OverlappingSgLassoLeastR::new(&dataset, &group_index, &field, settings)?;
    log::debug!(
        "{} overlapping groups over {} features, {} samples",
        solver.layout().groups().len(),
        dataset.n_features(),
        dataset.n_samples()
    );
    drive(&solver, args, Pruning::Disabled)
}

fn drive<S: Solver>(solver: &S, args: &CommonArgs, pruning: Pruning) -> Result<(), SglError> {
    let mut driver = PathDriver::new(solver, FileModelSink, &args.output, pruning);

    let report = if args.sweep_requested() {
        let pairs = read_lambda_list(&args.lambda_list);
        driver.run_sweep(&pairs)?
    } else {
        let pair = LambdaPair::new(args.lambda1, args.lambda2)?;
        SweepReport {
            pruning: Pruning::Disabled,
            records: vec![driver.run_single(pair)?],
            stopped_early: false,
            final_state: None,
        }
    };

    print_summary(&report);
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn print_summary(report: &SweepReport) {
    if report.records.is_empty() {
        println!("no lambda pairs visited");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "lambda1",
            "lambda2",
            "status",
            "non-zero features",
            "non-zero groups",
            "output",
        ]);

    for record in &report.records {
        let row = match &record.outcome {
            PairOutcome::Skipped { ceiling } => vec![
                Cell::new(record.lambda.lambda1),
                Cell::new(record.lambda.lambda2),
                Cell::new(format!("skipped (> {ceiling})")),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ],
            PairOutcome::Fitted {
                non_zero_features,
                non_zero_groups,
                output,
                ..
            } => vec![
                Cell::new(record.lambda.lambda1),
                Cell::new(record.lambda.lambda2),
                Cell::new(if output.is_written() {
                    "fitted"
                } else {
                    "fitted, not saved"
                }),
                Cell::new(non_zero_features),
                Cell::new(
                    non_zero_groups
                        .map(|g| g.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(output.path().display()),
            ],
        };
        table.add_row(Row::from(row));
    }

    println!("{table}");
    if report.stopped_early {
        println!("sweep stopped early by gene count thresholding");
    }
}

fn write_report(path: &Path, report: &SweepReport) -> Result<(), SglError> {
    let wrap = |source| SglError::Report {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| wrap(serde_json::Error::io(e)))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, report).map_err(wrap)?;
    out.flush().map_err(|e| wrap(serde_json::Error::io(e)))?;
    log::info!("saved sweep report: {}", path.display());
    Ok(())
}
