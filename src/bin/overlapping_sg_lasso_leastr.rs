use clap::Parser;
use sgl_path::SglError;
use sgl_path::cli::{CommonArgs, init_logging, run_overlapping};
use std::path::PathBuf;

/// Sparse-group lasso (least squares) with overlapping groups read through a
/// field vector. Every lambda pair is fit; there is no gene-count pruning.
#[derive(Parser, Debug)]
#[command(name = "overlapping_sg_lasso_leastr")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (build ", env!("SGL_BUILD_TIMESTAMP"), ")"))]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    /// Field indices file mapping group positions to features.
    #[arg(short = 'g', long = "field")]
    field: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SglError> {
    let cli = Cli::parse();
    init_logging();
    run_overlapping(&cli.common, &cli.field)
}
