use clap::Parser;
use sgl_path::SglError;
use sgl_path::cli::{CommonArgs, init_logging, run_disjoint};

/// Sparse-group lasso (least squares) with contiguous, disjoint groups.
#[derive(Parser, Debug)]
#[command(name = "sg_lasso_leastr")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (build ", env!("SGL_BUILD_TIMESTAMP"), ")"))]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    /// Gene selection cutoff for grid-based model building; negative disables it.
    #[arg(
        short = 'c',
        long = "gene_count_threshold",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    gene_count_threshold: i64,
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
    run_disjoint(&cli.common, cli.gene_count_threshold)
}
