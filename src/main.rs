#![forbid(unsafe_code)]
//! # Nanoparticle Analysis CLI
//!
//! Command-line front end for the `nanoparticle_analysis` crate. Run it
//! without arguments in the directory holding `THNF575.csv`; it writes
//! `latex_table.tex` and `references.bib` next to it, replacing existing files.
//!
//! ## Example
//! ```bash
//! cargo run --release
//! cargo run --release -- --input scopus.csv --vocabulary species.json --summary run.json
//! ```
//!
//! Set `RUST_LOG=info` to see which articles were excluded.

use clap::Parser;
use log::error;
use nanoparticle_analysis::{
    AnalysisOptions, DEFAULT_BIBLIOGRAPHY_OUTPUT, DEFAULT_INPUT, DEFAULT_TABLE_OUTPUT,
    run_analysis,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Bibliographic CSV export to analyze
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file for the LaTeX table body
    #[arg(long, default_value = DEFAULT_TABLE_OUTPUT)]
    table: PathBuf,

    /// Output file for the BibTeX entries
    #[arg(long, default_value = DEFAULT_BIBLIOGRAPHY_OUTPUT)]
    bibliography: PathBuf,

    /// Optional JSON nanoparticle vocabulary (replaces the built-in list)
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Optional path for a JSON run report
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = AnalysisOptions {
        input: cli.input,
        table_output: cli.table,
        bibliography_output: cli.bibliography,
        vocabulary: cli.vocabulary,
        summary_output: cli.summary,
    };

    match run_analysis(&options) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
}
