//! # Nanoparticle literature analysis
//!
//! Scans bibliographic records (a Scopus-style CSV export) for mentions of a
//! fixed vocabulary of nanoparticles, groups the publications by the exact
//! combination of nanoparticles they discuss and writes two artifacts:
//!
//! - a LaTeX table body, one row per combination with its frequency and a
//!   `\cite{...}` of every publication in it;
//! - a BibTeX file with one entry per cited publication, in order of first
//!   appearance in the table.
//!
//! Rows are ordered by combination size (mono, binary, ternary, ...), then
//! by descending frequency, then by vocabulary order, so identical input
//! always produces byte-identical output. Publications that mention no
//! nanoparticle are left out and listed in the [`AnalysisReport`].
//!
//! ## Example
//! ```
//! use nanoparticle_analysis::{Nanoparticle, Vocabulary, analyze_publications, read_publications};
//!
//! let csv = "Citation Key,Title,Abstract,Keywords\n\
//!            r1,Al2O3 and CuO nanofluid,,\n\
//!            r2,Heat transfer,alumina nanoparticles,\n";
//! let records = read_publications(csv.as_bytes()).unwrap();
//! let vocabulary = Vocabulary::new(vec![
//!     Nanoparticle::new("Al2O3", &["alumina"]),
//!     Nanoparticle::new("CuO", &[]),
//! ])
//! .unwrap();
//! let analysis = analyze_publications(&records, &vocabulary).unwrap();
//! assert_eq!(analysis.citation_keys, vec!["r2", "r1"]);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

pub mod aggregate;
pub mod error;
pub mod latex;
pub mod matcher;
pub mod output;
pub mod record;
pub mod vocabulary;

pub use aggregate::{Aggregation, ArityCounts, CombinationGroup, aggregate};
pub use error::{AnalysisError, Result};
pub use latex::{CitationLedger, CitationTable, escape_latex, format_citations};
pub use matcher::{Combination, Matcher};
pub use output::{Artifact, publish};
pub use record::{Publication, load_publications, read_publications};
pub use vocabulary::{Nanoparticle, Vocabulary};

pub const DEFAULT_INPUT: &str = "THNF575.csv";
pub const DEFAULT_TABLE_OUTPUT: &str = "latex_table.tex";
pub const DEFAULT_BIBLIOGRAPHY_OUTPUT: &str = "references.bib";

/// Where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub input: PathBuf,
    pub table_output: PathBuf,
    pub bibliography_output: PathBuf,
    /// JSON vocabulary file; the built-in vocabulary when `None`.
    pub vocabulary: Option<PathBuf>,
    /// Optional JSON run report.
    pub summary_output: Option<PathBuf>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            input: PathBuf::from(DEFAULT_INPUT),
            table_output: PathBuf::from(DEFAULT_TABLE_OUTPUT),
            bibliography_output: PathBuf::from(DEFAULT_BIBLIOGRAPHY_OUTPUT),
            vocabulary: None,
            summary_output: None,
        }
    }
}

/// Rendered artifacts of one analysis, before anything touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub table: String,
    pub bibliography: String,
    /// Ledger keys, in bibliography order.
    pub citation_keys: Vec<String>,
    pub combinations: Vec<CombinationSummary>,
    pub arity: ArityCounts,
    pub excluded_keys: Vec<String>,
    pub total_records: usize,
}

/// One table row in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationSummary {
    pub nanoparticles: Vec<String>,
    pub count: usize,
    pub citation_keys: Vec<String>,
}

/// Match, aggregate and format. Pure: no I/O besides logging.
pub fn analyze_publications(records: &[Publication], vocabulary: &Vocabulary) -> Result<Analysis> {
    let matcher = Matcher::new(vocabulary)?;
    let aggregation = aggregate(records, &matcher);
    let table = format_citations(&aggregation.groups, vocabulary);

    let combinations = aggregation
        .groups
        .iter()
        .map(|g| CombinationSummary {
            nanoparticles: g
                .combination
                .names(vocabulary)
                .into_iter()
                .map(String::from)
                .collect(),
            count: g.count(),
            citation_keys: g.records.iter().map(|r| r.citation_key.clone()).collect(),
        })
        .collect();

    Ok(Analysis {
        table: latex::render_table(&table.rows),
        bibliography: latex::render_bibliography(&table.ledger),
        citation_keys: table.ledger.keys().map(String::from).collect(),
        combinations,
        arity: aggregation.arity_counts(),
        excluded_keys: aggregation
            .excluded
            .iter()
            .map(|r| r.citation_key.clone())
            .collect(),
        total_records: records.len(),
    })
}

/// Outcome of [`run_analysis`], printed by the CLI and optionally saved as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub input: PathBuf,
    pub total_records: usize,
    pub arity: ArityCounts,
    pub combinations: Vec<CombinationSummary>,
    pub excluded_keys: Vec<String>,
    pub table_output: PathBuf,
    pub bibliography_output: PathBuf,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Analyzed {} articles from '{}'.",
            self.total_records,
            self.input.display()
        )?;
        writeln!(f, "{}", self.arity)?;
        writeln!(f, "Unique combinations:                     {}", self.combinations.len())?;
        writeln!(f, "Articles without any nanoparticle:       {}", self.excluded_keys.len())?;
        writeln!(f, "Table body:   {}", self.table_output.display())?;
        write!(f, "Bibliography: {}", self.bibliography_output.display())
    }
}

fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    match path {
        Some(p) => {
            let vocabulary = Vocabulary::from_json_file(p)?;
            info!(
                "loaded {} nanoparticles from {}",
                vocabulary.len(),
                p.display()
            );
            Ok(vocabulary)
        }
        None => Ok(Vocabulary::builtin()),
    }
}

/// Full run: load vocabulary and records, analyze, publish the artifacts.
///
/// Fails without writing anything if the input is missing, lacks required
/// columns, or the vocabulary is empty or invalid. An input without rows
/// produces empty artifacts.
pub fn run_analysis(options: &AnalysisOptions) -> Result<AnalysisReport> {
    let vocabulary = load_vocabulary(options.vocabulary.as_deref())?;
    let records = load_publications(&options.input)?;
    let analysis = analyze_publications(&records, &vocabulary)?;

    let report = AnalysisReport {
        input: options.input.clone(),
        total_records: analysis.total_records,
        arity: analysis.arity,
        combinations: analysis.combinations,
        excluded_keys: analysis.excluded_keys,
        table_output: options.table_output.clone(),
        bibliography_output: options.bibliography_output.clone(),
    };

    // Table last, so it is never newer than the bibliography it cites.
    let mut artifacts = vec![Artifact::new(
        &options.bibliography_output,
        analysis.bibliography,
    )];
    if let Some(path) = &options.summary_output {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        artifacts.push(Artifact::new(path, json));
    }
    artifacts.push(Artifact::new(&options.table_output, analysis.table));
    publish(&artifacts)?;
    Ok(report)
}
