use std::path::PathBuf;

use thiserror::Error;

/// A specialized Result type for the analysis pipeline.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can abort a run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("input is missing required column(s): {}", missing.join(", "))]
    SchemaViolation { missing: Vec<String> },

    #[error("row {row}: malformed value {value:?} in column '{column}'")]
    MalformedField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("nanoparticle vocabulary is empty")]
    EmptyVocabulary,

    #[error("invalid nanoparticle vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("could not compile search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
