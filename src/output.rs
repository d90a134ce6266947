//! Publishing output artifacts without leaving partial files behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::error::{AnalysisError, Result};

/// A file to be written: destination and full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Artifact {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Stage every artifact in a temporary file next to its destination, then
/// rename them into place in slice order. Nothing is renamed unless all were
/// staged. Existing files are overwritten.
///
/// The renames are not one transaction: if one fails, the artifacts before
/// it have already been replaced and the rest keep their old contents.
pub fn publish(artifacts: &[Artifact]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        staged.push((stage(artifact)?, &artifact.path));
    }
    for (file, path) in staged {
        file.persist(path)
            .map_err(|e| AnalysisError::Io(e.error))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn stage(artifact: &Artifact) -> Result<NamedTempFile> {
    let dir = parent_dir(&artifact.path);
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(artifact.contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// `latex_table.tex` has an empty parent; stage it in the working directory.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
