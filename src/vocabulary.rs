//! The fixed list of nanoparticle species the analysis looks for.
//!
//! A [`Vocabulary`] is built once at startup, validated, and then only ever
//! borrowed. Its order is the canonical order: combination members are
//! rendered and compared in this order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One nanoparticle species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nanoparticle {
    /// Canonical name, used as group key and as a search term itself.
    pub name: String,
    /// Alternate spellings, formulas and synonyms.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// LaTeX rendering for the table (e.g. `\ce{Al2O3}`); the escaped name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
}

impl Nanoparticle {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Nanoparticle {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            latex: None,
        }
    }

    pub fn with_latex(mut self, latex: &str) -> Self {
        self.latex = Some(latex.to_string());
        self
    }

    /// Canonical name followed by every alias.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Ordered, validated set of nanoparticle species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: Vec<Nanoparticle>,
}

impl Vocabulary {
    /// Validate and wrap a list of entries.
    ///
    /// Fails on an empty list, on blank canonical names and on canonical
    /// names that repeat (compared case-insensitively).
    pub fn new(entries: Vec<Nanoparticle>) -> Result<Self> {
        if entries.is_empty() {
            return Err(AnalysisError::EmptyVocabulary);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(AnalysisError::InvalidVocabulary(
                    "canonical name must not be blank".to_string(),
                ));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(AnalysisError::InvalidVocabulary(format!(
                    "duplicate canonical name '{name}'"
                )));
            }
        }
        Ok(Vocabulary { entries })
    }

    /// Read a JSON array of entries, e.g.
    ///
    /// ```json
    /// [{ "name": "Alumina", "aliases": ["Al2O3"], "latex": "\\ce{Al2O3}" }]
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AnalysisError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => AnalysisError::Io(e),
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<Nanoparticle> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The species list used for the thermal nanofluid review.
    pub fn builtin() -> Self {
        let entries = vec![
            Nanoparticle::new("Alumina", &["Al2O3", "aluminum oxide", "alumina"])
                .with_latex(r"\ce{Al2O3}"),
            Nanoparticle::new("Titania", &["TiO2", "titanium dioxide", "titania"])
                .with_latex(r"\ce{TiO2}"),
            Nanoparticle::new("Silica", &["SiO2", "silicon dioxide", "silica"])
                .with_latex(r"\ce{SiO2}"),
            Nanoparticle::new("Copper Oxide", &["CuO", "cupric oxide", "copper oxide"])
                .with_latex(r"\ce{CuO}"),
            Nanoparticle::new("Zinc Oxide", &["ZnO", "zinc oxide"]).with_latex(r"\ce{ZnO}"),
            Nanoparticle::new("Magnetite", &["Fe3O4", "magnetite", "iron oxide"])
                .with_latex(r"\ce{Fe3O4}"),
            Nanoparticle::new("Zirconia", &["ZrO2", "zirconium dioxide", "zirconia"])
                .with_latex(r"\ce{ZrO2}"),
            Nanoparticle::new(
                "Graphene",
                &[
                    "graphene",
                    "graphene nanoplatelets",
                    "GNP",
                    "graphene oxide",
                    "GO",
                ],
            )
            .with_latex("Graphene"),
            Nanoparticle::new("Carbon Nanotube", &["carbon nanotube", "CNT", "SWCNT", "MWCNT"])
                .with_latex("CNT"),
            Nanoparticle::new("Diamond", &["diamond", "nano-diamond"]).with_latex("Diamond"),
            Nanoparticle::new("Silver", &["silver", "Ag"]).with_latex(r"\ce{Ag}"),
            Nanoparticle::new("Copper", &["copper", "Cu"]).with_latex(r"\ce{Cu}"),
            Nanoparticle::new("Gold", &["gold", "Au"]).with_latex(r"\ce{Au}"),
            Nanoparticle::new("MXene", &["mxene", "ti3c2tx"]).with_latex("MXene"),
            Nanoparticle::new("Molybdenum Disulfide", &["MoS2", "molybdenum disulfide"])
                .with_latex(r"\ce{MoS2}"),
        ];
        Vocabulary { entries }
    }

    pub fn entries(&self) -> &[Nanoparticle] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Nanoparticle> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
