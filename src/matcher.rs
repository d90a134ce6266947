//! Detecting which nanoparticles a publication mentions.

use regex::Regex;

use crate::error::Result;
use crate::record::Publication;
use crate::vocabulary::{Nanoparticle, Vocabulary};

/// The set of species detected in one publication, stored as ascending
/// vocabulary positions so that equal sets compare equal regardless of the
/// order in which terms appeared in the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Combination {
    members: Vec<usize>,
}

impl Combination {
    /// Build from vocabulary positions in any order; duplicates collapse.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut members: Vec<usize> = indices.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Combination { members }
    }

    /// Number of species: 1 mono, 2 binary, 3 ternary, ...
    pub fn arity(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.members
    }

    /// Members in vocabulary order.
    pub fn nanoparticles<'v>(&self, vocabulary: &'v Vocabulary) -> Vec<&'v Nanoparticle> {
        self.members
            .iter()
            .filter_map(|&i| vocabulary.get(i))
            .collect()
    }

    /// Canonical names in vocabulary order.
    pub fn names<'v>(&self, vocabulary: &'v Vocabulary) -> Vec<&'v str> {
        self.nanoparticles(vocabulary)
            .into_iter()
            .map(|np| np.name.as_str())
            .collect()
    }
}

/// Case-insensitive whole-word matcher compiled from a vocabulary.
///
/// One regex per species, an alternation over its canonical name and
/// aliases. Text and terms are both lowercased before matching.
pub struct Matcher<'v> {
    vocabulary: &'v Vocabulary,
    patterns: Vec<Regex>,
}

impl<'v> Matcher<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Result<Self> {
        let patterns = vocabulary
            .entries()
            .iter()
            .map(compile_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(Matcher {
            vocabulary,
            patterns,
        })
    }

    pub fn vocabulary(&self) -> &'v Vocabulary {
        self.vocabulary
    }

    /// Species mentioned anywhere in `text`. Empty text gives an empty set.
    pub fn match_text(&self, text: &str) -> Combination {
        let normalized = text.to_lowercase();
        Combination::from_indices(
            self.patterns
                .iter()
                .enumerate()
                .filter(|(_, re)| re.is_match(&normalized))
                .map(|(i, _)| i),
        )
    }

    /// Species mentioned in the title, abstract or keywords of `record`.
    pub fn match_record(&self, record: &Publication) -> Combination {
        self.match_text(&record.searchable_text())
    }
}

fn compile_entry(entry: &Nanoparticle) -> Result<Regex> {
    let mut terms: Vec<String> = entry
        .terms()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    terms.sort();
    terms.dedup();
    let alternation: Vec<String> = terms.iter().map(|t| term_pattern(t)).collect();
    Ok(Regex::new(&format!("(?:{})", alternation.join("|")))?)
}

/// Escaped term with a word boundary on each side that starts or ends with
/// a word character. `Ag` must not hit `agent`; `c++` has no trailing `\b`.
fn term_pattern(term: &str) -> String {
    let leading = term.chars().next().is_some_and(is_word_char);
    let trailing = term.chars().last().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(term),
        if trailing { r"\b" } else { "" }
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
