//! Loading publication records from a Scopus-style CSV export.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

use crate::error::{AnalysisError, Result};

const TITLE: &str = "Title";
const ABSTRACT: &str = "Abstract";
const KEYWORDS: &str = "Keywords";
const INDEX_KEYWORDS: &str = "Index Keywords";
const CITATION_KEY: &str = "Citation Key";
const AUTHORS: &str = "Authors";
const YEAR: &str = "Year";
const SOURCE_TITLE: &str = "Source title";
const VOLUME: &str = "Volume";
const PAGE_START: &str = "Page start";
const PAGE_END: &str = "Page end";
const PUBLISHER: &str = "Publisher";
const DOI: &str = "DOI";

/// Columns whose absence makes the input unusable.
pub const REQUIRED_COLUMNS: [&str; 3] = [TITLE, ABSTRACT, KEYWORDS];

/// One row of the bibliographic export. Missing text fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub citation_key: String,
    pub title: String,
    pub abstract_text: String,
    pub keywords: String,
    pub index_keywords: String,
    pub authors: String,
    pub year: Option<i32>,
    pub journal: String,
    pub volume: String,
    pub page_start: String,
    pub page_end: String,
    pub publisher: String,
    pub doi: String,
}

impl Publication {
    /// Title, abstract and both keyword fields joined by a space.
    pub fn searchable_text(&self) -> String {
        [
            self.title.as_str(),
            self.abstract_text.as_str(),
            self.keywords.as_str(),
            self.index_keywords.as_str(),
        ]
        .join(" ")
    }
}

/// Open `path` and load every row.
pub fn load_publications(path: &Path) -> Result<Vec<Publication>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalysisError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => AnalysisError::Io(e),
    })?;
    let publications = read_publications(file)?;
    info!(
        "loaded {} publications from {}",
        publications.len(),
        path.display()
    );
    Ok(publications)
}

/// Parse CSV data with a header row into publications, in input order.
///
/// The header is validated before any row is read; every missing required
/// column is reported at once.
pub fn read_publications<R: Read>(reader: R) -> Result<Vec<Publication>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut keys = KeyRegistry::default();
    let mut publications = Vec::new();
    for (index, row) in rdr.records().enumerate() {
        let row = row?;
        // 1-based, header excluded
        let row_number = index + 1;
        let field = |col: Option<usize>| -> String {
            col.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let title = field(columns.title);
        let authors = field(columns.authors);
        let year = parse_year(&field(columns.year), row_number)?;
        let explicit_key = field(columns.citation_key);

        let citation_key = if explicit_key.is_empty() {
            let base = derive_citation_key(&authors, year, &title)
                .unwrap_or_else(|| format!("ref{row_number}"));
            keys.claim(base)
        } else {
            if !is_valid_citation_key(&explicit_key) {
                return Err(AnalysisError::MalformedField {
                    row: row_number,
                    column: CITATION_KEY.to_string(),
                    value: explicit_key,
                });
            }
            let claimed = keys.claim(explicit_key.clone());
            if claimed != explicit_key {
                warn!(
                    "row {row_number}: citation key '{explicit_key}' already used, renamed to '{claimed}'"
                );
            }
            claimed
        };

        publications.push(Publication {
            citation_key,
            title,
            abstract_text: field(columns.abstract_text),
            keywords: field(columns.keywords),
            index_keywords: field(columns.index_keywords),
            authors,
            year,
            journal: field(columns.journal),
            volume: field(columns.volume),
            page_start: field(columns.page_start),
            page_end: field(columns.page_end),
            publisher: field(columns.publisher),
            doi: field(columns.doi),
        });
    }
    Ok(publications)
}

/// Header positions. Required columns are `Some` after a successful `locate`.
struct Columns {
    title: Option<usize>,
    abstract_text: Option<usize>,
    keywords: Option<usize>,
    index_keywords: Option<usize>,
    citation_key: Option<usize>,
    authors: Option<usize>,
    year: Option<usize>,
    journal: Option<usize>,
    volume: Option<usize>,
    page_start: Option<usize>,
    page_end: Option<usize>,
    publisher: Option<usize>,
    doi: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |wanted: &str| names.iter().position(|n| *n == wanted);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(**c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::SchemaViolation { missing });
        }

        Ok(Columns {
            title: find(TITLE),
            abstract_text: find(ABSTRACT),
            keywords: find(KEYWORDS),
            index_keywords: find(INDEX_KEYWORDS),
            citation_key: find(CITATION_KEY),
            authors: find(AUTHORS),
            year: find(YEAR),
            journal: find(SOURCE_TITLE),
            volume: find(VOLUME),
            page_start: find(PAGE_START),
            page_end: find(PAGE_END),
            publisher: find(PUBLISHER),
            doi: find(DOI),
        })
    }
}

/// Spreadsheet exports sometimes store years as `2021.0`.
fn parse_year(raw: &str, row: usize) -> Result<Option<i32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(Some(year));
    }
    match raw.parse::<f64>() {
        Ok(y) if y.fract() == 0.0 && y.abs() < 10_000.0 => Ok(Some(y as i32)),
        _ => Err(AnalysisError::MalformedField {
            row,
            column: YEAR.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// `<surname><year|nd><first title word>`, e.g. `smith2021enhanced`.
///
/// The surname is the first token of the first author (Scopus lists
/// surnames first). Returns `None` when surname or title word is empty.
pub fn derive_citation_key(authors: &str, year: Option<i32>, title: &str) -> Option<String> {
    let first_author = authors.split([';', ',']).next().unwrap_or("");
    let surname = ascii_alnum_lower(first_author.split_whitespace().next().unwrap_or(""));
    let word = ascii_alnum_lower(title.split_whitespace().next().unwrap_or(""));
    if surname.is_empty() || word.is_empty() {
        return None;
    }
    let year = year.map_or_else(|| "nd".to_string(), |y| y.to_string());
    Some(format!("{surname}{year}{word}"))
}

/// Keys go verbatim into `\cite{...}` and `@article{key,`, so only ASCII
/// alphanumerics and `:-_.` are accepted.
pub fn is_valid_citation_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_' | '.'))
}

fn ascii_alnum_lower(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Hands out unique keys: repeats of a base get `2`, `3`, ... appended.
#[derive(Default)]
struct KeyRegistry {
    taken: HashSet<String>,
}

impl KeyRegistry {
    fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
