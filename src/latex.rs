//! Rendering the combination table body and the BibTeX bibliography.

use std::collections::HashSet;

use crate::aggregate::CombinationGroup;
use crate::record::Publication;
use crate::vocabulary::{Nanoparticle, Vocabulary};

/// Citation keys in order of first appearance in the table, each once.
#[derive(Debug, Clone, Default)]
pub struct CitationLedger<'a> {
    entries: Vec<&'a Publication>,
    seen: HashSet<&'a str>,
}

impl<'a> CitationLedger<'a> {
    /// Returns `false` if the key was already recorded.
    pub fn record(&mut self, publication: &'a Publication) -> bool {
        if !self.seen.insert(publication.citation_key.as_str()) {
            return false;
        }
        self.entries.push(publication);
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|p| p.citation_key.as_str())
    }

    pub fn publications(&self) -> &[&'a Publication] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table rows in display order and the ledger they reference.
#[derive(Debug, Clone, Default)]
pub struct CitationTable<'a> {
    pub rows: Vec<String>,
    pub ledger: CitationLedger<'a>,
}

/// One row per group, e.g. `  \ce{Al2O3} + \ce{CuO} & 2 & \cite{a,b} \\ \hline`.
pub fn format_citations<'a>(
    groups: &[CombinationGroup<'a>],
    vocabulary: &Vocabulary,
) -> CitationTable<'a> {
    let mut table = CitationTable::default();
    for group in groups {
        let combo = group
            .combination
            .nanoparticles(vocabulary)
            .into_iter()
            .map(latex_symbol)
            .collect::<Vec<_>>()
            .join(" + ");

        let mut keys: Vec<&str> = Vec::with_capacity(group.count());
        for &record in &group.records {
            if !keys.contains(&record.citation_key.as_str()) {
                keys.push(record.citation_key.as_str());
            }
            table.ledger.record(record);
        }

        table.rows.push(format!(
            "  {combo} & {} & \\cite{{{}}} \\\\ \\hline",
            group.count(),
            keys.join(",")
        ));
    }
    table
}

fn latex_symbol(nanoparticle: &Nanoparticle) -> String {
    match &nanoparticle.latex {
        Some(symbol) => symbol.clone(),
        None => escape_latex(&nanoparticle.name),
    }
}

/// Escape characters reserved in LaTeX and BibTeX free text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_braces(text: &str) -> String {
    text.replace('{', r"\{").replace('}', r"\}")
}

/// Rows joined by newlines, with a trailing newline unless empty.
pub fn render_table(rows: &[String]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut out = rows.join("\n");
    out.push('\n');
    out
}

/// One `@article` entry per ledger key, blank-line separated.
pub fn render_bibliography(ledger: &CitationLedger<'_>) -> String {
    if ledger.is_empty() {
        return String::new();
    }
    let mut out = ledger
        .publications()
        .iter()
        .map(|p| bibtex_entry(p))
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

/// Empty fields are left out.
pub fn bibtex_entry(publication: &Publication) -> String {
    let pages = if publication.page_start.is_empty() || publication.page_end.is_empty() {
        String::new()
    } else {
        format!(
            "{}--{}",
            escape_latex(&publication.page_start),
            escape_latex(&publication.page_end)
        )
    };
    let year = publication.year.map(|y| y.to_string()).unwrap_or_default();

    let fields = [
        ("title", escape_latex(&publication.title)),
        ("author", bibtex_authors(&publication.authors)),
        ("journal", escape_latex(&publication.journal)),
        ("volume", escape_latex(&publication.volume)),
        ("pages", pages),
        ("year", year),
        ("publisher", escape_latex(&publication.publisher)),
        ("doi", escape_braces(&publication.doi)),
    ];
    let body = fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("  {name}={{{value}}}"))
        .collect::<Vec<_>>()
        .join(",\n");

    if body.is_empty() {
        format!("@article{{{},\n}}", publication.citation_key)
    } else {
        format!("@article{{{},\n{body}\n}}", publication.citation_key)
    }
}

/// `Smith J.; Doe A.` (or comma separated) becomes `Smith J. and Doe A.`.
fn bibtex_authors(authors: &str) -> String {
    let separator = if authors.contains(';') { ';' } else { ',' };
    authors
        .split(separator)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(escape_latex)
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::aggregate::aggregate;
    use crate::matcher::Matcher;

    fn publication(key: &str, title: &str) -> Publication {
        Publication {
            citation_key: key.to_string(),
            title: title.to_string(),
            abstract_text: String::new(),
            keywords: String::new(),
            index_keywords: String::new(),
            authors: String::new(),
            year: None,
            journal: String::new(),
            volume: String::new(),
            page_start: String::new(),
            page_end: String::new(),
            publisher: String::new(),
            doi: String::new(),
        }
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(
            escape_latex(r"50% Al_2O_3 & $5 #1 {x} ~^\"),
            r"50\% Al\_2O\_3 \& \$5 \#1 \{x\} \textasciitilde{}\textasciicircum{}\textbackslash{}"
        );
        assert_eq!(escape_latex("plain text"), "plain text");
    }

    #[test]
    fn rows_use_latex_symbols_in_vocabulary_order() {
        let vocab = Vocabulary::new(vec![
            Nanoparticle::new("Alumina", &["Al2O3"]).with_latex(r"\ce{Al2O3}"),
            Nanoparticle::new("Fe_3O_4", &["magnetite"]),
        ])
        .unwrap();
        let matcher = Matcher::new(&vocab).unwrap();
        let records = vec![
            publication("k1", "magnetite with Al2O3"),
            publication("k2", "Al2O3 and magnetite"),
        ];
        let agg = aggregate(&records, &matcher);
        let table = format_citations(&agg.groups, &vocab);
        assert_eq!(
            table.rows,
            vec![r"  \ce{Al2O3} + Fe\_3O\_4 & 2 & \cite{k1,k2} \\ \hline".to_string()]
        );
    }

    #[test]
    fn ledger_matches_table_citations_exactly() {
        let vocab = Vocabulary::builtin();
        let matcher = Matcher::new(&vocab).unwrap();
        let records = vec![
            publication("p1", "Al2O3 CuO hybrid"),
            publication("p2", "TiO2 study"),
            publication("p3", "unrelated"),
            publication("p4", "TiO2 again"),
            publication("p5", "CuO-Al2O3 mixture"),
        ];
        let agg = aggregate(&records, &matcher);
        let table = format_citations(&agg.groups, &vocab);

        let ledger: Vec<&str> = table.ledger.keys().collect();
        assert_eq!(ledger, vec!["p2", "p4", "p1", "p5"]);

        let cited: HashSet<String> = table
            .rows
            .iter()
            .flat_map(|row| {
                let start = row.find(r"\cite{").unwrap() + r"\cite{".len();
                let end = row[start..].find('}').unwrap() + start;
                row[start..end]
                    .split(',')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let in_ledger: HashSet<String> = ledger.iter().map(|k| k.to_string()).collect();
        assert_eq!(cited, in_ledger);
        assert_eq!(cited.len(), table.ledger.len());
    }

    #[test]
    fn ledger_records_each_key_once() {
        let p = publication("dup", "x");
        let mut ledger = CitationLedger::default();
        assert!(ledger.record(&p));
        assert!(!ledger.record(&p));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn bibtex_entry_full() {
        let mut p = publication("smith2021enhanced", "Enhanced heat transfer & 50% gains");
        p.authors = "Smith J.; Doe A.".to_string();
        p.year = Some(2021);
        p.journal = "Int. J. Heat Mass Transf.".to_string();
        p.volume = "12".to_string();
        p.page_start = "100".to_string();
        p.page_end = "110".to_string();
        p.publisher = "Elsevier".to_string();
        p.doi = "10.1016/j.ijheat_2021.1".to_string();
        assert_eq!(
            bibtex_entry(&p),
            "@article{smith2021enhanced,\n\
             \x20 title={Enhanced heat transfer \\& 50\\% gains},\n\
             \x20 author={Smith J. and Doe A.},\n\
             \x20 journal={Int. J. Heat Mass Transf.},\n\
             \x20 volume={12},\n\
             \x20 pages={100--110},\n\
             \x20 year={2021},\n\
             \x20 publisher={Elsevier},\n\
             \x20 doi={10.1016/j.ijheat_2021.1}\n\
             }"
        );
    }

    #[test]
    fn bibtex_entry_skips_empty_fields() {
        let mut p = publication("k", "Only a title");
        p.page_start = "5".to_string();
        assert_eq!(bibtex_entry(&p), "@article{k,\n  title={Only a title}\n}");
    }

    #[test]
    fn comma_separated_authors() {
        assert_eq!(bibtex_authors("Smith J., Doe A."), "Smith J. and Doe A.");
        assert_eq!(bibtex_authors(""), "");
    }

    #[test]
    fn empty_artifacts_render_empty() {
        assert_eq!(render_table(&[]), "");
        assert_eq!(render_bibliography(&CitationLedger::default()), "");
    }
}
