//! Grouping publications by the exact set of nanoparticles they mention.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::matcher::{Combination, Matcher};
use crate::record::Publication;

/// Publications sharing one combination, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationGroup<'a> {
    pub combination: Combination,
    pub records: Vec<&'a Publication>,
}

impl CombinationGroup<'_> {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn arity(&self) -> usize {
        self.combination.arity()
    }
}

/// Result of [`aggregate`]: groups in display order plus the publications
/// that matched no nanoparticle at all.
#[derive(Debug, Clone, Default)]
pub struct Aggregation<'a> {
    pub groups: Vec<CombinationGroup<'a>>,
    pub excluded: Vec<&'a Publication>,
}

impl Aggregation<'_> {
    pub fn arity_counts(&self) -> ArityCounts {
        let mut counts = ArityCounts::default();
        for group in &self.groups {
            let n = group.count();
            match group.arity() {
                1 => counts.mono += n,
                2 => counts.binary += n,
                3 => counts.ternary += n,
                _ => counts.higher += n,
            }
        }
        counts
    }
}

/// Number of matched publications per combination size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArityCounts {
    pub mono: usize,
    pub binary: usize,
    pub ternary: usize,
    /// Four or more species.
    pub higher: usize,
}

impl fmt::Display for ArityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Articles with 1 nanoparticle (mono):     {}", self.mono)?;
        writeln!(f, "Articles with 2 nanoparticles (binary):  {}", self.binary)?;
        writeln!(f, "Articles with 3 nanoparticles (ternary): {}", self.ternary)?;
        write!(f, "Articles with 4+ nanoparticles:          {}", self.higher)
    }
}

/// Route every publication into the group of its matched set and order the
/// groups for display.
///
/// Order: ascending arity, then descending count, then ascending vocabulary
/// positions of the members. Publications matching nothing are excluded.
pub fn aggregate<'a>(records: &'a [Publication], matcher: &Matcher<'_>) -> Aggregation<'a> {
    let mut by_combination: BTreeMap<Combination, Vec<&'a Publication>> = BTreeMap::new();
    let mut excluded = Vec::new();

    for record in records {
        let combination = matcher.match_record(record);
        if combination.is_empty() {
            info!(
                "excluded {}: no nanoparticle mentioned",
                record.citation_key
            );
            excluded.push(record);
            continue;
        }
        debug!(
            "{} -> {:?}",
            record.citation_key,
            combination.names(matcher.vocabulary())
        );
        by_combination.entry(combination).or_default().push(record);
    }

    let mut groups: Vec<CombinationGroup<'a>> = by_combination
        .into_iter()
        .map(|(combination, records)| CombinationGroup {
            combination,
            records,
        })
        .collect();
    groups.sort_by(|a, b| {
        a.arity()
            .cmp(&b.arity())
            .then_with(|| b.count().cmp(&a.count()))
            .then_with(|| a.combination.indices().cmp(b.combination.indices()))
    });

    info!(
        "{} combinations from {} publications, {} excluded",
        groups.len(),
        records.len(),
        excluded.len()
    );
    Aggregation { groups, excluded }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::vocabulary::{Nanoparticle, Vocabulary};

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

    fn vocab() -> Vocabulary {
        Vocabulary::new(vec![
            Nanoparticle::new("Al2O3", &["alumina"]),
            Nanoparticle::new("CuO", &[]),
            Nanoparticle::new("TiO2", &[]),
        ])
        .unwrap()
    }

    fn sample() -> Vec<Publication> {
        vec![
            publication("a", "Al2O3 and CuO"),
            publication("b", "TiO2"),
            publication("c", "alumina"),
            publication("d", "nothing relevant"),
            publication("e", "TiO2 study"),
            publication("f", "CuO TiO2 Al2O3"),
            publication("g", "CuO"),
            publication("h", "TiO2 and CuO"),
        ]
    }

    #[test]
    fn groups_follow_arity_then_frequency_then_vocabulary() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let agg = aggregate(&records, &m);

        let shape: Vec<(Vec<&str>, usize)> = agg
            .groups
            .iter()
            .map(|g| (g.combination.names(&v), g.count()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (vec!["TiO2"], 2),
                (vec!["Al2O3"], 1),
                (vec!["CuO"], 1),
                (vec!["Al2O3", "CuO"], 1),
                (vec!["CuO", "TiO2"], 1),
                (vec!["Al2O3", "CuO", "TiO2"], 1),
            ]
        );
    }

    #[test]
    fn ordering_law_holds_pairwise() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let agg = aggregate(&records, &m);
        for (i, a) in agg.groups.iter().enumerate() {
            for b in &agg.groups[i + 1..] {
                assert!(a.arity() <= b.arity());
                if a.arity() == b.arity() {
                    assert!(a.count() >= b.count());
                }
            }
        }
    }

    #[test]
    fn groups_partition_the_matched_records() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let agg = aggregate(&records, &m);

        let grouped: Vec<&str> = agg
            .groups
            .iter()
            .flat_map(|g| g.records.iter().map(|r| r.citation_key.as_str()))
            .collect();
        let unique: HashSet<&str> = grouped.iter().copied().collect();
        assert_eq!(grouped.len(), unique.len(), "groups must be disjoint");
        assert_eq!(grouped.len() + agg.excluded.len(), records.len());

        let excluded: Vec<&str> = agg.excluded.iter().map(|r| r.citation_key.as_str()).collect();
        assert_eq!(excluded, vec!["d"]);
    }

    #[test]
    fn records_keep_input_order_within_a_group() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let agg = aggregate(&records, &m);
        let keys: Vec<&str> = agg.groups[0]
            .records
            .iter()
            .map(|r| r.citation_key.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "e"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let agg = aggregate(&[], &m);
        assert!(agg.groups.is_empty());
        assert!(agg.excluded.is_empty());
        assert_eq!(agg.arity_counts(), ArityCounts::default());
    }

    #[test]
    fn arity_counts_sum_publications() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let counts = aggregate(&records, &m).arity_counts();
        assert_eq!(
            counts,
            ArityCounts {
                mono: 4,
                binary: 2,
                ternary: 1,
                higher: 0,
            }
        );
    }

    #[test]
    fn aggregation_is_reproducible() {
        let v = vocab();
        let m = Matcher::new(&v).unwrap();
        let records = sample();
        let first = aggregate(&records, &m).groups;
        let second = aggregate(&records, &m).groups;
        assert_eq!(first, second);
    }
}
