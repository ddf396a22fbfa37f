//! Precision and recall against a hand-made ground truth file.
//!
//! The file lists one query term per line as `term - 1, 2, 3`. Reading stops
//! at the first blank line; lines that are not in that shape are skipped.

use crate::document::DocId;
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    relevant: HashMap<String, BTreeSet<DocId>>,
}

impl GroundTruth {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut relevant = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                break;
            }
            let Some((term, ids)) = line.trim().split_once(" - ") else {
                continue;
            };
            let ids = ids
                .split(',')
                .map(|id| {
                    id.trim()
                        .parse::<DocId>()
                        .map_err(|_| Error::Malformed(format!("ground truth line {}: bad document id '{}'", lineno + 1, id.trim())))
                })
                .collect::<Result<BTreeSet<DocId>>>()?;
            relevant.insert(term.trim().to_lowercase(), ids);
        }
        tracing::debug!(queries = relevant.len(), "loaded ground truth");
        Ok(Self { relevant })
    }

    pub fn len(&self) -> usize {
        self.relevant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relevant.is_empty()
    }

    /// Every term with ground truth, sorted.
    pub fn queries(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.relevant.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    /// Union of the relevant documents of every whitespace-separated query term.
    pub fn relevant_for(&self, query: &str) -> BTreeSet<DocId> {
        query
            .split_whitespace()
            .filter_map(|term| self.relevant.get(&term.to_lowercase()))
            .flatten()
            .copied()
            .collect()
    }

    /// Share of retrieved documents that are relevant. `None` when the query
    /// has no ground truth, `Some(0.0)` when nothing was retrieved.
    pub fn precision(&self, query: &str, retrieved: &[DocId]) -> Option<f64> {
        let relevant = self.relevant_for(query);
        if relevant.is_empty() {
            return None;
        }
        let retrieved: BTreeSet<DocId> = retrieved.iter().copied().collect();
        if retrieved.is_empty() {
            return Some(0.0);
        }
        Some(relevant.intersection(&retrieved).count() as f64 / retrieved.len() as f64)
    }

    /// Share of relevant documents that were retrieved.
    pub fn recall(&self, query: &str, retrieved: &[DocId]) -> Option<f64> {
        let relevant = self.relevant_for(query);
        if relevant.is_empty() {
            return None;
        }
        let retrieved: BTreeSet<DocId> = retrieved.iter().copied().collect();
        Some(relevant.intersection(&retrieved).count() as f64 / relevant.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUTH: &str = "fox - 0, 1, 4\ncat - 2\n\nwolf - 9\n";

    #[test]
    fn parse_stops_at_first_blank_line() {
        let gt = GroundTruth::parse(TRUTH).unwrap();
        assert_eq!(gt.len(), 2);
        assert_eq!(gt.queries(), vec!["cat", "fox"]);
        assert!(gt.relevant_for("wolf").is_empty());
        assert_eq!(gt.relevant_for("Fox cat"), BTreeSet::from([0, 1, 2, 4]));
    }

    #[test]
    fn precision_and_recall() {
        let gt = GroundTruth::parse(TRUTH).unwrap();
        assert_eq!(gt.precision("fox", &[0, 1, 3, 5]), Some(0.5));
        assert!((gt.recall("fox", &[0, 1, 3, 5]).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(gt.precision("fox", &[]), Some(0.0));
        assert_eq!(gt.recall("fox", &[]), Some(0.0));
        assert_eq!(gt.precision("dragon", &[1]), None);
        assert_eq!(gt.recall("dragon", &[1]), None);
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(matches!(GroundTruth::parse("fox - 1, x"), Err(Error::Malformed(_))));
    }

    #[test]
    fn skips_lines_without_separator() {
        let gt = GroundTruth::parse("# fables\nfox - 3\n").unwrap();
        assert_eq!(gt.relevant_for("fox"), BTreeSet::from([3]));
    }
}
