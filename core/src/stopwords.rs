//! Stop-word lists: the built-in English list, lists loaded from a file,
//! and lists generated from term frequencies in a collection.

use crate::document::Document;
use crate::error::Result;
use crate::tokenizer::normalize_term;
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

lazy_static! {
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Thresholds for [`StopWords::by_frequency`].
#[derive(Debug, Clone, Copy)]
pub struct FrequencyThresholds {
    /// Terms occurring in more than this fraction of documents are stop words.
    pub max_document_ratio: f64,
    /// Terms whose total number of occurrences is at most this are stop words.
    pub min_occurrences: usize,
}

impl Default for FrequencyThresholds {
    fn default() -> Self {
        Self { max_document_ratio: 0.5, min_occurrences: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn english() -> Self {
        ENGLISH.iter().map(|w| normalize_term(w)).collect()
    }

    /// Load a list with one stop word per line; blank lines are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(normalize_term)
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Generate a list from the collection itself: terms that are too common
    /// to discriminate between documents, plus terms too rare to matter.
    pub fn by_frequency(collection: &[Document], thresholds: FrequencyThresholds) -> Self {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in collection {
            let mut seen = HashSet::new();
            for term in &doc.terms {
                *occurrences.entry(term).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }
        let n = collection.len().max(1) as f64;
        let words: Self = occurrences
            .into_iter()
            .filter(|(term, count)| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                df / n > thresholds.max_document_ratio || *count <= thresholds.min_occurrences
            })
            .map(|(term, _)| term.to_string())
            .collect();
        tracing::info!(num_docs = collection.len(), num_stop_words = words.len(), "generated stop words by frequency");
        words
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn remove_from(&self, terms: &[String]) -> Vec<String> {
        terms.iter().filter(|t| !self.contains(t)).cloned().collect()
    }

    /// Sorted copy of the list, the order used when persisting it.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.sort();
        words
    }
}

impl FromIterator<String> for StopWords {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { words: iter.into_iter().collect() }
    }
}

/// Populate `filtered_terms` of every document.
pub fn filter_collection(collection: &mut [Document], stop_words: &StopWords) {
    for doc in collection.iter_mut() {
        doc.filtered_terms = Some(stop_words.remove_from(&doc.terms));
    }
}
