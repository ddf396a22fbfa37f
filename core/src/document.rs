use crate::stemmer::stem;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};

pub type DocId = u32;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "document_id")]
    pub id: DocId,
    pub title: String,
    pub raw_text: String,
    #[serde(default)]
    pub terms: Vec<String>,
    /// Terms without stop words; `None` until a stop-word pass has run.
    #[serde(default)]
    pub filtered_terms: Option<Vec<String>>,
    /// Stemmed `terms`; `None` until a stemming pass has run.
    #[serde(default)]
    pub stemmed_terms: Option<Vec<String>>,
}

/// Which term list of a document an index is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermView {
    pub stop_word_filtering: bool,
    pub stemming: bool,
}

impl TermView {
    pub fn new(stop_word_filtering: bool, stemming: bool) -> Self {
        Self { stop_word_filtering, stemming }
    }
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let terms = tokenize(&raw_text);
        Self { id, title: title.into(), raw_text, terms, filtered_terms: None, stemmed_terms: None }
    }

    /// The case-folded term list selected by `view`. Filtering falls back to
    /// the raw terms when no filtered list was produced; stemming uses the
    /// precomputed list when it matches the view and stems lazily otherwise.
    pub fn terms_for(&self, view: TermView) -> Vec<String> {
        let base = match (&self.filtered_terms, view.stop_word_filtering) {
            (Some(filtered), true) => filtered,
            _ => &self.terms,
        };
        match (&self.stemmed_terms, view.stemming, view.stop_word_filtering) {
            (_, false, _) => base.iter().map(|t| t.to_lowercase()).collect(),
            (Some(stemmed), true, false) => stemmed.iter().map(|t| t.to_lowercase()).collect(),
            (_, true, _) => base.iter().map(|t| stem(t)).collect(),
        }
    }
}

/// Populate `stemmed_terms` of every document from its raw terms.
pub fn stem_collection(collection: &mut [Document]) {
    for doc in collection.iter_mut() {
        doc.stemmed_terms = Some(doc.terms.iter().map(|t| stem(t)).collect());
    }
}
