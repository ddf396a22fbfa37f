//! Vector space ranking with TF-IDF weights and cosine similarity.
//!
//! Document weights are `tf * idf` with raw term frequencies; query weights
//! are `tf / |q| * idf`. Similarities are rounded to three decimals before
//! they are compared.

use crate::document::{DocId, Document, TermView};
use crate::error::Result;
use crate::model::RetrievalModel;
use crate::stemmer::stem;
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::HashMap;

pub type TermFrequencies = HashMap<String, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    pub weights: HashMap<String, f64>,
}

impl QueryVector {
    pub fn norm(&self) -> f64 {
        norm(&self.weights)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

pub fn term_frequencies(terms: &[String]) -> TermFrequencies {
    let mut tf = TermFrequencies::new();
    for term in terms {
        *tf.entry(term.clone()).or_insert(0) += 1;
    }
    tf
}

pub fn round_score(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn norm(v: &HashMap<String, f64>) -> f64 {
    v.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine of the angle between two sparse vectors; 0.0 if either is zero.
pub fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().filter_map(|(t, wa)| b.get(t).map(|wb| wa * wb)).sum();
    dot / (na * nb)
}

#[derive(Debug, Default)]
pub struct VectorIndexBuilder {
    view: TermView,
    postings: HashMap<String, Vec<Posting>>,
    doc_ids: Vec<DocId>,
    doc_lengths: HashMap<DocId, u32>,
}

impl VectorIndexBuilder {
    pub fn new(view: TermView) -> Self {
        Self { view, ..Default::default() }
    }

    pub fn add_document(&mut self, doc: &Document) {
        let terms = doc.terms_for(self.view);
        self.doc_ids.push(doc.id);
        self.doc_lengths.insert(doc.id, terms.len() as u32);
        for (term, tf) in term_frequencies(&terms) {
            self.postings.entry(term).or_default().push(Posting { doc_id: doc.id, tf });
        }
    }

    pub fn build(self) -> VectorIndex {
        let n = self.doc_ids.len() as f64;
        let idf: HashMap<String, f64> = self
            .postings
            .iter()
            .map(|(term, plist)| (term.clone(), (n / plist.len() as f64).ln()))
            .collect();

        let mut norms: HashMap<DocId, f64> = HashMap::new();
        for (term, plist) in &self.postings {
            let idf_t = idf[term];
            for p in plist {
                let w = p.tf as f64 * idf_t;
                *norms.entry(p.doc_id).or_insert(0.0) += w * w;
            }
        }
        for v in norms.values_mut() {
            *v = v.sqrt();
        }

        tracing::info!(num_docs = self.doc_ids.len(), num_terms = self.postings.len(), "built vector index");
        VectorIndex {
            view: self.view,
            postings: self.postings,
            idf,
            norms,
            doc_ids: self.doc_ids,
            doc_lengths: self.doc_lengths,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    view: TermView,
    postings: HashMap<String, Vec<Posting>>,
    idf: HashMap<String, f64>,
    /// Euclidean norm of each document's TF-IDF vector.
    norms: HashMap<DocId, f64>,
    doc_ids: Vec<DocId>,
    doc_lengths: HashMap<DocId, u32>,
}

impl VectorIndex {
    pub fn from_documents<'a, I: IntoIterator<Item = &'a Document>>(docs: I, view: TermView) -> Self {
        let mut builder = VectorIndexBuilder::new(view);
        for doc in docs {
            builder.add_document(doc);
        }
        builder.build()
    }

    pub fn num_docs(&self) -> usize {
        self.doc_ids.len()
    }

    /// `ln(N / df)`, or 0.0 for terms no document contains.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc_length(&self, id: DocId) -> Option<u32> {
        self.doc_lengths.get(&id).copied()
    }

    pub fn document_norm(&self, id: DocId) -> f64 {
        self.norms.get(&id).copied().unwrap_or(0.0)
    }

    pub fn document_vector(&self, tf: &TermFrequencies) -> HashMap<String, f64> {
        tf.iter().map(|(term, f)| (term.clone(), *f as f64 * self.idf(term))).collect()
    }

    pub fn query_vector(&self, terms: &[String]) -> QueryVector {
        let len = terms.len() as f64;
        let weights = term_frequencies(terms)
            .into_iter()
            .map(|(term, f)| {
                let w = f as f64 / len * self.idf(&term);
                (term, w)
            })
            .filter(|(_, w)| *w > 0.0)
            .collect();
        QueryVector { weights }
    }

    /// Accumulate dot products term-at-a-time over the postings and
    /// normalize with the cached document norms. Only documents with a
    /// positive similarity are returned, best first, at most `k` of them.
    pub fn rank(&self, query: &QueryVector, k: usize) -> Vec<(DocId, f64)> {
        let q_norm = query.norm();
        if q_norm == 0.0 {
            return Vec::new();
        }
        let mut dots: HashMap<DocId, f64> = HashMap::new();
        for (term, wq) in &query.weights {
            let idf = self.idf(term);
            for p in self.postings(term) {
                *dots.entry(p.doc_id).or_insert(0.0) += wq * p.tf as f64 * idf;
            }
        }
        let mut ranked: Vec<(DocId, f64)> = self
            .doc_ids
            .iter()
            .filter_map(|id| {
                let dot = dots.get(id)?;
                let d_norm = self.document_norm(*id);
                if d_norm == 0.0 {
                    return None;
                }
                let score = round_score(dot / (q_norm * d_norm));
                (score > 0.0).then_some((*id, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<(DocId, f64)>> {
        let q = self.query_to_representation(query)?;
        let ranked = self.rank(&q, k);
        tracing::debug!(query, query_terms = q.weights.len(), hits = ranked.len(), "ranked vector query");
        Ok(ranked)
    }
}

impl RetrievalModel for VectorIndex {
    type DocRepr = TermFrequencies;
    type QueryRepr = QueryVector;
    type Score = f64;

    fn document_to_representation(&self, doc: &Document, view: TermView) -> TermFrequencies {
        term_frequencies(&doc.terms_for(view))
    }

    fn query_to_representation(&self, query: &str) -> Result<QueryVector> {
        let terms: Vec<String> = tokenize(query)
            .into_iter()
            .map(|t| if self.view.stemming { stem(&t) } else { t })
            .collect();
        Ok(self.query_vector(&terms))
    }

    /// Builds the document vector on demand.
    fn matches(&self, doc: &TermFrequencies, query: &QueryVector) -> f64 {
        round_score(cosine(&query.weights, &self.document_vector(doc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(0, "a", "the fox runs"),
            Document::new(1, "b", "the fox jumps"),
            Document::new(2, "c", "a cat sleeps"),
        ]
    }

    #[test]
    fn idf_is_log_inverse_document_frequency() {
        let idx = VectorIndex::from_documents(&docs(), TermView::default());
        assert!((idx.idf("fox") - (3.0f64 / 2.0).ln()).abs() < 1e-12);
        assert!((idx.idf("cat") - 3.0f64.ln()).abs() < 1e-12);
        assert_eq!(idx.idf("wolf"), 0.0);
    }

    #[test]
    fn postings_sum_to_document_length() {
        let documents = vec![Document::new(5, "a", "the fox and the other fox and the hound")];
        let idx = VectorIndex::from_documents(&documents, TermView::default());
        let the = idx.postings("the");
        assert_eq!(the, &[Posting { doc_id: 5, tf: 3 }]);
        let total: u32 = ["the", "fox", "and", "other", "hound"]
            .iter()
            .flat_map(|t| idx.postings(t))
            .map(|p| p.tf)
            .sum();
        assert_eq!(Some(total), idx.doc_length(5));
    }

    #[test]
    fn query_weights_are_length_normalized() {
        let idx = VectorIndex::from_documents(&docs(), TermView::default());
        let q = idx.query_to_representation("fox cat cat wolf").unwrap();
        assert!((q.weights["fox"] - 0.25 * idx.idf("fox")).abs() < 1e-12);
        assert!((q.weights["cat"] - 0.5 * idx.idf("cat")).abs() < 1e-12);
        assert!(!q.weights.contains_key("wolf"));
    }

    #[test]
    fn ranks_matching_documents_with_stable_ties() {
        let idx = VectorIndex::from_documents(&docs(), TermView::default());
        let ranked = idx.search("fox", 10).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].0, ranked[1].0), (0, 1));
        assert_eq!(ranked[0].1, ranked[1].1);
        assert!(ranked[0].1 > 0.0);
        assert_eq!(idx.search("fox", 1).unwrap().len(), 1);
        assert!(idx.search("fox", 0).unwrap().is_empty());
        assert!(idx.search("", 5).unwrap().is_empty());
    }

    #[test]
    fn match_agrees_with_rank() {
        let documents = docs();
        let idx = VectorIndex::from_documents(&documents, TermView::default());
        let q = idx.query_to_representation("fox jumps").unwrap();
        let ranked = idx.rank(&q, 10);
        for (id, score) in ranked {
            let doc = &documents[id as usize];
            let repr = idx.document_to_representation(doc, TermView::default());
            assert_eq!(idx.matches(&repr, &q), score);
        }
        let cat = idx.document_to_representation(&documents[2], TermView::default());
        assert_eq!(idx.matches(&cat, &q), 0.0);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        let empty = HashMap::new();
        let v: HashMap<String, f64> = [("a".to_string(), 1.0)].into_iter().collect();
        assert_eq!(cosine(&empty, &v), 0.0);
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rounds_to_three_decimals() {
        assert_eq!(round_score(0.32749), 0.327);
        assert_eq!(round_score(0.9996), 1.0);
    }
}
