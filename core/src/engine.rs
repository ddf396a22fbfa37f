use crate::config::{ModelKind, SearchOptions, SignatureParams};
use crate::document::{DocId, Document};
use crate::error::Result;
use crate::inverted::InvertedIndex;
use crate::linear::LinearBooleanModel;
use crate::signature::SignatureIndex;
use crate::vector::VectorIndex;
use serde::Serialize;

/// One result; every model produces the same shape. Boolean models score
/// matches 1.0, the vector model reports the cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum Index {
    Linear(LinearBooleanModel),
    Inverted(InvertedIndex),
    Signature(SignatureIndex),
    Vector(VectorIndex),
}

/// A model built over a collection, immutable once constructed.
#[derive(Debug, Clone)]
pub struct Engine {
    kind: ModelKind,
    options: SearchOptions,
    index: Index,
}

impl Engine {
    pub fn build(
        kind: ModelKind,
        collection: &[Document],
        options: SearchOptions,
        signature: SignatureParams,
    ) -> Result<Self> {
        let view = options.view();
        let index = match kind {
            ModelKind::Linear => Index::Linear(LinearBooleanModel::new(collection, view)),
            ModelKind::Inverted => Index::Inverted(InvertedIndex::from_documents(collection, view)),
            ModelKind::Signature => Index::Signature(SignatureIndex::from_documents(collection, signature, view)?),
            ModelKind::Vector => Index::Vector(VectorIndex::from_documents(collection, view)),
        };
        tracing::info!(model = %kind, num_docs = collection.len(), ?options, "engine ready");
        Ok(Self { kind, options, index })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Boolean models return every match in collection order; the vector
    /// model returns at most `k` positively scored documents, best first.
    pub fn search(&self, query: &str) -> Result<Vec<Hit>> {
        self.search_top(query, self.options.k)
    }

    /// Like [`Engine::search`] with an explicit result limit for ranked models.
    pub fn search_top(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        let hits = match &self.index {
            Index::Linear(m) => boolean_hits(m.search(query)?),
            Index::Inverted(idx) => boolean_hits(idx.search(query)?),
            Index::Signature(idx) => boolean_hits(idx.search(query)?),
            Index::Vector(idx) => idx
                .search(query, k)?
                .into_iter()
                .map(|(doc_id, score)| Hit { doc_id, score })
                .collect(),
        };
        Ok(hits)
    }
}

fn boolean_hits(ids: Vec<DocId>) -> Vec<Hit> {
    ids.into_iter().map(|doc_id| Hit { doc_id, score: 1.0 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(10, "a", "the fox runs"),
            Document::new(11, "b", "the fox jumps"),
            Document::new(12, "c", "a cat sleeps"),
        ]
    }

    #[test]
    fn every_model_returns_the_same_shape() {
        let docs = docs();
        let exact = SignatureParams { verify: true, ..Default::default() };
        for kind in ModelKind::ALL {
            let engine = Engine::build(kind, &docs, SearchOptions::default(), exact).unwrap();
            let hits = engine.search("fox").unwrap();
            let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
            assert_eq!(ids, vec![10, 11], "{kind}");
            assert!(hits.iter().all(|h| h.score > 0.0 && h.score <= 1.0), "{kind}");
        }
    }

    #[test]
    fn boolean_models_share_query_syntax() {
        let docs = docs();
        let exact = SignatureParams { verify: true, ..Default::default() };
        for kind in [ModelKind::Linear, ModelKind::Inverted, ModelKind::Signature] {
            let engine = Engine::build(kind, &docs, SearchOptions::default(), exact).unwrap();
            let ids = |q: &str| engine.search(q).unwrap().iter().map(|h| h.doc_id).collect::<Vec<_>>();
            assert_eq!(ids("-fox"), vec![12], "{kind}");
            assert_eq!(ids("fox | cat"), vec![10, 11, 12], "{kind}");
            assert!(engine.search("(fox").is_err(), "{kind}");
        }
    }

    #[test]
    fn stemming_option_applies_to_queries() {
        let docs = vec![Document::new(1, "a", "the foxes were jumping"), Document::new(2, "b", "a cat sleeps")];
        let options = SearchOptions { stemming: true, ..Default::default() };
        let exact = SignatureParams { verify: true, ..Default::default() };
        for kind in ModelKind::ALL {
            let engine = Engine::build(kind, &docs, options, exact).unwrap();
            assert_eq!(engine.search("jumped").unwrap().len(), 1, "{kind}");
        }
    }

    #[test]
    fn vector_results_respect_k() {
        let docs = docs();
        let options = SearchOptions { k: 1, ..Default::default() };
        let engine = Engine::build(ModelKind::Vector, &docs, options, SignatureParams::default()).unwrap();
        assert_eq!(engine.search("fox").unwrap().len(), 1);
        assert_eq!(engine.search_top("fox", 5).unwrap().len(), 2);
    }

    #[test]
    fn invalid_signature_params_fail_the_build() {
        let params = SignatureParams { weight: 0, ..Default::default() };
        assert!(Engine::build(ModelKind::Signature, &docs(), SearchOptions::default(), params).is_err());
    }
}
