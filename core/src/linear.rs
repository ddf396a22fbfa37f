use crate::document::{DocId, Document, TermView};
use crate::error::Result;
use crate::model::RetrievalModel;
use crate::query::{self, DocSet, Expr, TermSource};
use crate::stemmer::stem;
use std::collections::HashSet;

/// Boolean model without an index: every query is evaluated against each
/// document's term set in turn.
#[derive(Debug, Clone, Default)]
pub struct LinearBooleanModel {
    view: TermView,
    docs: Vec<(DocId, HashSet<String>)>,
}

impl LinearBooleanModel {
    pub fn new(collection: &[Document], view: TermView) -> Self {
        let mut model = Self { view, docs: Vec::new() };
        let docs = collection
            .iter()
            .map(|doc| (doc.id, model.document_to_representation(doc, view)))
            .collect();
        model.docs = docs;
        model
    }

    /// Ids of the documents satisfying the boolean query, in collection order.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        let expr = self.query_to_representation(query)?;
        let hits: Vec<DocId> = self
            .docs
            .iter()
            .filter(|(_, terms)| self.matches(terms, &expr) > 0.0)
            .map(|(id, _)| *id)
            .collect();
        tracing::debug!(query, scanned = self.docs.len(), hits = hits.len(), "scanned boolean query");
        Ok(hits)
    }
}

/// One document's terms, seen as a collection of that document alone.
struct ScannedDocument<'a> {
    terms: &'a HashSet<String>,
}

// The single document is represented by id 0; only emptiness matters.
impl TermSource for ScannedDocument<'_> {
    fn lookup(&self, term: &str) -> DocSet {
        if self.terms.contains(term) {
            DocSet::from([0])
        } else {
            DocSet::new()
        }
    }

    fn universe(&self) -> DocSet {
        DocSet::from([0])
    }
}

impl RetrievalModel for LinearBooleanModel {
    type DocRepr = HashSet<String>;
    type QueryRepr = Expr;
    type Score = f32;

    fn document_to_representation(&self, doc: &Document, view: TermView) -> HashSet<String> {
        doc.terms_for(view).into_iter().collect()
    }

    fn query_to_representation(&self, query: &str) -> Result<Expr> {
        let expr = query::parse(query)?;
        Ok(if self.view.stemming { expr.map_terms(&stem) } else { expr })
    }

    fn matches(&self, doc: &HashSet<String>, query: &Expr) -> f32 {
        if query::evaluate(query, &ScannedDocument { terms: doc }).is_empty() {
            0.0
        } else {
            1.0
        }
    }
}
