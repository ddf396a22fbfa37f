//! Exact boolean retrieval over inverted lists.

use crate::document::{DocId, Document, TermView};
use crate::error::{ParseError, Result};
use crate::model::RetrievalModel;
use crate::query::{self, DocSet, Expr, TermSource};
use crate::stemmer::stem;
use std::collections::{HashMap, HashSet};

/// Collects documents into postings sets; consumed by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct InvertedIndexBuilder {
    view: TermView,
    postings: HashMap<String, DocSet>,
    doc_ids: Vec<DocId>,
}

impl InvertedIndexBuilder {
    pub fn new(view: TermView) -> Self {
        Self { view, ..Default::default() }
    }

    /// Register a document and add its id to the postings of each distinct
    /// term of the selected term list.
    pub fn add_document(&mut self, doc: &Document) {
        self.doc_ids.push(doc.id);
        let terms: HashSet<String> = doc.terms_for(self.view).into_iter().collect();
        for term in terms {
            self.postings.entry(term).or_default().insert(doc.id);
        }
    }

    pub fn build(self) -> InvertedIndex {
        tracing::info!(num_docs = self.doc_ids.len(), num_terms = self.postings.len(), "built inverted index");
        InvertedIndex {
            view: self.view,
            postings: self.postings,
            universe: self.doc_ids.iter().copied().collect(),
            doc_ids: self.doc_ids,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    view: TermView,
    postings: HashMap<String, DocSet>,
    universe: DocSet,
    doc_ids: Vec<DocId>,
}

impl InvertedIndex {
    pub fn from_documents<'a, I: IntoIterator<Item = &'a Document>>(docs: I, view: TermView) -> Self {
        let mut builder = InvertedIndexBuilder::new(view);
        for doc in docs {
            builder.add_document(doc);
        }
        builder.build()
    }

    pub fn view(&self) -> TermView {
        self.view
    }

    pub fn postings(&self, term: &str) -> Option<&DocSet> {
        self.postings.get(term)
    }

    pub fn num_docs(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Registered document ids in insertion order.
    pub fn doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }

    /// Parse a query and bring its terms into the index's term view.
    pub fn parse_query(&self, query: &str) -> std::result::Result<Expr, ParseError> {
        let expr = query::parse(query)?;
        Ok(if self.view.stemming { expr.map_terms(&stem) } else { expr })
    }

    pub fn evaluate(&self, expr: &Expr) -> DocSet {
        query::evaluate(expr, self)
    }

    /// Matching ids in insertion order.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        let matched = self.query_to_representation(query)?;
        tracing::debug!(query, hits = matched.len(), "evaluated boolean query");
        Ok(self.doc_ids.iter().copied().filter(|id| matched.contains(id)).collect())
    }
}

impl TermSource for InvertedIndex {
    fn lookup(&self, term: &str) -> DocSet {
        self.postings.get(term).cloned().unwrap_or_default()
    }

    fn universe(&self) -> DocSet {
        self.universe.clone()
    }
}

impl RetrievalModel for InvertedIndex {
    type DocRepr = DocId;
    type QueryRepr = DocSet;
    type Score = f32;

    fn document_to_representation(&self, doc: &Document, _view: TermView) -> DocId {
        doc.id
    }

    fn query_to_representation(&self, query: &str) -> Result<DocSet> {
        Ok(self.evaluate(&self.parse_query(query)?))
    }

    fn matches(&self, doc: &DocId, query: &DocSet) -> f32 {
        if query.contains(doc) {
            1.0
        } else {
            0.0
        }
    }
}
