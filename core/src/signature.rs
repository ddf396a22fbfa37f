//! Approximate boolean retrieval with superimposed coding.
//!
//! Every term hashes to a mini-signature of `bits` bits with exactly `weight`
//! of them set. A document is cut into blocks of `block_size` consecutive
//! terms and each block stores the OR of its terms' mini-signatures. A term
//! is a candidate for a document when some block has all of the term's bits
//! set. Bit collisions can produce false positives but never false negatives;
//! with `verify` enabled candidates are confirmed against the real term lists.

use crate::config::SignatureParams;
use crate::document::{DocId, Document, TermView};
use crate::error::{ParseError, Result};
use crate::model::RetrievalModel;
use crate::query::{self, DocSet, Expr, TermSource};
use crate::stemmer::stem;
use bit_vec::BitVec;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Mini-signature of `term`. The bit positions come from a generator seeded
/// with the term's CRC-32, so the mapping never depends on shared state.
pub fn mini_signature(term: &str, bits: usize, weight: usize) -> BitVec {
    let mut rng = StdRng::seed_from_u64(u64::from(crc32fast::hash(term.as_bytes())));
    let mut sig = BitVec::from_elem(bits, false);
    for pos in sample(&mut rng, bits, weight) {
        sig.set(pos, true);
    }
    sig
}

/// `(query AND block) == query`
pub fn covers(block: &BitVec, query: &BitVec) -> bool {
    let mut probe = query.clone();
    probe.and(block);
    probe == *query
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocSignature {
    pub doc_id: DocId,
    pub blocks: Vec<BitVec>,
}

impl DocSignature {
    pub fn covers(&self, query: &BitVec) -> bool {
        self.blocks.iter().any(|block| covers(block, query))
    }
}

fn encode_blocks<'a, F>(terms: &[String], params: &SignatureParams, mut signature: F) -> Vec<BitVec>
where
    F: FnMut(&str) -> Cow<'a, BitVec>,
{
    terms
        .chunks(params.block_size)
        .map(|chunk| {
            let mut block = BitVec::from_elem(params.bits, false);
            for term in chunk {
                block.or(&signature(term));
            }
            block
        })
        .collect()
}

#[derive(Debug)]
pub struct SignatureIndexBuilder {
    params: SignatureParams,
    view: TermView,
    vocabulary: HashMap<String, BitVec>,
    docs: Vec<DocSignature>,
    term_sets: HashMap<DocId, HashSet<String>>,
}

impl SignatureIndexBuilder {
    pub fn new(params: SignatureParams, view: TermView) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, view, vocabulary: HashMap::new(), docs: Vec::new(), term_sets: HashMap::new() })
    }

    pub fn add_document(&mut self, doc: &Document) {
        let terms = doc.terms_for(self.view);
        let params = self.params;
        for term in &terms {
            if !self.vocabulary.contains_key(term) {
                self.vocabulary.insert(term.clone(), mini_signature(term, params.bits, params.weight));
            }
        }
        let vocabulary = &self.vocabulary;
        let blocks = encode_blocks(&terms, &params, |t| Cow::Borrowed(&vocabulary[t]));
        if params.verify {
            self.term_sets.insert(doc.id, terms.into_iter().collect());
        }
        self.docs.push(DocSignature { doc_id: doc.id, blocks });
    }

    pub fn build(self) -> SignatureIndex {
        let num_blocks: usize = self.docs.iter().map(|d| d.blocks.len()).sum();
        tracing::info!(
            num_docs = self.docs.len(),
            num_terms = self.vocabulary.len(),
            num_blocks,
            bits = self.params.bits,
            weight = self.params.weight,
            block_size = self.params.block_size,
            "built signature index"
        );
        SignatureIndex {
            params: self.params,
            view: self.view,
            vocabulary: self.vocabulary,
            universe: self.docs.iter().map(|d| d.doc_id).collect(),
            docs: self.docs,
            term_sets: self.params.verify.then_some(self.term_sets),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignatureIndex {
    params: SignatureParams,
    view: TermView,
    vocabulary: HashMap<String, BitVec>,
    docs: Vec<DocSignature>,
    universe: DocSet,
    term_sets: Option<HashMap<DocId, HashSet<String>>>,
}

impl SignatureIndex {
    pub fn from_documents<'a, I>(docs: I, params: SignatureParams, view: TermView) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut builder = SignatureIndexBuilder::new(params, view)?;
        for doc in docs {
            builder.add_document(doc);
        }
        Ok(builder.build())
    }

    pub fn params(&self) -> &SignatureParams {
        &self.params
    }

    /// Stored mini-signature, or a freshly hashed one for terms never indexed.
    pub fn signature_for(&self, term: &str) -> Cow<'_, BitVec> {
        match self.vocabulary.get(term) {
            Some(sig) => Cow::Borrowed(sig),
            None => Cow::Owned(mini_signature(term, self.params.bits, self.params.weight)),
        }
    }

    pub fn document_signature(&self, id: DocId) -> Option<&DocSignature> {
        self.docs.iter().find(|d| d.doc_id == id)
    }

    pub fn parse_query(&self, query: &str) -> std::result::Result<Expr, ParseError> {
        let expr = query::parse(query)?;
        Ok(if self.view.stemming { expr.map_terms(&stem) } else { expr })
    }

    /// Signature-only evaluation, false positives included.
    pub fn candidates(&self, expr: &Expr) -> DocSet {
        query::evaluate(expr, &Unverified(self))
    }

    /// Evaluation honoring `verify`.
    pub fn evaluate(&self, expr: &Expr) -> DocSet {
        query::evaluate(expr, self)
    }

    /// Matching ids in insertion order.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        let matched = self.evaluate(&self.parse_query(query)?);
        tracing::debug!(query, hits = matched.len(), verify = self.params.verify, "evaluated signature query");
        Ok(self.docs.iter().map(|d| d.doc_id).filter(|id| matched.contains(id)).collect())
    }

    fn confirmed(&self, doc: &DocSignature, term: &str, sig: &BitVec) -> bool {
        if !doc.covers(sig) {
            return false;
        }
        match &self.term_sets {
            Some(sets) => sets.get(&doc.doc_id).is_some_and(|terms| terms.contains(term)),
            None => true,
        }
    }
}

impl TermSource for SignatureIndex {
    fn lookup(&self, term: &str) -> DocSet {
        let sig = self.signature_for(term);
        self.docs.iter().filter(|d| self.confirmed(d, term, &sig)).map(|d| d.doc_id).collect()
    }

    fn universe(&self) -> DocSet {
        self.universe.clone()
    }
}

struct Unverified<'a>(&'a SignatureIndex);

impl TermSource for Unverified<'_> {
    fn lookup(&self, term: &str) -> DocSet {
        let sig = self.0.signature_for(term);
        self.0.docs.iter().filter(|d| d.covers(&sig)).map(|d| d.doc_id).collect()
    }

    fn universe(&self) -> DocSet {
        self.0.universe.clone()
    }
}

/// A single document seen as its own tiny collection.
struct SingleDocument<'a> {
    index: &'a SignatureIndex,
    doc: &'a DocSignature,
}

impl TermSource for SingleDocument<'_> {
    fn lookup(&self, term: &str) -> DocSet {
        let sig = self.index.signature_for(term);
        if self.index.confirmed(self.doc, term, &sig) {
            DocSet::from([self.doc.doc_id])
        } else {
            DocSet::new()
        }
    }

    fn universe(&self) -> DocSet {
        DocSet::from([self.doc.doc_id])
    }
}

impl RetrievalModel for SignatureIndex {
    type DocRepr = DocSignature;
    type QueryRepr = Expr;
    type Score = Vec<DocId>;

    fn document_to_representation(&self, doc: &Document, view: TermView) -> DocSignature {
        let blocks = encode_blocks(&doc.terms_for(view), &self.params, |t| self.signature_for(t));
        DocSignature { doc_id: doc.id, blocks }
    }

    fn query_to_representation(&self, query: &str) -> Result<Expr> {
        Ok(self.parse_query(query)?)
    }

    fn matches(&self, doc: &DocSignature, query: &Expr) -> Vec<DocId> {
        query::evaluate(query, &SingleDocument { index: self, doc }).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones(sig: &BitVec) -> usize {
        sig.iter().filter(|b| *b).count()
    }

    fn docs() -> Vec<Document> {
        vec![
            Document::new(0, "a", "the fox runs"),
            Document::new(1, "b", "the fox jumps over the lazy dog"),
            Document::new(2, "c", "a cat sleeps"),
        ]
    }

    #[test]
    fn mini_signature_has_exact_weight_and_is_stable() {
        let a = mini_signature("fox", 64, 3);
        assert_eq!(a.len(), 64);
        assert_eq!(ones(&a), 3);
        assert_eq!(a, mini_signature("fox", 64, 3));
        assert_eq!(ones(&mini_signature("fox", 8, 8)), 8);
    }

    #[test]
    fn blocks_group_consecutive_terms() {
        let params = SignatureParams { block_size: 2, ..Default::default() };
        let idx = SignatureIndex::from_documents(&docs(), params, TermView::default()).unwrap();
        let sig = idx.document_signature(1).unwrap();
        assert_eq!(sig.blocks.len(), 4);
        let mut expected = idx.signature_for("the").into_owned();
        expected.or(&idx.signature_for("fox"));
        assert_eq!(sig.blocks[0], expected);
    }

    #[test]
    fn single_terms_have_no_false_negatives() {
        let documents = docs();
        let idx = SignatureIndex::from_documents(&documents, SignatureParams::default(), TermView::default()).unwrap();
        for doc in &documents {
            for term in &doc.terms {
                let hits = idx.search(term).unwrap();
                assert!(hits.contains(&doc.id), "{term} should match doc {}", doc.id);
            }
        }
    }

    #[test]
    fn boolean_operators_combine_candidates() {
        let params = SignatureParams { bits: 256, weight: 4, block_size: 2, verify: true };
        let idx = SignatureIndex::from_documents(&docs(), params, TermView::default()).unwrap();
        assert_eq!(idx.search("fox & dog").unwrap(), vec![1]);
        assert_eq!(idx.search("runs | cat").unwrap(), vec![0, 2]);
        assert_eq!(idx.search("-fox").unwrap(), vec![2]);
        assert!(idx.search("fox & (").is_err());
    }

    #[test]
    fn verification_removes_collisions() {
        // With every bit set in every block, every term is a candidate everywhere.
        let params = SignatureParams { bits: 4, weight: 4, block_size: 4, verify: true };
        let idx = SignatureIndex::from_documents(&docs(), params, TermView::default()).unwrap();
        let expr = idx.parse_query("cat").unwrap();
        assert_eq!(idx.candidates(&expr).len(), 3);
        assert_eq!(idx.search("cat").unwrap(), vec![2]);
    }

    #[test]
    fn match_returns_matching_ids() {
        let documents = docs();
        let params = SignatureParams { bits: 256, weight: 4, ..Default::default() };
        let idx = SignatureIndex::from_documents(&documents, params, TermView::default()).unwrap();
        let query = idx.query_to_representation("fox").unwrap();
        let repr = idx.document_to_representation(&documents[1], TermView::default());
        assert_eq!(repr, *idx.document_signature(1).unwrap());
        assert_eq!(idx.matches(&repr, &query), vec![1]);
        let repr = idx.document_to_representation(&documents[2], TermView::default());
        assert!(idx.matches(&repr, &query).is_empty());
    }

    #[test]
    fn rejects_invalid_params() {
        let params = SignatureParams { bits: 2, weight: 3, ..Default::default() };
        assert!(SignatureIndexBuilder::new(params, TermView::default()).is_err());
    }
}
