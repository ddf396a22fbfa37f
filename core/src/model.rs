use crate::document::{Document, TermView};
use crate::error::Result;

/// The capability set every retrieval model offers. Each model picks its own
/// document and query representations and its own notion of a score.
pub trait RetrievalModel {
    type DocRepr;
    type QueryRepr;
    type Score;

    fn document_to_representation(&self, doc: &Document, view: TermView) -> Self::DocRepr;

    /// Fails only on malformed boolean syntax; unknown terms are not errors.
    fn query_to_representation(&self, query: &str) -> Result<Self::QueryRepr>;

    fn matches(&self, doc: &Self::DocRepr, query: &Self::QueryRepr) -> Self::Score;
}
