pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod inverted;
pub mod linear;
pub mod model;
pub mod persist;
pub mod query;
pub mod signature;
pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;
pub mod vector;

pub use config::{ModelKind, SearchOptions, SignatureParams, DEFAULT_K};
pub use document::{stem_collection, DocId, Document, TermView};
pub use engine::{Engine, Hit, Index};
pub use error::{Error, ParseError, Result};
pub use evaluation::GroundTruth;
pub use model::RetrievalModel;
pub use query::{DocSet, Expr};
pub use stopwords::{filter_collection, StopWords};
