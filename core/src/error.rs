use thiserror::Error;

/// Syntax errors in a boolean query. `pos` is the index of the offending
/// token in the tokenized query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty query")]
    Empty,
    #[error("unbalanced parentheses: unexpected ')' at token {pos}")]
    UnexpectedClose { pos: usize },
    #[error("unbalanced parentheses: '(' at token {pos} is never closed")]
    UnclosedGroup { pos: usize },
    #[error("operator '{op}' at token {pos} has no operand")]
    DanglingOperator { op: char, pos: usize },
    #[error("empty parentheses at token {pos}")]
    EmptyGroup { pos: usize },
    #[error("'-' at token {pos} must be followed by a term")]
    NotWithoutOperand { pos: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("malformed input: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
