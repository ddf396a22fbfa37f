//! Boolean query syntax shared by the inverted-list and signature models.
//!
//! Grammar (no precedence between `&` and `|`, operators fold left to right):
//!
//! ```text
//! sequence := operand ( ( "&" | "|" )? operand )*     adjacency means "&"
//! operand  := "-" TERM | TERM | "(" sequence ")"
//! ```

use crate::document::DocId;
use crate::error::ParseError;
use crate::tokenizer::normalize_term;
use std::collections::BTreeSet;
use std::fmt;

pub type DocSet = BTreeSet<DocId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(t) => f.write_str(t),
            Token::And => f.write_str("&"),
            Token::Or => f.write_str("|"),
            Token::Not => f.write_str("-"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    /// Only ever wraps a `Term`.
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn term(t: impl Into<String>) -> Self {
        Expr::Term(t.into())
    }

    /// Rewrite every term, e.g. to stem a parsed query.
    pub fn map_terms<F: Fn(&str) -> String>(self, f: &F) -> Self {
        match self {
            Expr::Term(t) => Expr::Term(f(&t)),
            Expr::Not(e) => Expr::Not(Box::new(e.map_terms(f))),
            Expr::And(a, b) => Expr::And(Box::new(a.map_terms(f)), Box::new(b.map_terms(f))),
            Expr::Or(a, b) => Expr::Or(Box::new(a.map_terms(f)), Box::new(b.map_terms(f))),
        }
    }

    pub fn terms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Term(t) => out.push(t),
            Expr::Not(e) => e.collect_terms(out),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_terms(out);
                b.collect_terms(out);
            }
        }
    }
}

/// Something a query expression can be evaluated against.
pub trait TermSource {
    /// Documents matching a single term; unknown terms give the empty set.
    fn lookup(&self, term: &str) -> DocSet;
    /// Every document the source knows about, used to resolve NOT.
    fn universe(&self) -> DocSet;
}

/// Evaluate bottom-up: AND intersects, OR unions, NOT subtracts from the universe.
pub fn evaluate<S: TermSource + ?Sized>(expr: &Expr, source: &S) -> DocSet {
    match expr {
        Expr::Term(t) => source.lookup(t),
        Expr::Not(e) => {
            let excluded = evaluate(e, source);
            source.universe().difference(&excluded).copied().collect()
        }
        Expr::And(a, b) => {
            let left = evaluate(a, source);
            if left.is_empty() {
                return left;
            }
            left.intersection(&evaluate(b, source)).copied().collect()
        }
        Expr::Or(a, b) => {
            let mut left = evaluate(a, source);
            left.extend(evaluate(b, source));
            left
        }
    }
}

/// Split a query into terms, operators and parentheses. Terms are
/// normalized like document terms; ones that normalize to nothing are dropped.
pub fn tokenize_query(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in query.chars() {
        let op = match c {
            '&' => Some(Token::And),
            '|' => Some(Token::Or),
            '-' => Some(Token::Not),
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            _ => None,
        };
        if op.is_some() || c.is_whitespace() {
            flush_term(&mut word, &mut tokens);
            tokens.extend(op);
        } else {
            word.push(c);
        }
    }
    flush_term(&mut word, &mut tokens);
    tokens
}

fn flush_term(word: &mut String, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    let term = normalize_term(word);
    word.clear();
    if !term.is_empty() {
        tokens.push(Token::Term(term));
    }
}

pub fn parse(query: &str) -> Result<Expr, ParseError> {
    parse_tokens(&tokenize_query(query))
}

pub fn parse_tokens(tokens: &[Token]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    Parser { tokens, pos: 0 }.sequence(None)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Parse operands until the end of input, or until the `)` matching the
    /// `(` at `open`.
    fn sequence(&mut self, open: Option<usize>) -> Result<Expr, ParseError> {
        let mut lhs = self.operand()?;
        loop {
            match self.peek() {
                None => {
                    return match open {
                        Some(pos) => Err(ParseError::UnclosedGroup { pos }),
                        None => Ok(lhs),
                    };
                }
                Some(Token::Close) => {
                    if open.is_none() {
                        return Err(ParseError::UnexpectedClose { pos: self.pos });
                    }
                    self.pos += 1;
                    return Ok(lhs);
                }
                Some(tok @ (Token::And | Token::Or)) => {
                    let (op, is_and) = if *tok == Token::And { ('&', true) } else { ('|', false) };
                    let op_pos = self.pos;
                    self.pos += 1;
                    if matches!(self.peek(), None | Some(Token::Close | Token::And | Token::Or)) {
                        return Err(ParseError::DanglingOperator { op, pos: op_pos });
                    }
                    let rhs = self.operand()?;
                    lhs = if is_and {
                        Expr::And(Box::new(lhs), Box::new(rhs))
                    } else {
                        Expr::Or(Box::new(lhs), Box::new(rhs))
                    };
                }
                Some(_) => {
                    let rhs = self.operand()?;
                    lhs = Expr::And(Box::new(lhs), Box::new(rhs));
                }
            }
        }
    }

    fn operand(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos;
        match self.peek() {
            Some(Token::Term(t)) => {
                let term = Expr::term(t.clone());
                self.pos += 1;
                Ok(term)
            }
            Some(Token::Not) => {
                self.pos += 1;
                match self.peek() {
                    Some(Token::Term(t)) => {
                        let term = Expr::term(t.clone());
                        self.pos += 1;
                        Ok(Expr::Not(Box::new(term)))
                    }
                    _ => Err(ParseError::NotWithoutOperand { pos }),
                }
            }
            Some(Token::Open) => {
                self.pos += 1;
                match self.peek() {
                    Some(Token::Close) => return Err(ParseError::EmptyGroup { pos }),
                    None => return Err(ParseError::UnclosedGroup { pos }),
                    _ => {}
                }
                self.sequence(Some(pos))
            }
            Some(Token::Close) => Err(ParseError::UnexpectedClose { pos }),
            Some(Token::And) => Err(ParseError::DanglingOperator { op: '&', pos }),
            Some(Token::Or) => Err(ParseError::DanglingOperator { op: '|', pos }),
            None => Err(ParseError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Box<Expr> {
        Box::new(Expr::term(s))
    }

    #[test]
    fn tokenizes_operators_without_spaces() {
        assert_eq!(
            tokenize_query("Fox&(cat|-Dog)"),
            vec![
                Token::Term("fox".into()),
                Token::And,
                Token::Open,
                Token::Term("cat".into()),
                Token::Or,
                Token::Not,
                Token::Term("dog".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn operators_fold_left_to_right() {
        let e = parse("a | b & c").unwrap();
        assert_eq!(e, Expr::And(Box::new(Expr::Or(t("a"), t("b"))), t("c")));
    }

    #[test]
    fn parentheses_group() {
        let e = parse("a | (b & c)").unwrap();
        assert_eq!(e, Expr::Or(t("a"), Box::new(Expr::And(t("b"), t("c")))));
    }

    #[test]
    fn adjacency_is_conjunction() {
        assert_eq!(parse("fox cat").unwrap(), Expr::And(t("fox"), t("cat")));
    }

    #[test]
    fn not_binds_to_next_term() {
        assert_eq!(parse("-a & b").unwrap(), Expr::And(Box::new(Expr::Not(t("a"))), t("b")));
    }

    #[test]
    fn reports_parse_errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("  !! "), Err(ParseError::Empty));
        assert_eq!(parse("(a & b"), Err(ParseError::UnclosedGroup { pos: 0 }));
        assert_eq!(parse("a & b)"), Err(ParseError::UnexpectedClose { pos: 3 }));
        assert_eq!(parse("a &"), Err(ParseError::DanglingOperator { op: '&', pos: 1 }));
        assert_eq!(parse("| a"), Err(ParseError::DanglingOperator { op: '|', pos: 0 }));
        assert_eq!(parse("a & | b"), Err(ParseError::DanglingOperator { op: '&', pos: 1 }));
        assert_eq!(parse("-(a | b)"), Err(ParseError::NotWithoutOperand { pos: 0 }));
        assert_eq!(parse("a -"), Err(ParseError::NotWithoutOperand { pos: 1 }));
        assert_eq!(parse("()"), Err(ParseError::EmptyGroup { pos: 0 }));
    }

    #[test]
    fn map_terms_rewrites_leaves() {
        let e = parse("Foxes & -cats").unwrap().map_terms(&crate::stemmer::stem);
        assert_eq!(e.terms(), vec!["fox", "cat"]);
    }
}
