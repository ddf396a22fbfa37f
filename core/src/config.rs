use crate::document::TermView;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub stop_word_filtering: bool,
    pub stemming: bool,
    /// Number of results returned by ranked models.
    pub k: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { stop_word_filtering: false, stemming: false, k: DEFAULT_K }
    }
}

impl SearchOptions {
    pub fn view(&self) -> TermView {
        TermView::new(self.stop_word_filtering, self.stemming)
    }
}

/// Superimposed coding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureParams {
    /// Width M of every signature in bits.
    pub bits: usize,
    /// Number K of bits set in a term's mini-signature.
    pub weight: usize,
    /// Number D of consecutive terms OR-ed into one block signature.
    pub block_size: usize,
    /// Confirm candidates against the true term lists.
    pub verify: bool,
}

impl Default for SignatureParams {
    fn default() -> Self {
        Self { bits: 64, weight: 3, block_size: 4, verify: false }
    }
}

impl SignatureParams {
    pub fn validate(&self) -> Result<()> {
        if self.bits == 0 || self.weight == 0 || self.block_size == 0 {
            return Err(Error::Config("signature bits, weight and block size must be positive".into()));
        }
        if self.weight > self.bits {
            return Err(Error::Config(format!(
                "signature weight {} exceeds width {}",
                self.weight, self.bits
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Boolean membership by scanning every document.
    Linear,
    Inverted,
    Signature,
    Vector,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [ModelKind::Linear, ModelKind::Inverted, ModelKind::Signature, ModelKind::Vector];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Inverted => "inverted",
            ModelKind::Signature => "signature",
            ModelKind::Vector => "vector",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown model '{s}' (expected linear, inverted, signature or vector)")))
    }
}
