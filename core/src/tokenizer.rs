use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
}

/// Tokenize text into lower-cased terms using NFKC normalization. Possessive
/// `'s` and stray apostrophes are removed; stop words are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| clean_word(m.as_str()))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Normalize a single query term the same way document terms are produced.
pub fn normalize_term(term: &str) -> String {
    tokenize(term).concat()
}

fn clean_word(word: &str) -> String {
    let word = word.strip_suffix("'s").unwrap_or(word);
    word.replace('\'', "")
}
