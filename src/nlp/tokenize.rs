// Part-of-speech filtered term extraction.
use serde::{Deserialize, Serialize};

use super::analyzer::Token;
use super::lexicon::Stopwords;

/// Number of POS levels compared by a filter pattern (e.g. `名詞,固有名詞,一般`)
pub const POS_FILTER_DEPTH: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizeOptions {
    /// Keep only tokens whose first three POS levels equal one of these. Empty keeps everything.
    pub pos_filter: Vec<Vec<String>>,
    pub normalize: bool,
    /// Emit the dictionary form instead of the surface form
    pub base_form: bool,
    /// Append `:pos1-pos2-pos3` to each term
    pub with_pos: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            pos_filter: Vec::new(),
            normalize: true,
            base_form: true,
            with_pos: false,
        }
    }
}

/// Parses a comma-separated POS pattern such as `名詞,固有名詞,一般`.
pub fn parse_pos_pattern(pattern: &str) -> Vec<String> {
    pattern.split(',').map(|s| s.trim().to_string()).collect()
}

pub fn extract_terms(tokens: &[Token], options: &TokenizeOptions, stopwords: &Stopwords) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| matches_filter(t, &options.pos_filter))
        .map(|t| (t, t.term(options.base_form)))
        .filter(|(_, term)| !term.is_empty() && !stopwords.contains(term))
        .map(|(t, term)| {
            if options.with_pos {
                format!("{}:{}", term, t.pos_prefix(POS_FILTER_DEPTH).join("-"))
            } else {
                term
            }
        })
        .collect()
}

pub fn join_terms(terms: &[String]) -> String {
    terms.join(" ").trim().to_string()
}

fn matches_filter(token: &Token, filter: &[Vec<String>]) -> bool {
    filter.is_empty()
        || filter
            .iter()
            .any(|pattern| token.pos_prefix(POS_FILTER_DEPTH) == pattern.as_slice())
}
