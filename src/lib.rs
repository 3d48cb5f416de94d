//! mecab-sentiment: MeCab-backed Japanese tokenization with lexicon-based sentiment scoring
//!
//! Text is normalized, split into sentences, analyzed by MeCab and scored against
//! a noun lexicon and a wago (predicate phrase) lexicon. Negation markers that
//! follow a scored term flip its polarity.

pub mod config;
pub mod error;
pub mod nlp;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use nlp::{
    Analyzer, DictType, Lexicon, LexiconKind, MecabAnalyzer, ScoreResult, SentenceScore, SentimentModel,
    TermPolarity, Token, TokenizeOptions,
};
pub use pipeline::{load_model, Pipeline};
