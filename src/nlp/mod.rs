// NLP layer: analyzer adapter, normalization, sentence splitting, lexicons and scoring
pub mod analyzer;
pub mod lexicon;
pub mod normalize;
pub mod sentiment;
pub mod splitter;
pub mod tokenize;

pub use analyzer::{Analyzer, DictType, MecabAnalyzer, MecabOptions, Token};
pub use lexicon::{DefaultSource, Lexicon, LexiconKind, NegationMarkers, Stopwords};
pub use normalize::normalize;
pub use sentiment::{ScoreResult, SentenceScore, SentimentModel, TermPolarity};
pub use splitter::{SentenceSplitter, Sentences};
pub use tokenize::{join_terms, TokenizeOptions};
