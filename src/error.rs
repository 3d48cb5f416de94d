//! Error types for mecab-sentiment

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure while reading lexicons, stopwords or input documents
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Default lexicon JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Override lexicon line without exactly two comma-separated fields
    #[error("{}:{line}: expected `term,label`, got {content:?}", .path.display())]
    LexiconFormat {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Morphological analyzer could not be invoked or produced bad output
    #[error("Analyzer error: {0}")]
    Analyzer(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::Config(format!("invalid delimiter pattern: {}", e))
    }
}
