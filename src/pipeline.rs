//! Text pipeline: normalization, sentence splitting, analysis and scoring
//!
//! `Pipeline` owns its analyzer and read-only resources; every call works on
//! local state only, so one pipeline can be shared across threads when its
//! analyzer is `Sync`.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::nlp::analyzer::{Analyzer, MecabAnalyzer};
use crate::nlp::lexicon::{Lexicon, LexiconKind, NegationMarkers, Stopwords};
use crate::nlp::normalize::normalize;
use crate::nlp::sentiment::{ScoreResult, SentenceScore, SentimentModel};
use crate::nlp::splitter::{SentenceSplitter, Sentences};
use crate::nlp::tokenize::{extract_terms, TokenizeOptions};

#[derive(Debug)]
pub struct Pipeline<A = MecabAnalyzer> {
    analyzer: A,
    model: SentimentModel,
    splitter: SentenceSplitter,
}

impl Pipeline<MecabAnalyzer> {
    /// Builds the MeCab-backed pipeline. Lexicon, stopword and analyzer
    /// failures all surface here rather than on first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = load_model(config)?;
        let splitter = SentenceSplitter::new(&config.splitter.delimiter)?;
        let analyzer = MecabAnalyzer::new(&config.mecab.options())?;
        info!(
            dict_type = ?config.mecab.dict_type,
            nouns = model.nouns().len(),
            wago = model.wago().len(),
            stopwords = model.stopwords().len(),
            "pipeline ready"
        );
        Ok(Self::new(analyzer, model, splitter))
    }
}

/// Loads lexicons, stopwords and negation markers described by `config`.
pub fn load_model(config: &Config) -> Result<SentimentModel> {
    let lex = &config.lexicon;
    let nouns = Lexicon::load(LexiconKind::Noun, &lex.noun_source(), lex.noun.as_deref())?;
    let wago = Lexicon::load(LexiconKind::Wago, &lex.wago_source(), lex.wago.as_deref())?;
    let stopwords = match &lex.stopwords {
        Some(path) => Stopwords::load(path)?,
        None => Stopwords::default(),
    };
    let negations = NegationMarkers::with_extra(lex.negation.iter().cloned());
    Ok(SentimentModel::new(nouns, wago, stopwords, negations))
}

impl<A: Analyzer> Pipeline<A> {
    pub fn new(analyzer: A, model: SentimentModel, splitter: SentenceSplitter) -> Self {
        Self {
            analyzer,
            model,
            splitter,
        }
    }

    pub fn model(&self) -> &SentimentModel {
        &self.model
    }

    pub fn sentences(&self, text: &str) -> Sentences<'_> {
        self.splitter.split(text)
    }

    /// Splits `text` into terms, filtered by part of speech and stopwords.
    pub fn tokenize(&self, text: &str, options: &TokenizeOptions) -> Result<Vec<String>> {
        let tokens = if options.normalize {
            self.analyzer.analyze(&normalize(text))?
        } else {
            self.analyzer.analyze(text)?
        };
        Ok(extract_terms(&tokens, options, self.model.stopwords()))
    }

    /// Scores a single sentence. `Ok(None)` when nothing in it carries polarity.
    pub fn score_sentence(&self, sentence: &str) -> Result<Option<SentenceScore>> {
        let tokens = self.analyzer.analyze(&normalize(sentence))?;
        let score = self.model.score_tokens(&tokens);
        debug!(sentence, tokens = tokens.len(), score = ?score.as_ref().map(|s| s.score), "scored sentence");
        Ok(score)
    }

    /// Scores every sentence of `text` in order, dropping sentences without polarity.
    /// An analyzer failure on any sentence fails the whole call.
    pub fn score_text(&self, text: &str, detailed: bool) -> Result<Vec<ScoreResult>> {
        Ok(self
            .score_text_detailed(text)?
            .into_iter()
            .map(|score| score.into_result(detailed))
            .collect())
    }

    pub fn score_text_detailed(&self, text: &str) -> Result<Vec<SentenceScore>> {
        let mut results = Vec::new();
        for sentence in self.sentences(text) {
            if let Some(score) = self.score_sentence(&sentence)? {
                results.push(score);
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::nlp::analyzer::Token;
    use crate::nlp::sentiment::TermPolarity;
    use std::collections::HashMap;
    use std::io::Write;

    fn tok(surface: &str, base: &str) -> Token {
        Token::new(surface, vec!["*".to_string(); 7], base)
    }

    // Stands in for MeCab: fixed token streams keyed by normalized sentence.
    fn fixture_analyzer() -> impl Fn(&str) -> Result<Vec<Token>> {
        let mut table: HashMap<&'static str, Vec<Token>> = HashMap::new();
        table.insert(
            "この2人のやりとりはやっぱり面白い",
            vec![
                tok("この", "この"),
                tok("2", "2"),
                tok("人", "人"),
                tok("の", "の"),
                tok("やりとり", "やりとり"),
                tok("は", "は"),
                tok("やっぱり", "やっぱり"),
                tok("面白い", "面白い"),
            ],
        );
        table.insert(
            "観てて飽きない",
            vec![
                tok("観", "観る"),
                tok("て", "て"),
                tok("て", "て"),
                tok("飽き", "飽きる"),
                tok("ない", "ない"),
            ],
        );
        table.insert("天気です", vec![tok("天気", "天気"), tok("です", "です")]);
        table.insert("成功と失敗", vec![tok("成功", "成功"), tok("と", "と"), tok("失敗", "失敗")]);
        move |text: &str| {
            table
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Analyzer(format!("no fixture for {:?}", text)))
        }
    }

    fn pipeline() -> Pipeline<impl Fn(&str) -> Result<Vec<Token>>> {
        let model = load_model(&Config::default()).unwrap();
        Pipeline::new(fixture_analyzer(), model, SentenceSplitter::default())
    }

    #[test]
    fn test_score_text_scalar() -> Result<()> {
        let scores = pipeline().score_text("この2人のやりとりはやっぱり面白い！観てて飽きない！", false)?;
        assert_eq!(scores, vec![ScoreResult::Score(1.0), ScoreResult::Score(1.0)]);
        Ok(())
    }

    #[test]
    fn test_score_text_detailed() -> Result<()> {
        let scores = pipeline().score_text_detailed("この2人のやりとりはやっぱり面白い！観てて飽きない！")?;
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].polarities, vec![TermPolarity("面白い".to_string(), 1)]);
        assert_eq!(scores[1].polarities, vec![TermPolarity("飽きる-ない".to_string(), 1)]);
        assert_eq!(scores[1].count, 1);
        Ok(())
    }

    #[test]
    fn test_analyzer_failure_propagates() {
        // "面白い" alone has no fixture; no partial result is returned.
        let scores = pipeline().score_text("天気です。面白い", true);
        assert!(matches!(scores, Err(Error::Analyzer(_))));
    }

    #[test]
    fn test_sentences_without_polarity_are_dropped() -> Result<()> {
        let scores = pipeline().score_text("天気です。この2人のやりとりはやっぱり面白い", true)?;
        assert_eq!(scores.len(), 1);
        Ok(())
    }

    #[test]
    fn test_zero_mean_is_reported() -> Result<()> {
        let scores = pipeline().score_text("成功と失敗", false)?;
        assert_eq!(scores, vec![ScoreResult::Score(0.0)]);
        Ok(())
    }

    #[test]
    fn test_score_sentence_none() -> Result<()> {
        assert!(pipeline().score_sentence("天気です")?.is_none());
        Ok(())
    }

    #[test]
    fn test_tokenize_uses_stopwords() -> Result<()> {
        let mut f = tempfile::NamedTempFile::new()?;
        writeln!(f, "て")?;
        let mut config = Config::default();
        config.lexicon.stopwords = Some(f.path().to_path_buf());
        let pipeline = Pipeline::new(fixture_analyzer(), load_model(&config)?, SentenceSplitter::default());

        let terms = pipeline.tokenize("観てて飽きない", &TokenizeOptions::default())?;
        assert_eq!(terms, vec!["観る", "飽きる", "ない"]);
        Ok(())
    }

    #[test]
    fn test_override_removes_noun_from_scoring() -> Result<()> {
        let mut f = tempfile::NamedTempFile::new()?;
        writeln!(f, "成功,e")?;
        writeln!(f, "失敗,e")?;
        let mut config = Config::default();
        config.lexicon.noun = Some(f.path().to_path_buf());
        let pipeline = Pipeline::new(fixture_analyzer(), load_model(&config)?, SentenceSplitter::default());
        assert!(pipeline.score_text("成功と失敗", false)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_override_fails_model_load() -> Result<()> {
        let mut f = tempfile::NamedTempFile::new()?;
        writeln!(f, "only-one-field")?;
        let mut config = Config::default();
        config.lexicon.wago = Some(f.path().to_path_buf());
        assert!(matches!(load_model(&config), Err(Error::LexiconFormat { .. })));
        Ok(())
    }

    #[test]
    fn test_invalid_delimiter_fails() {
        let mut config = Config::default();
        config.splitter.delimiter = "[".to_string();
        assert!(matches!(Pipeline::from_config(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() -> Result<()> {
        let pipeline = &pipeline();
        let texts = ["この2人のやりとりはやっぱり面白い", "観てて飽きない"];
        let results: Vec<Vec<ScoreResult>> = std::thread::scope(|s| {
            let handles: Vec<_> = texts
                .iter()
                .map(|t| s.spawn(move || pipeline.score_text(t, false)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Result<Vec<_>>>()
        })?;
        assert_eq!(results, vec![vec![ScoreResult::Score(1.0)], vec![ScoreResult::Score(1.0)]]);
        Ok(())
    }
}
