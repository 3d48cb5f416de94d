// Lexicon-based sentiment scoring over a morphologically analyzed sentence.
// A single left-to-right pass resolves each token against the noun lexicon, then
// the wago (predicate phrase) lexicon with a bounded lookback window, and lets
// negation markers flip the most recent polarity.
use serde::{Deserialize, Serialize};

use super::analyzer::Token;
use super::lexicon::{Lexicon, NegationMarkers, Stopwords};

/// Maximum number of preceding lemmas joined into a wago phrase candidate
pub const WAGO_WINDOW: usize = 5;

/// How many recent lemmas are searched for the negated term
pub const NEGATION_WINDOW: usize = 3;

/// A matched term (or phrase) and its sign. Serializes as `[label, sign]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPolarity(pub String, pub i32);

impl TermPolarity {
    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn sign(&self) -> i32 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    pub score: f64,
    pub count: usize,
    pub polarities: Vec<TermPolarity>,
}

/// Per-sentence output: the plain mean, or the mean with its contributing terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreResult {
    Score(f64),
    Detailed(SentenceScore),
}

impl ScoreResult {
    pub fn score(&self) -> f64 {
        match self {
            ScoreResult::Score(s) => *s,
            ScoreResult::Detailed(d) => d.score,
        }
    }
}

impl SentenceScore {
    pub fn into_result(self, detailed: bool) -> ScoreResult {
        if detailed {
            ScoreResult::Detailed(self)
        } else {
            ScoreResult::Score(self.score)
        }
    }
}

#[derive(Debug, Default)]
struct ScoringState {
    polarities: Vec<TermPolarity>,
    lemmas: Vec<String>,
    negation_lemmas: Vec<String>,
}

/// Read-only scoring resources. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct SentimentModel {
    nouns: Lexicon,
    wago: Lexicon,
    stopwords: Stopwords,
    negations: NegationMarkers,
}

impl SentimentModel {
    pub fn new(nouns: Lexicon, wago: Lexicon, stopwords: Stopwords, negations: NegationMarkers) -> Self {
        Self {
            nouns,
            wago,
            stopwords,
            negations,
        }
    }

    pub fn nouns(&self) -> &Lexicon {
        &self.nouns
    }

    pub fn wago(&self) -> &Lexicon {
        &self.wago
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Scores one sentence's tokens. `None` when no token carries polarity.
    pub fn score_tokens(&self, tokens: &[Token]) -> Option<SentenceScore> {
        let mut state = ScoringState::default();
        for token in tokens {
            self.step(&mut state, token.lemma());
        }

        if state.polarities.is_empty() {
            return None;
        }
        let count = state.polarities.len();
        let sum: i32 = state.polarities.iter().map(TermPolarity::sign).sum();
        Some(SentenceScore {
            score: f64::from(sum) / count as f64,
            count,
            polarities: state.polarities,
        })
    }

    fn step(&self, state: &mut ScoringState, lemma: String) {
        let (sign, label) = match self.nouns.polarity(&lemma) {
            Some(sign) => (Some(sign), lemma),
            None => {
                let (sign, label) = self.lookup_wago(lemma, state);
                if sign.is_none() {
                    self.apply_negation(state, &label);
                }
                (sign, label)
            }
        };

        if !self.stopwords.contains(&label) {
            state.lemmas.push(label.clone());
        }
        if let Some(sign) = sign {
            state.negation_lemmas.push(label.clone());
            state.polarities.push(TermPolarity(label, sign));
        }
    }

    // Returns the sign (if any) and the label the token resolved to: the lemma
    // itself, or the matched phrase when a lookback window hit.
    fn lookup_wago(&self, lemma: String, state: &ScoringState) -> (Option<i32>, String) {
        if let Some(sign) = self.wago.polarity(&lemma) {
            return (Some(sign), lemma);
        }
        for window in (1..=WAGO_WINDOW).rev() {
            let start = state.lemmas.len().saturating_sub(window);
            let phrase = format!("{} {}", state.lemmas[start..].join(" "), lemma);
            if let Some(sign) = self.wago.polarity(&phrase) {
                // The phrase already absorbs the last negated term; don't count it twice.
                let suppressed = state
                    .negation_lemmas
                    .last()
                    .map_or(false, |neg| phrase.contains(neg.as_str()));
                return (if suppressed { None } else { Some(sign) }, phrase);
            }
        }
        (None, lemma)
    }

    fn apply_negation(&self, state: &mut ScoringState, lemma: &str) {
        if !self.negations.contains(lemma) {
            return;
        }
        let Some(negated) = state.negation_lemmas.last() else {
            return;
        };
        let recent = &state.lemmas[state.lemmas.len().saturating_sub(NEGATION_WINDOW)..];
        if !recent.iter().any(|l| l == negated) {
            return;
        }
        if let Some(last) = state.polarities.last_mut() {
            last.1 = -last.1;
            last.0 = format!("{}-{}", negated, lemma);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::lexicon::LexiconKind;

    fn tok(surface: &str, base: &str) -> Token {
        Token::new(surface, vec!["品詞".to_string(); 7], base)
    }

    fn model(nouns: &[(&str, &str)], wago: &[(&str, &str)]) -> SentimentModel {
        SentimentModel::new(
            Lexicon::from_entries(LexiconKind::Noun, nouns.iter().copied()),
            Lexicon::from_entries(LexiconKind::Wago, wago.iter().copied()),
            Stopwords::default(),
            NegationMarkers::default(),
        )
    }

    fn polarity(label: &str, sign: i32) -> TermPolarity {
        TermPolarity(label.to_string(), sign)
    }

    #[test]
    fn test_single_positive_term() {
        let m = model(&[("面白い", "p")], &[]);
        let score = m.score_tokens(&[tok("面白い", "面白い")]).unwrap();
        assert_eq!(score.score, 1.0);
        assert_eq!(score.count, 1);
        assert_eq!(score.polarities, vec![polarity("面白い", 1)]);
    }

    #[test]
    fn test_no_match_is_none() {
        let m = model(&[("面白い", "p")], &[("楽しい", "ポジ（経験）")]);
        assert!(m.score_tokens(&[tok("猫", "猫"), tok("が", "が"), tok("いる", "いる")]).is_none());
        assert!(m.score_tokens(&[]).is_none());
    }

    #[test]
    fn test_noun_precedence_over_wago() {
        let m = model(&[("成功", "n")], &[("成功", "ポジ（評価）")]);
        let score = m.score_tokens(&[tok("成功", "成功")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("成功", -1)]);
    }

    #[test]
    fn test_base_form_used_for_lookup() {
        let m = model(&[], &[("飽きる", "ネガ（経験）")]);
        let score = m.score_tokens(&[tok("飽き", "飽きる")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("飽きる", -1)]);
    }

    #[test]
    fn test_placeholder_base_form_uses_surface() {
        let m = model(&[("草彅", "p")], &[]);
        assert!(m.score_tokens(&[tok("草彅", "*")]).is_some());
    }

    #[test]
    fn test_negation_flips_last_polarity_in_place() {
        let m = model(&[], &[("飽きる", "ネガ（経験）")]);
        let score = m
            .score_tokens(&[tok("観", "観る"), tok("て", "て"), tok("飽き", "飽きる"), tok("ない", "ない")])
            .unwrap();
        assert_eq!(score.count, 1);
        assert_eq!(score.score, 1.0);
        assert_eq!(score.polarities, vec![polarity("飽きる-ない", 1)]);
    }

    #[test]
    fn test_negation_outside_window_does_not_flip() {
        let m = model(&[], &[("楽しい", "ポジ（経験）")]);
        let tokens = [
            tok("楽しく", "楽しい"),
            tok("て", "て"),
            tok("よく", "よい"),
            tok("寝", "寝る"),
            tok("ない", "ない"),
        ];
        let score = m.score_tokens(&tokens).unwrap();
        assert_eq!(score.polarities, vec![polarity("楽しい", 1)]);
    }

    #[test]
    fn test_negation_without_prior_polarity_is_noop() {
        let m = model(&[("雨", "n")], &[]);
        assert!(m.score_tokens(&[tok("行か", "行く"), tok("ない", "ない")]).is_none());
    }

    #[test]
    fn test_double_negation_flips_back() {
        let m = model(&[], &[("飽きる", "ネガ（経験）")]);
        let score = m
            .score_tokens(&[tok("飽き", "飽きる"), tok("ない", "ない"), tok("ず", "ず")])
            .unwrap();
        assert_eq!(score.count, 1);
        assert_eq!(score.polarities, vec![polarity("飽きる-ず", -1)]);
    }

    #[test]
    fn test_wago_phrase_match() {
        let m = model(&[], &[("腹 が 立つ", "ネガ（経験）")]);
        let score = m
            .score_tokens(&[tok("腹", "腹"), tok("が", "が"), tok("立っ", "立つ"), tok("た", "た")])
            .unwrap();
        assert_eq!(score.polarities, vec![polarity("腹 が 立つ", -1)]);
    }

    #[test]
    fn test_longer_window_wins() {
        let m = model(&[], &[("気 が 重い", "ネガ（経験）"), ("が 重い", "ポジ（評価）")]);
        let score = m.score_tokens(&[tok("気", "気"), tok("が", "が"), tok("重い", "重い")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("気 が 重い", -1)]);

        let m = model(&[], &[("が 重い", "ポジ（評価）"), ("重い", "ネガ（評価）")]);
        let score = m.score_tokens(&[tok("が", "が"), tok("重い", "重い")]).unwrap();
        // A single-lemma key is checked before any window.
        assert_eq!(score.polarities, vec![polarity("重い", -1)]);
    }

    #[test]
    fn test_two_token_window_over_one_token() {
        let m = model(&[], &[("心 が 躍る", "ポジ（経験）"), ("が 躍る", "ネガ（経験）")]);
        let score = m.score_tokens(&[tok("心", "心"), tok("が", "が"), tok("躍る", "躍る")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("心 が 躍る", 1)]);
    }

    #[test]
    fn test_window_shorter_than_history() {
        let m = model(&[], &[("颯爽 と", "ポジ（評価）")]);
        let tokens = [
            tok("彼", "彼"),
            tok("は", "は"),
            tok("いつも", "いつも"),
            tok("とても", "とても"),
            tok("本当に", "本当に"),
            tok("颯爽", "颯爽"),
            tok("と", "と"),
        ];
        let score = m.score_tokens(&tokens).unwrap();
        assert_eq!(score.polarities, vec![polarity("颯爽 と", 1)]);
    }

    #[test]
    fn test_wago_match_suppressed_by_prior_negation_lemma() {
        let m = model(&[], &[("飽きる", "ネガ（経験）"), ("飽きる ない", "ポジ（評価）")]);
        let score = m.score_tokens(&[tok("飽き", "飽きる"), tok("ない", "ない")]).unwrap();
        // The phrase contains the already-counted `飽きる`, so only the first entry remains,
        // and the phrase label (not a negation marker) does not trigger a flip.
        assert_eq!(score.polarities, vec![polarity("飽きる", -1)]);
    }

    #[test]
    fn test_window_match_counts_after_unrelated_prior_term() {
        let m = model(&[("成功", "p")], &[("颯爽 と", "ポジ（評価）")]);
        let score = m
            .score_tokens(&[tok("成功", "成功"), tok("颯爽", "颯爽"), tok("と", "と")])
            .unwrap();
        assert_eq!(score.polarities, vec![polarity("成功", 1), polarity("颯爽 と", 1)]);
        assert_eq!(score.count, 2);
        assert_eq!(score.score, 1.0);
    }

    #[test]
    fn test_suppression_is_substring_based() {
        let m = model(&[("好", "p")], &[("大好き だ", "ポジ（評価）")]);
        let score = m.score_tokens(&[tok("好", "好"), tok("大好き", "大好き"), tok("だ", "だ")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("好", 1)]);
    }

    #[test]
    fn test_mean_of_signs() {
        let m = model(&[("成功", "p"), ("笑顔", "p"), ("事故", "n")], &[]);
        let score = m
            .score_tokens(&[tok("成功", "成功"), tok("笑顔", "笑顔"), tok("事故", "事故")])
            .unwrap();
        assert_eq!(score.count, 3);
        assert!((score.score - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stopwords_excluded_from_history() {
        let mut m = model(&[], &[("気 重い", "ネガ（経験）")]);
        m.stopwords = Stopwords::from_words(["が"]);
        let score = m
            .score_tokens(&[tok("気", "気"), tok("が", "が"), tok("重い", "重い")])
            .unwrap();
        assert_eq!(score.polarities, vec![polarity("気 重い", -1)]);
    }

    #[test]
    fn test_stopword_negated_term_blocks_flip() {
        let mut m = model(&[("事故", "n")], &[]);
        m.stopwords = Stopwords::from_words(["事故"]);
        let score = m.score_tokens(&[tok("事故", "事故"), tok("ない", "ない")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("事故", -1)]);
    }

    #[test]
    fn test_extra_negation_marker() {
        let mut m = model(&[("成功", "p")], &[]);
        m.negations = NegationMarkers::with_extra(["まい"]);
        let score = m.score_tokens(&[tok("成功", "成功"), tok("まい", "まい")]).unwrap();
        assert_eq!(score.polarities, vec![polarity("成功-まい", -1)]);
    }

    #[test]
    fn test_score_result_serialization() {
        let detailed = SentenceScore {
            score: 1.0,
            count: 1,
            polarities: vec![polarity("面白い", 1)],
        };
        let json = serde_json::to_string(&detailed.clone().into_result(true)).unwrap();
        assert_eq!(json, r#"{"score":1.0,"count":1,"polarities":[["面白い",1]]}"#);
        let json = serde_json::to_string(&detailed.into_result(false)).unwrap();
        assert_eq!(json, "1.0");
    }
}
