// Polarity lexicons, stopwords and negation markers.
// A lexicon is the bundled (or configured) default mapping merged with an optional
// `term,label` override file. Everything here is read-only once loaded.
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Override labels that delete a default entry instead of adding one
pub const NEUTRAL_LABELS: [&str; 2] = ["e", "ニュートラル"];

pub const DEFAULT_NEGATIONS: [&str; 3] = ["ない", "ず", "ぬ"];

static BUNDLED_NOUN: &str = include_str!("../../data/pn_noun.json");
static BUNDLED_WAGO: &str = include_str!("../../data/pn_wago.json");

pub fn is_neutral(label: &str) -> bool {
    NEUTRAL_LABELS.contains(&label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexiconKind {
    /// Single-term noun lexicon labelled `p` / `n`
    Noun,
    /// Predicate phrases, space-joined lemmas, labelled `ポジ（...）` / `ネガ（...）`
    Wago,
}

impl LexiconKind {
    fn bundled(self) -> &'static str {
        match self {
            LexiconKind::Noun => BUNDLED_NOUN,
            LexiconKind::Wago => BUNDLED_WAGO,
        }
    }

    fn positive_marker(self) -> &'static str {
        match self {
            LexiconKind::Noun => "p",
            LexiconKind::Wago => "ポジ",
        }
    }

    /// +1 for labels starting with this kind's positive marker, -1 for anything else.
    pub fn polarity(self, label: &str) -> i32 {
        if label.starts_with(self.positive_marker()) {
            1
        } else {
            -1
        }
    }
}

/// Where the default mapping of a lexicon comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefaultSource {
    #[default]
    Bundled,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    kind: LexiconKind,
    entries: HashMap<String, String>,
}

impl Lexicon {
    pub fn from_entries<I, K, V>(kind: LexiconKind, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Loads the default mapping for `kind`, then merges `override_path` on top of it.
    pub fn load(kind: LexiconKind, default: &DefaultSource, override_path: Option<&Path>) -> Result<Self> {
        let entries: HashMap<String, String> = match default {
            DefaultSource::Bundled => serde_json::from_str(kind.bundled())?,
            DefaultSource::File(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        };
        let mut lexicon = Self { kind, entries };
        debug!(?kind, entries = lexicon.len(), "loaded default lexicon");

        if let Some(path) = override_path {
            lexicon.merge_file(path)?;
        }
        Ok(lexicon)
    }

    /// Merges a `term,label` override file. The whole file is parsed before
    /// anything is applied, so a malformed line leaves the lexicon untouched.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let overrides = parse_overrides(path, &content)?;
        self.merge(overrides);
        Ok(())
    }

    /// Neutral-labelled entries are removed first (missing keys are ignored),
    /// then every other entry is inserted, overwriting defaults.
    pub fn merge<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (deletions, insertions): (Vec<_>, Vec<_>) =
            overrides.into_iter().partition(|(_, label)| is_neutral(label));

        let mut removed = 0;
        for (term, _) in &deletions {
            if self.entries.remove(term).is_some() {
                removed += 1;
            }
        }
        let inserted = insertions.len();
        self.entries.extend(insertions);

        debug!(kind = ?self.kind, removed, inserted, entries = self.len(), "merged lexicon overrides");
    }

    pub fn kind(&self) -> LexiconKind {
        self.kind
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries.get(term).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    pub fn polarity(&self, term: &str) -> Option<i32> {
        self.get(term).map(|label| self.kind.polarity(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_overrides(path: &Path, content: &str) -> Result<Vec<(String, String)>> {
    let mut overrides = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 2 {
            return Err(Error::LexiconFormat {
                path: path.to_path_buf(),
                line: i + 1,
                content: raw.to_string(),
            });
        }
        overrides.push((fields[0].to_string(), fields[1].to_string()));
    }
    Ok(overrides)
}

/// Lowercased words excluded from the lemma history and from tokenizer output.
#[derive(Debug, Clone, Default)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    /// One word per line; blank lines are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let stopwords = Self::from_words(content.lines().map(|l| l.trim_end_matches('\r')));
        debug!(path = %path.display(), words = stopwords.len(), "loaded stopwords");
        Ok(stopwords)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NegationMarkers(HashSet<String>);

impl Default for NegationMarkers {
    fn default() -> Self {
        Self(DEFAULT_NEGATIONS.iter().map(|s| s.to_string()).collect())
    }
}

impl NegationMarkers {
    /// Default markers plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut markers = Self::default();
        markers.0.extend(extra.into_iter().map(Into::into));
        markers
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.0.contains(lemma)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
