// Sentence splitting on a fixed delimiter character class.
use regex::Regex;

use super::normalize::normalize;
use crate::error::Result;

/// Period, comma, exclamation, question mark, pipe, space and the `(笑)` laughter marker characters
pub const DEFAULT_DELIMITER: &str = r"[。,．!\?|(笑 )]";

#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    delimiter: Regex,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self {
            delimiter: Regex::new(DEFAULT_DELIMITER).unwrap(),
        }
    }
}

impl SentenceSplitter {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            delimiter: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.delimiter.as_str()
    }

    /// Lazily splits already-normalized text. Empty fragments and fragments
    /// that themselves begin with a delimiter are skipped.
    pub fn fragments<'a, 't: 'a>(&'a self, normalized: &'t str) -> impl Iterator<Item = &'t str> + 'a {
        self.delimiter
            .split(normalized)
            .filter(move |s| !s.is_empty() && !self.starts_with_delimiter(s))
    }

    /// Normalizes `text` and lazily yields its sentences in order.
    pub fn split(&self, text: &str) -> Sentences<'_> {
        Sentences {
            splitter: self,
            text: normalize(text),
            last: 0,
            search: 0,
            finished: false,
        }
    }

    fn starts_with_delimiter(&self, s: &str) -> bool {
        self.delimiter.find(s).map_or(false, |m| m.start() == 0)
    }
}

/// Sentences of one normalized text, produced on demand by [`SentenceSplitter::split`].
#[derive(Debug)]
pub struct Sentences<'a> {
    splitter: &'a SentenceSplitter,
    text: String,
    // start of the pending fragment
    last: usize,
    // where the next delimiter search begins; moves past empty matches
    search: usize,
    finished: bool,
}

impl Sentences<'_> {
    /// The normalized text being split.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn next_fragment(&mut self) -> Option<(usize, usize)> {
        if self.finished {
            return None;
        }
        let found = if self.search <= self.text.len() {
            self.splitter.delimiter.find_at(&self.text, self.search)
        } else {
            None
        };
        match found {
            Some(m) => {
                let range = (self.last, m.start());
                self.last = m.end();
                self.search = if m.start() == m.end() {
                    m.end() + self.text[m.end()..].chars().next().map_or(1, char::len_utf8)
                } else {
                    m.end()
                };
                Some(range)
            }
            None => {
                self.finished = true;
                Some((self.last, self.text.len()))
            }
        }
    }
}

impl Iterator for Sentences<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((start, end)) = self.next_fragment() {
            let fragment = &self.text[start..end];
            if !fragment.is_empty() && !self.splitter.starts_with_delimiter(fragment) {
                return Some(fragment.to_string());
            }
        }
        None
    }
}
