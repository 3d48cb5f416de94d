// Text normalization applied before sentence splitting and analysis.
// Width folding comes from NFKC; the remaining rules canonicalize dashes,
// prolonged sound marks, tildes and whitespace the way MeCab dictionaries expect.
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HYPHENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{02D7}\u{058A}\u{2010}-\u{2015}\u{2043}\u{207B}\u{208B}\u{2212}]+").unwrap()
});

static CHOONPUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{FE63}\u{FF0D}\u{FF70}\u{2014}\u{2015}\u{2500}\u{2501}\u{30FC}]+").unwrap()
});

static TILDES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[~\u{223C}\u{223E}\u{301C}\u{3030}\u{FF5E}]").unwrap());

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{3000}]+").unwrap());

static JA: &str = r"\p{Hiragana}\p{Katakana}\p{Han}ー、。・「」『』！？";

static SPACE_BETWEEN_JA: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"([{ja}]) ([{ja}])", ja = JA)).unwrap());

static SPACE_JA_LATIN: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"([{ja}]) ([\p{{Latin}}0-9])", ja = JA)).unwrap());

static SPACE_LATIN_JA: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"([\p{{Latin}}0-9]) ([{ja}])", ja = JA)).unwrap());

pub fn normalize(text: &str) -> String {
    // Prolonged sound marks are unified before NFKC folds U+FF70 into U+30FC.
    let s = CHOONPUS.replace_all(text, "ー");
    let s: String = s.nfkc().collect();
    let s = HYPHENS.replace_all(&s, "-");
    let s = TILDES.replace_all(&s, "");
    let s = SPACES.replace_all(&s, " ");
    let s = s.trim();
    let s = remove_spaces(&SPACE_BETWEEN_JA, s);
    let s = remove_spaces(&SPACE_JA_LATIN, &s);
    remove_spaces(&SPACE_LATIN_JA, &s)
}

// Matches overlap on the shared character, so repeat until stable.
fn remove_spaces(re: &Regex, text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, "$1$2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
