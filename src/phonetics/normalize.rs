use std::collections::HashMap;
use std::fmt;

use arrayvec::ArrayString;
use serde::{Serialize, Serializer};

const RHOTIC: char = 'ɹ';
const SYLLABIC_MARK: char = '\u{0329}';
const LENGTH_MARK: char = 'ː';
const PRIMARY_STRESS: char = 'ˈ';
const SECONDARY_STRESS: char = 'ˌ';

/// Verbatim token rewrites, applied before and again after diacritic stripping.
const PATTERNS: &[(&str, &str)] = &[
    // r-colored vowels
    ("ɚ", "ɝ"),
    ("ɝ˞", "ɝ"),
    ("ɜ˞", "ɝ"),
    ("ə˞", "ɝ"),
    // allophones and flap merges
    ("ᵻ", "ɪ"),
    ("ɫ", "l"),
    ("ɽ", "ɾ"),
    ("ɾ\u{0303}", "ɾ"),
    // aspirated stops
    ("kh", "k"),
    ("kʰ", "k"),
    ("ph", "p"),
    ("pʰ", "p"),
    ("th", "t"),
    ("tʰ", "t"),
    // affricate spellings
    ("tɕh", "tʃ"),
    ("tɕ", "tʃ"),
    ("ts.h", "tʃ"),
    ("ts", "tʃ"),
    ("dʑ", "dʒ"),
];

/// Coarse equivalence classes for the single-character canonical form.
///
/// Every target is a fixed point of this table and never a key of
/// [`PATTERNS`], which keeps normalization idempotent.
const GROUPS: &[(char, char)] = &[
    // lax central vowels
    ('ɐ', 'ə'),
    ('ɜ', 'ə'),
    ('ɘ', 'ə'),
    ('ɵ', 'ə'),
    ('ɚ', 'ɝ'),
    ('ᵻ', 'ɪ'),
    ('ɨ', 'ɪ'),
    ('ɒ', 'ɑ'),
    ('ʉ', 'u'),
    // consonants
    ('ɽ', 'ɾ'),
    ('ɫ', 'l'),
    ('r', 'ɹ'),
    ('ɻ', 'ɹ'),
    ('g', 'ɡ'),
    ('ɦ', 'h'),
];

/// Canonical 1-2 character phoneme symbol produced by [`PhonemeNormalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPhoneme(ArrayString<8>);

impl NormalizedPhoneme {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NormalizedPhoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NormalizedPhoneme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Maps raw IPA/espeak tokens to [`NormalizedPhoneme`]s.
///
/// Built once per assessor and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct PhonemeNormalizer {
    patterns: HashMap<&'static str, &'static str>,
    groups: HashMap<char, char>,
    preserve_long_vowels: bool,
}

impl PhonemeNormalizer {
    pub fn new(preserve_long_vowels: bool) -> Self {
        Self {
            patterns: PATTERNS.iter().copied().collect(),
            groups: GROUPS.iter().copied().collect(),
            preserve_long_vowels,
        }
    }

    pub fn preserve_long_vowels(&self) -> bool {
        self.preserve_long_vowels
    }

    /// Returns `None` for empty or unrecognized tokens ("no phoneme").
    pub fn normalize(&self, token: &str) -> Option<NormalizedPhoneme> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut t = self.rewrite(trimmed).to_string();
        if t.contains(RHOTIC) && t.contains(SYLLABIC_MARK) {
            t = RHOTIC.to_string();
        }
        t.retain(|c| !c.is_numeric() && c != PRIMARY_STRESS && c != SECONDARY_STRESS);
        t.retain(|c| !is_combining_diacritic(c));
        let t = self.rewrite(&t);

        let mut chars = t.chars();
        let first = chars.next()?;
        if !is_phone_letter(first) {
            return None;
        }

        let mut out = ArrayString::<8>::new();
        if self.preserve_long_vowels && chars.next() == Some(LENGTH_MARK) {
            out.push(first);
            out.push(LENGTH_MARK);
        } else {
            out.push(self.groups.get(&first).copied().unwrap_or(first));
        }
        Some(NormalizedPhoneme(out))
    }

    /// Normalizes every token, dropping the ones that carry no phoneme.
    pub fn normalize_sequence<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<NormalizedPhoneme> {
        let mut out = Vec::with_capacity(tokens.len());
        for (idx, token) in tokens.iter().enumerate() {
            match self.normalize(token.as_ref()) {
                Some(phone) => out.push(phone),
                None => tracing::debug!(
                    index = idx,
                    token = token.as_ref(),
                    "normalize: token carries no phoneme, skipping"
                ),
            }
        }
        out
    }

    fn rewrite<'a>(&self, token: &'a str) -> &'a str {
        self.patterns.get(token).copied().unwrap_or(token)
    }
}

impl Default for PhonemeNormalizer {
    fn default() -> Self {
        Self::new(false)
    }
}

fn is_combining_diacritic(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1AB0}'..='\u{1AFF}' | '\u{1DC0}'..='\u{1DFF}')
}

/// Spacing modifier letters (length, aspiration, stress) are alphabetic in
/// Unicode but never start a phoneme.
fn is_phone_letter(c: char) -> bool {
    c.is_alphabetic() && !matches!(c, '\u{02B0}'..='\u{02FF}')
}
