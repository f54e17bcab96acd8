use crate::phonetics::{NormalizedPhoneme, ScoringTables};

use super::per::min_window_distance;

/// Words up to this many phonemes get an absolute tolerance.
pub const SHORT_WORD_MAX_PHONEMES: usize = 3;
pub const SHORT_WORD_TOLERANCE: f64 = 1.0;
/// Per-phoneme tolerance for longer words.
pub const RELATIVE_TOLERANCE: f64 = 0.4;

pub fn coverage_threshold(word_len: usize) -> f64 {
    if word_len <= SHORT_WORD_MAX_PHONEMES {
        SHORT_WORD_TOLERANCE
    } else {
        word_len as f64 * RELATIVE_TOLERANCE
    }
}

/// Whether a word's normalized phonemes are adequately present somewhere in
/// the predicted sequence.
pub fn word_covered(
    tables: &ScoringTables,
    word: &[NormalizedPhoneme],
    predicted: &[NormalizedPhoneme],
) -> bool {
    if word.is_empty() {
        return false;
    }
    min_window_distance(tables, word, predicted) <= coverage_threshold(word.len())
}

/// [`word_covered`] for raw phonemizer tokens.
pub fn word_covered_tokens<S: AsRef<str>>(
    tables: &ScoringTables,
    word_tokens: &[S],
    predicted: &[NormalizedPhoneme],
) -> bool {
    if word_tokens.is_empty() {
        return false;
    }
    let word = tables.normalize_sequence(word_tokens);
    word_covered(tables, &word, predicted)
}
