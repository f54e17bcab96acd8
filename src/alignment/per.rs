use crate::phonetics::{NormalizedPhoneme, ScoringTables};

use super::edit_distance::edit_distance;

/// Phoneme error rate of `predicted` against `reference`.
///
/// An empty reference scores 1.0 against any non-empty prediction and 0.0
/// against an empty one. When the prediction is longer than the reference,
/// only the best-aligned window of reference length is scored, so leading and
/// trailing noise frames are not penalized.
pub fn sequence_per(
    tables: &ScoringTables,
    reference: &[NormalizedPhoneme],
    predicted: &[NormalizedPhoneme],
) -> f64 {
    if reference.is_empty() {
        return if predicted.is_empty() { 0.0 } else { 1.0 };
    }
    min_window_distance(tables, reference, predicted) / reference.len().max(1) as f64
}

/// Reported accuracy in percent. Not clamped.
pub fn accuracy_from_per(per: f64) -> f64 {
    (1.0 - per) * 100.0
}

/// Minimum edit distance between `reference` and every window of `predicted`
/// of the same length.
///
/// A prediction shorter than the reference yields a single, shorter window.
pub(crate) fn min_window_distance(
    tables: &ScoringTables,
    reference: &[NormalizedPhoneme],
    predicted: &[NormalizedPhoneme],
) -> f64 {
    let window_len = reference.len();
    let window_count = (predicted.len().saturating_sub(window_len) + 1).max(1);

    let mut best = f64::INFINITY;
    for start in 0..window_count {
        let end = (start + window_len).min(predicted.len());
        let distance = edit_distance(tables, reference, &predicted[start..end]);
        if distance < best {
            best = distance;
            if best == 0.0 {
                break;
            }
        }
    }
    best
}
