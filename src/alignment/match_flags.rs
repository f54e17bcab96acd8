use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::phonetics::NormalizedPhoneme;

/// Per-reference-phoneme correctness from an LCS opcode diff.
///
/// The output always has exactly `reference.len()` entries: equal blocks mark
/// `true`, replaced or deleted reference spans mark `false`, and inserted
/// predicted spans contribute nothing.
pub fn match_flags(reference: &[NormalizedPhoneme], predicted: &[NormalizedPhoneme]) -> Vec<bool> {
    if reference.is_empty() {
        return Vec::new();
    }

    let mut flags = Vec::with_capacity(reference.len());
    for op in capture_diff_slices(Algorithm::Lcs, reference, predicted) {
        let len = op.old_range().len();
        match op.tag() {
            DiffTag::Equal => flags.extend(std::iter::repeat(true).take(len)),
            DiffTag::Delete | DiffTag::Replace => flags.extend(std::iter::repeat(false).take(len)),
            DiffTag::Insert => {}
        }
    }

    if flags.len() != reference.len() {
        tracing::debug!(
            produced = flags.len(),
            expected = reference.len(),
            "match flags: forcing flag array to reference length"
        );
    }
    flags.resize(reference.len(), false);
    flags
}

/// Splits a flat flag array back into per-word segments. A short trailing
/// segment is padded with `false`.
pub fn split_flags_by_lengths(flags: &[bool], lengths: &[usize]) -> Vec<Vec<bool>> {
    let mut out = Vec::with_capacity(lengths.len());
    let mut idx = 0usize;
    for &len in lengths {
        let start = idx.min(flags.len());
        let end = (idx + len).min(flags.len());
        let mut segment = flags[start..end].to_vec();
        segment.resize(len, false);
        out.push(segment);
        idx += len;
    }
    out
}
