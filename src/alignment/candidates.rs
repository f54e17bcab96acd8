use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::config::CandidateConfig;
use crate::error::AssessmentError;
use crate::phonetics::{NormalizedPhoneme, ScoringTables};

use super::per::sequence_per;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CandidateOrigin {
    Greedy,
    /// Top-1 everywhere except `frame`, which takes its second-ranked id.
    SecondBest { frame: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub phonemes: Vec<NormalizedPhoneme>,
    /// `1 - PER` against the reference.
    pub score: f64,
    pub origin: CandidateOrigin,
}

/// Builds the greedy decoding plus one second-best swap per leading frame,
/// scores each unique sequence against `reference`, and returns them best
/// first. Equal scores keep generation order, so the greedy candidate wins
/// ties.
///
/// Frames with no ranked ids are ignored. An empty result means there was
/// nothing to decode; callers fall back to the best-id sequence.
pub fn select_candidates<D>(
    top_k_ids: &[Vec<usize>],
    reference: &[NormalizedPhoneme],
    tables: &ScoringTables,
    config: &CandidateConfig,
    mut decode: D,
) -> Result<Vec<Candidate>, AssessmentError>
where
    D: FnMut(&[usize]) -> Result<Vec<String>, AssessmentError>,
{
    let frames: Vec<&[usize]> = top_k_ids
        .iter()
        .filter(|ids| !ids.is_empty())
        .map(Vec::as_slice)
        .collect();
    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let greedy: Vec<usize> = frames.iter().map(|ids| ids[0]).collect();
    let mut paths = vec![(CandidateOrigin::Greedy, greedy.clone())];
    if config.max_candidates > 1 {
        for (frame, ids) in frames.iter().enumerate().take(config.variant_frames) {
            if let Some(&second) = ids.get(1) {
                let mut path = greedy.clone();
                path[frame] = second;
                paths.push((CandidateOrigin::SecondBest { frame }, path));
            }
        }
    }

    let mut seen: HashSet<Vec<NormalizedPhoneme>> = HashSet::with_capacity(paths.len());
    let mut candidates = Vec::with_capacity(paths.len());
    for (origin, path) in paths {
        let tokens = decode(&path)?;
        let phonemes = tables.normalize_sequence(&tokens);
        if !seen.insert(phonemes.clone()) {
            continue;
        }
        let score = 1.0 - sequence_per(tables, reference, &phonemes);
        tracing::debug!(
            origin = ?origin,
            phonemes = phonemes.len(),
            score = format!("{score:.3}"),
            "candidate scored"
        );
        candidates.push(Candidate {
            phonemes,
            score,
            origin,
        });
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(config.max_candidates);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: &[&str] = &["k", "æ", "t", "ɾ", "p", "ə"];

    fn decode(ids: &[usize]) -> Result<Vec<String>, AssessmentError> {
        Ok(ids.iter().map(|&id| VOCAB[id].to_string()).collect())
    }

    fn config(max_candidates: usize) -> CandidateConfig {
        CandidateConfig {
            top_k: 3,
            variant_frames: 3,
            max_candidates,
        }
    }

    #[test]
    fn empty_input_yields_no_candidates() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k"]);
        let out = select_candidates(&[], &reference, &tables, &config(5), decode).unwrap();
        assert!(out.is_empty());
        let out =
            select_candidates(&[vec![], vec![]], &reference, &tables, &config(5), decode).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn second_best_swap_can_win() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k", "æ", "t"]);
        // greedy decodes "p æ t"; swapping frame 0 recovers "k æ t"
        let top_k = vec![vec![4, 0], vec![1, 5], vec![2, 3]];
        let out = select_candidates(&top_k, &reference, &tables, &config(5), decode).unwrap();
        assert_eq!(out[0].origin, CandidateOrigin::SecondBest { frame: 0 });
        assert_eq!(out[0].score, 1.0);
        assert!(out.iter().any(|c| c.origin == CandidateOrigin::Greedy));
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn greedy_wins_ties() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k", "æ", "t"]);
        // swapping frame 2 trades one mismatch (t/p) for another (t/ə)
        let top_k = vec![vec![0], vec![1], vec![4, 5]];
        let out = select_candidates(&top_k, &reference, &tables, &config(5), decode).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].origin, CandidateOrigin::Greedy);
        assert_eq!(out[0].score, out[1].score);
    }

    #[test]
    fn duplicates_are_removed() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k", "æ", "t"]);
        // "kʰ" and "k" normalize identically
        let decode = |ids: &[usize]| -> Result<Vec<String>, AssessmentError> {
            Ok(ids
                .iter()
                .map(|&id| ["k", "kʰ", "æ", "t"][id].to_string())
                .collect())
        };
        let top_k = vec![vec![0, 1], vec![2], vec![3]];
        let out = select_candidates(&top_k, &reference, &tables, &config(5), decode).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].origin, CandidateOrigin::Greedy);
    }

    #[test]
    fn respects_candidate_budget() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k", "æ", "t"]);
        let top_k = vec![vec![0, 4], vec![1, 5], vec![2, 3], vec![2, 4]];
        let out = select_candidates(&top_k, &reference, &tables, &config(2), decode).unwrap();
        assert_eq!(out.len(), 2);
        let out = select_candidates(&top_k, &reference, &tables, &config(1), decode).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].origin, CandidateOrigin::Greedy);
    }

    #[test]
    fn only_leading_frames_get_variants() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k", "æ", "t", "ə"]);
        let top_k = vec![vec![0, 4], vec![1, 5], vec![2, 3], vec![5, 4]];
        let out = select_candidates(&top_k, &reference, &tables, &config(10), decode).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out
            .iter()
            .all(|c| c.origin != CandidateOrigin::SecondBest { frame: 3 }));
    }

    #[test]
    fn decode_failure_propagates() {
        let tables = ScoringTables::builtin().unwrap();
        let reference = tables.normalize_sequence(&["k"]);
        let failing = |_: &[usize]| -> Result<Vec<String>, AssessmentError> {
            Err(AssessmentError::collaborator("decoder", "boom"))
        };
        let err = select_candidates(&[vec![0]], &reference, &tables, &config(5), failing);
        assert!(err.is_err());
    }
}
