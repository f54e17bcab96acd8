use std::cmp::Ordering;

use serde::Serialize;

use crate::config::OverallWeights;
use crate::types::AssessmentResult;

const CORRECT_PHONEME_SCORE: f64 = 100.0;
const INCORRECT_PHONEME_SCORE: f64 = 0.0;

/// Response-shaped view of an [`AssessmentResult`]. Scores are rounded to one
/// decimal; timing fields span the whole utterance since no per-phoneme
/// boundaries are recovered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub overall: f64,
    pub accuracy: f64,
    pub fluency: f64,
    pub completeness: f64,
    pub word_accuracy: f64,
    pub words: Vec<WordReport>,
    pub phonemes: Vec<PhonemeReport>,
    pub mistakes: Vec<MistakeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordReport {
    pub text: String,
    pub start: u64,
    pub end: u64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_index: Option<usize>,
    pub p: String,
    pub start: u64,
    pub end: u64,
    pub score: f64,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeReport {
    pub word_index: usize,
    pub word: String,
    pub word_score: f64,
    pub start: u64,
    pub end: u64,
    pub phonemes: Vec<PhonemeReport>,
}

/// Summary over a batch of reports.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregateReport {
    pub case_count: usize,
    pub mean_overall: f64,
    pub median_overall: f64,
    pub mean_accuracy: f64,
    pub mean_fluency: f64,
    pub mean_completeness: f64,
    pub mistake_word_count: usize,
}

pub fn overall_score(result: &AssessmentResult, weights: &OverallWeights) -> f64 {
    weights.accuracy * result.accuracy
        + weights.fluency * result.fluency.fluency_score
        + weights.completeness * result.completeness
}

pub fn build_report(result: &AssessmentResult, weights: &OverallWeights) -> AssessmentReport {
    let end = result.duration_ms;
    // every word reuses the sentence accuracy
    let word_score = round1(result.accuracy);

    let words = result
        .words
        .iter()
        .map(|w| WordReport {
            text: w.word.clone(),
            start: 0,
            end,
            score: word_score,
        })
        .collect();

    let mut phonemes = Vec::new();
    let mut mistakes = Vec::new();
    for (word_index, word) in result.words.iter().enumerate() {
        let entries: Vec<PhonemeReport> = word
            .phonemes
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let is_correct = word.phoneme_flags.get(i).copied().unwrap_or(false);
                phoneme_entry(p.as_str(), is_correct, end)
            })
            .collect();

        phonemes.extend(entries.iter().cloned().map(|mut e| {
            e.word_index = Some(word_index);
            e
        }));

        if !word.covered {
            mistakes.push(MistakeReport {
                word_index,
                word: word.word.clone(),
                word_score,
                start: 0,
                end,
                phonemes: entries,
            });
        }
    }

    AssessmentReport {
        overall: round1(overall_score(result, weights)),
        accuracy: round1(result.accuracy),
        fluency: round1(result.fluency.fluency_score),
        completeness: round1(result.completeness),
        word_accuracy: word_score,
        words,
        phonemes,
        mistakes,
    }
}

pub fn aggregate_reports(reports: &[AssessmentReport]) -> AggregateReport {
    if reports.is_empty() {
        return AggregateReport::default();
    }

    let overall: Vec<f64> = reports.iter().map(|r| r.overall).collect();
    let mut sorted = overall.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    AggregateReport {
        case_count: reports.len(),
        mean_overall: round1(mean(&overall)),
        median_overall: round1(median_sorted(&sorted)),
        mean_accuracy: round1(mean(&reports.iter().map(|r| r.accuracy).collect::<Vec<_>>())),
        mean_fluency: round1(mean(&reports.iter().map(|r| r.fluency).collect::<Vec<_>>())),
        mean_completeness: round1(mean(
            &reports.iter().map(|r| r.completeness).collect::<Vec<_>>(),
        )),
        mistake_word_count: reports.iter().map(|r| r.mistakes.len()).sum(),
    }
}

fn phoneme_entry(p: &str, is_correct: bool, end: u64) -> PhonemeReport {
    PhonemeReport {
        word_index: None,
        p: p.to_string(),
        start: 0,
        end,
        score: if is_correct {
            CORRECT_PHONEME_SCORE
        } else {
            INCORRECT_PHONEME_SCORE
        },
        is_correct,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median_sorted(sorted_values: &[f64]) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
    } else {
        sorted_values[mid]
    }
}
