use serde::{Deserialize, Serialize};

use crate::alignment::Candidate;
use crate::fluency::FluencyMetrics;
use crate::phonetics::NormalizedPhoneme;

/// Per-frame ranked ids emitted by an acoustic model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePredictions {
    /// Top-1 id per frame.
    pub best_ids: Vec<usize>,
    /// Ranked ids per frame, best first. May be empty when the model only
    /// produces greedy output.
    #[serde(default)]
    pub top_k_ids: Vec<Vec<usize>>,
}

impl FramePredictions {
    pub fn frame_count(&self) -> usize {
        self.best_ids.len().max(self.top_k_ids.len())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WordAssessment {
    pub word: String,
    /// Raw phonemizer output, before normalization.
    pub reference_tokens: Vec<String>,
    pub phonemes: Vec<NormalizedPhoneme>,
    pub covered: bool,
    /// One entry per normalized phoneme of this word.
    pub phoneme_flags: Vec<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResult {
    pub per: f64,
    /// `(1 - per) * 100`, not clamped.
    pub accuracy: f64,
    /// Percentage of reference words judged covered.
    pub completeness: f64,
    pub fluency: FluencyMetrics,
    pub words: Vec<WordAssessment>,
    pub reference_flat: Vec<NormalizedPhoneme>,
    /// Raw tokens decoded from the best ids.
    pub predicted_tokens: Vec<String>,
    /// The selected normalized prediction.
    pub predicted: Vec<NormalizedPhoneme>,
    pub candidates: Vec<Candidate>,
    pub duration_ms: u64,
}

impl AssessmentResult {
    pub fn covered_word_count(&self) -> usize {
        self.words.iter().filter(|w| w.covered).count()
    }

    pub fn missed_words(&self) -> impl Iterator<Item = &WordAssessment> {
        self.words.iter().filter(|w| !w.covered)
    }
}
