use crate::error::AssessmentError;
use crate::types::FramePredictions;

/// Audio to ranked per-frame phoneme ids, plus the id-to-token decoding.
///
/// Implementations must be deterministic for identical input.
pub trait AcousticModel: Send + Sync {
    fn predict(&self, waveform: &[f32], top_k: usize) -> Result<FramePredictions, AssessmentError>;

    /// Decodes a per-frame id path to phoneme tokens.
    fn decode(&self, ids: &[usize]) -> Result<Vec<String>, AssessmentError>;
}

/// Reference word to expected phoneme tokens. An empty result is a
/// phonemization gap, not an error.
pub trait Phonemizer: Send + Sync {
    fn word_to_phonemes(&self, word: &str) -> Result<Vec<String>, AssessmentError>;
}
