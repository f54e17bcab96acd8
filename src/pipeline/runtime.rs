use crate::alignment::{
    accuracy_from_per, match_flags, select_candidates, sequence_per, split_flags_by_lengths,
    word_covered,
};
use crate::config::{AssessmentConfig, FallbackPolicy};
use crate::error::AssessmentError;
use crate::fluency::FluencyCalculator;
use crate::phonetics::{NormalizedPhoneme, ScoringTables};
use crate::pipeline::traits::{AcousticModel, Phonemizer};
use crate::types::{AssessmentResult, WordAssessment};

pub struct PronunciationAssessor {
    config: AssessmentConfig,
    tables: ScoringTables,
    acoustic_model: Box<dyn AcousticModel>,
    phonemizer: Box<dyn Phonemizer>,
    secondary_phonemizer: Option<Box<dyn Phonemizer>>,
}

pub(crate) struct AssessorParts {
    pub config: AssessmentConfig,
    pub tables: ScoringTables,
    pub acoustic_model: Box<dyn AcousticModel>,
    pub phonemizer: Box<dyn Phonemizer>,
    pub secondary_phonemizer: Option<Box<dyn Phonemizer>>,
}

struct ReferenceWord {
    word: String,
    tokens: Vec<String>,
    phonemes: Vec<NormalizedPhoneme>,
}

impl PronunciationAssessor {
    pub(crate) fn from_parts(parts: AssessorParts) -> Self {
        Self {
            config: parts.config,
            tables: parts.tables,
            acoustic_model: parts.acoustic_model,
            phonemizer: parts.phonemizer,
            secondary_phonemizer: parts.secondary_phonemizer,
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    /// Scores `waveform` (mono, `config.sample_rate_hz`, samples in [-1, 1])
    /// against `reference_words`.
    ///
    /// Fails only when a collaborator fails; phonemization gaps are recorded
    /// as zero-phoneme words.
    pub fn assess(
        &self,
        waveform: &[f32],
        reference_words: &[String],
    ) -> Result<AssessmentResult, AssessmentError> {
        let reference = reference_words
            .iter()
            .map(|word| self.phonemize(word))
            .collect::<Result<Vec<_>, _>>()?;
        let reference_flat: Vec<NormalizedPhoneme> = reference
            .iter()
            .flat_map(|w| w.phonemes.iter().copied())
            .collect();

        let predictions = self
            .acoustic_model
            .predict(waveform, self.config.candidates.top_k)?;
        let predicted_tokens = self.acoustic_model.decode(&predictions.best_ids)?;

        let candidates = select_candidates(
            &predictions.top_k_ids,
            &reference_flat,
            &self.tables,
            &self.config.candidates,
            |ids| self.acoustic_model.decode(ids),
        )?;
        let predicted = match candidates.first() {
            Some(best) => best.phonemes.clone(),
            None => {
                tracing::warn!(
                    frames = predictions.best_ids.len(),
                    "no top-k candidates; scoring the best-id decoding"
                );
                self.tables.normalize_sequence(&predicted_tokens)
            }
        };

        let per = sequence_per(&self.tables, &reference_flat, &predicted);
        let accuracy = accuracy_from_per(per);

        let flags = match_flags(&reference_flat, &predicted);
        let lengths: Vec<usize> = reference.iter().map(|w| w.phonemes.len()).collect();
        let per_word_flags = split_flags_by_lengths(&flags, &lengths);

        let words: Vec<WordAssessment> = reference
            .into_iter()
            .zip(per_word_flags)
            .map(|(w, phoneme_flags)| WordAssessment {
                covered: word_covered(&self.tables, &w.phonemes, &predicted),
                word: w.word,
                reference_tokens: w.tokens,
                phonemes: w.phonemes,
                phoneme_flags,
            })
            .collect();
        let covered = words.iter().filter(|w| w.covered).count();
        let completeness = 100.0 * covered as f64 / words.len().max(1) as f64;

        let reference_token_count: usize = words.iter().map(|w| w.reference_tokens.len()).sum();
        let fluency = FluencyCalculator::new(
            &self.config.fluency,
            self.config.sample_rate_hz,
            self.config.include_rhythm_score,
        )
        .measure(
            waveform,
            words.len(),
            Some(reference_token_count),
            predicted_tokens.len(),
        );

        let duration_ms = waveform.len() as u64 * 1000 / self.config.sample_rate_hz as u64;

        tracing::info!(
            words = words.len(),
            covered,
            per = format!("{per:.3}"),
            accuracy = format!("{accuracy:.1}"),
            completeness = format!("{completeness:.1}"),
            fluency = format!("{:.1}", fluency.fluency_score),
            candidates = candidates.len(),
            duration_ms,
            "assessment complete"
        );

        Ok(AssessmentResult {
            per,
            accuracy,
            completeness,
            fluency,
            words,
            reference_flat,
            predicted_tokens,
            predicted,
            candidates,
            duration_ms,
        })
    }

    fn phonemize(&self, word: &str) -> Result<ReferenceWord, AssessmentError> {
        let mut tokens = self.phonemizer.word_to_phonemes(word)?;
        if tokens.is_empty() {
            match (self.config.fallback_policy, &self.secondary_phonemizer) {
                (FallbackPolicy::SecondaryPhonemizer, Some(secondary)) => {
                    tokens = secondary.word_to_phonemes(word)?;
                    if tokens.is_empty() {
                        tracing::warn!(word, "no phonemes from either phonemizer; recording none");
                    } else {
                        tracing::debug!(word, tokens = tokens.len(), "secondary phonemizer used");
                    }
                }
                _ => tracing::warn!(word, "phonemizer returned no phonemes; recording none"),
            }
        }

        let phonemes = self.tables.normalize_sequence(&tokens);
        Ok(ReferenceWord {
            word: word.to_string(),
            tokens,
            phonemes,
        })
    }
}
