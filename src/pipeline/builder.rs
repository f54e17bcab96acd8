use crate::config::{AssessmentConfig, FallbackPolicy};
use crate::error::AssessmentError;
use crate::phonetics::ScoringTables;
use crate::pipeline::runtime::{AssessorParts, PronunciationAssessor};
use crate::pipeline::traits::{AcousticModel, Phonemizer};

pub struct AssessorBuilder {
    config: AssessmentConfig,
    acoustic_model: Option<Box<dyn AcousticModel>>,
    phonemizer: Option<Box<dyn Phonemizer>>,
    secondary_phonemizer: Option<Box<dyn Phonemizer>>,
}

impl AssessorBuilder {
    pub fn new(config: AssessmentConfig) -> Self {
        Self {
            config,
            acoustic_model: None,
            phonemizer: None,
            secondary_phonemizer: None,
        }
    }

    pub fn with_acoustic_model(mut self, acoustic_model: Box<dyn AcousticModel>) -> Self {
        self.acoustic_model = Some(acoustic_model);
        self
    }

    pub fn with_phonemizer(mut self, phonemizer: Box<dyn Phonemizer>) -> Self {
        self.phonemizer = Some(phonemizer);
        self
    }

    /// Only consulted under [`FallbackPolicy::SecondaryPhonemizer`].
    pub fn with_secondary_phonemizer(mut self, phonemizer: Box<dyn Phonemizer>) -> Self {
        self.secondary_phonemizer = Some(phonemizer);
        self
    }

    pub fn build(self) -> Result<PronunciationAssessor, AssessmentError> {
        self.config.validate()?;

        let acoustic_model = self
            .acoustic_model
            .ok_or_else(|| AssessmentError::invalid_config("an acoustic model is required"))?;
        let phonemizer = self
            .phonemizer
            .ok_or_else(|| AssessmentError::invalid_config("a phonemizer is required"))?;

        let secondary_phonemizer = match self.config.fallback_policy {
            FallbackPolicy::SecondaryPhonemizer => {
                Some(self.secondary_phonemizer.ok_or_else(|| {
                    AssessmentError::invalid_config(
                        "fallback_policy secondary_phonemizer needs a secondary phonemizer",
                    )
                })?)
            }
            FallbackPolicy::RecordEmpty => {
                if self.secondary_phonemizer.is_some() {
                    tracing::warn!(
                        "secondary phonemizer supplied but fallback_policy is record_empty; it will not be used"
                    );
                }
                None
            }
        };

        let tables = ScoringTables::new(
            self.config.preserve_long_vowels,
            self.config
                .extra_confusable_pairs
                .iter()
                .map(|(a, b)| (a.as_str(), b.as_str())),
        )?;
        tracing::debug!(
            confusable_pairs = tables.confusables().len(),
            preserve_long_vowels = self.config.preserve_long_vowels,
            fallback_policy = ?self.config.fallback_policy,
            "scoring tables built"
        );

        Ok(PronunciationAssessor::from_parts(AssessorParts {
            config: self.config,
            tables,
            acoustic_model,
            phonemizer,
            secondary_phonemizer,
        }))
    }
}
