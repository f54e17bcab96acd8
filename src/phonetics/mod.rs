mod arpabet;
mod confusable;
mod normalize;

pub use arpabet::arpabet_to_ipa;
pub use confusable::ConfusablePairSet;
pub use normalize::{NormalizedPhoneme, PhonemeNormalizer};

use crate::error::AssessmentError;

pub const MATCH_COST: f64 = 0.0;
pub const CONFUSABLE_COST: f64 = 0.5;
pub const MISMATCH_COST: f64 = 1.0;

/// Process-wide phonetic tables: the normalizer and the confusable set.
///
/// Constructed once (usually by [`crate::AssessorBuilder`]) and passed by
/// reference into every scoring function.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    normalizer: PhonemeNormalizer,
    confusables: ConfusablePairSet,
}

impl ScoringTables {
    pub fn new<'a, I>(preserve_long_vowels: bool, extra_pairs: I) -> Result<Self, AssessmentError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let normalizer = PhonemeNormalizer::new(preserve_long_vowels);
        let confusables = ConfusablePairSet::build(&normalizer, extra_pairs)?;
        Ok(Self {
            normalizer,
            confusables,
        })
    }

    pub fn builtin() -> Result<Self, AssessmentError> {
        Self::new(false, std::iter::empty::<(&str, &str)>())
    }

    pub fn normalizer(&self) -> &PhonemeNormalizer {
        &self.normalizer
    }

    pub fn confusables(&self) -> &ConfusablePairSet {
        &self.confusables
    }

    pub fn normalize_sequence<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<NormalizedPhoneme> {
        self.normalizer.normalize_sequence(tokens)
    }

    pub fn substitution_cost(&self, a: &NormalizedPhoneme, b: &NormalizedPhoneme) -> f64 {
        if a == b {
            MATCH_COST
        } else if self.confusables.contains(a, b) {
            CONFUSABLE_COST
        } else {
            MISMATCH_COST
        }
    }
}
