use std::collections::HashSet;

use crate::error::AssessmentError;

use super::normalize::{NormalizedPhoneme, PhonemeNormalizer};

/// Normalized pairs close enough in pronunciation to earn a half penalty.
/// Each entry is inserted in both orientations.
const BUILTIN_PAIRS: &[(&str, &str)] = &[
    // plosive vs flap
    ("t", "ɾ"),
    ("d", "ɾ"),
    // neighbouring vowels
    ("ə", "ʌ"),
    ("ə", "ɪ"),
    ("ʌ", "ɪ"),
    ("u", "ʊ"),
    ("o", "ɔ"),
    // sibilants
    ("s", "ʃ"),
    ("z", "ʒ"),
    // nasals
    ("n", "ŋ"),
    ("n", "m"),
    // liquids
    ("l", "ɹ"),
    // voicing
    ("t", "d"),
];

#[derive(Debug, Clone, Default)]
pub struct ConfusablePairSet {
    pairs: HashSet<(NormalizedPhoneme, NormalizedPhoneme)>,
}

impl ConfusablePairSet {
    pub fn builtin(normalizer: &PhonemeNormalizer) -> Result<Self, AssessmentError> {
        Self::build(normalizer, std::iter::empty::<(&str, &str)>())
    }

    /// Builds the built-in table plus `extra` pairs and runs the startup check.
    ///
    /// Every member must already be a normalization fixed point, otherwise
    /// the pair could never match a normalized sequence.
    pub fn build<'a, I>(normalizer: &PhonemeNormalizer, extra: I) -> Result<Self, AssessmentError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::default();
        for (a, b) in BUILTIN_PAIRS.iter().copied().chain(extra) {
            let a = canonical_member(normalizer, a)?;
            let b = canonical_member(normalizer, b)?;
            if a == b {
                return Err(AssessmentError::invalid_table(format!(
                    "confusable pair ({a}, {a}) pairs a phoneme with itself"
                )));
            }
            set.pairs.insert((a, b));
            set.pairs.insert((b, a));
        }
        set.check_symmetric()?;
        Ok(set)
    }

    pub fn contains(&self, a: &NormalizedPhoneme, b: &NormalizedPhoneme) -> bool {
        self.pairs.contains(&(*a, *b))
    }

    /// Number of ordered pairs (twice the number of unordered ones).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NormalizedPhoneme, NormalizedPhoneme)> {
        self.pairs.iter()
    }

    fn check_symmetric(&self) -> Result<(), AssessmentError> {
        match self.pairs.iter().find(|(a, b)| !self.pairs.contains(&(*b, *a))) {
            Some((a, b)) => Err(AssessmentError::invalid_table(format!(
                "confusable pair ({a}, {b}) has no mirror entry"
            ))),
            None => Ok(()),
        }
    }
}

fn canonical_member(
    normalizer: &PhonemeNormalizer,
    symbol: &str,
) -> Result<NormalizedPhoneme, AssessmentError> {
    match normalizer.normalize(symbol) {
        Some(phone) if phone.as_str() == symbol => Ok(phone),
        Some(phone) => Err(AssessmentError::invalid_table(format!(
            "confusable member '{symbol}' is not normalized (normalizes to '{phone}')"
        ))),
        None => Err(AssessmentError::invalid_table(format!(
            "confusable member '{symbol}' carries no phoneme"
        ))),
    }
}
