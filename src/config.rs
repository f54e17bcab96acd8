use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;
use crate::fluency::ZoneCurve;

/// What to do when the phonemizer returns no tokens for a reference word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Record a zero-length phoneme sequence; the word then never reads as covered.
    #[default]
    RecordEmpty,
    /// Ask the secondary phonemizer, then record zero phonemes if it is empty too.
    SecondaryPhonemizer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub sample_rate_hz: u32,
    pub fallback_policy: FallbackPolicy,
    pub include_rhythm_score: bool,
    pub preserve_long_vowels: bool,
    pub candidates: CandidateConfig,
    pub fluency: FluencyConfig,
    pub overall_weights: OverallWeights,
    /// Normalized phoneme pairs merged into the built-in confusable table.
    pub extra_confusable_pairs: Vec<(String, String)>,
}

impl AssessmentConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;

    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AssessmentError::io("read assessment config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AssessmentError::json("parse assessment config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        if self.sample_rate_hz == 0 {
            return Err(AssessmentError::invalid_config("sample_rate_hz must be > 0"));
        }
        self.candidates.validate()?;
        self.fluency.validate()?;
        self.overall_weights.validate()
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            fallback_policy: FallbackPolicy::default(),
            include_rhythm_score: true,
            preserve_long_vowels: false,
            candidates: CandidateConfig::default(),
            fluency: FluencyConfig::default(),
            overall_weights: OverallWeights::default(),
            extra_confusable_pairs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Ranked ids requested per frame from the acoustic model.
    pub top_k: usize,
    /// Leading frames that each get a second-best substitution variant.
    pub variant_frames: usize,
    pub max_candidates: usize,
}

impl CandidateConfig {
    fn validate(&self) -> Result<(), AssessmentError> {
        if self.top_k == 0 {
            return Err(AssessmentError::invalid_config("candidates.top_k must be >= 1"));
        }
        if self.max_candidates == 0 {
            return Err(AssessmentError::invalid_config(
                "candidates.max_candidates must be >= 1",
            ));
        }
        Ok(())
    }
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            variant_frames: 3,
            max_candidates: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FluencyWeights {
    pub speech_rate: f64,
    pub pause: f64,
    pub rhythm: f64,
}

impl FluencyWeights {
    pub const WITH_RHYTHM: Self = Self {
        speech_rate: 0.3,
        pause: 0.3,
        rhythm: 0.4,
    };
    pub const WITHOUT_RHYTHM: Self = Self {
        speech_rate: 0.5,
        pause: 0.5,
        rhythm: 0.0,
    };

    fn validate(&self, name: &str) -> Result<(), AssessmentError> {
        for (field, value) in [
            ("speech_rate", self.speech_rate),
            ("pause", self.pause),
            ("rhythm", self.rhythm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AssessmentError::invalid_config(format!(
                    "fluency.{name}.{field} must be a non-negative finite weight, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for FluencyWeights {
    fn default() -> Self {
        Self::WITH_RHYTHM
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FluencyConfig {
    pub frame_ms: u32,
    /// Frame-energy percentile (0..=1) used as the pause threshold.
    pub pause_percentile: f64,
    pub speech_rate: ZoneCurve,
    pub pause: ZoneCurve,
    pub rhythm: ZoneCurve,
    pub weights_with_rhythm: FluencyWeights,
    pub weights_without_rhythm: FluencyWeights,
}

impl FluencyConfig {
    fn validate(&self) -> Result<(), AssessmentError> {
        if self.frame_ms == 0 {
            return Err(AssessmentError::invalid_config("fluency.frame_ms must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.pause_percentile) {
            return Err(AssessmentError::invalid_config(format!(
                "fluency.pause_percentile must be within [0, 1], got {}",
                self.pause_percentile
            )));
        }
        self.speech_rate.validate("speech_rate")?;
        self.pause.validate("pause")?;
        self.rhythm.validate("rhythm")?;
        self.weights_with_rhythm.validate("weights_with_rhythm")?;
        self.weights_without_rhythm.validate("weights_without_rhythm")
    }
}

impl Default for FluencyConfig {
    fn default() -> Self {
        Self {
            frame_ms: 100,
            pause_percentile: 0.20,
            speech_rate: ZoneCurve::SPEECH_RATE,
            pause: ZoneCurve::PAUSE_RATIO,
            rhythm: ZoneCurve::RHYTHM_RATIO,
            weights_with_rhythm: FluencyWeights::WITH_RHYTHM,
            weights_without_rhythm: FluencyWeights::WITHOUT_RHYTHM,
        }
    }
}

/// Weights of the overall score reported at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverallWeights {
    pub accuracy: f64,
    pub fluency: f64,
    pub completeness: f64,
}

impl OverallWeights {
    fn validate(&self) -> Result<(), AssessmentError> {
        for (field, value) in [
            ("accuracy", self.accuracy),
            ("fluency", self.fluency),
            ("completeness", self.completeness),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AssessmentError::invalid_config(format!(
                    "overall_weights.{field} must be a non-negative finite weight, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.4,
            fluency: 0.4,
            completeness: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_config_default() {
        let config = AssessmentConfig::default();
        assert_eq!(config.sample_rate_hz, 16_000);
        assert_eq!(config.fallback_policy, FallbackPolicy::RecordEmpty);
        assert!(config.include_rhythm_score);
        assert!(!config.preserve_long_vowels);
        assert_eq!(config.candidates.top_k, 3);
        assert_eq!(config.candidates.variant_frames, 3);
        assert_eq!(config.candidates.max_candidates, 5);
        assert_eq!(config.fluency.frame_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "fallback_policy": "secondary_phonemizer",
            "preserve_long_vowels": true,
            "candidates": { "max_candidates": 2 }
        }"#;
        let config: AssessmentConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.fallback_policy, FallbackPolicy::SecondaryPhonemizer);
        assert!(config.preserve_long_vowels);
        assert_eq!(config.candidates.max_candidates, 2);
        assert_eq!(config.candidates.top_k, 3);
        assert_eq!(config.fluency.speech_rate, ZoneCurve::SPEECH_RATE);
        assert_eq!(config.overall_weights, OverallWeights::default());
    }

    #[test]
    fn zero_candidate_budget_is_rejected() {
        let mut config = AssessmentConfig::default();
        config.candidates.max_candidates = 0;
        assert!(matches!(
            config.validate(),
            Err(AssessmentError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = AssessmentConfig::default();
        config.fluency.weights_with_rhythm.rhythm = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_fails_on_missing_file() {
        let result = AssessmentConfig::load(Path::new("/nonexistent/assessment.json"));
        assert!(matches!(result, Err(AssessmentError::Io { .. })));
    }

    #[test]
    fn load_reads_temp_file() {
        let path = std::env::temp_dir().join("pronunciation_rs_config_load.json");
        std::fs::write(&path, r#"{"sample_rate_hz": 8000}"#).expect("write config");
        let config = AssessmentConfig::load(&path).expect("config should load");
        assert_eq!(config.sample_rate_hz, 8_000);
        let _ = std::fs::remove_file(&path);
    }
}
