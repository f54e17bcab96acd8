//! Waveform-derived fluency: speech rate, pause ratio and rhythm, each mapped
//! through a [`ZoneCurve`].

pub mod energy;
mod zones;

pub use zones::ZoneCurve;

use serde::Serialize;

use crate::config::{FluencyConfig, FluencyWeights};

/// Sub-scores are in `[0, 1]`; `fluency_score` is in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluencyMetrics {
    pub fluency_score: f64,
    /// Words per second.
    pub speech_rate: f64,
    pub pause_ratio: f64,
    /// Predicted over reference phoneme count, when a reference count exists.
    pub rhythm_ratio: Option<f64>,
    /// `None` when the rhythm sub-metric is disabled.
    pub rhythm_score: Option<f64>,
    pub speech_rate_score: f64,
    pub pause_score: f64,
}

pub struct FluencyCalculator<'a> {
    config: &'a FluencyConfig,
    sample_rate_hz: u32,
    include_rhythm: bool,
}

impl<'a> FluencyCalculator<'a> {
    pub fn new(config: &'a FluencyConfig, sample_rate_hz: u32, include_rhythm: bool) -> Self {
        Self {
            config,
            sample_rate_hz,
            include_rhythm,
        }
    }

    fn frame_len(&self) -> usize {
        (self.sample_rate_hz as u64 * self.config.frame_ms as u64 / 1000) as usize
    }

    fn weights(&self) -> &FluencyWeights {
        if self.include_rhythm {
            &self.config.weights_with_rhythm
        } else {
            &self.config.weights_without_rhythm
        }
    }

    pub fn measure(
        &self,
        waveform: &[f32],
        word_count: usize,
        reference_phoneme_count: Option<usize>,
        predicted_phoneme_count: usize,
    ) -> FluencyMetrics {
        let duration_s = if self.sample_rate_hz == 0 {
            0.0
        } else {
            waveform.len() as f64 / self.sample_rate_hz as f64
        };
        if duration_s <= 0.0 {
            return FluencyMetrics {
                fluency_score: 0.0,
                speech_rate: 0.0,
                pause_ratio: 1.0,
                rhythm_ratio: None,
                rhythm_score: self.include_rhythm.then_some(0.0),
                speech_rate_score: 0.0,
                pause_score: 0.0,
            };
        }

        let speech_rate = word_count as f64 / duration_s;
        let speech_rate_score = self.config.speech_rate.score(speech_rate);

        let energies = energy::frame_rms(waveform, self.frame_len());
        let pause_ratio = energy::pause_ratio(&energies, self.config.pause_percentile);
        let pause_score = self.config.pause.score(pause_ratio);

        let rhythm_ratio = reference_phoneme_count
            .filter(|&n| n > 0)
            .map(|n| predicted_phoneme_count as f64 / n as f64);
        let rhythm_score = self.include_rhythm.then(|| {
            rhythm_ratio
                .map(|ratio| self.config.rhythm.score(ratio))
                .unwrap_or(0.0)
        });

        let w = self.weights();
        let fluency_score = 100.0
            * (w.speech_rate * speech_rate_score
                + w.pause * pause_score
                + w.rhythm * rhythm_score.unwrap_or(0.0));

        tracing::debug!(
            speech_rate = format!("{speech_rate:.2}"),
            pause_ratio = format!("{pause_ratio:.3}"),
            rhythm_ratio = ?rhythm_ratio,
            frames = energies.len(),
            fluency = format!("{fluency_score:.1}"),
            "fluency measured"
        );

        FluencyMetrics {
            fluency_score,
            speech_rate,
            pause_ratio,
            rhythm_ratio,
            rhythm_score,
            speech_rate_score,
            pause_score,
        }
    }
}
