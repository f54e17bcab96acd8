use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

/// Three-zone piecewise score in `[floor, 1.0]`.
///
/// * `[ideal_min, ideal_max]` scores 1.0.
/// * `[acceptable_min, ideal_min)` ramps up from `low_ramp_floor` to 1.0.
/// * `(ideal_max, acceptable_max]` ramps down from 1.0 to `high_ramp_floor`.
/// * Below `acceptable_min` the score is `low_ramp_floor * v / acceptable_min`;
///   above `acceptable_max` it falls from `high_ramp_floor` to zero across
///   `overshoot_span`. Both are clipped at `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCurve {
    pub acceptable_min: f64,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub acceptable_max: f64,
    pub low_ramp_floor: f64,
    pub high_ramp_floor: f64,
    pub floor: f64,
    pub overshoot_span: f64,
}

impl ZoneCurve {
    /// Words per second.
    pub const SPEECH_RATE: Self = Self {
        acceptable_min: 1.2,
        ideal_min: 2.0,
        ideal_max: 4.0,
        acceptable_max: 5.5,
        low_ramp_floor: 0.7,
        high_ramp_floor: 0.7,
        floor: 0.3,
        overshoot_span: 5.5,
    };

    /// Fraction of low-energy frames.
    pub const PAUSE_RATIO: Self = Self {
        acceptable_min: 0.02,
        ideal_min: 0.05,
        ideal_max: 0.35,
        acceptable_max: 0.50,
        low_ramp_floor: 0.8,
        high_ramp_floor: 0.7,
        floor: 0.4,
        overshoot_span: 0.3,
    };

    /// Predicted over reference phoneme count.
    pub const RHYTHM_RATIO: Self = Self {
        acceptable_min: 0.5,
        ideal_min: 0.7,
        ideal_max: 1.4,
        acceptable_max: 1.8,
        low_ramp_floor: 0.7,
        high_ramp_floor: 0.7,
        floor: 0.4,
        overshoot_span: 1.8,
    };

    pub fn score(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.floor;
        }

        if (self.ideal_min..=self.ideal_max).contains(&value) {
            1.0
        } else if value >= self.acceptable_min && value < self.ideal_min {
            let t = (value - self.acceptable_min) / (self.ideal_min - self.acceptable_min);
            self.low_ramp_floor + t * (1.0 - self.low_ramp_floor)
        } else if value > self.ideal_max && value <= self.acceptable_max {
            let t = (value - self.ideal_max) / (self.acceptable_max - self.ideal_max);
            1.0 - t * (1.0 - self.high_ramp_floor)
        } else if value < self.acceptable_min {
            let scaled = if self.acceptable_min > 0.0 {
                self.low_ramp_floor * (value / self.acceptable_min)
            } else {
                self.floor
            };
            scaled.max(self.floor)
        } else {
            let overshoot = (value - self.acceptable_max) / self.overshoot_span;
            (self.high_ramp_floor * (1.0 - overshoot)).max(self.floor)
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), AssessmentError> {
        let fields = [
            self.acceptable_min,
            self.ideal_min,
            self.ideal_max,
            self.acceptable_max,
            self.low_ramp_floor,
            self.high_ramp_floor,
            self.floor,
            self.overshoot_span,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(AssessmentError::invalid_config(format!(
                "fluency.{name}: zone parameters must be finite"
            )));
        }
        if !(0.0 <= self.acceptable_min
            && self.acceptable_min < self.ideal_min
            && self.ideal_min <= self.ideal_max
            && self.ideal_max < self.acceptable_max)
        {
            return Err(AssessmentError::invalid_config(format!(
                "fluency.{name}: breakpoints must satisfy 0 <= acceptable_min < ideal_min <= ideal_max < acceptable_max, got [{}, {}, {}, {}]",
                self.acceptable_min, self.ideal_min, self.ideal_max, self.acceptable_max
            )));
        }
        for (field, value) in [
            ("low_ramp_floor", self.low_ramp_floor),
            ("high_ramp_floor", self.high_ramp_floor),
            ("floor", self.floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AssessmentError::invalid_config(format!(
                    "fluency.{name}.{field} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.overshoot_span <= 0.0 {
            return Err(AssessmentError::invalid_config(format!(
                "fluency.{name}.overshoot_span must be > 0"
            )));
        }
        Ok(())
    }
}
