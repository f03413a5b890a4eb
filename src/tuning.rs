//! Data-driven race balance
//!
//! Probabilities, timer bounds and speeds that drive the race. Defaults match
//! the classic race; hosts may ship a JSON override.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TuningPreset {
    /// No boosts or tricks; every agent cruises at base speed
    Calm,
    #[default]
    Classic,
    /// Events fire more often and fail more often
    Chaos,
}

impl TuningPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuningPreset::Calm => "Calm",
            TuningPreset::Classic => "Classic",
            TuningPreset::Chaos => "Chaos",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "calm" => Some(TuningPreset::Calm),
            "classic" | "default" => Some(TuningPreset::Classic),
            "chaos" => Some(TuningPreset::Chaos),
            _ => None,
        }
    }
}

/// Half-open range `[min, max)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: f64,
    pub max: f64,
}

impl SecondsRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Map a unit roll in [0, 1) into the range
    #[inline]
    pub fn lerp(&self, roll: f64) -> f64 {
        self.min + roll * (self.max - self.min)
    }
}

/// Race balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceTuning {
    // === Boost ===
    /// Chance a ready boost actually fires
    pub boost_probability: f64,
    /// Boost length (seconds)
    pub boost_duration: f64,
    /// Speed multiplier while boosted
    pub boost_multiplier: f64,
    /// Readiness timer reset range
    pub boost_reset: SecondsRange,

    // === Tricks ===
    /// Chance a ready trick is attempted
    pub trick_probability: f64,
    /// Chance an attempted trick ends in a crash
    pub trick_failure_probability: f64,
    /// Readiness timer reset range
    pub trick_reset: SecondsRange,
    /// Delay between trick start and outcome (ms, host clock)
    pub trick_reveal_delay_ms: f64,

    // === Crashes ===
    /// Crash cooldown (seconds)
    pub crash_duration: f64,
    /// Speed multiplier while crashed
    pub crash_speed_factor: f64,

    // === Movement ===
    /// Base angular speed (degrees per second before scaling)
    pub base_speed: f64,
    /// Multiplier applied whenever the agent is not mid-trick
    pub movement_scale: f64,
    /// Laps to finish
    pub laps: usize,
    /// Placement bonuses per lap, best first
    pub lap_bonuses: Vec<u32>,

    // === Presentation / frame ===
    /// How long transient icons linger (ms, host clock)
    pub icon_linger_ms: f64,
    /// Upper bound on a single frame delta (ms)
    pub max_frame_delta_ms: f64,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            boost_probability: 0.8,
            boost_duration: 3.0,
            boost_multiplier: 2.0,
            boost_reset: SecondsRange::new(5.0, 10.0),

            trick_probability: 0.6,
            trick_failure_probability: 0.25,
            trick_reset: SecondsRange::new(8.0, 12.0),
            trick_reveal_delay_ms: 1000.0,

            crash_duration: 3.0,
            crash_speed_factor: 0.5,

            base_speed: 2.0,
            movement_scale: 8.0,
            laps: 3,
            lap_bonuses: vec![3, 2, 1, 0],

            icon_linger_ms: 1000.0,
            max_frame_delta_ms: 100.0,
        }
    }
}

impl RaceTuning {
    /// Create tuning from a preset
    pub fn from_preset(preset: TuningPreset) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a preset on top of the current values
    pub fn apply_preset(&mut self, preset: TuningPreset) {
        match preset {
            TuningPreset::Calm => {
                self.boost_probability = 0.0;
                self.trick_probability = 0.0;
            }
            TuningPreset::Classic => {}
            TuningPreset::Chaos => {
                self.boost_probability = 0.95;
                self.trick_probability = 0.9;
                self.trick_failure_probability = 0.5;
                self.boost_reset = SecondsRange::new(2.0, 5.0);
                self.trick_reset = SecondsRange::new(3.0, 6.0);
            }
        }
    }

    /// Parse and validate a JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every knob is in a usable range
    pub fn validate(&self) -> Result<(), TuningError> {
        for (name, value) in [
            ("boost_probability", self.boost_probability),
            ("trick_probability", self.trick_probability),
            ("trick_failure_probability", self.trick_failure_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::Probability { name, value });
            }
        }

        for (name, range) in [
            ("boost_reset", self.boost_reset),
            ("trick_reset", self.trick_reset),
        ] {
            if !(range.min >= 0.0 && range.min < range.max) {
                return Err(TuningError::Range {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        for (name, value) in [
            ("boost_duration", self.boost_duration),
            ("crash_duration", self.crash_duration),
            ("base_speed", self.base_speed),
            ("movement_scale", self.movement_scale),
            ("max_frame_delta_ms", self.max_frame_delta_ms),
        ] {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { name, value });
            }
        }

        if self.laps == 0 {
            return Err(TuningError::NoLaps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RaceTuning::default().validate().is_ok());
        assert!(RaceTuning::from_preset(TuningPreset::Calm).validate().is_ok());
        assert!(RaceTuning::from_preset(TuningPreset::Chaos).validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = RaceTuning::from_json(r#"{ "boost_probability": 0.5 }"#).unwrap();
        assert_eq!(tuning.boost_probability, 0.5);
        assert_eq!(tuning.trick_probability, 0.6);
        assert_eq!(tuning.lap_bonuses, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = RaceTuning::from_json(r#"{ "trick_probability": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Probability { name: "trick_probability", .. }));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let json = r#"{ "boost_reset": { "min": 10.0, "max": 5.0 } }"#;
        let err = RaceTuning::from_json(json).unwrap_err();
        assert!(matches!(err, TuningError::Range { name: "boost_reset", .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(RaceTuning::from_json("nope"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_preserves_preset() {
        let calm = RaceTuning::from_preset(TuningPreset::Calm);
        let back = RaceTuning::from_json(&calm.to_json().unwrap()).unwrap();
        assert_eq!(back, calm);
        assert_eq!(TuningPreset::parse("CALM"), Some(TuningPreset::Calm));
    }
}
