//! Error bounds and clock settings for the resampler.

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;
use crate::time::TickClock;

/// User-facing thresholds at or below this value switch a channel kind to
/// uniform one-key-per-sample output.
pub const ADAPTIVE_THRESHOLD: f32 = 1e-3;

/// Configuration for adaptive resampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplingConfig {
    /// Adaptive mode; `false` emits one key per sampled tick
    pub enabled: bool,
    /// Percent of the dense track's bounding-box diagonal
    pub max_position_error_percent: f32,
    pub max_rotation_error_degrees: f32,
    /// Percent of relative scale change
    pub max_scale_error_percent: f32,
    /// Percent of the full morph-weight range
    pub max_morph_error_percent: f32,
    /// Lower bound for the derived position error
    pub min_position_error: f32,
    /// Subdivision depth cap of the work queue
    pub max_depth: usize,
    pub clock: TickClock,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_position_error_percent: 0.1,
            max_rotation_error_degrees: 0.1,
            max_scale_error_percent: 0.5,
            max_morph_error_percent: 1.0,
            min_position_error: 1e-6,
            max_depth: 32,
            clock: TickClock::default(),
        }
    }
}

impl ResamplingConfig {
    /// Uniform output for every channel kind.
    pub fn uniform() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_position_error_percent(mut self, percent: f32) -> Self {
        self.max_position_error_percent = percent;
        self
    }

    pub fn with_rotation_error_degrees(mut self, degrees: f32) -> Self {
        self.max_rotation_error_degrees = degrees;
        self
    }

    pub fn with_scale_error_percent(mut self, percent: f32) -> Self {
        self.max_scale_error_percent = percent;
        self
    }

    pub fn with_morph_error_percent(mut self, percent: f32) -> Self {
        self.max_morph_error_percent = percent;
        self
    }

    pub fn with_min_position_error(mut self, min: f32) -> Self {
        self.min_position_error = min;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_clock(mut self, clock: TickClock) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), KeyframeError> {
        let bounds = [
            ("max_position_error_percent", self.max_position_error_percent),
            ("max_rotation_error_degrees", self.max_rotation_error_degrees),
            ("max_scale_error_percent", self.max_scale_error_percent),
            ("max_morph_error_percent", self.max_morph_error_percent),
            ("min_position_error", self.min_position_error),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(KeyframeError::InvalidConfig {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        if self.max_depth == 0 {
            return Err(KeyframeError::InvalidConfig {
                reason: "max_depth must be at least 1".to_string(),
            });
        }
        self.clock.validate()
    }

    /// Whether a channel kind configured with `threshold` is resampled adaptively.
    #[inline]
    pub fn is_adaptive(&self, threshold: f32) -> bool {
        self.enabled && threshold > ADAPTIVE_THRESHOLD
    }

    /// Absolute position bound for a track whose bounding box has diagonal `diagonal`.
    pub fn position_bound(&self, diagonal: f32) -> f32 {
        (diagonal * self.max_position_error_percent / 100.0).max(self.min_position_error)
    }

    /// Rotation bound in radians.
    #[inline]
    pub fn rotation_bound(&self) -> f32 {
        self.max_rotation_error_degrees.to_radians()
    }

    /// Relative scale bound.
    #[inline]
    pub fn scale_bound(&self) -> f32 {
        self.max_scale_error_percent / 100.0
    }

    /// Absolute morph-weight bound.
    #[inline]
    pub fn morph_bound(&self) -> f32 {
        self.max_morph_error_percent / 100.0
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, KeyframeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, KeyframeError> {
        serde_json::to_string_pretty(self).map_err(KeyframeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ResamplingConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enabled);
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.clock.ticks_per_sample, 160);
    }

    #[test]
    fn test_position_bound_floor() {
        let config = ResamplingConfig::default();
        assert!((config.position_bound(1000.0) - 1.0).abs() < 1e-6);
        assert_eq!(config.position_bound(0.0), 1e-6);
    }

    #[test]
    fn test_small_threshold_disables_adaptive() {
        let config = ResamplingConfig::default();
        assert!(config.is_adaptive(config.max_rotation_error_degrees));
        assert!(!config.is_adaptive(1e-3));
        assert!(!ResamplingConfig::uniform().is_adaptive(10.0));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ResamplingConfig::default()
            .with_scale_error_percent(-1.0)
            .validate()
            .is_err());
        assert!(ResamplingConfig::default()
            .with_position_error_percent(f32::NAN)
            .validate()
            .is_err());
        assert!(ResamplingConfig::default().with_max_depth(0).validate().is_err());
        let bad_clock = TickClock {
            ticks_per_second: 10,
            ticks_per_sample: 0,
        };
        assert!(ResamplingConfig::default()
            .with_clock(bad_clock)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = ResamplingConfig::from_json(r#"{"max_rotation_error_degrees": 0.5}"#).unwrap();
        assert_eq!(config.max_rotation_error_degrees, 0.5);
        assert_eq!(config.max_scale_error_percent, 0.5);

        let json = config.to_json().unwrap();
        assert_eq!(ResamplingConfig::from_json(&json).unwrap(), config);
    }
}
