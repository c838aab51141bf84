//! Error types for keyframe evaluation and resampling

use serde::{Deserialize, Serialize};

use crate::keyframe::DataKind;

/// Every failure the container, the interpolation table and the resampler can report.
///
/// None of these are retried internally: they describe programmer or data errors
/// that the calling pipeline stage should surface immediately.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum KeyframeError {
    /// A query was made against a container with no keys
    #[error("Keyframe container is empty")]
    EmptyContainer,

    /// Query time that cannot be placed on the curve (NaN)
    #[error("Invalid query time: {time}")]
    InvalidTime { time: f32 },

    /// Key index outside `0..len`
    #[error("Key index {index} out of range (container has {len} keys)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The located segment is too short to derive a local parameter from
    #[error("Degenerate segment [{start}, {end}]: length below minimum")]
    DegenerateSegment { start: f32, end: f32 },

    /// No interpolation strategy serves this data kind / channel shape
    #[error("Unsupported data kind {data:?} with {channels} channels")]
    UnsupportedDataKind { data: DataKind, channels: usize },

    /// Channel count outside 1..=4, or an output buffer too small for the container
    #[error("Invalid channel count: {channels}")]
    InvalidChannelCount { channels: usize },

    /// Resampling range with start after end
    #[error("Invalid tick range [{start}, {end}]")]
    InvalidRange { start: i64, end: i64 },

    /// A tick maps outside of the dense sample array
    #[error("Dense frame {frame} out of range (array has {len} samples)")]
    SampleOutOfRange { frame: usize, len: usize },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl KeyframeError {
    /// Only stream failures may succeed on a second attempt.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyContainer | Self::InvalidTime { .. } | Self::IndexOutOfRange { .. } => {
                "container"
            }
            Self::DegenerateSegment { .. }
            | Self::UnsupportedDataKind { .. }
            | Self::InvalidChannelCount { .. } => "interpolation",
            Self::InvalidRange { .. } | Self::SampleOutOfRange { .. } => "resampling",
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } | Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for KeyframeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KeyframeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        let io = KeyframeError::Io {
            reason: "broken pipe".to_string(),
        };
        assert!(io.is_recoverable());

        assert!(!KeyframeError::EmptyContainer.is_recoverable());
        assert!(!KeyframeError::DegenerateSegment {
            start: 1.0,
            end: 1.0
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(KeyframeError::EmptyContainer.category(), "container");
        assert_eq!(
            KeyframeError::IndexOutOfRange { index: 3, len: 2 }.category(),
            "container"
        );
        assert_eq!(
            KeyframeError::UnsupportedDataKind {
                data: DataKind::Quaternion,
                channels: 3
            }
            .category(),
            "interpolation"
        );
        assert_eq!(
            KeyframeError::SampleOutOfRange { frame: 9, len: 4 }.category(),
            "resampling"
        );
    }

    #[test]
    fn test_display_mentions_index() {
        let err = KeyframeError::IndexOutOfRange { index: 7, len: 2 };
        assert_eq!(
            err.to_string(),
            "Key index 7 out of range (container has 2 keys)"
        );
    }

    #[test]
    fn test_serialization() {
        let error = KeyframeError::InvalidConfig {
            reason: "negative bound".to_string(),
        };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: KeyframeError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }
}
