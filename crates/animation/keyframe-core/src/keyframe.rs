//! Keyframe value type and the small enums describing a curve's shape.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;

/// Maximum number of channels stored in a single key.
pub const MAX_CHANNELS: usize = 4;

/// Per-key interpolation method. The tag of a segment's *end* key selects the
/// strategy used across that segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterpolationType {
    /// Zero-order hold
    Stepped,
    #[default]
    Linear,
    /// Hermite curve with Catmull-Rom style tangents (scalar data only)
    CatmullRom,
}

impl InterpolationType {
    /// Wire tag of this interpolation method.
    #[inline]
    pub fn as_tag(self) -> i32 {
        match self {
            Self::Stepped => 0,
            Self::Linear => 1,
            Self::CatmullRom => 2,
        }
    }
}

impl TryFrom<i32> for InterpolationType {
    type Error = KeyframeError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Stepped),
            1 => Ok(Self::Linear),
            2 => Ok(Self::CatmullRom),
            other => Err(KeyframeError::Serialization {
                reason: format!("unknown interpolation tag {other}"),
            }),
        }
    }
}

/// Kind of data a container stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataKind {
    /// Independent channels, 1..=4 of them
    #[default]
    Scalar,
    /// Unit quaternion (x, y, z, w); always 4 channels
    Quaternion,
}

impl DataKind {
    /// Checks that `channels` is a legal channel count for this kind.
    pub fn check_channels(self, channels: usize) -> Result<(), KeyframeError> {
        match self {
            Self::Scalar if (1..=MAX_CHANNELS).contains(&channels) => Ok(()),
            Self::Scalar => Err(KeyframeError::InvalidChannelCount { channels }),
            Self::Quaternion if channels == 4 => Ok(()),
            Self::Quaternion => Err(KeyframeError::UnsupportedDataKind {
                data: self,
                channels,
            }),
        }
    }
}

/// Evaluation policy for times at or past the last key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndBehaviour {
    /// Jump back to the beginning
    Reset,
    /// Hold the last key
    Constant,
    /// Loop
    #[default]
    Repeat,
    /// Ping-pong between the beginning and the end
    Oscillate,
}

/// A single control point of a curve.
///
/// Ordering and equality look at `time` only: two keys at the same time are
/// interchangeable for sorting even when their channel values differ. Use
/// [`KeyFrame::same_values`] to compare payloads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KeyFrame {
    /// Time of the key in seconds
    pub time: f32,
    pub interpolation: InterpolationType,
    channels: [f32; MAX_CHANNELS],
}

impl KeyFrame {
    /// Creates a key from up to [`MAX_CHANNELS`] values; unused channels are zero.
    pub fn new(
        time: f32,
        interpolation: InterpolationType,
        values: &[f32],
    ) -> Result<Self, KeyframeError> {
        let mut key = Self {
            time,
            interpolation,
            channels: [0.0; MAX_CHANNELS],
        };
        key.set_channels(values)?;
        Ok(key)
    }

    /// Sets the value of the `i`th channel.
    pub fn set_channel(&mut self, i: usize, value: f32) -> Result<(), KeyframeError> {
        let slot = self
            .channels
            .get_mut(i)
            .ok_or(KeyframeError::IndexOutOfRange {
                index: i,
                len: MAX_CHANNELS,
            })?;
        *slot = value;
        Ok(())
    }

    /// Overwrites the first `values.len()` channels.
    pub fn set_channels(&mut self, values: &[f32]) -> Result<(), KeyframeError> {
        if values.len() > MAX_CHANNELS {
            return Err(KeyframeError::InvalidChannelCount {
                channels: values.len(),
            });
        }
        self.channels[..values.len()].copy_from_slice(values);
        Ok(())
    }

    /// Value of the `i`th channel.
    pub fn channel(&self, i: usize) -> Result<f32, KeyframeError> {
        self.channels
            .get(i)
            .copied()
            .ok_or(KeyframeError::IndexOutOfRange {
                index: i,
                len: MAX_CHANNELS,
            })
    }

    /// Copies the first `out.len()` channels into `out`.
    pub fn get_channels(&self, out: &mut [f32]) -> Result<(), KeyframeError> {
        if out.len() > MAX_CHANNELS {
            return Err(KeyframeError::InvalidChannelCount {
                channels: out.len(),
            });
        }
        out.copy_from_slice(&self.channels[..out.len()]);
        Ok(())
    }

    /// All channel slots, including unused trailing ones.
    #[inline]
    pub fn channels(&self) -> &[f32; MAX_CHANNELS] {
        &self.channels
    }

    /// True when the first `count` channels are bitwise-equal in value.
    pub fn same_values(&self, other: &KeyFrame, count: usize) -> bool {
        let count = count.min(MAX_CHANNELS);
        self.channels[..count] == other.channels[..count]
    }
}

impl PartialEq for KeyFrame {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl PartialOrd for KeyFrame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.time.partial_cmp(&other.time)
    }
}
