use crate::error::KeyframeError;
use crate::keyframe::{KeyFrame, MAX_CHANNELS};

/// Segments shorter than this (seconds) cannot be parameterized.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// The four keys around a query plus the local parameter within `[key0, key1]`.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationContext<'a> {
    /// Key before `key0`, if any
    pub key0prev: Option<&'a KeyFrame>,
    pub key0: &'a KeyFrame,
    pub key1: &'a KeyFrame,
    /// Key after `key1`, if any
    pub key1next: Option<&'a KeyFrame>,
    /// Local parameter in `[0, 1)`
    pub t: f32,
    /// Segment length in seconds
    pub length: f32,
    /// Number of channels to produce
    pub channels: usize,
}

impl<'a> InterpolationContext<'a> {
    /// Builds the context for `time`, which must lie within `[key0.time, key1.time)`.
    pub fn at_time(
        key0prev: Option<&'a KeyFrame>,
        key0: &'a KeyFrame,
        key1: &'a KeyFrame,
        key1next: Option<&'a KeyFrame>,
        time: f32,
        channels: usize,
    ) -> Result<Self, KeyframeError> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(KeyframeError::InvalidChannelCount { channels });
        }
        let length = key1.time - key0.time;
        if !(length > MIN_SEGMENT_LENGTH) {
            return Err(KeyframeError::DegenerateSegment {
                start: key0.time,
                end: key1.time,
            });
        }
        Ok(Self {
            key0prev,
            key0,
            key1,
            key1next,
            t: (time - key0.time) / length,
            length,
            channels,
        })
    }

    /// Output buffer check shared by every strategy.
    #[inline]
    pub(crate) fn check_output(&self, out: &[f32]) -> Result<(), KeyframeError> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(KeyframeError::InvalidChannelCount {
                channels: self.channels,
            });
        }
        if out.len() < self.channels {
            return Err(KeyframeError::InvalidChannelCount {
                channels: out.len(),
            });
        }
        Ok(())
    }
}
