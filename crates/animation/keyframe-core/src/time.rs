//! Integer tick clock of the authoring timeline.
//!
//! Dense tracks are sampled once every `ticks_per_sample` ticks starting at
//! tick 0. Keys store seconds; ranges and subdivision work on ticks so that
//! midpoints always land on a sampled frame.

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;

/// Fixed mapping between ticks, seconds and dense frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickClock {
    pub ticks_per_second: i64,
    pub ticks_per_sample: i64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self {
            ticks_per_second: 4800,
            ticks_per_sample: 160,
        }
    }
}

impl TickClock {
    #[inline]
    pub fn new(ticks_per_second: i64, ticks_per_sample: i64) -> Result<Self, KeyframeError> {
        let clock = Self {
            ticks_per_second,
            ticks_per_sample,
        };
        clock.validate()?;
        Ok(clock)
    }

    /// Both rates positive and at most one sample per tick-second.
    pub fn validate(&self) -> Result<(), KeyframeError> {
        if self.ticks_per_second <= 0 || self.ticks_per_sample <= 0 {
            return Err(KeyframeError::InvalidConfig {
                reason: format!(
                    "clock rates must be positive (ticks_per_second={}, ticks_per_sample={})",
                    self.ticks_per_second, self.ticks_per_sample
                ),
            });
        }
        if self.ticks_per_sample > self.ticks_per_second {
            return Err(KeyframeError::InvalidConfig {
                reason: format!(
                    "ticks_per_sample ({}) exceeds ticks_per_second ({})",
                    self.ticks_per_sample, self.ticks_per_second
                ),
            });
        }
        Ok(())
    }

    /// Ticks to seconds
    #[inline]
    pub fn to_seconds(&self, ticks: i64) -> f32 {
        (ticks as f64 / self.ticks_per_second as f64) as f32
    }

    /// Sample rate in frames per second
    #[inline]
    pub fn samples_per_second(&self) -> f32 {
        (self.ticks_per_second as f64 / self.ticks_per_sample as f64) as f32
    }

    /// Index of the dense frame sampled at `ticks`.
    #[inline]
    pub fn frame_index(&self, ticks: i64) -> i64 {
        ticks / self.ticks_per_sample
    }

    /// Dense frame index for `ticks`, checked against a sample array of `len` frames.
    pub fn checked_frame(&self, ticks: i64, len: usize) -> Result<usize, KeyframeError> {
        let frame = self.frame_index(ticks);
        match usize::try_from(frame) {
            Ok(frame) if frame < len => Ok(frame),
            _ => Err(KeyframeError::SampleOutOfRange {
                frame: frame.max(0) as usize,
                len,
            }),
        }
    }

    /// Rounds `ticks` to the nearest sampled tick.
    #[inline]
    pub fn align(&self, ticks: i64) -> i64 {
        let d = self.ticks_per_sample;
        ((ticks + d / 2) / d) * d
    }

    /// Tick of dense frame `frame`.
    #[inline]
    pub fn frame_ticks(&self, frame: usize) -> i64 {
        frame as i64 * self.ticks_per_sample
    }
}

/// Closed tick interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub start: i64,
    pub end: i64,
}

impl TickRange {
    /// Create a new tick range
    #[inline]
    pub fn new(start: i64, end: i64) -> Result<Self, KeyframeError> {
        if start > end {
            return Err(KeyframeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering the first `frames` dense samples.
    pub fn from_frames(clock: &TickClock, frames: usize) -> Result<Self, KeyframeError> {
        if frames == 0 {
            return Err(KeyframeError::InvalidRange { start: 0, end: -1 });
        }
        Ok(Self {
            start: 0,
            end: clock.frame_ticks(frames - 1),
        })
    }

    #[inline]
    pub fn span(&self) -> i64 {
        self.end - self.start
    }

    /// Check if a tick is within this range (inclusive)
    #[inline]
    pub fn contains(&self, ticks: i64) -> bool {
        ticks >= self.start && ticks <= self.end
    }

    /// Tick-aligned midpoint.
    #[inline]
    pub fn midpoint(&self, clock: &TickClock) -> i64 {
        clock.align((self.start + self.end) / 2)
    }

    /// Splits at `mid` into `[start, mid]` and `[mid, end]`.
    #[inline]
    pub fn split_at(&self, mid: i64) -> (TickRange, TickRange) {
        (
            TickRange {
                start: self.start,
                end: mid,
            },
            TickRange {
                start: mid,
                end: self.end,
            },
        )
    }

    /// Sampled ticks from `start` while below `end`.
    pub fn ticks(&self, clock: &TickClock) -> impl Iterator<Item = i64> {
        let end = self.end;
        (self.start..end).step_by(clock.ticks_per_sample as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clock() {
        let clock = TickClock::default();
        assert_eq!(clock.to_seconds(4800), 1.0);
        assert_eq!(clock.to_seconds(2400), 0.5);
        assert_eq!(clock.samples_per_second(), 30.0);
        assert_eq!(clock.frame_index(320), 2);
        assert_eq!(clock.frame_ticks(3), 480);
    }

    #[test]
    fn test_align_rounds_to_nearest_sample() {
        let clock = TickClock::default();
        assert_eq!(clock.align(0), 0);
        assert_eq!(clock.align(79), 0);
        assert_eq!(clock.align(80), 160);
        assert_eq!(clock.align(250), 320);
        assert_eq!(clock.align(320), 320);
    }

    #[test]
    fn test_invalid_clock() {
        assert!(TickClock::new(0, 160).is_err());
        assert!(TickClock::new(4800, -1).is_err());
        assert!(TickClock::new(100, 160).is_err());
        assert!(TickClock::new(100, 1).is_ok());
    }

    #[test]
    fn test_checked_frame() {
        let clock = TickClock::new(100, 10).unwrap();
        assert_eq!(clock.checked_frame(30, 4).unwrap(), 3);
        assert_eq!(
            clock.checked_frame(40, 4),
            Err(KeyframeError::SampleOutOfRange { frame: 4, len: 4 })
        );
        assert!(clock.checked_frame(-10, 4).is_err());
    }

    #[test]
    fn test_tick_range() {
        let clock = TickClock::default();
        assert_eq!(
            TickRange::new(10, 5),
            Err(KeyframeError::InvalidRange { start: 10, end: 5 })
        );
        let range = TickRange::new(0, 640).unwrap();
        assert_eq!(range.span(), 640);
        assert!(range.contains(640));
        assert_eq!(range.midpoint(&clock), 320);
        let ticks: Vec<i64> = range.ticks(&clock).collect();
        assert_eq!(ticks, vec![0, 160, 320, 480]);

        let (a, b) = range.split_at(320);
        assert_eq!((a.start, a.end, b.start, b.end), (0, 320, 320, 640));
    }

    #[test]
    fn test_range_from_frames() {
        let clock = TickClock::default();
        let range = TickRange::from_frames(&clock, 5).unwrap();
        assert_eq!((range.start, range.end), (0, 640));
        assert!(TickRange::from_frames(&clock, 0).is_err());
    }
}
