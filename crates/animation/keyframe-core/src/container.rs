//! Ordered keyframe curve with lazy validation and hint-accelerated queries.

use std::cell::{Cell, Ref, RefCell};

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;
use crate::interpolation::{Interpolation, InterpolationContext};
use crate::keyframe::{DataKind, EndBehaviour, InterpolationType, KeyFrame, MAX_CHANNELS};

/// A curve of [`KeyFrame`]s with a fixed channel count and data kind.
///
/// Keys are appended in any order; before any read the container sorts them by
/// time and collapses runs of equal-time keys, keeping the first one inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "KeyFrameContainerRepr", into = "KeyFrameContainerRepr")]
pub struct KeyFrameContainer {
    keys: RefCell<Vec<KeyFrame>>,
    sorted: Cell<bool>,
    end_behaviour: EndBehaviour,
    channels: usize,
    data: DataKind,
}

impl KeyFrameContainer {
    /// Create an empty container. Scalar data takes 1..=4 channels, quaternions exactly 4.
    pub fn new(channels: usize, data: DataKind) -> Result<Self, KeyframeError> {
        data.check_channels(channels)?;
        Ok(Self {
            keys: RefCell::new(Vec::new()),
            sorted: Cell::new(true),
            end_behaviour: EndBehaviour::default(),
            channels,
            data,
        })
    }

    /// Create a container pre-populated with `keys`.
    pub fn from_keys(
        channels: usize,
        data: DataKind,
        keys: impl IntoIterator<Item = KeyFrame>,
    ) -> Result<Self, KeyframeError> {
        let mut container = Self::new(channels, data)?;
        for key in keys {
            container.insert_key(key);
        }
        Ok(container)
    }

    /// Appends a key; ordering is restored lazily on the next read.
    #[inline]
    pub fn insert_key(&mut self, key: KeyFrame) {
        self.keys.get_mut().push(key);
        self.sorted.set(false);
    }

    /// Removes and returns the key at `index` (in sorted order).
    pub fn remove_key(&mut self, index: usize) -> Result<KeyFrame, KeyframeError> {
        self.validate();
        let keys = self.keys.get_mut();
        if index >= keys.len() {
            return Err(KeyframeError::IndexOutOfRange {
                index,
                len: keys.len(),
            });
        }
        Ok(keys.remove(index))
    }

    /// Removes all keys.
    pub fn clear(&mut self) {
        self.keys.get_mut().clear();
        self.sorted.set(true);
    }

    #[inline]
    pub fn set_end_behaviour(&mut self, behaviour: EndBehaviour) {
        self.end_behaviour = behaviour;
    }

    #[inline]
    pub fn end_behaviour(&self) -> EndBehaviour {
        self.end_behaviour
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> DataKind {
        self.data
    }

    /// Number of keys after deduplication.
    pub fn key_count(&self) -> usize {
        self.keys().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.borrow().is_empty()
    }

    /// Sorted, deduplicated view of the keys.
    pub fn keys(&self) -> Ref<'_, [KeyFrame]> {
        self.validate();
        Ref::map(self.keys.borrow(), |keys| keys.as_slice())
    }

    /// Copy of the `index`th key in time order.
    pub fn get_key(&self, index: usize) -> Result<KeyFrame, KeyframeError> {
        let keys = self.keys();
        keys.get(index)
            .copied()
            .ok_or(KeyframeError::IndexOutOfRange {
                index,
                len: keys.len(),
            })
    }

    /// Time of the last key, or 0 when empty.
    pub fn length(&self) -> f32 {
        self.keys().last().map_or(0.0, |key| key.time)
    }

    /// Interpolation tag describing the whole container: the first key's tag
    /// when there is more than one key, `Linear` otherwise.
    pub fn interpolation(&self) -> InterpolationType {
        let keys = self.keys();
        if keys.len() > 1 {
            keys[0].interpolation
        } else {
            InterpolationType::Linear
        }
    }

    /// Shifts every key by `-time0`.
    pub fn offset_key_times(&mut self, time0: f32) {
        for key in self.keys.get_mut().iter_mut() {
            key.time -= time0;
        }
    }

    /// Sorts and deduplicates if keys were inserted since the last read.
    pub fn validate(&self) {
        if self.sorted.get() {
            return;
        }
        let mut keys = self.keys.borrow_mut();
        // Stable sort keeps insertion order within equal times; dedup keeps the first of a run.
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        keys.dedup_by(|later, earlier| later.time == earlier.time);
        self.sorted.set(true);
    }

    /// Writes the curve's value at `time` into `out[..channels]`.
    ///
    /// `hint` is the segment index returned by a previous call; passing it back
    /// makes monotonically increasing queries O(1). Returns the new hint.
    pub fn get_value(
        &self,
        time: f32,
        out: &mut [f32],
        hint: usize,
    ) -> Result<usize, KeyframeError> {
        let keys = self.keys();
        let channels = self.channels;
        if out.len() < channels {
            return Err(KeyframeError::InvalidChannelCount {
                channels: out.len(),
            });
        }
        let out = &mut out[..channels];

        let n = keys.len();
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(KeyframeError::EmptyContainer),
        };
        if time.is_nan() {
            return Err(KeyframeError::InvalidTime { time });
        }

        if n == 1 {
            first.get_channels(out)?;
            return Ok(0);
        }

        let hint = hint.min(n - 1);

        // pre behaviour (constant)
        if time <= first.time {
            first.get_channels(out)?;
            return Ok(0);
        }

        let mut time = time;
        if time >= last.time {
            let length = last.time;
            match self.end_behaviour {
                EndBehaviour::Constant => {
                    last.get_channels(out)?;
                    return Ok(n - 1);
                }
                EndBehaviour::Reset => time = 0.0,
                // An infinite time has no position inside a loop.
                EndBehaviour::Repeat | EndBehaviour::Oscillate if time.is_infinite() => {
                    return Err(KeyframeError::InvalidTime { time });
                }
                EndBehaviour::Repeat if length > 0.0 => time %= length,
                EndBehaviour::Oscillate if length > 0.0 => {
                    time %= 2.0 * length;
                    if time >= length {
                        time = 2.0 * length - time;
                    }
                }
                // Zero-length loop: nothing to wrap into.
                EndBehaviour::Repeat | EndBehaviour::Oscillate => time = last.time,
            }
            if time >= last.time {
                last.get_channels(out)?;
                return Ok(n - 1);
            }
            // Wrapped into the lead-in before the first key.
            if time <= first.time {
                first.get_channels(out)?;
                return Ok(0);
            }
        }

        let index = find_segment(&keys, time, hint, n - 1)
            .or_else(|| find_segment(&keys, time, 0, hint))
            .ok_or(KeyframeError::InvalidTime { time })?;

        let key0 = &keys[index];
        let key1 = &keys[index + 1];
        let key0prev = index.checked_sub(1).map(|i| &keys[i]);
        let key1next = keys.get(index + 2);

        let ctx = InterpolationContext::at_time(key0prev, key0, key1, key1next, time, channels)?;
        Interpolation::select(key1.interpolation, self.data).interpolate(&ctx, out)?;
        Ok(index)
    }

    /// Convenience wrapper around [`get_value`](Self::get_value) returning a fixed array.
    pub fn value_at(&self, time: f32) -> Result<[f32; MAX_CHANNELS], KeyframeError> {
        let mut out = [0.0; MAX_CHANNELS];
        self.get_value(time, &mut out, 0)?;
        Ok(out)
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, KeyframeError> {
        serde_json::to_string_pretty(self).map_err(KeyframeError::from)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, KeyframeError> {
        serde_json::from_str(json).map_err(KeyframeError::from)
    }
}

/// Linear scan for `i` in `begin..end` with `keys[i].time <= time < keys[i+1].time`.
fn find_segment(keys: &[KeyFrame], time: f32, begin: usize, end: usize) -> Option<usize> {
    (begin..end).find(|&i| keys[i].time <= time && time < keys[i + 1].time)
}

#[derive(Serialize, Deserialize)]
struct KeyFrameContainerRepr {
    channels: usize,
    data: DataKind,
    #[serde(default)]
    end_behaviour: EndBehaviour,
    keys: Vec<KeyFrame>,
}

impl From<KeyFrameContainer> for KeyFrameContainerRepr {
    fn from(container: KeyFrameContainer) -> Self {
        container.validate();
        Self {
            channels: container.channels,
            data: container.data,
            end_behaviour: container.end_behaviour,
            keys: container.keys.into_inner(),
        }
    }
}

impl TryFrom<KeyFrameContainerRepr> for KeyFrameContainer {
    type Error = KeyframeError;

    fn try_from(repr: KeyFrameContainerRepr) -> Result<Self, Self::Error> {
        let mut container = KeyFrameContainer::from_keys(repr.channels, repr.data, repr.keys)?;
        container.set_end_behaviour(repr.end_behaviour);
        Ok(container)
    }
}
