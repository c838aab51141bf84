//! Error-bounded adaptive resampling of dense tracks into keyframe containers.
//!
//! The driver seeds a container with keys at both ends of a tick range and then
//! bisects: every range whose reconstruction exceeds the error bound at some
//! sampled tick receives a key at its tick-aligned midpoint (taken from the dense
//! reference) and both halves are queued for another pass. Work is kept on an
//! explicit stack of `(range, depth)` entries capped at `max_depth`.

pub mod channel;

pub use channel::*;

use log::{debug, info, trace, warn};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::config::ResamplingConfig;
use crate::container::KeyFrameContainer;
use crate::error::KeyframeError;
use crate::keyframe::{InterpolationType, KeyFrame, MAX_CHANNELS};
use crate::time::{TickClock, TickRange};
use crate::transform::{self, AnimatedComponents};

/// Interpolation tag carried by every resampled key.
pub const RESAMPLED_INTERPOLATION: InterpolationType = InterpolationType::Linear;

/// Counters collected while building a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResampleStats {
    /// Keys in the finished container
    pub keys: usize,
    /// Midpoint keys inserted
    pub subdivisions: usize,
    /// Deepest work-queue entry processed
    pub max_depth_reached: usize,
    /// Ranges still over the bound when the depth cap stopped them
    pub depth_limited: usize,
}

/// A finished container together with how it was produced.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub container: KeyFrameContainer,
    pub stats: ResampleStats,
}

impl Resampled {
    fn new(container: KeyFrameContainer, mut stats: ResampleStats) -> Self {
        stats.keys = container.key_count();
        Self { container, stats }
    }

    /// Shifts every key so that `time0` becomes time zero.
    pub fn offset_key_times(&mut self, time0: f32) {
        self.container.offset_key_times(time0);
    }
}

/// Key for the dense sample at `ticks`.
fn key_at<C: ResampleChannel>(
    channel: &C,
    samples: &[C::Sample],
    clock: &TickClock,
    ticks: i64,
) -> Result<KeyFrame, KeyframeError> {
    let frame = clock.checked_frame(ticks, samples.len())?;
    let values = channel.key_values(&samples[frame]);
    KeyFrame::new(
        clock.to_seconds(ticks),
        RESAMPLED_INTERPOLATION,
        &values[..C::CHANNELS],
    )
}

fn check_bound(max_err: f32) -> Result<(), KeyframeError> {
    if !max_err.is_finite() || max_err < 0.0 {
        return Err(KeyframeError::InvalidConfig {
            reason: format!("error bound must be finite and non-negative, got {max_err}"),
        });
    }
    Ok(())
}

/// Drops the second of exactly two keys when both hold the same values.
fn collapse_constant(container: &mut KeyFrameContainer) -> Result<(), KeyframeError> {
    let redundant = {
        let keys = container.keys();
        keys.len() == 2 && keys[0].same_values(&keys[1], container.channels())
    };
    if redundant {
        container.remove_key(1)?;
    }
    Ok(())
}

/// Adaptive resampling of `samples` over `range` so that every sampled tick
/// reconstructs within `max_err` of its reference.
///
/// `samples[i]` is the ground truth at tick `i * ticks_per_sample`.
pub fn resample_keys<C: ResampleChannel>(
    channel: &C,
    samples: &[C::Sample],
    range: TickRange,
    max_err: f32,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    config.validate()?;
    check_bound(max_err)?;
    let clock = config.clock;

    let mut container = KeyFrameContainer::new(C::CHANNELS, C::DATA)?;
    container.insert_key(key_at(channel, samples, &clock, range.start)?);
    container.insert_key(key_at(channel, samples, &clock, range.end)?);

    let mut stats = ResampleStats::default();
    let mut work = vec![(range, 0usize)];
    let mut values = [0.0f32; MAX_CHANNELS];

    while let Some((current, depth)) = work.pop() {
        stats.max_depth_reached = stats.max_depth_reached.max(depth);
        let mut hint = 0;
        for ticks in current.ticks(&clock) {
            let frame = clock.checked_frame(ticks, samples.len())?;
            hint = container.get_value(clock.to_seconds(ticks), &mut values, hint)?;
            let err = channel.error(&samples[frame], &values);
            if !(err > max_err) {
                continue;
            }

            if current.span() > clock.ticks_per_sample {
                let mid = current.midpoint(&clock);
                if mid <= current.start || mid >= current.end {
                    warn!(
                        "{}: midpoint {} not inside [{}, {}], range left unsplit",
                        channel.name(),
                        mid,
                        current.start,
                        current.end
                    );
                } else if depth >= config.max_depth {
                    warn!(
                        "{}: depth cap {} reached in [{}, {}] (error {})",
                        channel.name(),
                        config.max_depth,
                        current.start,
                        current.end,
                        err
                    );
                    stats.depth_limited += 1;
                } else {
                    trace!(
                        "{}: error {} at tick {}, splitting [{}, {}] at {}",
                        channel.name(),
                        err,
                        ticks,
                        current.start,
                        current.end,
                        mid
                    );
                    container.insert_key(key_at(channel, samples, &clock, mid)?);
                    stats.subdivisions += 1;
                    let (lower, upper) = current.split_at(mid);
                    work.push((upper, depth + 1));
                    work.push((lower, depth + 1));
                }
            }
            break;
        }
    }

    collapse_constant(&mut container)?;
    Ok(Resampled::new(container, stats))
}

/// Uniform output: one key per sampled tick of `range`, ends included.
pub fn add_keys<C: ResampleChannel>(
    channel: &C,
    samples: &[C::Sample],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    config.validate()?;
    let clock = config.clock;
    let mut container = KeyFrameContainer::new(C::CHANNELS, C::DATA)?;
    for ticks in (range.start..=range.end).step_by(clock.ticks_per_sample as usize) {
        container.insert_key(key_at(channel, samples, &clock, ticks)?);
    }
    Ok(Resampled::new(container, ResampleStats::default()))
}

/// Single key at time zero holding `sample`.
fn constant_key<C: ResampleChannel>(
    channel: &C,
    sample: Option<&C::Sample>,
) -> Result<Resampled, KeyframeError> {
    let sample = sample.ok_or(KeyframeError::SampleOutOfRange { frame: 0, len: 0 })?;
    let values = channel.key_values(sample);
    let key = KeyFrame::new(0.0, RESAMPLED_INTERPOLATION, &values[..C::CHANNELS])?;
    let container = KeyFrameContainer::from_keys(C::CHANNELS, C::DATA, [key])?;
    Ok(Resampled::new(container, ResampleStats::default()))
}

/// Position track with the bound derived from the track's bounding box.
pub fn resample_position_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    let max_err = config.position_bound(transform::bounding_diagonal(track));
    debug!("max position error = {max_err}");
    resample_keys(&PositionChannel, track, range, max_err, config)
}

/// Rotation track with the bound `max_rotation_error_degrees`.
pub fn resample_rotation_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    debug!(
        "max rotation error = {} degrees",
        config.max_rotation_error_degrees
    );
    resample_keys(&RotationChannel, track, range, config.rotation_bound(), config)
}

/// Scale track with the relative bound `max_scale_error_percent`.
pub fn resample_scale_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    debug!("max scale error = {}%", config.max_scale_error_percent);
    resample_keys(&ScaleChannel, track, range, config.scale_bound(), config)
}

/// Scalar track with an explicit absolute bound.
pub fn resample_float_animation(
    frames: &[f32],
    range: TickRange,
    max_err: f32,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    debug!("max scalar error = {max_err}");
    resample_keys(&ScalarChannel, frames, range, max_err, config)
}

pub fn add_position_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    add_keys(&PositionChannel, track, range, config)
}

pub fn add_rotation_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    add_keys(&RotationChannel, track, range, config)
}

pub fn add_scale_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    add_keys(&ScaleChannel, track, range, config)
}

pub fn add_float_animation(
    frames: &[f32],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    add_keys(&ScalarChannel, frames, range, config)
}

/// Morph weights in `[0, 1]`: adaptive with `max_morph_error_percent` unless
/// disabled, then shifted so `range.start` is time zero.
pub fn resample_morph_weight_animation(
    weights: &[f32],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<Resampled, KeyframeError> {
    let mut resampled = if config.is_adaptive(config.max_morph_error_percent) {
        resample_float_animation(weights, range, config.morph_bound(), config)?
    } else {
        add_float_animation(weights, range, config)?
    };
    resampled.offset_key_times(config.clock.to_seconds(range.start));
    Ok(resampled)
}

/// Position, rotation and scale containers of one dense transform track.
#[derive(Debug, Clone)]
pub struct TransformAnimation {
    pub animated: AnimatedComponents,
    pub position: Resampled,
    pub rotation: Resampled,
    pub scale: Resampled,
}

/// Splits a dense transform track into its three channel containers.
///
/// Animated components are resampled (or uniformly keyed when the config
/// disables it for that kind) and shifted so that `range.start` is time zero.
/// Static components get a single key at time zero from frame 0.
pub fn resample_transform_animation(
    track: &[Matrix4<f32>],
    range: TickRange,
    config: &ResamplingConfig,
) -> Result<TransformAnimation, KeyframeError> {
    config.validate()?;
    let animated = transform::detect_animated(track);
    let time0 = config.clock.to_seconds(range.start);
    let first = track.first();

    let position = if animated.position {
        let mut position = if config.is_adaptive(config.max_position_error_percent) {
            resample_position_animation(track, range, config)?
        } else {
            add_position_animation(track, range, config)?
        };
        position.offset_key_times(time0);
        position
    } else {
        constant_key(&PositionChannel, first)?
    };

    let rotation = if animated.rotation {
        let mut rotation = if config.is_adaptive(config.max_rotation_error_degrees) {
            resample_rotation_animation(track, range, config)?
        } else {
            add_rotation_animation(track, range, config)?
        };
        rotation.offset_key_times(time0);
        rotation
    } else {
        constant_key(&RotationChannel, first)?
    };

    let scale = if animated.scale {
        let mut scale = if config.is_adaptive(config.max_scale_error_percent) {
            resample_scale_animation(track, range, config)?
        } else {
            add_scale_animation(track, range, config)?
        };
        scale.offset_key_times(time0);
        scale
    } else {
        constant_key(&ScaleChannel, first)?
    };

    info!(
        "resampled pos/rot/scl: {}/{}/{} keys, {}/{}/{} subdivisions",
        position.stats.keys,
        rotation.stats.keys,
        scale.stats.keys,
        position.stats.subdivisions,
        rotation.stats.subdivisions,
        scale.stats.subdivisions
    );

    Ok(TransformAnimation {
        animated,
        position,
        rotation,
        scale,
    })
}
