//! Keyframe curves and error-bounded adaptive resampling.
//!
//! A [`KeyFrameContainer`] stores a sparse, time-ordered set of [`KeyFrame`]s
//! and reconstructs values at arbitrary times through stepped, linear,
//! Catmull-Rom or quaternion slerp interpolation. The [`resample`] module turns
//! dense per-tick transform or scalar tracks into containers whose
//! reconstruction stays within a configured error bound, and [`codec`] writes
//! them in the binary layout consumed by the runtime.

pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod interpolation;
pub mod keyframe;
pub mod resample;
pub mod time;
pub mod transform;

pub use codec::{encode_container, read_container, write_container};
pub use config::ResamplingConfig;
pub use container::KeyFrameContainer;
pub use error::KeyframeError;
pub use interpolation::{Interpolation, InterpolationContext, Interpolator};
pub use keyframe::{DataKind, EndBehaviour, InterpolationType, KeyFrame, MAX_CHANNELS};
pub use resample::{
    resample_keys, resample_morph_weight_animation, resample_transform_animation, ResampleChannel,
    ResampleStats, Resampled, TransformAnimation,
};
pub use time::{TickClock, TickRange};
pub use transform::{detect_animated, AnimatedComponents};

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, KeyframeError>;
