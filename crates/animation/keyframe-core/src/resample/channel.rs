//! Channel kinds the resampler understands and their reconstruction error metrics.

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::keyframe::{DataKind, MAX_CHANNELS};
use crate::transform;

/// One kind of resampled channel: how to turn a dense sample into key values
/// and how far a reconstructed value lies from that sample.
pub trait ResampleChannel {
    /// Dense ground-truth sample type
    type Sample;
    /// Channel count of the produced container
    const CHANNELS: usize;
    const DATA: DataKind;

    fn name(&self) -> &'static str;

    /// Key values for `sample`; slots past [`Self::CHANNELS`] are zero.
    fn key_values(&self, sample: &Self::Sample) -> [f32; MAX_CHANNELS];

    /// Reconstruction error of `reconstructed` against `reference`.
    fn error(&self, reference: &Self::Sample, reconstructed: &[f32; MAX_CHANNELS]) -> f32;
}

#[inline]
fn vec3(values: &[f32; MAX_CHANNELS]) -> Vector3<f32> {
    Vector3::new(values[0], values[1], values[2])
}

#[inline]
fn pack3(v: &Vector3<f32>) -> [f32; MAX_CHANNELS] {
    [v.x, v.y, v.z, 0.0]
}

/// Translation; Euclidean distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionChannel;

impl ResampleChannel for PositionChannel {
    type Sample = Matrix4<f32>;
    const CHANNELS: usize = 3;
    const DATA: DataKind = DataKind::Scalar;

    fn name(&self) -> &'static str {
        "position"
    }

    fn key_values(&self, sample: &Matrix4<f32>) -> [f32; MAX_CHANNELS] {
        pack3(&transform::translation(sample))
    }

    fn error(&self, reference: &Matrix4<f32>, reconstructed: &[f32; MAX_CHANNELS]) -> f32 {
        (vec3(reconstructed) - transform::translation(reference)).norm()
    }
}

/// Orthonormalized rotation as an `(x, y, z, w)` quaternion.
///
/// The error is the largest angle (radians) between corresponding basis
/// columns of the reference and reconstructed rotation matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationChannel;

impl ResampleChannel for RotationChannel {
    type Sample = Matrix4<f32>;
    const CHANNELS: usize = 4;
    const DATA: DataKind = DataKind::Quaternion;

    fn name(&self) -> &'static str {
        "rotation"
    }

    fn key_values(&self, sample: &Matrix4<f32>) -> [f32; MAX_CHANNELS] {
        transform::quaternion_channels(&transform::rotation(sample))
    }

    fn error(&self, reference: &Matrix4<f32>, reconstructed: &[f32; MAX_CHANNELS]) -> f32 {
        let reference =
            transform::orthonormalize(&transform::basis(reference)).unwrap_or_else(Matrix3::identity);
        let cmp = transform::quaternion_from_channels(reconstructed)
            .to_rotation_matrix()
            .into_inner();
        (0..3)
            .map(|i| {
                cmp.column(i)
                    .dot(&reference.column(i))
                    .clamp(-1.0, 1.0)
                    .acos()
                    .abs()
            })
            .fold(0.0, f32::max)
    }
}

/// Per-axis scale; Euclidean distance relative to the reference magnitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleChannel;

impl ResampleChannel for ScaleChannel {
    type Sample = Matrix4<f32>;
    const CHANNELS: usize = 3;
    const DATA: DataKind = DataKind::Scalar;

    fn name(&self) -> &'static str {
        "scale"
    }

    fn key_values(&self, sample: &Matrix4<f32>) -> [f32; MAX_CHANNELS] {
        pack3(&transform::axis_scales(sample))
    }

    fn error(&self, reference: &Matrix4<f32>, reconstructed: &[f32; MAX_CHANNELS]) -> f32 {
        let reference = transform::axis_scales(reference);
        let err = (vec3(reconstructed) - reference).norm();
        let magnitude = reference.norm();
        if magnitude > f32::MIN_POSITIVE {
            err / magnitude
        } else {
            err
        }
    }
}

/// Single float (morph weight, visibility, ...); absolute difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarChannel;

impl ResampleChannel for ScalarChannel {
    type Sample = f32;
    const CHANNELS: usize = 1;
    const DATA: DataKind = DataKind::Scalar;

    fn name(&self) -> &'static str {
        "scalar"
    }

    fn key_values(&self, sample: &f32) -> [f32; MAX_CHANNELS] {
        [*sample, 0.0, 0.0, 0.0]
    }

    fn error(&self, reference: &f32, reconstructed: &[f32; MAX_CHANNELS]) -> f32 {
        (reference - reconstructed[0]).abs()
    }
}
