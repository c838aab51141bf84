//! Interpolation strategies:
//! - stepped (zero-order hold)
//! - linear (component-wise)
//! - Catmull-Rom (Hermite basis over per-key tangents, scalar data)
//! - quaternion slerp with shortest-arc correction

use nalgebra::{Quaternion, UnitQuaternion};

use super::context::InterpolationContext;
use super::tangent;
use crate::error::KeyframeError;

/// A pure function from the keys around a segment to interpolated channel values.
pub trait Interpolator: Send + Sync {
    /// Get the name of this interpolation function
    fn name(&self) -> &'static str;

    /// Writes `ctx.channels` values into the front of `out`.
    fn interpolate(
        &self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError>;
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn dot4(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(&q, &q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for c in q.iter_mut() {
            *c *= inv_len;
        }
    }
    q
}

/// Spherical interpolation between two (x, y, z, w) quaternions along the shorter arc.
/// The result is renormalized.
pub fn slerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(&a, &b) < 0.0 {
        for c in b.iter_mut() {
            *c = -*c;
        }
    }
    let qa = UnitQuaternion::try_new(Quaternion::new(a[3], a[0], a[1], a[2]), f32::EPSILON);
    let qb = UnitQuaternion::try_new(Quaternion::new(b[3], b[0], b[1], b[2]), f32::EPSILON);
    let slerped = match (qa, qb) {
        (Some(qa), Some(qb)) => qa
            .try_slerp(&qb, t, f32::EPSILON)
            .map(|q| [q.i, q.j, q.k, q.w]),
        _ => None,
    };
    // Degenerate inputs fall back to a normalized lerp.
    let raw = slerped.unwrap_or([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]);
    normalize4(raw)
}

/// Holds `key0`'s values across the whole segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteppedInterpolation;

impl Interpolator for SteppedInterpolation {
    fn name(&self) -> &'static str {
        "stepped"
    }

    fn interpolate(
        &self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError> {
        ctx.check_output(out)?;
        ctx.key0.get_channels(&mut out[..ctx.channels])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolation;

impl Interpolator for LinearInterpolation {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn interpolate(
        &self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError> {
        ctx.check_output(out)?;
        let a = ctx.key0.channels();
        let b = ctx.key1.channels();
        for (i, value) in out[..ctx.channels].iter_mut().enumerate() {
            *value = lerp_f32(a[i], b[i], ctx.t);
        }
        Ok(())
    }
}

/// Hermite interpolation with tangents from [`tangent::outgoing`] and [`tangent::incoming`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CatmullRomInterpolation;

impl Interpolator for CatmullRomInterpolation {
    fn name(&self) -> &'static str {
        "catmullrom"
    }

    fn interpolate(
        &self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError> {
        ctx.check_output(out)?;
        let tan_out = tangent::outgoing(ctx);
        let tan_in = tangent::incoming(ctx);

        let t = ctx.t;
        let t2 = t * t;
        let t3 = t2 * t;
        let z = 3.0 * t2 - 2.0 * t3;
        let h1 = 1.0 - z;
        let h2 = z;
        let h3 = t3 - 2.0 * t2 + t;
        let h4 = t3 - t2;

        let v0 = ctx.key0.channels();
        let v1 = ctx.key1.channels();
        for (i, value) in out[..ctx.channels].iter_mut().enumerate() {
            *value = h1 * v0[i] + h2 * v1[i] + h3 * tan_out[i] + h4 * tan_in[i];
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuaternionSlerpInterpolation;

impl Interpolator for QuaternionSlerpInterpolation {
    fn name(&self) -> &'static str {
        "quaternion_slerp"
    }

    fn interpolate(
        &self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError> {
        ctx.check_output(out)?;
        if ctx.channels != 4 {
            return Err(KeyframeError::UnsupportedDataKind {
                data: crate::keyframe::DataKind::Quaternion,
                channels: ctx.channels,
            });
        }
        let q = slerp_quat(*ctx.key0.channels(), *ctx.key1.channels(), ctx.t);
        out[..4].copy_from_slice(&q);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{InterpolationType, KeyFrame};
    use approx::assert_abs_diff_eq;

    fn keys(v0: &[f32], v1: &[f32]) -> (KeyFrame, KeyFrame) {
        (
            KeyFrame::new(0.0, InterpolationType::Linear, v0).unwrap(),
            KeyFrame::new(2.0, InterpolationType::Linear, v1).unwrap(),
        )
    }

    #[test]
    fn test_stepped_ignores_t() {
        let (k0, k1) = keys(&[1.0, 2.0], &[5.0, 6.0]);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 1.9, 2).unwrap();
        let mut out = [0.0; 2];
        SteppedInterpolation.interpolate(&ctx, &mut out).unwrap();
        assert_eq!(out, [1.0, 2.0]);
    }

    #[test]
    fn test_linear_midpoint() {
        let (k0, k1) = keys(&[0.0, 10.0, -4.0], &[10.0, 20.0, 4.0]);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 1.0, 3).unwrap();
        let mut out = [0.0; 3];
        LinearInterpolation.interpolate(&ctx, &mut out).unwrap();
        assert_eq!(out, [5.0, 15.0, 0.0]);
    }

    #[test]
    fn test_output_buffer_too_short() {
        let (k0, k1) = keys(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 1.0, 3).unwrap();
        let mut out = [0.0; 2];
        assert!(matches!(
            LinearInterpolation.interpolate(&ctx, &mut out),
            Err(KeyframeError::InvalidChannelCount { channels: 2 })
        ));
    }

    #[test]
    fn test_catmullrom_two_keys_matches_linear() {
        // With no neighbours both tangents equal the segment delta, which makes
        // the Hermite curve a straight line.
        let k0 = KeyFrame::new(0.0, InterpolationType::CatmullRom, &[0.0]).unwrap();
        let k1 = KeyFrame::new(1.0, InterpolationType::CatmullRom, &[8.0]).unwrap();
        for &time in &[0.0f32, 0.25, 0.5, 0.75] {
            let ctx = InterpolationContext::at_time(None, &k0, &k1, None, time, 1).unwrap();
            let mut out = [0.0];
            CatmullRomInterpolation.interpolate(&ctx, &mut out).unwrap();
            assert_abs_diff_eq!(out[0], 8.0 * time, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_catmullrom_hits_key0_at_t_zero() {
        let prev = KeyFrame::new(-1.0, InterpolationType::CatmullRom, &[3.0]).unwrap();
        let k0 = KeyFrame::new(0.0, InterpolationType::CatmullRom, &[1.0]).unwrap();
        let k1 = KeyFrame::new(1.0, InterpolationType::CatmullRom, &[2.0]).unwrap();
        let ctx = InterpolationContext::at_time(Some(&prev), &k0, &k1, None, 0.0, 1).unwrap();
        let mut out = [0.0];
        CatmullRomInterpolation.interpolate(&ctx, &mut out).unwrap();
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn test_slerp_takes_shorter_arc() {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let a = [0.0, 0.0, 0.0, 1.0];
        // 90 degrees about z, sign flipped
        let b = [0.0, 0.0, -half, -half];
        let q = slerp_quat(a, b, 0.5);
        let expected_angle = std::f32::consts::FRAC_PI_4;
        assert_abs_diff_eq!(q[2], (expected_angle / 2.0).sin(), epsilon = 1e-5);
        assert_abs_diff_eq!(q[3], (expected_angle / 2.0).cos(), epsilon = 1e-5);
    }

    #[test]
    fn test_slerp_result_is_unit_length() {
        let a = [0.1, 0.2, 0.3, 0.9];
        let b = [-0.5, 0.4, 0.1, 0.7];
        for i in 0..10 {
            let q = slerp_quat(a, b, i as f32 / 10.0);
            assert_abs_diff_eq!(dot4(&q, &q).sqrt(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_slerp_requires_four_channels() {
        let (k0, k1) = keys(&[0.0, 0.0, 0.0], &[0.0, 0.0, 1.0]);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 1.0, 3).unwrap();
        let mut out = [0.0; 4];
        assert!(matches!(
            QuaternionSlerpInterpolation.interpolate(&ctx, &mut out),
            Err(KeyframeError::UnsupportedDataKind { channels: 3, .. })
        ));
    }
}
