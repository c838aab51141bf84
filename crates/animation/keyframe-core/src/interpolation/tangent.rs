//! Per-key tangent estimates consumed by the Catmull-Rom strategy.
//!
//! Tangents are expressed in "per segment" units: a tangent equal to
//! `key1 - key0` describes a straight line across the active segment.

use super::context::{InterpolationContext, MIN_SEGMENT_LENGTH};
use crate::keyframe::{InterpolationType, MAX_CHANNELS};

#[inline]
fn segment_delta(ctx: &InterpolationContext<'_>, out: &mut [f32; MAX_CHANNELS]) {
    let a = ctx.key0.channels();
    let b = ctx.key1.channels();
    for i in 0..ctx.channels {
        out[i] = b[i] - a[i];
    }
}

/// Tangent leaving `key0`, governed by `key0`'s tag.
pub fn outgoing(ctx: &InterpolationContext<'_>) -> [f32; MAX_CHANNELS] {
    let mut out = [0.0; MAX_CHANNELS];
    match ctx.key0.interpolation {
        InterpolationType::CatmullRom => match ctx.key0prev {
            Some(prev) => {
                let ratio = ctx.length / (ctx.key1.time - prev.time);
                let v0 = prev.channels();
                let v2 = ctx.key1.channels();
                // Additive combination is what existing exported curves were built with.
                for i in 0..ctx.channels {
                    out[i] = ratio * (v2[i] + v0[i]);
                }
            }
            None => segment_delta(ctx, &mut out),
        },
        InterpolationType::Linear => {
            segment_delta(ctx, &mut out);
            if let Some(prev) = ctx.key0prev {
                let prev_len = ctx.key0.time - prev.time;
                if prev_len > MIN_SEGMENT_LENGTH {
                    let scale = ctx.length / prev_len;
                    let v0 = prev.channels();
                    let v1 = ctx.key0.channels();
                    for i in 0..ctx.channels {
                        out[i] = 0.5 * (out[i] + (v1[i] - v0[i]) * scale);
                    }
                }
            }
        }
        InterpolationType::Stepped => {}
    }
    out
}

/// Tangent arriving at `key1`, governed by `key1`'s tag.
pub fn incoming(ctx: &InterpolationContext<'_>) -> [f32; MAX_CHANNELS] {
    let mut tangent = [0.0; MAX_CHANNELS];
    match ctx.key1.interpolation {
        InterpolationType::CatmullRom => match ctx.key1next {
            Some(next) => {
                let ratio = ctx.length / (next.time - ctx.key0.time);
                let v1 = ctx.key0.channels();
                let v3 = next.channels();
                for i in 0..ctx.channels {
                    tangent[i] = ratio * (v3[i] - v1[i]);
                }
            }
            None => segment_delta(ctx, &mut tangent),
        },
        InterpolationType::Linear => {
            segment_delta(ctx, &mut tangent);
            if let Some(next) = ctx.key1next {
                let next_len = next.time - ctx.key1.time;
                if next_len > MIN_SEGMENT_LENGTH {
                    let scale = ctx.length / next_len;
                    let v2 = ctx.key1.channels();
                    let v3 = next.channels();
                    for i in 0..ctx.channels {
                        tangent[i] = 0.5 * (tangent[i] + (v3[i] - v2[i]) * scale);
                    }
                }
            }
        }
        InterpolationType::Stepped => {}
    }
    tangent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::KeyFrame;

    fn key(time: f32, interp: InterpolationType, v: f32) -> KeyFrame {
        KeyFrame::new(time, interp, &[v]).unwrap()
    }

    #[test]
    fn test_catmullrom_without_neighbours_uses_segment_delta() {
        let k0 = key(0.0, InterpolationType::CatmullRom, 1.0);
        let k1 = key(1.0, InterpolationType::CatmullRom, 4.0);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 0.5, 1).unwrap();
        assert_eq!(outgoing(&ctx)[0], 3.0);
        assert_eq!(incoming(&ctx)[0], 3.0);
    }

    #[test]
    fn test_catmullrom_outgoing_adds_previous_and_next() {
        let prev = key(0.0, InterpolationType::CatmullRom, 2.0);
        let k0 = key(1.0, InterpolationType::CatmullRom, 5.0);
        let k1 = key(2.0, InterpolationType::CatmullRom, 6.0);
        let ctx = InterpolationContext::at_time(Some(&prev), &k0, &k1, None, 1.5, 1).unwrap();
        // ratio = 1 / 2, (6 + 2) * 0.5
        assert_eq!(outgoing(&ctx)[0], 4.0);
    }

    #[test]
    fn test_catmullrom_incoming_scales_extended_delta() {
        let k0 = key(0.0, InterpolationType::CatmullRom, 0.0);
        let k1 = key(1.0, InterpolationType::CatmullRom, 1.0);
        let next = key(3.0, InterpolationType::CatmullRom, 6.0);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, Some(&next), 0.5, 1).unwrap();
        // ratio = 1 / 3, (6 - 0) / 3
        assert_eq!(incoming(&ctx)[0], 2.0);
    }

    #[test]
    fn test_linear_tag_blends_adjacent_slopes() {
        let prev = key(0.0, InterpolationType::Linear, 0.0);
        let k0 = key(2.0, InterpolationType::Linear, 2.0);
        let k1 = key(3.0, InterpolationType::Linear, 5.0);
        let ctx = InterpolationContext::at_time(Some(&prev), &k0, &k1, None, 2.5, 1).unwrap();
        // active delta 3, previous slope 1/s rescaled to 1s segment = 1
        assert_eq!(outgoing(&ctx)[0], 2.0);
    }

    #[test]
    fn test_stepped_tangent_is_zero() {
        let k0 = key(0.0, InterpolationType::Stepped, 0.0);
        let k1 = key(1.0, InterpolationType::Stepped, 9.0);
        let ctx = InterpolationContext::at_time(None, &k0, &k1, None, 0.5, 1).unwrap();
        assert_eq!(outgoing(&ctx)[0], 0.0);
        assert_eq!(incoming(&ctx)[0], 0.0);
    }
}
