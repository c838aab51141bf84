//! Decomposition of dense 4x4 transforms into position, rotation and scale channels.
//!
//! Matrices are column-major nalgebra `Matrix4<f32>` with the translation in
//! the last column and the (possibly scaled) basis in the upper-left 3x3 block.

use log::trace;
use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Column lengths below this are treated as collapsed axes.
const MIN_AXIS_LENGTH: f32 = 1e-12;

/// Squared translation change that marks position as animated.
const POSITION_EPSILON_SQ: f32 = 1e-8;
/// Squared basis-column change that marks rotation as animated.
const ROTATION_EPSILON_SQ: f32 = 1e-4;
/// Squared axis-length change that marks scale as animated.
const SCALE_EPSILON_SQ: f32 = 1e-4;

#[inline]
pub fn translation(m: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Upper-left 3x3 block.
#[inline]
pub fn basis(m: &Matrix4<f32>) -> Matrix3<f32> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Gram-Schmidt orthonormalization of the basis columns, in x, y, z order.
///
/// Returns `None` when the columns are (nearly) linearly dependent.
pub fn orthonormalize(b: &Matrix3<f32>) -> Option<Matrix3<f32>> {
    let x = b.column(0).into_owned().try_normalize(MIN_AXIS_LENGTH)?;
    let y = b.column(1).into_owned();
    let y = (y - x * y.dot(&x)).try_normalize(MIN_AXIS_LENGTH)?;
    let z = b.column(2).into_owned();
    let z = (z - x * z.dot(&x) - y * z.dot(&y)).try_normalize(MIN_AXIS_LENGTH)?;
    Some(Matrix3::from_columns(&[x, y, z]))
}

/// Rotation part of `m`. Collapsed bases map to the identity.
pub fn rotation(m: &Matrix4<f32>) -> UnitQuaternion<f32> {
    match orthonormalize(&basis(m)) {
        Some(rot) => UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rot)),
        None => {
            trace!("degenerate basis, using identity rotation");
            UnitQuaternion::identity()
        }
    }
}

/// `(x, y, z, w)` channel layout used by quaternion containers.
#[inline]
pub fn quaternion_channels(q: &UnitQuaternion<f32>) -> [f32; 4] {
    [q.i, q.j, q.k, q.w]
}

/// Unit quaternion from `(x, y, z, w)` channels, renormalized.
#[inline]
pub fn quaternion_from_channels(q: &[f32; 4]) -> UnitQuaternion<f32> {
    UnitQuaternion::new_normalize(Quaternion::new(q[3], q[0], q[1], q[2]))
}

/// Per-axis scale, i.e. the basis column lengths.
pub fn axis_scales(m: &Matrix4<f32>) -> Vector3<f32> {
    let b = basis(m);
    Vector3::new(b.column(0).norm(), b.column(1).norm(), b.column(2).norm())
}

/// Translation * rotation * non-uniform scale.
pub fn compose(
    translation: &Vector3<f32>,
    rotation: &UnitQuaternion<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::new_translation(translation)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

/// Diagonal of the translation bounding box, measured on every second frame.
pub fn bounding_diagonal(track: &[Matrix4<f32>]) -> f32 {
    let mut points = track.iter().step_by(2).map(translation);
    let Some(first) = points.next() else {
        return 0.0;
    };
    let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
    (max - min).norm()
}

fn squared_column_lengths(m: &Matrix3<f32>) -> Vector3<f32> {
    Vector3::new(
        m.column(0).norm_squared(),
        m.column(1).norm_squared(),
        m.column(2).norm_squared(),
    )
}

/// Which transform components change over a dense track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimatedComponents {
    pub position: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl AnimatedComponents {
    #[inline]
    pub fn any(&self) -> bool {
        self.position || self.rotation || self.scale
    }
}

/// Compares every frame of `track` against frame 0.
pub fn detect_animated(track: &[Matrix4<f32>]) -> AnimatedComponents {
    let mut animated = AnimatedComponents::default();
    let Some(first) = track.first() else {
        return animated;
    };
    let pos0 = translation(first);
    let rot0 = basis(first);
    let scl0 = squared_column_lengths(&rot0);

    for m in track {
        if animated.position && animated.rotation && animated.scale {
            break;
        }
        let rot = basis(m);
        if !animated.position && (translation(m) - pos0).norm_squared() > POSITION_EPSILON_SQ {
            animated.position = true;
        }
        if !animated.rotation && squared_column_lengths(&(rot - rot0)).max() > ROTATION_EPSILON_SQ {
            animated.rotation = true;
        }
        if !animated.scale && (squared_column_lengths(&rot) - scl0).amax() > SCALE_EPSILON_SQ {
            animated.scale = true;
        }
    }
    animated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_decompose_composed_transform() {
        let t = Vector3::new(1.0, -2.0, 3.0);
        let r = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let s = Vector3::new(2.0, 3.0, 0.5);
        let m = compose(&t, &r, &s);

        assert_abs_diff_eq!(translation(&m), t, epsilon = 1e-6);
        assert_abs_diff_eq!(axis_scales(&m), s, epsilon = 1e-5);
        assert!(rotation(&m).angle_to(&r) < 1e-3);
    }

    #[test]
    fn test_orthonormalize_skewed_basis() {
        let b = Matrix3::new(1.0, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        let o = orthonormalize(&b).unwrap();
        assert_abs_diff_eq!(o.transpose() * o, Matrix3::identity(), epsilon = 1e-6);
        // x column direction is kept
        assert_abs_diff_eq!(o.column(0).into_owned(), Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_collapsed_basis_is_identity_rotation() {
        let m = compose(
            &Vector3::zeros(),
            &UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 1.0),
            &Vector3::new(0.0, 1.0, 1.0),
        );
        assert!(orthonormalize(&basis(&m)).is_none());
        assert_eq!(rotation(&m), UnitQuaternion::identity());
    }

    #[test]
    fn test_quaternion_channel_layout() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.7);
        let channels = quaternion_channels(&q);
        assert_eq!(channels[3], q.w);
        assert!(quaternion_from_channels(&channels).angle_to(&q) < 1e-3);
    }

    #[test]
    fn test_bounding_diagonal_uses_every_second_frame() {
        let track: Vec<Matrix4<f32>> = [0.0, 100.0, 3.0]
            .iter()
            .map(|&x| Matrix4::new_translation(&Vector3::new(x, 4.0 * x / 3.0, 0.0)))
            .collect();
        // frame 1 is skipped
        assert_abs_diff_eq!(bounding_diagonal(&track), 5.0, epsilon = 1e-5);
        assert_eq!(bounding_diagonal(&[]), 0.0);
    }

    #[test]
    fn test_detect_animated() {
        let still = vec![Matrix4::identity(); 4];
        assert!(!detect_animated(&still).any());

        let moving: Vec<Matrix4<f32>> = (0..4)
            .map(|i| Matrix4::new_translation(&Vector3::new(i as f32, 0.0, 0.0)))
            .collect();
        assert_eq!(
            detect_animated(&moving),
            AnimatedComponents {
                position: true,
                rotation: false,
                scale: false
            }
        );

        let spinning: Vec<Matrix4<f32>> = (0..4)
            .map(|i| {
                compose(
                    &Vector3::zeros(),
                    &UnitQuaternion::from_axis_angle(&Vector3::z_axis(), i as f32 * 0.1),
                    &Vector3::repeat(1.0),
                )
            })
            .collect();
        let animated = detect_animated(&spinning);
        assert!(animated.rotation && !animated.position && !animated.scale);

        let growing: Vec<Matrix4<f32>> = (0..4)
            .map(|i| Matrix4::new_scaling(1.0 + i as f32 * 0.5))
            .collect();
        let animated = detect_animated(&growing);
        assert!(animated.scale && animated.rotation && !animated.position);
    }
}
