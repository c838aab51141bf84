use serde::{Deserialize, Serialize};

use super::context::InterpolationContext;
use super::functions::{
    CatmullRomInterpolation, Interpolator, LinearInterpolation, QuaternionSlerpInterpolation,
    SteppedInterpolation,
};
use crate::error::KeyframeError;
use crate::keyframe::{DataKind, InterpolationType};

/// Every (key tag, data kind) pair a container can evaluate.
///
/// Quaternion curves have no tangent-based variant: both `QuaternionLinear`
/// and `QuaternionCatmullRom` evaluate with slerp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    ScalarStepped,
    ScalarLinear,
    ScalarCatmullRom,
    QuaternionStepped,
    QuaternionLinear,
    /// Alias for slerp
    QuaternionCatmullRom,
}

impl Interpolation {
    /// Strategy for a segment whose end key carries `tag` in a container of kind `data`.
    #[inline]
    pub fn select(tag: InterpolationType, data: DataKind) -> Self {
        match (data, tag) {
            (DataKind::Scalar, InterpolationType::Stepped) => Self::ScalarStepped,
            (DataKind::Scalar, InterpolationType::Linear) => Self::ScalarLinear,
            (DataKind::Scalar, InterpolationType::CatmullRom) => Self::ScalarCatmullRom,
            (DataKind::Quaternion, InterpolationType::Stepped) => Self::QuaternionStepped,
            (DataKind::Quaternion, InterpolationType::Linear) => Self::QuaternionLinear,
            (DataKind::Quaternion, InterpolationType::CatmullRom) => Self::QuaternionCatmullRom,
        }
    }

    /// The function that actually evaluates this variant.
    pub fn interpolator(self) -> &'static dyn Interpolator {
        match self {
            Self::ScalarStepped | Self::QuaternionStepped => &SteppedInterpolation,
            Self::ScalarLinear => &LinearInterpolation,
            Self::ScalarCatmullRom => &CatmullRomInterpolation,
            Self::QuaternionLinear | Self::QuaternionCatmullRom => &QuaternionSlerpInterpolation,
        }
    }

    #[inline]
    pub fn interpolate(
        self,
        ctx: &InterpolationContext<'_>,
        out: &mut [f32],
    ) -> Result<(), KeyframeError> {
        self.interpolator().interpolate(ctx, out)
    }

    #[inline]
    pub fn data_kind(self) -> DataKind {
        match self {
            Self::ScalarStepped | Self::ScalarLinear | Self::ScalarCatmullRom => DataKind::Scalar,
            Self::QuaternionStepped | Self::QuaternionLinear | Self::QuaternionCatmullRom => {
                DataKind::Quaternion
            }
        }
    }
}
