use glam::Vec3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Lower left triangle (including diagonal) of a symmetric 3x3 matrix.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Symmetric3x3 {
    /// First row, first column of the matrix.
    pub xx: f32,
    /// Second row, first column of the matrix.
    pub yx: f32,
    /// Second row, second column of the matrix.
    pub yy: f32,
    /// Third row, first column of the matrix.
    pub zx: f32,
    /// Third row, second column of the matrix.
    pub zy: f32,
    /// Third row, third column of the matrix.
    pub zz: f32,
}

impl Symmetric3x3 {
    pub const ZERO: Self = Self {
        xx: 0.0,
        yx: 0.0,
        yy: 0.0,
        zx: 0.0,
        zy: 0.0,
        zz: 0.0,
    };

    pub const IDENTITY: Self = Self {
        xx: 1.0,
        yx: 0.0,
        yy: 1.0,
        zx: 0.0,
        zy: 0.0,
        zz: 1.0,
    };

    /// Creates a diagonal matrix.
    #[inline(always)]
    pub fn from_diagonal(diagonal: Vec3) -> Self {
        Self {
            xx: diagonal.x,
            yy: diagonal.y,
            zz: diagonal.z,
            ..Self::ZERO
        }
    }

    /// Creates a matrix with the same value along the whole diagonal.
    #[inline(always)]
    pub fn from_scaled_identity(scale: f32) -> Self {
        Self::from_diagonal(Vec3::splat(scale))
    }

    /// Gets whether every entry of the matrix is zero.
    #[inline(always)]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}
