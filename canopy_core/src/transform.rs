// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This type covers the subset of 3-D affine and projective transforms the
//! scene graph needs (composition, inversion, point mapping and the two
//! camera projections) without pulling in a full linear-algebra crate.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::geom::Vec3;

/// Determinant magnitude below which a transform is treated as singular.
pub const INVERT_EPSILON: f64 = 1e-12;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Orthographic projection of the box `[left, right] × [bottom, top] ×
    /// [near, far]` onto clip space.
    ///
    /// X and Y map to `[-1, 1]`, depth maps to `[0, 1]`. Passing
    /// `bottom > top` flips Y, which is how a y-down viewport is expressed.
    #[must_use]
    pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let w = right - left;
        let h = top - bottom;
        let d = far - near;
        Self {
            cols: [
                [2.0 / w, 0.0, 0.0, 0.0],
                [0.0, 2.0 / h, 0.0, 0.0],
                [0.0, 0.0, 1.0 / d, 0.0],
                [-(right + left) / w, -(top + bottom) / h, -near / d, 1.0],
            ],
        }
    }

    /// Perspective projection for an eye looking down +Z with Y pointing down.
    ///
    /// `fov_y` is the full vertical field of view in radians. Depth maps to
    /// `[0, 1]` between `near` and `far`, and clip-space Y points up.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let d = far - near;
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, -f, 0.0, 0.0],
                [0.0, 0.0, far / d, 1.0],
                [0.0, 0.0, -far * near / d, 0.0],
            ],
        }
    }

    /// Returns the translation part of an affine transform.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// Maps a point, applying the perspective divide when `w` is not 1.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1];
        let z = c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[2][3] * p.z + c[3][3];
        if w == 1.0 || w == 0.0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }

    /// Maps a direction, ignoring translation.
    #[must_use]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z,
            c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z,
            c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z,
        )
    }

    /// Returns the determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = self.flat();
        let b00 = m[0] * m[5] - m[1] * m[4];
        let b01 = m[0] * m[6] - m[2] * m[4];
        let b02 = m[0] * m[7] - m[3] * m[4];
        let b03 = m[1] * m[6] - m[2] * m[5];
        let b04 = m[1] * m[7] - m[3] * m[5];
        let b05 = m[2] * m[7] - m[3] * m[6];
        let b06 = m[8] * m[13] - m[9] * m[12];
        let b07 = m[8] * m[14] - m[10] * m[12];
        let b08 = m[8] * m[15] - m[11] * m[12];
        let b09 = m[9] * m[14] - m[10] * m[13];
        let b10 = m[9] * m[15] - m[11] * m[13];
        let b11 = m[10] * m[15] - m[11] * m[14];
        b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06
    }

    /// Returns the inverse, or `None` if the transform is not finite or its
    /// determinant is within [`INVERT_EPSILON`] of zero.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }
        let m = self.flat();
        let b00 = m[0] * m[5] - m[1] * m[4];
        let b01 = m[0] * m[6] - m[2] * m[4];
        let b02 = m[0] * m[7] - m[3] * m[4];
        let b03 = m[1] * m[6] - m[2] * m[5];
        let b04 = m[1] * m[7] - m[3] * m[5];
        let b05 = m[2] * m[7] - m[3] * m[6];
        let b06 = m[8] * m[13] - m[9] * m[12];
        let b07 = m[8] * m[14] - m[10] * m[12];
        let b08 = m[8] * m[15] - m[11] * m[12];
        let b09 = m[9] * m[14] - m[10] * m[13];
        let b10 = m[9] * m[15] - m[11] * m[13];
        let b11 = m[10] * m[15] - m[11] * m[14];
        let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
        if !det.is_finite() || det.abs() < INVERT_EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let out = [
            (m[5] * b11 - m[6] * b10 + m[7] * b09) * inv,
            (m[2] * b10 - m[1] * b11 - m[3] * b09) * inv,
            (m[13] * b05 - m[14] * b04 + m[15] * b03) * inv,
            (m[10] * b04 - m[9] * b05 - m[11] * b03) * inv,
            (m[6] * b08 - m[4] * b11 - m[7] * b07) * inv,
            (m[0] * b11 - m[2] * b08 + m[3] * b07) * inv,
            (m[14] * b02 - m[12] * b05 - m[15] * b01) * inv,
            (m[8] * b05 - m[10] * b02 + m[11] * b01) * inv,
            (m[4] * b10 - m[5] * b08 + m[7] * b06) * inv,
            (m[1] * b08 - m[0] * b10 - m[3] * b06) * inv,
            (m[12] * b04 - m[13] * b02 + m[15] * b00) * inv,
            (m[9] * b02 - m[8] * b04 - m[11] * b00) * inv,
            (m[5] * b07 - m[4] * b09 - m[6] * b06) * inv,
            (m[0] * b09 - m[1] * b07 + m[2] * b06) * inv,
            (m[13] * b01 - m[12] * b03 - m[14] * b00) * inv,
            (m[8] * b03 - m[9] * b01 + m[10] * b00) * inv,
        ];
        Some(Self {
            cols: [
                [out[0], out[1], out[2], out[3]],
                [out[4], out[5], out[6], out[7]],
                [out[8], out[9], out[10], out[11]],
                [out[12], out[13], out[14], out[15]],
            ],
        })
    }

    /// Returns whether every element differs from `other` by at most `eps`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.flat()
            .iter()
            .zip(other.flat().iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.flat().iter().all(|v| v.is_finite())
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.flat().iter().any(|v| v.is_nan())
    }

    #[inline]
    fn flat(&self) -> [f64; 16] {
        let c = &self.cols;
        [
            c[0][0], c[0][1], c[0][2], c[0][3], c[1][0], c[1][1], c[1][2], c[1][3], c[2][0],
            c[2][1], c[2][2], c[2][3], c[3][0], c[3][1], c[3][2], c[3][3],
        ]
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}
