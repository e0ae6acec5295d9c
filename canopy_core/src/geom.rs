// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vectors, axis-aligned bounds and rays.

use core::ops::{Add, Mul, Neg, Sub};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::transform::Transform3d;

/// Denominator magnitude below which a ray is treated as parallel to a plane.
pub const RAY_EPSILON: f64 = 1e-9;

/// A 3-D vector or point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along +Z, the default look direction.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates a vector from its components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns the unit vector in the same direction, or `self` unchanged when
    /// the length is zero or not finite.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self * (1.0 / len)
        } else {
            self
        }
    }

    /// Returns whether every component is within `eps` of `other`'s.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }

    fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// An axis-aligned 3-D box described by its minimum corner and extents.
///
/// Extents are never negative or NaN: constructors and every operation clamp
/// malformed input to a zero-sized box, so bounds can be folded up the tree
/// without ever propagating NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    min: Vec3,
    size: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Bounds {
    /// Zero-sized bounds at the origin.
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        size: Vec3::ZERO,
    };

    /// Creates bounds from a minimum corner and extents.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, width: f64, height: f64, depth: f64) -> Self {
        Self {
            min: Vec3::new(finite_or_zero(x), finite_or_zero(y), finite_or_zero(z)),
            size: Vec3::new(extent(width), extent(height), extent(depth)),
        }
    }

    /// Creates flat bounds in the `z = 0` plane.
    #[must_use]
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, 0.0, width, height, 0.0)
    }

    /// Creates the smallest bounds containing both corners.
    #[must_use]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, min.z, max.x - min.x, max.y - min.y, max.z - min.z)
    }

    /// Minimum corner.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.min + self.size
    }

    /// Extent along X.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.size.x
    }

    /// Extent along Y.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.size.y
    }

    /// Extent along Z.
    #[must_use]
    pub const fn depth(&self) -> f64 {
        self.size.z
    }

    /// Returns whether the box has no extent along any axis.
    ///
    /// Cameras, lights, empty groups and zero-sized regions report empty
    /// bounds; a flat box with width and height is not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.x == 0.0 && self.size.y == 0.0 && self.size.z == 0.0
    }

    /// Returns the smallest bounds containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_corners(self.min.min(other.min), self.max().max(other.max()))
    }

    /// Maps all eight corners through `t` and returns their bounds.
    #[must_use]
    pub fn transformed(&self, t: &Transform3d) -> Self {
        let lo = self.min;
        let hi = self.max();
        let mut out_min = t.transform_point(lo);
        let mut out_max = out_min;
        for i in 1..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = t.transform_point(corner);
            out_min = out_min.min(p);
            out_max = out_max.max(p);
        }
        Self::from_corners(out_min, out_max)
    }

    /// Returns whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        let hi = self.max();
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= hi.x
            && p.y <= hi.y
            && p.z <= hi.z
    }

    /// Projects onto the XY plane.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.min.x,
            self.min.y,
            self.min.x + self.size.x,
            self.min.y + self.size.y,
        )
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::from_rect(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn extent(v: f64) -> f64 {
    if v > 0.0 && v.is_finite() { v } else { 0.0 }
}

/// A half-line in scene space, used for picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray through `t`.
    #[must_use]
    pub fn transformed(&self, t: &Transform3d) -> Self {
        Self::new(t.transform_point(self.origin), t.transform_vector(self.direction))
    }

    /// Returns the ray parameter at which it meets the plane through `point`
    /// with normal `normal`.
    ///
    /// Returns `None` when the ray is parallel to the plane (within
    /// [`RAY_EPSILON`]) or the plane lies behind the origin.
    #[must_use]
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f64> {
        let denom = self.direction.dot(normal);
        if denom.abs() < RAY_EPSILON {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_extentless_bounds_are_empty() {
        assert!(Bounds::ZERO.is_empty());
        assert!(Bounds::new(100.0, 100.0, 0.0, 0.0, 0.0, 0.0).is_empty());
        assert!(!Bounds::from_rect(0.0, 0.0, 10.0, 10.0).is_empty());
        assert!(!Bounds::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn union_of_overlapping_rects() {
        let a = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_rect(5.0, 5.0, 20.0, 20.0);
        let u = a.union(&b);
        assert_eq!(u, Bounds::from_rect(0.0, 0.0, 25.0, 25.0));
        assert_eq!(u.to_rect(), Rect::new(0.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn malformed_extents_clamp_to_zero() {
        let b = Bounds::new(f64::NAN, 1.0, 2.0, -4.0, f64::NAN, 3.0);
        assert_eq!(b.min(), Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert_eq!(b.depth(), 3.0);
    }

    #[test]
    fn transformed_bounds_cover_rotated_box() {
        let b = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
        let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let r = b.transformed(&t);
        assert!(r.min().approx_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-9));
        assert!((r.width() - 10.0).abs() < 1e-9);
        assert!((r.height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn ray_hits_plane_in_front() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, -10.0), Vec3::new(0.0, 0.0, 2.0));
        let t = ray
            .intersect_plane(Vec3::ZERO, Vec3::Z)
            .expect("ray crosses z = 0");
        assert!((t - 10.0).abs() < 1e-12);
        assert_eq!(ray.at(t), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn ray_parallel_or_behind_misses() {
        let parallel = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(parallel.intersect_plane(Vec3::ZERO, Vec3::Z).is_none());
        let away = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(away.intersect_plane(Vec3::ZERO, Vec3::Z).is_none());
    }
}
