// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera attributes, projection math and pick rays.
//!
//! Eye space follows the scene convention: the camera looks down +Z with Y
//! pointing down. Clip distances are eye-space depths. Values are stored as
//! set and clamped when read through the `effective_*` accessors, so a
//! camera with `near_clip = -5` still produces a usable projection.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::cache::Cached;
use crate::geom::{Ray, Vec3};
use crate::transform::Transform3d;

/// Default near clip distance.
pub const DEFAULT_NEAR_CLIP: f64 = 0.1;
/// Default far clip distance.
pub const DEFAULT_FAR_CLIP: f64 = 100.0;
/// Smallest effective near clip distance.
pub const MIN_NEAR_CLIP: f64 = 1e-4;
/// Smallest effective distance between the near and far planes.
pub const MIN_CLIP_RANGE: f64 = 1e-4;
/// Default field of view in degrees.
pub const DEFAULT_FIELD_OF_VIEW: f64 = 30.0;

const MIN_FIELD_OF_VIEW: f64 = 1e-3;
const MAX_FIELD_OF_VIEW: f64 = 179.999;

/// How a camera maps eye space onto the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Orthographic mapping where one local unit is one viewport unit.
    Parallel,
    /// Perspective mapping.
    Perspective {
        /// Full field of view in degrees.
        field_of_view: f64,
        /// Whether `field_of_view` spans the vertical (rather than horizontal)
        /// dimension of the viewport.
        vertical_field_of_view: bool,
        /// Whether the eye sits at the camera's local origin. When `false` the
        /// eye is placed so that the `z = 0` plane maps one-to-one onto the
        /// viewport.
        fixed_eye_at_camera_zero: bool,
    },
}

impl Projection {
    /// A perspective projection with default parameters.
    #[must_use]
    pub const fn perspective() -> Self {
        Self::Perspective {
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            vertical_field_of_view: true,
            fixed_eye_at_camera_zero: false,
        }
    }
}

/// Attributes and derived caches of a camera node.
#[derive(Debug)]
pub struct Camera {
    near_clip: f64,
    far_clip: f64,
    view_width: f64,
    view_height: f64,
    projection: Projection,
    pub(crate) projection_cache: Cached<Transform3d>,
    pub(crate) projection_view: Cached<Transform3d>,
}

impl Camera {
    /// Creates a camera with default clip distances and no viewport yet.
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            view_width: 0.0,
            view_height: 0.0,
            projection,
            projection_cache: Cached::invalid(),
            projection_view: Cached::invalid(),
        }
    }

    /// Creates a parallel camera.
    #[must_use]
    pub fn parallel() -> Self {
        Self::new(Projection::Parallel)
    }

    /// Creates a perspective camera with default parameters.
    #[must_use]
    pub fn perspective() -> Self {
        Self::new(Projection::perspective())
    }

    /// Near clip distance as set.
    #[must_use]
    pub const fn near_clip(&self) -> f64 {
        self.near_clip
    }

    /// Far clip distance as set.
    #[must_use]
    pub const fn far_clip(&self) -> f64 {
        self.far_clip
    }

    /// Near clip distance clamped to be positive.
    #[must_use]
    pub fn effective_near_clip(&self) -> f64 {
        if self.near_clip > 0.0 && self.near_clip.is_finite() {
            self.near_clip
        } else {
            MIN_NEAR_CLIP
        }
    }

    /// Far clip distance clamped to lie beyond the effective near clip.
    #[must_use]
    pub fn effective_far_clip(&self) -> f64 {
        let near = self.effective_near_clip();
        if self.far_clip.is_finite() && self.far_clip > near {
            self.far_clip
        } else {
            near + MIN_CLIP_RANGE
        }
    }

    /// Render target width as set by the owning scene.
    #[must_use]
    pub const fn view_width(&self) -> f64 {
        self.view_width
    }

    /// Render target height as set by the owning scene.
    #[must_use]
    pub const fn view_height(&self) -> f64 {
        self.view_height
    }

    /// Projection variant.
    #[must_use]
    pub const fn projection(&self) -> Projection {
        self.projection
    }

    pub(crate) fn set_near_clip(&mut self, v: f64) {
        self.near_clip = v;
    }

    pub(crate) fn set_far_clip(&mut self, v: f64) {
        self.far_clip = v;
    }

    pub(crate) fn set_view_size(&mut self, width: f64, height: f64) {
        self.view_width = width;
        self.view_height = height;
    }

    pub(crate) fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Drops the projection and projection-view caches.
    pub(crate) fn invalidate_projection(&self) {
        self.projection_cache.invalidate();
        self.projection_view.invalidate();
    }

    /// Eye-to-clip transform for the current attributes.
    #[must_use]
    pub fn compute_projection_transform(&self) -> Transform3d {
        let (w, h) = self.effective_view_size();
        let near = self.effective_near_clip();
        let far = self.effective_far_clip();
        match self.projection {
            Projection::Parallel => Transform3d::orthographic(0.0, w, h, 0.0, near, far),
            Projection::Perspective { .. } => {
                Transform3d::perspective(self.vertical_fov_radians(), w / h, near, far)
            }
        }
    }

    /// Local-to-eye transform.
    #[must_use]
    pub fn compute_view_transform(&self) -> Transform3d {
        match self.projection {
            Projection::Parallel
            | Projection::Perspective {
                fixed_eye_at_camera_zero: true,
                ..
            } => Transform3d::IDENTITY,
            Projection::Perspective { .. } => {
                let eye = self.eye_position();
                Transform3d::from_translation(-eye.x, -eye.y, -eye.z)
            }
        }
    }

    /// Eye position in the camera's local space.
    #[must_use]
    pub fn eye_position(&self) -> Vec3 {
        let (w, h) = self.effective_view_size();
        match self.projection {
            Projection::Parallel => Vec3::new(w * 0.5, h * 0.5, 0.0),
            Projection::Perspective {
                fixed_eye_at_camera_zero: true,
                ..
            } => Vec3::ZERO,
            Projection::Perspective { .. } => {
                Vec3::new(w * 0.5, h * 0.5, -self.eye_distance())
            }
        }
    }

    /// Ray in the camera's local space through viewport point `p`.
    #[must_use]
    pub fn compute_local_pick_ray(&self, p: Point) -> Ray {
        let (w, h) = self.effective_view_size();
        match self.projection {
            Projection::Parallel => Ray::new(Vec3::new(p.x, p.y, 0.0), Vec3::Z),
            Projection::Perspective {
                fixed_eye_at_camera_zero: true,
                ..
            } => Ray::new(
                Vec3::ZERO,
                Vec3::new(p.x - w * 0.5, p.y - h * 0.5, self.eye_distance()),
            ),
            Projection::Perspective { .. } => {
                let eye = self.eye_position();
                Ray::new(eye, Vec3::new(p.x, p.y, 0.0) - eye)
            }
        }
    }

    /// Viewport size with non-positive or non-finite dimensions replaced by 1.
    #[must_use]
    pub fn effective_view_size(&self) -> (f64, f64) {
        let clamp = |v: f64| if v > 0.0 && v.is_finite() { v } else { 1.0 };
        (clamp(self.view_width), clamp(self.view_height))
    }

    /// Distance from the eye to the `z = 0` plane for a one-to-one mapping.
    fn eye_distance(&self) -> f64 {
        let (_, h) = self.effective_view_size();
        h * 0.5 / (self.vertical_fov_radians() * 0.5).tan()
    }

    fn vertical_fov_radians(&self) -> f64 {
        let Projection::Perspective {
            field_of_view,
            vertical_field_of_view,
            ..
        } = self.projection
        else {
            return DEFAULT_FIELD_OF_VIEW.to_radians();
        };
        let fov = if field_of_view.is_nan() {
            DEFAULT_FIELD_OF_VIEW
        } else {
            field_of_view.clamp(MIN_FIELD_OF_VIEW, MAX_FIELD_OF_VIEW)
        }
        .to_radians();
        if vertical_field_of_view {
            fov
        } else {
            let (w, h) = self.effective_view_size();
            2.0 * (fov * 0.5).tan().atan2(w / h)
        }
    }
}
