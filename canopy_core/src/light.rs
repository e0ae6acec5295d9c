// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Light attributes.
//!
//! A [`Light`] carries a color, an on/off flag and two node reference lists,
//! [`scope`](Light::scope) and [`exclusion_scope`](Light::exclusion_scope).
//! The lists are edited only through the scope operations on
//! [`SceneGraph`](crate::graph::SceneGraph), which keep them disjoint.
//!
//! Numeric parameters are stored as set. Peers receive the clamped form from
//! [`LightKind::effective`].

use alloc::vec::Vec;

use palette::Srgb;

use crate::geom::Vec3;
use crate::graph::NodeId;

/// Distance attenuation of point and spot lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    /// Constant coefficient.
    pub constant: f64,
    /// Linear coefficient.
    pub linear: f64,
    /// Quadratic coefficient.
    pub quadratic: f64,
    /// Distance beyond which the light has no effect.
    pub max_range: f64,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
            max_range: f64::INFINITY,
        }
    }
}

impl Attenuation {
    /// Maximum range with negative or NaN values clamped to zero.
    #[must_use]
    pub fn effective_max_range(&self) -> f64 {
        if self.max_range >= 0.0 {
            self.max_range
        } else {
            0.0
        }
    }
}

/// Cone of a spot light. Angles are full angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotCone {
    /// Axis of the cone in the light's local space.
    pub direction: Vec3,
    /// Angle of the fully lit inner cone.
    pub inner_angle: f64,
    /// Angle beyond which the light has no effect.
    pub outer_angle: f64,
    /// Exponent of the falloff between the inner and outer cones.
    pub falloff: f64,
}

impl Default for SpotCone {
    fn default() -> Self {
        Self {
            direction: Vec3::Z,
            inner_angle: 0.0,
            outer_angle: 30.0,
            falloff: 1.0,
        }
    }
}

impl SpotCone {
    /// Inner angle clamped to `[0, 180]`.
    #[must_use]
    pub fn effective_inner_angle(&self) -> f64 {
        if self.inner_angle.is_nan() {
            0.0
        } else {
            self.inner_angle.clamp(0.0, 180.0)
        }
    }

    /// Outer angle clamped to `[effective_inner_angle, 180]`.
    #[must_use]
    pub fn effective_outer_angle(&self) -> f64 {
        let inner = self.effective_inner_angle();
        if self.outer_angle.is_nan() {
            inner
        } else {
            self.outer_angle.clamp(inner, 180.0)
        }
    }

    /// Falloff with non-finite values replaced by 1.
    #[must_use]
    pub fn effective_falloff(&self) -> f64 {
        if self.falloff.is_finite() {
            self.falloff
        } else {
            1.0
        }
    }
}

/// Direction with degenerate input replaced by +Z.
fn effective_direction(v: Vec3) -> Vec3 {
    let n = v.normalize();
    if n.length() > 0.0 { n } else { Vec3::Z }
}

/// Light variant and its variant-specific parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Uniform light from all directions.
    Ambient,
    /// Light from infinitely far away along `direction`.
    Directional {
        /// Direction the light travels in its local space.
        direction: Vec3,
    },
    /// Light radiating from the light's origin.
    Point(Attenuation),
    /// Light radiating from the origin inside a cone.
    Spot {
        /// Distance attenuation.
        attenuation: Attenuation,
        /// Cone shape.
        cone: SpotCone,
    },
}

impl LightKind {
    /// Returns a copy with every parameter clamped to its valid range.
    #[must_use]
    pub fn effective(&self) -> Self {
        let clamp_attenuation = |a: &Attenuation| Attenuation {
            max_range: a.effective_max_range(),
            ..*a
        };
        match self {
            Self::Ambient => Self::Ambient,
            Self::Directional { direction } => Self::Directional {
                direction: effective_direction(*direction),
            },
            Self::Point(a) => Self::Point(clamp_attenuation(a)),
            Self::Spot { attenuation, cone } => Self::Spot {
                attenuation: clamp_attenuation(attenuation),
                cone: SpotCone {
                    direction: effective_direction(cone.direction),
                    inner_angle: cone.effective_inner_angle(),
                    outer_angle: cone.effective_outer_angle(),
                    falloff: cone.effective_falloff(),
                },
            },
        }
    }
}

/// Attributes of a light node.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub(crate) color: Srgb<f32>,
    pub(crate) on: bool,
    pub(crate) kind: LightKind,
    pub(crate) scope: Vec<NodeId>,
    pub(crate) exclusion_scope: Vec<NodeId>,
}

impl Light {
    /// Creates a white light that is on and affects its whole scene.
    #[must_use]
    pub fn new(kind: LightKind) -> Self {
        Self {
            color: Srgb::new(1.0, 1.0, 1.0),
            on: true,
            kind,
            scope: Vec::new(),
            exclusion_scope: Vec::new(),
        }
    }

    /// Light color.
    #[must_use]
    pub const fn color(&self) -> Srgb<f32> {
        self.color
    }

    /// Whether the light is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Variant parameters as set.
    #[must_use]
    pub const fn kind(&self) -> &LightKind {
        &self.kind
    }

    /// Nodes whose subtrees this light is restricted to. Empty means the
    /// whole owning scene.
    #[must_use]
    pub fn scope(&self) -> &[NodeId] {
        &self.scope
    }

    /// Nodes whose subtrees this light does not affect.
    #[must_use]
    pub fn exclusion_scope(&self) -> &[NodeId] {
        &self.exclusion_scope
    }

    /// Whether `node` appears in either list.
    pub(crate) fn lists_contain(&self, node: NodeId) -> bool {
        self.scope.contains(&node) || self.exclusion_scope.contains(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_white_unscoped_light() {
        let light = Light::new(LightKind::Point(Attenuation::default()));
        assert!(light.is_on());
        assert_eq!(light.color(), Srgb::new(1.0, 1.0, 1.0));
        assert!(light.scope().is_empty());
        assert!(light.exclusion_scope().is_empty());
    }

    #[test]
    fn negative_or_nan_max_range_clamps_to_zero() {
        let mut a = Attenuation {
            max_range: -3.0,
            ..Attenuation::default()
        };
        assert_eq!(a.effective_max_range(), 0.0);
        a.max_range = f64::NAN;
        assert_eq!(a.effective_max_range(), 0.0);
        assert_eq!(Attenuation::default().effective_max_range(), f64::INFINITY);
    }

    #[test]
    fn cone_angles_are_ordered() {
        let cone = SpotCone {
            inner_angle: 90.0,
            outer_angle: 10.0,
            falloff: f64::INFINITY,
            ..SpotCone::default()
        };
        assert_eq!(cone.effective_inner_angle(), 90.0);
        assert_eq!(cone.effective_outer_angle(), 90.0);
        assert_eq!(cone.effective_falloff(), 1.0);

        let wide = SpotCone {
            inner_angle: -5.0,
            outer_angle: 400.0,
            ..SpotCone::default()
        };
        assert_eq!(wide.effective_inner_angle(), 0.0);
        assert_eq!(wide.effective_outer_angle(), 180.0);
    }

    #[test]
    fn effective_kind_normalizes_direction() {
        let kind = LightKind::Directional {
            direction: Vec3::new(0.0, 3.0, 4.0),
        };
        let LightKind::Directional { direction } = kind.effective() else {
            panic!("variant must be preserved");
        };
        assert!(direction.approx_eq(Vec3::new(0.0, 0.6, 0.8), 1e-12));

        let degenerate = LightKind::Directional {
            direction: Vec3::ZERO,
        };
        assert_eq!(
            degenerate.effective(),
            LightKind::Directional { direction: Vec3::Z }
        );
    }
}
