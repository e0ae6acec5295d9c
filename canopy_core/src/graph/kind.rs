// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node variants.

use crate::camera::Camera;
use crate::dirty::DirtyBits;
use crate::geom::Bounds;
use crate::light::Light;
use crate::peer::PeerKind;

/// Group attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    pub(crate) auto_size_children: bool,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            auto_size_children: true,
        }
    }
}

impl Group {
    /// Whether the layout pass resizes region children to their preferred
    /// size.
    #[must_use]
    pub const fn auto_size_children(&self) -> bool {
        self.auto_size_children
    }
}

/// A light-affectable 3D primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Shape3d {
    pub(crate) geometry: Bounds,
}

impl Shape3d {
    /// Extent of the primitive in local space.
    #[must_use]
    pub const fn geometry(&self) -> Bounds {
        self.geometry
    }
}

/// A resizable 2D leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Region {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) pref_width: f64,
    pub(crate) pref_height: f64,
}

impl Region {
    /// Current width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Current height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Preferred width.
    #[must_use]
    pub const fn pref_width(&self) -> f64 {
        self.pref_width
    }

    /// Preferred height.
    #[must_use]
    pub const fn pref_height(&self) -> f64 {
        self.pref_height
    }
}

/// What a node is, with its kind-specific attributes.
#[derive(Debug)]
pub enum NodeKind {
    /// Ordered container.
    Group(Group),
    /// 3D shape leaf.
    Shape3d(Shape3d),
    /// Resizable 2D leaf.
    Region(Region),
    /// Camera.
    Camera(Camera),
    /// Light source.
    Light(Light),
}

impl NodeKind {
    /// An auto-sizing group.
    #[must_use]
    pub fn group() -> Self {
        Self::Group(Group::default())
    }

    /// A shape with the given local extent.
    #[must_use]
    pub fn shape(geometry: Bounds) -> Self {
        Self::Shape3d(Shape3d { geometry })
    }

    /// A zero-sized region with the given preferred size.
    #[must_use]
    pub fn region(pref_width: f64, pref_height: f64) -> Self {
        Self::Region(Region {
            pref_width,
            pref_height,
            ..Region::default()
        })
    }

    /// Peer variant mirroring this node.
    #[must_use]
    pub const fn peer_kind(&self) -> PeerKind {
        match self {
            Self::Group(_) => PeerKind::Group,
            Self::Shape3d(_) => PeerKind::Shape3d,
            Self::Region(_) => PeerKind::Region,
            Self::Camera(_) => PeerKind::Camera,
            Self::Light(_) => PeerKind::Light,
        }
    }

    /// Whether scope resolution marks this node when lighting changes.
    #[must_use]
    pub const fn is_light_affectable(&self) -> bool {
        matches!(self, Self::Shape3d(_))
    }

    /// Whether a layout parent may resize this node.
    #[must_use]
    pub const fn is_resizable(&self) -> bool {
        matches!(self, Self::Region(_))
    }

    /// Bits a freshly created node starts with, so its first sync pushes all
    /// of its state.
    pub(crate) fn initial_dirty(&self) -> DirtyBits {
        let common = DirtyBits::TRANSFORM | DirtyBits::VISIBILITY;
        common
            | match self {
                Self::Group(_) => DirtyBits::GEOMETRY | DirtyBits::CHILDREN,
                Self::Shape3d(_) => DirtyBits::GEOMETRY | DirtyBits::DRAW_MODE,
                Self::Region(_) => DirtyBits::GEOMETRY,
                Self::Camera(_) => DirtyBits::WORLD_TRANSFORM | DirtyBits::CAMERA,
                Self::Light(_) => {
                    DirtyBits::WORLD_TRANSFORM
                        | DirtyBits::LIGHT
                        | DirtyBits::LIGHT_PARAMS
                        | DirtyBits::LIGHT_SCOPE
                }
            }
    }
}
