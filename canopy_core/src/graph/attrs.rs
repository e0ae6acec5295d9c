// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute setters and getters.
//!
//! Each setter stores the value and marks the node with the category that
//! value feeds. Writing a value equal to the current one marks nothing.

use palette::Srgb;

use crate::camera::{Camera, Projection};
use crate::dirty::DirtyBits;
use crate::geom::Bounds;
use crate::light::{Light, LightKind};
use crate::transform::Transform3d;

use super::id::{INVALID, NodeId};
use super::kind::NodeKind;
use super::store::SceneGraph;

impl SceneGraph {
    // -- Common attributes --

    /// Sets the local-to-parent transform.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.validate(id);
        let i = id.idx as usize;
        if self.local_transform[i] == transform {
            return;
        }
        self.local_transform[i] = transform;
        self.mark_dirty(id.idx, DirtyBits::TRANSFORM);
    }

    /// Shows or hides a node. Hidden nodes do not contribute to their
    /// parent's bounds.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.visible[i] == visible {
            return;
        }
        self.visible[i] = visible;
        self.mark_dirty(id.idx, DirtyBits::VISIBILITY);
    }

    /// Kind and kind-specific attributes of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Local-to-parent transform.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Visibility flag.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Categories not yet pushed to the node's peer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn dirty_bits(&self, id: NodeId) -> DirtyBits {
        self.validate(id);
        self.bits[id.idx as usize]
    }

    // -- Shapes --

    /// Sets the local extent of a shape.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a shape.
    pub fn set_geometry(&mut self, id: NodeId, geometry: Bounds) {
        self.validate(id);
        let NodeKind::Shape3d(shape) = &mut self.kind[id.idx as usize] else {
            panic!("{id:?} is not a shape");
        };
        if shape.geometry == geometry {
            return;
        }
        shape.geometry = geometry;
        self.mark_dirty(id.idx, DirtyBits::GEOMETRY);
    }

    // -- Groups and regions --

    /// Sets whether the layout pass resizes a group's region children to
    /// their preferred size.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a group.
    pub fn set_auto_size_children(&mut self, id: NodeId, auto_size: bool) {
        self.validate(id);
        let NodeKind::Group(group) = &mut self.kind[id.idx as usize] else {
            panic!("{id:?} is not a group");
        };
        if group.auto_size_children == auto_size {
            return;
        }
        group.auto_size_children = auto_size;
        self.request_layout(id.idx);
    }

    /// Sets the preferred size of a region and requests layout from its
    /// parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a region.
    pub fn set_pref_size(&mut self, id: NodeId, pref_width: f64, pref_height: f64) {
        self.validate(id);
        let NodeKind::Region(region) = &mut self.kind[id.idx as usize] else {
            panic!("{id:?} is not a region");
        };
        region.pref_width = pref_width;
        region.pref_height = pref_height;
        let p = self.parent[id.idx as usize];
        if p != INVALID {
            self.request_layout(p);
        }
    }

    /// Whether a layout parent may resize the node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_resizable(&self, id: NodeId) -> bool {
        self.kind(id).is_resizable()
    }

    /// Resizes a resizable node. Returns `false`, changing nothing, for kinds
    /// that are not resizable.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn resize(&mut self, id: NodeId, width: f64, height: f64) -> bool {
        self.validate(id);
        let NodeKind::Region(region) = &mut self.kind[id.idx as usize] else {
            return false;
        };
        if region.width != width || region.height != height {
            region.width = width;
            region.height = height;
            self.mark_dirty(id.idx, DirtyBits::GEOMETRY);
        }
        true
    }

    /// Queues an auto-sizing group for the next layout pass.
    pub(crate) fn request_layout(&mut self, p: u32) {
        let i = p as usize;
        let auto_size = matches!(&self.kind[i], NodeKind::Group(g) if g.auto_size_children);
        if !auto_size || self.needs_layout[i] {
            return;
        }
        self.needs_layout[i] = true;
        self.layout_queue.push(p);
        self.signal_owning_scene(p);
    }

    // -- Cameras --

    /// Attributes of a camera node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn camera(&self, id: NodeId) -> &Camera {
        self.validate(id);
        match &self.kind[id.idx as usize] {
            NodeKind::Camera(camera) => camera,
            _ => panic!("{id:?} is not a camera"),
        }
    }

    /// Sets the near clip distance of a camera.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    pub fn set_near_clip(&mut self, id: NodeId, near: f64) {
        self.update_camera(id, |camera| camera.set_near_clip(near));
    }

    /// Sets the far clip distance of a camera.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    pub fn set_far_clip(&mut self, id: NodeId, far: f64) {
        self.update_camera(id, |camera| camera.set_far_clip(far));
    }

    /// Sets the projection of a camera.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    pub fn set_projection(&mut self, id: NodeId, projection: Projection) {
        self.update_camera(id, |camera| camera.set_projection(projection));
    }

    fn update_camera(&mut self, id: NodeId, f: impl FnOnce(&mut Camera)) {
        self.validate(id);
        f(self.camera_at_mut(id.idx));
        self.mark_dirty(id.idx, DirtyBits::CAMERA);
    }

    pub(crate) fn camera_at_mut(&mut self, idx: u32) -> &mut Camera {
        if !matches!(self.kind[idx as usize], NodeKind::Camera(_)) {
            panic!("{:?} is not a camera", self.id_at(idx));
        }
        match &mut self.kind[idx as usize] {
            NodeKind::Camera(camera) => camera,
            _ => unreachable!(),
        }
    }

    // -- Lights --

    /// Attributes of a light node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    #[must_use]
    pub fn light(&self, id: NodeId) -> &Light {
        self.validate(id);
        match &self.kind[id.idx as usize] {
            NodeKind::Light(light) => light,
            _ => panic!("{id:?} is not a light"),
        }
    }

    /// Sets the color of a light.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    pub fn set_light_color(&mut self, id: NodeId, color: Srgb<f32>) {
        self.validate(id);
        let light = self.light_at_mut(id.idx);
        if light.color == color {
            return;
        }
        light.color = color;
        self.mark_dirty(id.idx, DirtyBits::LIGHT);
    }

    /// Turns a light on or off.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    pub fn set_light_on(&mut self, id: NodeId, on: bool) {
        self.validate(id);
        let light = self.light_at_mut(id.idx);
        if light.on == on {
            return;
        }
        light.on = on;
        self.mark_dirty(id.idx, DirtyBits::LIGHT);
    }

    /// Replaces the kind-specific parameters of a light.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    pub fn set_light_kind(&mut self, id: NodeId, kind: LightKind) {
        self.validate(id);
        let light = self.light_at_mut(id.idx);
        if light.kind == kind {
            return;
        }
        light.kind = kind;
        self.mark_dirty(id.idx, DirtyBits::LIGHT_PARAMS);
    }
}
