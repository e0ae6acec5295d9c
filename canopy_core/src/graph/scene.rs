// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenes and sub-scenes, and the ownership of roots, cameras and lights.
//!
//! A node has at most one *direct* owner and holds a single role in it: the
//! scene it roots, the scene whose current camera it is, or the scene it
//! lights. Ownership operations check this before mutating anything, so a
//! rejected call leaves every scene exactly as it was.

use alloc::vec::Vec;

use crate::dirty::DirtyBits;
use crate::error::OwnershipError;

use super::id::{INVALID, NodeId, SceneId};
use super::kind::NodeKind;
use super::store::SceneGraph;

/// Whether a slot is a top-level scene or an embedded sub-scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    /// Top-level scene.
    Scene,
    /// Embedded sub-scene.
    SubScene,
}

/// A scene or sub-scene slot.
///
/// The coarse signals are raised by the owner-notification chain and
/// cleared by [`SceneGraph::sync`] after they were pushed.
#[derive(Clone, Debug)]
pub struct Scene {
    pub(crate) kind: SceneKind,
    pub(crate) root: Option<NodeId>,
    pub(crate) camera: Option<NodeId>,
    pub(crate) lights: Vec<NodeId>,
    pub(crate) width: f64,
    pub(crate) height: f64,
    camera_dirty: bool,
    content_dirty: bool,
    needs_repaint: bool,
    repaint_requests: u64,
}

impl Scene {
    fn new(kind: SceneKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            root: None,
            camera: None,
            lights: Vec::new(),
            width,
            height,
            camera_dirty: false,
            content_dirty: false,
            // The first sync pushes the new scene.
            needs_repaint: true,
            repaint_requests: 0,
        }
    }

    /// Scene or sub-scene.
    #[must_use]
    pub const fn kind(&self) -> SceneKind {
        self.kind
    }

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Current camera.
    #[must_use]
    pub const fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    /// Owned lights in insertion order.
    #[must_use]
    pub fn lights(&self) -> &[NodeId] {
        &self.lights
    }

    /// Viewport width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Viewport height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Whether the camera or its view changed since the last sync.
    #[must_use]
    pub const fn camera_dirty(&self) -> bool {
        self.camera_dirty
    }

    /// Whether sub-scene content changed since the last sync.
    #[must_use]
    pub const fn content_dirty(&self) -> bool {
        self.content_dirty
    }

    /// Whether a repaint is pending.
    #[must_use]
    pub const fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Number of signals received since creation. Diagnostic only.
    #[must_use]
    pub const fn repaint_requests(&self) -> u64 {
        self.repaint_requests
    }

    /// The camera or its view changed.
    pub fn mark_camera_dirty(&mut self) {
        self.camera_dirty = true;
        self.needs_repaint = true;
        self.repaint_requests += 1;
    }

    /// Sub-scene content changed.
    pub fn mark_content_dirty(&mut self) {
        self.content_dirty = true;
        self.needs_repaint = true;
        self.repaint_requests += 1;
    }

    /// Something in the scene changed.
    pub fn set_needs_repaint(&mut self) {
        self.needs_repaint = true;
        self.repaint_requests += 1;
    }

    pub(crate) fn has_signal(&self) -> bool {
        self.camera_dirty || self.content_dirty || self.needs_repaint
    }

    pub(crate) fn clear_signals(&mut self) {
        self.camera_dirty = false;
        self.content_dirty = false;
        self.needs_repaint = false;
    }
}

impl SceneGraph {
    /// Creates a scene with the given viewport size.
    pub fn create_scene(&mut self, width: f64, height: f64) -> SceneId {
        self.push_scene(SceneKind::Scene, width, height)
    }

    /// Creates a sub-scene with the given viewport size.
    pub fn create_sub_scene(&mut self, width: f64, height: f64) -> SceneId {
        self.push_scene(SceneKind::SubScene, width, height)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "scene count is bounded by u32 handles"
    )]
    fn push_scene(&mut self, kind: SceneKind, width: f64, height: f64) -> SceneId {
        let id = SceneId(self.scenes.len() as u32);
        self.scenes.push(Scene::new(kind, width, height));
        id
    }

    /// Returns a scene slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not name a scene of this graph.
    #[must_use]
    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.0 as usize]
    }

    /// Returns a scene slot for raising signals from outside the graph.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not name a scene of this graph.
    pub fn scene_mut(&mut self, id: SceneId) -> &mut Scene {
        &mut self.scenes[id.0 as usize]
    }

    /// Returns the scene that directly owns `id`, if any.
    #[must_use]
    pub fn owner(&self, id: NodeId) -> Option<SceneId> {
        self.validate(id);
        self.owner[id.idx as usize]
    }

    /// Returns the scene `id` belongs to: its direct owner, or that of its
    /// closest owned ancestor.
    #[must_use]
    pub fn owning_scene(&self, id: NodeId) -> Option<SceneId> {
        self.validate(id);
        self.owning_scene_at(id.idx)
    }

    /// Resizes a scene's viewport. The current camera's view size follows.
    pub fn set_scene_size(&mut self, scene: SceneId, width: f64, height: f64) {
        let slot = &mut self.scenes[scene.0 as usize];
        slot.width = width;
        slot.height = height;
        slot.set_needs_repaint();
        if let Some(camera) = slot.camera {
            self.apply_view_size(camera.idx, width, height);
        }
    }

    /// Makes `camera` the current camera of `scene`, or clears it.
    ///
    /// The previous camera is released. The camera's view size is set to
    /// the scene's viewport.
    ///
    /// # Errors
    ///
    /// Returns [`OwnershipError::CameraOwned`] if another scene owns the
    /// camera, or [`OwnershipError::OtherRole`] if it roots `scene`. No scene
    /// is modified in these cases.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or does not name a camera.
    pub fn set_camera(
        &mut self,
        scene: SceneId,
        camera: Option<NodeId>,
    ) -> Result<(), OwnershipError> {
        if let Some(cam) = camera {
            self.validate(cam);
            assert!(
                matches!(self.kind[cam.idx as usize], NodeKind::Camera(_)),
                "{cam:?} is not a camera"
            );
            match self.owner[cam.idx as usize] {
                Some(owner) if owner != scene => {
                    return Err(OwnershipError::CameraOwned { camera: cam, owner });
                }
                Some(owner) if self.scenes[owner.0 as usize].camera != camera => {
                    return Err(OwnershipError::OtherRole { node: cam, owner });
                }
                _ => {}
            }
        }

        let slot = &mut self.scenes[scene.0 as usize];
        let old = slot.camera;
        if old == camera {
            return Ok(());
        }
        slot.camera = camera;
        let (width, height) = (slot.width, slot.height);
        slot.mark_camera_dirty();

        if let Some(old) = old {
            self.owner[old.idx as usize] = None;
        }
        if let Some(cam) = camera {
            self.owner[cam.idx as usize] = Some(scene);
            self.apply_view_size(cam.idx, width, height);
        }
        Ok(())
    }

    /// Adds `light` to the lights owned by `scene`.
    ///
    /// Adding a light the scene already owns does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`OwnershipError::LightOwned`] if another scene owns the
    /// light, or [`OwnershipError::OtherRole`] if it roots `scene`. No scene
    /// is modified in these cases.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or does not name a light.
    pub fn add_light(&mut self, scene: SceneId, light: NodeId) -> Result<(), OwnershipError> {
        self.validate(light);
        assert!(
            matches!(self.kind[light.idx as usize], NodeKind::Light(_)),
            "{light:?} is not a light"
        );
        match self.owner[light.idx as usize] {
            Some(owner) if owner != scene => {
                return Err(OwnershipError::LightOwned { light, owner });
            }
            Some(owner) if self.scenes[owner.0 as usize].lights.contains(&light) => {
                return Ok(());
            }
            Some(owner) => return Err(OwnershipError::OtherRole { node: light, owner }),
            None => {}
        }

        self.scenes[scene.0 as usize].lights.push(light);
        self.owner[light.idx as usize] = Some(scene);
        self.mark_dirty(light.idx, DirtyBits::LIGHT);
        Ok(())
    }

    /// Removes `light` from `scene`. Returns whether the scene owned it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_light(&mut self, scene: SceneId, light: NodeId) -> bool {
        self.validate(light);
        let slot = &mut self.scenes[scene.0 as usize];
        let Some(pos) = slot.lights.iter().position(|&l| l == light) else {
            return false;
        };
        slot.lights.remove(pos);
        slot.set_needs_repaint();
        self.owner[light.idx as usize] = None;
        true
    }

    /// Makes `root` the root node of `scene`, or clears it.
    ///
    /// # Errors
    ///
    /// Returns [`OwnershipError::RootHasParent`] if `root` is a child of
    /// another node, [`OwnershipError::RootOwned`] if another scene owns it,
    /// or [`OwnershipError::OtherRole`] if it is the camera or a light of
    /// `scene`. No scene is modified in these cases.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_root(&mut self, scene: SceneId, root: Option<NodeId>) -> Result<(), OwnershipError> {
        if let Some(node) = root {
            self.validate(node);
            if self.parent[node.idx as usize] != INVALID {
                return Err(OwnershipError::RootHasParent { node });
            }
            match self.owner[node.idx as usize] {
                Some(owner) if owner != scene => {
                    return Err(OwnershipError::RootOwned { node, owner });
                }
                Some(owner) if self.scenes[owner.0 as usize].root != root => {
                    return Err(OwnershipError::OtherRole { node, owner });
                }
                _ => {}
            }
        }

        let slot = &mut self.scenes[scene.0 as usize];
        let old = slot.root;
        if old == root {
            return Ok(());
        }
        slot.root = root;
        match slot.kind {
            SceneKind::Scene => slot.set_needs_repaint(),
            SceneKind::SubScene => slot.mark_content_dirty(),
        }

        if let Some(old) = old {
            self.owner[old.idx as usize] = None;
        }
        if let Some(node) = root {
            self.owner[node.idx as usize] = Some(scene);
        }
        Ok(())
    }

    /// Releases `idx` from whichever scene directly owns it.
    pub(crate) fn release_from_scene(&mut self, idx: u32) {
        let Some(scene) = self.owner[idx as usize].take() else {
            return;
        };
        let node = self.id_at(idx);
        let slot = &mut self.scenes[scene.0 as usize];
        if slot.root == Some(node) {
            slot.root = None;
        }
        if slot.camera == Some(node) {
            slot.camera = None;
            slot.mark_camera_dirty();
        }
        slot.lights.retain(|&l| l != node);
        slot.set_needs_repaint();
    }

    fn apply_view_size(&mut self, idx: u32, width: f64, height: f64) {
        self.camera_at_mut(idx).set_view_size(width, height);
        self.mark_dirty(idx, DirtyBits::CAMERA);
    }
}

#[cfg(test)]
mod tests {
    use crate::camera::Camera;
    use crate::error::OwnershipError;
    use crate::graph::SceneGraph;
    use crate::graph::testing::settle;
    use crate::light::{Light, LightKind};

    #[test]
    fn camera_ownership_is_exclusive() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(100.0, 100.0);
        let b = graph.create_scene(200.0, 200.0);
        let camera = graph.create_camera(Camera::perspective());
        let other = graph.create_camera(Camera::parallel());

        graph.set_camera(a, Some(camera)).expect("unowned camera");
        graph.set_camera(b, Some(other)).expect("unowned camera");

        let err = graph.set_camera(b, Some(camera));
        assert_eq!(
            err,
            Err(OwnershipError::CameraOwned { camera, owner: a })
        );
        assert_eq!(graph.scene(a).camera(), Some(camera));
        assert_eq!(graph.scene(b).camera(), Some(other));
        assert_eq!(graph.owner(camera), Some(a));
        assert_eq!(graph.owner(other), Some(b));
        assert_eq!(graph.camera(camera).view_width(), 100.0);
    }

    #[test]
    fn node_holds_one_role_per_scene() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(1.0, 1.0);
        let b = graph.create_scene(1.0, 1.0);
        let c = graph.create_scene(1.0, 1.0);
        let camera = graph.create_camera(Camera::perspective());
        let light = graph.create_light(Light::new(LightKind::Ambient));
        let lamp = graph.create_light(Light::new(LightKind::Ambient));

        graph.set_root(a, Some(camera)).expect("unowned root");
        assert_eq!(
            graph.set_camera(a, Some(camera)),
            Err(OwnershipError::OtherRole { node: camera, owner: a })
        );
        assert_eq!(graph.scene(a).camera(), None);

        graph.set_root(b, Some(light)).expect("unowned root");
        assert_eq!(
            graph.add_light(b, light),
            Err(OwnershipError::OtherRole { node: light, owner: b })
        );
        assert!(graph.scene(b).lights().is_empty());

        graph.add_light(c, lamp).expect("unowned light");
        assert_eq!(
            graph.set_root(c, Some(lamp)),
            Err(OwnershipError::OtherRole { node: lamp, owner: c })
        );
        assert_eq!(graph.scene(c).root(), None);
        assert_eq!(graph.scene(c).lights(), &[lamp]);
    }

    #[test]
    fn replacing_root_keeps_camera_exclusive() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(1.0, 1.0);
        let b = graph.create_scene(1.0, 1.0);
        let camera = graph.create_camera(Camera::perspective());
        let other = graph.create_group();

        graph.set_camera(a, Some(camera)).expect("unowned camera");
        assert!(graph.set_root(a, Some(camera)).is_err());
        graph.set_root(a, Some(other)).expect("unowned root");

        assert_eq!(graph.owner(camera), Some(a));
        assert_eq!(
            graph.set_camera(b, Some(camera)),
            Err(OwnershipError::CameraOwned { camera, owner: a })
        );
        assert_eq!(graph.scene(b).camera(), None);
    }

    #[test]
    fn replacing_camera_releases_previous() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(100.0, 100.0);
        let b = graph.create_scene(100.0, 100.0);
        let first = graph.create_camera(Camera::perspective());
        let second = graph.create_camera(Camera::perspective());

        graph.set_camera(a, Some(first)).expect("unowned camera");
        graph.set_camera(a, Some(second)).expect("unowned camera");
        assert_eq!(graph.owner(first), None);
        graph.set_camera(b, Some(first)).expect("released camera");
    }

    #[test]
    fn scene_resize_reaches_camera() {
        let mut graph = SceneGraph::new();
        let scene = graph.create_scene(100.0, 50.0);
        let camera = graph.create_camera(Camera::perspective());
        graph.set_camera(scene, Some(camera)).expect("unowned camera");
        settle(&mut graph);

        graph.set_scene_size(scene, 640.0, 480.0);
        assert_eq!(graph.camera(camera).view_width(), 640.0);
        assert_eq!(graph.camera(camera).view_height(), 480.0);
        assert!(graph.scene(scene).camera_dirty());
    }

    #[test]
    fn light_ownership_is_exclusive() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(1.0, 1.0);
        let b = graph.create_scene(1.0, 1.0);
        let light = graph.create_light(Light::new(LightKind::Ambient));

        graph.add_light(a, light).expect("unowned light");
        graph.add_light(a, light).expect("re-adding is a no-op");
        assert_eq!(graph.scene(a).lights(), &[light]);
        assert_eq!(
            graph.add_light(b, light),
            Err(OwnershipError::LightOwned { light, owner: a })
        );
        assert!(graph.scene(b).lights().is_empty());

        assert!(graph.remove_light(a, light));
        assert!(!graph.remove_light(a, light));
        graph.add_light(b, light).expect("released light");
    }

    #[test]
    fn root_must_be_parentless_and_unowned() {
        let mut graph = SceneGraph::new();
        let a = graph.create_scene(1.0, 1.0);
        let b = graph.create_sub_scene(1.0, 1.0);
        let root = graph.create_group();
        let child = graph.create_group();
        graph.add_child(root, child);

        assert_eq!(
            graph.set_root(a, Some(child)),
            Err(OwnershipError::RootHasParent { node: child })
        );
        graph.set_root(a, Some(root)).expect("unowned root");
        assert_eq!(
            graph.set_root(b, Some(root)),
            Err(OwnershipError::RootOwned { node: root, owner: a })
        );
        assert_eq!(graph.scene(b).root(), None);
        assert_eq!(graph.owning_scene(child), Some(a));
    }

    #[test]
    fn destroying_owned_node_releases_scene() {
        let mut graph = SceneGraph::new();
        let scene = graph.create_scene(1.0, 1.0);
        let camera = graph.create_camera(Camera::parallel());
        let light = graph.create_light(Light::new(LightKind::Ambient));
        graph.set_camera(scene, Some(camera)).expect("unowned camera");
        graph.add_light(scene, light).expect("unowned light");

        graph.destroy_node(camera);
        graph.destroy_node(light);
        assert_eq!(graph.scene(scene).camera(), None);
        assert!(graph.scene(scene).lights().is_empty());
    }

    #[test]
    #[should_panic(expected = "is the root of")]
    fn scene_root_cannot_be_adopted() {
        let mut graph = SceneGraph::new();
        let scene = graph.create_scene(1.0, 1.0);
        let root = graph.create_group();
        let other = graph.create_group();
        graph.set_root(scene, Some(root)).expect("unowned root");
        graph.add_child(other, root);
    }
}
