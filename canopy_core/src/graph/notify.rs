// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty marking, cache invalidation and the owner-notification chain.
//!
//! [`SceneGraph::mark_dirty`] is the single entry point every setter goes
//! through:
//!
//! 1. **Bits**: OR the categories into the node's [`DirtyBits`] and queue
//!    the node on the [`PEER`](dirty::PEER) channel.
//! 2. **Caches**: drop the caches the categories feed. Transform caches are
//!    dropped for the whole subtree, stopping below any node whose cache was
//!    already invalid. Bounds caches are dropped up the ancestor chain,
//!    stopping at the first ancestor whose bounds were already invalid.
//! 3. **Owner**: notify whatever owns the node (see
//!    [`mark_owner_dirty`](SceneGraph::mark_owner_dirty)).
//!
//! Both walks and the owner chain short-circuit on state that is already
//! dirty, so re-marking a dirty node costs O(1) beyond its own bits.

use alloc::vec::Vec;

use crate::dirty::{self, DirtyBits};

use super::id::{INVALID, SceneId};
use super::kind::NodeKind;
use super::scene::SceneKind;
use super::store::SceneGraph;

impl SceneGraph {
    /// Marks `idx` dirty for `bits`, invalidates dependent caches and
    /// notifies the node's owner.
    pub(crate) fn mark_dirty(&mut self, idx: u32, bits: DirtyBits) {
        let i = idx as usize;
        self.bits[i] |= bits;
        self.dirty.mark(idx, dirty::PEER);

        if bits.contains(DirtyBits::TRANSFORM) {
            self.invalidate_ancestry(idx);
        }
        if bits.intersects(DirtyBits::BOUNDS_AFFECTING) {
            self.invalidate_bounds(idx, bits);
        }
        if bits.contains(DirtyBits::CAMERA)
            && let NodeKind::Camera(camera) = &self.kind[i]
        {
            camera.invalidate_projection();
        }

        self.mark_owner_dirty(idx, bits);
    }

    /// Forwards a change of `idx` to its owner.
    ///
    /// - A light whose illumination changed walks its scope members' subtrees
    ///   when its scope is non-empty. An empty scope means the whole scene is
    ///   affected, which the owner signal below already covers.
    /// - A node directly owned by a [`Scene`](super::Scene) signals it:
    ///   its current camera via `mark_camera_dirty`, anything else via
    ///   `set_needs_repaint`. A sub-scene receives `mark_content_dirty`.
    /// - Any other node sets [`CONTENTS`](DirtyBits::CONTENTS) on each
    ///   ancestor, stopping at the first one that already has it. A root
    ///   reached this way signals its scene.
    pub(crate) fn mark_owner_dirty(&mut self, idx: u32, bits: DirtyBits) {
        if bits.intersects(DirtyBits::LIGHT_NOTIFYING) {
            let scope = match &self.kind[idx as usize] {
                NodeKind::Light(light) if !light.scope.is_empty() => light.scope.clone(),
                _ => Vec::new(),
            };
            let light = self.id_at(idx);
            for member in scope {
                self.mark_children_dirty(light, member);
            }
        }

        if let Some(scene) = self.owner[idx as usize] {
            self.signal_scene(scene, idx);
            return;
        }

        let mut p = self.parent[idx as usize];
        while p != INVALID {
            let pb = &mut self.bits[p as usize];
            if pb.contains(DirtyBits::CONTENTS) {
                return;
            }
            *pb |= DirtyBits::CONTENTS;
            self.dirty.mark(p, dirty::PEER);
            if let Some(scene) = self.owner[p as usize] {
                self.signal_scene(scene, p);
                return;
            }
            p = self.parent[p as usize];
        }
    }

    /// Raises the coarse signal matching what `idx` is to `scene`.
    pub(crate) fn signal_scene(&mut self, scene: SceneId, idx: u32) {
        let node = self.id_at(idx);
        let slot = &mut self.scenes[scene.0 as usize];
        match slot.kind {
            SceneKind::Scene if slot.camera == Some(node) => slot.mark_camera_dirty(),
            SceneKind::Scene => slot.set_needs_repaint(),
            SceneKind::SubScene => slot.mark_content_dirty(),
        }
        log::trace!("{node:?} notified {scene:?}");
    }

    /// Raises the whole-scene signal of the scene `idx` belongs to, if any.
    pub(crate) fn signal_owning_scene(&mut self, idx: u32) {
        if let Some(scene) = self.owning_scene_at(idx) {
            let slot = &mut self.scenes[scene.0 as usize];
            match slot.kind {
                SceneKind::Scene => slot.set_needs_repaint(),
                SceneKind::SubScene => slot.mark_content_dirty(),
            }
        }
    }

    /// The scene that directly owns `idx` or the closest ancestor with an
    /// owner.
    pub(crate) fn owning_scene_at(&self, mut idx: u32) -> Option<SceneId> {
        while idx != INVALID {
            if let Some(scene) = self.owner[idx as usize] {
                return Some(scene);
            }
            idx = self.parent[idx as usize];
        }
        None
    }

    /// Drops the transform caches of the subtree at `idx` after its
    /// local-to-scene transform changed.
    ///
    /// Cameras and lights in the subtree are marked
    /// [`WORLD_TRANSFORM`](DirtyBits::WORLD_TRANSFORM). The walk does not
    /// descend below a node whose cache was already invalid, since its
    /// descendants were invalidated (and marked) together with it.
    pub(crate) fn invalidate_ancestry(&mut self, idx: u32) {
        let mut moved = Vec::new();
        let mut stack = Vec::from([idx]);
        while let Some(i) = stack.pop() {
            let n = i as usize;
            if !self.local_to_scene[n].invalidate() {
                continue;
            }
            self.scene_to_local[n].invalidate();
            match &self.kind[n] {
                NodeKind::Camera(camera) => {
                    camera.projection_view.invalidate();
                    moved.push(i);
                }
                NodeKind::Light(_) => moved.push(i),
                _ => {}
            }
            let mut child = self.first_child[n];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
        for i in moved {
            self.mark_dirty(i, DirtyBits::WORLD_TRANSFORM);
        }
    }

    /// Drops bounds caches of `idx` and of its ancestors.
    ///
    /// Ancestors whose bounds were dropped are marked
    /// [`GEOMETRY`](DirtyBits::GEOMETRY) so their peers receive the new
    /// extent.
    fn invalidate_bounds(&mut self, idx: u32, bits: DirtyBits) {
        let i = idx as usize;
        if bits.intersects(DirtyBits::GEOMETRY | DirtyBits::CHILDREN) {
            self.bounds_in_local[i].invalidate();
        }
        self.bounds_in_parent[i].invalidate();

        let mut p = self.parent[i];
        while p != INVALID {
            let n = p as usize;
            self.bounds_in_parent[n].invalidate();
            if !self.bounds_in_local[n].invalidate() {
                break;
            }
            self.bits[n] |= DirtyBits::GEOMETRY;
            self.dirty.mark(p, dirty::PEER);
            p = self.parent[n];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::camera::Camera;
    use crate::dirty::DirtyBits;
    use crate::geom::Bounds;
    use crate::graph::testing::settle;
    use crate::graph::{NodeId, SceneGraph};
    use crate::transform::Transform3d;

    /// Creates a chain of `depth` nested groups, outermost first.
    fn chain(graph: &mut SceneGraph, depth: usize) -> Vec<NodeId> {
        let mut nodes = Vec::from([graph.create_group()]);
        for _ in 1..depth {
            let n = graph.create_group();
            graph.add_child(nodes[nodes.len() - 1], n);
            nodes.push(n);
        }
        nodes
    }

    #[test]
    fn contents_propagates_to_every_ancestor() {
        let mut graph = SceneGraph::new();
        let nodes = chain(&mut graph, 4);
        settle(&mut graph);

        graph.set_visible(nodes[3], false);
        for &n in &nodes[..3] {
            assert!(graph.dirty_bits(n).contains(DirtyBits::CONTENTS));
        }
        assert!(!graph.dirty_bits(nodes[3]).contains(DirtyBits::CONTENTS));
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut graph = SceneGraph::new();
        let nodes = chain(&mut graph, 5);
        let scene = graph.create_scene(100.0, 100.0);
        graph.set_root(scene, Some(nodes[0])).expect("unowned root");
        settle(&mut graph);
        let before = graph.scene(scene).repaint_requests();

        graph.set_transform(nodes[4], Transform3d::from_translation(1.0, 0.0, 0.0));
        let after_first: Vec<_> = nodes.iter().map(|&n| graph.dirty_bits(n)).collect();
        let requests = graph.scene(scene).repaint_requests();
        assert_eq!(requests - before, 1, "root signals its scene once");

        // A second edit stops at the first already-flagged ancestor.
        graph.set_transform(nodes[4], Transform3d::from_translation(2.0, 0.0, 0.0));
        let after_second: Vec<_> = nodes.iter().map(|&n| graph.dirty_bits(n)).collect();
        assert_eq!(after_first, after_second);
        assert_eq!(graph.scene(scene).repaint_requests(), requests);
    }

    #[test]
    fn ancestor_transform_marks_descendant_camera() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let camera = graph.create_camera(Camera::perspective());
        graph.add_child(root, camera);
        settle(&mut graph);
        assert!(graph.dirty_bits(camera).is_empty());

        graph.set_transform(root, Transform3d::from_translation(0.0, 0.0, 5.0));
        assert!(graph.dirty_bits(camera).contains(DirtyBits::WORLD_TRANSFORM));
    }

    #[test]
    fn bounds_change_marks_ancestor_geometry() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let mid = graph.create_group();
        let shape = graph.create_shape(Bounds::from_rect(0.0, 0.0, 1.0, 1.0));
        graph.add_child(root, mid);
        graph.add_child(mid, shape);
        settle(&mut graph);

        graph.set_geometry(shape, Bounds::from_rect(0.0, 0.0, 4.0, 4.0));
        assert!(graph.dirty_bits(mid).contains(DirtyBits::GEOMETRY));
        assert!(graph.dirty_bits(root).contains(DirtyBits::GEOMETRY));
        assert_eq!(
            graph.bounds_in_local(root),
            Bounds::from_rect(0.0, 0.0, 4.0, 4.0)
        );
    }

    #[test]
    fn owned_node_signals_its_scene_directly() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let scene = graph.create_scene(10.0, 10.0);
        graph.set_root(scene, Some(root)).expect("unowned root");
        settle(&mut graph);
        assert!(!graph.scene(scene).needs_repaint());

        graph.set_visible(root, false);
        assert!(graph.scene(scene).needs_repaint());
        assert!(!graph.scene(scene).camera_dirty());
    }

    #[test]
    fn sub_scene_receives_content_dirty() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let shape = graph.create_shape(Bounds::ZERO);
        graph.add_child(root, shape);
        let sub = graph.create_sub_scene(10.0, 10.0);
        graph.set_root(sub, Some(root)).expect("unowned root");
        settle(&mut graph);

        graph.set_geometry(shape, Bounds::from_rect(0.0, 0.0, 1.0, 1.0));
        assert!(graph.scene(sub).content_dirty());
        assert!(!graph.scene(sub).needs_repaint());
    }
}
