// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation and topology management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::cache::Cached;
use crate::camera::Camera;
use crate::dirty::{self, DirtyBits};
use crate::geom::Bounds;
use crate::light::Light;
use crate::transform::Transform3d;

use super::id::{INVALID, NodeId, SceneId};
use super::kind::NodeKind;
use super::scene::Scene;
use super::scope::ScopeStats;
use super::traverse::Children;

/// Struct-of-arrays storage for all nodes and scenes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The store is `Send` but not `Sync`: derived caches are filled in through
/// shared references.
#[derive(Debug)]
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local attributes (set by callers) --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) local_transform: Vec<Transform3d>,
    pub(crate) visible: Vec<bool>,
    pub(crate) owner: Vec<Option<SceneId>>,

    // -- Derived caches --
    pub(crate) local_to_scene: Vec<Cached<Transform3d>>,
    pub(crate) scene_to_local: Vec<Cached<Transform3d>>,
    pub(crate) bounds_in_local: Vec<Cached<Bounds>>,
    pub(crate) bounds_in_parent: Vec<Cached<Bounds>>,

    // -- Layout --
    pub(crate) needs_layout: Vec<bool>,
    pub(crate) layout_queue: Vec<u32>,

    // -- Dirty tracking --
    pub(crate) bits: Vec<DirtyBits>,
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Lifecycle tracking --
    pub(crate) has_peer: Vec<bool>,
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<NodeId>,

    // -- Scenes and instrumentation --
    pub(crate) scenes: Vec<Scene>,
    pub(crate) scope_stats: ScopeStats,
    pub(crate) sync_pass: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            local_transform: Vec::new(),
            visible: Vec::new(),
            owner: Vec::new(),
            local_to_scene: Vec::new(),
            scene_to_local: Vec::new(),
            bounds_in_local: Vec::new(),
            bounds_in_parent: Vec::new(),
            needs_layout: Vec::new(),
            layout_queue: Vec::new(),
            bits: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            has_peer: Vec::new(),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            scenes: Vec::new(),
            scope_stats: ScopeStats::default(),
            sync_pass: 0,
        }
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// The node starts with an identity transform, visible, with no parent
    /// and no owning scene. Its whole state is pushed by the next sync pass.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let bits = kind.initial_dirty();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.local_transform[i] = Transform3d::IDENTITY;
            self.visible[i] = true;
            self.owner[i] = None;
            self.local_to_scene[i] = Cached::invalid();
            self.scene_to_local[i] = Cached::invalid();
            self.bounds_in_local[i] = Cached::invalid();
            self.bounds_in_parent[i] = Cached::invalid();
            self.needs_layout[i] = false;
            self.bits[i] = bits;
            self.alive[i] = true;
            self.has_peer[i] = false;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.local_transform.push(Transform3d::IDENTITY);
            self.visible.push(true);
            self.owner.push(None);
            self.local_to_scene.push(Cached::invalid());
            self.scene_to_local.push(Cached::invalid());
            self.bounds_in_local.push(Cached::invalid());
            self.bounds_in_parent.push(Cached::invalid());
            self.needs_layout.push(false);
            self.bits.push(bits);
            self.generation.push(0);
            self.alive.push(true);
            self.has_peer.push(false);
            idx
        };

        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::PEER);

        self.id_at(idx)
    }

    /// Creates an auto-sizing group.
    pub fn create_group(&mut self) -> NodeId {
        self.create_node(NodeKind::group())
    }

    /// Creates a shape with the given local extent.
    pub fn create_shape(&mut self, geometry: Bounds) -> NodeId {
        self.create_node(NodeKind::shape(geometry))
    }

    /// Creates a zero-sized region with the given preferred size.
    pub fn create_region(&mut self, pref_width: f64, pref_height: f64) -> NodeId {
        self.create_node(NodeKind::region(pref_width, pref_height))
    }

    /// Creates a camera node.
    pub fn create_camera(&mut self, camera: Camera) -> NodeId {
        self.create_node(NodeKind::Camera(camera))
    }

    /// Creates a light node.
    pub fn create_light(&mut self, light: Light) -> NodeId {
        self.create_node(NodeKind::Light(light))
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// The node is detached from its parent, released from any scene that
    /// owns it and removed from every light's scope lists. Its peer is
    /// released by the next sync pass.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.detach(idx);
        }
        self.release_from_scene(idx);
        self.scrub_from_light_lists(id);

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        let i = idx as usize;
        if self.has_peer[i] {
            self.pending_removed.push(id);
            self.has_peer[i] = false;
        }
        self.bits[i] = DirtyBits::empty();
        self.needs_layout[i] = false;
        self.alive[i] = false;

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// The child's subtree caches are invalidated under the new ancestry and
    /// the parent is marked [`CHILDREN`](DirtyBits::CHILDREN).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `parent` is not a group, `child`
    /// already has a parent or roots a scene, or the edge would create a
    /// cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.assert_attachable(p, c);

        self.link(p, c, INVALID);
        self.after_attach(p, c);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, `sibling`
    /// has no parent, or the edge would create a cycle.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.assert_attachable(p, c);

        self.link(p, c, s);
        self.after_attach(p, c);
    }

    /// Removes `child` from its current parent.
    ///
    /// The old parent is marked [`CHILDREN`](DirtyBits::CHILDREN), which
    /// notifies its owner so it repaints without the removed subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "node has no parent"
        );
        self.detach(child.idx);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `new_parent` is not a group, or the
    /// edge would create a cycle.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        let p = new_parent.idx;
        let c = child.idx;
        self.assert_attachable(p, c);

        if self.parent[c as usize] != INVALID {
            self.detach(c);
        }
        self.link(p, c, INVALID);
        self.after_attach(p, c);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Handle for the live node at raw slot `idx`.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Whether `ancestor` is `idx` or one of its ancestors.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    fn assert_attachable(&self, p: u32, c: u32) {
        assert!(
            matches!(self.kind[p as usize], NodeKind::Group(_)),
            "parent {:?} is not a group",
            self.id_at(p)
        );
        assert!(
            !self.is_ancestor_or_self(c, p),
            "adding {:?} under {:?} would create a cycle",
            self.id_at(c),
            self.id_at(p)
        );
        if let Some(s) = self.owner[c as usize] {
            assert!(
                self.scenes[s.0 as usize].root != Some(self.id_at(c)),
                "{:?} is the root of {s:?}",
                self.id_at(c)
            );
        }
    }

    /// Links `c` into `p`'s child list before `before`, or last if `before`
    /// is [`INVALID`].
    fn link(&mut self, p: u32, c: u32, before: u32) {
        self.parent[c as usize] = p;
        if before == INVALID {
            self.prev_sibling[c as usize] = INVALID;
            self.next_sibling[c as usize] = INVALID;
            if self.first_child[p as usize] == INVALID {
                self.first_child[p as usize] = c;
            } else {
                // Walk to last child.
                let mut last = self.first_child[p as usize];
                while self.next_sibling[last as usize] != INVALID {
                    last = self.next_sibling[last as usize];
                }
                self.next_sibling[last as usize] = c;
                self.prev_sibling[c as usize] = last;
            }
        } else {
            let prev = self.prev_sibling[before as usize];
            self.next_sibling[c as usize] = before;
            self.prev_sibling[c as usize] = prev;
            if prev != INVALID {
                self.next_sibling[prev as usize] = c;
            } else {
                // `before` was the first child.
                self.first_child[p as usize] = c;
            }
            self.prev_sibling[before as usize] = c;
        }
    }

    /// Dirty bookkeeping shared by every attach path.
    fn after_attach(&mut self, p: u32, c: u32) {
        // The child syncs after its parent.
        let _ = self.dirty.add_dependency(c, p, dirty::PEER);
        self.invalidate_ancestry(c);
        self.mark_dirty(p, DirtyBits::CHILDREN);
        if self.kind[c as usize].is_resizable() {
            self.request_layout(p);
        }
    }

    /// Unlinks `c` from its parent and notifies the old parent.
    pub(crate) fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::PEER);
        self.invalidate_ancestry(c);
        self.mark_dirty(p, DirtyBits::CHILDREN);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut graph = SceneGraph::new();
        let id = graph.create_group();
        assert!(graph.is_alive(id));
        graph.destroy_node(id);
        assert!(!graph.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut graph = SceneGraph::new();
        let id1 = graph.create_group();
        graph.destroy_node(id1);
        let id2 = graph.create_group();
        // id2 reuses the same slot but has a different generation.
        assert!(!graph.is_alive(id1));
        assert!(graph.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn add_child_and_query() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let a = graph.create_shape(Bounds::ZERO);
        let b = graph.create_shape(Bounds::ZERO);

        graph.add_child(parent, a);
        graph.add_child(parent, b);

        assert_eq!(graph.parent(a), Some(parent));
        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![a, b]);
    }

    #[test]
    fn insert_before_keeps_paint_order() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let a = graph.create_group();
        let b = graph.create_group();
        let c = graph.create_group();

        graph.add_child(parent, a);
        graph.add_child(parent, c);
        graph.insert_before(b, c);
        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);

        let first = graph.create_group();
        graph.insert_before(first, a);
        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![first, a, b, c]);
    }

    #[test]
    fn remove_and_reparent() {
        let mut graph = SceneGraph::new();
        let p1 = graph.create_group();
        let p2 = graph.create_group();
        let child = graph.create_group();

        graph.add_child(p1, child);
        graph.reparent(child, p2);
        assert_eq!(graph.parent(child), Some(p2));
        assert!(graph.children(p1).next().is_none());

        graph.remove_from_parent(child);
        assert_eq!(graph.parent(child), None);
        assert!(graph.children(p2).next().is_none());
    }

    #[test]
    fn roots_returns_parentless_nodes() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        let c = graph.create_group();
        graph.add_child(a, c);
        graph.destroy_node(b);

        assert_eq!(graph.roots(), vec![a]);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let child = graph.create_group();
        graph.add_child(parent, child);
        graph.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn cycle_is_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        graph.add_child(a, b);
        graph.reparent(a, b);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn self_parenting_is_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        graph.add_child(a, a);
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn adding_parented_child_panics() {
        let mut graph = SceneGraph::new();
        let p1 = graph.create_group();
        let p2 = graph.create_group();
        let child = graph.create_group();
        graph.add_child(p1, child);
        graph.add_child(p2, child);
    }

    #[test]
    #[should_panic(expected = "is not a group")]
    fn shapes_cannot_have_children() {
        let mut graph = SceneGraph::new();
        let shape = graph.create_shape(Bounds::ZERO);
        let child = graph.create_group();
        graph.add_child(shape, child);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut graph = SceneGraph::new();
        let id = graph.create_group();
        graph.destroy_node(id);
        let _ = graph.parent(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let id = graph.create_group();
        graph.destroy_node(id);
        graph.add_child(root, id);
    }
}
