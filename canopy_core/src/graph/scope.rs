// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Light scope resolution.
//!
//! A light's [`scope`](crate::light::Light::scope) and
//! [`exclusion_scope`](crate::light::Light::exclusion_scope) are disjoint
//! ordered lists of node references. Membership of the closest listed
//! ancestor decides whether a node is lit: an empty scope means the whole
//! owning scene, minus excluded subtrees.
//!
//! Every list edit re-evaluates lighting only where it can have changed:
//!
//! - Inserting a node that is present in the other list first removes it
//!   there. That removal performs the walk, and the insertion skips its own.
//! - Otherwise the edited node's subtree is walked by
//!   [`mark_children_dirty`](SceneGraph::mark_children_dirty), which marks
//!   shapes [`DRAW_MODE`](DirtyBits::DRAW_MODE) and does not descend into
//!   children that are themselves listed, since their own membership
//!   overrides the edited ancestor's.
//! - When the scope flips between empty and non-empty the light's reach
//!   changes everywhere, so the owning scene is signalled as a whole instead.

use alloc::vec::Vec;

use crate::dirty::DirtyBits;
use crate::light::Light;

use super::id::{INVALID, NodeId};
use super::kind::NodeKind;
use super::store::SceneGraph;

/// Counters for scope resolution work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeStats {
    /// Calls to [`SceneGraph::mark_children_dirty`].
    pub walks: u64,
    /// Nodes visited across all walks.
    pub visits: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum List {
    Scope,
    Exclusion,
}

impl SceneGraph {
    /// Adds `node` to the scope of `light`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    pub fn add_to_scope(&mut self, light: NodeId, node: NodeId) {
        self.insert_into(light, node, List::Scope);
    }

    /// Removes `node` from the scope of `light`. Returns whether it was
    /// present.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    pub fn remove_from_scope(&mut self, light: NodeId, node: NodeId) -> bool {
        self.validate(node);
        self.remove_from(light, node, List::Scope)
    }

    /// Adds `node` to the exclusion scope of `light`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    pub fn add_to_exclusion_scope(&mut self, light: NodeId, node: NodeId) {
        self.insert_into(light, node, List::Exclusion);
    }

    /// Removes `node` from the exclusion scope of `light`. Returns whether it
    /// was present.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    pub fn remove_from_exclusion_scope(&mut self, light: NodeId, node: NodeId) -> bool {
        self.validate(node);
        self.remove_from(light, node, List::Exclusion)
    }

    /// Scope of `light`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    #[must_use]
    pub fn scope(&self, light: NodeId) -> &[NodeId] {
        self.light(light).scope()
    }

    /// Exclusion scope of `light`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a light.
    #[must_use]
    pub fn exclusion_scope(&self, light: NodeId) -> &[NodeId] {
        self.light(light).exclusion_scope()
    }

    /// Returns whether `light` illuminates `node`.
    ///
    /// The light must be on and belong to the same scene as the node. The
    /// closest ancestor-or-self of `node` listed by the light decides: an
    /// excluded one means unlit, a scoped one means lit. With no listed
    /// ancestor the node is lit only when the scope is empty.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    #[must_use]
    pub fn is_lit_by(&self, light: NodeId, node: NodeId) -> bool {
        self.validate(node);
        let l = self.light(light);
        if !l.is_on() {
            return false;
        }
        let scene = self.owning_scene_at(light.idx);
        if scene.is_none() || scene != self.owning_scene_at(node.idx) {
            return false;
        }
        let mut idx = node.idx;
        while idx != INVALID {
            let id = self.id_at(idx);
            if l.exclusion_scope.contains(&id) {
                return false;
            }
            if l.scope.contains(&id) {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        l.scope.is_empty()
    }

    /// Marks every shape under `node` whose lighting by `light` may have
    /// changed.
    ///
    /// Shapes get [`DRAW_MODE`](DirtyBits::DRAW_MODE), which invalidates no
    /// cache. Groups are descended into, except for children listed in either
    /// of the light's lists.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `light` is not a light.
    pub fn mark_children_dirty(&mut self, light: NodeId, node: NodeId) {
        self.validate(node);
        let l = self.light(light);
        let mut shapes = Vec::new();
        let mut visits = 0_u64;
        let mut stack = Vec::from([node.idx]);
        while let Some(idx) = stack.pop() {
            visits += 1;
            match &self.kind[idx as usize] {
                kind if kind.is_light_affectable() => shapes.push(idx),
                NodeKind::Group(_) => {
                    let mut child = self.first_child[idx as usize];
                    while child != INVALID {
                        if !l.lists_contain(self.id_at(child)) {
                            stack.push(child);
                        }
                        child = self.next_sibling[child as usize];
                    }
                }
                _ => {}
            }
        }
        self.scope_stats.walks += 1;
        self.scope_stats.visits += visits;
        for idx in shapes {
            self.mark_dirty(idx, DirtyBits::DRAW_MODE);
        }
    }

    /// Scope resolution counters.
    #[must_use]
    pub fn scope_stats(&self) -> ScopeStats {
        self.scope_stats
    }

    /// Resets the scope resolution counters.
    pub fn reset_scope_stats(&mut self) {
        self.scope_stats = ScopeStats::default();
    }

    fn insert_into(&mut self, light: NodeId, node: NodeId, list: List) {
        self.validate(node);
        let l = self.light(light);
        let (target, sibling) = match list {
            List::Scope => (&l.scope, &l.exclusion_scope),
            List::Exclusion => (&l.exclusion_scope, &l.scope),
        };
        if target.contains(&node) {
            return;
        }
        let moved = sibling.contains(&node);
        if moved {
            // The removal walks the subtree; the insertion must not repeat it.
            let sibling_list = match list {
                List::Scope => List::Exclusion,
                List::Exclusion => List::Scope,
            };
            self.remove_from(light, node, sibling_list);
        }

        let l = self.light_at_mut(light.idx);
        let was_empty = l.scope.is_empty();
        match list {
            List::Scope => l.scope.push(node),
            List::Exclusion => l.exclusion_scope.push(node),
        }
        self.mark_dirty(light.idx, DirtyBits::LIGHT_SCOPE);

        if list == List::Scope && was_empty {
            self.signal_owning_scene(light.idx);
        } else if !moved {
            self.mark_children_dirty(light, node);
        }
    }

    fn remove_from(&mut self, light: NodeId, node: NodeId, list: List) -> bool {
        self.validate(light);
        let l = self.light_at_mut(light.idx);
        let target = match list {
            List::Scope => &mut l.scope,
            List::Exclusion => &mut l.exclusion_scope,
        };
        let Some(pos) = target.iter().position(|&n| n == node) else {
            return false;
        };
        target.remove(pos);
        let now_empty = list == List::Scope && l.scope.is_empty();
        self.mark_dirty(light.idx, DirtyBits::LIGHT_SCOPE);

        if now_empty {
            self.signal_owning_scene(light.idx);
        } else {
            self.mark_children_dirty(light, node);
        }
        true
    }

    /// Removes a destroyed node from every light's lists.
    pub(crate) fn scrub_from_light_lists(&mut self, node: NodeId) {
        let lights: Vec<u32> = (0..self.len)
            .filter(|&idx| match &self.kind[idx as usize] {
                NodeKind::Light(l) => self.alive[idx as usize] && l.lists_contain(node),
                _ => false,
            })
            .collect();
        for idx in lights {
            let l = self.light_at_mut(idx);
            let had_scope = !l.scope.is_empty();
            l.scope.retain(|&n| n != node);
            l.exclusion_scope.retain(|&n| n != node);
            let now_empty = had_scope && l.scope.is_empty();
            self.mark_dirty(idx, DirtyBits::LIGHT_SCOPE);
            if now_empty {
                self.signal_owning_scene(idx);
            }
        }
    }

    pub(crate) fn light_at_mut(&mut self, idx: u32) -> &mut Light {
        if !matches!(self.kind[idx as usize], NodeKind::Light(_)) {
            panic!("{:?} is not a light", self.id_at(idx));
        }
        match &mut self.kind[idx as usize] {
            NodeKind::Light(light) => light,
            _ => unreachable!(),
        }
    }
}
