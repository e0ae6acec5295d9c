// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::SceneGraph;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`SceneGraph::children`].
#[derive(Debug)]
pub struct Children<'a> {
    graph: &'a SceneGraph,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(graph: &'a SceneGraph, first: u32) -> Self {
        Self {
            graph,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.graph.next_sibling[idx as usize];
        Some(self.graph.id_at(idx))
    }
}

impl SceneGraph {
    /// Returns the subtree rooted at `root` in depth-first pre-order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn depth_first(&self, root: NodeId) -> Vec<NodeId> {
        self.validate(root);
        let mut order = Vec::new();
        let mut stack = Vec::from([root.idx]);
        while let Some(idx) = stack.pop() {
            order.push(self.id_at(idx));
            let start = stack.len();
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            // First child must pop first.
            stack[start..].reverse();
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn children_iterates_in_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let a = graph.create_group();
        let b = graph.create_group();
        graph.add_child(root, a);
        graph.add_child(root, b);
        assert_eq!(graph.children(root).collect::<Vec<_>>(), vec![a, b]);
        assert!(graph.children(a).next().is_none());
    }

    #[test]
    fn depth_first_is_pre_order() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        let c = graph.create_group();
        let d = graph.create_group();

        // Tree: a -> [b -> [d], c]
        graph.add_child(a, b);
        graph.add_child(a, c);
        graph.add_child(b, d);

        assert_eq!(graph.depth_first(a), vec![a, b, d, c]);
    }
}
