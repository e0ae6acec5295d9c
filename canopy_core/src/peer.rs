// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-side peer contract.
//!
//! Every live node has a *peer*: the render back end's mirror of the subset
//! of node state it needs. Peers are written only by
//! [`SceneGraph::sync`](crate::graph::SceneGraph::sync) through the
//! [`PeerSink`] trait and are never read back.
//!
//! A sync pass calls the sink in this order:
//!
//! 1. [`begin_sync`](PeerSink::begin_sync)
//! 2. [`release_peer`](PeerSink::release_peer) for nodes destroyed since the
//!    previous pass
//! 3. [`create_peer`](PeerSink::create_peer) for nodes created since the
//!    previous pass
//! 4. typed setters for every dirty node, parents before children, each value
//!    already revalidated and clamped
//! 5. [`update_scene`](PeerSink::update_scene) for every scene with a pending
//!    signal
//! 6. [`end_sync`](PeerSink::end_sync)
//!
//! The render side must not consume peer state between steps 1 and 6.

use palette::Srgb;

use crate::geom::Bounds;
use crate::graph::{NodeId, SceneId, SceneKind};
use crate::light::LightKind;
use crate::transform::Transform3d;

/// Which kind of peer to create for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    /// Group peer.
    Group,
    /// 3D shape peer.
    Shape3d,
    /// Region peer.
    Region,
    /// Camera peer.
    Camera,
    /// Light peer.
    Light,
}

/// Scene-level state pushed at the end of a sync pass.
#[derive(Clone, Copy, Debug)]
pub struct SceneUpdate<'a> {
    /// Scene or sub-scene.
    pub kind: SceneKind,
    /// Root node, if any.
    pub root: Option<NodeId>,
    /// Current camera, if any.
    pub camera: Option<NodeId>,
    /// Lights owned by the scene, in insertion order.
    pub lights: &'a [NodeId],
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// The camera or its view changed.
    pub camera_dirty: bool,
    /// Sub-scene content changed.
    pub content_dirty: bool,
    /// Something in the scene must be repainted.
    pub needs_repaint: bool,
}

/// Receives validated node state from the synchronizer.
///
/// All methods default to no-ops so a back end only implements the state it
/// consumes. Both the reference peer tree in `canopy_peer` and test doubles
/// implement this trait.
pub trait PeerSink {
    /// A sync pass is starting.
    fn begin_sync(&mut self, pass: u64) {
        _ = pass;
    }

    /// A sync pass finished; peer state is consistent.
    fn end_sync(&mut self, pass: u64) {
        _ = pass;
    }

    /// Creates the peer for a new node.
    fn create_peer(&mut self, node: NodeId, kind: PeerKind) {
        _ = (node, kind);
    }

    /// Releases the peer of a destroyed node.
    fn release_peer(&mut self, node: NodeId) {
        _ = node;
    }

    /// Local-to-parent transform.
    fn set_transform(&mut self, node: NodeId, local_to_parent: &Transform3d) {
        _ = (node, local_to_parent);
    }

    /// Visibility flag.
    fn set_visible(&mut self, node: NodeId, visible: bool) {
        _ = (node, visible);
    }

    /// Bounds in local space.
    fn set_bounds(&mut self, node: NodeId, bounds_in_local: &Bounds) {
        _ = (node, bounds_in_local);
    }

    /// Child list of a group, in paint order.
    fn set_children(&mut self, node: NodeId, children: &[NodeId]) {
        _ = (node, children);
    }

    /// Lighting inputs of a shape changed.
    fn invalidate_lighting(&mut self, node: NodeId) {
        _ = node;
    }

    /// Local-to-scene transform of a camera or light.
    fn set_world_transform(&mut self, node: NodeId, local_to_scene: &Transform3d) {
        _ = (node, local_to_scene);
    }

    /// Effective clip distances of a camera.
    fn set_clip(&mut self, node: NodeId, near: f64, far: f64) {
        _ = (node, near, far);
    }

    /// Render target size of a camera.
    fn set_view_size(&mut self, node: NodeId, width: f64, height: f64) {
        _ = (node, width, height);
    }

    /// Projection × view × scene-to-local transform of a camera.
    fn set_projection_view(&mut self, node: NodeId, projection_view: &Transform3d) {
        _ = (node, projection_view);
    }

    /// Color and on flag of a light.
    fn set_light_color(&mut self, node: NodeId, color: Srgb<f32>, on: bool) {
        _ = (node, color, on);
    }

    /// Clamped variant parameters of a light.
    fn set_light_params(&mut self, node: NodeId, params: &LightKind) {
        _ = (node, params);
    }

    /// Scope lists of a light.
    fn set_scope(&mut self, node: NodeId, scope: &[NodeId], exclusion_scope: &[NodeId]) {
        _ = (node, scope, exclusion_scope);
    }

    /// Scene-level state.
    fn update_scene(&mut self, scene: SceneId, update: &SceneUpdate<'_>) {
        _ = (scene, update);
    }
}
