// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the graph unit tests.

use alloc::vec::Vec;

use palette::Srgb;

use crate::geom::Bounds;
use crate::light::LightKind;
use crate::peer::{PeerKind, PeerSink, SceneUpdate};
use crate::trace::Tracer;
use crate::transform::Transform3d;

use super::id::{NodeId, SceneId};
use super::store::SceneGraph;

struct Discard;

impl PeerSink for Discard {}

/// Runs a sync pass into a sink that drops everything, leaving the graph
/// with no dirty state.
pub(crate) fn settle(graph: &mut SceneGraph) {
    let _ = graph.sync(&mut Discard, &mut Tracer::none());
}

/// One recorded [`PeerSink`] call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Begin(u64),
    End(u64),
    Create(NodeId, PeerKind),
    Release(NodeId),
    Transform(NodeId, Transform3d),
    Visible(NodeId, bool),
    Bounds(NodeId, Bounds),
    Children(NodeId, Vec<NodeId>),
    Lighting(NodeId),
    WorldTransform(NodeId, Transform3d),
    Clip(NodeId, f64, f64),
    ViewSize(NodeId, f64, f64),
    ProjectionView(NodeId, Transform3d),
    LightColor(NodeId, Srgb<f32>, bool),
    LightParams(NodeId, LightKind),
    Scope(NodeId, Vec<NodeId>, Vec<NodeId>),
    /// Scene id, then its camera-dirty, content-dirty and repaint signals.
    Scene(SceneId, bool, bool, bool),
}

/// Records every call in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) calls: Vec<Call>,
}

impl PeerSink for RecordingSink {
    fn begin_sync(&mut self, pass: u64) {
        self.calls.push(Call::Begin(pass));
    }

    fn end_sync(&mut self, pass: u64) {
        self.calls.push(Call::End(pass));
    }

    fn create_peer(&mut self, node: NodeId, kind: PeerKind) {
        self.calls.push(Call::Create(node, kind));
    }

    fn release_peer(&mut self, node: NodeId) {
        self.calls.push(Call::Release(node));
    }

    fn set_transform(&mut self, node: NodeId, local_to_parent: &Transform3d) {
        self.calls.push(Call::Transform(node, *local_to_parent));
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.calls.push(Call::Visible(node, visible));
    }

    fn set_bounds(&mut self, node: NodeId, bounds_in_local: &Bounds) {
        self.calls.push(Call::Bounds(node, *bounds_in_local));
    }

    fn set_children(&mut self, node: NodeId, children: &[NodeId]) {
        self.calls.push(Call::Children(node, children.to_vec()));
    }

    fn invalidate_lighting(&mut self, node: NodeId) {
        self.calls.push(Call::Lighting(node));
    }

    fn set_world_transform(&mut self, node: NodeId, local_to_scene: &Transform3d) {
        self.calls.push(Call::WorldTransform(node, *local_to_scene));
    }

    fn set_clip(&mut self, node: NodeId, near: f64, far: f64) {
        self.calls.push(Call::Clip(node, near, far));
    }

    fn set_view_size(&mut self, node: NodeId, width: f64, height: f64) {
        self.calls.push(Call::ViewSize(node, width, height));
    }

    fn set_projection_view(&mut self, node: NodeId, projection_view: &Transform3d) {
        self.calls.push(Call::ProjectionView(node, *projection_view));
    }

    fn set_light_color(&mut self, node: NodeId, color: Srgb<f32>, on: bool) {
        self.calls.push(Call::LightColor(node, color, on));
    }

    fn set_light_params(&mut self, node: NodeId, params: &LightKind) {
        self.calls.push(Call::LightParams(node, *params));
    }

    fn set_scope(&mut self, node: NodeId, scope: &[NodeId], exclusion_scope: &[NodeId]) {
        self.calls
            .push(Call::Scope(node, scope.to_vec(), exclusion_scope.to_vec()));
    }

    fn update_scene(&mut self, scene: SceneId, update: &SceneUpdate<'_>) {
        self.calls.push(Call::Scene(
            scene,
            update.camera_dirty,
            update.content_dirty,
            update.needs_repaint,
        ));
    }
}
