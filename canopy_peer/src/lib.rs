// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference render-side peer tree for `canopy_core`.
//!
//! [`PeerTree`] implements [`PeerSink`]: a sync pass writes into a working
//! copy of the peer state, and [`end_sync`](PeerSink::end_sync) commits that
//! copy as an immutable, numbered [`Frame`]. Frames are shared as
//! `Arc<Frame>` through a single-slot `flume` channel, so a render thread
//! holding a [`FrameReceiver`] only ever observes complete passes and a
//! stalled reader holds at most one pending frame.
//!
//! Node and scene peers are reference counted. A commit copies pointers, and
//! a pass only clones the peers it writes to, so peers a pass leaves alone
//! are shared with the previous frame.
//!
//! ```rust,ignore
//! let (mut peers, frames) = PeerTree::channel();
//! std::thread::spawn(move || {
//!     while let Some(frame) = frames.wait() {
//!         render(&frame);
//!     }
//! });
//!
//! loop {
//!     edit(&mut graph);
//!     graph.sync(&mut peers, &mut Tracer::none());
//! }
//! ```
//!
//! Peers are append-only from the control side: nothing in this crate is
//! read back by the scene graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use canopy_core::geom::Bounds;
use canopy_core::graph::{NodeId, SceneId, SceneKind};
use canopy_core::light::LightKind;
use canopy_core::peer::{PeerKind, PeerSink, SceneUpdate};
use canopy_core::transform::Transform3d;
use palette::Srgb;

/// Render-side mirror of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerNode {
    /// Node variant.
    pub kind: PeerKind,
    /// Local-to-parent transform.
    pub transform: Transform3d,
    /// Visibility flag.
    pub visible: bool,
    /// Bounds in local space.
    pub bounds: Bounds,
    /// Children of a group, in paint order.
    pub children: Vec<NodeId>,
    /// Local-to-scene transform of a camera or light.
    pub world_transform: Transform3d,
    /// Number of times the lighting of a shape was invalidated.
    pub lighting_epoch: u64,
    /// Camera state, for camera peers.
    pub camera: Option<CameraPeer>,
    /// Light state, for light peers.
    pub light: Option<LightPeer>,
}

impl PeerNode {
    fn new(kind: PeerKind) -> Self {
        Self {
            kind,
            transform: Transform3d::IDENTITY,
            visible: true,
            bounds: Bounds::ZERO,
            children: Vec::new(),
            world_transform: Transform3d::IDENTITY,
            lighting_epoch: 0,
            camera: (kind == PeerKind::Camera).then(CameraPeer::default),
            light: (kind == PeerKind::Light).then(LightPeer::default),
        }
    }
}

/// Render-side camera state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPeer {
    /// Effective near clip distance.
    pub near_clip: f64,
    /// Effective far clip distance.
    pub far_clip: f64,
    /// Render target width.
    pub view_width: f64,
    /// Render target height.
    pub view_height: f64,
    /// Scene-to-clip transform.
    pub projection_view: Transform3d,
}

/// Render-side light state.
#[derive(Clone, Debug, PartialEq)]
pub struct LightPeer {
    /// Light color.
    pub color: Srgb<f32>,
    /// On flag.
    pub on: bool,
    /// Clamped variant parameters.
    pub params: LightKind,
    /// Scope list.
    pub scope: Vec<NodeId>,
    /// Exclusion scope list.
    pub exclusion_scope: Vec<NodeId>,
}

impl Default for LightPeer {
    fn default() -> Self {
        Self {
            color: Srgb::new(1.0, 1.0, 1.0),
            on: true,
            params: LightKind::Ambient,
            scope: Vec::new(),
            exclusion_scope: Vec::new(),
        }
    }
}

/// Render-side scene state.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePeer {
    /// Scene or sub-scene.
    pub kind: SceneKind,
    /// Root node.
    pub root: Option<NodeId>,
    /// Current camera.
    pub camera: Option<NodeId>,
    /// Owned lights.
    pub lights: Vec<NodeId>,
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// Passes in which the scene requested a repaint.
    pub repaints: u64,
}

/// A committed, immutable snapshot of the whole peer tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Sync pass that produced this frame.
    pub pass: u64,
    /// Peers by node.
    pub nodes: BTreeMap<NodeId, Arc<PeerNode>>,
    /// Scene state by scene.
    pub scenes: BTreeMap<SceneId, Arc<ScenePeer>>,
}

impl Frame {
    /// Peer of `node`, if it exists in this frame.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&PeerNode> {
        self.nodes.get(&node).map(Arc::as_ref)
    }

    /// State of `scene`, if it was ever reported.
    #[must_use]
    pub fn scene(&self, scene: SceneId) -> Option<&ScenePeer> {
        self.scenes.get(&scene).map(Arc::as_ref)
    }
}

/// Peer tree receiving sync passes on the control thread.
#[derive(Debug)]
pub struct PeerTree {
    working: Frame,
    committed: Option<Arc<Frame>>,
    sender: flume::Sender<Arc<Frame>>,
    /// Used to evict a pending frame the render side has not taken yet.
    stale: flume::Receiver<Arc<Frame>>,
}

impl PeerTree {
    /// Creates an empty peer tree and the receiver its frames are published
    /// to.
    #[must_use]
    pub fn channel() -> (Self, FrameReceiver) {
        let (sender, receiver) = flume::bounded(1);
        let tree = Self {
            working: Frame::default(),
            committed: None,
            sender,
            stale: receiver.clone(),
        };
        (tree, FrameReceiver { receiver })
    }

    /// The most recently committed frame.
    #[must_use]
    pub fn committed(&self) -> Option<&Arc<Frame>> {
        self.committed.as_ref()
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut PeerNode> {
        let peer = self.working.nodes.get_mut(&node).map(Arc::make_mut);
        if peer.is_none() {
            log::warn!("{node:?} has no peer; update ignored");
        }
        peer
    }

    /// Hands `frame` to the render side, replacing a pending frame it has
    /// not taken yet.
    fn publish(&self, frame: Arc<Frame>) {
        let frame = match self.sender.try_send(frame) {
            Ok(()) => return,
            Err(flume::TrySendError::Full(frame)) => frame,
            Err(flume::TrySendError::Disconnected(_)) => return,
        };
        if self.stale.try_recv().is_ok() {
            log::trace!("replaced pending frame before pass {}", frame.pass);
        }
        // This tree is the only sender, so the slot is free now.
        if self.sender.try_send(frame).is_err() {
            log::debug!("frame dropped; hand-off slot still full");
        }
    }
}

impl PeerSink for PeerTree {
    fn begin_sync(&mut self, pass: u64) {
        self.working.pass = pass;
    }

    fn end_sync(&mut self, pass: u64) {
        let frame = Arc::new(self.working.clone());
        self.committed = Some(Arc::clone(&frame));
        self.publish(frame);
        log::trace!("frame {pass} committed");
    }

    fn create_peer(&mut self, node: NodeId, kind: PeerKind) {
        self.working.nodes.insert(node, Arc::new(PeerNode::new(kind)));
    }

    fn release_peer(&mut self, node: NodeId) {
        if self.working.nodes.remove(&node).is_none() {
            log::warn!("released {node:?} which has no peer");
        }
    }

    fn set_transform(&mut self, node: NodeId, local_to_parent: &Transform3d) {
        if let Some(peer) = self.node_mut(node) {
            peer.transform = *local_to_parent;
        }
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(peer) = self.node_mut(node) {
            peer.visible = visible;
        }
    }

    fn set_bounds(&mut self, node: NodeId, bounds_in_local: &Bounds) {
        if let Some(peer) = self.node_mut(node) {
            peer.bounds = *bounds_in_local;
        }
    }

    fn set_children(&mut self, node: NodeId, children: &[NodeId]) {
        if let Some(peer) = self.node_mut(node) {
            peer.children.clear();
            peer.children.extend_from_slice(children);
        }
    }

    fn invalidate_lighting(&mut self, node: NodeId) {
        if let Some(peer) = self.node_mut(node) {
            peer.lighting_epoch += 1;
        }
    }

    fn set_world_transform(&mut self, node: NodeId, local_to_scene: &Transform3d) {
        if let Some(peer) = self.node_mut(node) {
            peer.world_transform = *local_to_scene;
        }
    }

    fn set_clip(&mut self, node: NodeId, near: f64, far: f64) {
        if let Some(camera) = self.node_mut(node).and_then(|p| p.camera.as_mut()) {
            camera.near_clip = near;
            camera.far_clip = far;
        }
    }

    fn set_view_size(&mut self, node: NodeId, width: f64, height: f64) {
        if let Some(camera) = self.node_mut(node).and_then(|p| p.camera.as_mut()) {
            camera.view_width = width;
            camera.view_height = height;
        }
    }

    fn set_projection_view(&mut self, node: NodeId, projection_view: &Transform3d) {
        if let Some(camera) = self.node_mut(node).and_then(|p| p.camera.as_mut()) {
            camera.projection_view = *projection_view;
        }
    }

    fn set_light_color(&mut self, node: NodeId, color: Srgb<f32>, on: bool) {
        if let Some(light) = self.node_mut(node).and_then(|p| p.light.as_mut()) {
            light.color = color;
            light.on = on;
        }
    }

    fn set_light_params(&mut self, node: NodeId, params: &LightKind) {
        if let Some(light) = self.node_mut(node).and_then(|p| p.light.as_mut()) {
            light.params = *params;
        }
    }

    fn set_scope(&mut self, node: NodeId, scope: &[NodeId], exclusion_scope: &[NodeId]) {
        if let Some(light) = self.node_mut(node).and_then(|p| p.light.as_mut()) {
            light.scope = scope.to_vec();
            light.exclusion_scope = exclusion_scope.to_vec();
        }
    }

    fn update_scene(&mut self, scene: SceneId, update: &SceneUpdate<'_>) {
        let slot = Arc::make_mut(self.working.scenes.entry(scene).or_insert_with(|| {
            Arc::new(ScenePeer {
                kind: update.kind,
                root: None,
                camera: None,
                lights: Vec::new(),
                width: 0.0,
                height: 0.0,
                repaints: 0,
            })
        }));
        slot.kind = update.kind;
        slot.root = update.root;
        slot.camera = update.camera;
        slot.lights = update.lights.to_vec();
        slot.width = update.width;
        slot.height = update.height;
        if update.needs_repaint {
            slot.repaints += 1;
        }
    }
}

/// Render-side end of the frame hand-off.
#[derive(Clone, Debug)]
pub struct FrameReceiver {
    receiver: flume::Receiver<Arc<Frame>>,
}

impl FrameReceiver {
    /// Returns the newest committed frame not yet received, skipping older
    /// ones. Does not block.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.receiver.try_iter().last()
    }

    /// Blocks until a frame is committed, then returns the newest one
    /// available. Returns `None` once the peer tree is dropped.
    #[must_use]
    pub fn wait(&self) -> Option<Arc<Frame>> {
        let first = self.receiver.recv().ok()?;
        Some(self.latest().unwrap_or(first))
    }
}
