// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Peer synchronization.
//!
//! A sync pass pushes every dirty node's revalidated state into a
//! [`PeerSink`] and then clears the node's [`DirtyBits`]:
//!
//! 1. **Lifecycle**: release peers of destroyed nodes, then create peers
//!    for new ones.
//! 2. **Layout**: run the pending layout pass so region sizes are final.
//! 3. **Nodes**: drain the [`PEER`](dirty::PEER) channel parents first. For
//!    each set bit, read the value through the cache getters (recomputing it
//!    if needed) and call the matching setter.
//! 4. **Scenes**: report and clear the coarse signals of every scene that
//!    raised one.
//!
//! The pass never reads back from the sink.

use alloc::vec::Vec;

use crate::dirty::{self, DirtyBits};
use crate::peer::{PeerSink, SceneUpdate};
use crate::trace::{NodeSyncedEvent, SceneNotifiedEvent, SyncBeginEvent, SyncEndEvent, Tracer};

use super::id::SceneId;
use super::kind::NodeKind;
use super::store::SceneGraph;

/// Summary of one [`SceneGraph::sync`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pass number, starting at 1.
    pub pass: u64,
    /// Peers created for new nodes.
    pub peers_created: usize,
    /// Peers released for destroyed nodes.
    pub peers_released: usize,
    /// Nodes whose dirty state was pushed.
    pub nodes_synced: usize,
    /// Scenes whose signals were reported.
    pub scenes_updated: usize,
}

impl SceneGraph {
    /// Pushes all pending changes into `sink` and clears dirty state.
    ///
    /// After this returns, every live node has a peer, every dirty bit is
    /// clear, and no scene has a pending signal.
    pub fn sync(&mut self, sink: &mut dyn PeerSink, tracer: &mut Tracer<'_>) -> SyncReport {
        self.sync_pass += 1;
        let mut report = SyncReport {
            pass: self.sync_pass,
            ..SyncReport::default()
        };
        tracer.sync_begin(&SyncBeginEvent {
            pass: report.pass,
            pending_added: self.pending_added.len(),
            pending_removed: self.pending_removed.len(),
        });
        sink.begin_sync(report.pass);

        // Lifecycle.
        for id in core::mem::take(&mut self.pending_removed) {
            sink.release_peer(id);
            report.peers_released += 1;
        }
        for idx in core::mem::take(&mut self.pending_added) {
            let i = idx as usize;
            if !self.alive[i] || self.has_peer[i] {
                continue;
            }
            self.has_peer[i] = true;
            sink.create_peer(self.id_at(idx), self.kind[i].peer_kind());
            report.peers_created += 1;
        }

        self.layout();

        // Nodes, parents first.
        let queued: Vec<u32> = self
            .dirty
            .drain(dirty::PEER)
            .deterministic()
            .run()
            .collect();
        for idx in queued {
            let i = idx as usize;
            if !self.alive[i] {
                continue;
            }
            let bits = core::mem::take(&mut self.bits[i]);
            self.push_node(idx, bits, sink);
            report.nodes_synced += 1;
            tracer.node_synced(&NodeSyncedEvent {
                pass: report.pass,
                node: self.id_at(idx),
                bits,
            });
        }

        // Scenes.
        for (i, slot) in self.scenes.iter_mut().enumerate() {
            if !slot.has_signal() {
                continue;
            }
            #[expect(
                clippy::cast_possible_truncation,
                reason = "scene count is bounded by SceneId's u32"
            )]
            let scene = SceneId(i as u32);
            sink.update_scene(
                scene,
                &SceneUpdate {
                    kind: slot.kind(),
                    root: slot.root(),
                    camera: slot.camera(),
                    lights: slot.lights(),
                    width: slot.width(),
                    height: slot.height(),
                    camera_dirty: slot.camera_dirty(),
                    content_dirty: slot.content_dirty(),
                    needs_repaint: slot.needs_repaint(),
                },
            );
            tracer.scene_notified(&SceneNotifiedEvent {
                pass: report.pass,
                scene,
                camera_dirty: slot.camera_dirty(),
                content_dirty: slot.content_dirty(),
                needs_repaint: slot.needs_repaint(),
            });
            slot.clear_signals();
            report.scenes_updated += 1;
        }

        sink.end_sync(report.pass);
        tracer.sync_end(&SyncEndEvent { report });
        log::debug!(
            "sync pass {}: {} created, {} released, {} nodes, {} scenes",
            report.pass,
            report.peers_created,
            report.peers_released,
            report.nodes_synced,
            report.scenes_updated
        );
        report
    }

    /// Pushes the values behind `bits` for the node at `idx`.
    fn push_node(&self, idx: u32, bits: DirtyBits, sink: &mut dyn PeerSink) {
        let i = idx as usize;
        let id = self.id_at(idx);

        if bits.contains(DirtyBits::TRANSFORM) {
            sink.set_transform(id, &self.local_transform[i]);
        }
        if bits.contains(DirtyBits::VISIBILITY) {
            sink.set_visible(id, self.visible[i]);
        }

        match &self.kind[i] {
            NodeKind::Group(_) => {
                if bits.contains(DirtyBits::CHILDREN) {
                    let children: Vec<_> = self.children(id).collect();
                    sink.set_children(id, &children);
                }
                if bits.intersects(DirtyBits::GEOMETRY | DirtyBits::CHILDREN) {
                    sink.set_bounds(id, &self.bounds_in_local_at(idx));
                }
            }
            NodeKind::Shape3d(_) => {
                if bits.contains(DirtyBits::GEOMETRY) {
                    sink.set_bounds(id, &self.bounds_in_local_at(idx));
                }
                if bits.contains(DirtyBits::DRAW_MODE) {
                    sink.invalidate_lighting(id);
                }
            }
            NodeKind::Region(_) => {
                if bits.contains(DirtyBits::GEOMETRY) {
                    sink.set_bounds(id, &self.bounds_in_local_at(idx));
                }
            }
            NodeKind::Camera(camera) => {
                let moved = bits.intersects(DirtyBits::TRANSFORM | DirtyBits::WORLD_TRANSFORM);
                if moved {
                    sink.set_world_transform(id, &self.local_to_scene_at(idx));
                }
                if bits.contains(DirtyBits::CAMERA) {
                    sink.set_clip(id, camera.effective_near_clip(), camera.effective_far_clip());
                    let (width, height) = camera.effective_view_size();
                    sink.set_view_size(id, width, height);
                }
                if moved || bits.contains(DirtyBits::CAMERA) {
                    sink.set_projection_view(id, &self.projection_view_transform(id));
                }
            }
            NodeKind::Light(light) => {
                if bits.intersects(DirtyBits::TRANSFORM | DirtyBits::WORLD_TRANSFORM) {
                    sink.set_world_transform(id, &self.local_to_scene_at(idx));
                }
                if bits.contains(DirtyBits::LIGHT) {
                    sink.set_light_color(id, light.color(), light.is_on());
                }
                if bits.contains(DirtyBits::LIGHT_PARAMS) {
                    sink.set_light_params(id, &light.kind().effective());
                }
                if bits.contains(DirtyBits::LIGHT_SCOPE) {
                    sink.set_scope(id, light.scope(), light.exclusion_scope());
                }
            }
        }
    }
}
