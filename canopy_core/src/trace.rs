// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the synchronization pass.
//!
//! [`TraceSink`] has one method per event, each defaulting to a no-op.
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.

use crate::dirty::DirtyBits;
use crate::graph::{NodeId, SceneId, SyncReport};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a sync pass starts.
#[derive(Clone, Copy, Debug)]
pub struct SyncBeginEvent {
    /// Pass counter.
    pub pass: u64,
    /// Nodes created since the previous pass.
    pub pending_added: usize,
    /// Peers awaiting release.
    pub pending_removed: usize,
}

/// Emitted after a node's dirty state was pushed to its peer.
#[derive(Clone, Copy, Debug)]
pub struct NodeSyncedEvent {
    /// Pass counter.
    pub pass: u64,
    /// The node.
    pub node: NodeId,
    /// Bits that were pushed and cleared.
    pub bits: DirtyBits,
}

/// Emitted when a scene's coarse signals are flushed.
#[derive(Clone, Copy, Debug)]
pub struct SceneNotifiedEvent {
    /// Pass counter.
    pub pass: u64,
    /// The scene.
    pub scene: SceneId,
    /// `mark_camera_dirty` was called since the last pass.
    pub camera_dirty: bool,
    /// `mark_content_dirty` was called since the last pass.
    pub content_dirty: bool,
    /// `set_needs_repaint` was called since the last pass.
    pub needs_repaint: bool,
}

/// Emitted when a sync pass ends.
#[derive(Clone, Copy, Debug)]
pub struct SyncEndEvent {
    /// Totals for the pass.
    pub report: SyncReport,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the synchronizer.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called at the start of a sync pass.
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        _ = e;
    }

    /// Called once per synchronized node.
    fn on_node_synced(&mut self, e: &NodeSyncedEvent) {
        _ = e;
    }

    /// Called once per scene whose signals were flushed.
    fn on_scene_notified(&mut self, e: &SceneNotifiedEvent) {
        _ = e;
    }

    /// Called at the end of a sync pass.
    fn on_sync_end(&mut self, e: &SyncEndEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SyncBeginEvent`].
    #[inline]
    pub fn sync_begin(&mut self, e: &SyncBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeSyncedEvent`].
    #[inline]
    pub fn node_synced(&mut self, e: &NodeSyncedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_synced(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SceneNotifiedEvent`].
    #[inline]
    pub fn scene_notified(&mut self, e: &SceneNotifiedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scene_notified(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SyncEndEvent`].
    #[inline]
    pub fn sync_end(&mut self, e: &SyncEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
