// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode scene graph with incremental dirty propagation.
//!
//! `canopy_core` holds a tree of renderable nodes (groups, 3D shapes,
//! resizable regions, cameras and lights) that is edited on a single control
//! thread and periodically pushed to a render-side *peer* representation. It
//! is `no_std` compatible (with `alloc`) and stores nodes in struct-of-arrays
//! columns addressed by generational handles.
//!
//! # Architecture
//!
//! ```text
//!   attribute setter (set_transform, set_near_clip, add_to_scope, ...)
//!       │
//!       ▼
//!   mark_dirty(node, bits) ──► invalidate TransformCache / BoundsCache
//!       │
//!       ▼
//!   mark_owner_dirty ──► parent CONTENTS chain ──► Scene / SubScene signal
//!       │
//!       ▼  (end of the update batch)
//!   SceneGraph::sync() ──► revalidate caches ──► PeerSink setters
//! ```
//!
//! **[`graph`]**: The [`SceneGraph`](graph::SceneGraph) store: topology,
//! node attributes, lazily recomputed transforms and bounds, the
//! owner-notification chain, light scope resolution, scene ownership and the
//! synchronization pass.
//!
//! **[`dirty`]**: [`DirtyBits`](dirty::DirtyBits), the per-node set of stale
//! categories, and the `understory_dirty` channel used to queue nodes for
//! synchronization.
//!
//! **[`camera`]** / **[`light`]**: Attribute records for camera and light
//! nodes, including read-time clamping of out-of-range values and the
//! projection and pick-ray math.
//!
//! **[`peer`]**: The [`PeerSink`](peer::PeerSink) trait that render back
//! ends implement to receive validated state.
//!
//! **[`transform`]** / **[`geom`]**: 4×4 transforms, vectors, bounds and rays.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) hooks for the
//! synchronization pass, with a zero-overhead [`Tracer`](trace::Tracer).
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod cache;

pub mod camera;
pub mod dirty;
pub mod error;
pub mod geom;
pub mod graph;
pub mod light;
pub mod peer;
pub mod trace;
pub mod transform;
