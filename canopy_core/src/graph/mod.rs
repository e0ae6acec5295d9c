// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A [`SceneGraph`] stores every node in struct-of-arrays columns addressed
//! by generational [`NodeId`] handles. Each node has:
//!
//! - A kind ([`NodeKind`]): group, 3D shape, region, camera or light.
//! - Topology: parent, first-child and sibling links forming an ordered tree.
//!   Insertion order is paint order.
//! - Local attributes set by the caller, such as
//!   [`transform`](SceneGraph::set_transform),
//!   [`visibility`](SceneGraph::set_visible) and kind-specific values.
//! - Lazily recomputed derived values:
//!   [`local_to_scene`](SceneGraph::local_to_scene),
//!   [`scene_to_local`](SceneGraph::scene_to_local),
//!   [`bounds_in_local`](SceneGraph::bounds_in_local),
//!   [`bounds_in_parent`](SceneGraph::bounds_in_parent) and, for cameras,
//!   [`projection_view_transform`](SceneGraph::projection_view_transform).
//! - An optional *direct* owning [`Scene`] (as its root, camera or light).
//!
//! # Dirty propagation
//!
//! Every setter marks the node with the matching [`DirtyBits`] and drops the
//! caches the category feeds. The owner-notification chain then walks up the
//! tree setting [`CONTENTS`](DirtyBits::CONTENTS), stopping at the first
//! ancestor that already carries it, and finally signals the owning scene.
//! A light whose parameters change notifies what it illuminates: its whole
//! scene in O(1) when its scope is empty, otherwise only the subtrees of its
//! scope members.
//!
//! # Synchronization
//!
//! [`SceneGraph::sync`] drains the queued nodes in parent-first order,
//! revalidates the values each dirty category needs and pushes them into a
//! [`PeerSink`](crate::peer::PeerSink).
//!
//! [`DirtyBits`]: crate::dirty::DirtyBits

mod attrs;
mod derived;
mod id;
mod kind;
mod notify;
mod scene;
mod scope;
mod store;
mod sync;
#[cfg(test)]
pub(crate) mod testing;
mod traverse;

pub use id::{INVALID, NodeId, SceneId};
pub use kind::{Group, NodeKind, Region, Shape3d};
pub use scene::{Scene, SceneKind};
pub use scope::ScopeStats;
pub use store::SceneGraph;
pub use sync::SyncReport;
pub use traverse::Children;
