// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-state categories and the synchronization queue channel.
//!
//! Every node carries a [`DirtyBits`] set recording which categories of its
//! state are stale with respect to its render-side peer. Setting a bit is
//! idempotent; bits are only cleared by
//! [`SceneGraph::sync`](crate::graph::SceneGraph::sync) after the
//! corresponding value has been pushed to the peer.
//!
//! # Categories
//!
//! - **Local**: [`TRANSFORM`](DirtyBits::TRANSFORM),
//!   [`GEOMETRY`](DirtyBits::GEOMETRY), [`VISIBILITY`](DirtyBits::VISIBILITY)
//!   and [`CHILDREN`](DirtyBits::CHILDREN) describe the node's own attributes.
//! - **Derived**: [`WORLD_TRANSFORM`](DirtyBits::WORLD_TRANSFORM) is set on
//!   cameras and lights whose local-to-scene transform was invalidated by an
//!   ancestor.
//! - **Propagation**: [`CONTENTS`](DirtyBits::CONTENTS) is set on every
//!   ancestor of a dirty node. An ancestor that already carries it stops the
//!   upward walk, which bounds propagation to the tree depth.
//! - **Lighting**: [`DRAW_MODE`](DirtyBits::DRAW_MODE) is the cheap "lighting
//!   inputs changed" bit placed on shapes by scope resolution; it invalidates
//!   no cache. [`LIGHT`](DirtyBits::LIGHT),
//!   [`LIGHT_PARAMS`](DirtyBits::LIGHT_PARAMS) and
//!   [`LIGHT_SCOPE`](DirtyBits::LIGHT_SCOPE) belong to light nodes.
//! - **Camera**: [`CAMERA`](DirtyBits::CAMERA) covers clip distances, view
//!   size and projection parameters.
//!
//! # Queueing
//!
//! Nodes with any bit set are queued on the [`PEER`] channel of the store's
//! [`understory_dirty::DirtyTracker`]. Child-to-parent dependency edges on the
//! same channel keep the drain order deterministic, parents first.

use bitflags::bitflags;
use understory_dirty::Channel;

/// Node has at least one dirty bit and must be visited by the next sync pass.
pub const PEER: Channel = Channel::new(0);

bitflags! {
    /// Categories of node state that are stale with respect to the peer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyBits: u16 {
        /// Local transform changed.
        const TRANSFORM = 1 << 0;
        /// Local-to-scene transform of a camera or light changed.
        const WORLD_TRANSFORM = 1 << 1;
        /// Geometry or size changed; bounds must be pushed again.
        const GEOMETRY = 1 << 2;
        /// Visibility flag changed.
        const VISIBILITY = 1 << 3;
        /// Child list changed.
        const CHILDREN = 1 << 4;
        /// Some descendant is dirty.
        const CONTENTS = 1 << 5;
        /// Lighting of a shape must be re-evaluated.
        const DRAW_MODE = 1 << 6;
        /// Camera clip distances, view size or projection changed.
        const CAMERA = 1 << 7;
        /// Light color or on/off flag changed.
        const LIGHT = 1 << 8;
        /// Attenuation, direction or cone parameters changed.
        const LIGHT_PARAMS = 1 << 9;
        /// Scope or exclusion-scope list changed.
        const LIGHT_SCOPE = 1 << 10;
    }
}

impl DirtyBits {
    /// Bits that change a node's own extent.
    pub const BOUNDS_AFFECTING: Self = Self::TRANSFORM
        .union(Self::GEOMETRY)
        .union(Self::VISIBILITY)
        .union(Self::CHILDREN);

    /// Bits on a light that require notifying whatever the light illuminates.
    pub const LIGHT_NOTIFYING: Self = Self::LIGHT
        .union(Self::LIGHT_PARAMS)
        .union(Self::WORLD_TRANSFORM);
}
