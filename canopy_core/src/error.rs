// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by scene ownership operations.

use thiserror::Error;

use crate::graph::{NodeId, SceneId};

/// A node could not be attached to a scene because another owner or role
/// holds it.
///
/// Returned by [`SceneGraph::set_camera`](crate::graph::SceneGraph::set_camera),
/// [`SceneGraph::add_light`](crate::graph::SceneGraph::add_light) and
/// [`SceneGraph::set_root`](crate::graph::SceneGraph::set_root). A failed call
/// leaves every scene unchanged.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// The camera is already held by another scene.
    #[error("camera {camera:?} is already owned by {owner:?}")]
    CameraOwned {
        /// The rejected camera.
        camera: NodeId,
        /// Its current owner.
        owner: SceneId,
    },
    /// The light is already held by another scene.
    #[error("light {light:?} is already owned by {owner:?}")]
    LightOwned {
        /// The rejected light.
        light: NodeId,
        /// Its current owner.
        owner: SceneId,
    },
    /// The node is already held by another scene.
    #[error("node {node:?} is already owned by {owner:?}")]
    RootOwned {
        /// The rejected root.
        node: NodeId,
        /// Its current owner.
        owner: SceneId,
    },
    /// The node already holds a different role in the same scene, such as
    /// a camera that roots the scene being made its current camera.
    #[error("node {node:?} already holds another role in {owner:?}")]
    OtherRole {
        /// The rejected node.
        node: NodeId,
        /// The scene it already belongs to.
        owner: SceneId,
    },
    /// The node is a child of another node and cannot root a scene.
    #[error("node {node:?} has a parent and cannot be a scene root")]
    RootHasParent {
        /// The rejected root.
        node: NodeId,
    },
}
