// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily recomputed transforms and bounds, and the layout pass.
//!
//! Every getter here reads through a [`Cached`](crate::cache::Cached) slot:
//! a valid value is returned as is, an invalid one is recomputed from the
//! node's current attributes and its parent's or children's current cached
//! values. Recomputation only writes the node's own cache.

use alloc::vec::Vec;

use kurbo::Point;

use crate::geom::{Bounds, Ray, Vec3};
use crate::transform::Transform3d;

use super::id::{INVALID, NodeId};
use super::kind::NodeKind;
use super::store::SceneGraph;

impl SceneGraph {
    // -- Transforms --

    /// Local-to-parent transform. Same as
    /// [`local_transform`](Self::local_transform).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn local_to_parent(&self, id: NodeId) -> Transform3d {
        self.local_transform(id)
    }

    /// Composition of every local transform from the root down to the node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn local_to_scene(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.local_to_scene_at(id.idx)
    }

    /// Inverse of [`local_to_scene`](Self::local_to_scene).
    ///
    /// A non-invertible transform yields the identity and logs a warning.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn scene_to_local(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.scene_to_local_at(id.idx)
    }

    pub(crate) fn local_to_scene_at(&self, idx: u32) -> Transform3d {
        let i = idx as usize;
        self.local_to_scene[i].get_or_update(|| {
            let local = self.local_transform[i];
            match self.parent[i] {
                INVALID => local,
                p => self.local_to_scene_at(p) * local,
            }
        })
    }

    pub(crate) fn scene_to_local_at(&self, idx: u32) -> Transform3d {
        self.scene_to_local[idx as usize].get_or_update(|| {
            self.local_to_scene_at(idx).inverse().unwrap_or_else(|| {
                log::warn!(
                    "{:?}: local-to-scene transform is not invertible, using identity",
                    self.id_at(idx)
                );
                Transform3d::IDENTITY
            })
        })
    }

    // -- Bounds --

    /// Extent of the node in its own coordinate space.
    ///
    /// Groups take the union of their visible children's
    /// [`bounds_in_parent`](Self::bounds_in_parent); an empty group is
    /// zero-sized at the origin, as are cameras and lights.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn bounds_in_local(&self, id: NodeId) -> Bounds {
        self.validate(id);
        self.bounds_in_local_at(id.idx)
    }

    /// Extent of the node in its parent's coordinate space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn bounds_in_parent(&self, id: NodeId) -> Bounds {
        self.validate(id);
        self.bounds_in_parent_at(id.idx)
    }

    /// Bounds used by layout. Runs the pending layout pass first, so region
    /// sizes reflect their preferred sizes.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn layout_bounds(&mut self, id: NodeId) -> Bounds {
        self.validate(id);
        self.layout();
        self.bounds_in_local_at(id.idx)
    }

    pub(crate) fn bounds_in_local_at(&self, idx: u32) -> Bounds {
        let i = idx as usize;
        self.bounds_in_local[i].get_or_update(|| match &self.kind[i] {
            NodeKind::Group(_) => {
                let mut union: Option<Bounds> = None;
                let mut child = self.first_child[i];
                while child != INVALID {
                    if self.visible[child as usize] {
                        let b = self.bounds_in_parent_at(child);
                        // Extentless children do not stretch the union.
                        if !b.is_empty() {
                            union = Some(union.map_or(b, |u| u.union(&b)));
                        }
                    }
                    child = self.next_sibling[child as usize];
                }
                union.unwrap_or(Bounds::ZERO)
            }
            NodeKind::Shape3d(shape) => shape.geometry,
            NodeKind::Region(region) => Bounds::from_rect(0.0, 0.0, region.width, region.height),
            NodeKind::Camera(_) | NodeKind::Light(_) => Bounds::ZERO,
        })
    }

    pub(crate) fn bounds_in_parent_at(&self, idx: u32) -> Bounds {
        self.bounds_in_parent[idx as usize].get_or_update(|| {
            self.bounds_in_local_at(idx)
                .transformed(&self.local_transform[idx as usize])
        })
    }

    // -- Layout --

    /// Resizes the region children of every group that requested layout to
    /// their preferred size.
    ///
    /// Runs automatically at the start of [`sync`](Self::sync) and from
    /// [`layout_bounds`](Self::layout_bounds).
    pub fn layout(&mut self) {
        while let Some(p) = self.layout_queue.pop() {
            let i = p as usize;
            if !self.needs_layout[i] {
                continue;
            }
            self.needs_layout[i] = false;
            if !matches!(&self.kind[i], NodeKind::Group(g) if g.auto_size_children) {
                continue;
            }

            let mut sizes = Vec::new();
            let mut child = self.first_child[i];
            while child != INVALID {
                if let NodeKind::Region(region) = &self.kind[child as usize] {
                    sizes.push((child, region.pref_width, region.pref_height));
                }
                child = self.next_sibling[child as usize];
            }
            for (child, width, height) in sizes {
                self.resize(self.id_at(child), width, height);
            }
        }
    }

    // -- Cameras --

    /// Eye-to-clip transform of a camera.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn projection_transform(&self, id: NodeId) -> Transform3d {
        let camera = self.camera(id);
        camera
            .projection_cache
            .get_or_update(|| camera.compute_projection_transform())
    }

    /// Local-to-eye transform of a camera.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn view_transform(&self, id: NodeId) -> Transform3d {
        self.camera(id).compute_view_transform()
    }

    /// Scene-to-clip transform of a camera: projection × view ×
    /// scene-to-local.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn projection_view_transform(&self, id: NodeId) -> Transform3d {
        let camera = self.camera(id);
        camera.projection_view.get_or_update(|| {
            self.projection_transform(id)
                * camera.compute_view_transform()
                * self.scene_to_local_at(id.idx)
        })
    }

    /// Eye position of a camera in scene space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn camera_position(&self, id: NodeId) -> Vec3 {
        let eye = self.camera(id).eye_position();
        self.local_to_scene_at(id.idx).transform_point(eye)
    }

    /// Scene-space pick ray of a camera through viewport point `p`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a camera.
    #[must_use]
    pub fn pick_ray(&self, id: NodeId, p: Point) -> Ray {
        let local = self.camera(id).compute_local_pick_ray(p);
        local.transformed(&self.local_to_scene_at(id.idx))
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use crate::camera::Camera;
    use crate::geom::{Bounds, Vec3};
    use crate::graph::SceneGraph;
    use crate::light::{Light, LightKind};
    use crate::transform::Transform3d;

    const EPS: f64 = 1e-9;

    #[test]
    fn local_to_scene_composes_ancestors() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let child = graph.create_group();
        graph.add_child(root, child);
        graph.set_transform(root, Transform3d::from_translation(10.0, 0.0, 0.0));
        graph.set_transform(child, Transform3d::from_scale(2.0, 2.0, 2.0));

        let p = graph
            .local_to_scene(child)
            .transform_point(Vec3::new(1.0, 1.0, 0.0));
        assert!(p.approx_eq(Vec3::new(12.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn scene_to_local_round_trips_to_identity() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let child = graph.create_group();
        graph.add_child(root, child);
        graph.set_transform(
            root,
            Transform3d::from_rotation_z(0.7) * Transform3d::from_translation(3.0, -4.0, 5.0),
        );
        graph.set_transform(child, Transform3d::from_scale(0.5, 3.0, 2.0));

        let product = graph.local_to_scene(child) * graph.scene_to_local(child);
        assert!(product.approx_eq(&Transform3d::IDENTITY, EPS));
    }

    #[test]
    fn degenerate_transform_inverts_to_identity() {
        let mut graph = SceneGraph::new();
        let node = graph.create_group();
        graph.set_transform(node, Transform3d::from_scale(0.0, 1.0, 1.0));
        assert_eq!(graph.scene_to_local(node), Transform3d::IDENTITY);
    }

    #[test]
    fn reads_after_mutation_see_new_values() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let mid = graph.create_group();
        let leaf = graph.create_shape(Bounds::from_rect(0.0, 0.0, 1.0, 1.0));
        graph.add_child(root, mid);
        graph.add_child(mid, leaf);

        for step in 1..=3 {
            let dx = f64::from(step);
            graph.set_transform(mid, Transform3d::from_translation(dx, 0.0, 0.0));
            let _ = graph.bounds_in_local(root);
            let _ = graph.local_to_scene(leaf);
            graph.set_geometry(leaf, Bounds::from_rect(0.0, 0.0, dx, dx));

            assert_eq!(
                graph.bounds_in_local(root),
                Bounds::from_rect(dx, 0.0, dx, dx)
            );
            assert!(
                graph
                    .local_to_scene(leaf)
                    .approx_eq(&Transform3d::from_translation(dx, 0.0, 0.0), EPS)
            );
        }
    }

    #[test]
    fn reparent_drops_stale_scene_transform() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        let leaf = graph.create_group();
        graph.set_transform(a, Transform3d::from_translation(1.0, 0.0, 0.0));
        graph.set_transform(b, Transform3d::from_translation(0.0, 7.0, 0.0));
        graph.add_child(a, leaf);
        let _ = graph.local_to_scene(leaf);

        graph.reparent(leaf, b);
        assert!(
            graph
                .local_to_scene(leaf)
                .approx_eq(&Transform3d::from_translation(0.0, 7.0, 0.0), EPS)
        );
    }

    #[test]
    fn group_bounds_are_union_of_children() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let a = graph.create_shape(Bounds::from_rect(0.0, 0.0, 10.0, 10.0));
        let b = graph.create_shape(Bounds::from_rect(5.0, 5.0, 20.0, 20.0));
        graph.add_child(group, a);
        graph.add_child(group, b);

        assert_eq!(
            graph.layout_bounds(group),
            Bounds::from_rect(0.0, 0.0, 25.0, 25.0)
        );
    }

    #[test]
    fn group_bounds_ignore_extentless_children() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let shape = graph.create_shape(Bounds::from_rect(10.0, 10.0, 5.0, 5.0));
        let light = graph.create_light(Light::new(LightKind::Ambient));
        let camera = graph.create_camera(Camera::parallel());
        let empty = graph.create_group();
        let region = graph.create_region(0.0, 0.0);
        graph.set_transform(empty, Transform3d::from_translation(100.0, 100.0, 0.0));
        graph.set_transform(camera, Transform3d::from_translation(-50.0, -50.0, 0.0));
        for child in [shape, light, camera, empty, region] {
            graph.add_child(group, child);
        }

        assert_eq!(
            graph.layout_bounds(group),
            Bounds::from_rect(10.0, 10.0, 5.0, 5.0)
        );
    }

    #[test]
    fn group_of_extentless_children_has_zero_bounds() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let empty = graph.create_group();
        graph.set_transform(empty, Transform3d::from_translation(100.0, 100.0, 0.0));
        graph.add_child(group, empty);

        assert_eq!(graph.bounds_in_local(group), Bounds::ZERO);
    }

    #[test]
    fn empty_group_has_zero_bounds() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let b = graph.layout_bounds(group);
        assert_eq!(b, Bounds::ZERO);
        assert!(!b.width().is_nan());
    }

    #[test]
    fn nan_geometry_clamps_to_zero_extent() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let shape = graph.create_shape(Bounds::from_rect(0.0, 0.0, f64::NAN, -3.0));
        graph.add_child(group, shape);
        let b = graph.bounds_in_local(group);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
    }

    #[test]
    fn hidden_children_do_not_contribute() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let a = graph.create_shape(Bounds::from_rect(0.0, 0.0, 1.0, 1.0));
        let b = graph.create_shape(Bounds::from_rect(0.0, 0.0, 50.0, 50.0));
        graph.add_child(group, a);
        graph.add_child(group, b);
        assert_eq!(graph.bounds_in_local(group).width(), 50.0);

        graph.set_visible(b, false);
        assert_eq!(graph.bounds_in_local(group).width(), 1.0);
    }

    #[test]
    fn bounds_in_parent_applies_local_transform() {
        let mut graph = SceneGraph::new();
        let shape = graph.create_shape(Bounds::from_rect(0.0, 0.0, 2.0, 2.0));
        graph.set_transform(shape, Transform3d::from_translation(3.0, 4.0, 0.0));
        assert_eq!(
            graph.bounds_in_parent(shape),
            Bounds::from_rect(3.0, 4.0, 2.0, 2.0)
        );
    }

    #[test]
    fn layout_sizes_regions_to_preference() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let region = graph.create_region(40.0, 30.0);
        graph.add_child(group, region);
        assert_eq!(
            graph.layout_bounds(group),
            Bounds::from_rect(0.0, 0.0, 40.0, 30.0)
        );

        graph.set_pref_size(region, 60.0, 10.0);
        assert_eq!(
            graph.layout_bounds(group),
            Bounds::from_rect(0.0, 0.0, 60.0, 10.0)
        );
    }

    #[test]
    fn layout_skips_groups_without_auto_size() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        graph.set_auto_size_children(group, false);
        let region = graph.create_region(40.0, 30.0);
        graph.add_child(group, region);
        assert_eq!(graph.layout_bounds(group), Bounds::ZERO);
    }

    #[test]
    fn projection_view_includes_camera_placement() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let camera = graph.create_camera(Camera::parallel());
        graph.add_child(root, camera);
        let scene = graph.create_scene(200.0, 100.0);
        graph.set_camera(scene, Some(camera)).expect("unowned camera");

        let before = graph.projection_view_transform(camera);
        graph.set_transform(root, Transform3d::from_translation(10.0, 0.0, 0.0));
        let after = graph.projection_view_transform(camera);
        let expected = graph.projection_transform(camera)
            * graph.view_transform(camera)
            * graph.scene_to_local(camera);
        assert!(after.approx_eq(&expected, EPS));
        assert!(!after.approx_eq(&before, EPS));
    }

    #[test]
    fn parallel_pick_ray_follows_camera_transform() {
        let mut graph = SceneGraph::new();
        let camera = graph.create_camera(Camera::parallel());
        graph.set_transform(camera, Transform3d::from_translation(5.0, 5.0, 0.0));

        let ray = graph.pick_ray(camera, Point::new(1.0, 2.0));
        assert!(ray.origin.approx_eq(Vec3::new(6.0, 7.0, 0.0), EPS));
        assert!(ray.direction.approx_eq(Vec3::Z, EPS));
        let t = ray
            .intersect_plane(Vec3::new(0.0, 0.0, 10.0), Vec3::Z)
            .expect("ray meets plane ahead");
        assert!((t - 10.0).abs() < EPS);
    }

    #[test]
    fn perspective_camera_position_is_behind_viewport() {
        let mut graph = SceneGraph::new();
        let camera = graph.create_camera(Camera::perspective());
        let scene = graph.create_scene(100.0, 100.0);
        graph.set_camera(scene, Some(camera)).expect("unowned camera");
        let eye = graph.camera_position(camera);
        assert!((eye.x - 50.0).abs() < EPS);
        assert!((eye.y - 50.0).abs() < EPS);
        assert!(eye.z < 0.0);
    }
}
