// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy resolution of inherited state and per-frame change tracking.
//!
//! Resolution follows a drain-recompute pattern for each dirty channel, in
//! parent-before-child order:
//!
//! 1. **TRANSFORM**: `world = parent_world * local`. A non-invertible result
//!    raises [`NodeFlags::degenerate_transform`](super::NodeFlags).
//! 2. **APPEARANCE**: compound alpha and effective visibility.
//! 3. **INTERACTIVITY**: a node is interactive if it says so, or if its
//!    parent is interactive and passes interactivity on to its children.
//! 4. **LAYER**: the declared layer, else the parent's, else the store's
//!    default layer.
//! 5. **CONTENT** / **TOPOLOGY**: no recomputation, only damage.
//!
//! Resolution runs whenever a caller asks for a derived value
//! ([`world_matrix`](SceneStore::world_matrix) and friends) and at the start
//! of [`evaluate`](SceneStore::evaluate). Mutations in between only mark the
//! changed node, so bulk configuration costs nothing until it is observed.
//!
//! [`FrameChanges`] accumulates across resolutions and is handed out by
//! `evaluate`. It uses raw slot indices so the renderer can index the store's
//! arrays directly through the `*_at()` accessors.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::Channel;

use super::id::{INVALID, NodeId};
use super::store::SceneStore;
use crate::dirty;
use crate::error::SceneError;
use crate::transform::Transform;

/// Everything that changed since the previous [`SceneStore::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world matrix was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose compound alpha or effective visibility was recomputed.
    pub appearance: Vec<u32>,
    /// Nodes whose effective interactivity was recomputed.
    pub interactivity: Vec<u32>,
    /// Nodes that went from interactive to non-interactive.
    pub lost_interactivity: Vec<u32>,
    /// Nodes whose effective layer changed.
    pub layers: Vec<u32>,
    /// Nodes whose drawable content or mask changed.
    pub content: Vec<u32>,
    /// Nodes whose [`NodeFlags`](super::NodeFlags) changed during resolution.
    pub flags_changed: Vec<u32>,
    /// Nodes created.
    pub added: Vec<u32>,
    /// Nodes disposed.
    pub removed: Vec<u32>,
    /// Layer orders whose pixels are stale, sorted and deduplicated.
    pub damaged_layers: Vec<i32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.appearance.clear();
        self.interactivity.clear();
        self.lost_interactivity.clear();
        self.layers.clear();
        self.content.clear();
        self.flags_changed.clear();
        self.added.clear();
        self.removed.clear();
        self.damaged_layers.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.appearance.is_empty()
            && self.interactivity.is_empty()
            && self.layers.is_empty()
            && self.content.is_empty()
            && self.flags_changed.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.damaged_layers.is_empty()
            && !self.topology_changed
    }
}

impl SceneStore {
    /// Resolves the scene, returning everything that changed since the last
    /// call.
    ///
    /// This drains all dirty channels and rebuilds the traversal order if
    /// the topology changed.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();
        self.resolve();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            self.pending.topology_changed = true;
            self.traversal_dirty = false;
        }

        core::mem::swap(&mut self.pending, changes);
        changes.damaged_layers.sort_unstable();
        changes.damaged_layers.dedup();
    }

    /// Recomputes all stale inherited state.
    ///
    /// Cheap when nothing is dirty. Changes are accumulated for the next
    /// [`evaluate`](Self::evaluate).
    pub fn resolve(&mut self) {
        for idx in self.drain_sorted(dirty::TRANSFORM) {
            let i = idx as usize;
            let p = self.parent[i];
            let parent_world = if p == INVALID {
                Transform::IDENTITY
            } else {
                self.world_matrix[p as usize]
            };
            let local = self.props[i].to_matrix();
            let world = parent_world * local;
            self.local_matrix[i] = local;
            self.world_matrix[i] = world;

            let degenerate = !world.is_invertible();
            if degenerate != self.flags[i].degenerate_transform {
                self.flags[i].degenerate_transform = degenerate;
                self.pending.flags_changed.push(idx);
            }
            self.damage(idx);
            self.pending.transforms.push(idx);
        }

        for idx in self.drain_sorted(dirty::APPEARANCE) {
            let i = idx as usize;
            let p = self.parent[i];
            let (parent_alpha, parent_visible) = if p == INVALID {
                (1.0, true)
            } else {
                (
                    self.effective_alpha[p as usize],
                    self.effective_visible[p as usize],
                )
            };
            self.effective_alpha[i] = parent_alpha * self.alpha[i];
            self.effective_visible[i] = parent_visible && self.visible[i];
            self.damage(idx);
            self.pending.appearance.push(idx);
        }

        for idx in self.drain_sorted(dirty::INTERACTIVITY) {
            let i = idx as usize;
            let p = self.parent[i];
            let inherited = p != INVALID
                && self.effective_interactive[p as usize]
                && self.interactive_children[p as usize];
            let now = self.interactive[i] || inherited;
            if self.effective_interactive[i] && !now {
                self.pending.lost_interactivity.push(idx);
            }
            self.effective_interactive[i] = now;
            // The picking surface is drawn alongside the layer pass.
            self.damage(idx);
            self.pending.interactivity.push(idx);
        }

        for idx in self.drain_sorted(dirty::LAYER) {
            let i = idx as usize;
            let p = self.parent[i];
            let inherited = if p == INVALID {
                self.default_layer
            } else {
                self.effective_layer[p as usize]
            };
            let layer = self.layer[i].unwrap_or(inherited);
            let old = self.effective_layer[i];
            if layer != old {
                self.pending.damaged_layers.push(old);
                self.effective_layer[i] = layer;
                self.pending.layers.push(idx);
            }
            // Margin changes resize the layer even if the order is unchanged.
            if layer != old || self.layer[i].is_some() {
                self.pending.damaged_layers.push(layer);
            }
        }

        for idx in self.drain_sorted(dirty::CONTENT) {
            self.damage(idx);
            self.pending.content.push(idx);
        }

        for idx in self.drain_sorted(dirty::TOPOLOGY) {
            self.damage(idx);
        }
    }

    /// Drains `channel` and returns live slots ordered parents first.
    fn drain_sorted(&mut self, channel: Channel) -> Vec<u32> {
        let mut slots: Vec<u32> = self
            .dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect();
        slots.retain(|&idx| self.is_alive_at(idx));
        slots.sort_by_cached_key(|&idx| (self.depth_at(idx), idx));
        slots
    }

    /// Marks the layer of `idx` and of every node masked by `idx` as stale.
    fn damage(&mut self, idx: u32) {
        self.pending
            .damaged_layers
            .push(self.effective_layer[idx as usize]);
        for &i in &self.masked_by[idx as usize] {
            self.pending
                .damaged_layers
                .push(self.effective_layer[i as usize]);
        }
    }

    fn depth_at(&self, idx: u32) -> u32 {
        let mut depth = 0;
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            depth += 1;
            p = self.parent[p as usize];
        }
        depth
    }

    // -- Resolved queries --

    /// Returns the local matrix built from the node's transform properties.
    pub fn local_matrix(&self, id: NodeId) -> Result<Transform, SceneError> {
        let idx = self.check(id)?;
        Ok(self.props[idx as usize].to_matrix())
    }

    /// Returns the node's world matrix, resolving pending changes first.
    pub fn world_matrix(&mut self, id: NodeId) -> Result<Transform, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        Ok(self.world_matrix[idx as usize])
    }

    /// Returns the product of the node's and all its ancestors' alpha.
    pub fn effective_alpha(&mut self, id: NodeId) -> Result<f64, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        Ok(self.effective_alpha[idx as usize])
    }

    /// Returns `false` if the node or any ancestor is hidden.
    pub fn effective_visible(&mut self, id: NodeId) -> Result<bool, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        Ok(self.effective_visible[idx as usize])
    }

    /// Returns whether the node takes part in hit testing.
    pub fn effective_interactive(&mut self, id: NodeId) -> Result<bool, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        Ok(self.effective_interactive[idx as usize])
    }

    /// Returns the layer order the node paints into.
    pub fn effective_layer(&mut self, id: NodeId) -> Result<i32, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        Ok(self.effective_layer[idx as usize])
    }

    /// World-space bounds of the node's content and of its visible
    /// descendants, or `None` if nothing draws.
    ///
    /// A node that is hidden, itself or through an ancestor, has no bounds.
    pub fn bounds(&mut self, id: NodeId) -> Result<Option<Rect>, SceneError> {
        let idx = self.check(id)?;
        self.resolve();
        if !self.effective_visible[idx as usize] {
            return Ok(None);
        }
        let mut subtree = Vec::new();
        self.collect_subtree(idx, &mut subtree);
        let mut bounds: Option<Rect> = None;
        for i in subtree {
            if !self.visible_chain(i, idx) {
                continue;
            }
            let world = self.world_matrix[i as usize];
            if let Some(local) = self.content[i as usize].local_bounds() {
                let r = world.transform_rect_bbox(local);
                bounds = Some(bounds.map_or(r, |b| b.union(r)));
            }
        }
        Ok(bounds)
    }

    /// Whether `idx` and every ancestor strictly below `top` is visible.
    fn visible_chain(&self, mut idx: u32, top: u32) -> bool {
        while idx != top {
            if !self.visible[idx as usize] {
                return false;
            }
            idx = self.parent[idx as usize];
        }
        true
    }

    /// Returns the depth-first pre-order of the tree under the root.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of the attached tree.
    fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        self.collect_subtree(self.root, &mut order);
        self.traversal_order = order;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::graphics::Graphics;
    use crate::scene::{LayerMargin, NodeContent, TransformProperty};

    fn square(size: f64) -> Graphics {
        let mut g = Graphics::new();
        g.begin_fill(crate::color::Color::BLACK)
            .rect(Rect::new(0.0, 0.0, size, size))
            .end_fill();
        g
    }

    #[test]
    fn world_matrix_composes_ancestors() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        store.set_position(a, 10.0, 0.0).unwrap();
        store.set_position(b, 0.0, 5.0).unwrap();
        let m = store.world_matrix(b).unwrap();
        assert_eq!(m.apply(Point::ORIGIN), Point::new(10.0, 5.0));
    }

    #[test]
    fn ancestor_change_reaches_descendants() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        let _ = store.world_matrix(b).unwrap();
        store
            .set_transform_property(a, TransformProperty::Scale, 2.0)
            .unwrap();
        store.set_position(b, 3.0, 0.0).unwrap();
        let m = store.world_matrix(b).unwrap();
        assert_eq!(m.apply(Point::new(1.0, 0.0)), Point::new(8.0, 0.0));
    }

    #[test]
    fn compound_alpha_and_visibility() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        store.set_alpha(a, 0.5).unwrap();
        store.set_alpha(b, 0.5).unwrap();
        assert!((store.effective_alpha(b).unwrap() - 0.25).abs() < 1e-12);
        store.set_visible(a, false).unwrap();
        assert!(!store.effective_visible(b).unwrap());
        assert!(store.visible(b).unwrap());
    }

    #[test]
    fn interactivity_inherits_through_enabled_children() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let g = store.create_graphics(square(10.0));
        store.add_child(root, a).unwrap();
        store.add_child(a, g).unwrap();
        assert!(!store.effective_interactive(g).unwrap());

        store.set_interactive(a, true).unwrap();
        assert!(store.effective_interactive(g).unwrap());

        store.set_interactive_children(a, false).unwrap();
        assert!(!store.effective_interactive(g).unwrap());
        assert!(store.effective_interactive(a).unwrap());
    }

    #[test]
    fn losing_interactivity_is_reported() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(10.0));
        store.add_child(store.root(), g).unwrap();
        store.set_interactive(g, true).unwrap();
        let _ = store.evaluate();
        store.set_interactive(g, false).unwrap();
        let changes = store.evaluate();
        assert_eq!(changes.lost_interactivity, [g.index()]);
    }

    #[test]
    fn layers_inherit_from_nearest_declaration() {
        let mut store = SceneStore::with_default_layer(0);
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        let c = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        store.set_layer(a, Some(5)).unwrap();
        store.set_layer(c, Some(9)).unwrap();
        assert_eq!(store.effective_layer(b).unwrap(), 5);
        assert_eq!(store.effective_layer(c).unwrap(), 9);

        // Moving `b` under the root drops the inherited declaration.
        store.add_child(root, b).unwrap();
        assert_eq!(store.effective_layer(b).unwrap(), 0);
        assert_eq!(store.effective_layer(c).unwrap(), 9);
    }

    #[test]
    fn layer_change_damages_old_and_new() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(4.0));
        store.add_child(store.root(), g).unwrap();
        let _ = store.evaluate();
        store.set_layer(g, Some(3)).unwrap();
        store
            .set_layer_margin(g, LayerMargin::uniform(2.0))
            .unwrap();
        let changes = store.evaluate();
        assert_eq!(changes.damaged_layers, [0, 3]);
        assert_eq!(changes.layers, [g.index()]);
    }

    #[test]
    fn quiet_frame_is_empty() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(4.0));
        store.add_child(store.root(), g).unwrap();
        let first = store.evaluate();
        assert!(first.topology_changed);
        assert!(first.added.contains(&g.index()));
        assert!(store.evaluate().is_empty());
    }

    #[test]
    fn mask_changes_damage_masked_layer() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(4.0));
        let m = store.create_graphics(square(2.0));
        store.add_child(store.root(), g).unwrap();
        store.set_layer(g, Some(7)).unwrap();
        store.set_mask(g, Some(m)).unwrap();
        let _ = store.evaluate();
        store.graphics_mut(m).unwrap().circle((1.0, 1.0), 1.0);
        let changes = store.evaluate();
        assert!(changes.damaged_layers.contains(&7));
    }

    #[test]
    fn degenerate_transform_is_flagged() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(4.0));
        store.add_child(store.root(), g).unwrap();
        store
            .set_transform_property(g, TransformProperty::Scale, 0.0)
            .unwrap();
        let changes = store.evaluate();
        assert!(store.flags(g).unwrap().degenerate_transform);
        assert_eq!(changes.flags_changed, [g.index()]);
        store
            .set_transform_property(g, TransformProperty::Scale, 1.0)
            .unwrap();
        let _ = store.evaluate();
        assert!(!store.flags(g).unwrap().degenerate_transform);
    }

    #[test]
    fn traversal_is_preorder_from_root() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        let c = store.create_container();
        let detached = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        store.add_child(root, c).unwrap();
        let _ = store.evaluate();
        assert_eq!(
            store.traversal_order(),
            &[root.index(), a.index(), b.index(), c.index()]
        );
        assert!(!store.traversal_order().contains(&detached.index()));
    }

    #[test]
    fn bounds_cover_visible_descendants() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let g = store.create_graphics(square(10.0));
        let h = store.create_graphics(square(10.0));
        store.add_child(root, a).unwrap();
        store.add_child(a, g).unwrap();
        store.add_child(a, h).unwrap();
        store.set_position(a, 5.0, 5.0).unwrap();
        store.set_position(h, 20.0, 0.0).unwrap();
        assert_eq!(
            store.bounds(a).unwrap(),
            Some(Rect::new(5.0, 5.0, 35.0, 15.0))
        );
        store.set_visible(h, false).unwrap();
        assert_eq!(
            store.bounds(a).unwrap(),
            Some(Rect::new(5.0, 5.0, 15.0, 15.0))
        );
        let empty = store.create(NodeContent::Container);
        assert_eq!(store.bounds(empty).unwrap(), None);
    }

    #[test]
    fn disposal_damages_the_removed_layer() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(square(4.0));
        store.add_child(store.root(), g).unwrap();
        store.set_layer(g, Some(2)).unwrap();
        let _ = store.evaluate();
        store.dispose(g).unwrap();
        let changes = store.evaluate();
        assert_eq!(changes.removed, [g.index()]);
        assert!(changes.damaged_layers.contains(&2));
    }

    #[test]
    fn hidden_nodes_have_no_bounds() {
        let mut store = SceneStore::new();
        let a = store.create_container();
        let g = store.create_graphics(square(10.0));
        store.add_child(store.root(), a).unwrap();
        store.add_child(a, g).unwrap();
        assert!(store.bounds(g).unwrap().is_some());

        store.set_visible(g, false).unwrap();
        assert_eq!(store.bounds(g).unwrap(), None);

        store.set_visible(g, true).unwrap();
        store.set_visible(a, false).unwrap();
        assert_eq!(store.bounds(g).unwrap(), None);
    }

    #[test]
    fn mask_edits_damage_only_the_masked_layer() {
        let mut store = SceneStore::new();
        let root = store.root();
        for _ in 0..2000 {
            let g = store.create_graphics(square(1.0));
            store.add_child(root, g).unwrap();
        }
        let mask = store.create_graphics(square(4.0));
        let target = store.create_graphics(square(8.0));
        store.add_child(root, mask).unwrap();
        store.add_child(root, target).unwrap();
        store.set_layer(mask, Some(1)).unwrap();
        store.set_layer(target, Some(5)).unwrap();
        store.set_mask(target, Some(mask)).unwrap();
        let _ = store.evaluate();

        store.graphics_mut(mask).unwrap().clear();
        let changes = store.evaluate();
        assert_eq!(changes.damaged_layers, [1, 5]);

        // A remask moves the reverse entry to the new mask.
        let other = store.create_graphics(square(2.0));
        store.add_child(root, other).unwrap();
        store.set_layer(other, Some(2)).unwrap();
        store.set_mask(target, Some(other)).unwrap();
        let _ = store.evaluate();
        store.graphics_mut(mask).unwrap().clear();
        assert_eq!(store.evaluate().damaged_layers, [1]);
    }
}
