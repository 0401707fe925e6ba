// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::content::{
    LayerMargin, NodeContent, NodeFlags, NodeKind, TransformProperty, TransformProps,
};
use super::evaluate::FrameChanges;
use super::id::{INVALID, NodeId};
use super::traverse::{Ancestors, Children};
use crate::dirty;
use crate::error::SceneError;
use crate::graphics::Graphics;
use crate::picture::Picture;
use crate::text::Text;
use crate::transform::Transform;

/// Struct-of-arrays storage for the scene graph.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; disposed nodes are recycled via a free list, and
/// generation counters make stale handles fail with
/// [`SceneError::Disposed`].
///
/// The store owns a root container at construction. Only nodes reachable from
/// the root are rendered; other nodes are *detached* and keep their state
/// until they are attached or disposed.
#[derive(Debug)]
pub struct SceneStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) props: Vec<TransformProps>,
    pub(crate) alpha: Vec<f64>,
    pub(crate) visible: Vec<bool>,
    pub(crate) interactive: Vec<bool>,
    pub(crate) interactive_children: Vec<bool>,
    pub(crate) mask: Vec<Option<NodeId>>,
    /// Reverse of `mask`: the slots currently masked by this slot.
    pub(crate) masked_by: Vec<Vec<u32>>,
    pub(crate) layer: Vec<Option<i32>>,
    pub(crate) layer_margin: Vec<LayerMargin>,
    pub(crate) content: Vec<NodeContent>,
    pub(crate) flags: Vec<NodeFlags>,

    // -- Computed properties (written by resolution) --
    pub(crate) local_matrix: Vec<Transform>,
    pub(crate) world_matrix: Vec<Transform>,
    pub(crate) effective_alpha: Vec<f64>,
    pub(crate) effective_visible: Vec<bool>,
    pub(crate) effective_interactive: Vec<bool>,
    pub(crate) effective_layer: Vec<i32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Accumulated changes since the last evaluate --
    pub(crate) pending: FrameChanges,

    pub(crate) root: u32,
    pub(crate) default_layer: i32,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Creates a store holding only the root container, on layer `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_layer(0)
    }

    /// Creates a store whose root (and every node that does not declare a
    /// layer) renders into `default_layer`.
    #[must_use]
    pub fn with_default_layer(default_layer: i32) -> Self {
        let mut store = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            props: Vec::new(),
            alpha: Vec::new(),
            visible: Vec::new(),
            interactive: Vec::new(),
            interactive_children: Vec::new(),
            mask: Vec::new(),
            masked_by: Vec::new(),
            layer: Vec::new(),
            layer_margin: Vec::new(),
            content: Vec::new(),
            flags: Vec::new(),
            local_matrix: Vec::new(),
            world_matrix: Vec::new(),
            effective_alpha: Vec::new(),
            effective_visible: Vec::new(),
            effective_interactive: Vec::new(),
            effective_layer: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending: FrameChanges::default(),
            root: INVALID,
            default_layer,
        };
        store.root = store.create(NodeContent::Container).idx;
        store
    }

    /// Returns the root container.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.id_at(self.root)
    }

    /// Returns the layer order used by nodes that declare none.
    #[must_use]
    pub fn default_layer(&self) -> i32 {
        self.default_layer
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// The node starts at the origin with unit scale, full alpha, visible,
    /// non-interactive, with child interactivity enabled and no mask or layer.
    pub fn create(&mut self, content: NodeContent) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. The generation was bumped on disposal.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.props[i] = TransformProps::IDENTITY;
            self.alpha[i] = 1.0;
            self.visible[i] = true;
            self.interactive[i] = false;
            self.interactive_children[i] = true;
            self.mask[i] = None;
            self.masked_by[i].clear();
            self.layer[i] = None;
            self.layer_margin[i] = LayerMargin::ZERO;
            self.content[i] = content;
            self.flags[i] = NodeFlags::default();
            self.local_matrix[i] = Transform::IDENTITY;
            self.world_matrix[i] = Transform::IDENTITY;
            self.effective_alpha[i] = 1.0;
            self.effective_visible[i] = true;
            self.effective_interactive[i] = false;
            self.effective_layer[i] = self.default_layer;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.props.push(TransformProps::IDENTITY);
            self.alpha.push(1.0);
            self.visible.push(true);
            self.interactive.push(false);
            self.interactive_children.push(true);
            self.mask.push(None);
            self.masked_by.push(Vec::new());
            self.layer.push(None);
            self.layer_margin.push(LayerMargin::ZERO);
            self.content.push(content);
            self.flags.push(NodeFlags::default());
            self.local_matrix.push(Transform::IDENTITY);
            self.world_matrix.push(Transform::IDENTITY);
            self.effective_alpha.push(1.0);
            self.effective_visible.push(true);
            self.effective_interactive.push(false);
            self.effective_layer.push(self.default_layer);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.pending.added.push(idx);
        self.mark_inherited(idx);
        self.dirty.mark(idx, dirty::CONTENT);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        self.id_at(idx)
    }

    /// Creates a detached container.
    pub fn create_container(&mut self) -> NodeId {
        self.create(NodeContent::Container)
    }

    /// Creates a detached graphics node.
    pub fn create_graphics(&mut self, graphics: Graphics) -> NodeId {
        self.create(NodeContent::Graphics(graphics))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: Text) -> NodeId {
        self.create(NodeContent::Text(text))
    }

    /// Creates a detached picture node.
    pub fn create_picture(&mut self, picture: Picture) -> NodeId {
        self.create(NodeContent::Picture(picture))
    }

    /// Disposes a node and its whole subtree.
    ///
    /// The subtree is removed from its parent's child list, every slot is
    /// freed, and any node that used a disposed node as its mask loses the
    /// mask and gets [`NodeFlags::stale_mask`]. Handles to disposed nodes
    /// fail with [`SceneError::Disposed`] afterwards.
    pub fn dispose(&mut self, id: NodeId) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        if idx == self.root {
            return Err(SceneError::Root);
        }
        // Bring effective layers up to date so damage reports the right ones.
        self.resolve();

        let p = self.parent[idx as usize];
        if p != INVALID {
            self.unlink_from_parent(idx);
            self.remove_inherited_dependencies(idx, p);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        let mut subtree = Vec::new();
        self.collect_subtree(idx, &mut subtree);
        for &i in &subtree {
            self.unlink_mask(i);
        }
        let mut orphaned = Vec::new();
        for &i in &subtree {
            orphaned.append(&mut self.masked_by[i as usize]);
            self.pending.damaged_layers.push(self.effective_layer[i as usize]);
            self.dirty.remove_key(i);
            self.generation[i as usize] += 1;
            self.alive[i as usize] = false;
            self.parent[i as usize] = INVALID;
            self.first_child[i as usize] = INVALID;
            self.next_sibling[i as usize] = INVALID;
            self.prev_sibling[i as usize] = INVALID;
            self.content[i as usize] = NodeContent::Container;
            self.mask[i as usize] = None;
            self.free_list.push(i);
            self.pending.removed.push(i);
        }

        for i in orphaned {
            if !self.alive[i as usize] {
                continue;
            }
            self.mask[i as usize] = None;
            self.flags[i as usize].stale_mask = true;
            self.pending.flags_changed.push(i);
            self.dirty.mark(i, dirty::CONTENT);
        }

        self.traversal_dirty = true;
        Ok(())
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Number of live nodes, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s child list.
    ///
    /// If `child` already has a parent it is moved: a node has exactly one
    /// owner at a time. Inherited state of the moved subtree is recomputed
    /// under the new ancestry on the next resolution.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let p = self.check(parent)?;
        let len = self.child_count_at(p);
        let index = if self.is_alive(child) && self.parent[child.idx as usize] == p {
            len - 1
        } else {
            len
        };
        self.insert_child(parent, child, index)
    }

    /// Inserts `child` into `parent`'s child list at `index`.
    ///
    /// `index` is interpreted after `child` has been removed from its current
    /// position, so moving a node within the same parent works as expected.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), SceneError> {
        let p = self.check(parent)?;
        let c = self.check(child)?;
        self.check_attachable(p, c, parent, child)?;

        let same_parent = self.parent[c as usize] == p;
        let len = self.child_count_at(p) - usize::from(same_parent);
        if index > len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }

        self.detach_at(c);
        let mut before = self.first_child[p as usize];
        for _ in 0..index {
            before = self.next_sibling[before as usize];
        }
        self.link(p, c, before);
        Ok(())
    }

    /// Inserts `child` directly before `sibling` in `sibling`'s parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) -> Result<(), SceneError> {
        let c = self.check(child)?;
        let s = self.check(sibling)?;
        let p = self.parent[s as usize];
        if p == INVALID {
            return Err(SceneError::NotAChild {
                parent: self.root(),
                child: sibling,
            });
        }
        if c == s {
            return Ok(());
        }
        let parent = self.id_at(p);
        self.check_attachable(p, c, parent, child)?;
        self.detach_at(c);
        self.link(p, c, s);
        Ok(())
    }

    /// Removes `child` from `parent`, leaving it detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let p = self.check(parent)?;
        let c = self.check(child)?;
        if self.parent[c as usize] != p {
            return Err(SceneError::NotAChild { parent, child });
        }
        self.detach_at(c);
        Ok(())
    }

    /// Detaches `child` from its parent, returning the former parent.
    pub fn detach(&mut self, child: NodeId) -> Result<Option<NodeId>, SceneError> {
        let c = self.check(child)?;
        if c == self.root {
            return Err(SceneError::Root);
        }
        let p = self.parent[c as usize];
        self.detach_at(c);
        Ok((p != INVALID).then(|| self.id_at(p)))
    }

    /// Returns the parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        let idx = self.check(id)?;
        let p = self.parent[idx as usize];
        Ok((p != INVALID).then(|| self.id_at(p)))
    }

    /// Returns an iterator over the direct children of a node, in paint order.
    pub fn children(&self, id: NodeId) -> Result<Children<'_>, SceneError> {
        let idx = self.check(id)?;
        Ok(Children::new(self, self.first_child[idx as usize]))
    }

    /// Returns the number of direct children.
    pub fn child_count(&self, id: NodeId) -> Result<usize, SceneError> {
        let idx = self.check(id)?;
        Ok(self.child_count_at(idx))
    }

    /// Returns an iterator from the node's parent up to its root.
    pub fn ancestors(&self, id: NodeId) -> Result<Ancestors<'_>, SceneError> {
        let idx = self.check(id)?;
        Ok(Ancestors::new(self, self.parent[idx as usize]))
    }

    /// Returns whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut idx = id.idx;
        while idx != INVALID {
            if idx == self.root {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Returns the content kind of a node.
    pub fn kind(&self, id: NodeId) -> Result<NodeKind, SceneError> {
        let idx = self.check(id)?;
        Ok(self.content[idx as usize].kind())
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns one local transform property.
    pub fn transform_property(
        &self,
        id: NodeId,
        prop: TransformProperty,
    ) -> Result<f64, SceneError> {
        let idx = self.check(id)?;
        Ok(self.props[idx as usize].get(prop))
    }

    /// Returns all local transform properties.
    pub fn transform_props(&self, id: NodeId) -> Result<TransformProps, SceneError> {
        let idx = self.check(id)?;
        Ok(self.props[idx as usize])
    }

    /// Returns the node's own alpha.
    pub fn alpha(&self, id: NodeId) -> Result<f64, SceneError> {
        let idx = self.check(id)?;
        Ok(self.alpha[idx as usize])
    }

    /// Returns the node's own visibility flag.
    pub fn visible(&self, id: NodeId) -> Result<bool, SceneError> {
        let idx = self.check(id)?;
        Ok(self.visible[idx as usize])
    }

    /// Returns the node's own interactive flag.
    pub fn interactive(&self, id: NodeId) -> Result<bool, SceneError> {
        let idx = self.check(id)?;
        Ok(self.interactive[idx as usize])
    }

    /// Returns whether the node passes interactivity to its children.
    pub fn interactive_children(&self, id: NodeId) -> Result<bool, SceneError> {
        let idx = self.check(id)?;
        Ok(self.interactive_children[idx as usize])
    }

    /// Returns the node's mask.
    pub fn mask(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        let idx = self.check(id)?;
        Ok(self.mask[idx as usize])
    }

    /// Returns the layer the node declares, if any.
    pub fn layer(&self, id: NodeId) -> Result<Option<i32>, SceneError> {
        let idx = self.check(id)?;
        Ok(self.layer[idx as usize])
    }

    /// Returns the layer margin the node declares.
    pub fn layer_margin(&self, id: NodeId) -> Result<LayerMargin, SceneError> {
        let idx = self.check(id)?;
        Ok(self.layer_margin[idx as usize])
    }

    /// Returns the node's flags.
    pub fn flags(&self, id: NodeId) -> Result<NodeFlags, SceneError> {
        let idx = self.check(id)?;
        Ok(self.flags[idx as usize])
    }

    /// Returns the node's content.
    pub fn content(&self, id: NodeId) -> Result<&NodeContent, SceneError> {
        let idx = self.check(id)?;
        Ok(&self.content[idx as usize])
    }

    /// Returns the node's command list.
    pub fn graphics(&self, id: NodeId) -> Result<&Graphics, SceneError> {
        match self.content(id)? {
            NodeContent::Graphics(g) => Ok(g),
            _ => Err(Self::wrong_kind(id, NodeKind::Graphics)),
        }
    }

    /// Returns the node's picture.
    pub fn picture(&self, id: NodeId) -> Result<&Picture, SceneError> {
        match self.content(id)? {
            NodeContent::Picture(p) => Ok(p),
            _ => Err(Self::wrong_kind(id, NodeKind::Picture)),
        }
    }

    /// Returns the node's text.
    pub fn text(&self, id: NodeId) -> Result<&Text, SceneError> {
        match self.content(id)? {
            NodeContent::Text(t) => Ok(t),
            _ => Err(Self::wrong_kind(id, NodeKind::Text)),
        }
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets one local transform property.
    ///
    /// Only the node is marked; its world matrix and those of its
    /// descendants are recomputed on the next resolution.
    pub fn set_transform_property(
        &mut self,
        id: NodeId,
        prop: TransformProperty,
        value: f64,
    ) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.props[idx as usize].set(prop, value);
        self.dirty.mark(idx, dirty::TRANSFORM);
        Ok(())
    }

    /// Replaces all local transform properties.
    pub fn set_transform_props(
        &mut self,
        id: NodeId,
        props: TransformProps,
    ) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.props[idx as usize] = props;
        self.dirty.mark(idx, dirty::TRANSFORM);
        Ok(())
    }

    /// Sets the position.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        let props = &mut self.props[idx as usize];
        props.x = x;
        props.y = y;
        self.dirty.mark(idx, dirty::TRANSFORM);
        Ok(())
    }

    /// Sets the node's own alpha.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.alpha[idx as usize] = alpha.clamp(0.0, 1.0);
        self.dirty.mark(idx, dirty::APPEARANCE);
        Ok(())
    }

    /// Shows or hides the node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.visible[idx as usize] = visible;
        self.dirty.mark(idx, dirty::APPEARANCE);
        Ok(())
    }

    /// Sets the node's own interactive flag.
    pub fn set_interactive(&mut self, id: NodeId, interactive: bool) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.interactive[idx as usize] = interactive;
        self.dirty.mark(idx, dirty::INTERACTIVITY);
        Ok(())
    }

    /// Sets whether an interactive node makes its children interactive.
    pub fn set_interactive_children(
        &mut self,
        id: NodeId,
        enabled: bool,
    ) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.interactive_children[idx as usize] = enabled;
        self.dirty.mark(idx, dirty::INTERACTIVITY);
        Ok(())
    }

    /// Sets or clears the node's mask.
    ///
    /// The mask must be a live graphics node other than `id` itself. The
    /// mask is referenced, not owned: it may live anywhere in the graph, or
    /// nowhere.
    pub fn set_mask(&mut self, id: NodeId, mask: Option<NodeId>) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        if let Some(m) = mask {
            self.check(m)?;
            if m == id {
                return Err(SceneError::SelfMask(id));
            }
            if self.kind(m)? != NodeKind::Graphics {
                return Err(Self::wrong_kind(m, NodeKind::Graphics));
            }
        }
        self.unlink_mask(idx);
        if let Some(m) = mask {
            self.masked_by[m.idx as usize].push(idx);
        }
        self.mask[idx as usize] = mask;
        self.flags[idx as usize].stale_mask = false;
        self.dirty.mark(idx, dirty::CONTENT);
        Ok(())
    }

    /// Declares the layer this node and its non-overriding descendants render
    /// into, or clears the declaration to inherit it again.
    pub fn set_layer(&mut self, id: NodeId, layer: Option<i32>) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.layer[idx as usize] = layer;
        self.dirty.mark(idx, dirty::LAYER);
        Ok(())
    }

    /// Sets the margin requested for the declared layer.
    pub fn set_layer_margin(&mut self, id: NodeId, margin: LayerMargin) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.layer_margin[idx as usize] = margin;
        self.dirty.mark(idx, dirty::LAYER);
        Ok(())
    }

    /// Replaces the node's flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        self.flags[idx as usize] = flags;
        Ok(())
    }

    /// Replaces the node's content.
    ///
    /// A node with children must stay a container.
    pub fn set_content(&mut self, id: NodeId, content: NodeContent) -> Result<(), SceneError> {
        let idx = self.check(id)?;
        if self.first_child[idx as usize] != INVALID && content.kind() != NodeKind::Container {
            return Err(SceneError::NotAContainer(id));
        }
        self.content[idx as usize] = content;
        self.dirty.mark(idx, dirty::CONTENT);
        Ok(())
    }

    /// Mutable access to the node's command list. Marks the content dirty.
    pub fn graphics_mut(&mut self, id: NodeId) -> Result<&mut Graphics, SceneError> {
        let idx = self.check(id)?;
        self.dirty.mark(idx, dirty::CONTENT);
        match &mut self.content[idx as usize] {
            NodeContent::Graphics(g) => Ok(g),
            _ => Err(Self::wrong_kind(id, NodeKind::Graphics)),
        }
    }

    /// Mutable access to the node's text. Marks the content dirty.
    pub fn text_mut(&mut self, id: NodeId) -> Result<&mut Text, SceneError> {
        let idx = self.check(id)?;
        self.dirty.mark(idx, dirty::CONTENT);
        match &mut self.content[idx as usize] {
            NodeContent::Text(t) => Ok(t),
            _ => Err(Self::wrong_kind(id, NodeKind::Text)),
        }
    }

    /// Mutable access to the node's picture. Marks the content dirty.
    pub fn picture_mut(&mut self, id: NodeId) -> Result<&mut Picture, SceneError> {
        let idx = self.check(id)?;
        self.dirty.mark(idx, dirty::CONTENT);
        match &mut self.content[idx as usize] {
            NodeContent::Picture(p) => Ok(p),
            _ => Err(Self::wrong_kind(id, NodeKind::Picture)),
        }
    }

    // -- Raw-index accessors for the renderer --
    //
    // These accept raw slot indices (as found in `FrameChanges` or produced by
    // `Children`) rather than `NodeId` handles, skipping generation
    // validation. Values are only current after `resolve` or `evaluate`.

    /// Returns the handle for the live slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> NodeId {
        self.assert_slot(idx);
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether slot `idx` holds a live node.
    #[must_use]
    pub fn is_alive_at(&self, idx: u32) -> bool {
        idx < self.len && self.alive[idx as usize]
    }

    /// Returns the first child of slot `idx`, or [`INVALID`].
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn first_child_at(&self, idx: u32) -> u32 {
        self.assert_slot(idx);
        self.first_child[idx as usize]
    }

    /// Returns the next sibling of slot `idx`, or [`INVALID`].
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn next_sibling_at(&self, idx: u32) -> u32 {
        self.assert_slot(idx);
        self.next_sibling[idx as usize]
    }

    /// Returns the parent of slot `idx`, or [`INVALID`].
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> u32 {
        self.assert_slot(idx);
        self.parent[idx as usize]
    }

    /// Returns the computed world matrix at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_matrix_at(&self, idx: u32) -> Transform {
        self.assert_slot(idx);
        self.world_matrix[idx as usize]
    }

    /// Returns the computed compound alpha at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f64 {
        self.assert_slot(idx);
        self.effective_alpha[idx as usize]
    }

    /// Returns the node's own visibility flag at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn visible_at(&self, idx: u32) -> bool {
        self.assert_slot(idx);
        self.visible[idx as usize]
    }

    /// Returns the computed effective interactivity at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_interactive_at(&self, idx: u32) -> bool {
        self.assert_slot(idx);
        self.effective_interactive[idx as usize]
    }

    /// Returns the computed effective layer order at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_layer_at(&self, idx: u32) -> i32 {
        self.assert_slot(idx);
        self.effective_layer[idx as usize]
    }

    /// Returns the declared layer and margin at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn declared_layer_at(&self, idx: u32) -> Option<(i32, LayerMargin)> {
        self.assert_slot(idx);
        self.layer[idx as usize].map(|order| (order, self.layer_margin[idx as usize]))
    }

    /// Returns the mask at slot `idx`, if it is still alive.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn mask_at(&self, idx: u32) -> Option<NodeId> {
        self.assert_slot(idx);
        self.mask[idx as usize].filter(|m| self.is_alive(*m))
    }

    /// Returns the content at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &NodeContent {
        self.assert_slot(idx);
        &self.content[idx as usize]
    }

    /// Mutable content at slot `idx`, without dirty marking.
    ///
    /// Used by painters that need to refresh content caches (such as text
    /// layout) during a frame.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    pub fn content_at_mut(&mut self, idx: u32) -> &mut NodeContent {
        self.assert_slot(idx);
        &mut self.content[idx as usize]
    }

    /// Returns the flags at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn flags_at(&self, idx: u32) -> NodeFlags {
        self.assert_slot(idx);
        self.flags[idx as usize]
    }

    /// Mutable flags at slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    pub fn flags_at_mut(&mut self, idx: u32) -> &mut NodeFlags {
        self.assert_slot(idx);
        &mut self.flags[idx as usize]
    }

    // -- Internal helpers --

    /// Validates a handle and returns its slot index.
    /// Removes `idx` from the reverse index of the mask it currently uses.
    fn unlink_mask(&mut self, idx: u32) {
        if let Some(m) = self.mask[idx as usize]
            && self.is_alive(m)
        {
            self.masked_by[m.idx as usize].retain(|&i| i != idx);
        }
    }

    pub(crate) fn check(&self, id: NodeId) -> Result<u32, SceneError> {
        if self.is_alive(id) {
            Ok(id.idx)
        } else {
            Err(SceneError::Disposed(id))
        }
    }

    fn assert_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    fn wrong_kind(node: NodeId, expected: NodeKind) -> SceneError {
        SceneError::WrongKind {
            node,
            expected: expected.name(),
        }
    }

    fn child_count_at(&self, idx: u32) -> usize {
        Children::new(self, self.first_child[idx as usize]).count()
    }

    /// Rejects attachments that would break the tree.
    fn check_attachable(
        &self,
        p: u32,
        c: u32,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), SceneError> {
        if c == self.root {
            return Err(SceneError::Root);
        }
        if !matches!(self.content[p as usize], NodeContent::Container) {
            return Err(SceneError::NotAContainer(parent));
        }
        // `child` may not be `parent` or one of its ancestors.
        let mut walk = p;
        while walk != INVALID {
            if walk == c {
                return Err(SceneError::Cycle { parent, child });
            }
            walk = self.parent[walk as usize];
        }
        Ok(())
    }

    /// Detaches slot `c` if it has a parent, updating dirty state.
    fn detach_at(&mut self, c: u32) {
        let p = self.parent[c as usize];
        if p == INVALID {
            return;
        }
        self.unlink_from_parent(c);
        self.remove_inherited_dependencies(c, p);
        self.mark_inherited(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.dirty.mark(c, dirty::TOPOLOGY);
    }

    /// Links detached slot `c` under `p`, before `before` (or last if
    /// `before` is [`INVALID`]).
    fn link(&mut self, p: u32, c: u32, before: u32) {
        self.parent[c as usize] = p;
        if before == INVALID {
            self.next_sibling[c as usize] = INVALID;
            if self.first_child[p as usize] == INVALID {
                self.first_child[p as usize] = c;
                self.prev_sibling[c as usize] = INVALID;
            } else {
                // Walk to last child.
                let mut last = self.first_child[p as usize];
                while self.next_sibling[last as usize] != INVALID {
                    last = self.next_sibling[last as usize];
                }
                self.next_sibling[last as usize] = c;
                self.prev_sibling[c as usize] = last;
            }
        } else {
            let prev = self.prev_sibling[before as usize];
            self.next_sibling[c as usize] = before;
            self.prev_sibling[c as usize] = prev;
            if prev == INVALID {
                self.first_child[p as usize] = c;
            } else {
                self.next_sibling[prev as usize] = c;
            }
            self.prev_sibling[before as usize] = c;
        }

        // Inherited channels: the child depends on its parent.
        for ch in [
            dirty::TRANSFORM,
            dirty::APPEARANCE,
            dirty::INTERACTIVITY,
            dirty::LAYER,
        ] {
            let _ = self.dirty.add_dependency(c, p, ch);
        }
        self.mark_inherited(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.dirty.mark(c, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn remove_inherited_dependencies(&mut self, c: u32, p: u32) {
        for ch in [
            dirty::TRANSFORM,
            dirty::APPEARANCE,
            dirty::INTERACTIVITY,
            dirty::LAYER,
        ] {
            self.dirty.remove_dependency(c, p, ch);
        }
    }

    /// Marks the inherited channels of `idx`. Descendants are picked up when
    /// the channels are drained.
    fn mark_inherited(&mut self, idx: u32) {
        self.dirty.mark(idx, dirty::TRANSFORM);
        self.dirty.mark(idx, dirty::APPEARANCE);
        self.dirty.mark(idx, dirty::INTERACTIVITY);
        self.dirty.mark(idx, dirty::LAYER);
    }

    /// Pre-order slots of the subtree rooted at `idx`.
    pub(crate) fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_subtree(child, out);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(store: &SceneStore, parent: NodeId) -> Vec<NodeId> {
        store.children(parent).unwrap().collect()
    }

    #[test]
    fn create_and_dispose() {
        let mut store = SceneStore::new();
        let id = store.create_container();
        assert!(store.is_alive(id));
        store.dispose(id).unwrap();
        assert!(!store.is_alive(id));
        assert_eq!(store.alpha(id), Err(SceneError::Disposed(id)));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = SceneStore::new();
        let id1 = store.create_container();
        store.dispose(id1).unwrap();
        let id2 = store.create_container();
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn add_child_and_query() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        assert_eq!(store.parent(a).unwrap(), Some(root));
        assert_eq!(ids(&store, root), [a, b]);
        assert!(store.is_attached(a));
    }

    #[test]
    fn insert_child_at_index() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        let c = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        store.insert_child(root, c, 1).unwrap();
        assert_eq!(ids(&store, root), [a, c, b]);
        store.insert_child(root, b, 0).unwrap();
        assert_eq!(ids(&store, root), [b, a, c]);
        assert_eq!(
            store.insert_child(root, a, 5),
            Err(SceneError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn add_child_moves_between_parents() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        let g = store.create_graphics(Graphics::new());
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        store.add_child(a, g).unwrap();
        store.add_child(b, g).unwrap();
        assert!(ids(&store, a).is_empty());
        assert_eq!(ids(&store, b), [g]);
        assert_eq!(store.parent(g).unwrap(), Some(b));
    }

    #[test]
    fn re_adding_to_same_parent_moves_to_end() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        store.add_child(root, a).unwrap();
        assert_eq!(ids(&store, root), [b, a]);
    }

    #[test]
    fn insert_before_sibling() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(root, a).unwrap();
        store.insert_before(b, a).unwrap();
        assert_eq!(ids(&store, root), [b, a]);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut store = SceneStore::new();
        let a = store.create_container();
        let b = store.create_container();
        let c = store.create_container();
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        assert_eq!(
            store.add_child(c, a),
            Err(SceneError::Cycle {
                parent: c,
                child: a
            })
        );
        assert_eq!(
            store.add_child(a, a),
            Err(SceneError::Cycle {
                parent: a,
                child: a
            })
        );
        // The tree is untouched.
        assert_eq!(store.parent(a).unwrap(), None);
        assert_eq!(ids(&store, a), [b]);
    }

    #[test]
    fn only_containers_adopt() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(Graphics::new());
        let c = store.create_container();
        assert_eq!(store.add_child(g, c), Err(SceneError::NotAContainer(g)));
    }

    #[test]
    fn disposed_nodes_cannot_be_attached() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        store.dispose(a).unwrap();
        assert_eq!(store.add_child(root, a), Err(SceneError::Disposed(a)));
    }

    #[test]
    fn root_is_protected() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        assert_eq!(store.dispose(root), Err(SceneError::Root));
        assert_eq!(store.add_child(a, root), Err(SceneError::Root));
        assert_eq!(store.detach(root), Err(SceneError::Root));
    }

    #[test]
    fn dispose_removes_subtree() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        let b = store.create_graphics(Graphics::new());
        store.add_child(root, a).unwrap();
        store.add_child(a, b).unwrap();
        store.dispose(a).unwrap();
        assert!(!store.is_alive(b));
        assert!(ids(&store, root).is_empty());
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn disposing_a_mask_flags_its_users() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(Graphics::new());
        let m = store.create_graphics(Graphics::new());
        store.set_mask(g, Some(m)).unwrap();
        store.dispose(m).unwrap();
        assert_eq!(store.mask(g).unwrap(), None);
        assert!(store.flags(g).unwrap().stale_mask);
    }

    #[test]
    fn remasking_releases_the_old_mask() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(Graphics::new());
        let old = store.create_graphics(Graphics::new());
        let new = store.create_graphics(Graphics::new());
        store.set_mask(g, Some(old)).unwrap();
        store.set_mask(g, Some(new)).unwrap();

        store.dispose(old).unwrap();
        assert_eq!(store.mask(g).unwrap(), Some(new));
        assert!(!store.flags(g).unwrap().stale_mask);

        store.dispose(new).unwrap();
        assert_eq!(store.mask(g).unwrap(), None);
        assert!(store.flags(g).unwrap().stale_mask);
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut big = SceneStore::new();
        let foreign = (0..10).map(|_| big.create_container()).last().unwrap();
        let mut small = SceneStore::new();
        let root = small.root();
        assert_eq!(
            small.add_child(root, foreign),
            Err(SceneError::Disposed(foreign))
        );
    }

    #[test]
    fn mask_must_be_other_graphics() {
        let mut store = SceneStore::new();
        let g = store.create_graphics(Graphics::new());
        let c = store.create_container();
        assert_eq!(store.set_mask(g, Some(g)), Err(SceneError::SelfMask(g)));
        assert_eq!(
            store.set_mask(g, Some(c)),
            Err(SceneError::WrongKind {
                node: c,
                expected: "graphics"
            })
        );
    }

    #[test]
    fn remove_child_requires_membership() {
        let mut store = SceneStore::new();
        let root = store.root();
        let a = store.create_container();
        assert_eq!(
            store.remove_child(root, a),
            Err(SceneError::NotAChild {
                parent: root,
                child: a
            })
        );
        store.add_child(root, a).unwrap();
        store.remove_child(root, a).unwrap();
        assert!(!store.is_attached(a));
        assert!(store.is_alive(a));
    }

    #[test]
    fn content_accessors_check_kind() {
        let mut store = SceneStore::new();
        let c = store.create_container();
        assert_eq!(
            store.graphics_mut(c).err(),
            Some(SceneError::WrongKind {
                node: c,
                expected: "graphics"
            })
        );
        let g = store.create_graphics(Graphics::new());
        store.graphics_mut(g).unwrap().circle((0.0, 0.0), 1.0);
        assert_eq!(store.graphics(g).unwrap().ops().len(), 1);
    }

    #[test]
    fn parent_with_children_stays_container() {
        let mut store = SceneStore::new();
        let a = store.create_container();
        let b = store.create_container();
        store.add_child(a, b).unwrap();
        assert_eq!(
            store.set_content(a, NodeContent::Graphics(Graphics::new())),
            Err(SceneError::NotAContainer(a))
        );
    }
}
