// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One depth-first paint walk over the attached scene.
//!
//! Layer repaints, picking passes and raster export all run this walk; they
//! differ in which surface a layer order maps to and in how nodes are
//! colored. Per node the order is: mask clip, transform, alpha, paint.

use std::collections::{BTreeSet, HashMap};

use kurbo::BezPath;
use strata_core::scene::{INVALID, NodeContent, NodeId, SceneStore};
use tiny_skia::{Mask, Pixmap, Transform};

use crate::context::{PaintMode, SkiaPainter, clip_mask, node_transform};
use crate::picking::ColorRegistry;

/// A pixmap and the transform from CSS pixels to its pixels.
pub(crate) struct Surface<'p> {
    pub(crate) pixmap: &'p mut Pixmap,
    pub(crate) base: Transform,
}

/// Maps layer orders to surfaces.
pub(crate) trait SurfaceSource {
    /// The surface nodes on layer `order` paint into, or `None` to skip them.
    fn surface(&mut self, order: i32) -> Option<Surface<'_>>;
}

/// A single pixmap that accepts one layer order.
pub(crate) struct SingleSurface<'p> {
    pub(crate) pixmap: &'p mut Pixmap,
    pub(crate) base: Transform,
    pub(crate) order: i32,
}

impl SurfaceSource for SingleSurface<'_> {
    fn surface(&mut self, order: i32) -> Option<Surface<'_>> {
        (order == self.order).then(|| Surface {
            pixmap: &mut *self.pixmap,
            base: self.base,
        })
    }
}

/// How the walk colors nodes.
pub(crate) enum Mode<'r> {
    /// Real paint.
    Visible {
        /// Leave out pictures whose pixels may not be read back, recording
        /// them in `omitted`.
        skip_tainted: bool,
        omitted: &'r mut Vec<NodeId>,
    },
    /// Picking colors for effectively interactive nodes only.
    Picking { registry: &'r mut ColorRegistry },
}

type ClipKey = (i32, Vec<u32>);

/// Walk state.
pub(crate) struct Walk<'a, S> {
    scene: &'a mut SceneStore,
    surfaces: &'a mut S,
    mode: Mode<'a>,
    /// Slots, outermost first, whose mask applies to the current subtree.
    clips: Vec<u32>,
    clip_cache: HashMap<ClipKey, Option<Mask>>,
    painted: u32,
}

impl<'a, S: SurfaceSource> Walk<'a, S> {
    pub(crate) fn new(scene: &'a mut SceneStore, surfaces: &'a mut S, mode: Mode<'a>) -> Self {
        Self {
            scene,
            surfaces,
            mode,
            clips: Vec::new(),
            clip_cache: HashMap::new(),
            painted: 0,
        }
    }

    /// Paints the tree under the root, returning how many nodes painted.
    pub(crate) fn run(mut self) -> u32 {
        let root = self.scene.root().index();
        self.visit(root);
        self.painted
    }

    fn visit(&mut self, idx: u32) {
        // Hidden subtrees are skipped entirely, picking included.
        if !self.scene.visible_at(idx) {
            return;
        }
        let clipped = match self.scene.mask_at(idx) {
            Some(mask) => match self.mode {
                Mode::Visible { .. } => true,
                // An interactive mask leaves the area outside it hittable.
                Mode::Picking { .. } => !self.scene.effective_interactive_at(mask.index()),
            },
            None => false,
        };
        if clipped {
            self.clips.push(idx);
        }

        self.paint(idx);

        let mut child = self.scene.first_child_at(idx);
        while child != INVALID {
            self.visit(child);
            child = self.scene.next_sibling_at(child);
        }

        if clipped {
            self.clips.pop();
        }
    }

    fn paint(&mut self, idx: u32) {
        if matches!(self.scene.content_at(idx), NodeContent::Container)
            || self.scene.flags_at(idx).degenerate_transform
        {
            return;
        }
        let order = self.scene.effective_layer_at(idx);
        let Some(surface) = self.surfaces.surface(order) else {
            return;
        };
        let id = self.scene.id_at(idx);
        let mode = match &mut self.mode {
            Mode::Visible {
                skip_tainted,
                omitted,
            } => {
                if *skip_tainted
                    && let NodeContent::Picture(p) = self.scene.content_at(idx)
                    && p.is_tainted()
                {
                    omitted.push(id);
                    return;
                }
                PaintMode::Visible {
                    alpha: self.scene.effective_alpha_at(idx),
                }
            }
            Mode::Picking { registry } => {
                if !self.scene.effective_interactive_at(idx) {
                    return;
                }
                let Some(color) = registry.assign(id) else {
                    return;
                };
                PaintMode::Picking(color)
            }
        };

        let transform = node_transform(surface.base, self.scene.world_matrix_at(idx));
        let clip = if self.clips.is_empty() {
            None
        } else {
            let key = (order, self.clips.clone());
            if !self.clip_cache.contains_key(&key) {
                let mask = build_clip(
                    self.scene,
                    &self.clips,
                    surface.base,
                    surface.pixmap,
                    matches!(mode, PaintMode::Visible { .. }),
                );
                self.clip_cache.insert(key.clone(), mask);
            }
            self.clip_cache.get(&key).and_then(Option::as_ref)
        };

        let mut painter = SkiaPainter {
            pixmap: surface.pixmap,
            transform,
            clip,
            mode,
        };
        match self.scene.content_at_mut(idx) {
            NodeContent::Container => return,
            NodeContent::Graphics(g) => g.replay(&mut painter),
            NodeContent::Text(t) => match mode {
                PaintMode::Visible { .. } => t.paint(&mut painter),
                PaintMode::Picking(color) => painter.fill_rects(&t.run_rects(), color),
            },
            NodeContent::Picture(p) => painter.draw_picture(p),
        }
        self.painted += 1;
    }
}

/// Distinct layer orders of drawable nodes in the visible tree, filtered by
/// `keep(slot)`.
pub(crate) fn layer_orders(scene: &SceneStore, keep: impl Fn(u32) -> bool) -> BTreeSet<i32> {
    let mut orders = BTreeSet::new();
    let mut stack = vec![scene.root().index()];
    while let Some(idx) = stack.pop() {
        if !scene.visible_at(idx) {
            continue;
        }
        if !matches!(scene.content_at(idx), NodeContent::Container) && keep(idx) {
            orders.insert(scene.effective_layer_at(idx));
        }
        let mut child = scene.first_child_at(idx);
        while child != INVALID {
            stack.push(child);
            child = scene.next_sibling_at(child);
        }
    }
    orders
}

/// Intersects the masks of every slot in `clips` on `pixmap`'s grid.
fn build_clip(
    scene: &SceneStore,
    clips: &[u32],
    base: Transform,
    pixmap: &Pixmap,
    anti_alias: bool,
) -> Option<Mask> {
    let mut mask: Option<Mask> = None;
    for &slot in clips {
        let Some(mask_id) = scene.mask_at(slot) else {
            continue;
        };
        let outline = match scene.content_at(mask_id.index()) {
            NodeContent::Graphics(g) => g.outline(),
            _ => BezPath::new(),
        };
        let transform = node_transform(base, scene.world_matrix_at(mask_id.index()));
        mask = Some(clip_mask(
            &outline,
            transform,
            pixmap.width(),
            pixmap.height(),
            anti_alias,
            mask.as_ref(),
        )?);
    }
    mask
}
