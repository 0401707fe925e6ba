// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color-coded hit testing.
//!
//! Every interactive node is assigned a flat color. The picking surface is
//! painted with those colors, without anti-aliasing, in the same order as the
//! visible layers; reading back one pixel then names the topmost node there.
//!
//! Ids are spread over the channels bit by bit, starting at each channel's
//! most significant bit: id `1` is `#800000`, id `2` is `#008000`, id `4` is
//! `#000080`, id `8` is `#400000` and so on. Consecutive ids therefore differ
//! by large channel steps instead of the least significant bit of blue. Black
//! is id `0` and is never assigned, so the cleared surface reads as "no hit".

use std::collections::HashMap;

use kurbo::Point;
use strata_core::color::Color;
use strata_core::scene::{LayerMargin, NodeId};

use crate::error::RenderError;
use crate::layer::Layer;

/// Largest id that fits in 24 bits.
const MAX_ID: u32 = 0x00ff_ffff;

/// Spreads the 24 id bits across R, G and B, most significant bits first.
#[must_use]
pub fn encode_id(id: u32) -> Color {
    let mut rgb = [0_u8; 3];
    for bit in 0..24 {
        if id & (1 << bit) != 0 {
            rgb[bit % 3] |= 0x80 >> (bit / 3);
        }
    }
    Color::rgb(rgb[0], rgb[1], rgb[2])
}

/// Inverse of [`encode_id`].
#[must_use]
pub fn decode_id(color: Color) -> u32 {
    let rgb = [color.r, color.g, color.b];
    let mut id = 0;
    for bit in 0..24 {
        if rgb[bit % 3] & (0x80 >> (bit / 3)) != 0 {
            id |= 1 << bit;
        }
    }
    id
}

/// Bidirectional map between interactive nodes and picking colors.
#[derive(Clone, Debug)]
pub struct ColorRegistry {
    by_id: HashMap<u32, NodeId>,
    by_slot: HashMap<u32, u32>,
    next: u32,
    recycled: Vec<u32>,
}

impl Default for ColorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_slot: HashMap::new(),
            next: 1,
            recycled: Vec::new(),
        }
    }

    /// Returns the color of `node`, assigning one on first use.
    ///
    /// Returns `None` when all 2^24 - 1 colors are taken.
    pub fn assign(&mut self, node: NodeId) -> Option<Color> {
        if let Some(&id) = self.by_slot.get(&node.index())
            && self.by_id.get(&id) == Some(&node)
        {
            return Some(encode_id(id));
        }
        // A recycled slot keeps no stale entry around.
        self.remove_slot(node.index());

        let id = if self.next <= MAX_ID {
            self.next += 1;
            self.next - 1
        } else {
            self.recycled.pop()?
        };
        self.by_id.insert(id, node);
        self.by_slot.insert(node.index(), id);
        Some(encode_id(id))
    }

    /// Returns the node painted with `color`, if any.
    #[must_use]
    pub fn lookup(&self, color: Color) -> Option<NodeId> {
        self.by_id.get(&decode_id(color)).copied()
    }

    /// Returns the color assigned to `node`.
    #[must_use]
    pub fn color_of(&self, node: NodeId) -> Option<Color> {
        let id = *self.by_slot.get(&node.index())?;
        (self.by_id.get(&id) == Some(&node)).then(|| encode_id(id))
    }

    /// Drops the entry of `node`.
    pub fn remove(&mut self, node: NodeId) {
        if self.color_of(node).is_some() {
            self.remove_slot(node.index());
        }
    }

    /// Drops whatever entry slot `idx` holds.
    pub fn remove_slot(&mut self, idx: u32) {
        if let Some(id) = self.by_slot.remove(&idx) {
            self.by_id.remove(&id);
            self.recycled.push(id);
        }
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no node is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The off-screen surface interactive nodes are painted into.
///
/// Its margin is the per-side maximum of all layer margins so that anything
/// drawn into any layer's margin can also be hit.
#[derive(Debug)]
pub struct PickingSurface {
    surface: Layer,
    rendered: bool,
}

impl PickingSurface {
    /// Allocates the surface.
    pub fn new(width: f64, height: f64, resolution: f64) -> Result<Self, RenderError> {
        Ok(Self {
            surface: Layer::new(i32::MIN, width, height, resolution, LayerMargin::ZERO)?,
            rendered: false,
        })
    }

    /// The underlying raster.
    #[must_use]
    pub fn surface(&self) -> &Layer {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut Layer {
        &mut self.surface
    }

    /// Whether a picking pass has completed.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn set_rendered(&mut self) {
        self.rendered = true;
        self.surface.mark_clean();
    }

    /// Widens the margin to cover `margin`, returning whether it changed.
    pub(crate) fn cover_margin(&mut self, margin: LayerMargin) -> Result<bool, RenderError> {
        let widened = self.surface.margin().max(margin);
        if widened == self.surface.margin() {
            return Ok(false);
        }
        self.surface.set_margin(widened)?;
        Ok(true)
    }

    /// Reads the picking color under a CSS-pixel point.
    ///
    /// Transparent pixels (nothing painted) read as `None`.
    #[must_use]
    pub fn color_at(&self, point: Point) -> Option<Color> {
        let px = self.surface.pixel_at(point)?;
        // Picking paints are opaque and aliased, so premultiplied == straight.
        (px.alpha() == 255).then(|| Color::rgb(px.red(), px.green(), px.blue()))
    }
}
