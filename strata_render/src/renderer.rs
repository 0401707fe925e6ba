// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame pass.
//!
//! A [`Renderer`] owns the scene, the layer surfaces, the picking surface and
//! the color registry. [`Renderer::render`] runs one frame:
//!
//! 1. Apply finished image loads.
//! 2. [`evaluate`](SceneStore::evaluate) the scene.
//! 3. Drop registry entries of disposed or no longer interactive nodes.
//! 4. Create layers for newly used orders and size their margins.
//! 5. Repaint every layer that is both dirty and visible.
//! 6. Repaint the picking surface, one pass per interactive layer order,
//!    bottom layer first.
//!
//! Nothing is repainted when nothing changed.

use std::collections::BTreeMap;

use kurbo::Point;
use strata_core::host::HitTest;
use strata_core::scene::{FrameChanges, LayerMargin, NodeContent, NodeId, SceneStore};
use strata_core::trace::{
    FrameBeginEvent, FrameEndEvent, HitTestEvent, LayerRepaintEvent, NodeFlag, NodeFlagEvent,
    PickingPassEvent, Tracer,
};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::error::RenderError;
use crate::image_queue::{ImageQueue, ImageSender, ImageUpdate};
use crate::layer::{Layer, alloc_pixmap, backing_size, f32};
use crate::pass::{Mode, SingleSurface, Walk, layer_orders};
use crate::picking::{ColorRegistry, PickingSurface};

/// Renderer construction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    /// Visible width in CSS pixels.
    pub width: f64,
    /// Visible height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub resolution: f64,
    /// Whether to maintain a picking surface. Without one every hit test
    /// misses.
    pub picking: bool,
    /// Layer order of nodes that neither declare nor inherit one.
    pub default_layer: i32,
}

impl RendererConfig {
    /// A 300x150 surface at resolution 1 with picking enabled.
    pub const DEFAULT: Self = Self {
        width: 300.0,
        height: 150.0,
        resolution: 1.0,
        picking: true,
        default_layer: 0,
    };

    /// The default configuration at another size.
    #[must_use]
    pub const fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::DEFAULT
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What one [`Renderer::render`] call did.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Frame counter, starting at 1.
    pub frame_index: u64,
    /// Orders of the layers that were repainted, ascending.
    pub repainted_layers: Vec<i32>,
    /// Layer orders targeted by picking passes, in pass order.
    pub picking_passes: Vec<i32>,
    /// Image completions applied at the start of the frame.
    pub images: Vec<ImageUpdate>,
    /// Scene changes consumed by the frame.
    pub changes: FrameChanges,
}

/// Owns a scene and draws it into layered raster surfaces.
#[derive(Debug)]
pub struct Renderer {
    pub(crate) scene: SceneStore,
    pub(crate) config: RendererConfig,
    pub(crate) layers: BTreeMap<i32, Layer>,
    picking: Option<PickingSurface>,
    registry: ColorRegistry,
    images: ImageQueue,
    frame_index: u64,
    picking_dirty: bool,
}

impl Renderer {
    /// Creates a renderer with an empty scene and the default layer.
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        let mut layers = BTreeMap::new();
        layers.insert(
            config.default_layer,
            Layer::new(
                config.default_layer,
                config.width,
                config.height,
                config.resolution,
                LayerMargin::ZERO,
            )?,
        );
        let picking = if config.picking {
            Some(PickingSurface::new(
                config.width,
                config.height,
                config.resolution,
            )?)
        } else {
            None
        };
        Ok(Self {
            scene: SceneStore::with_default_layer(config.default_layer),
            config,
            layers,
            picking,
            registry: ColorRegistry::new(),
            images: ImageQueue::new(),
            frame_index: 0,
            picking_dirty: true,
        })
    }

    /// The configuration, with the current size and resolution.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    /// The scene, for mutation. Changes show up on the next frame.
    pub fn scene_mut(&mut self) -> &mut SceneStore {
        &mut self.scene
    }

    /// Shorthand for the scene's root container.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns `true` once a frame has completed.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.frame_index > 0
    }

    /// The layer with the given order, if one has been created.
    #[must_use]
    pub fn layer(&self, order: i32) -> Option<&Layer> {
        self.layers.get(&order)
    }

    /// All layers, bottom first.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Shows or hides a layer. Returns `false` if no such layer exists.
    ///
    /// A hidden layer is neither repainted, composited nor hit.
    pub fn set_layer_visible(&mut self, order: i32, visible: bool) -> bool {
        let Some(layer) = self.layers.get_mut(&order) else {
            return false;
        };
        if layer.is_visible() != visible {
            layer.set_visible(visible);
            self.picking_dirty = true;
        }
        true
    }

    /// The picking surface, if picking is enabled.
    #[must_use]
    pub fn picking_surface(&self) -> Option<&PickingSurface> {
        self.picking.as_ref()
    }

    /// The color registry.
    #[must_use]
    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// A sender for asynchronous picture loads.
    #[must_use]
    pub fn image_sender(&self) -> ImageSender {
        self.images.sender()
    }

    /// Resizes every surface. All layers are repainted on the next frame.
    pub fn resize(&mut self, width: f64, height: f64, resolution: f64) -> Result<(), RenderError> {
        for layer in self.layers.values_mut() {
            layer.resize(width, height, resolution)?;
        }
        if let Some(picking) = &mut self.picking {
            picking.surface_mut().resize(width, height, resolution)?;
        }
        self.config.width = width;
        self.config.height = height;
        self.config.resolution = resolution;
        self.picking_dirty = true;
        Ok(())
    }

    /// Renders one frame.
    pub fn render(&mut self) -> Result<FrameReport, RenderError> {
        self.render_traced(&mut Tracer::none())
    }

    /// Renders one frame, reporting to `tracer`.
    pub fn render_traced(&mut self, tracer: &mut Tracer<'_>) -> Result<FrameReport, RenderError> {
        self.frame_index += 1;
        let frame_index = self.frame_index;

        let images = self.images.drain_into(&mut self.scene);
        let changes = self.scene.evaluate();

        for &idx in changes.removed.iter().chain(&changes.lost_interactivity) {
            self.registry.remove_slot(idx);
        }
        self.update_flags(&changes, &images, tracer);

        if changes.topology_changed || !changes.damaged_layers.is_empty() {
            self.sync_layers()?;
        }
        for order in &changes.damaged_layers {
            if let Some(layer) = self.layers.get_mut(order) {
                layer.mark_dirty();
            }
        }

        let dirty: Vec<i32> = self
            .layers
            .values()
            .filter(|l| l.is_dirty() && l.is_visible())
            .map(Layer::order)
            .collect();
        if !dirty.is_empty() || !changes.interactivity.is_empty() {
            self.picking_dirty = true;
        }

        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            dirty_layers: count(dirty.len()),
            changed_nodes: count(changed_nodes(&changes)),
        });

        for &order in &dirty {
            let painted = self.repaint_layer(order);
            tracer.layer_repaint(&LayerRepaintEvent {
                frame_index,
                order,
                painted_nodes: painted,
            });
        }

        let mut picking_passes = Vec::new();
        if self.picking_dirty && self.picking.is_some() {
            for (order, painted) in self.repaint_picking() {
                tracer.picking_pass(&PickingPassEvent {
                    frame_index,
                    layer_order: order,
                    painted_nodes: painted,
                });
                picking_passes.push(order);
            }
            self.picking_dirty = false;
        }

        tracer.frame_end(&FrameEndEvent {
            frame_index,
            repainted_layers: count(dirty.len()),
            picking_passes: count(picking_passes.len()),
        });

        Ok(FrameReport {
            frame_index,
            repainted_layers: dirty,
            picking_passes,
            images,
            changes,
        })
    }

    /// Returns the interactive node painted at `point` (CSS pixels).
    ///
    /// Always `None` before the first frame. The answer reflects the last
    /// frame; a node disposed or made non-interactive since then is not
    /// reported.
    pub fn hit_test(&mut self, point: Point) -> Option<NodeId> {
        self.hit_test_traced(point, &mut Tracer::none())
    }

    /// Like [`hit_test`](Self::hit_test), reporting to `tracer`.
    pub fn hit_test_traced(&mut self, point: Point, tracer: &mut Tracer<'_>) -> Option<NodeId> {
        let node = self.pick(point);
        tracer.hit_test(&HitTestEvent {
            x: point.x,
            y: point.y,
            node,
        });
        node
    }

    fn pick(&mut self, point: Point) -> Option<NodeId> {
        let surface = self.picking.as_ref()?;
        if !surface.is_rendered() {
            return None;
        }
        let node = self.registry.lookup(surface.color_at(point)?)?;
        self.scene
            .effective_interactive(node)
            .unwrap_or(false)
            .then_some(node)
    }

    /// Composites the visible layers, bottom first, into one pixmap of the
    /// visible area.
    pub fn composite(&self) -> Result<Pixmap, RenderError> {
        if !self.is_rendered() {
            return Err(RenderError::NotRendered);
        }
        let (w, h) = backing_size(
            self.config.width,
            self.config.height,
            self.config.resolution,
            LayerMargin::ZERO,
        );
        let mut out = alloc_pixmap(w, h)?;
        for layer in self.layers.values().filter(|l| l.is_visible()) {
            let m = layer.margin();
            let r = layer.resolution();
            out.draw_pixmap(
                0,
                0,
                layer.pixmap().as_ref(),
                &PixmapPaint::default(),
                Transform::from_translate(f32(-m.left * r), f32(-m.top * r)),
                None,
            );
        }
        Ok(out)
    }

    /// Creates missing layers and sizes every layer's margin to the largest
    /// margin declared for its order.
    fn sync_layers(&mut self) -> Result<(), RenderError> {
        let mut wanted: BTreeMap<i32, LayerMargin> = BTreeMap::new();
        wanted.insert(self.scene.default_layer(), LayerMargin::ZERO);
        for &idx in self.scene.traversal_order() {
            let order = self.scene.effective_layer_at(idx);
            wanted.entry(order).or_insert(LayerMargin::ZERO);
            if let Some((declared, margin)) = self.scene.declared_layer_at(idx) {
                let entry = wanted.entry(declared).or_insert(LayerMargin::ZERO);
                *entry = entry.max(margin);
            }
        }

        let mut widest = LayerMargin::ZERO;
        for (&order, &margin) in &wanted {
            match self.layers.get_mut(&order) {
                Some(layer) => layer.set_margin(margin)?,
                None => {
                    let layer = Layer::new(
                        order,
                        self.config.width,
                        self.config.height,
                        self.config.resolution,
                        margin,
                    )?;
                    self.layers.insert(order, layer);
                }
            }
            widest = widest.max(margin);
        }
        if let Some(picking) = &mut self.picking
            && picking.cover_margin(widest)?
        {
            self.picking_dirty = true;
        }
        Ok(())
    }

    fn repaint_layer(&mut self, order: i32) -> u32 {
        let Some(layer) = self.layers.get_mut(&order) else {
            return 0;
        };
        layer.clear();
        let base = layer.base_transform();
        let mut omitted = Vec::new();
        let mut surface = SingleSurface {
            pixmap: layer.pixmap_mut(),
            base,
            order,
        };
        let painted = Walk::new(
            &mut self.scene,
            &mut surface,
            Mode::Visible {
                skip_tainted: false,
                omitted: &mut omitted,
            },
        )
        .run();
        layer.mark_clean();
        painted
    }

    /// Clears and repaints the picking surface. Returns `(order, painted)`
    /// per pass.
    fn repaint_picking(&mut self) -> Vec<(i32, u32)> {
        let Some(picking) = &mut self.picking else {
            return Vec::new();
        };
        let layers = &self.layers;
        let orders = layer_orders(&self.scene, |idx| {
            self.scene.effective_interactive_at(idx)
                && layers
                    .get(&self.scene.effective_layer_at(idx))
                    .is_some_and(Layer::is_visible)
        });

        let surface = picking.surface_mut();
        surface.clear();
        let base = surface.base_transform();
        let mut passes = Vec::with_capacity(orders.len());
        for order in orders {
            let mut target = SingleSurface {
                pixmap: surface.pixmap_mut(),
                base,
                order,
            };
            let painted = Walk::new(
                &mut self.scene,
                &mut target,
                Mode::Picking {
                    registry: &mut self.registry,
                },
            )
            .run();
            passes.push((order, painted));
        }
        picking.set_rendered();
        passes
    }

    /// Syncs picture taint flags and reports flags raised this frame.
    fn update_flags(
        &mut self,
        changes: &FrameChanges,
        images: &[ImageUpdate],
        tracer: &mut Tracer<'_>,
    ) {
        let frame_index = self.frame_index;
        for &idx in &changes.content {
            if !self.scene.is_alive_at(idx) {
                continue;
            }
            let tainted = match self.scene.content_at(idx) {
                NodeContent::Picture(p) => p.is_tainted(),
                _ => false,
            };
            let flags = self.scene.flags_at_mut(idx);
            if flags.tainted == tainted {
                continue;
            }
            flags.tainted = tainted;
            if tainted {
                tracer.node_flag(&NodeFlagEvent {
                    frame_index,
                    node: self.scene.id_at(idx),
                    flag: NodeFlag::Tainted,
                });
            }
        }

        for &idx in &changes.flags_changed {
            if !self.scene.is_alive_at(idx) {
                continue;
            }
            let flags = self.scene.flags_at(idx);
            let node = self.scene.id_at(idx);
            let raised = [
                (flags.degenerate_transform, NodeFlag::DegenerateTransform),
                (flags.stale_mask, NodeFlag::StaleMask),
            ];
            for (set, flag) in raised {
                if set {
                    tracer.node_flag(&NodeFlagEvent {
                        frame_index,
                        node,
                        flag,
                    });
                }
            }
        }

        for update in images {
            if let ImageUpdate::Failed(node) = *update {
                tracer.node_flag(&NodeFlagEvent {
                    frame_index,
                    node,
                    flag: NodeFlag::DecodeFailed,
                });
            }
        }
    }
}

impl HitTest for Renderer {
    fn hit_test(&mut self, point: Point) -> Option<NodeId> {
        self.hit_test_traced(point, &mut Tracer::none())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.scene.parent(node).ok().flatten()
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.scene.is_alive(node)
    }

    fn is_interactive(&mut self, node: NodeId) -> bool {
        self.scene.effective_interactive(node).unwrap_or(false)
    }
}

fn changed_nodes(changes: &FrameChanges) -> usize {
    changes.transforms.len()
        + changes.appearance.len()
        + changes.interactivity.len()
        + changes.layers.len()
        + changes.content.len()
        + changes.added.len()
        + changes.removed.len()
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
