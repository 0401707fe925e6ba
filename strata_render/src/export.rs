// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster export at an arbitrary scale.
//!
//! Export reuses the paint walk against a temporary pixmap instead of
//! reading back the live layers, so it works at any scale and never touches
//! layer dirty state. Tainted pictures are left out and reported.

use strata_core::scene::NodeId;
use tiny_skia::{Pixmap, Transform};

use crate::error::RenderError;
use crate::layer::{Layer, alloc_pixmap, f32};
use crate::pass::{Mode, SingleSurface, Walk, layer_orders};
use crate::renderer::Renderer;

/// Output size constraints for [`Renderer::rasterize`], in pixels.
///
/// Each output dimension starts at the renderer's CSS size and is clamped
/// into its `[min, max]` range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizeOptions {
    /// Smallest output width.
    pub min_width: f64,
    /// Largest output width.
    pub max_width: f64,
    /// Smallest output height.
    pub min_height: f64,
    /// Largest output height.
    pub max_height: f64,
    /// Scale both axes by the same factor. When the bounds cannot all be
    /// met, the maximums win.
    pub maintain_pixel_ratio: bool,
}

impl RasterizeOptions {
    /// No constraints: the output is the CSS size at scale 1.
    pub const UNBOUNDED: Self = Self {
        min_width: 0.0,
        max_width: f64::INFINITY,
        min_height: 0.0,
        max_height: f64::INFINITY,
        maintain_pixel_ratio: true,
    };

    /// An exact output size, stretching if the aspect ratio differs.
    #[must_use]
    pub const fn exact(width: f64, height: f64) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
            maintain_pixel_ratio: false,
        }
    }

    /// Horizontal and vertical scale for content of `width` x `height`.
    #[must_use]
    pub fn scale_for(&self, width: f64, height: f64) -> (f64, f64) {
        if !(width > 0.0 && height > 0.0) {
            return (1.0, 1.0);
        }
        let sx = width.clamp(self.min_width, self.max_width.max(self.min_width)) / width;
        let sy = height.clamp(self.min_height, self.max_height.max(self.min_height)) / height;
        if !self.maintain_pixel_ratio {
            return (sx, sy);
        }
        let lo = (self.min_width / width).max(self.min_height / height);
        let hi = (self.max_width / width).min(self.max_height / height);
        let s = if lo > hi { hi } else { 1.0_f64.clamp(lo, hi) };
        (s, s)
    }
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// An exported image.
#[derive(Debug)]
pub struct Raster {
    /// Premultiplied RGBA pixels.
    pub pixmap: Pixmap,
    /// Horizontal and vertical scale from CSS pixels.
    pub scale: (f64, f64),
    /// Tainted picture nodes that were left out.
    pub omitted: Vec<NodeId>,
}

impl Raster {
    /// Returns `true` if nothing was left out.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }

    /// Encodes the pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

impl Renderer {
    /// Renders the visible layers into a new pixmap sized by `options`.
    ///
    /// Layers are composited bottom first. Hidden layers are skipped; so are
    /// margins, since the export covers the visible area only.
    pub fn rasterize(&mut self, options: &RasterizeOptions) -> Result<Raster, RenderError> {
        let (width, height) = (self.config.width, self.config.height);
        let (sx, sy) = options.scale_for(width, height);
        let (pw, ph) = (device_len(width * sx), device_len(height * sy));
        let mut pixmap = alloc_pixmap(pw, ph)?;
        let base = Transform::from_scale(f32(sx), f32(sy));

        self.scene.resolve();
        let layers = &self.layers;
        let scene = &self.scene;
        let orders = layer_orders(scene, |idx| {
            layers
                .get(&scene.effective_layer_at(idx))
                .is_none_or(Layer::is_visible)
        });

        let mut omitted = Vec::new();
        for order in orders {
            let mut target = SingleSurface {
                pixmap: &mut pixmap,
                base,
                order,
            };
            Walk::new(
                &mut self.scene,
                &mut target,
                Mode::Visible {
                    skip_tainted: true,
                    omitted: &mut omitted,
                },
            )
            .run();
        }
        Ok(Raster {
            pixmap,
            scale: (sx, sy),
            omitted,
        })
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped to 1..=u32::MAX before the cast"
)]
fn device_len(v: f64) -> u32 {
    if v.is_finite() {
        v.round().clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use strata_core::color::Color;
    use strata_core::graphics::Graphics;
    use strata_core::picture::{ImageData, Picture};

    use super::*;
    use crate::renderer::RendererConfig;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn unbounded_keeps_css_size() {
        assert!(close(RasterizeOptions::UNBOUNDED.scale_for(200.0, 100.0), (1.0, 1.0)));
    }

    #[test]
    fn ratio_follows_the_tighter_bound() {
        let opts = RasterizeOptions {
            max_width: 100.0,
            ..RasterizeOptions::UNBOUNDED
        };
        assert!(close(opts.scale_for(200.0, 100.0), (0.5, 0.5)));

        let opts = RasterizeOptions {
            min_height: 300.0,
            ..RasterizeOptions::UNBOUNDED
        };
        assert!(close(opts.scale_for(200.0, 100.0), (3.0, 3.0)));
    }

    #[test]
    fn maximums_win_conflicts() {
        let opts = RasterizeOptions {
            min_height: 400.0,
            max_width: 100.0,
            ..RasterizeOptions::UNBOUNDED
        };
        assert!(close(opts.scale_for(200.0, 100.0), (0.5, 0.5)));
    }

    #[test]
    fn exact_stretches() {
        assert!(close(
            RasterizeOptions::exact(50.0, 50.0).scale_for(100.0, 25.0),
            (0.5, 2.0)
        ));
    }

    #[test]
    fn rasterize_scales_content() {
        let mut r = Renderer::new(RendererConfig::with_size(20.0, 20.0)).unwrap();
        let root = r.root();
        let mut g = Graphics::new();
        g.begin_fill(Color::rgb(0, 255, 0))
            .rect(Rect::new(0.0, 0.0, 10.0, 10.0))
            .end_fill();
        let node = r.scene_mut().create_graphics(g);
        r.scene_mut().add_child(root, node).unwrap();

        let raster = r.rasterize(&RasterizeOptions::exact(40.0, 40.0)).unwrap();
        assert_eq!((raster.pixmap.width(), raster.pixmap.height()), (40, 40));
        let inside = raster.pixmap.pixel(15, 15).unwrap();
        assert_eq!((inside.green(), inside.alpha()), (255, 255));
        assert_eq!(raster.pixmap.pixel(25, 25).unwrap().alpha(), 0);
        assert!(raster.is_complete());
        assert!(!raster.encode_png().unwrap().is_empty());
    }

    #[test]
    fn tainted_pictures_are_omitted() {
        let mut r = Renderer::new(RendererConfig::with_size(4.0, 4.0)).unwrap();
        let root = r.root();
        let image = ImageData::new(1, 1, vec![255, 0, 0, 255])
            .unwrap()
            .tainted();
        let pic = r
            .scene_mut()
            .create_picture(Picture::ready(image).with_size(4.0, 4.0));
        r.scene_mut().add_child(root, pic).unwrap();

        let frame = r.render().unwrap();
        assert!(frame.repainted_layers.contains(&0));
        assert_eq!(r.layer(0).unwrap().pixel_at((1.0, 1.0).into()).unwrap().alpha(), 255);
        assert!(r.scene().flags(pic).unwrap().tainted);

        let raster = r.rasterize(&RasterizeOptions::UNBOUNDED).unwrap();
        assert_eq!(raster.omitted, vec![pic]);
        assert_eq!(raster.pixmap.pixel(1, 1).unwrap().alpha(), 0);
    }
}
