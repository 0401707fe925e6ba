// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster layers.

use kurbo::Point;
use strata_core::scene::LayerMargin;
use tiny_skia::{Pixmap, PremultipliedColorU8, Transform};

use crate::error::RenderError;

/// Narrows a coordinate to the rasterizer's precision.
#[allow(
    clippy::cast_possible_truncation,
    reason = "device coordinates are well within f32 range"
)]
pub(crate) fn f32(v: f64) -> f32 {
    v as f32
}

/// Pixel size of a surface covering `width` x `height` CSS pixels plus
/// `margin`, at `resolution` device pixels per CSS pixel.
#[must_use]
pub fn backing_size(width: f64, height: f64, resolution: f64, margin: LayerMargin) -> (u32, u32) {
    let w = (width + margin.left + margin.right) * resolution;
    let h = (height + margin.top + margin.bottom) * resolution;
    (device_len(w), device_len(h))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped to 1..=u32::MAX before the cast"
)]
fn device_len(v: f64) -> u32 {
    if v.is_finite() {
        v.ceil().clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

pub(crate) fn alloc_pixmap(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })
}

/// A raster surface with an order key, a margin and a dirty flag.
///
/// Layer contents are drawn in CSS pixels. The surface origin sits at
/// `(-margin.left, -margin.top)` so content can overflow the visible area by
/// the margin without being clipped.
#[derive(Debug)]
pub struct Layer {
    order: i32,
    margin: LayerMargin,
    visible: bool,
    dirty: bool,
    width: f64,
    height: f64,
    resolution: f64,
    pixmap: Pixmap,
}

impl Layer {
    /// Allocates a dirty, visible layer.
    pub fn new(
        order: i32,
        width: f64,
        height: f64,
        resolution: f64,
        margin: LayerMargin,
    ) -> Result<Self, RenderError> {
        let (pw, ph) = backing_size(width, height, resolution, margin);
        Ok(Self {
            order,
            margin,
            visible: true,
            dirty: true,
            width,
            height,
            resolution,
            pixmap: alloc_pixmap(pw, ph)?,
        })
    }

    /// Returns the order key. Higher orders composite on top.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns the margin.
    #[must_use]
    pub fn margin(&self) -> LayerMargin {
        self.margin
    }

    /// Returns whether the layer is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the layer. Hidden layers are not repainted, composited
    /// or hit tested. Showing a layer marks it dirty.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.dirty = true;
        }
        self.visible = visible;
    }

    /// Returns whether the pixels are stale.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the pixels stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Visible size in CSS pixels.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Device pixels per CSS pixel.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// The backing pixels.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Resizes the backing surface and marks the layer dirty.
    ///
    /// The pixel size is always `(size + margin) * resolution`, rounded up.
    pub fn resize(&mut self, width: f64, height: f64, resolution: f64) -> Result<(), RenderError> {
        let (pw, ph) = backing_size(width, height, resolution, self.margin);
        if pw != self.pixmap.width() || ph != self.pixmap.height() {
            self.pixmap = alloc_pixmap(pw, ph)?;
        }
        self.width = width;
        self.height = height;
        self.resolution = resolution;
        self.dirty = true;
        Ok(())
    }

    /// Replaces the margin, reallocating the surface if its size changes.
    pub fn set_margin(&mut self, margin: LayerMargin) -> Result<(), RenderError> {
        if margin == self.margin {
            return Ok(());
        }
        self.margin = margin;
        self.resize(self.width, self.height, self.resolution)
    }

    /// Clears every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Maps CSS pixels to surface pixels.
    #[must_use]
    pub fn base_transform(&self) -> Transform {
        let r = f32(self.resolution);
        Transform::from_row(
            r,
            0.0,
            0.0,
            r,
            f32(self.margin.left * self.resolution),
            f32(self.margin.top * self.resolution),
        )
    }

    /// Surface pixel under a CSS-pixel point.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "negative and out-of-range coordinates are rejected first"
    )]
    #[must_use]
    pub fn pixel_at(&self, point: Point) -> Option<PremultipliedColorU8> {
        let x = ((point.x + self.margin.left) * self.resolution).floor();
        let y = ((point.y + self.margin.top) * self.resolution).floor();
        if !(x >= 0.0 && y >= 0.0) || x >= f64::from(u32::MAX) || y >= f64::from(u32::MAX) {
            return None;
        }
        self.pixmap.pixel(x as u32, y as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_includes_margin_and_resolution() {
        let m = LayerMargin {
            left: 5.0,
            top: 0.0,
            right: 5.0,
            bottom: 10.0,
        };
        assert_eq!(backing_size(100.0, 50.0, 2.0, m), (220, 120));
        assert_eq!(backing_size(10.5, 10.0, 1.0, LayerMargin::ZERO), (11, 10));
        assert_eq!(backing_size(0.0, 0.0, 1.0, LayerMargin::ZERO), (1, 1));
    }

    #[test]
    fn resize_keeps_backing_consistent() {
        let mut layer = Layer::new(0, 100.0, 100.0, 1.0, LayerMargin::uniform(4.0)).unwrap();
        assert_eq!(layer.pixmap().width(), 108);
        layer.mark_clean();
        layer.resize(50.0, 20.0, 2.0).unwrap();
        assert_eq!((layer.pixmap().width(), layer.pixmap().height()), (116, 56));
        assert!(layer.is_dirty());
    }

    #[test]
    fn margin_offsets_pixel_lookup() {
        let mut layer = Layer::new(0, 10.0, 10.0, 2.0, LayerMargin::uniform(1.0)).unwrap();
        layer.pixmap_mut().fill(tiny_skia::Color::WHITE);
        assert!(layer.pixel_at(Point::new(-1.0, -1.0)).is_some());
        assert!(layer.pixel_at(Point::new(-1.5, 0.0)).is_none());
        assert!(layer.pixel_at(Point::new(10.9, 10.9)).is_some());
        assert!(layer.pixel_at(Point::new(11.0, 0.0)).is_none());
    }

    #[test]
    fn showing_a_layer_dirties_it() {
        let mut layer = Layer::new(0, 1.0, 1.0, 1.0, LayerMargin::ZERO).unwrap();
        layer.mark_clean();
        layer.set_visible(false);
        assert!(!layer.is_dirty());
        layer.set_visible(true);
        assert!(layer.is_dirty());
    }
}
