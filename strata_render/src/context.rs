// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tiny-skia` drawing context behind the [`Painter`] trait.
//!
//! The same context type draws visible layers and the picking surface. In
//! picking mode every paint is replaced by the node's flat picking color and
//! anti-aliasing is off, so the geometry is identical and only the pixels'
//! colors differ.

use kurbo::{BezPath, PathEl, Rect};
use strata_core::color::Color;
use strata_core::graphics::{FillRule, FillStyle, LineCap, LineJoin, Painter, StrokeStyle};
use strata_core::picture::{ImageData, Picture};
use strata_core::transform::Transform as Matrix;
use tiny_skia::{
    ColorU8, FilterQuality, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

use crate::layer::f32;

/// Converts a kurbo path. Empty paths yield `None`.
pub(crate) fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(f32(p.x), f32(p.y)),
            PathEl::LineTo(p) => pb.line_to(f32(p.x), f32(p.y)),
            PathEl::QuadTo(c, p) => pb.quad_to(f32(c.x), f32(c.y), f32(p.x), f32(p.y)),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                f32(c1.x),
                f32(c1.y),
                f32(c2.x),
                f32(c2.y),
                f32(p.x),
                f32(p.y),
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Concatenates a surface's base transform with a node's world matrix.
pub(crate) fn node_transform(base: Transform, world: Matrix) -> Transform {
    base.pre_concat(Transform::from_row(
        f32(world.a),
        f32(world.b),
        f32(world.c),
        f32(world.d),
        f32(world.tx),
        f32(world.ty),
    ))
}

fn fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn stroke(style: &StrokeStyle) -> Stroke {
    let mut dash: Vec<f32> = style.dash.iter().map(|d| f32(*d)).collect();
    // An odd dash list repeats once, as on a canvas.
    if dash.len() % 2 == 1 {
        dash.extend_from_within(..);
    }
    Stroke {
        width: f32(style.width),
        miter_limit: f32(style.miter_limit),
        line_cap: match style.cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match style.join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        dash: if dash.is_empty() {
            None
        } else {
            StrokeDash::new(dash, f32(style.dash_offset))
        },
    }
}

/// Builds a clip mask from `outline` drawn with `transform`, intersected with
/// `parent` if given.
pub(crate) fn clip_mask(
    outline: &BezPath,
    transform: Transform,
    width: u32,
    height: u32,
    anti_alias: bool,
    parent: Option<&Mask>,
) -> Option<Mask> {
    let path = to_skia_path(outline);
    match (parent, path) {
        (Some(parent), Some(path)) => {
            let mut mask = parent.clone();
            mask.intersect_path(&path, tiny_skia::FillRule::Winding, anti_alias, transform);
            Some(mask)
        }
        // An empty outline hides everything.
        (Some(_), None) | (None, None) => Mask::new(width, height),
        (None, Some(path)) => {
            let mut mask = Mask::new(width, height)?;
            mask.fill_path(&path, tiny_skia::FillRule::Winding, anti_alias, transform);
            Some(mask)
        }
    }
}

/// Converts straight RGBA pixels to a premultiplied pixmap.
pub(crate) fn image_pixmap(image: &ImageData) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(image.pixels().chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

/// How a [`SkiaPainter`] colors what it draws.
#[derive(Clone, Copy, Debug)]
pub(crate) enum PaintMode {
    /// The node's own paint, with compound alpha applied.
    Visible {
        /// Compound alpha.
        alpha: f64,
    },
    /// One flat, opaque color for everything.
    Picking(Color),
}

/// A [`Painter`] drawing into a pixmap.
pub(crate) struct SkiaPainter<'a> {
    pub(crate) pixmap: &'a mut Pixmap,
    pub(crate) transform: Transform,
    pub(crate) clip: Option<&'a Mask>,
    pub(crate) mode: PaintMode,
}

impl core::fmt::Debug for SkiaPainter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SkiaPainter")
            .field("transform", &self.transform)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SkiaPainter<'_> {
    fn paint(&self, color: Color) -> Paint<'static> {
        let (color, anti_alias) = match self.mode {
            PaintMode::Visible { alpha } => (color.multiply_alpha(alpha), true),
            PaintMode::Picking(flat) => (flat, false),
        };
        let mut paint = Paint {
            anti_alias,
            ..Paint::default()
        };
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint
    }

    /// Fills axis-aligned rectangles in local coordinates.
    pub(crate) fn fill_rects(&mut self, rects: &[Rect], color: Color) {
        let paint = self.paint(color);
        for r in rects {
            if let Some(rect) =
                tiny_skia::Rect::from_ltrb(f32(r.x0), f32(r.y0), f32(r.x1), f32(r.y1))
            {
                self.pixmap
                    .fill_rect(rect, &paint, self.transform, self.clip);
            }
        }
    }

    /// Draws a picture at its display size. In picking mode the display
    /// rectangle is filled instead.
    pub(crate) fn draw_picture(&mut self, picture: &Picture) {
        let Some(bounds) = picture.bounds() else {
            return;
        };
        match self.mode {
            PaintMode::Picking(color) => self.fill_rects(&[bounds], color),
            PaintMode::Visible { alpha } => {
                let Some(image) = picture.image() else {
                    return;
                };
                let Some(pixmap) = image_pixmap(image) else {
                    return;
                };
                let sx = bounds.width() / f64::from(image.width());
                let sy = bounds.height() / f64::from(image.height());
                let paint = PixmapPaint {
                    opacity: f32(alpha.clamp(0.0, 1.0)),
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                self.pixmap.draw_pixmap(
                    0,
                    0,
                    pixmap.as_ref(),
                    &paint,
                    self.transform.pre_scale(f32(sx), f32(sy)),
                    self.clip,
                );
            }
        }
    }
}

impl Painter for SkiaPainter<'_> {
    fn fill(&mut self, path: &BezPath, style: &FillStyle) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(style.color);
        self.pixmap.fill_path(
            &path,
            &paint,
            fill_rule(style.rule),
            self.transform,
            self.clip,
        );
    }

    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(style.color);
        self.pixmap
            .stroke_path(&path, &paint, &stroke(style), self.transform, self.clip);
    }
}
