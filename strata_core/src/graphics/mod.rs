// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recorded vector drawing operations.
//!
//! A [`Graphics`] value is an append-only list of [`Op`] records. Rendering
//! never reads the list directly: it calls [`Graphics::replay`] with a
//! [`Painter`], and replay resolves every geometric operation into a
//! [`kurbo::BezPath`] before handing it over. The visible layer and the
//! picking surface therefore receive the very same path and differ only in
//! how they paint it.

mod arc;
mod command;
mod path;

use alloc::vec::Vec;

use kurbo::{BezPath, Circle, Ellipse, PathEl, Point, Rect, Shape, SvgArc, Vec2};

pub use arc::{ARC_TOLERANCE, ArcToGeometry, arc_bounds, arc_to, canvas_arc, svg_arc};
pub use command::{Cursor, FillRule, FillStyle, LineCap, LineJoin, Op, StrokeStyle};
pub use path::{PathError, parse_path};

use crate::color::Color;

/// Receives resolved paths from [`Graphics::replay`].
pub trait Painter {
    /// Fills `path` with `style`.
    fn fill(&mut self, path: &BezPath, style: &FillStyle);

    /// Strokes `path` with `style`.
    fn stroke(&mut self, path: &BezPath, style: &StrokeStyle);
}

/// A graphics node's command list.
#[derive(Clone, Debug, Default)]
pub struct Graphics {
    ops: Vec<Op>,
    /// `None` means stale; `Some(None)` means "no geometry".
    bounds: Option<Option<Rect>>,
}

impl Graphics {
    /// Creates an empty command list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a command list from a path string.
    ///
    /// See [`parse_path`] for the accepted grammar.
    pub fn from_path(d: &str) -> Result<Self, PathError> {
        let mut g = Self::new();
        g.set_path(d)?;
        Ok(g)
    }

    /// Returns the recorded operations.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Returns `true` if no operation has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Appends an operation.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
        self.bounds = None;
    }

    /// Removes every operation and invalidates cached bounds.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.bounds = None;
    }

    /// Replaces the geometry with a parsed path string.
    ///
    /// Paint survives: the current fill and stroke styles are kept, and if
    /// the old list filled or stroked, the new path is filled or stroked the
    /// same way. On a parse error the command list is left untouched.
    pub fn set_path(&mut self, d: &str) -> Result<(), PathError> {
        let ops = parse_path(d)?;
        let mut fill = None;
        let mut stroke = None;
        let mut dash = None;
        let mut fills = false;
        let mut strokes = false;
        for op in self.ops.drain(..) {
            match op {
                Op::BeginFill(_) => fill = Some(op),
                Op::LineStyle(_) => {
                    stroke = Some(op);
                    dash = None;
                }
                Op::LineDash(_) => dash = Some(op),
                Op::EndFill => fills = true,
                Op::EndStroke => strokes = true,
                _ => {}
            }
        }
        self.ops.extend(fill.into_iter().chain(stroke).chain(dash));
        self.ops.push(Op::BeginPath);
        self.ops.extend(ops);
        if fills {
            self.ops.push(Op::EndFill);
        }
        if strokes {
            self.ops.push(Op::EndStroke);
        }
        self.bounds = None;
        Ok(())
    }

    /// Appends the operations of a parsed path string to the current path.
    pub fn append_path(&mut self, d: &str) -> Result<(), PathError> {
        let ops = parse_path(d)?;
        self.ops.extend(ops);
        self.bounds = None;
        Ok(())
    }

    // -- Recording helpers --

    /// Discards the current path.
    pub fn begin_path(&mut self) -> &mut Self {
        self.push(Op::BeginPath);
        self
    }

    /// Closes the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.push(Op::ClosePath);
        self
    }

    /// Starts a new subpath at `p`.
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.push(Op::MoveTo(p.into()));
        self
    }

    /// Adds a straight segment to `p`.
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.push(Op::LineTo(p.into()));
        self
    }

    /// Adds a cubic Bézier segment.
    pub fn bezier_curve_to(
        &mut self,
        c1: impl Into<Point>,
        c2: impl Into<Point>,
        to: impl Into<Point>,
    ) -> &mut Self {
        self.push(Op::BezierTo {
            c1: c1.into(),
            c2: c2.into(),
            to: to.into(),
        });
        self
    }

    /// Adds a quadratic Bézier segment.
    pub fn quadratic_curve_to(&mut self, c: impl Into<Point>, to: impl Into<Point>) -> &mut Self {
        self.push(Op::QuadTo {
            c: c.into(),
            to: to.into(),
        });
        self
    }

    /// Adds a canvas-style circular arc. Angles are in radians.
    pub fn arc(
        &mut self,
        center: impl Into<Point>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> &mut Self {
        self.push(Op::Arc {
            center: center.into(),
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
        self
    }

    /// Rounds the corner at `p1` towards `p2` with `radius`.
    pub fn arc_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>, radius: f64) -> &mut Self {
        self.push(Op::ArcTo {
            p1: p1.into(),
            p2: p2.into(),
            radius,
        });
        self
    }

    /// Adds an SVG-style elliptical arc from the current point to `to`.
    pub fn elliptical_arc_to(
        &mut self,
        radii: Vec2,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: impl Into<Point>,
    ) -> &mut Self {
        self.push(Op::EllipticalArc {
            radii,
            x_rotation,
            large_arc,
            sweep,
            to: to.into(),
        });
        self
    }

    /// Adds a closed rectangle subpath.
    pub fn rect(&mut self, rect: Rect) -> &mut Self {
        self.push(Op::Rect(rect));
        self
    }

    /// Adds a closed rectangle subpath with rounded corners.
    ///
    /// The radius is clamped to half the shorter side.
    pub fn rounded_rect(&mut self, rect: Rect, radius: f64) -> &mut Self {
        let r = rect.abs();
        let radius = radius.min(r.width() / 2.0).min(r.height() / 2.0);
        if !(radius > 0.0) {
            return self.rect(r);
        }
        self.move_to((r.x0 + radius, r.y0))
            .arc_to((r.x1, r.y0), (r.x1, r.y1), radius)
            .arc_to((r.x1, r.y1), (r.x0, r.y1), radius)
            .arc_to((r.x0, r.y1), (r.x0, r.y0), radius)
            .arc_to((r.x0, r.y0), (r.x1, r.y0), radius)
            .close_path()
    }

    /// Adds a closed circle subpath.
    pub fn circle(&mut self, center: impl Into<Point>, radius: f64) -> &mut Self {
        self.push(Op::Circle {
            center: center.into(),
            radius,
        });
        self
    }

    /// Adds a closed axis-aligned ellipse subpath.
    pub fn ellipse(&mut self, center: impl Into<Point>, radii: Vec2) -> &mut Self {
        self.push(Op::Ellipse {
            center: center.into(),
            radii,
        });
        self
    }

    /// Sets the fill paint.
    pub fn begin_fill(&mut self, color: Color) -> &mut Self {
        self.push(Op::BeginFill(FillStyle::solid(color)));
        self
    }

    /// Sets the fill paint with an explicit winding rule.
    pub fn begin_fill_with(&mut self, style: FillStyle) -> &mut Self {
        self.push(Op::BeginFill(style));
        self
    }

    /// Fills the current path.
    pub fn end_fill(&mut self) -> &mut Self {
        self.push(Op::EndFill);
        self
    }

    /// Sets the stroke paint.
    pub fn line_style(&mut self, style: StrokeStyle) -> &mut Self {
        self.push(Op::LineStyle(style));
        self
    }

    /// Replaces the dash pattern of the stroke paint.
    pub fn set_line_dash(&mut self, dash: Vec<f64>) -> &mut Self {
        self.push(Op::LineDash(dash));
        self
    }

    /// Strokes the current path.
    pub fn end_stroke(&mut self) -> &mut Self {
        self.push(Op::EndStroke);
        self
    }

    // -- Queries --

    /// Local-space bounds of all geometry, or `None` if there is none.
    ///
    /// Cached until the list changes.
    pub fn bounds(&mut self) -> Option<Rect> {
        if let Some(b) = self.bounds {
            return b;
        }
        let b = self.compute_bounds();
        self.bounds = Some(b);
        b
    }

    /// Computes bounds without touching the cache.
    #[must_use]
    pub fn compute_bounds(&self) -> Option<Rect> {
        let mut cursor = Cursor::default();
        let mut bounds = None;
        for op in &self.ops {
            op.add_bounds(&mut cursor, &mut bounds);
        }
        bounds
    }

    /// Plays the list back against `painter`.
    ///
    /// Paths persist across fills and strokes until [`Op::BeginPath`], like a
    /// 2-D canvas context. A fill or stroke with no paint set is skipped.
    pub fn replay(&self, painter: &mut impl Painter) {
        let mut builder = PathBuilder::default();
        let mut fill: Option<FillStyle> = None;
        let mut stroke: Option<StrokeStyle> = None;
        for op in &self.ops {
            match op {
                Op::BeginFill(style) => fill = Some(*style),
                Op::EndFill => {
                    if let Some(style) = &fill
                        && !builder.path.elements().is_empty()
                    {
                        painter.fill(&builder.path, style);
                    }
                }
                Op::LineStyle(style) => stroke = Some(style.clone()),
                Op::LineDash(dash) => {
                    if let Some(style) = &mut stroke {
                        style.dash.clone_from(dash);
                    } else {
                        stroke = Some(StrokeStyle {
                            dash: dash.clone(),
                            ..StrokeStyle::default()
                        });
                    }
                }
                Op::EndStroke => {
                    if let Some(style) = &stroke
                        && !builder.path.elements().is_empty()
                    {
                        painter.stroke(&builder.path, style);
                    }
                }
                geometric => builder.apply(geometric),
            }
        }
    }

    /// All geometry in the list as one path, ignoring paint operations.
    ///
    /// [`Op::BeginPath`] is ignored too, so every subpath ever recorded is
    /// included. This is the shape a mask clips to.
    #[must_use]
    pub fn outline(&self) -> BezPath {
        let mut builder = PathBuilder::default();
        for op in &self.ops {
            if !matches!(op, Op::BeginPath) {
                builder.apply(op);
            }
        }
        builder.path
    }
}

/// Resolves geometric operations into a [`BezPath`].
#[derive(Default)]
struct PathBuilder {
    path: BezPath,
    cursor: Cursor,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
        self.cursor.move_to(p);
    }

    /// Connects the cursor to `p`, or starts a subpath there.
    fn connect(&mut self, p: Point) {
        if self.cursor.current.is_some() {
            self.path.line_to(p);
            self.cursor.current = Some(p);
        } else {
            self.move_to(p);
        }
    }

    fn ensure_subpath(&mut self, p: Point) {
        if self.cursor.current.is_none() {
            self.move_to(p);
        }
    }

    fn push_shape(&mut self, els: impl Iterator<Item = PathEl>) {
        let mut start = None;
        for el in els {
            if let PathEl::MoveTo(p) = el {
                start.get_or_insert(p);
            }
            self.path.push(el);
        }
        if let Some(p) = start {
            self.cursor.move_to(p);
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::BeginPath => {
                self.path = BezPath::new();
                self.cursor = Cursor::default();
            }
            Op::ClosePath => {
                if self.cursor.current.is_some() {
                    self.path.close_path();
                    self.cursor.close();
                }
            }
            Op::MoveTo(p) => self.move_to(*p),
            Op::LineTo(p) => self.connect(*p),
            Op::BezierTo { c1, c2, to } => {
                self.ensure_subpath(*c1);
                self.path.curve_to(*c1, *c2, *to);
                self.cursor.current = Some(*to);
            }
            Op::QuadTo { c, to } => {
                self.ensure_subpath(*c);
                self.path.quad_to(*c, *to);
                self.cursor.current = Some(*to);
            }
            Op::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            } => {
                let Some(a) =
                    arc::canvas_arc(*center, *radius, *start_angle, *end_angle, *anticlockwise)
                else {
                    return;
                };
                self.connect(arc::start_point(&a));
                let end = arc::end_point(&a);
                arc::append_arc(&a, end, &mut |el| self.path.push(el));
                self.cursor.current = Some(end);
            }
            Op::ArcTo { p1, p2, radius } => {
                let Some(from) = self.cursor.current else {
                    self.move_to(*p1);
                    return;
                };
                match arc::arc_to(from, *p1, *p2, *radius) {
                    ArcToGeometry::Line(p) => self.connect(p),
                    ArcToGeometry::Arc { start, end, arc: corner } => {
                        self.connect(start);
                        arc::append_arc(&corner, end, &mut |el| self.path.push(el));
                        self.cursor.current = Some(end);
                    }
                }
            }
            Op::EllipticalArc {
                radii,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => {
                let Some(from) = self.cursor.current else {
                    self.move_to(*to);
                    return;
                };
                let svg = SvgArc {
                    from,
                    to: *to,
                    radii: *radii,
                    x_rotation: *x_rotation,
                    large_arc: *large_arc,
                    sweep: *sweep,
                };
                match arc::svg_arc(&svg) {
                    Some(a) => arc::append_arc(&a, *to, &mut |el| self.path.push(el)),
                    None => self.path.line_to(*to),
                }
                self.cursor.current = Some(*to);
            }
            Op::Rect(r) => {
                self.path.move_to((r.x0, r.y0));
                self.path.line_to((r.x1, r.y0));
                self.path.line_to((r.x1, r.y1));
                self.path.line_to((r.x0, r.y1));
                self.path.close_path();
                self.cursor.move_to(Point::new(r.x0, r.y0));
            }
            Op::Circle { center, radius } => {
                if *radius > 0.0 {
                    self.push_shape(Circle::new(*center, *radius).path_elements(ARC_TOLERANCE));
                }
            }
            Op::Ellipse { center, radii } => {
                if radii.x > 0.0 && radii.y > 0.0 {
                    self.push_shape(
                        Ellipse::new(*center, *radii, 0.0).path_elements(ARC_TOLERANCE),
                    );
                }
            }
            Op::BeginFill(_)
            | Op::EndFill
            | Op::LineStyle(_)
            | Op::LineDash(_)
            | Op::EndStroke => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        fills: Vec<(BezPath, FillStyle)>,
        strokes: Vec<(BezPath, StrokeStyle)>,
    }

    impl Painter for Recorder {
        fn fill(&mut self, path: &BezPath, style: &FillStyle) {
            self.fills.push((path.clone(), *style));
        }

        fn stroke(&mut self, path: &BezPath, style: &StrokeStyle) {
            self.strokes.push((path.clone(), style.clone()));
        }
    }

    fn square() -> Graphics {
        let mut g = Graphics::new();
        g.begin_fill(Color::rgb(255, 0, 0))
            .rect(Rect::new(0.0, 0.0, 10.0, 10.0))
            .end_fill();
        g
    }

    #[test]
    fn replay_fills_recorded_rect() {
        let mut rec = Recorder::default();
        square().replay(&mut rec);
        assert_eq!(rec.fills.len(), 1);
        assert_eq!(rec.fills[0].1.color, Color::rgb(255, 0, 0));
        assert_eq!(rec.fills[0].0.bounding_box(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn replay_is_identical_for_two_painters() {
        let mut g = Graphics::new();
        g.begin_fill(Color::BLACK)
            .move_to((0.0, 0.0))
            .arc_to((10.0, 0.0), (10.0, 10.0), 3.0)
            .line_to((10.0, 10.0))
            .elliptical_arc_to(Vec2::new(4.0, 2.0), 0.2, false, true, (0.0, 10.0))
            .close_path()
            .end_fill()
            .line_style(StrokeStyle::solid(Color::WHITE, 2.0))
            .end_stroke();
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        g.replay(&mut a);
        g.replay(&mut b);
        assert_eq!(a.fills[0].0, b.fills[0].0);
        assert_eq!(a.strokes[0].0, b.strokes[0].0);
        // Fill and stroke see the same path.
        assert_eq!(a.fills[0].0, a.strokes[0].0);
    }

    #[test]
    fn fill_without_paint_is_skipped() {
        let mut g = Graphics::new();
        g.rect(Rect::new(0.0, 0.0, 1.0, 1.0)).end_fill().end_stroke();
        let mut rec = Recorder::default();
        g.replay(&mut rec);
        assert!(rec.fills.is_empty());
        assert!(rec.strokes.is_empty());
    }

    #[test]
    fn begin_path_discards_previous_geometry() {
        let mut g = Graphics::new();
        g.begin_fill(Color::BLACK)
            .rect(Rect::new(0.0, 0.0, 100.0, 100.0))
            .begin_path()
            .rect(Rect::new(0.0, 0.0, 1.0, 1.0))
            .end_fill();
        let mut rec = Recorder::default();
        g.replay(&mut rec);
        assert_eq!(rec.fills[0].0.bounding_box(), Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn clear_invalidates_bounds() {
        let mut g = square();
        assert_eq!(g.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        g.clear();
        assert_eq!(g.bounds(), None);
        g.circle((0.0, 0.0), 2.0);
        assert_eq!(g.bounds(), Some(Rect::new(-2.0, -2.0, 2.0, 2.0)));
    }

    #[test]
    fn failed_set_path_keeps_old_list() {
        let mut g = square();
        let before = g.ops().to_vec();
        assert!(g.set_path("M 0 0 L 1").is_err());
        assert_eq!(g.ops(), &before[..]);
    }

    #[test]
    fn set_path_replaces_geometry() {
        let mut g = Graphics::new();
        g.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        g.set_path("M0 0 L5 5").unwrap();
        assert_eq!(
            g.ops(),
            &[
                Op::BeginPath,
                Op::MoveTo(Point::new(0.0, 0.0)),
                Op::LineTo(Point::new(5.0, 5.0))
            ]
        );
    }

    #[test]
    fn set_path_keeps_paint() {
        let red = FillStyle::solid(Color::rgb(255, 0, 0));
        let mut g = square();
        g.line_style(StrokeStyle::solid(Color::BLACK, 2.0))
            .set_line_dash(vec![4.0, 2.0])
            .end_stroke();
        g.set_path("M0 0 H5 V5 Z").unwrap();

        let mut rec = Recorder::default();
        g.replay(&mut rec);
        assert_eq!(rec.fills.len(), 1);
        assert_eq!(rec.fills[0].1, red);
        assert_eq!(rec.fills[0].0.bounding_box(), Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(rec.strokes.len(), 1);
        assert_eq!(rec.strokes[0].1.width, 2.0);
        assert_eq!(rec.strokes[0].1.dash, vec![4.0, 2.0]);
    }

    #[test]
    fn rounded_rect_stays_inside_rect() {
        let mut g = Graphics::new();
        g.rounded_rect(Rect::new(0.0, 0.0, 20.0, 10.0), 4.0);
        let b = g.outline().bounding_box();
        assert!(b.x0 >= -1e-9 && b.y0 >= -1e-9, "{b:?}");
        assert!(b.x1 <= 20.0 + 1e-9 && b.y1 <= 10.0 + 1e-9, "{b:?}");
    }

    #[test]
    fn line_dash_updates_stroke_paint() {
        let mut g = Graphics::new();
        g.line_style(StrokeStyle::solid(Color::BLACK, 1.0))
            .set_line_dash(vec![2.0, 1.0])
            .move_to((0.0, 0.0))
            .line_to((4.0, 0.0))
            .end_stroke();
        let mut rec = Recorder::default();
        g.replay(&mut rec);
        assert_eq!(rec.strokes[0].1.dash, vec![2.0, 1.0]);
    }

    #[test]
    fn outline_includes_all_subpaths() {
        let mut g = Graphics::new();
        g.circle((0.0, 0.0), 1.0)
            .begin_path()
            .circle((10.0, 0.0), 1.0);
        let b = g.outline().bounding_box();
        assert!((b.x0 + 1.0).abs() < 1e-6 && (b.x1 - 11.0).abs() < 1e-6, "{b:?}");
    }
}
