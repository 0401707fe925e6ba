// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing operation records and their paint styles.

use alloc::vec::Vec;

use kurbo::{CubicBez, ParamCurveExtrema, Point, QuadBez, Rect, SvgArc, Vec2};

use super::arc::{self, ArcToGeometry};
use crate::color::Color;

/// Winding rule used when filling a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd.
    EvenOdd,
}

/// Line cap style for strokes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat cap at the end point.
    #[default]
    Butt,
    /// Semicircular cap.
    Round,
    /// Square cap extending half the line width.
    Square,
}

/// Line join style for strokes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

/// Fill paint for [`Op::BeginFill`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillStyle {
    /// Fill color.
    pub color: Color,
    /// Winding rule.
    pub rule: FillRule,
}

impl FillStyle {
    /// A non-zero fill with `color`.
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            rule: FillRule::NonZero,
        }
    }
}

/// Stroke paint for [`Op::LineStyle`].
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Line width in local units.
    pub width: f64,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit.
    pub miter_limit: f64,
    /// Dash pattern; empty means solid.
    pub dash: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
}

impl StrokeStyle {
    /// A solid stroke of `width` in `color`.
    #[must_use]
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            cap: LineCap::default(),
            join: LineJoin::default(),
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

/// A single recorded drawing operation.
///
/// Geometry is in the owning node's local coordinate space. Angles are in
/// radians.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Discards the current path.
    BeginPath,
    /// Closes the current subpath.
    ClosePath,
    /// Starts a new subpath.
    MoveTo(Point),
    /// Straight segment to a point.
    LineTo(Point),
    /// Cubic Bézier segment.
    BezierTo {
        /// First control point.
        c1: Point,
        /// Second control point.
        c2: Point,
        /// End point.
        to: Point,
    },
    /// Quadratic Bézier segment.
    QuadTo {
        /// Control point.
        c: Point,
        /// End point.
        to: Point,
    },
    /// Canvas-style circular arc around `center`.
    Arc {
        /// Arc center.
        center: Point,
        /// Arc radius.
        radius: f64,
        /// Start angle.
        start_angle: f64,
        /// End angle.
        end_angle: f64,
        /// Sweep direction.
        anticlockwise: bool,
    },
    /// Canvas-style `arcTo` rounding the corner at `p1`.
    ArcTo {
        /// Corner point.
        p1: Point,
        /// Point defining the second tangent.
        p2: Point,
        /// Corner radius.
        radius: f64,
    },
    /// SVG-style elliptical arc from the current point to `to`.
    EllipticalArc {
        /// Ellipse radii.
        radii: Vec2,
        /// Rotation of the ellipse's x axis.
        x_rotation: f64,
        /// Take the larger of the two candidate arcs.
        large_arc: bool,
        /// Sweep in the positive-angle direction.
        sweep: bool,
        /// End point.
        to: Point,
    },
    /// Closed axis-aligned rectangle subpath.
    Rect(Rect),
    /// Closed circle subpath.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// Closed axis-aligned ellipse subpath.
    Ellipse {
        /// Center.
        center: Point,
        /// Radii.
        radii: Vec2,
    },
    /// Sets the fill paint used by [`Op::EndFill`].
    BeginFill(FillStyle),
    /// Fills the current path.
    EndFill,
    /// Sets the stroke paint used by [`Op::EndStroke`].
    LineStyle(StrokeStyle),
    /// Replaces the dash pattern of the current stroke paint.
    LineDash(Vec<f64>),
    /// Strokes the current path.
    EndStroke,
}

/// Current-point bookkeeping shared by replay and bounds folding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursor {
    /// The current point, if a subpath is open.
    pub current: Option<Point>,
    /// Start of the current subpath.
    pub subpath_start: Point,
}

impl Cursor {
    pub(crate) fn move_to(&mut self, p: Point) {
        self.current = Some(p);
        self.subpath_start = p;
    }

    pub(crate) fn close(&mut self) {
        if self.current.is_some() {
            self.current = Some(self.subpath_start);
        }
    }
}

fn include(bounds: &mut Option<Rect>, p: Point) {
    *bounds = Some(match bounds {
        Some(b) => b.union_pt(p),
        None => Rect::from_points(p, p),
    });
}

fn include_rect(bounds: &mut Option<Rect>, r: Rect) {
    *bounds = Some(match bounds {
        Some(b) => b.union(r),
        None => r,
    });
}

impl Op {
    /// Expands `bounds` by the geometry this operation contributes and
    /// advances `cursor` past it.
    ///
    /// Paint operations contribute nothing. Curves use their exact extrema
    /// and arcs their analytic bounds.
    pub fn add_bounds(&self, cursor: &mut Cursor, bounds: &mut Option<Rect>) {
        match self {
            Self::BeginPath => *cursor = Cursor::default(),
            Self::ClosePath => cursor.close(),
            Self::MoveTo(p) => {
                include(bounds, *p);
                cursor.move_to(*p);
            }
            Self::LineTo(p) => {
                if let Some(from) = cursor.current {
                    include(bounds, from);
                } else {
                    cursor.subpath_start = *p;
                }
                include(bounds, *p);
                cursor.current = Some(*p);
            }
            Self::BezierTo { c1, c2, to } => {
                let from = cursor.current.unwrap_or(*c1);
                if cursor.current.is_none() {
                    cursor.subpath_start = from;
                }
                include_rect(bounds, CubicBez::new(from, *c1, *c2, *to).bounding_box());
                cursor.current = Some(*to);
            }
            Self::QuadTo { c, to } => {
                let from = cursor.current.unwrap_or(*c);
                if cursor.current.is_none() {
                    cursor.subpath_start = from;
                }
                include_rect(bounds, QuadBez::new(from, *c, *to).bounding_box());
                cursor.current = Some(*to);
            }
            Self::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            } => {
                let Some(a) = arc::canvas_arc(*center, *radius, *start_angle, *end_angle, *anticlockwise)
                else {
                    return;
                };
                let start = arc::start_point(&a);
                match cursor.current {
                    Some(from) => include(bounds, from),
                    None => cursor.subpath_start = start,
                }
                include_rect(bounds, arc::arc_bounds(&a));
                cursor.current = Some(arc::end_point(&a));
            }
            Self::ArcTo { p1, p2, radius } => {
                let Some(from) = cursor.current else {
                    // No current point: behaves like a move to `p1`.
                    include(bounds, *p1);
                    cursor.move_to(*p1);
                    return;
                };
                include(bounds, from);
                match arc::arc_to(from, *p1, *p2, *radius) {
                    ArcToGeometry::Line(p) => {
                        include(bounds, p);
                        cursor.current = Some(p);
                    }
                    ArcToGeometry::Arc { start, end, arc: corner } => {
                        include(bounds, start);
                        include_rect(bounds, arc::arc_bounds(&corner));
                        cursor.current = Some(end);
                    }
                }
            }
            Self::EllipticalArc {
                radii,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => {
                let Some(from) = cursor.current else {
                    include(bounds, *to);
                    cursor.move_to(*to);
                    return;
                };
                include(bounds, from);
                include(bounds, *to);
                let svg = SvgArc {
                    from,
                    to: *to,
                    radii: *radii,
                    x_rotation: *x_rotation,
                    large_arc: *large_arc,
                    sweep: *sweep,
                };
                if let Some(a) = arc::svg_arc(&svg) {
                    include_rect(bounds, arc::arc_bounds(&a));
                }
                cursor.current = Some(*to);
            }
            Self::Rect(r) => {
                include_rect(bounds, r.abs());
                cursor.move_to(Point::new(r.x0, r.y0));
            }
            Self::Circle { center, radius } => {
                if *radius > 0.0 {
                    include_rect(
                        bounds,
                        Rect::from_center_size(*center, (2.0 * radius, 2.0 * radius)),
                    );
                }
                cursor.move_to(Point::new(center.x + radius.max(0.0), center.y));
            }
            Self::Ellipse { center, radii } => {
                if radii.x > 0.0 && radii.y > 0.0 {
                    include_rect(
                        bounds,
                        Rect::from_center_size(*center, (2.0 * radii.x, 2.0 * radii.y)),
                    );
                }
                cursor.move_to(Point::new(center.x + radii.x.max(0.0), center.y));
            }
            Self::BeginFill(_)
            | Self::EndFill
            | Self::LineStyle(_)
            | Self::LineDash(_)
            | Self::EndStroke => {}
        }
    }

    /// Returns the end point of a geometric operation, if it has a fixed one.
    #[must_use]
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(*p),
            Self::BezierTo { to, .. } | Self::QuadTo { to, .. } => Some(*to),
            Self::EllipticalArc { to, .. } => Some(*to),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(ops: &[Op]) -> Option<Rect> {
        let mut cursor = Cursor::default();
        let mut bounds = None;
        for op in ops {
            op.add_bounds(&mut cursor, &mut bounds);
        }
        bounds
    }

    #[test]
    fn paint_ops_have_no_bounds() {
        assert_eq!(
            fold(&[
                Op::BeginFill(FillStyle::solid(Color::BLACK)),
                Op::EndFill,
                Op::EndStroke
            ]),
            None
        );
    }

    #[test]
    fn rect_bounds() {
        let b = fold(&[Op::Rect(Rect::new(0.0, 0.0, 10.0, 10.0))]).unwrap();
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn negative_size_rect_is_normalized() {
        let b = fold(&[Op::Rect(Rect::new(10.0, 10.0, 0.0, 0.0))]).unwrap();
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn cubic_bounds_use_extrema_not_control_points() {
        let b = fold(&[
            Op::MoveTo(Point::new(0.0, 0.0)),
            Op::BezierTo {
                c1: Point::new(0.0, 100.0),
                c2: Point::new(10.0, 100.0),
                to: Point::new(10.0, 0.0),
            },
        ])
        .unwrap();
        // The curve peaks at 75, well short of the control points at 100.
        assert!((b.y1 - 75.0).abs() < 1e-9, "{b:?}");
    }

    #[test]
    fn circle_bounds() {
        let b = fold(&[Op::Circle {
            center: Point::new(5.0, 5.0),
            radius: 5.0,
        }])
        .unwrap();
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn zero_radius_arc_adds_nothing() {
        let b = fold(&[Op::Arc {
            center: Point::new(5.0, 5.0),
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 1.0,
            anticlockwise: false,
        }]);
        assert_eq!(b, None);
    }

    #[test]
    fn line_without_current_point_starts_subpath() {
        let b = fold(&[
            Op::LineTo(Point::new(2.0, 3.0)),
            Op::LineTo(Point::new(4.0, 8.0)),
        ])
        .unwrap();
        assert_eq!(b, Rect::new(2.0, 3.0, 4.0, 8.0));
    }
}
