// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc geometry shared by path replay and bounds computation.
//!
//! Every arc form the command list supports (canvas `arc`, canvas `arcTo` and
//! the SVG elliptical arc) is reduced to a center-parameterized
//! [`kurbo::Arc`]. Bounds are computed analytically from that form; replay
//! flattens it to cubic Béziers with [`ARC_TOLERANCE`] and then snaps the last
//! emitted point onto the exact arc end point, so consecutive segments stay
//! continuous regardless of the approximation error.

use core::f64::consts::{PI, TAU};

use kurbo::{Arc, PathEl, Point, Rect, SvgArc, Vec2};

/// Maximum deviation, in local units, between an arc and its cubic
/// approximation.
///
/// The end point of the approximation is exact: it is replaced by the arc's
/// analytic end point after flattening.
pub const ARC_TOLERANCE: f64 = 0.1;

/// The result of resolving a canvas `arcTo` against the current point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArcToGeometry {
    /// The corner degenerates to a straight line to the control point.
    Line(Point),
    /// A tangent line to `start`, followed by `arc` ending at `end`.
    Arc {
        /// First tangent point.
        start: Point,
        /// Second tangent point.
        end: Point,
        /// The corner arc.
        arc: Arc,
    },
}

/// Returns the point at `angle` on the (possibly rotated) ellipse of `arc`.
#[must_use]
pub fn point_at(arc: &Arc, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    let (rs, rc) = arc.x_rotation.sin_cos();
    let x = arc.radii.x * c;
    let y = arc.radii.y * s;
    arc.center + Vec2::new(x * rc - y * rs, x * rs + y * rc)
}

/// Start point of `arc`.
#[inline]
#[must_use]
pub fn start_point(arc: &Arc) -> Point {
    point_at(arc, arc.start_angle)
}

/// End point of `arc`.
#[inline]
#[must_use]
pub fn end_point(arc: &Arc) -> Point {
    point_at(arc, arc.start_angle + arc.sweep_angle)
}

/// Converts canvas `arc(x, y, r, start, end, anticlockwise)` arguments to a
/// center-parameterized arc.
///
/// Returns `None` for zero, negative or non-finite radii, which contribute
/// nothing to the path.
#[must_use]
pub fn canvas_arc(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
) -> Option<Arc> {
    if !(radius > 0.0) || !radius.is_finite() || !start_angle.is_finite() {
        return None;
    }
    let sweep = canvas_sweep(start_angle, end_angle, anticlockwise);
    Some(Arc::new(
        center,
        Vec2::new(radius, radius),
        start_angle,
        sweep,
        0.0,
    ))
}

/// Canvas sweep normalization: a full turn is clamped to `±TAU`, anything
/// less is wrapped into the requested direction.
fn canvas_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        if start - end >= TAU {
            -TAU
        } else {
            -(start - end).rem_euclid(TAU)
        }
    } else if end - start >= TAU {
        TAU
    } else {
        (end - start).rem_euclid(TAU)
    }
}

/// Resolves canvas `arcTo(p1, p2, radius)` starting at `p0`.
#[must_use]
pub fn arc_to(p0: Point, p1: Point, p2: Point, radius: f64) -> ArcToGeometry {
    let v1 = p0 - p1;
    let v2 = p2 - p1;
    let l1 = v1.hypot();
    let l2 = v2.hypot();
    if !(radius > 0.0) || l1 == 0.0 || l2 == 0.0 {
        return ArcToGeometry::Line(p1);
    }
    let u1 = v1 / l1;
    let u2 = v2 / l2;
    let cross = u1.cross(u2);
    if cross.abs() < 1e-12 {
        // Collinear control points.
        return ArcToGeometry::Line(p1);
    }
    let cos_theta = u1.dot(u2).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();
    let tangent_dist = radius / (theta / 2.0).tan();
    let start = p1 + u1 * tangent_dist;
    let end = p1 + u2 * tangent_dist;
    let svg = SvgArc {
        from: start,
        to: end,
        radii: Vec2::new(radius, radius),
        x_rotation: 0.0,
        large_arc: false,
        sweep: cross < 0.0,
    };
    match Arc::from_svg_arc(&svg) {
        Some(arc) => ArcToGeometry::Arc { start, end, arc },
        None => ArcToGeometry::Line(p1),
    }
}

/// Converts an SVG endpoint arc to center form.
///
/// Returns `None` when the arc degenerates to a straight line (zero radius
/// or coincident end points).
#[must_use]
pub fn svg_arc(svg: &SvgArc) -> Option<Arc> {
    if svg.is_straight_line() {
        return None;
    }
    Arc::from_svg_arc(svg)
}

/// Appends the cubic approximation of `arc` to `out`, snapping the final
/// point exactly onto `end`.
pub fn append_arc(arc: &Arc, end: Point, out: &mut impl FnMut(PathEl)) {
    let mut last: Option<PathEl> = None;
    for el in arc.append_iter(ARC_TOLERANCE) {
        if let Some(prev) = last.replace(el) {
            out(prev);
        }
    }
    if let Some(el) = last {
        out(snap_end(el, end));
    }
}

fn snap_end(el: PathEl, end: Point) -> PathEl {
    match el {
        PathEl::LineTo(_) => PathEl::LineTo(end),
        PathEl::QuadTo(c, _) => PathEl::QuadTo(c, end),
        PathEl::CurveTo(c1, c2, _) => PathEl::CurveTo(c1, c2, end),
        other => other,
    }
}

/// Exact axis-aligned bounds of an elliptical arc.
///
/// Considers both end points plus every angle where the rotated ellipse has a
/// horizontal or vertical tangent that falls inside the sweep.
#[must_use]
pub fn arc_bounds(arc: &Arc) -> Rect {
    let start = start_point(arc);
    let mut bounds = Rect::from_points(start, start).union_pt(end_point(arc));
    let (rs, rc) = arc.x_rotation.sin_cos();
    let tx = (-arc.radii.y * rs).atan2(arc.radii.x * rc);
    let ty = (arc.radii.y * rc).atan2(arc.radii.x * rs);
    for angle in [tx, tx + PI, ty, ty + PI] {
        if angle_in_sweep(angle, arc.start_angle, arc.sweep_angle) {
            bounds = bounds.union_pt(point_at(arc, angle));
        }
    }
    bounds
}

fn angle_in_sweep(angle: f64, start: f64, sweep: f64) -> bool {
    if sweep.abs() >= TAU {
        return true;
    }
    if sweep >= 0.0 {
        (angle - start).rem_euclid(TAU) <= sweep
    } else {
        (start - angle).rem_euclid(TAU) <= -sweep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn collect(arc: &Arc, end: Point) -> Vec<PathEl> {
        let mut els = Vec::new();
        append_arc(arc, end, &mut |el| els.push(el));
        els
    }

    #[test]
    fn full_circle_bounds() {
        let arc = canvas_arc(Point::new(10.0, 10.0), 5.0, 0.0, TAU, false).unwrap();
        let b = arc_bounds(&arc);
        assert!((b.x0 - 5.0).abs() < EPS);
        assert!((b.y0 - 5.0).abs() < EPS);
        assert!((b.x1 - 15.0).abs() < EPS);
        assert!((b.y1 - 15.0).abs() < EPS);
    }

    #[test]
    fn quarter_arc_bounds_are_not_control_point_bounds() {
        // 0 → 90° in a y-down space: from (r, 0) to (0, r).
        let arc = canvas_arc(Point::ZERO, 10.0, 0.0, PI / 2.0, false).unwrap();
        let b = arc_bounds(&arc);
        assert!(b.x0.abs() < EPS);
        assert!(b.y0.abs() < EPS);
        assert!((b.x1 - 10.0).abs() < EPS);
        assert!((b.y1 - 10.0).abs() < EPS);
    }

    #[test]
    fn anticlockwise_half_arc_covers_top() {
        let arc = canvas_arc(Point::ZERO, 10.0, 0.0, PI, true).unwrap();
        assert!(arc.sweep_angle < 0.0);
        let b = arc_bounds(&arc);
        assert!((b.y0 + 10.0).abs() < EPS, "{b:?}");
        assert!(b.y1.abs() < EPS, "{b:?}");
    }

    #[test]
    fn zero_radius_is_no_op() {
        assert!(canvas_arc(Point::ZERO, 0.0, 0.0, 1.0, false).is_none());
        assert!(canvas_arc(Point::ZERO, f64::NAN, 0.0, 1.0, false).is_none());
    }

    #[test]
    fn flattened_arc_ends_exactly_on_end_point() {
        let svg = SvgArc {
            from: Point::new(0.0, 0.0),
            to: Point::new(17.0, 30.0),
            radii: Vec2::new(20.0, 12.0),
            x_rotation: 0.3,
            large_arc: true,
            sweep: false,
        };
        let arc = svg_arc(&svg).unwrap();
        let els = collect(&arc, svg.to);
        let last = els.last().unwrap().end_point().unwrap();
        assert_eq!(last, svg.to);
        // The analytic end point agrees with the requested one.
        assert!((end_point(&arc) - svg.to).hypot() < 1e-6);
    }

    #[test]
    fn arc_to_corner_produces_tangent_points() {
        let geom = arc_to(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            2.0,
        );
        match geom {
            ArcToGeometry::Arc { start, end, arc } => {
                assert!((start - Point::new(8.0, 0.0)).hypot() < 1e-6);
                assert!((end - Point::new(10.0, 2.0)).hypot() < 1e-6);
                assert!((arc.center - Point::new(8.0, 2.0)).hypot() < 1e-6);
            }
            ArcToGeometry::Line(_) => panic!("expected an arc"),
        }
    }

    #[test]
    fn arc_to_collinear_is_line() {
        let geom = arc_to(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            2.0,
        );
        assert_eq!(geom, ArcToGeometry::Line(Point::new(5.0, 0.0)));
    }

    #[test]
    fn straight_svg_arc_has_no_center_form() {
        let svg = SvgArc {
            from: Point::new(0.0, 0.0),
            to: Point::new(5.0, 5.0),
            radii: Vec2::ZERO,
            x_rotation: 0.0,
            large_arc: false,
            sweep: false,
        };
        assert!(svg_arc(&svg).is_none());
    }
}
