// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal 2×3 affine transform.
//!
//! Covers what the scene graph needs (identity, compose, apply, invert and
//! building a node's local matrix from its transform properties) without
//! pulling in a linear-algebra crate. Conversion to [`kurbo::Affine`] is
//! provided for geometry code that works in kurbo types.

use core::fmt;
use core::ops::Mul;

use kurbo::{Affine, Point, Rect};

/// Error returned when a transform cannot be inverted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// The matrix has a zero (or non-finite) determinant.
    Degenerate,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate => f.write_str("transform is degenerate and cannot be inverted"),
        }
    }
}

impl core::error::Error for TransformError {}

/// A 2-D affine transform `(a, b, c, d, tx, ty)`.
///
/// A point `(x, y)` maps to `(a·x + c·y + tx, b·x + d·y + ty)`, the same
/// convention as a 2-D canvas `setTransform`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Horizontal scale / rotation component.
    pub a: f64,
    /// Vertical skew / rotation component.
    pub b: f64,
    /// Horizontal skew / rotation component.
    pub c: f64,
    /// Vertical scale / rotation component.
    pub d: f64,
    /// Horizontal translation.
    pub tx: f64,
    /// Vertical translation.
    pub ty: f64,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Creates a transform from its six coefficients.
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Creates a rotation (radians, clockwise in a y-down space).
    #[inline]
    #[must_use]
    pub fn from_rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Builds a node's local matrix.
    ///
    /// The result is `T(x, y) · R(rotation) · S(scale) · T(-pivot)`: the pivot
    /// point is the origin for rotation and scaling, and ends up at `(x, y)`.
    /// `rotation_degrees` is in degrees.
    #[must_use]
    pub fn from_local(
        x: f64,
        y: f64,
        pivot_x: f64,
        pivot_y: f64,
        rotation_degrees: f64,
        scale: f64,
    ) -> Self {
        let (s, c) = rotation_degrees.to_radians().sin_cos();
        let a = c * scale;
        let b = s * scale;
        let cc = -s * scale;
        let d = c * scale;
        Self {
            a,
            b,
            c: cc,
            d,
            tx: x - (pivot_x * a + pivot_y * cc),
            ty: y - (pivot_x * b + pivot_y * d),
        }
    }

    /// Returns the determinant of the linear part.
    #[inline]
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Is every coefficient [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    /// Returns `true` if the matrix can be inverted.
    #[inline]
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det != 0.0 && det.is_finite() && self.is_finite()
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Result<Self, TransformError> {
        if !self.is_invertible() {
            return Err(TransformError::Degenerate);
        }
        let det = self.determinant();
        Ok(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }

    /// Maps a point through the transform.
    #[inline]
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Maps a point through the inverse transform.
    ///
    /// Solves the system directly rather than building the inverse matrix.
    pub fn apply_inverse(&self, p: Point) -> Result<Point, TransformError> {
        if !self.is_invertible() {
            return Err(TransformError::Degenerate);
        }
        let id = 1.0 / self.determinant();
        let x = p.x - self.tx;
        let y = p.y - self.ty;
        Ok(Point::new(
            id * (self.d * x - self.c * y),
            id * (self.a * y - self.b * x),
        ))
    }

    /// Returns the axis-aligned bounding box of `rect` after transformation.
    #[must_use]
    pub fn transform_rect_bbox(&self, rect: Rect) -> Rect {
        let corners = [
            self.apply(Point::new(rect.x0, rect.y0)),
            self.apply(Point::new(rect.x1, rect.y0)),
            self.apply(Point::new(rect.x1, rect.y1)),
            self.apply(Point::new(rect.x0, rect.y1)),
        ];
        let mut out = Rect::from_points(corners[0], corners[0]);
        for c in &corners[1..] {
            out = out.union_pt(*c);
        }
        out
    }

    /// Converts to a [`kurbo::Affine`].
    #[inline]
    #[must_use]
    pub fn to_affine(self) -> Affine {
        Affine::new([self.a, self.b, self.c, self.d, self.tx, self.ty])
    }

    /// Converts from a [`kurbo::Affine`].
    #[inline]
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, tx, ty] = affine.as_coeffs();
        Self { a, b, c, d, tx, ty }
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    /// `self * rhs` applies `rhs` first, then `self`.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }
}
