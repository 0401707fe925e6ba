// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Real font metrics and glyph outlines through `ttf-parser`.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{BezPath, Point};
use ttf_parser::{Face, FaceParsingError, OutlineBuilder};

use super::layout::GlyphMetrics;

/// A font file could not be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontError(FaceParsingError);

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse font: {}", self.0)
    }
}

impl core::error::Error for FontError {}

/// An OpenType or TrueType face held in memory.
///
/// The face table directory is re-read on each access; parsing it is cheap
/// and keeps this type free of self-borrows.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: f64,
    ascender: f64,
    descender: f64,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl FontFace {
    /// Parses face `index` of a font file.
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        let face = Face::parse(&data, index).map_err(FontError)?;
        let units_per_em = f64::from(face.units_per_em());
        let ascender = f64::from(face.ascender());
        let descender = f64::from(face.descender());
        Ok(Self {
            data: Arc::new(data),
            index,
            units_per_em,
            ascender,
            descender,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }

    /// Outline of `ch` at `size`, with its baseline origin at `origin`.
    ///
    /// Returns `None` for characters without a glyph or with an empty
    /// outline (such as a space).
    #[must_use]
    pub fn glyph_path(&self, ch: char, size: f64, origin: Point) -> Option<BezPath> {
        let face = self.face()?;
        let glyph = face.glyph_index(ch)?;
        let mut builder = GlyphPathBuilder {
            path: BezPath::new(),
            scale: size / self.units_per_em,
            origin,
        };
        face.outline_glyph(glyph, &mut builder)?;
        Some(builder.path)
    }
}

impl GlyphMetrics for FontFace {
    fn advance(&self, ch: char, size: f64, _bold: bool) -> f64 {
        let advance = self
            .face()
            .and_then(|face| face.glyph_index(ch).and_then(|g| face.glyph_hor_advance(g)));
        match advance {
            Some(units) => f64::from(units) * size / self.units_per_em,
            None => size * 0.5,
        }
    }

    fn ascent(&self, size: f64) -> f64 {
        self.ascender * size / self.units_per_em
    }

    fn descent(&self, size: f64) -> f64 {
        -self.descender * size / self.units_per_em
    }
}

/// Converts font units (y up) to local units (y down) around a baseline
/// origin.
struct GlyphPathBuilder {
    path: BezPath,
    scale: f64,
    origin: Point,
}

impl GlyphPathBuilder {
    fn map(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.origin.x + f64::from(x) * self.scale,
            self.origin.y - f64::from(y) * self.scale,
        )
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let c = self.map(x1, y1);
        let p = self.map(x, y);
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let p = self.map(x, y);
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_rejected() {
        let err = FontFace::from_bytes(alloc::vec![0; 16], 0).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse font"));
    }

    #[test]
    fn builder_flips_y_and_scales() {
        let mut b = GlyphPathBuilder {
            path: BezPath::new(),
            scale: 0.5,
            origin: Point::new(10.0, 20.0),
        };
        b.move_to(0.0, 0.0);
        b.line_to(4.0, 8.0);
        b.close();
        let els = b.path.elements();
        assert_eq!(els[0], kurbo::PathEl::MoveTo(Point::new(10.0, 20.0)));
        assert_eq!(els[1], kurbo::PathEl::LineTo(Point::new(12.0, 16.0)));
    }
}
