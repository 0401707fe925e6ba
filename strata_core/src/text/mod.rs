// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styled text content.
//!
//! A [`Text`] value holds a marked-up string and a base [`TextStyle`]. Layout
//! splits it into styled spans ([`markup`]), breaks lines and positions runs
//! ([`layout`]) using either a real [`FontFace`] or [`ApproximateMetrics`].
//! The layout is cached until the text, style or font changes.
//!
//! Glyphs are only drawn when a font face is attached. The picking surface
//! paints each run's line box instead, so text stays hittable either way.

mod font;
mod layout;
mod markup;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{BezPath, Rect};

pub use font::{FontError, FontFace};
pub use layout::{ApproximateMetrics, GlyphMetrics, GlyphRun, TextLayout, layout};
pub use markup::{Span, SpanStyle, parse_markup};

use crate::color::Color;
use crate::graphics::{FillStyle, Painter};

/// Horizontal alignment of lines within the text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Left edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Right edge.
    End,
}

/// Base style of a text node.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in local units.
    pub font_size: f64,
    /// Default fill color.
    pub color: Color,
    /// Default weight.
    pub bold: bool,
    /// Line advance as a multiple of the font size.
    pub line_height: f64,
    /// Wrap width; `None` disables wrapping.
    pub max_width: Option<f64>,
    /// Line alignment.
    pub align: TextAlign,
    /// Whether `[...]` style tags are interpreted.
    pub markup: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: Color::BLACK,
            bold: false,
            line_height: 1.2,
            max_width: None,
            align: TextAlign::Start,
            markup: true,
        }
    }
}

/// A text node's content.
#[derive(Clone, Debug, Default)]
pub struct Text {
    text: String,
    style: TextStyle,
    font: Option<Arc<FontFace>>,
    layout: Option<TextLayout>,
}

impl Text {
    /// Creates text with the default style.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Replaces the base style.
    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Attaches a font face.
    #[must_use]
    pub fn with_font(mut self, font: Arc<FontFace>) -> Self {
        self.font = Some(font);
        self
    }

    /// Returns the source string, markup included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the source string.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.layout = None;
    }

    /// Returns the base style.
    #[must_use]
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Mutable access to the base style; invalidates the layout.
    pub fn style_mut(&mut self) -> &mut TextStyle {
        self.layout = None;
        &mut self.style
    }

    /// Returns the attached font face.
    #[must_use]
    pub fn font(&self) -> Option<&Arc<FontFace>> {
        self.font.as_ref()
    }

    /// Attaches or detaches a font face.
    pub fn set_font(&mut self, font: Option<Arc<FontFace>>) {
        self.font = font;
        self.layout = None;
    }

    /// The styled spans of the source string.
    #[must_use]
    pub fn spans(&self) -> Vec<Span> {
        let base = SpanStyle {
            color: self.style.color,
            bold: self.style.bold,
        };
        if self.style.markup {
            parse_markup(&self.text, base)
        } else if self.text.is_empty() {
            Vec::new()
        } else {
            alloc::vec![Span {
                text: self.text.clone(),
                style: base,
            }]
        }
    }

    /// Returns the layout, computing it if stale.
    pub fn layout(&mut self) -> &TextLayout {
        if self.layout.is_none() {
            let spans = self.spans();
            let computed = match self.font.as_deref() {
                Some(face) => layout::layout(&spans, &self.style, face),
                None => layout::layout(&spans, &self.style, &ApproximateMetrics),
            };
            self.layout = Some(computed);
        }
        self.layout.get_or_insert_with(TextLayout::default)
    }

    /// Local bounds of all runs.
    pub fn bounds(&mut self) -> Option<Rect> {
        self.layout().bounds()
    }

    /// Line-box rectangles of every run.
    pub fn run_rects(&mut self) -> Vec<Rect> {
        self.layout().runs.iter().map(GlyphRun::rect).collect()
    }

    /// Fills glyph outlines, one path per run.
    ///
    /// Draws nothing without a font face.
    pub fn paint(&mut self, painter: &mut impl Painter) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let size = self.style.font_size;
        for run in &self.layout().runs {
            let mut path = BezPath::new();
            let mut pen = run.origin;
            for ch in run.text.chars() {
                if let Some(glyph) = font.glyph_path(ch, size, pen) {
                    path.extend(glyph.elements().iter().copied());
                }
                pen.x += font.advance(ch, size, run.style.bold);
            }
            if !path.elements().is_empty() {
                painter.fill(&path, &FillStyle::solid(run.style.color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_cached_until_text_changes() {
        let mut t = Text::new("abc");
        let w1 = t.layout().width;
        assert!(w1 > 0.0);
        t.set_text("abcdef");
        let w2 = t.layout().width;
        assert!(w2 > w1);
    }

    #[test]
    fn style_change_invalidates_layout() {
        let mut t = Text::new("abc");
        let h1 = t.layout().height;
        t.style_mut().font_size = 24.0;
        assert!(t.layout().height > h1);
    }

    #[test]
    fn markup_can_be_disabled() {
        let mut t = Text::new("[bold]x[/]");
        assert_eq!(t.spans().len(), 1);
        assert_eq!(t.spans()[0].text, "x");
        t.style_mut().markup = false;
        assert_eq!(t.spans()[0].text, "[bold]x[/]");
    }

    #[test]
    fn run_rects_cover_bounds() {
        let mut t = Text::new("one [bold]two[/]");
        let rects = t.run_rects();
        assert_eq!(rects.len(), 2);
        let union = rects[0].union(rects[1]);
        assert_eq!(Some(union), t.bounds());
    }

    #[test]
    fn empty_text_has_no_bounds() {
        assert_eq!(Text::new("").bounds(), None);
    }

    #[derive(Default)]
    struct Count(usize);

    impl Painter for Count {
        fn fill(&mut self, _path: &BezPath, _style: &FillStyle) {
            self.0 += 1;
        }
        fn stroke(&mut self, _path: &BezPath, _style: &crate::graphics::StrokeStyle) {}
    }

    #[test]
    fn no_glyphs_without_font() {
        let mut t = Text::new("abc");
        let mut c = Count::default();
        t.paint(&mut c);
        assert_eq!(c.0, 0);
    }
}
