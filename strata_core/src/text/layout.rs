// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line breaking and run positioning.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};

use super::markup::{Span, SpanStyle};
use super::{TextAlign, TextStyle};

/// Horizontal and vertical font metrics.
pub trait GlyphMetrics {
    /// Advance width of `ch` at `size`.
    fn advance(&self, ch: char, size: f64, bold: bool) -> f64;

    /// Distance from the baseline to the top of the line box.
    fn ascent(&self, size: f64) -> f64;

    /// Distance from the baseline to the bottom of the line box (positive).
    fn descent(&self, size: f64) -> f64;
}

/// Fixed-ratio metrics used when no font face is attached.
///
/// Good enough for sizing and hit areas; no glyphs are drawn with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproximateMetrics;

impl GlyphMetrics for ApproximateMetrics {
    fn advance(&self, ch: char, size: f64, bold: bool) -> f64 {
        let ratio = if ch.is_whitespace() {
            0.3
        } else if bold {
            0.6
        } else {
            0.55
        };
        size * ratio
    }

    fn ascent(&self, size: f64) -> f64 {
        size * 0.8
    }

    fn descent(&self, size: f64) -> f64 {
        size * 0.2
    }
}

/// Consecutive characters on one line sharing a style.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRun {
    /// The characters.
    pub text: String,
    /// Their style.
    pub style: SpanStyle,
    /// Baseline start of the run.
    pub origin: Point,
    /// Advance width of the run.
    pub width: f64,
    /// Ascent of the line box above the baseline.
    pub ascent: f64,
    /// Descent of the line box below the baseline.
    pub descent: f64,
}

impl GlyphRun {
    /// The run's line-box rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y - self.ascent,
            self.origin.x + self.width,
            self.origin.y + self.descent,
        )
    }
}

/// Laid-out text in local coordinates, top-left at the origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    /// Positioned runs in reading order.
    pub runs: Vec<GlyphRun>,
    /// Number of lines.
    pub lines: usize,
    /// Width of the widest line.
    pub width: f64,
    /// Total height of all line boxes.
    pub height: f64,
}

impl TextLayout {
    /// Union of all run rectangles.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.runs
            .iter()
            .map(GlyphRun::rect)
            .reduce(|a, b| a.union(b))
    }
}

/// A measured piece of a line: a word or a whitespace stretch.
struct Piece {
    text: String,
    style: SpanStyle,
    width: f64,
    space: bool,
}

fn measure(text: &str, style: SpanStyle, size: f64, metrics: &dyn GlyphMetrics) -> f64 {
    text.chars()
        .map(|ch| metrics.advance(ch, size, style.bold))
        .sum()
}

/// Splits spans into lines of pieces, wrapping at `max_width`.
fn break_lines(
    spans: &[Span],
    size: f64,
    max_width: Option<f64>,
    metrics: &dyn GlyphMetrics,
) -> Vec<Vec<Piece>> {
    let mut lines: Vec<Vec<Piece>> = alloc::vec![Vec::new()];
    let mut line_width = 0.0;
    for span in spans {
        for (i, segment) in span.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
                line_width = 0.0;
            }
            for (space, word) in split_words(segment) {
                let width = measure(word, span.style, size, metrics);
                let Some(line) = lines.last_mut() else {
                    continue;
                };
                let overflows = max_width.is_some_and(|max| line_width + width > max);
                if space {
                    if line.is_empty() && lines.len() > 1 {
                        continue;
                    }
                } else if overflows && line.iter().any(|p| !p.space) {
                    while line.last().is_some_and(|p| p.space) {
                        line.pop();
                    }
                    lines.push(Vec::new());
                    line_width = 0.0;
                }
                line_width += width;
                if let Some(line) = lines.last_mut() {
                    line.push(Piece {
                        text: word.into(),
                        style: span.style,
                        width,
                        space,
                    });
                }
            }
        }
    }
    lines
}

/// Splits into alternating word and whitespace pieces; `true` marks
/// whitespace.
fn split_words(s: &str) -> impl Iterator<Item = (bool, &str)> {
    let mut rest = s;
    core::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != space)
            .map_or(rest.len(), |(i, _)| i);
        let (piece, tail) = rest.split_at(end);
        rest = tail;
        Some((space, piece))
    })
}

/// Lays out styled spans.
#[must_use]
pub fn layout(spans: &[Span], style: &TextStyle, metrics: &dyn GlyphMetrics) -> TextLayout {
    let size = style.font_size;
    let ascent = metrics.ascent(size);
    let descent = metrics.descent(size);
    let line_advance = (size * style.line_height).max(ascent + descent);
    let lines = break_lines(spans, size, style.max_width, metrics);

    let widths: Vec<f64> = lines
        .iter()
        .map(|l| {
            let trailing: f64 = l.iter().rev().take_while(|p| p.space).map(|p| p.width).sum();
            l.iter().map(|p| p.width).sum::<f64>() - trailing
        })
        .collect();
    let widest = widths.iter().copied().fold(0.0, f64::max);
    let box_width = style.max_width.unwrap_or(widest);

    let mut runs: Vec<GlyphRun> = Vec::new();
    for (i, (line, width)) in lines.into_iter().zip(&widths).enumerate() {
        let offset = match style.align {
            TextAlign::Start => 0.0,
            TextAlign::Center => (box_width - width) / 2.0,
            TextAlign::End => box_width - width,
        };
        let baseline = ascent + i as f64 * line_advance;
        let mut x = offset;
        let first_run = runs.len();
        for piece in line {
            let merge = runs.len() > first_run && runs.last().is_some_and(|r| r.style == piece.style);
            match runs.last_mut() {
                Some(run) if merge => {
                    run.text.push_str(&piece.text);
                    run.width += piece.width;
                }
                _ => runs.push(GlyphRun {
                    text: piece.text,
                    style: piece.style,
                    origin: Point::new(x, baseline),
                    width: piece.width,
                    ascent,
                    descent,
                }),
            }
            x += piece.width;
        }
        // The line's width excludes trailing whitespace, so its last run does too.
        if runs.len() > first_run
            && let Some(run) = runs.last_mut()
        {
            let kept = run.text.trim_end().len();
            if kept < run.text.len() {
                run.width -= measure(&run.text[kept..], run.style, size, metrics);
                run.text.truncate(kept);
            }
        }
    }
    runs.retain(|r| !r.text.is_empty());

    let line_count = widths.len();
    let height = if line_count == 0 {
        0.0
    } else {
        (line_count - 1) as f64 * line_advance + ascent + descent
    };
    TextLayout {
        runs,
        lines: line_count,
        width: widest,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::text::markup::parse_markup;

    const BASE: SpanStyle = SpanStyle {
        color: Color::BLACK,
        bold: false,
    };

    /// Every character is exactly one unit wide, ascent 8, descent 2.
    struct Mono;

    impl GlyphMetrics for Mono {
        fn advance(&self, _ch: char, _size: f64, _bold: bool) -> f64 {
            1.0
        }
        fn ascent(&self, _size: f64) -> f64 {
            8.0
        }
        fn descent(&self, _size: f64) -> f64 {
            2.0
        }
    }

    fn style(max_width: Option<f64>, align: TextAlign) -> TextStyle {
        TextStyle {
            font_size: 10.0,
            line_height: 1.0,
            max_width,
            align,
            ..TextStyle::default()
        }
    }

    #[test]
    fn single_line() {
        let spans = parse_markup("hello world", BASE);
        let l = layout(&spans, &style(None, TextAlign::Start), &Mono);
        assert_eq!(l.lines, 1);
        assert_eq!(l.runs.len(), 1);
        assert_eq!(l.width, 11.0);
        assert_eq!(l.height, 10.0);
        assert_eq!(l.bounds(), Some(Rect::new(0.0, 0.0, 11.0, 10.0)));
    }

    #[test]
    fn wraps_at_max_width() {
        let spans = parse_markup("aaa bbb ccc", BASE);
        let l = layout(&spans, &style(Some(7.0), TextAlign::Start), &Mono);
        assert_eq!(l.lines, 2);
        assert_eq!(l.runs[0].text, "aaa bbb");
        assert_eq!(l.runs[1].text, "ccc");
        assert_eq!(l.runs[1].origin, Point::new(0.0, 18.0));
    }

    #[test]
    fn overlong_word_is_not_split() {
        let spans = parse_markup("abcdefgh", BASE);
        let l = layout(&spans, &style(Some(3.0), TextAlign::Start), &Mono);
        assert_eq!(l.lines, 1);
        assert_eq!(l.runs[0].width, 8.0);
    }

    #[test]
    fn hard_breaks() {
        let spans = parse_markup("a\nbb", BASE);
        let l = layout(&spans, &style(None, TextAlign::Start), &Mono);
        assert_eq!(l.lines, 2);
        assert_eq!(l.height, 20.0);
    }

    #[test]
    fn center_alignment() {
        let spans = parse_markup("ab\nabcd", BASE);
        let l = layout(&spans, &style(None, TextAlign::Center), &Mono);
        assert_eq!(l.runs[0].origin.x, 1.0);
        assert_eq!(l.runs[1].origin.x, 0.0);
    }

    #[test]
    fn styled_runs_are_positioned_in_sequence() {
        let spans = parse_markup("ab[bold]cd[/]e", BASE);
        let l = layout(&spans, &style(None, TextAlign::Start), &Mono);
        assert_eq!(l.runs.len(), 3);
        assert_eq!(l.runs[1].origin.x, 2.0);
        assert!(l.runs[1].style.bold);
        assert_eq!(l.runs[2].origin.x, 4.0);
    }

    #[test]
    fn approximate_metrics_are_proportional() {
        let m = ApproximateMetrics;
        assert!((m.advance('a', 20.0, false) - 11.0).abs() < 1e-9);
        assert!(m.advance('a', 20.0, true) > m.advance('a', 20.0, false));
        assert!((m.ascent(10.0) + m.descent(10.0) - 10.0).abs() < 1e-9);
    }
}
