// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline style markup.
//!
//! `[bold #ff0000]warning[/] text` splits into a bold red span and a plain
//! span. Tags nest; `[/]` closes the innermost one. `[[` is a literal `[`.
//! An unterminated `[` is kept as text.

use alloc::string::String;
use alloc::vec::Vec;

use crate::color::Color;

/// Style of a span of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpanStyle {
    /// Fill color.
    pub color: Color,
    /// Bold weight.
    pub bold: bool,
}

/// A run of characters sharing one style.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    /// The characters.
    pub text: String,
    /// Their style.
    pub style: SpanStyle,
}

/// Splits marked-up text into styled spans.
///
/// Unknown tag tokens are ignored. Empty spans are never produced.
#[must_use]
pub fn parse_markup(src: &str, base: SpanStyle) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut stack = Vec::new();
    let mut style = base;
    let mut text = String::new();
    let mut rest = src;

    while let Some(open) = rest.find('[') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        if let Some(stripped) = after.strip_prefix('[') {
            text.push('[');
            rest = stripped;
            continue;
        }
        let Some(close) = after.find(']') else {
            text.push('[');
            rest = after;
            continue;
        };
        flush(&mut spans, &mut text, style);
        let tag = after[..close].trim();
        if tag == "/" {
            style = stack.pop().unwrap_or(base);
        } else {
            stack.push(style);
            style = apply_tag(style, tag);
        }
        rest = &after[close + 1..];
    }
    text.push_str(rest);
    flush(&mut spans, &mut text, style);
    spans
}

fn flush(spans: &mut Vec<Span>, text: &mut String, style: SpanStyle) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => spans.push(Span {
            text: core::mem::take(text),
            style,
        }),
    }
    text.clear();
}

fn apply_tag(mut style: SpanStyle, tag: &str) -> SpanStyle {
    for token in tag.split_whitespace() {
        match token {
            "bold" => style.bold = true,
            "normal" | "regular" => style.bold = false,
            _ if token.starts_with('#') => {
                if let Some(color) = Color::from_hex(token) {
                    style.color = color;
                }
            }
            _ => {}
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: SpanStyle = SpanStyle {
        color: Color::BLACK,
        bold: false,
    };

    #[test]
    fn plain_text_is_one_span() {
        let spans = parse_markup("hello", BASE);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello");
        assert_eq!(spans[0].style, BASE);
    }

    #[test]
    fn tags_split_spans() {
        let spans = parse_markup("a [bold #ff0000]b[/] c", BASE);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "a ");
        assert_eq!(spans[1].text, "b");
        assert!(spans[1].style.bold);
        assert_eq!(spans[1].style.color, Color::rgb(255, 0, 0));
        assert_eq!(spans[2].text, " c");
        assert_eq!(spans[2].style, BASE);
    }

    #[test]
    fn tags_nest() {
        let spans = parse_markup("[bold]a[#00f]b[/]c[/]d", BASE);
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c", "d"]);
        assert_eq!(spans[1].style.color, Color::rgb(0, 0, 255));
        assert!(spans[1].style.bold);
        assert!(spans[2].style.bold);
        assert_eq!(spans[2].style.color, Color::BLACK);
        assert!(!spans[3].style.bold);
    }

    #[test]
    fn escapes_and_unterminated_brackets() {
        let spans = parse_markup("[[x] and [oops", BASE);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "[x] and [oops");
    }

    #[test]
    fn unbalanced_close_falls_back_to_base() {
        let spans = parse_markup("[/]x", BASE);
        assert_eq!(spans[0].style, BASE);
        assert_eq!(spans[0].text, "x");
    }
}
