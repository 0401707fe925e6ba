// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight-alpha 8-bit color.

use core::fmt;

/// An sRGB color with straight (non-premultiplied) 8-bit channels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with explicit alpha.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from `0xRRGGBB`.
    #[inline]
    #[must_use]
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Packs the color channels (ignoring alpha) as `0xRRGGBB`.
    #[inline]
    #[must_use]
    pub const fn to_rgb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        match s.len() {
            3 => {
                let v = u32::from_str_radix(s, 16).ok()?;
                let r = ((v >> 8) & 0xf) as u8;
                let g = ((v >> 4) & 0xf) as u8;
                let b = (v & 0xf) as u8;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => u32::from_str_radix(s, 16).ok().map(Self::from_rgb_u32),
            _ => None,
        }
    }

    /// Returns the color with its alpha multiplied by `factor` (clamped).
    #[must_use]
    pub fn multiply_alpha(self, factor: f64) -> Self {
        let a = (f64::from(self.a) * factor.clamp(0.0, 1.0)).round();
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=255")]
        let a = a.clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color(#{:02x}{:02x}{:02x}/{})",
            self.r, self.g, self.b, self.a
        )
    }
}
