// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node content, local properties and flags.

use kurbo::Rect;

use crate::graphics::Graphics;
use crate::picture::Picture;
use crate::text::Text;
use crate::transform::Transform;

/// What a node draws.
///
/// The set of paint behaviors is closed: the render pass matches on this enum
/// instead of dispatching through a trait object.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// Groups children; draws nothing itself.
    Container,
    /// A recorded vector command list.
    Graphics(Graphics),
    /// Styled, laid-out text.
    Text(Text),
    /// A raster image.
    Picture(Picture),
}

impl NodeContent {
    /// Returns the kind of this content.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Container => NodeKind::Container,
            Self::Graphics(_) => NodeKind::Graphics,
            Self::Text(_) => NodeKind::Text,
            Self::Picture(_) => NodeKind::Picture,
        }
    }

    /// Local-space bounds of the content itself, without children.
    pub(crate) fn local_bounds(&mut self) -> Option<Rect> {
        match self {
            Self::Container => None,
            Self::Graphics(g) => g.bounds(),
            Self::Text(t) => t.bounds(),
            Self::Picture(p) => p.bounds(),
        }
    }
}

/// Discriminant of [`NodeContent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// See [`NodeContent::Container`].
    Container,
    /// See [`NodeContent::Graphics`].
    Graphics,
    /// See [`NodeContent::Text`].
    Text,
    /// See [`NodeContent::Picture`].
    Picture,
}

impl NodeKind {
    /// Lower-case name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Graphics => "graphics",
            Self::Text => "text",
            Self::Picture => "picture",
        }
    }
}

/// Inspectable record of problems absorbed during rendering.
///
/// Geometric and resource errors never abort a frame. They are reflected
/// here instead, and stay set until the caller clears them or the offending
/// input is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// The picture's pixels are not readable (foreign origin). The node
    /// still renders on screen but is omitted from raster export.
    pub tainted: bool,
    /// Decoding the picture's source failed.
    pub decode_failed: bool,
    /// The world matrix is not invertible; the node draws nothing.
    pub degenerate_transform: bool,
    /// The node's mask was disposed; it now renders unmasked.
    pub stale_mask: bool,
}

impl NodeFlags {
    /// Returns `true` if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.tainted || self.decode_failed || self.degenerate_transform || self.stale_mask)
    }
}

/// Extra pixels a layer reserves around its visible area, in CSS pixels.
///
/// Content may draw into the margin (for example a tooltip that sticks out of
/// the chart) without being clipped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerMargin {
    /// Extra space left of the origin.
    pub left: f64,
    /// Extra space above the origin.
    pub top: f64,
    /// Extra space right of the visible width.
    pub right: f64,
    /// Extra space below the visible height.
    pub bottom: f64,
}

impl LayerMargin {
    /// No margin.
    pub const ZERO: Self = Self::uniform(0.0);

    /// The same margin on every side.
    #[must_use]
    pub const fn uniform(m: f64) -> Self {
        Self {
            left: m,
            top: m,
            right: m,
            bottom: m,
        }
    }

    /// Per-side maximum of two margins.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// One of the scalar inputs to a node's local matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformProperty {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Horizontal pivot, in local units.
    PivotX,
    /// Vertical pivot, in local units.
    PivotY,
    /// Rotation in degrees, clockwise in a y-down space.
    Rotation,
    /// Uniform scale.
    Scale,
}

/// The local matrix inputs of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformProps {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Horizontal pivot.
    pub pivot_x: f64,
    /// Vertical pivot.
    pub pivot_y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
}

impl TransformProps {
    /// Position at the origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        pivot_x: 0.0,
        pivot_y: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };

    /// Reads one property.
    #[must_use]
    pub fn get(&self, prop: TransformProperty) -> f64 {
        match prop {
            TransformProperty::X => self.x,
            TransformProperty::Y => self.y,
            TransformProperty::PivotX => self.pivot_x,
            TransformProperty::PivotY => self.pivot_y,
            TransformProperty::Rotation => self.rotation,
            TransformProperty::Scale => self.scale,
        }
    }

    /// Writes one property.
    pub fn set(&mut self, prop: TransformProperty, value: f64) {
        match prop {
            TransformProperty::X => self.x = value,
            TransformProperty::Y => self.y = value,
            TransformProperty::PivotX => self.pivot_x = value,
            TransformProperty::PivotY => self.pivot_y = value,
            TransformProperty::Rotation => self.rotation = value,
            TransformProperty::Scale => self.scale = value,
        }
    }

    /// The local matrix these inputs describe.
    #[must_use]
    pub fn to_matrix(&self) -> Transform {
        Transform::from_local(
            self.x,
            self.y,
            self.pivot_x,
            self.pivot_y,
            self.rotation,
            self.scale,
        )
    }
}

impl Default for TransformProps {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_max_is_per_side() {
        let a = LayerMargin {
            left: 5.0,
            top: 0.0,
            right: 1.0,
            bottom: 9.0,
        };
        let b = LayerMargin::uniform(3.0);
        assert_eq!(
            a.max(b),
            LayerMargin {
                left: 5.0,
                top: 3.0,
                right: 3.0,
                bottom: 9.0,
            }
        );
    }

    #[test]
    fn props_get_set_round_trip() {
        let mut p = TransformProps::IDENTITY;
        p.set(TransformProperty::Rotation, 45.0);
        p.set(TransformProperty::PivotY, 2.0);
        assert_eq!(p.get(TransformProperty::Rotation), 45.0);
        assert_eq!(p.get(TransformProperty::PivotY), 2.0);
        assert_eq!(p.get(TransformProperty::Scale), 1.0);
    }

    #[test]
    fn empty_flags() {
        assert!(NodeFlags::default().is_empty());
        let f = NodeFlags {
            stale_mask: true,
            ..NodeFlags::default()
        };
        assert!(!f.is_empty());
    }
}
