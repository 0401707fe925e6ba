// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalization of platform mouse, touch and wheel notifications.
//!
//! Hosts translate whatever their windowing layer reports into [`RawInput`]
//! and call [`normalize`]. Every resulting [`PointerInput`] carries one
//! point and one pointer id, so the dispatcher handles a mouse and each
//! finger of a multi-touch gesture the same way.

use kurbo::{Point, Vec2};

/// Pointer id used for the mouse. Touch ids are offset by one so they never
/// collide with it.
pub const MOUSE_POINTER_ID: u32 = 0;

/// Which device produced an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse or trackpad.
    Mouse,
    /// A finger on a touch surface.
    Touch,
    /// A stylus.
    Pen,
}

/// A pointer button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Primary button; also every touch and pen contact.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any further button, by platform code.
    Other(u16),
}

impl Button {
    /// Maps a DOM-style button code (`0` left, `1` middle, `2` right).
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            n => Self::Other(n),
        }
    }
}

/// What happened to a pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Contact started or a button was pressed.
    Down,
    /// The pointer moved.
    Move,
    /// Contact ended or a button was released.
    Up,
    /// The platform took the pointer away (for example a system gesture).
    Cancel,
    /// Scroll by a delta, in CSS pixels.
    Wheel(Vec2),
}

/// One normalized pointer notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    /// What happened.
    pub phase: Phase,
    /// Stable id for the duration of a contact.
    pub pointer_id: u32,
    /// Device kind.
    pub pointer_kind: PointerKind,
    /// Position in CSS pixels.
    pub point: Point,
    /// Button for `Down` and `Up`; `Left` otherwise.
    pub button: Button,
    /// Monotonic timestamp in milliseconds.
    pub time_ms: u64,
}

impl PointerInput {
    /// A mouse input with the left button.
    #[must_use]
    pub fn mouse(phase: Phase, point: Point, time_ms: u64) -> Self {
        Self {
            phase,
            pointer_id: MOUSE_POINTER_ID,
            pointer_kind: PointerKind::Mouse,
            point,
            button: Button::Left,
            time_ms,
        }
    }

    /// A touch input for platform touch id `touch_id`.
    #[must_use]
    pub fn touch(phase: Phase, touch_id: u32, point: Point, time_ms: u64) -> Self {
        Self {
            phase,
            pointer_id: touch_pointer_id(touch_id),
            pointer_kind: PointerKind::Touch,
            point,
            button: Button::Left,
            time_ms,
        }
    }

    /// Replaces the button.
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }
}

/// Maps a platform touch id to a pointer id.
#[must_use]
pub fn touch_pointer_id(touch_id: u32) -> u32 {
    touch_id.saturating_add(1)
}

/// Mouse actions as platforms report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseAction {
    /// A button went down.
    Down,
    /// The mouse moved.
    Move,
    /// A button went up.
    Up,
    /// The mouse left the surface.
    Leave,
}

/// Touch actions as platforms report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchAction {
    /// Touches started.
    Start,
    /// Touches moved.
    Move,
    /// Touches ended.
    End,
    /// Touches were cancelled.
    Cancel,
}

/// One touch point of a touch notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    /// Platform touch id.
    pub id: u32,
    /// Position in CSS pixels.
    pub point: Point,
}

/// A platform notification before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    /// A mouse notification.
    Mouse {
        /// What happened.
        action: MouseAction,
        /// Position in CSS pixels.
        point: Point,
        /// DOM-style button code.
        button: u16,
        /// Timestamp in milliseconds.
        time_ms: u64,
    },
    /// A touch notification listing the touches that changed.
    Touch {
        /// What happened.
        action: TouchAction,
        /// Changed touches.
        touches: Vec<TouchPoint>,
        /// Timestamp in milliseconds.
        time_ms: u64,
    },
    /// A wheel or trackpad scroll.
    Wheel {
        /// Pointer position in CSS pixels.
        point: Point,
        /// Scroll delta in CSS pixels.
        delta: Vec2,
        /// Timestamp in milliseconds.
        time_ms: u64,
    },
}

/// Splits a platform notification into one input per pointer.
///
/// A mouse leaving the surface becomes a move to a point far outside it, so
/// hovered nodes receive their pointer-out.
#[must_use]
pub fn normalize(raw: &RawInput) -> Vec<PointerInput> {
    match raw {
        RawInput::Mouse {
            action,
            point,
            button,
            time_ms,
        } => {
            let (phase, point) = match action {
                MouseAction::Down => (Phase::Down, *point),
                MouseAction::Move => (Phase::Move, *point),
                MouseAction::Up => (Phase::Up, *point),
                MouseAction::Leave => (Phase::Move, OUTSIDE),
            };
            vec![
                PointerInput::mouse(phase, point, *time_ms)
                    .with_button(Button::from_code(*button)),
            ]
        }
        RawInput::Touch {
            action,
            touches,
            time_ms,
        } => {
            let phase = match action {
                TouchAction::Start => Phase::Down,
                TouchAction::Move => Phase::Move,
                TouchAction::End => Phase::Up,
                TouchAction::Cancel => Phase::Cancel,
            };
            touches
                .iter()
                .map(|t| PointerInput::touch(phase, t.id, t.point, *time_ms))
                .collect()
        }
        RawInput::Wheel {
            point,
            delta,
            time_ms,
        } => vec![PointerInput::mouse(Phase::Wheel(*delta), *point, *time_ms)],
    }
}

/// A point no surface covers.
const OUTSIDE: Point = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
