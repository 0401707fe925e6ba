// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-string interpreter.
//!
//! Accepts the single-letter path grammar: `M L H V C S Q T A Z`, upper case
//! absolute and lower case relative. Arguments are separated by commas,
//! whitespace, or nothing at all where the number syntax makes the boundary
//! unambiguous (`10-5`, `0.5.5`). A command letter may be followed by several
//! argument groups; extra `M` groups are line segments.
//!
//! The two flag arguments of an elliptical arc are read as exactly one
//! character each, so `A1 1 0 0017 30` is `rx=1 ry=1 rot=0 large=0 sweep=0
//! x=17 y=30`.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};

use super::command::Op;

/// A path string could not be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathError {
    /// A character that is neither a command, a number nor a separator.
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Byte offset into the path string.
        offset: usize,
    },
    /// Numeric data appeared before the first command letter.
    MissingCommand {
        /// Byte offset of the first number.
        offset: usize,
    },
    /// A command received a number of arguments that is not a positive
    /// multiple of its arity.
    ArgumentCount {
        /// The command letter as written.
        command: char,
        /// Arguments per group.
        expected: usize,
        /// Arguments found.
        found: usize,
    },
    /// A number started but was malformed.
    InvalidNumber {
        /// Byte offset where the number starts.
        offset: usize,
    },
    /// An arc flag was not `0` or `1`.
    InvalidFlag {
        /// The command letter as written.
        command: char,
        /// Byte offset of the flag.
        offset: usize,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter { ch, offset } => {
                write!(f, "unexpected character {ch:?} at offset {offset}")
            }
            Self::MissingCommand { offset } => {
                write!(f, "path data at offset {offset} is not preceded by a command")
            }
            Self::ArgumentCount {
                command,
                expected: 0,
                found,
            } => write!(f, "command '{command}' takes no arguments, found {found}"),
            Self::ArgumentCount {
                command,
                expected,
                found,
            } => write!(
                f,
                "command '{command}' takes arguments in groups of {expected}, found {found}"
            ),
            Self::InvalidNumber { offset } => write!(f, "invalid number at offset {offset}"),
            Self::InvalidFlag { command, offset } => write!(
                f,
                "command '{command}' expects a flag (0 or 1) at offset {offset}"
            ),
        }
    }
}

impl core::error::Error for PathError {}

/// Number of arguments per group for a command letter.
fn arity(command: char) -> Option<usize> {
    Some(match command.to_ascii_uppercase() {
        'M' | 'L' | 'T' => 2,
        'H' | 'V' => 1,
        'C' => 6,
        'S' | 'Q' => 4,
        'A' => 7,
        'Z' => 0,
        _ => return None,
    })
}

fn is_separator(ch: char) -> bool {
    ch == ',' || ch.is_ascii_whitespace()
}

fn starts_number(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '+' | '-')
}

/// Parses a path string into drawing operations with absolute coordinates.
///
/// An empty (or separator-only) string yields no operations.
pub fn parse_path(d: &str) -> Result<Vec<Op>, PathError> {
    let mut lexer = Lexer { src: d, pos: 0 };
    let mut state = PathState::default();
    let mut ops = Vec::new();
    let mut args = Vec::new();

    loop {
        lexer.skip_separators();
        let Some(ch) = lexer.peek() else {
            break;
        };
        let offset = lexer.pos;
        let Some(n) = arity(ch) else {
            if state.seen_command || !starts_number(ch) {
                return Err(PathError::UnexpectedCharacter { ch, offset });
            }
            return Err(PathError::MissingCommand { offset });
        };
        lexer.bump(ch);
        state.seen_command = true;

        args.clear();
        lexer.read_args(ch, &mut args)?;
        let valid = if n == 0 {
            args.is_empty()
        } else {
            !args.is_empty() && args.len() % n == 0
        };
        if !valid {
            return Err(PathError::ArgumentCount {
                command: ch,
                expected: n,
                found: args.len(),
            });
        }
        state.emit(ch, &args, &mut ops);
    }
    Ok(ops)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if !is_separator(ch) {
                break;
            }
            self.bump(ch);
        }
    }

    fn eat_digits(&mut self) -> usize {
        let mut n = 0;
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.bump(ch);
            n += 1;
        }
        n
    }

    /// Reads arguments until the next letter or the end of input.
    fn read_args(&mut self, command: char, args: &mut Vec<f64>) -> Result<(), PathError> {
        let is_arc = command.eq_ignore_ascii_case(&'a');
        loop {
            self.skip_separators();
            let Some(ch) = self.peek() else {
                return Ok(());
            };
            if ch.is_ascii_alphabetic() {
                return Ok(());
            }
            if is_arc && matches!(args.len() % 7, 3 | 4) {
                let offset = self.pos;
                let flag = match ch {
                    '0' => 0.0,
                    '1' => 1.0,
                    _ => return Err(PathError::InvalidFlag { command, offset }),
                };
                self.bump(ch);
                args.push(flag);
                continue;
            }
            if !starts_number(ch) {
                return Err(PathError::UnexpectedCharacter {
                    ch,
                    offset: self.pos,
                });
            }
            args.push(self.read_number()?);
        }
    }

    fn read_number(&mut self) -> Result<f64, PathError> {
        let start = self.pos;
        if let Some(ch @ ('+' | '-')) = self.peek() {
            self.bump(ch);
        }
        let mut digits = self.eat_digits();
        if self.peek() == Some('.') {
            self.bump('.');
            digits += self.eat_digits();
        }
        if digits == 0 {
            return Err(PathError::InvalidNumber { offset: start });
        }
        // Only consume an exponent if it is complete, so `1e` leaves the `e`.
        if let Some(e @ ('e' | 'E')) = self.peek() {
            let mark = self.pos;
            self.bump(e);
            if let Some(ch @ ('+' | '-')) = self.peek() {
                self.bump(ch);
            }
            if self.eat_digits() == 0 {
                self.pos = mark;
            }
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| PathError::InvalidNumber { offset: start })
    }
}

/// Current point and reflection state while emitting operations.
#[derive(Default)]
struct PathState {
    seen_command: bool,
    current: Point,
    subpath_start: Point,
    /// Second control point of the previous `C`/`S` segment.
    cubic_ctrl: Option<Point>,
    /// Control point of the previous `Q`/`T` segment.
    quad_ctrl: Option<Point>,
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => about + (about - c),
        None => about,
    }
}

impl PathState {
    fn emit(&mut self, command: char, args: &[f64], ops: &mut Vec<Op>) {
        let relative = command.is_ascii_lowercase();
        let upper = command.to_ascii_uppercase();
        if upper == 'Z' {
            ops.push(Op::ClosePath);
            self.current = self.subpath_start;
            self.cubic_ctrl = None;
            self.quad_ctrl = None;
            return;
        }
        let n = arity(command).unwrap_or(2);
        for (i, group) in args.chunks_exact(n).enumerate() {
            let base = if relative {
                self.current.to_vec2()
            } else {
                Vec2::ZERO
            };
            let pt = |x: f64, y: f64| Point::new(x, y) + base;
            let mut cubic_ctrl = None;
            let mut quad_ctrl = None;
            match upper {
                'M' => {
                    let p = pt(group[0], group[1]);
                    if i == 0 {
                        ops.push(Op::MoveTo(p));
                        self.subpath_start = p;
                    } else {
                        ops.push(Op::LineTo(p));
                    }
                    self.current = p;
                }
                'L' => {
                    let p = pt(group[0], group[1]);
                    ops.push(Op::LineTo(p));
                    self.current = p;
                }
                'H' => {
                    let p = Point::new(group[0] + base.x, self.current.y);
                    ops.push(Op::LineTo(p));
                    self.current = p;
                }
                'V' => {
                    let p = Point::new(self.current.x, group[0] + base.y);
                    ops.push(Op::LineTo(p));
                    self.current = p;
                }
                'C' => {
                    let c1 = pt(group[0], group[1]);
                    let c2 = pt(group[2], group[3]);
                    let to = pt(group[4], group[5]);
                    ops.push(Op::BezierTo { c1, c2, to });
                    cubic_ctrl = Some(c2);
                    self.current = to;
                }
                'S' => {
                    let c1 = reflect(self.cubic_ctrl, self.current);
                    let c2 = pt(group[0], group[1]);
                    let to = pt(group[2], group[3]);
                    ops.push(Op::BezierTo { c1, c2, to });
                    cubic_ctrl = Some(c2);
                    self.current = to;
                }
                'Q' => {
                    let c = pt(group[0], group[1]);
                    let to = pt(group[2], group[3]);
                    ops.push(Op::QuadTo { c, to });
                    quad_ctrl = Some(c);
                    self.current = to;
                }
                'T' => {
                    let c = reflect(self.quad_ctrl, self.current);
                    let to = pt(group[0], group[1]);
                    ops.push(Op::QuadTo { c, to });
                    quad_ctrl = Some(c);
                    self.current = to;
                }
                'A' => {
                    let to = pt(group[5], group[6]);
                    ops.push(Op::EllipticalArc {
                        radii: Vec2::new(group[0].abs(), group[1].abs()),
                        x_rotation: group[2].to_radians(),
                        large_arc: group[3] != 0.0,
                        sweep: group[4] != 0.0,
                        to,
                    });
                    self.current = to;
                }
                _ => {}
            }
            self.cubic_ctrl = cubic_ctrl;
            self.quad_ctrl = quad_ctrl;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn end_points(ops: &[Op]) -> Vec<Point> {
        ops.iter().filter_map(Op::end_point).collect()
    }

    #[test]
    fn empty_path_is_empty() {
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("  ,\n").unwrap().is_empty());
    }

    #[test]
    fn glued_arc_flags_match_separated_flags() {
        let glued = parse_path("M0 0 A1 1 0 0017 30 1 1 0 0017 5").unwrap();
        let spaced = parse_path("M0 0 A1 1 0 0 0 17 30 1 1 0 0 0 17 5").unwrap();
        assert_eq!(glued, spaced);
        assert_eq!(
            end_points(&glued),
            vec![
                Point::new(0.0, 0.0),
                Point::new(17.0, 30.0),
                Point::new(17.0, 5.0)
            ]
        );
    }

    #[test]
    fn glued_flags_after_command_letter() {
        let glued = parse_path("M0 0a5 5 0 1110 10").unwrap();
        let spaced = parse_path("M0 0a5,5,0,1,1,10,10").unwrap();
        assert_eq!(glued, spaced);
        match &glued[1] {
            Op::EllipticalArc {
                large_arc,
                sweep,
                to,
                ..
            } => {
                assert!(*large_arc && *sweep);
                assert_eq!(*to, Point::new(10.0, 10.0));
            }
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    #[test]
    fn repeated_relative_commands_match_absolute() {
        let cases = [
            ("M1 1 l2 0 2 0 2 0", "M1 1 L3 1 L5 1 L7 1"),
            ("M1 1 h2 2 2", "M1 1 H3 H5 H7"),
            ("M1 1 v2 2 2", "M1 1 V3 V5 V7"),
            (
                "M1 1 c0 1 1 1 1 0 0 1 1 1 1 0",
                "M1 1 C1 2 2 2 2 1 C2 2 3 2 3 1",
            ),
            ("M1 1 s1 1 1 0 1 1 1 0", "M1 1 S2 2 2 1 S3 2 3 1"),
            ("M1 1 q1 1 2 0 1 1 2 0", "M1 1 Q2 2 3 1 Q4 2 5 1"),
            ("M1 1 t2 0 2 0", "M1 1 T3 1 T5 1"),
            (
                "M1 1 a1 1 0 0 1 2 0 1 1 0 0 1 2 0",
                "M1 1 A1 1 0 0 1 3 1 A1 1 0 0 1 5 1",
            ),
            ("m1 1 2 0 2 0", "M1 1 L3 1 L5 1"),
        ];
        for (relative, absolute) in cases {
            assert_eq!(
                parse_path(relative).unwrap(),
                parse_path(absolute).unwrap(),
                "{relative} vs {absolute}"
            );
        }
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let ops = parse_path("M0 0 C0 10 10 10 10 0 S20 -10 20 0").unwrap();
        assert_eq!(
            ops[2],
            Op::BezierTo {
                c1: Point::new(10.0, -10.0),
                c2: Point::new(20.0, -10.0),
                to: Point::new(20.0, 0.0),
            }
        );
    }

    #[test]
    fn smooth_control_resets_after_unrelated_command() {
        let ops = parse_path("M0 0 C0 10 10 10 10 0 L20 0 S30 10 30 0").unwrap();
        // The line intervenes, so the first control point is the current point.
        assert_eq!(
            ops[3],
            Op::BezierTo {
                c1: Point::new(20.0, 0.0),
                c2: Point::new(30.0, 10.0),
                to: Point::new(30.0, 0.0),
            }
        );
    }

    #[test]
    fn close_returns_to_subpath_start() {
        let ops = parse_path("M5 5 l10 0 z l0 10").unwrap();
        assert_eq!(ops[2], Op::ClosePath);
        assert_eq!(ops[3], Op::LineTo(Point::new(5.0, 15.0)));
    }

    #[test]
    fn number_boundaries() {
        assert_eq!(
            parse_path("M10-5").unwrap(),
            vec![Op::MoveTo(Point::new(10.0, -5.0))]
        );
        assert_eq!(
            parse_path("M0.5.5").unwrap(),
            vec![Op::MoveTo(Point::new(0.5, 0.5))]
        );
        assert_eq!(
            parse_path("M1e1,2E-1").unwrap(),
            vec![Op::MoveTo(Point::new(10.0, 0.2))]
        );
    }

    #[test]
    fn argument_count_error_names_command() {
        assert_eq!(
            parse_path("M 0 0 L 1"),
            Err(PathError::ArgumentCount {
                command: 'L',
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_path("M0 0 Z 5"),
            Err(PathError::ArgumentCount {
                command: 'Z',
                expected: 0,
                found: 1
            })
        );
        assert_eq!(
            parse_path("M0 0 c"),
            Err(PathError::ArgumentCount {
                command: 'c',
                expected: 6,
                found: 0
            })
        );
    }

    #[test]
    fn missing_command() {
        assert_eq!(
            parse_path("  10 20"),
            Err(PathError::MissingCommand { offset: 2 })
        );
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(
            parse_path("M0 0 X1"),
            Err(PathError::UnexpectedCharacter { ch: 'X', offset: 5 })
        );
        assert_eq!(
            parse_path("M0 0 #"),
            Err(PathError::UnexpectedCharacter { ch: '#', offset: 5 })
        );
    }

    #[test]
    fn invalid_number() {
        assert_eq!(
            parse_path("M0 0 L- 2"),
            Err(PathError::InvalidNumber { offset: 6 })
        );
    }

    #[test]
    fn invalid_flag() {
        assert_eq!(
            parse_path("M0 0 A1 1 0 2 0 5 5"),
            Err(PathError::InvalidFlag {
                command: 'A',
                offset: 12
            })
        );
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = parse_path("M 0 0 L 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'L' takes arguments in groups of 2, found 1"
        );
    }
}
