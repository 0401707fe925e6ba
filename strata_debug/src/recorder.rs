// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each stamped with the nanoseconds
//! elapsed since the recorder was created. [`decode`] reads them back as an
//! iterator of [`Recorded`] events.

use std::time::Instant;

use strata_core::scene::NodeId;
use strata_core::trace::{
    DispatchEvent, FrameBeginEvent, FrameEndEvent, HitTestEvent, LayerRepaintEvent, NodeFlag,
    NodeFlagEvent, PickingPassEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_FRAME_END: u8 = 2;
const TAG_LAYER_REPAINT: u8 = 3;
const TAG_PICKING_PASS: u8 = 4;
const TAG_HIT_TEST: u8 = 5;
const TAG_DISPATCH: u8 = 6;
const TAG_NODE_FLAG: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    origin: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            origin: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "u64 nanoseconds cover centuries of recording"
        )]
        let at = self.origin.elapsed().as_nanos() as u64;
        self.write_u8(tag);
        self.write_u64(at);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_node(&mut self, node: NodeId) {
        self.write_u32(node.index());
        self.write_u32(node.generation());
    }

    fn write_option_node(&mut self, node: Option<NodeId>) {
        match node {
            Some(n) => {
                self.write_u8(1);
                self.write_node(n);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
                self.write_u32(0);
            }
        }
    }

    fn write_str(&mut self, s: &str) {
        let bytes = &s.as_bytes()[..s.len().min(u16::MAX.into())];
        #[expect(
            clippy::cast_possible_truncation,
            reason = "length capped at u16::MAX above"
        )]
        self.buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(bytes);
    }

    fn write_flag(&mut self, flag: NodeFlag) {
        self.write_u8(match flag {
            NodeFlag::Tainted => 0,
            NodeFlag::DecodeFailed => 1,
            NodeFlag::DegenerateTransform => 2,
            NodeFlag::StaleMask => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.begin(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u32(e.dirty_layers);
        self.write_u32(e.changed_nodes);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.begin(TAG_FRAME_END);
        self.write_u64(e.frame_index);
        self.write_u32(e.repainted_layers);
        self.write_u32(e.picking_passes);
    }

    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        self.begin(TAG_LAYER_REPAINT);
        self.write_u64(e.frame_index);
        self.write_i32(e.order);
        self.write_u32(e.painted_nodes);
    }

    fn on_picking_pass(&mut self, e: &PickingPassEvent) {
        self.begin(TAG_PICKING_PASS);
        self.write_u64(e.frame_index);
        self.write_i32(e.layer_order);
        self.write_u32(e.painted_nodes);
    }

    fn on_hit_test(&mut self, e: &HitTestEvent) {
        self.begin(TAG_HIT_TEST);
        self.write_f64(e.x);
        self.write_f64(e.y);
        self.write_option_node(e.node);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.begin(TAG_DISPATCH);
        self.write_str(e.kind);
        self.write_node(e.node);
        self.write_u32(e.pointer_id);
    }

    fn on_node_flag(&mut self, e: &NodeFlagEvent) {
        self.begin(TAG_NODE_FLAG);
        self.write_u64(e.frame_index);
        self.write_node(e.node);
        self.write_flag(e.flag);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event with its timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    /// Nanoseconds since the recorder was created.
    pub at_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`LayerRepaintEvent`].
    LayerRepaint(LayerRepaintEvent),
    /// A [`PickingPassEvent`].
    PickingPass(PickingPassEvent),
    /// A [`HitTestEvent`].
    HitTest(HitTestEvent),
    /// A [`DispatchEvent`], with its kind name owned.
    Dispatch {
        /// Event kind name.
        kind: String,
        /// Receiving node.
        node: NodeId,
        /// Pointer that caused the event.
        pointer_id: u32,
    },
    /// A [`NodeFlagEvent`].
    NodeFlag(NodeFlagEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Recorded`] events.
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_node(&mut self) -> Option<NodeId> {
        Some(NodeId::from_raw_parts(self.read_u32()?, self.read_u32()?))
    }

    fn read_option_node(&mut self) -> Option<Option<NodeId>> {
        let present = self.read_u8()?;
        let node = self.read_node()?;
        Some((present != 0).then_some(node))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = usize::from(self.take().map(u16::from_le_bytes)?);
        let end = self.pos.checked_add(len)?;
        let s = core::str::from_utf8(self.data.get(self.pos..end)?).ok()?;
        self.pos = end;
        Some(s.to_owned())
    }

    fn read_flag(&mut self) -> Option<NodeFlag> {
        Some(match self.read_u8()? {
            0 => NodeFlag::Tainted,
            1 => NodeFlag::DecodeFailed,
            2 => NodeFlag::DegenerateTransform,
            _ => NodeFlag::StaleMask,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_FRAME_BEGIN => RecordedEvent::FrameBegin(FrameBeginEvent {
                frame_index: self.read_u64()?,
                dirty_layers: self.read_u32()?,
                changed_nodes: self.read_u32()?,
            }),
            TAG_FRAME_END => RecordedEvent::FrameEnd(FrameEndEvent {
                frame_index: self.read_u64()?,
                repainted_layers: self.read_u32()?,
                picking_passes: self.read_u32()?,
            }),
            TAG_LAYER_REPAINT => RecordedEvent::LayerRepaint(LayerRepaintEvent {
                frame_index: self.read_u64()?,
                order: self.read_i32()?,
                painted_nodes: self.read_u32()?,
            }),
            TAG_PICKING_PASS => RecordedEvent::PickingPass(PickingPassEvent {
                frame_index: self.read_u64()?,
                layer_order: self.read_i32()?,
                painted_nodes: self.read_u32()?,
            }),
            TAG_HIT_TEST => RecordedEvent::HitTest(HitTestEvent {
                x: self.read_f64()?,
                y: self.read_f64()?,
                node: self.read_option_node()?,
            }),
            TAG_DISPATCH => RecordedEvent::Dispatch {
                kind: self.read_str()?,
                node: self.read_node()?,
                pointer_id: self.read_u32()?,
            },
            TAG_NODE_FLAG => RecordedEvent::NodeFlag(NodeFlagEvent {
                frame_index: self.read_u64()?,
                node: self.read_node()?,
                flag: self.read_flag()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Recorded;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_nanos = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Recorded { at_nanos, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn node(idx: u32) -> NodeId {
        NodeId::from_raw_parts(idx, 3)
    }

    fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
        decode(rec.as_bytes()).map(|r| r.event).collect()
    }

    #[test]
    fn frame_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 4,
            dirty_layers: 2,
            changed_nodes: 9,
        });
        rec.on_layer_repaint(&LayerRepaintEvent {
            frame_index: 4,
            order: -1,
            painted_nodes: 5,
        });
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 4,
            repainted_layers: 1,
            picking_passes: 0,
        });

        let decoded: Vec<Recorded> = decode(rec.as_bytes()).collect();
        assert_eq!(decoded.len(), 3);
        assert!(
            decoded.windows(2).all(|w| w[0].at_nanos <= w[1].at_nanos),
            "timestamps must not go backwards"
        );
        match &decoded[1].event {
            RecordedEvent::LayerRepaint(e) => {
                assert_eq!(e.order, -1);
                assert_eq!(e.painted_nodes, 5);
            }
            other => panic!("expected LayerRepaint, got {other:?}"),
        }
        assert!(matches!(decoded[2].event, RecordedEvent::FrameEnd(_)));
    }

    #[test]
    fn hit_tests_keep_misses() {
        let mut rec = RecorderSink::new();
        rec.on_hit_test(&HitTestEvent {
            x: 1.5,
            y: -2.0,
            node: Some(node(7)),
        });
        rec.on_hit_test(&HitTestEvent {
            x: 0.0,
            y: 0.0,
            node: None,
        });

        let events = events(&rec);
        assert_eq!(
            events[0],
            RecordedEvent::HitTest(HitTestEvent {
                x: 1.5,
                y: -2.0,
                node: Some(node(7)),
            })
        );
        assert!(matches!(
            events[1],
            RecordedEvent::HitTest(HitTestEvent { node: None, .. })
        ));
    }

    #[test]
    fn dispatch_and_flags() {
        let mut rec = RecorderSink::new();
        rec.on_dispatch(&DispatchEvent {
            kind: "click",
            node: node(2),
            pointer_id: 0,
        });
        rec.on_node_flag(&NodeFlagEvent {
            frame_index: 1,
            node: node(2),
            flag: NodeFlag::StaleMask,
        });

        let events = events(&rec);
        assert_eq!(
            events[0],
            RecordedEvent::Dispatch {
                kind: "click".into(),
                node: node(2),
                pointer_id: 0,
            }
        );
        match &events[1] {
            RecordedEvent::NodeFlag(e) => assert_eq!(e.flag, NodeFlag::StaleMask),
            other => panic!("expected NodeFlag, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_picking_pass(&PickingPassEvent {
            frame_index: 1,
            layer_order: 0,
            painted_nodes: 1,
        });
        rec.on_picking_pass(&PickingPassEvent {
            frame_index: 1,
            layer_order: 1,
            painted_nodes: 1,
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 2];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
