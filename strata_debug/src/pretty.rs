// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`] destination (default: stderr).

use std::fmt;
use std::io::Write;

use strata_core::scene::NodeId;
use strata_core::trace::{
    DispatchEvent, FrameBeginEvent, FrameEndEvent, HitTestEvent, LayerRepaintEvent, NodeFlag,
    NodeFlagEvent, PickingPassEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`] destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct Node(NodeId);

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.0.index(), self.0.generation())
    }
}

fn flag_name(flag: NodeFlag) -> &'static str {
    match flag {
        NodeFlag::Tainted => "tainted",
        NodeFlag::DecodeFailed => "decode-failed",
        NodeFlag::DegenerateTransform => "degenerate-transform",
        NodeFlag::StaleMask => "stale-mask",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} dirty_layers={} changed={}",
            e.frame_index, e.dirty_layers, e.changed_nodes,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} repainted={} picking_passes={}",
            e.frame_index, e.repainted_layers, e.picking_passes,
        );
    }

    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        let _ = writeln!(
            self.writer,
            "[layer] frame={} order={} painted={}",
            e.frame_index, e.order, e.painted_nodes,
        );
    }

    fn on_picking_pass(&mut self, e: &PickingPassEvent) {
        let _ = writeln!(
            self.writer,
            "[picking] frame={} order={} painted={}",
            e.frame_index, e.layer_order, e.painted_nodes,
        );
    }

    fn on_hit_test(&mut self, e: &HitTestEvent) {
        let _ = match e.node {
            Some(node) => writeln!(
                self.writer,
                "[hit] ({:.1}, {:.1}) -> {}",
                e.x,
                e.y,
                Node(node)
            ),
            None => writeln!(self.writer, "[hit] ({:.1}, {:.1}) -> none", e.x, e.y),
        };
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let _ = writeln!(
            self.writer,
            "[dispatch] {} -> {} pointer={}",
            e.kind,
            Node(e.node),
            e.pointer_id,
        );
    }

    fn on_node_flag(&mut self, e: &NodeFlagEvent) {
        let _ = writeln!(
            self.writer,
            "[flag] frame={} {} {}",
            e.frame_index,
            Node(e.node),
            flag_name(e.flag),
        );
    }
}
