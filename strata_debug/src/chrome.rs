// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Frames become duration spans on the render thread; hit tests and
//! dispatches land on one input track per pointer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const RENDER_TID: u32 = 0;
const HIT_TEST_TID: u32 = 1;
/// Pointer `n` dispatches on track `DISPATCH_TID + n`.
const DISPATCH_TID: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = nanos_to_us(recorded.at_nanos);
        match recorded.event {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Render",
                    "ts": ts,
                    "pid": 0,
                    "tid": RENDER_TID,
                    "args": {
                        "frame_index": e.frame_index,
                        "dirty_layers": e.dirty_layers,
                        "changed_nodes": e.changed_nodes,
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Render",
                    "ts": ts,
                    "pid": 0,
                    "tid": RENDER_TID,
                    "args": {
                        "frame_index": e.frame_index,
                        "repainted_layers": e.repainted_layers,
                        "picking_passes": e.picking_passes,
                    }
                }));
            }
            RecordedEvent::LayerRepaint(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "LayerRepaint",
                    "cat": "Render",
                    "ts": ts,
                    "pid": 0,
                    "tid": RENDER_TID,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "order": e.order,
                        "painted_nodes": e.painted_nodes,
                    }
                }));
            }
            RecordedEvent::PickingPass(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "PickingPass",
                    "cat": "Render",
                    "ts": ts,
                    "pid": 0,
                    "tid": RENDER_TID,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "order": e.layer_order,
                        "painted_nodes": e.painted_nodes,
                    }
                }));
            }
            RecordedEvent::NodeFlag(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.flag),
                    "cat": "Flag",
                    "ts": ts,
                    "pid": 0,
                    "tid": RENDER_TID,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "node": e.node.index(),
                        "generation": e.node.generation(),
                    }
                }));
            }
            RecordedEvent::HitTest(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "HitTest",
                    "cat": "Input",
                    "ts": ts,
                    "pid": 0,
                    "tid": HIT_TEST_TID,
                    "s": "t",
                    "args": {
                        "x": e.x,
                        "y": e.y,
                        "node": e.node.map(|n| n.index()),
                    }
                }));
            }
            RecordedEvent::Dispatch {
                kind,
                node,
                pointer_id,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": kind,
                    "cat": "Dispatch",
                    "ts": ts,
                    "pid": 0,
                    "tid": DISPATCH_TID.saturating_add(pointer_id),
                    "s": "t",
                    "args": {
                        "node": node.index(),
                        "generation": node.generation(),
                        "pointer_id": pointer_id,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use strata_core::scene::NodeId;
    use strata_core::trace::{DispatchEvent, FrameBeginEvent, FrameEndEvent, TraceSink};

    fn parse(out: Vec<u8>) -> Vec<Value> {
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn frames_become_spans() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            dirty_layers: 1,
            changed_nodes: 4,
        });
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 1,
            repainted_layers: 1,
            picking_passes: 1,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed = parse(out);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Frame");
        assert_eq!(parsed[0]["args"]["changed_nodes"], 4);
        assert_eq!(parsed[1]["ph"], "E");
    }

    #[test]
    fn dispatches_land_on_pointer_tracks() {
        let mut rec = RecorderSink::new();
        for pointer_id in [0, 3] {
            rec.on_dispatch(&DispatchEvent {
                kind: "pointerdown",
                node: NodeId::from_raw_parts(1, 0),
                pointer_id,
            });
        }

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed = parse(out);

        assert_eq!(parsed[0]["name"], "pointerdown");
        assert_eq!(parsed[0]["tid"], 2);
        assert_eq!(parsed[1]["tid"], 5);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        assert!(parse(out).is_empty());
    }
}
