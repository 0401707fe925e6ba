// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for rendering, picking and dispatch.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the render pass, hit testing and event dispatch call at each stage. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.

use crate::scene::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a render pass starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Number of layers that will be repainted.
    pub dirty_layers: u32,
    /// Number of nodes reported by scene resolution.
    pub changed_nodes: u32,
}

/// Emitted when a render pass ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of layers repainted.
    pub repainted_layers: u32,
    /// Number of picking passes run.
    pub picking_passes: u32,
}

/// Emitted after one visible layer has been repainted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerRepaintEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Layer order key.
    pub order: i32,
    /// Nodes that painted into the layer.
    pub painted_nodes: u32,
}

/// Emitted after one picking pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickingPassEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Layer order this pass targeted.
    pub layer_order: i32,
    /// Nodes that painted a picking color.
    pub painted_nodes: u32,
}

/// Emitted for every hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitTestEvent {
    /// Query point, in CSS pixels.
    pub x: f64,
    /// Query point, in CSS pixels.
    pub y: f64,
    /// Resolved node.
    pub node: Option<NodeId>,
}

/// Emitted for every event delivered to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchEvent {
    /// Event kind name.
    pub kind: &'static str,
    /// Receiving node.
    pub node: NodeId,
    /// Pointer that caused the event.
    pub pointer_id: u32,
}

/// Which node flag was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeFlag {
    /// Picture pixels are not readable.
    Tainted,
    /// Picture decoding failed.
    DecodeFailed,
    /// World matrix is not invertible.
    DegenerateTransform,
    /// Mask was disposed.
    StaleMask,
}

/// Emitted when a node flag is raised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFlagEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Affected node.
    pub node: NodeId,
    /// The flag.
    pub flag: NodeFlag,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a render pass starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a render pass ends.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called after a layer repaint.
    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        _ = e;
    }

    /// Called after a picking pass.
    fn on_picking_pass(&mut self, e: &PickingPassEvent) {
        _ = e;
    }

    /// Called for every hit test.
    fn on_hit_test(&mut self, e: &HitTestEvent) {
        _ = e;
    }

    /// Called for every delivered event.
    fn on_dispatch(&mut self, e: &DispatchEvent) {
        _ = e;
    }

    /// Called when a node flag is raised.
    fn on_node_flag(&mut self, e: &NodeFlagEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($(#[$doc:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    emit!(
        /// Emits a [`FrameBeginEvent`].
        frame_begin, on_frame_begin, FrameBeginEvent
    );
    emit!(
        /// Emits a [`FrameEndEvent`].
        frame_end, on_frame_end, FrameEndEvent
    );
    emit!(
        /// Emits a [`LayerRepaintEvent`].
        layer_repaint, on_layer_repaint, LayerRepaintEvent
    );
    emit!(
        /// Emits a [`PickingPassEvent`].
        picking_pass, on_picking_pass, PickingPassEvent
    );
    emit!(
        /// Emits a [`HitTestEvent`].
        hit_test, on_hit_test, HitTestEvent
    );
    emit!(
        /// Emits a [`DispatchEvent`].
        dispatch, on_dispatch, DispatchEvent
    );
    emit!(
        /// Emits a [`NodeFlagEvent`].
        node_flag, on_node_flag, NodeFlagEvent
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> FrameBeginEvent {
        FrameBeginEvent {
            frame_index: 42,
            dirty_layers: 2,
            changed_nodes: 7,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&sample_begin());
        sink.on_hit_test(&HitTestEvent {
            x: 1.0,
            y: 2.0,
            node: None,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_begin(&sample_begin());
        tracer.frame_end(&FrameEndEvent {
            frame_index: 42,
            repainted_layers: 2,
            picking_passes: 1,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            frames: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
                self.frames.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { frames: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_begin(&sample_begin());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.frames, &[42]);
    }
}
