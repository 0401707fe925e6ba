// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract between the renderer and event dispatch.
//!
//! Dispatch never talks to a raster surface or to the scene store directly.
//! It asks a [`HitTest`] host which node is under a point and walks the
//! ancestor chain through the same host. The renderer is the production
//! implementation; tests can drive dispatch with a hand-written host.

use kurbo::Point;

use crate::scene::NodeId;

/// Point-to-node queries and the scene facts event bubbling needs.
pub trait HitTest {
    /// Returns the interactive node painted at `point` (CSS pixels), if any.
    ///
    /// Results reflect the last completed render and are only valid until
    /// the next mutation.
    fn hit_test(&mut self, point: Point) -> Option<NodeId>;

    /// Returns the parent of `node`, or `None` for a root or a stale handle.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns whether `node` still refers to a live node.
    fn is_alive(&self, node: NodeId) -> bool;

    /// Returns whether `node` is effectively interactive.
    fn is_interactive(&mut self, node: NodeId) -> bool;
}
