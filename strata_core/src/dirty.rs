// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene store uses multi-channel dirty tracking (via [`understory_dirty`])
//! to defer recomputation of inherited node state until somebody asks for it.
//!
//! # Propagation semantics
//!
//! Mutations only mark the node that changed. Inherited channels carry a
//! dependency edge from every child to its parent, and the resolution pass
//! drains them with `affected()`, so descendants are recomputed at drain time
//! instead of being visited on every mutation:
//!
//! - **Inherited**: [`TRANSFORM`], [`APPEARANCE`] (alpha and visibility),
//!   [`INTERACTIVITY`] and [`LAYER`].
//! - **Local-only**: [`CONTENT`] is marked when a command list, text,
//!   picture or mask changes. Only the marked node needs repainting.
//! - **Structural**: [`TOPOLOGY`] is marked on attach, detach, creation and
//!   disposal. It triggers a traversal-order rebuild.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Resolution accumulates the
//! drained results into [`FrameChanges`](crate::scene::FrameChanges), which
//! the renderer takes once per frame to decide which layers need a repaint.

use understory_dirty::Channel;

/// Local matrix inputs changed; world matrices of the subtree are stale.
pub const TRANSFORM: Channel = Channel::new(0);

/// Alpha or visibility changed; compound alpha and effective visibility of
/// the subtree are stale.
pub const APPEARANCE: Channel = Channel::new(1);

/// Interactive flags changed; effective interactivity of the subtree is
/// stale.
pub const INTERACTIVITY: Channel = Channel::new(2);

/// Layer assignment changed; effective layer of the subtree is stale.
pub const LAYER: Channel = Channel::new(3);

/// Drawable content changed; no propagation needed.
pub const CONTENT: Channel = Channel::new(4);

/// Tree topology changed; triggers a traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(5);
