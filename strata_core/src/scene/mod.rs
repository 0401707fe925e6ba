// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is a unit of the scene graph. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is disposed, so use-after-dispose is reported as
//!   [`SceneError::Disposed`](crate::error::SceneError::Disposed) instead of
//!   silently touching a recycled slot.
//! - Topology: parent, first-child and sibling links forming an ordered tree.
//!   Only [`NodeContent::Container`] nodes take children. Child order is
//!   paint order.
//! - **Local properties** set by the caller: transform inputs
//!   ([`set_transform_property`](SceneStore::set_transform_property)),
//!   [`alpha`](SceneStore::set_alpha), [`visibility`](SceneStore::set_visible),
//!   [`interactivity`](SceneStore::set_interactive), an optional
//!   [`mask`](SceneStore::set_mask) and an optional
//!   [`layer`](SceneStore::set_layer).
//! - **Computed properties** produced by resolution: world matrix, compound
//!   alpha, effective visibility, effective interactivity and effective
//!   layer order.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//! The store owns a root container; only nodes reachable from it are drawn.
//!
//! # Dirty tracking
//!
//! Mutations mark the corresponding dirty channel on the changed node only
//! (see [`dirty`](crate::dirty)). Nothing is recomputed until a derived value
//! is requested or [`evaluate`](SceneStore::evaluate) runs; descendants are
//! picked up through parent dependency edges when the channel is drained.

mod content;
mod evaluate;
mod id;
mod store;
mod traverse;

pub use content::{
    LayerMargin, NodeContent, NodeFlags, NodeKind, TransformProperty, TransformProps,
};
pub use evaluate::FrameChanges;
pub use id::{INVALID, NodeId};
pub use store::SceneStore;
pub use traverse::{Ancestors, Children};
