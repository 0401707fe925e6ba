// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`SceneStore`](super::SceneStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is disposed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Rebuilds a handle from [`index`](Self::index) and
    /// [`generation`](Self::generation), for example when reading back a
    /// recording. The handle is only meaningful to the store that issued it.
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index.
    ///
    /// Raw indices are what [`FrameChanges`](super::FrameChanges) and
    /// [`traversal_order`](super::SceneStore::traversal_order) report.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}
