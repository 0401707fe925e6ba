// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::SceneStore;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`SceneStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a SceneStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a SceneStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}

/// An iterator from a node's parent up to the top of its tree.
///
/// Created by [`SceneStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a SceneStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a SceneStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(NodeId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
