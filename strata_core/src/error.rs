// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural error taxonomy for scene mutations and queries.
//!
//! Structural errors are returned synchronously to the caller that issued the
//! offending call and leave the graph untouched. Geometric and resource
//! problems are never reported here; they surface as
//! [`NodeFlags`](crate::scene::NodeFlags) on the affected node instead.

use core::fmt;

use crate::scene::NodeId;

/// An operation on the scene graph was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// The handle refers to a node that has been disposed.
    Disposed(NodeId),
    /// Attaching `child` under `parent` would make `child` its own ancestor.
    Cycle {
        /// The container that was asked to adopt `child`.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },
    /// The node cannot own children.
    NotAContainer(NodeId),
    /// The node does not hold the content kind the operation needs.
    WrongKind {
        /// The node the operation targeted.
        node: NodeId,
        /// The content kind the operation expected.
        expected: &'static str,
    },
    /// The node is not a child of the given container.
    NotAChild {
        /// The container.
        parent: NodeId,
        /// The node that was expected among its children.
        child: NodeId,
    },
    /// A child index was past the end of the child list.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of children.
        len: usize,
    },
    /// A node cannot be its own mask.
    SelfMask(NodeId),
    /// The scene root cannot be disposed, detached or re-attached.
    Root,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposed(id) => write!(f, "node {id:?} has been disposed"),
            Self::Cycle { parent, child } => write!(
                f,
                "attaching {child:?} under {parent:?} would create a cycle"
            ),
            Self::NotAContainer(id) => write!(f, "node {id:?} is not a container"),
            Self::WrongKind { node, expected } => {
                write!(f, "node {node:?} is not a {expected} node")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "node {child:?} is not a child of {parent:?}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "child index {index} out of range (len {len})")
            }
            Self::SelfMask(id) => write!(f, "node {id:?} cannot mask itself"),
            Self::Root => f.write_str("operation is not permitted on the scene root"),
        }
    }
}

impl core::error::Error for SceneError {}
