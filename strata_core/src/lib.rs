// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph, transforms and vector command lists for a layered 2D
//! renderer.
//!
//! `strata_core` holds everything about a scene that does not touch pixels.
//! Nodes live in a struct-of-arrays arena with generational handles; inherited
//! state is resolved lazily; drawing content is recorded, not executed.
//!
//! # Architecture
//!
//! ```text
//!   caller mutations
//!       │
//!       ▼
//!   SceneStore (dirty marks) ──► SceneStore::evaluate() ──► FrameChanges
//!                                                                │
//!                 ┌──────────────────────────────────────────────┘
//!                 ▼
//!   Renderer: layer pass + picking pass ──► Graphics::replay(Painter)
//!                 │
//!                 ▼
//!   HitTest::hit_test(point) ──► Dispatcher (bubbling)
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles.
//! Transform inputs, alpha, visibility, interactivity, masks and layers are
//! set by the caller; world matrices and compound state come from
//! resolution.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`transform`]**: 2D affine matrix with the node local-matrix builder.
//!
//! **[`graphics`]**: Command lists, the path string parser and replay into a
//! [`Painter`](graphics::Painter).
//!
//! **[`text`]**: Style markup, line breaking and optional font outlines.
//!
//! **[`picture`]**: Raster image content with asynchronous load state.
//!
//! **[`host`]**: The [`HitTest`](host::HitTest) contract between the renderer
//! and event dispatch.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod color;
pub mod dirty;
pub mod error;
pub mod graphics;
pub mod host;
pub mod picture;
pub mod scene;
pub mod text;
pub mod trace;
pub mod transform;
