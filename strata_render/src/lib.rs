// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered CPU rendering and color-coded hit testing for `strata` scenes.
//!
//! A [`Renderer`] owns a [`SceneStore`](strata_core::scene::SceneStore) and
//! draws it with `tiny-skia`:
//!
//! - [`Layer`]: one raster surface per layer order, with a margin, a
//!   visibility flag and a dirty flag. Only dirty, visible layers repaint.
//! - [`PickingSurface`] and [`ColorRegistry`]: interactive nodes are painted
//!   a second time in flat, unique colors; [`Renderer::hit_test`] reads back
//!   one pixel and maps its color to a node.
//! - [`ImageQueue`]: picture loads complete from any thread and are applied
//!   at the start of the next frame.
//! - [`Renderer::rasterize`]: export at an arbitrary scale, leaving out
//!   tainted pictures.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use strata_core::color::Color;
//! use strata_core::graphics::Graphics;
//! use strata_render::{Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::new(RendererConfig::with_size(64.0, 64.0)).unwrap();
//! let root = renderer.root();
//! let mut square = Graphics::new();
//! square
//!     .begin_fill(Color::rgb(200, 40, 40))
//!     .rect(Rect::new(0.0, 0.0, 10.0, 10.0))
//!     .end_fill();
//! let scene = renderer.scene_mut();
//! let node = scene.create_graphics(square);
//! scene.set_interactive(node, true).unwrap();
//! scene.add_child(root, node).unwrap();
//!
//! renderer.render().unwrap();
//! assert_eq!(renderer.hit_test(Point::new(5.0, 5.0)), Some(node));
//! assert_eq!(renderer.hit_test(Point::new(20.0, 20.0)), None);
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Forwards to `strata_core/trace`, so
//!   [`Renderer::render_traced`] and [`Renderer::hit_test_traced`] report to
//!   the given sink.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod context;
mod error;
mod export;
mod image_queue;
mod layer;
mod pass;
mod picking;
mod renderer;

pub use error::{ImageError, RenderError};
pub use export::{Raster, RasterizeOptions};
pub use image_queue::{ImageQueue, ImageSender, ImageUpdate, decode_image};
pub use layer::{Layer, backing_size};
pub use picking::{ColorRegistry, PickingSurface, decode_id, encode_id};
pub use renderer::{FrameReport, Renderer, RendererConfig};
