// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous picture completion.
//!
//! Decoding happens wherever the bytes arrive: a loader thread, a network
//! callback, or inline. Results travel through a channel and are applied at
//! the start of the next frame, so a render pass never waits for a decoder.

use std::sync::mpsc::{Receiver, Sender, channel};

use strata_core::picture::{ImageData, LoadTicket};
use strata_core::scene::{NodeId, SceneStore};

use crate::error::ImageError;

/// Decodes PNG or JPEG bytes into straight RGBA pixels.
///
/// `origin_clean == false` marks the result tainted.
pub fn decode_image(bytes: &[u8], origin_clean: bool) -> Result<ImageData, ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let data = ImageData::new(width, height, rgba.into_raw())
        .ok_or(ImageError::Size { width, height })?;
    Ok(if origin_clean { data } else { data.tainted() })
}

/// A finished load waiting to be applied.
#[derive(Debug)]
struct Completion {
    node: NodeId,
    ticket: LoadTicket,
    result: Result<ImageData, ImageError>,
}

/// Sending half of an [`ImageQueue`]. Cheap to clone and `Send`.
#[derive(Clone, Debug)]
pub struct ImageSender {
    tx: Sender<Completion>,
}

impl ImageSender {
    /// Reports a finished load.
    ///
    /// Returns `false` if the queue has been dropped.
    pub fn complete(
        &self,
        node: NodeId,
        ticket: LoadTicket,
        result: Result<ImageData, ImageError>,
    ) -> bool {
        self.tx
            .send(Completion {
                node,
                ticket,
                result,
            })
            .is_ok()
    }

    /// Decodes `bytes` on the calling thread and reports the outcome.
    pub fn complete_encoded(
        &self,
        node: NodeId,
        ticket: LoadTicket,
        bytes: &[u8],
        origin_clean: bool,
    ) -> bool {
        self.complete(node, ticket, decode_image(bytes, origin_clean))
    }
}

/// Outcome of one applied completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageUpdate {
    /// The picture is now drawable.
    Ready(NodeId),
    /// Decoding failed; the node carries
    /// [`decode_failed`](strata_core::scene::NodeFlags::decode_failed).
    Failed(NodeId),
}

/// Receiving half: owned by the renderer and drained once per frame.
#[derive(Debug)]
pub struct ImageQueue {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Default for ImageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Returns a sender for loaders.
    #[must_use]
    pub fn sender(&self) -> ImageSender {
        ImageSender {
            tx: self.tx.clone(),
        }
    }

    /// Applies every pending completion to `scene`.
    ///
    /// Completions for disposed nodes, non-picture nodes and superseded
    /// tickets are dropped. Applied completions mark the node's content
    /// dirty.
    pub fn drain_into(&self, scene: &mut SceneStore) -> Vec<ImageUpdate> {
        let mut updates = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            let Ok(picture) = scene.picture_mut(done.node) else {
                continue;
            };
            let image = done.result.ok();
            let failed = image.is_none();
            if !picture.complete(done.ticket, image) {
                continue;
            }
            if let Ok(mut flags) = scene.flags(done.node) {
                flags.decode_failed = failed;
                let _ = scene.set_flags(done.node, flags);
            }
            updates.push(if failed {
                ImageUpdate::Failed(done.node)
            } else {
                ImageUpdate::Ready(done.node)
            });
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::thread;

    use image::{ImageFormat, Rgba, RgbaImage};
    use strata_core::picture::{Picture, PictureSource};

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let data = decode_image(&png_bytes(), true).unwrap();
        assert_eq!((data.width(), data.height()), (2, 3));
        assert_eq!(&data.pixels()[..4], &[10, 20, 30, 255]);
        assert!(data.origin_clean());
        assert!(!decode_image(&png_bytes(), false).unwrap().origin_clean());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            decode_image(b"not an image", true),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn completion_from_another_thread_is_applied_on_drain() {
        let mut scene = SceneStore::new();
        let node = scene.create_picture(Picture::new());
        let ticket = scene.picture_mut(node).unwrap().begin_load();
        let queue = ImageQueue::new();
        let sender = queue.sender();
        let bytes = png_bytes();
        thread::spawn(move || sender.complete_encoded(node, ticket, &bytes, true))
            .join()
            .unwrap();

        assert_eq!(scene.picture(node).unwrap().source(), &PictureSource::Pending);
        let _ = scene.evaluate();
        assert_eq!(queue.drain_into(&mut scene), vec![ImageUpdate::Ready(node)]);
        assert!(scene.picture(node).unwrap().image().is_some());
        assert!(scene.evaluate().content.contains(&node.index()));
    }

    #[test]
    fn failures_flag_the_node() {
        let mut scene = SceneStore::new();
        let node = scene.create_picture(Picture::new());
        let ticket = scene.picture_mut(node).unwrap().begin_load();
        let queue = ImageQueue::new();
        queue.sender().complete_encoded(node, ticket, b"junk", true);
        assert_eq!(queue.drain_into(&mut scene), vec![ImageUpdate::Failed(node)]);
        assert!(scene.flags(node).unwrap().decode_failed);
        assert_eq!(scene.picture(node).unwrap().source(), &PictureSource::Failed);
    }

    #[test]
    fn stale_tickets_and_disposed_nodes_are_ignored() {
        let mut scene = SceneStore::new();
        let node = scene.create_picture(Picture::new());
        let old = scene.picture_mut(node).unwrap().begin_load();
        let _new = scene.picture_mut(node).unwrap().begin_load();
        let queue = ImageQueue::new();
        queue.sender().complete_encoded(node, old, &png_bytes(), true);
        assert!(queue.drain_into(&mut scene).is_empty());

        let gone = scene.create_picture(Picture::new());
        let ticket = scene.picture_mut(gone).unwrap().begin_load();
        scene.dispose(gone).unwrap();
        queue.sender().complete_encoded(gone, ticket, &png_bytes(), true);
        assert!(queue.drain_into(&mut scene).is_empty());
    }
}
