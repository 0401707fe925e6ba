// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster image content.
//!
//! A picture's pixels arrive asynchronously. The node is created in the
//! [`Pending`](PictureSource::Pending) state, a decoder is handed a
//! [`LoadTicket`], and the decoded result is applied with
//! [`Picture::complete`] on a later frame. Tickets go stale when the source
//! is replaced, so a slow decode can never overwrite a newer image.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

/// Decoded, straight-alpha RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    origin_clean: bool,
}

impl ImageData {
    /// Wraps `width * height * 4` bytes of RGBA8 pixels.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
            origin_clean: true,
        })
    }

    /// Marks the pixels as coming from a foreign origin.
    ///
    /// Tainted images still render on screen but cannot be read back.
    #[must_use]
    pub fn tainted(mut self) -> Self {
        self.origin_clean = false;
        self
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel bytes, row major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the pixels may be read back.
    #[must_use]
    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("origin_clean", &self.origin_clean)
            .finish_non_exhaustive()
    }
}

/// Load state of a picture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PictureSource {
    /// Waiting for a decoder; draws nothing.
    #[default]
    Pending,
    /// Decoded and drawable.
    Ready(ImageData),
    /// Decoding failed; draws nothing.
    Failed,
}

/// Identifies one load request for a picture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// A picture node's content.
#[derive(Clone, Debug, Default)]
pub struct Picture {
    source: PictureSource,
    /// Display size; falls back to the image's pixel size.
    width: Option<f64>,
    height: Option<f64>,
    ticket: u64,
}

impl Picture {
    /// A pending picture with no explicit display size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A picture that is already decoded.
    #[must_use]
    pub fn ready(image: ImageData) -> Self {
        Self {
            source: PictureSource::Ready(image),
            ..Self::default()
        }
    }

    /// Sets the display size in local units.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets or clears the display size.
    pub fn set_size(&mut self, size: Option<(f64, f64)>) {
        self.width = size.map(|s| s.0);
        self.height = size.map(|s| s.1);
    }

    /// Returns the load state.
    #[must_use]
    pub fn source(&self) -> &PictureSource {
        &self.source
    }

    /// Returns the decoded image, if ready.
    #[must_use]
    pub fn image(&self) -> Option<&ImageData> {
        match &self.source {
            PictureSource::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Starts a new load, returning the ticket its completion must present.
    ///
    /// Any earlier outstanding ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.ticket += 1;
        self.source = PictureSource::Pending;
        LoadTicket(self.ticket)
    }

    /// Applies a finished load.
    ///
    /// Returns `false` and changes nothing if the ticket is stale.
    pub fn complete(&mut self, ticket: LoadTicket, image: Option<ImageData>) -> bool {
        if ticket.0 != self.ticket {
            return false;
        }
        self.source = match image {
            Some(image) => PictureSource::Ready(image),
            None => PictureSource::Failed,
        };
        true
    }

    /// Whether the current image is tainted.
    #[must_use]
    pub fn is_tainted(&self) -> bool {
        self.image().is_some_and(|i| !i.origin_clean())
    }

    /// Display rectangle in local units.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let (w, h) = self.display_size()?;
        Some(Rect::new(0.0, 0.0, w, h))
    }

    /// Display size: explicit if set, otherwise the image's pixel size.
    #[must_use]
    pub fn display_size(&self) -> Option<(f64, f64)> {
        if let (Some(w), Some(h)) = (self.width, self.height) {
            return Some((w, h));
        }
        let image = self.image()?;
        Some((f64::from(image.width), f64::from(image.height)))
    }
}
