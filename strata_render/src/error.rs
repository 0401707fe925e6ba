// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render and image-decoding errors.

use std::fmt;

use strata_core::error::SceneError;

/// A renderer operation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// A raster surface of this pixel size could not be allocated.
    SurfaceAllocation {
        /// Requested width in device pixels.
        width: u32,
        /// Requested height in device pixels.
        height: u32,
    },
    /// A scene operation was rejected.
    Scene(SceneError),
    /// The operation needs a completed frame.
    NotRendered,
    /// PNG encoding failed.
    Encode(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceAllocation { width, height } => {
                write!(f, "cannot allocate a {width}x{height} surface")
            }
            Self::Scene(e) => write!(f, "scene error: {e}"),
            Self::NotRendered => f.write_str("no frame has been rendered yet"),
            Self::Encode(msg) => write!(f, "PNG encoding failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scene(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SceneError> for RenderError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

/// Encoded picture bytes could not be turned into pixels.
#[derive(Debug)]
pub enum ImageError {
    /// The decoder rejected the data.
    Decode(image::ImageError),
    /// The decoded pixel buffer did not match its reported size.
    Size {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "image decoding failed: {e}"),
            Self::Size { width, height } => {
                write!(f, "decoded pixels do not match a {width}x{height} image")
            }
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Size { .. } => None,
        }
    }
}

impl From<image::ImageError> for ImageError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e)
    }
}
