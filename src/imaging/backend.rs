//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three pixel operations the export
//! pipeline needs: decode, resample, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, built on the
//! `image` crate. Tests swap in a recording mock so the quality search can be
//! exercised against scripted encoder output sizes.

use super::params::{CropRect, Quality};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read this file: {0}")]
    Decode(String),
    #[error("Render target unavailable: {0}")]
    RenderTargetUnavailable(String),
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Natural pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// A decoded RGB8 pixel grid.
///
/// Every transformation produces a new surface; nothing mutates a surface
/// after it has been handed to the next stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    pixels: RgbImage,
}

impl RasterSurface {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// An all-black surface of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbImage::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// Trait for image processing backends.
///
/// Implementations must be deterministic: the same inputs produce the same
/// pixels and the same encoded bytes. The encoder search relies on this.
pub trait ImageBackend {
    /// Decode raw image bytes into a surface at its natural size.
    fn decode(&self, bytes: &[u8]) -> Result<RasterSurface, BackendError>;

    /// Resample `crop` (already clamped into bounds) to exactly `size × size`.
    fn resample(
        &self,
        surface: &RasterSurface,
        crop: CropRect,
        size: u32,
    ) -> Result<RasterSurface, BackendError>;

    /// Encode the surface as JPEG at the given quality.
    fn encode_jpeg(
        &self,
        surface: &RasterSurface,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
