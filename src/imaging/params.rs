//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides how an export is produced) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality on a `0.0..=1.0` scale. Clamped on construction.
//! - [`CropRect`] — Axis-aligned crop region in source pixel coordinates.
//! - [`CropSelection`] — Either an explicit [`CropRect`] or a centered square, resolved
//!   once the source dimensions are known.

use super::backend::Dimensions;
use super::calculations::centered_square_crop;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (0.0-1.0).
///
/// Higher means larger, more faithful output. The JPEG encoder works on an
/// integer 1-100 scale; [`Quality::percent`] performs that mapping.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Encoder quality on the 1-100 scale, rounded to the nearest step.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Step down by `step`, never going below `floor`.
    pub fn lowered(self, step: f32, floor: Quality) -> Self {
        Self::new((self.0 - step).max(floor.0))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.92)
    }
}

/// Crop rectangle in source pixel coordinates.
///
/// Produced by whatever selects the crop (the CLI flags or an interactive
/// cropper). Expected to be square and inside the source, but the resampler
/// clamps rather than trusting either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

impl std::str::FromStr for CropRect {
    type Err = String;

    /// Parse `X,Y,W,H`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected X,Y,W,H but got '{s}'"));
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|e| format!("invalid crop value '{part}': {e}"))?;
        }
        let [x, y, width, height] = values;
        Ok(Self::new(x, y, width, height))
    }
}

/// How the crop is chosen for an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropSelection {
    /// Use this rectangle as given (clamped later).
    Rect(CropRect),
    /// Largest centered square, shrunk by `zoom`.
    Centered { zoom: f64 },
}

impl CropSelection {
    pub fn resolve(self, source: Dimensions) -> CropRect {
        match self {
            CropSelection::Rect(crop) => crop,
            CropSelection::Centered { zoom } => centered_square_crop(source, zoom),
        }
    }
}

impl From<CropRect> for CropSelection {
    fn from(crop: CropRect) -> Self {
        CropSelection::Rect(crop)
    }
}
