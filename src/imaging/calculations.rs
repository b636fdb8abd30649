//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::CropRect;

/// Clamp a crop rectangle so it lies fully inside the source.
///
/// The origin is pulled back to the last valid column/row, and the size is
/// shrunk to what remains (at least 1px). A zero-area source is the caller's
/// problem: the result is meaningless and must not be used to read pixels.
///
/// # Examples
/// ```
/// # use dv_photo::imaging::{CropRect, Dimensions, clamp_crop};
/// let source = Dimensions::new(1000, 800);
/// // Overhangs the right edge by 100px
/// let clamped = clamp_crop(CropRect::new(600, 0, 500, 500), source);
/// assert_eq!(clamped, CropRect::new(600, 0, 400, 500));
/// ```
pub fn clamp_crop(crop: CropRect, source: Dimensions) -> CropRect {
    let x = crop.x.min(source.width.saturating_sub(1));
    let y = crop.y.min(source.height.saturating_sub(1));
    let width = crop.width.clamp(1, (source.width - x).max(1));
    let height = crop.height.clamp(1, (source.height - y).max(1));
    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// The largest square crop centered on the source, shrunk by `zoom`.
///
/// `zoom` is clamped to at least 1.0 (no zooming out past the short edge).
///
/// # Examples
/// ```
/// # use dv_photo::imaging::{CropRect, Dimensions, centered_square_crop};
/// // 1200x1200 at zoom 2 → 600px square in the middle
/// assert_eq!(
///     centered_square_crop(Dimensions::new(1200, 1200), 2.0),
///     CropRect::new(300, 300, 600, 600),
/// );
/// ```
pub fn centered_square_crop(source: Dimensions, zoom: f64) -> CropRect {
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let short_edge = source.width.min(source.height);
    let side = ((short_edge as f64 / zoom).round() as u32).clamp(1, short_edge.max(1));
    CropRect {
        x: source.width.saturating_sub(side) / 2,
        y: source.height.saturating_sub(side) / 2,
        width: side,
        height: side,
    }
}

/// Aspect ratio `width / height`, or `None` for a zero height.
pub fn aspect_ratio(dims: Dimensions) -> Option<f64> {
    (dims.height != 0).then(|| dims.width as f64 / dims.height as f64)
}

/// Whether the image is within `tolerance` of a 1:1 aspect ratio.
pub fn is_near_square(dims: Dimensions, tolerance: f64) -> bool {
    aspect_ratio(dims).is_some_and(|ratio| (ratio - 1.0).abs() < tolerance)
}
