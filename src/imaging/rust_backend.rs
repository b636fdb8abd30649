//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Crop | `image::imageops::crop_imm` |
//! | Resample | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, ImageBackend, RasterSurface};
use super::params::{CropRect, Quality};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// Formats whose decoders are compiled in.
const INPUT_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

/// MIME types of the input formats this backend can decode.
pub fn supported_input_types() -> Vec<&'static str> {
    INPUT_FORMATS
        .iter()
        .filter(|fmt| fmt.reading_enabled())
        .map(|fmt| fmt.to_mime_type())
        .collect()
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RasterSurface, BackendError> {
        let img =
            image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        // JPEG has no alpha channel; transparent pixels flatten to their RGB values.
        Ok(RasterSurface::new(img.to_rgb8()))
    }

    fn resample(
        &self,
        surface: &RasterSurface,
        crop: CropRect,
        size: u32,
    ) -> Result<RasterSurface, BackendError> {
        let region = imageops::crop_imm(surface.pixels(), crop.x, crop.y, crop.width, crop.height)
            .to_image();
        // Stretch-to-fit: a non-square crop is distorted rather than letterboxed.
        let resized = imageops::resize(&region, size, size, FilterType::Lanczos3);
        if resized.width() != size || resized.height() != size {
            return Err(BackendError::RenderTargetUnavailable(format!(
                "expected {size}x{size} surface, got {}x{}",
                resized.width(),
                resized.height()
            )));
        }
        Ok(RasterSurface::new(resized))
    }

    fn encode_jpeg(
        &self,
        surface: &RasterSurface,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let pixels = surface.pixels();
        let mut buf = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.percent())
            .write_image(
                pixels.as_raw(),
                pixels.width(),
                pixels.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::EncodeFailed(format!("JPEG encode failed: {e}")))?;
        if buf.is_empty() {
            return Err(BackendError::RenderTargetUnavailable(
                "encoder produced no output".into(),
            ));
        }
        Ok(buf)
    }
}
