//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! configuration, clamp inputs into range, and call the backend.
//!
//! The export pipeline is `load → resample → encode_within_budget`:
//!
//! ```text
//! bytes ──load──▶ RasterSurface ──resample(crop, N)──▶ N×N surface ──encode──▶ EncodedImage
//! ```

use super::backend::{BackendError, Dimensions, ImageBackend, RasterSurface};
use super::calculations::clamp_crop;
use super::params::{CropRect, CropSelection, Quality};
use log::{debug, info, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Media type of every export.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Largest output side in pixels. A 10000×10000 RGB surface is already 300 MB.
pub const MAX_OUTPUT_SIZE: u32 = 10_000;

/// Quality schedule and byte budget for the size-constrained encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeConfig {
    /// Upper bound on the encoded size in bytes.
    pub max_bytes: usize,
    /// Quality of the first attempt.
    pub initial: Quality,
    /// Amount subtracted from the quality on each retry.
    pub step: f32,
    /// Quality never drops below this.
    pub floor: Quality,
    /// Retries after the first encode.
    pub max_attempts: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            max_bytes: 240 * 1024,
            initial: Quality::new(0.92),
            step: 0.07,
            floor: Quality::new(0.5),
            max_attempts: 8,
        }
    }
}

/// A finished JPEG encoding.
///
/// Immutable once produced. `quality` and `encode_calls` record how the
/// search arrived at it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    pub media_type: &'static str,
    pub quality: Quality,
    pub encode_calls: u32,
}

impl EncodedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the encoding fits in `max_bytes`.
    pub fn within(&self, max_bytes: usize) -> bool {
        self.len() <= max_bytes
    }
}

/// Decode raw bytes into a surface at the image's natural size.
pub fn load(backend: &impl ImageBackend, bytes: &[u8]) -> Result<RasterSurface> {
    let surface = backend.decode(bytes)?;
    info!(
        "Decoded {} bytes into a {} surface",
        bytes.len(),
        surface.dimensions()
    );
    Ok(surface)
}

/// Crop `crop` out of `surface` and resample it to exactly `size × size`.
///
/// The crop is clamped into the surface bounds first, and `size` is clamped
/// to `1..=MAX_OUTPUT_SIZE`. A surface with no pixels yields a blank output
/// instead of an error.
pub fn resample(
    backend: &impl ImageBackend,
    surface: &RasterSurface,
    crop: CropRect,
    size: u32,
) -> Result<RasterSurface> {
    let size = if size > MAX_OUTPUT_SIZE {
        warn!("Output size {size} exceeds {MAX_OUTPUT_SIZE}; clamped");
        MAX_OUTPUT_SIZE
    } else {
        size.max(1)
    };
    let source = surface.dimensions();
    if source.is_empty() {
        warn!("Source surface is empty; producing a blank {size}x{size} export");
        return Ok(RasterSurface::blank(size, size));
    }

    let clamped = clamp_crop(crop, source);
    if clamped != crop {
        warn!("Crop {crop} exceeds the {source} source; clamped to {clamped}");
    }
    if !clamped.is_square() {
        debug!("Crop {clamped} is not square; output will be stretched");
    }

    backend.resample(surface, clamped, size)
}

/// Encode `surface` as JPEG, lowering quality until it fits the byte budget.
///
/// The search starts at `config.initial` and steps down by `config.step`
/// (clamped to `config.floor`) for at most `config.max_attempts` retries, so
/// the backend is called at most `1 + max_attempts` times. It assumes a
/// lower quality never produces a larger file for the same pixels; that is a
/// heuristic about lossy encoders, not a guarantee.
///
/// When the budget cannot be met, the lowest-quality attempt is returned
/// rather than an error. Check [`EncodedImage::within`] to see whether the
/// budget was met. Once the last attempt already encoded at the floor's
/// percent, the search stops: a deterministic encoder would only reproduce the
/// same bytes. Steps smaller than one percent keep stepping and may repeat a
/// percent on the way down.
pub fn encode_within_budget(
    backend: &impl ImageBackend,
    surface: &RasterSurface,
    config: &EncodeConfig,
) -> Result<EncodedImage> {
    let mut quality = config.initial;
    let mut bytes = backend.encode_jpeg(surface, quality)?;
    let mut encode_calls = 1;
    debug!("Encode attempt 1: quality {:.2} → {} bytes", quality.value(), bytes.len());

    let mut retries = 0;
    while bytes.len() > config.max_bytes && retries < config.max_attempts {
        let next = quality.lowered(config.step, config.floor);
        if next == config.floor && next.percent() == quality.percent() {
            debug!(
                "Quality {:.2} already encodes at the floor; stopping search",
                quality.value()
            );
            break;
        }
        quality = next;
        bytes = backend.encode_jpeg(surface, quality)?;
        encode_calls += 1;
        retries += 1;
        debug!(
            "Encode attempt {encode_calls}: quality {:.2} → {} bytes",
            quality.value(),
            bytes.len()
        );
    }

    let encoded = EncodedImage {
        bytes,
        media_type: JPEG_MEDIA_TYPE,
        quality,
        encode_calls,
    };
    if !encoded.within(config.max_bytes) {
        warn!(
            "Size budget missed: {} bytes > {} bytes at quality {:.2}",
            encoded.len(),
            config.max_bytes,
            quality.value()
        );
    }
    Ok(encoded)
}

/// Everything one export run produced.
#[derive(Debug, Clone)]
pub struct Export {
    /// Natural dimensions of the decoded source.
    pub source: Dimensions,
    /// The crop actually applied, after clamping.
    pub crop: CropRect,
    /// Dimensions of the resampled surface that was encoded.
    pub output: Dimensions,
    pub encoded: EncodedImage,
    pub budget_met: bool,
}

/// Run the whole pipeline: decode `bytes`, crop, resample to `size`, encode.
///
/// The crop selection is resolved against the decoded dimensions. A missed
/// byte budget is not an error; see [`Export::budget_met`].
pub fn export(
    backend: &impl ImageBackend,
    bytes: &[u8],
    selection: impl Into<CropSelection>,
    size: u32,
    config: &EncodeConfig,
) -> Result<Export> {
    let surface = load(backend, bytes)?;
    let source = surface.dimensions();
    let crop = selection.into().resolve(source);
    let applied = if source.is_empty() {
        crop
    } else {
        clamp_crop(crop, source)
    };

    let resampled = resample(backend, &surface, crop, size)?;
    drop(surface);

    let encoded = encode_within_budget(backend, &resampled, config)?;
    let budget_met = encoded.within(config.max_bytes);
    info!(
        "Exported {} at quality {:.2}: {} bytes after {} encode call(s)",
        resampled.dimensions(),
        encoded.quality.value(),
        encoded.len(),
        encoded.encode_calls
    );

    Ok(Export {
        source,
        crop: applied,
        output: resampled.dimensions(),
        encoded,
        budget_met,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    const KB: usize = 1024;

    #[test]
    fn load_returns_natural_dimensions() {
        let backend = MockBackend::with_dimensions(Dimensions::new(1920, 1080));

        let surface = load(&backend, &[0; 16]).unwrap();
        assert_eq!(surface.dimensions(), Dimensions::new(1920, 1080));
    }

    #[test]
    fn resample_passes_valid_crop_through() {
        let backend = MockBackend::new();
        let surface = RasterSurface::blank(1200, 1200);
        let crop = CropRect::new(300, 300, 600, 600);

        let out = resample(&backend, &surface, crop, 600).unwrap();
        assert_eq!(out.dimensions(), Dimensions::new(600, 600));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Resample { crop, size: 600 }]
        );
    }

    #[test]
    fn resample_clamps_crop_before_backend() {
        let backend = MockBackend::new();
        let surface = RasterSurface::blank(1000, 800);

        resample(&backend, &surface, CropRect::new(700, 600, 500, 500), 600).unwrap();
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Resample {
                crop: CropRect::new(700, 600, 300, 200),
                size: 600
            }]
        );
    }

    #[test]
    fn resample_empty_surface_is_blank_not_error() {
        let backend = MockBackend::new();
        let surface = RasterSurface::blank(0, 0);

        let out = resample(&backend, &surface, CropRect::new(0, 0, 10, 10), 600).unwrap();
        assert_eq!(out.dimensions(), Dimensions::new(600, 600));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn resample_zero_size_is_raised_to_one() {
        let backend = MockBackend::new();
        let surface = RasterSurface::blank(10, 10);

        let out = resample(&backend, &surface, CropRect::new(0, 0, 10, 10), 0).unwrap();
        assert_eq!(out.dimensions(), Dimensions::new(1, 1));
    }

    #[test]
    fn resample_oversized_output_is_clamped() {
        let backend = MockBackend::new();
        let surface = RasterSurface::blank(10, 10);

        resample(&backend, &surface, CropRect::new(0, 0, 10, 10), 100_000).unwrap();
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Resample {
                crop: CropRect::new(0, 0, 10, 10),
                size: MAX_OUTPUT_SIZE
            }]
        );
    }

    #[test]
    fn encode_fits_on_first_try() {
        let backend = MockBackend::with_encode_sizes(vec![100 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &EncodeConfig::default()).unwrap();
        assert_eq!(encoded.len(), 100 * KB);
        assert_eq!(encoded.encode_calls, 1);
        assert_eq!(encoded.quality.percent(), 92);
        assert_eq!(encoded.media_type, "image/jpeg");
        assert_eq!(backend.encode_qualities(), vec![92]);
    }

    #[test]
    fn encode_exactly_at_budget_is_accepted() {
        let backend = MockBackend::with_encode_sizes(vec![240 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &EncodeConfig::default()).unwrap();
        assert!(encoded.within(240 * KB));
        assert_eq!(encoded.encode_calls, 1);
    }

    #[test]
    fn encode_steps_down_until_budget_met() {
        let backend = MockBackend::with_encode_sizes(vec![310 * KB, 260 * KB, 215 * KB, 1]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &EncodeConfig::default()).unwrap();
        assert_eq!(encoded.len(), 215 * KB);
        assert_eq!(encoded.encode_calls, 3);
        assert_eq!(encoded.quality.percent(), 78);
        assert_eq!(backend.encode_qualities(), vec![92, 85, 78]);
    }

    #[test]
    fn encode_exhaustion_returns_floor_attempt() {
        let backend = MockBackend::with_encode_sizes(vec![
            500 * KB,
            480 * KB,
            460 * KB,
            440 * KB,
            420 * KB,
            400 * KB,
            380 * KB,
        ]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &EncodeConfig::default()).unwrap();
        assert!(!encoded.within(240 * KB));
        assert_eq!(encoded.len(), 380 * KB);
        assert_eq!(encoded.quality.percent(), 50);
        assert_eq!(backend.encode_qualities(), vec![92, 85, 78, 71, 64, 57, 50]);
    }

    #[test]
    fn encode_never_exceeds_attempt_ceiling() {
        // Tiny step so the floor is never reached within the attempt budget
        let config = EncodeConfig {
            step: 0.01,
            ..EncodeConfig::default()
        };
        let backend = MockBackend::with_encode_sizes(vec![1024 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &config).unwrap();
        assert_eq!(encoded.encode_calls, 1 + config.max_attempts);
        assert_eq!(backend.encode_qualities().len(), 9);
        assert_eq!(encoded.quality.percent(), 84);
    }

    #[test]
    fn encode_sub_percent_step_keeps_searching() {
        let config = EncodeConfig {
            step: 0.004,
            ..EncodeConfig::default()
        };
        let backend = MockBackend::with_encode_sizes(vec![1024 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &config).unwrap();
        assert_eq!(encoded.encode_calls, 1 + config.max_attempts);
        assert_eq!(encoded.quality.percent(), 89);
        assert!(encoded.quality < Quality::new(0.92));
    }

    #[test]
    fn encode_sub_percent_step_reaches_budget() {
        let config = EncodeConfig {
            step: 0.004,
            ..EncodeConfig::default()
        };
        let backend = MockBackend::with_encode_sizes(vec![300 * KB, 300 * KB, 300 * KB, 200 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &config).unwrap();
        assert!(encoded.within(240 * KB));
        assert_eq!(encoded.encode_calls, 4);
        assert_eq!(backend.encode_qualities(), vec![92, 92, 91, 91]);
    }

    #[test]
    fn encode_stops_once_floor_percent_is_encoded() {
        let config = EncodeConfig {
            initial: Quality::new(0.52),
            step: 0.01,
            ..EncodeConfig::default()
        };
        let backend = MockBackend::with_encode_sizes(vec![1024 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &config).unwrap();
        assert_eq!(backend.encode_qualities(), vec![52, 51, 50]);
        assert_eq!(encoded.quality.percent(), 50);
    }

    #[test]
    fn encode_zero_attempts_encodes_once() {
        let config = EncodeConfig {
            max_attempts: 0,
            ..EncodeConfig::default()
        };
        let backend = MockBackend::with_encode_sizes(vec![1024 * KB]);
        let surface = RasterSurface::blank(600, 600);

        let encoded = encode_within_budget(&backend, &surface, &config).unwrap();
        assert_eq!(encoded.encode_calls, 1);
    }

    #[test]
    fn export_scenario_stops_at_078() {
        let backend = MockBackend {
            decode_results: std::sync::Mutex::new(vec![Dimensions::new(1200, 1200)]),
            encode_sizes: std::sync::Mutex::new(vec![310 * KB, 260 * KB, 215 * KB]),
            ..MockBackend::default()
        };

        let export = export(
            &backend,
            &[0; 32],
            CropRect::new(300, 300, 600, 600),
            600,
            &EncodeConfig::default(),
        )
        .unwrap();

        assert_eq!(export.source, Dimensions::new(1200, 1200));
        assert_eq!(export.output, Dimensions::new(600, 600));
        assert_eq!(export.crop, CropRect::new(300, 300, 600, 600));
        assert!(export.budget_met);
        assert_eq!(export.encoded.len(), 215 * KB);
        assert_eq!(export.encoded.encode_calls, 3);
        assert_eq!(export.encoded.quality.percent(), 78);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], RecordedOp::Decode(32));
        assert!(matches!(ops[1], RecordedOp::Resample { size: 600, .. }));
    }

    #[test]
    fn export_centered_selection_uses_decoded_dimensions() {
        let backend = MockBackend {
            decode_results: std::sync::Mutex::new(vec![Dimensions::new(1000, 1200)]),
            encode_sizes: std::sync::Mutex::new(vec![KB]),
            ..MockBackend::default()
        };

        let export = export(
            &backend,
            &[0; 8],
            CropSelection::Centered { zoom: 1.4 },
            600,
            &EncodeConfig::default(),
        )
        .unwrap();
        assert_eq!(export.crop, CropRect::new(143, 243, 714, 714));
        assert_eq!(
            backend.get_operations()[1],
            RecordedOp::Resample {
                crop: CropRect::new(143, 243, 714, 714),
                size: 600
            }
        );
    }

    #[test]
    fn export_decode_failure_propagates() {
        let backend = MockBackend::new();

        let result = export(
            &backend,
            b"junk",
            CropRect::new(0, 0, 10, 10),
            600,
            &EncodeConfig::default(),
        );
        assert!(matches!(result, Err(BackendError::Decode(_))));
        assert!(backend.encode_qualities().is_empty());
    }

    #[test]
    fn export_reports_budget_miss() {
        let backend = MockBackend {
            decode_results: std::sync::Mutex::new(vec![Dimensions::new(800, 800)]),
            encode_sizes: std::sync::Mutex::new(vec![300 * KB]),
            ..MockBackend::default()
        };

        let export = export(
            &backend,
            &[0; 8],
            CropRect::new(0, 0, 800, 800),
            600,
            &EncodeConfig::default(),
        )
        .unwrap();
        assert!(!export.budget_met);
        assert_eq!(export.encoded.quality.percent(), 50);
    }
}
