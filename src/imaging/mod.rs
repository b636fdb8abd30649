//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::load_from_memory` |
//! | **Crop + resample** | `crop_imm` + Lanczos3 `resize` |
//! | **Encode → JPEG** | `JpegEncoder` inside a bounded quality search |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: [`Quality`], [`CropRect`], and [`CropSelection`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, RasterSurface};
pub use calculations::{aspect_ratio, centered_square_crop, clamp_crop, is_near_square};
pub use operations::{
    EncodeConfig, EncodedImage, Export, MAX_OUTPUT_SIZE, encode_within_budget, export, load,
    resample,
};
pub use params::{CropRect, CropSelection, Quality};
pub use rust_backend::RustBackend;
