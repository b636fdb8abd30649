//! # dv-photo
//!
//! Turns an arbitrary photograph into an identity-photo export that meets a
//! fixed format: a square JPEG of exact pixel dimensions (600×600 by default)
//! that fits a byte budget (240 KB by default).
//!
//! # Architecture: Crop-to-Target-Size Pipeline
//!
//! ```text
//! 1. Load       bytes           →  RasterSurface   (natural dimensions)
//! 2. Resample   surface + crop  →  N×N surface     (Lanczos3, crop clamped)
//! 3. Encode     N×N surface     →  EncodedImage    (bounded quality search)
//! 4. Evaluate   file + dims + export  →  compliance checklist
//! ```
//!
//! Stages 1–3 live in [`imaging`] behind the [`imaging::ImageBackend`] trait,
//! so the quality search can be tested against a mock encoder with scripted
//! output sizes. Stage 4 is the pure [`compliance::evaluate`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decode, crop + resample, size-constrained JPEG encoding |
//! | [`compliance`] | Ordered pass/warn/fail checklist and head/eye guide bands |
//! | [`config`] | `dv-photo.toml` loading, merging over stock defaults, validation |
//! | [`types`] | File metadata and the serializable run report |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Graceful Degradation
//!
//! The encoder never fails because a budget is unreachable. It steps quality
//! down from 0.92 by 0.07 (never below 0.5) for at most 8 retries and returns
//! the last attempt either way. A miss shows up as `budget_met == false` and
//! as a failing budget check, which tells the user to try another crop.
//!
//! ## Explicit Configuration
//!
//! Output size, budget, and the quality schedule are carried in an
//! [`config::ExportConfig`] value passed into the pipeline rather than read
//! from globals, so tests can run the same code against tiny budgets.
//!
//! ## Clamp, Don't Fail
//!
//! A crop rectangle that overhangs the source, or has zero size, is clamped
//! into range and the export proceeds. Only undecodable input and an encoder
//! that cannot produce output are errors.

pub mod compliance;
pub mod config;
pub mod imaging;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
