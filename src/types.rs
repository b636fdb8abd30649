//! Shared types passed between the pipeline, the compliance evaluator, and
//! the CLI's `--json` output.

use crate::compliance::ComplianceCheck;
use crate::imaging::{CropRect, Dimensions, Export};
use serde::Serialize;
use std::path::Path;

/// What is known about the user's original file, independent of decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    /// File name as the user supplied it (no directory).
    pub name: String,
    /// Media type sniffed from the file's leading bytes, if recognizable.
    pub media_type: Option<String>,
    pub size_bytes: u64,
}

impl FileMeta {
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let media_type = image::guess_format(bytes)
            .ok()
            .map(|format| format.to_mime_type().to_string());
        Self {
            name,
            media_type,
            size_bytes: bytes.len() as u64,
        }
    }
}

/// Machine-readable summary of one `export` or `check` run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub file: FileMeta,
    /// Natural dimensions of the source, when it could be decoded.
    pub source: Option<Dimensions>,
    /// Present only when an export was produced.
    pub export: Option<ExportSummary>,
    pub checks: Vec<ComplianceCheck>,
}

/// The parts of an [`Export`] worth reporting (no pixel data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    /// Where the encoded file was written.
    pub path: String,
    pub crop: CropRect,
    pub dimensions: Dimensions,
    pub media_type: String,
    pub size_bytes: usize,
    /// Encoder quality rounded to the two decimals it was encoded at.
    pub quality: f64,
    pub encode_calls: u32,
    pub budget_met: bool,
}

impl ExportSummary {
    pub fn new(export: &Export, path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            crop: export.crop,
            dimensions: export.output,
            media_type: export.encoded.media_type.to_string(),
            size_bytes: export.encoded.len(),
            quality: f64::from(export.encoded.quality.percent()) / 100.0,
            encode_calls: export.encoded.encode_calls,
            budget_met: export.budget_met,
        }
    }
}
