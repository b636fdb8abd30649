//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Export
//!
//! ```text
//! Export
//!     Source: photo.jpg (1200×1200)
//!     Crop: 600x600 at (300, 300)
//!     Output: out/dv-photo-600x600.jpg
//!     600×600, 215KB at quality 0.78 (3 encodes)
//!
//! Guides (pixel rows from top)
//!     Head height: 186–300
//!     Eye level: 186–264
//! ```
//!
//! ## Compliance
//!
//! ```text
//! Compliance (600×600 JPEG ≤ 240KB)
//! ✓ File format: JPEG
//!       Upload a .jpg or .jpeg file
//! ! Aspect ratio not square
//!       You will crop to exact 1:1
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure — no I/O, no side effects.

use crate::compliance::{ComplianceCheck, EYE_HEIGHT, HEAD_HEIGHT, bytes_to_kb};
use crate::config::ExportConfig;
use crate::imaging::Dimensions;
use crate::types::{ExportSummary, FileMeta};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Export
// ============================================================================

/// Format the result of an export run.
pub fn format_export_output(
    file: &FileMeta,
    source: Dimensions,
    summary: &ExportSummary,
) -> Vec<String> {
    let calls = match summary.encode_calls {
        1 => "1 encode".to_string(),
        n => format!("{n} encodes"),
    };
    vec![
        "Export".to_string(),
        format!("{}Source: {} ({})", indent(1), file.name, source),
        format!("{}Crop: {}", indent(1), summary.crop),
        format!("{}Output: {}", indent(1), summary.path),
        format!(
            "{}{}, {}KB at quality {:.2} ({})",
            indent(1),
            summary.dimensions,
            bytes_to_kb(summary.size_bytes as u64),
            summary.quality,
            calls
        ),
    ]
}

pub fn print_export_output(
    file: &FileMeta,
    source: Dimensions,
    summary: &ExportSummary,
) {
    for line in format_export_output(file, source, summary) {
        println!("{}", line);
    }
}

/// Format the head/eye guide bands as pixel rows on a `size`-pixel export.
pub fn format_guides(size: u32) -> Vec<String> {
    let mut lines = vec!["Guides (pixel rows from top)".to_string()];
    for band in [HEAD_HEIGHT, EYE_HEIGHT] {
        let (top, bottom) = band.pixel_rows(size);
        lines.push(format!("{}{}: {}–{}", indent(1), band.name, top, bottom));
    }
    lines
}

pub fn print_guides(size: u32) {
    for line in format_guides(size) {
        println!("{}", line);
    }
}

// ============================================================================
// Compliance
// ============================================================================

/// Format a checklist: one status line per check, hints indented below.
pub fn format_checks(config: &ExportConfig, checks: &[ComplianceCheck]) -> Vec<String> {
    let size = config.output.size;
    let mut lines = vec![format!(
        "Compliance ({size}×{size} JPEG ≤ {}KB)",
        bytes_to_kb(config.output.max_bytes as u64)
    )];
    for check in checks {
        lines.push(format!("{} {}", check.status.symbol(), check.label));
        if let Some(ref hint) = check.hint {
            lines.push(format!("  {}{}", indent(1), hint));
        }
    }
    lines
}

pub fn print_checks(config: &ExportConfig, checks: &[ComplianceCheck]) {
    for line in format_checks(config, checks) {
        println!("{}", line);
    }
}
