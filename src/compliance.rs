//! Compliance checklist.
//!
//! [`evaluate`] maps what is currently known about an export — the original
//! file, the decoded image's natural dimensions, the encoded result — to an
//! ordered list of [`ComplianceCheck`]s. It is a pure function: recompute it
//! whenever any input changes.
//!
//! Checks always appear in the same category order:
//!
//! 1. **File** — format and original size (or an upload reminder)
//! 2. **Image** — near-square aspect ratio
//! 3. **Output** — resolution, byte budget, format
//! 4. **Advisory** — background, expression, head/eye placement
//!
//! Advisory checks encode rules nothing here can verify (faces, lighting),
//! so they are always emitted as `warn` and never upgraded.

use crate::config::ExportConfig;
use crate::imaging::{Dimensions, EncodedImage, is_near_square};
use crate::types::FileMeta;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Ok,
    Warn,
    Err,
}

impl ComplianceStatus {
    /// Single-character marker used in terminal output.
    pub fn symbol(self) -> &'static str {
        match self {
            ComplianceStatus::Ok => "✓",
            ComplianceStatus::Warn => "!",
            ComplianceStatus::Err => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceCheck {
    pub label: String,
    pub status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ComplianceCheck {
    fn new(label: impl Into<String>, status: ComplianceStatus) -> Self {
        Self {
            label: label.into(),
            status,
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A horizontal band on the square export, as fractions of its height
/// measured from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideBand {
    pub name: &'static str,
    pub min_from_bottom: f64,
    pub max_from_bottom: f64,
}

/// Head (chin to top of hair) should span 50–69% of the image height.
pub const HEAD_HEIGHT: GuideBand = GuideBand {
    name: "Head height",
    min_from_bottom: 0.50,
    max_from_bottom: 0.69,
};

/// Eyes should sit 56–69% of the image height above the bottom edge.
pub const EYE_HEIGHT: GuideBand = GuideBand {
    name: "Eye level",
    min_from_bottom: 0.56,
    max_from_bottom: 0.69,
};

impl GuideBand {
    /// The band's `(top, bottom)` pixel rows on a `size`-pixel-tall export,
    /// counted from the top edge.
    pub fn pixel_rows(&self, size: u32) -> (u32, u32) {
        let row = |from_bottom: f64| ((1.0 - from_bottom) * size as f64).round() as u32;
        (row(self.max_from_bottom), row(self.min_from_bottom))
    }

    fn percent_range(&self) -> String {
        format!(
            "{:.0}–{:.0}%",
            self.min_from_bottom * 100.0,
            self.max_from_bottom * 100.0
        )
    }
}

/// Byte count as KB with one decimal, e.g. `245760 → 240.0`.
pub fn bytes_to_kb(bytes: u64) -> f64 {
    (bytes as f64 / 102.4).round() / 10.0
}

fn is_jpeg(file: &FileMeta) -> bool {
    let lower = file.name.to_ascii_lowercase();
    lower.ends_with("jpg")
        || lower.ends_with("jpeg")
        || file.media_type.as_deref() == Some("image/jpeg")
}

/// Evaluate every check that applies to the current inputs.
pub fn evaluate(
    config: &ExportConfig,
    file: Option<&FileMeta>,
    natural: Option<Dimensions>,
    export: Option<&EncodedImage>,
) -> Vec<ComplianceCheck> {
    let max_bytes = config.output.max_bytes;
    let budget_kb = bytes_to_kb(max_bytes as u64);
    let mut checks = Vec::new();

    // File
    match file {
        Some(file) => {
            let jpeg = is_jpeg(file);
            let (label, status) = if jpeg {
                ("File format: JPEG", ComplianceStatus::Ok)
            } else {
                ("File format: not JPEG", ComplianceStatus::Err)
            };
            checks.push(
                ComplianceCheck::new(label, status).with_hint("Upload a .jpg or .jpeg file"),
            );

            let size_kb = bytes_to_kb(file.size_bytes);
            let check = if file.size_bytes <= max_bytes as u64 {
                ComplianceCheck::new(
                    format!("Original file ≤ {budget_kb}KB ({size_kb}KB)"),
                    ComplianceStatus::Ok,
                )
            } else {
                ComplianceCheck::new(
                    format!("Original file too large ({size_kb}KB)"),
                    ComplianceStatus::Warn,
                )
            };
            checks.push(check.with_hint("Export step will compress if needed"));
        }
        None => checks.push(ComplianceCheck::new("Upload a photo", ComplianceStatus::Warn)),
    }

    // Image
    if let Some(dims) = natural {
        let check = if is_near_square(dims, config.checks.square_tolerance) {
            ComplianceCheck::new("Aspect ratio roughly square", ComplianceStatus::Ok)
        } else {
            ComplianceCheck::new("Aspect ratio not square", ComplianceStatus::Warn)
        };
        checks.push(check.with_hint("You will crop to exact 1:1"));
    }

    // Output
    if let Some(encoded) = export {
        let size = config.output.size;
        checks.push(ComplianceCheck::new(
            format!("Export size: {size}×{size} pixels"),
            ComplianceStatus::Ok,
        ));

        let size_kb = bytes_to_kb(encoded.len() as u64);
        checks.push(if encoded.within(max_bytes) {
            ComplianceCheck::new(
                format!("Export ≤ {budget_kb}KB ({size_kb}KB)"),
                ComplianceStatus::Ok,
            )
        } else {
            ComplianceCheck::new(
                format!("Export > {budget_kb}KB ({size_kb}KB)"),
                ComplianceStatus::Err,
            )
            .with_hint("Try zooming slightly or increasing background area")
        });

        checks.push(ComplianceCheck::new("Export format: JPEG", ComplianceStatus::Ok));
    }

    // Advisory
    checks.push(
        ComplianceCheck::new(
            "Plain, light background (no patterns/shadows)",
            ComplianceStatus::Warn,
        )
        .with_hint("Adjust lighting; replace background before upload if needed"),
    );
    checks.push(
        ComplianceCheck::new(
            "Neutral expression, no glasses/headwear",
            ComplianceStatus::Warn,
        )
        .with_hint("Religious headwear allowed; face visible"),
    );
    checks.push(
        ComplianceCheck::new(
            format!(
                "Head height {} and eyes {} from bottom",
                HEAD_HEIGHT.percent_range(),
                EYE_HEIGHT.percent_range()
            ),
            ComplianceStatus::Warn,
        )
        .with_hint("Align face within the head and eye guide bands"),
    );

    checks
}
