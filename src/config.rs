//! Export configuration.
//!
//! Handles loading, validating, and merging `dv-photo.toml`. The stock
//! defaults encode the DV lottery photo format; a config file only needs the
//! keys it wants to change, which is mostly useful for testing alternative
//! budgets or producing a different square document format.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! size = 600                # Output is size x size pixels
//! file_stem = "dv-photo"    # Export is written as <stem>-<size>x<size>.jpg
//! max_bytes = 245760        # Byte budget (240 KB)
//!
//! [quality]
//! initial = 0.92            # First encode attempt
//! step = 0.07               # Decrease per retry
//! floor = 0.5               # Never encode below this
//! max_attempts = 8          # Retries after the first encode
//!
//! [checks]
//! square_tolerance = 0.02   # |width/height - 1| below this counts as square
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EncodeConfig, MAX_OUTPUT_SIZE, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "dv-photo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `dv-photo.toml`.
///
/// All fields have defaults matching the DV photo requirements. Unknown
/// keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output geometry, naming, and byte budget.
    pub output: OutputConfig,
    /// Quality search schedule.
    pub quality: QualityConfig,
    /// Compliance check thresholds.
    pub checks: ChecksConfig,
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.size == 0 {
            return Err(ConfigError::Validation(
                "output.size must be non-zero".into(),
            ));
        }
        if self.output.size > MAX_OUTPUT_SIZE {
            return Err(ConfigError::Validation(format!(
                "output.size must be at most {MAX_OUTPUT_SIZE}"
            )));
        }
        if self.output.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "output.max_bytes must be non-zero".into(),
            ));
        }
        if self.output.file_stem.is_empty() || self.output.file_stem.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.file_stem must be a non-empty file name without path separators".into(),
            ));
        }
        let q = &self.quality;
        for (name, value) in [("initial", q.initial), ("floor", q.floor)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "quality.{name} must be 0.0-1.0"
                )));
            }
        }
        if q.floor > q.initial {
            return Err(ConfigError::Validation(
                "quality.floor must not exceed quality.initial".into(),
            ));
        }
        if q.step.is_nan() || q.step <= 0.0 || q.step > 1.0 {
            return Err(ConfigError::Validation(
                "quality.step must be in (0.0, 1.0]".into(),
            ));
        }
        let tolerance = self.checks.square_tolerance;
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(ConfigError::Validation(
                "checks.square_tolerance must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Encoder settings derived from `[output]` and `[quality]`.
    pub fn encode_config(&self) -> EncodeConfig {
        EncodeConfig {
            max_bytes: self.output.max_bytes,
            initial: Quality::new(self.quality.initial),
            step: self.quality.step,
            floor: Quality::new(self.quality.floor),
            max_attempts: self.quality.max_attempts,
        }
    }

    /// Deterministic name of the exported file, e.g. `dv-photo-600x600.jpg`.
    pub fn output_file_name(&self) -> String {
        let size = self.output.size;
        format!("{}-{size}x{size}.jpg", self.output.file_stem)
    }
}

/// Output geometry, naming, and byte budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Edge length of the square export in pixels (1 to 10000).
    pub size: u32,
    /// Prefix of the export file name.
    pub file_stem: String,
    /// Maximum encoded size in bytes.
    pub max_bytes: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            size: 600,
            file_stem: "dv-photo".to_string(),
            max_bytes: 240 * 1024,
        }
    }
}

/// Quality search schedule on the `0.0..=1.0` scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub initial: f32,
    pub step: f32,
    pub floor: f32,
    pub max_attempts: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            initial: 0.92,
            step: 0.07,
            floor: 0.5,
            max_attempts: 8,
        }
    }
}

/// Compliance check thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Maximum `|width / height - 1|` still reported as roughly square.
    pub square_tolerance: f64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            square_tolerance: 0.02,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ExportConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ExportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `dv-photo.toml` from the given directory, falling back to stock
/// defaults when there is none.
pub fn load_config(dir: &Path) -> Result<ExportConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<ExportConfig, ConfigError> {
    let overlay =
        load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `dv-photo.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dv-photo Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults, which match the DV lottery photo
# requirements (600x600 JPEG, at most 240 KB).
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Edge length of the square export, in pixels (1 to 10000).
size = 600

# The export is written as <file_stem>-<size>x<size>.jpg
file_stem = "dv-photo"

# Byte budget for the encoded JPEG (240 * 1024).
max_bytes = 245760

# ---------------------------------------------------------------------------
# Quality search
# ---------------------------------------------------------------------------
# The encoder starts at `initial` and lowers quality by `step` until the
# export fits `max_bytes`, never going below `floor` and retrying at most
# `max_attempts` times. If the budget still isn't met, the lowest-quality
# attempt is kept and the budget check reports the miss.
[quality]
initial = 0.92
step = 0.07
floor = 0.5
max_attempts = 8

# ---------------------------------------------------------------------------
# Compliance checks
# ---------------------------------------------------------------------------
[checks]
# |width / height - 1| below this counts as roughly square.
square_tolerance = 0.02
"##
}
