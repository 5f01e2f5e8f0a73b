//! Configuration for the preprocessing pipeline
//!
//! Every tunable constant lives here with its default. Values can come from
//! an optional TOML file and from command-line overrides; CLI always wins.
//!
//! ```toml
//! deskew = true
//!
//! [orientation]
//! min_vertical_lines = 8
//! dominance_ratio = 1.5
//!
//! [binarize]
//! block_size = 25
//! offset = 12
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cleanup::{BinarizeOptions, LineRemovalOptions, MAX_DILATION_SIZE};
use crate::codec::{EncodeOptions, PngCompression, DEFAULT_JPEG_QUALITY};
use crate::lines::LineDetectionOptions;
use crate::orientation::OrientationOptions;
use crate::skew::SkewOptions;

/// Default side of the stroke-connecting dilation element
const DEFAULT_DILATION_SIZE: u32 = 2;

// ============================================================
// Error Types
// ============================================================

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================
// Config
// ============================================================

/// Output stage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Side of the square dilation element (1 disables)
    pub dilation_size: u32,
    /// JPEG quality when writing `.jpg`/`.jpeg`
    pub jpeg_quality: u8,
    /// PNG compression level
    pub png_compression: PngCompression,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dilation_size: DEFAULT_DILATION_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::default(),
        }
    }
}

impl OutputConfig {
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality,
            png_compression: self.png_compression,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Run orientation and skew correction
    pub deskew: bool,
    pub lines: LineDetectionOptions,
    pub skew: SkewOptions,
    pub orientation: OrientationOptions,
    pub binarize: BinarizeOptions,
    pub line_removal: LineRemovalOptions,
    pub output: OutputConfig,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            deskew: true,
            lines: LineDetectionOptions::default(),
            skew: SkewOptions::default(),
            orientation: OrientationOptions::default(),
            binarize: BinarizeOptions::default(),
            line_removal: LineRemovalOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Values set explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub deskew: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreprocessConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply CLI overrides on top of this config
    pub fn merge_with_cli(mut self, overrides: &CliOverrides) -> Self {
        if let Some(deskew) = overrides.deskew {
            self.deskew = deskew;
        }
        self
    }

    /// Reject parameter combinations the stages cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines.canny_low > self.lines.canny_high {
            return Err(ConfigError::Invalid(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.lines.canny_low, self.lines.canny_high
            )));
        }
        if self.lines.vote_threshold == 0 {
            return Err(ConfigError::Invalid("vote_threshold must be positive".into()));
        }
        if self.binarize.block_size < 3 || self.binarize.block_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "block_size must be odd and at least 3, got {}",
                self.binarize.block_size
            )));
        }
        if self.line_removal.horizontal_divisor == 0 || self.line_removal.vertical_divisor == 0 {
            return Err(ConfigError::Invalid("line removal divisors must be positive".into()));
        }
        if self.skew.line_limit == 0 || self.orientation.line_limit == 0 {
            return Err(ConfigError::Invalid("line_limit must be positive".into()));
        }
        if self.output.dilation_size > MAX_DILATION_SIZE {
            return Err(ConfigError::Invalid(format!(
                "dilation_size must be at most {}, got {}",
                MAX_DILATION_SIZE, self.output.dilation_size
            )));
        }
        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be 1-100, got {}",
                self.output.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Effective parameters as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
