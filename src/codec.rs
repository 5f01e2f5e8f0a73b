//! Image decode/encode at the I/O boundary
//!
//! Decoding turns bytes into a [`DynamicImage`]; encoding picks PNG or JPEG
//! from the output path suffix. Output is fully encoded in memory before the
//! file is created, so a failed encode leaves no partial file behind.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::pipeline::{PipelineError, Result};

// ============================================================
// Constants
// ============================================================

/// Default JPEG quality (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

// ============================================================
// Types
// ============================================================

/// Output container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Format implied by a path suffix; anything unrecognised is PNG
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }
}

/// PNG compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    #[default]
    Fast,
    Default,
    Best,
}

impl From<PngCompression> for CompressionType {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::default(),
        }
    }
}

// ============================================================
// Codec
// ============================================================

/// Image codec boundary
pub struct ImageCodec;

impl ImageCodec {
    /// Decode image bytes
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(PipelineError::Read("input is empty".to_string()));
        }
        let image =
            image::load_from_memory(bytes).map_err(|e| PipelineError::Read(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Read("image has zero dimensions".to_string()));
        }
        debug!(
            width = image.width(),
            height = image.height(),
            "Input decoded"
        );
        Ok(image)
    }

    /// Read and decode an image file
    pub fn read(path: &Path) -> Result<DynamicImage> {
        let bytes = std::fs::read(path)
            .map_err(|e| PipelineError::Read(format!("{}: {}", path.display(), e)))?;
        Self::decode(&bytes)
    }

    /// Encode a grayscale image
    pub fn encode(
        image: &GrayImage,
        format: OutputFormat,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        let mut buf = Vec::new();

        let written = match format {
            OutputFormat::Png => PngEncoder::new_with_quality(
                &mut buf,
                options.png_compression.into(),
                FilterType::Adaptive,
            )
            .write_image(image.as_raw(), width, height, ExtendedColorType::L8),
            OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality)
                .write_image(image.as_raw(), width, height, ExtendedColorType::L8),
        };
        written.map_err(|e| PipelineError::Write(e.to_string()))?;

        debug!(?format, bytes = buf.len(), "Output encoded");
        Ok(buf)
    }

    /// Encode and write an image, format chosen by the path suffix
    pub fn write(path: &Path, image: &GrayImage, options: &EncodeOptions) -> Result<()> {
        let bytes = Self::encode(image, OutputFormat::from_path(path), options)?;
        std::fs::write(path, bytes)
            .map_err(|e| PipelineError::Write(format!("{}: {}", path.display(), e)))
    }
}
