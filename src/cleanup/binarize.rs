//! Adaptive binarization for handwriting
//!
//! # Algorithm
//!
//! 1. Median blur (3×3 by default) to suppress scan speckle
//! 2. Local mean over a `block_size` square window, borders replicated
//! 3. A pixel is ink when it is at least `offset` darker than its local mean
//!
//! The result is inverted relative to the page: ink is foreground (255).

use image::{GrayImage, Luma};
use imageproc::filter::median_filter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{BinaryImage, BACKGROUND, FOREGROUND};

// ============================================================
// Constants
// ============================================================

/// Default median blur radius (1 = 3×3)
const DEFAULT_DENOISE_RADIUS: u32 = 1;

/// Default threshold neighbourhood size (pixels, odd)
const DEFAULT_BLOCK_SIZE: u32 = 25;

/// Default offset subtracted from the local mean
const DEFAULT_OFFSET: i32 = 12;

/// Smallest valid neighbourhood
const MIN_BLOCK_SIZE: u32 = 3;

// ============================================================
// Options
// ============================================================

/// Binarization options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeOptions {
    /// Median blur radius applied before thresholding (0 disables)
    pub denoise_radius: u32,
    /// Side of the square neighbourhood for the local mean (odd)
    pub block_size: u32,
    /// Constant subtracted from the local mean
    pub offset: i32,
}

impl Default for BinarizeOptions {
    fn default() -> Self {
        Self {
            denoise_radius: DEFAULT_DENOISE_RADIUS,
            block_size: DEFAULT_BLOCK_SIZE,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl BinarizeOptions {
    /// Create a builder
    pub fn builder() -> BinarizeOptionsBuilder {
        BinarizeOptionsBuilder::default()
    }
}

/// Builder for BinarizeOptions
#[derive(Debug, Default)]
pub struct BinarizeOptionsBuilder {
    options: BinarizeOptions,
}

impl BinarizeOptionsBuilder {
    #[must_use]
    pub fn denoise_radius(mut self, radius: u32) -> Self {
        self.options.denoise_radius = radius;
        self
    }

    /// Set block size (rounded up to the next odd value, at least 3)
    #[must_use]
    pub fn block_size(mut self, size: u32) -> Self {
        self.options.block_size = size.max(MIN_BLOCK_SIZE) | 1;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: i32) -> Self {
        self.options.offset = offset.clamp(-255, 255);
        self
    }

    #[must_use]
    pub fn build(self) -> BinarizeOptions {
        self.options
    }
}

// ============================================================
// Binarizer
// ============================================================

/// Local adaptive mean thresholding
pub struct Binarizer;

impl Binarizer {
    /// Denoise then threshold; ink becomes foreground
    pub fn binarize(gray: &GrayImage, options: &BinarizeOptions) -> BinaryImage {
        if options.denoise_radius > 0 {
            let blurred = median_filter(gray, options.denoise_radius, options.denoise_radius);
            Self::threshold(&blurred, options)
        } else {
            Self::threshold(gray, options)
        }
    }

    /// Threshold without the median pre-pass
    pub fn threshold(gray: &GrayImage, options: &BinarizeOptions) -> BinaryImage {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return BinaryImage::new(width, height);
        }

        let radius = options.block_size / 2;
        let means = local_means(gray, radius);

        let mut foreground = 0usize;
        let out = GrayImage::from_fn(width, height, |x, y| {
            let value = gray.get_pixel(x, y).0[0] as i32;
            let mean = means[(y * width + x) as usize] as i32;
            if value <= mean - options.offset {
                foreground += 1;
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });

        debug!(
            block_size = options.block_size,
            offset = options.offset,
            foreground,
            "Adaptive threshold applied"
        );

        BinaryImage::from_gray_unchecked(out)
    }
}

/// Rounded mean of the `(2r+1)²` window around each pixel, borders replicated
fn local_means(gray: &GrayImage, radius: u32) -> Vec<u8> {
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    let r = radius as usize;
    let window = 2 * r + 1;

    // Horizontal window sums
    let mut row_sums = vec![0u32; w * h];
    let mut prefix = vec![0u32; w + window];
    for y in 0..h {
        prefix[0] = 0;
        for i in 0..w + window - 1 {
            let sx = (i as isize - r as isize).clamp(0, w as isize - 1) as u32;
            prefix[i + 1] = prefix[i] + gray.get_pixel(sx, y as u32).0[0] as u32;
        }
        for x in 0..w {
            row_sums[y * w + x] = prefix[x + window] - prefix[x];
        }
    }

    // Vertical window sums over the row sums
    let area = (window * window) as f32;
    let mut means = vec![0u8; w * h];
    let mut column = vec![0u32; h + window];
    for x in 0..w {
        column[0] = 0;
        for i in 0..h + window - 1 {
            let sy = (i as isize - r as isize).clamp(0, h as isize - 1) as usize;
            column[i + 1] = column[i] + row_sums[sy * w + x];
        }
        for y in 0..h {
            let sum = column[y + window] - column[y];
            means[y * w + x] = (sum as f32 / area).round().min(255.0) as u8;
        }
    }

    means
}
