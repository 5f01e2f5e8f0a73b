//! Printed ruling and grid line removal
//!
//! Forms carry long straight rules; handwriting strokes are short. Opening
//! the binary image with a long thin element in each direction isolates the
//! rules, and subtracting them leaves the handwriting.
//!
//! # Algorithm
//!
//! 1. Horizontal element length `max(horizontal_min, width / horizontal_divisor)`
//! 2. Vertical element length `max(vertical_min, height / vertical_divisor)`
//! 3. Open with each element to get the line masks
//! 4. Subtract the union of the masks from the input
//!
//! Subtraction only shortens runs, so a second pass removes nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::morphology::{open_horizontal, open_vertical};
use super::types::{BinaryImage, Result};

// ============================================================
// Constants
// ============================================================

/// Minimum horizontal element length
const DEFAULT_HORIZONTAL_MIN: u32 = 15;

/// Image width divisor for the horizontal element
const DEFAULT_HORIZONTAL_DIVISOR: u32 = 18;

/// Minimum vertical element length
const DEFAULT_VERTICAL_MIN: u32 = 12;

/// Image height divisor for the vertical element
const DEFAULT_VERTICAL_DIVISOR: u32 = 24;

// ============================================================
// Options
// ============================================================

/// Ruled-line removal options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineRemovalOptions {
    pub horizontal_min: u32,
    pub horizontal_divisor: u32,
    pub vertical_min: u32,
    pub vertical_divisor: u32,
}

impl Default for LineRemovalOptions {
    fn default() -> Self {
        Self {
            horizontal_min: DEFAULT_HORIZONTAL_MIN,
            horizontal_divisor: DEFAULT_HORIZONTAL_DIVISOR,
            vertical_min: DEFAULT_VERTICAL_MIN,
            vertical_divisor: DEFAULT_VERTICAL_DIVISOR,
        }
    }
}

impl LineRemovalOptions {
    /// Horizontal element length for an image of `width` pixels
    pub fn horizontal_length(&self, width: u32) -> u32 {
        self.horizontal_min
            .max(width / self.horizontal_divisor.max(1))
            .max(1)
    }

    /// Vertical element length for an image of `height` pixels
    pub fn vertical_length(&self, height: u32) -> u32 {
        self.vertical_min
            .max(height / self.vertical_divisor.max(1))
            .max(1)
    }
}

/// Result of ruled-line removal
#[derive(Debug, Clone)]
pub struct LineRemovalResult {
    /// Image with ruling removed
    pub image: BinaryImage,
    /// Foreground pixels removed
    pub removed_pixels: u64,
    /// Horizontal element length used
    pub horizontal_length: u32,
    /// Vertical element length used
    pub vertical_length: u32,
}

// ============================================================
// Remover
// ============================================================

/// Structural ruled-line remover
pub struct RuledLineRemover;

impl RuledLineRemover {
    /// Union of the horizontal and vertical line masks
    pub fn line_mask(binary: &BinaryImage, options: &LineRemovalOptions) -> Result<BinaryImage> {
        let (width, height) = binary.dimensions();
        let horizontal = open_horizontal(binary, options.horizontal_length(width));
        let vertical = open_vertical(binary, options.vertical_length(height));
        horizontal.union(&vertical)
    }

    /// Erase long horizontal and vertical runs, keeping short strokes
    pub fn remove(binary: &BinaryImage, options: &LineRemovalOptions) -> Result<LineRemovalResult> {
        let (width, height) = binary.dimensions();
        let horizontal_length = options.horizontal_length(width);
        let vertical_length = options.vertical_length(height);

        let mask = Self::line_mask(binary, options)?;
        let image = binary.subtract(&mask)?;
        let removed_pixels = binary.foreground_count() - image.foreground_count();

        debug!(
            horizontal_length,
            vertical_length, removed_pixels, "Ruled lines removed"
        );

        Ok(LineRemovalResult {
            image,
            removed_pixels,
            horizontal_length,
            vertical_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let opts = LineRemovalOptions::default();
        assert_eq!(opts.horizontal_min, 15);
        assert_eq!(opts.horizontal_divisor, 18);
        assert_eq!(opts.vertical_min, 12);
        assert_eq!(opts.vertical_divisor, 24);
    }

    #[test]
    fn test_element_lengths() {
        let opts = LineRemovalOptions::default();
        assert_eq!(opts.horizontal_length(100), 15);
        assert_eq!(opts.horizontal_length(1800), 100);
        assert_eq!(opts.vertical_length(100), 12);
        assert_eq!(opts.vertical_length(2400), 100);
    }

    #[test]
    fn test_zero_divisor_does_not_panic() {
        let opts = LineRemovalOptions {
            horizontal_divisor: 0,
            vertical_divisor: 0,
            ..Default::default()
        };
        assert_eq!(opts.horizontal_length(90), 90);
        assert_eq!(opts.vertical_length(40), 40);
    }

    #[test]
    fn test_full_width_rule_removed() {
        let binary = BinaryImage::from_fn(200, 100, |_, y| (50..52).contains(&y));
        let result = RuledLineRemover::remove(&binary, &LineRemovalOptions::default()).unwrap();
        assert_eq!(result.image.foreground_count(), 0);
        assert_eq!(result.removed_pixels, 400);
    }

    #[test]
    fn test_short_strokes_kept() {
        // A small handwritten "plus" next to a long rule
        let binary = BinaryImage::from_fn(200, 100, |x, y| {
            let rule = y == 80;
            let stroke_h = y == 30 && (40..50).contains(&x);
            let stroke_v = x == 45 && (25..35).contains(&y);
            rule || stroke_h || stroke_v
        });
        let result = RuledLineRemover::remove(&binary, &LineRemovalOptions::default()).unwrap();
        assert!(!result.image.is_foreground(100, 80));
        assert!(result.image.is_foreground(42, 30));
        assert!(result.image.is_foreground(45, 27));
        assert_eq!(result.image.foreground_count(), 19);
    }

    #[test]
    fn test_vertical_rule_removed() {
        let binary = BinaryImage::from_fn(100, 120, |x, y| x == 60 && (10..110).contains(&y));
        let result = RuledLineRemover::remove(&binary, &LineRemovalOptions::default()).unwrap();
        assert_eq!(result.image.foreground_count(), 0);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let binary = BinaryImage::from_fn(150, 150, |x, y| {
            y % 30 == 0 || x % 50 == 0 || ((x * 7 + y * 13) % 11 == 0 && x % 3 != 0)
        });
        let opts = LineRemovalOptions::default();
        let once = RuledLineRemover::remove(&binary, &opts).unwrap().image;
        let twice = RuledLineRemover::remove(&once, &opts).unwrap();
        assert_eq!(twice.image, once);
        assert_eq!(twice.removed_pixels, 0);
    }

    #[test]
    fn test_line_mask_covers_rules_only() {
        let binary = BinaryImage::from_fn(100, 100, |x, y| y == 10 || (x == 3 && y == 50));
        let mask = RuledLineRemover::line_mask(&binary, &LineRemovalOptions::default()).unwrap();
        assert_eq!(mask.foreground_count(), 100);
        assert!(!mask.is_foreground(3, 50));
    }
}
