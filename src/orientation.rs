//! Sideways-scan detection and 90° orientation correction
//!
//! # Overview
//!
//! Forms scanned sideways show ruling and text baselines as vertical lines.
//! This module counts near-horizontal and near-vertical Hough lines and, when
//! vertical evidence clearly dominates, picks the quarter turn that yields
//! the most horizontal lines.
//!
//! # Algorithm
//!
//! 1. Count (horizontal, vertical) lines among the strongest `line_limit`
//! 2. Stop unless `vertical > max(min_vertical_lines, dominance_ratio * horizontal)`
//! 3. Rotate 90° clockwise and counter-clockwise, count horizontal lines again
//! 4. Keep the candidate with the strictly greatest horizontal count,
//!    evaluated in order original, clockwise, counter-clockwise
//!
//! The dominance gate keeps table-heavy but upright forms from being turned.
//!
//! # Example
//!
//! ```ignore
//! use formclean::orientation::{OrientationClassifier, OrientationOptions};
//!
//! let result = OrientationClassifier::correct(gray, &line_options, &OrientationOptions::default());
//! println!("rotated: {}", result.is_corrected());
//! ```

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::lines::{AxisCounts, LineDetectionOptions, LineDetector, DEFAULT_AXIS_TOLERANCE};
use crate::pipeline::{
    Fallback, Orientation, OrientationDecision, OrientationScores, StageResult,
};
use crate::transform::{rotate_90_clockwise, rotate_90_counter_clockwise};

// ============================================================
// Constants
// ============================================================

/// Default number of strongest lines considered
const DEFAULT_LINE_LIMIT: usize = 100;

/// Default minimum vertical line count before rotation is considered
const DEFAULT_MIN_VERTICAL_LINES: usize = 8;

/// Default vertical-over-horizontal dominance ratio
const DEFAULT_DOMINANCE_RATIO: f32 = 1.5;

// ============================================================
// Options
// ============================================================

/// Options for orientation classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationOptions {
    /// Strongest lines to consider
    pub line_limit: usize,
    /// Max deviation from an axis for a line to count (degrees)
    pub angle_tolerance: f32,
    /// Vertical count must exceed this before rotating
    pub min_vertical_lines: usize,
    /// Vertical count must exceed this multiple of the horizontal count
    pub dominance_ratio: f32,
}

impl Default for OrientationOptions {
    fn default() -> Self {
        Self {
            line_limit: DEFAULT_LINE_LIMIT,
            angle_tolerance: DEFAULT_AXIS_TOLERANCE,
            min_vertical_lines: DEFAULT_MIN_VERTICAL_LINES,
            dominance_ratio: DEFAULT_DOMINANCE_RATIO,
        }
    }
}

impl OrientationOptions {
    /// Does `counts` justify evaluating quarter turns?
    pub fn vertical_dominates(&self, counts: AxisCounts) -> bool {
        let required = (self.min_vertical_lines as f32)
            .max(self.dominance_ratio * counts.horizontal as f32);
        counts.vertical as f32 > required
    }
}

// ============================================================
// Classifier
// ============================================================

/// Orientation classifier
pub struct OrientationClassifier;

impl OrientationClassifier {
    /// Axis line counts for an image
    pub fn score(
        gray: &GrayImage,
        line_options: &LineDetectionOptions,
        options: &OrientationOptions,
    ) -> AxisCounts {
        LineDetector::detect_axis_counts(
            gray,
            line_options,
            options.line_limit,
            options.angle_tolerance,
        )
    }

    /// Rotate by a quarter turn when the page appears to be sideways
    pub fn correct(
        gray: GrayImage,
        line_options: &LineDetectionOptions,
        options: &OrientationOptions,
    ) -> StageResult<OrientationDecision> {
        let original = Self::score(&gray, line_options, options);
        debug!(
            horizontal = original.horizontal,
            vertical = original.vertical,
            "Orientation scores"
        );

        if !options.vertical_dominates(original) {
            return StageResult::Unchanged {
                image: gray,
                reason: Fallback::InsufficientDominance {
                    horizontal: original.horizontal,
                    vertical: original.vertical,
                },
            };
        }

        let clockwise = rotate_90_clockwise(&gray);
        let counter_clockwise = rotate_90_counter_clockwise(&gray);

        let scores = OrientationScores {
            upright: original.horizontal,
            clockwise: Self::score(&clockwise, line_options, options).horizontal,
            counter_clockwise: Self::score(&counter_clockwise, line_options, options).horizontal,
        };

        let orientation = select_orientation(&scores);
        debug!(?scores, ?orientation, "Orientation candidates evaluated");

        let image = match orientation {
            Orientation::Upright => {
                return StageResult::Unchanged {
                    image: gray,
                    reason: Fallback::OriginalIsBest,
                };
            }
            Orientation::Clockwise90 => clockwise,
            Orientation::CounterClockwise90 => counter_clockwise,
        };

        info!(degrees = orientation.degrees(), "Rotating sideways page");
        StageResult::Corrected {
            image,
            detail: OrientationDecision {
                orientation,
                original,
                scores,
            },
        }
    }
}

/// Strictly greatest horizontal score wins; ties keep the earlier candidate
fn select_orientation(scores: &OrientationScores) -> Orientation {
    let mut best = Orientation::Upright;
    let mut best_score = scores.upright;

    if scores.clockwise > best_score {
        best = Orientation::Clockwise90;
        best_score = scores.clockwise;
    }
    if scores.counter_clockwise > best_score {
        best = Orientation::CounterClockwise90;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    /// Dark full-height vertical bars on a light page
    fn sideways_page(width: u32, height: u32, bars: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, _| {
            let slot = x / 20;
            if slot >= 1 && slot <= bars && x % 20 < 6 {
                Luma([10u8])
            } else {
                Luma([240u8])
            }
        })
    }

    // ============ Options ============

    #[test]
    fn test_options_default() {
        let opts = OrientationOptions::default();
        assert_eq!(opts.line_limit, 100);
        assert_eq!(opts.angle_tolerance, 5.0);
        assert_eq!(opts.min_vertical_lines, 8);
        assert_eq!(opts.dominance_ratio, 1.5);
    }

    // ============ Dominance gate ============

    #[test]
    fn test_dominance_requires_minimum_count() {
        let opts = OrientationOptions::default();
        assert!(!opts.vertical_dominates(AxisCounts { horizontal: 0, vertical: 8 }));
        assert!(opts.vertical_dominates(AxisCounts { horizontal: 0, vertical: 9 }));
    }

    #[test]
    fn test_dominance_requires_ratio() {
        let opts = OrientationOptions::default();
        // 1.5 * 10 = 15
        assert!(!opts.vertical_dominates(AxisCounts { horizontal: 10, vertical: 15 }));
        assert!(opts.vertical_dominates(AxisCounts { horizontal: 10, vertical: 16 }));
        // 1.5 * 7 = 10.5
        assert!(opts.vertical_dominates(AxisCounts { horizontal: 7, vertical: 11 }));
    }

    #[test]
    fn test_dominance_never_when_horizontal_wins() {
        let opts = OrientationOptions::default();
        for h in 0..40 {
            for v in 0..=h {
                assert!(!opts.vertical_dominates(AxisCounts { horizontal: h, vertical: v }));
            }
        }
    }

    // ============ Selection ============

    #[test]
    fn test_select_tie_keeps_original() {
        let scores = OrientationScores {
            upright: 5,
            clockwise: 5,
            counter_clockwise: 5,
        };
        assert_eq!(select_orientation(&scores), Orientation::Upright);
    }

    #[test]
    fn test_select_tie_between_rotations_prefers_clockwise() {
        let scores = OrientationScores {
            upright: 1,
            clockwise: 9,
            counter_clockwise: 9,
        };
        assert_eq!(select_orientation(&scores), Orientation::Clockwise90);
    }

    #[test]
    fn test_select_counter_clockwise() {
        let scores = OrientationScores {
            upright: 1,
            clockwise: 3,
            counter_clockwise: 4,
        };
        assert_eq!(select_orientation(&scores), Orientation::CounterClockwise90);
    }

    #[test]
    fn test_orientation_degrees() {
        assert_eq!(Orientation::Upright.degrees(), 0);
        assert_eq!(Orientation::Clockwise90.degrees(), 90);
        assert_eq!(Orientation::CounterClockwise90.degrees(), -90);
    }

    // ============ Classification ============

    #[test]
    fn test_blank_page_not_rotated() {
        let gray = GrayImage::from_pixel(100, 100, Luma([200]));
        let result = OrientationClassifier::correct(
            gray,
            &LineDetectionOptions::default(),
            &OrientationOptions::default(),
        );
        assert_eq!(
            result.fallback(),
            Some(Fallback::InsufficientDominance {
                horizontal: 0,
                vertical: 0
            })
        );
        assert_eq!(result.image().dimensions(), (100, 100));
    }

    #[test]
    fn test_sideways_page_rotated() {
        let gray = sideways_page(260, 320, 10);
        let line_options = LineDetectionOptions::default();
        let options = OrientationOptions::default();

        let before = OrientationClassifier::score(&gray, &line_options, &options);
        assert!(before.vertical > before.horizontal);

        let result = OrientationClassifier::correct(gray, &line_options, &options);
        assert!(result.is_corrected());

        let rotated = result.image();
        assert_eq!(rotated.dimensions(), (320, 260));

        let after = OrientationClassifier::score(rotated, &line_options, &options);
        assert!(after.horizontal > before.horizontal);
    }

    #[test]
    fn test_upright_page_not_rotated() {
        let sideways = sideways_page(260, 320, 10);
        let upright = rotate_90_clockwise(&sideways);
        let original = upright.clone();

        let result = OrientationClassifier::correct(
            upright,
            &LineDetectionOptions::default(),
            &OrientationOptions::default(),
        );
        assert!(!result.is_corrected());
        assert_eq!(result.into_image(), original);
    }
}
