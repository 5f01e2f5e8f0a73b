//! Small-angle skew correction
//!
//! # Algorithm
//!
//! 1. Detect Hough lines and keep the strongest `line_limit`
//! 2. Keep lines within `angle_tolerance` of horizontal or vertical
//! 3. Map each angle to its signed deviation from the nearest axis
//! 4. The median deviation is the skew estimate
//! 5. Rotate by the negative estimate unless it is below `min_skew_degrees`
//!
//! Anything short of a confident estimate returns the input untouched.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::lines::{Line, LineDetectionOptions, LineDetector, DEFAULT_AXIS_TOLERANCE};
use crate::pipeline::{Fallback, SkewEstimate, StageResult};
use crate::transform::rotate_about_center;

// ============================================================
// Constants
// ============================================================

/// Default number of strongest lines considered
const DEFAULT_LINE_LIMIT: usize = 50;

/// Default correction epsilon (degrees)
const DEFAULT_MIN_SKEW_DEGREES: f32 = 0.5;

/// Upper bound for the axis tolerance
const MAX_ANGLE_TOLERANCE: f32 = 45.0;

// ============================================================
// Options
// ============================================================

/// Skew estimation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewOptions {
    /// Strongest lines to consider
    pub line_limit: usize,
    /// Max deviation from an axis for a line to count (degrees)
    pub angle_tolerance: f32,
    /// Estimates with smaller magnitude are ignored (degrees)
    pub min_skew_degrees: f32,
}

impl Default for SkewOptions {
    fn default() -> Self {
        Self {
            line_limit: DEFAULT_LINE_LIMIT,
            angle_tolerance: DEFAULT_AXIS_TOLERANCE,
            min_skew_degrees: DEFAULT_MIN_SKEW_DEGREES,
        }
    }
}

impl SkewOptions {
    /// Create a builder
    pub fn builder() -> SkewOptionsBuilder {
        SkewOptionsBuilder::default()
    }
}

/// Builder for SkewOptions
#[derive(Debug, Default)]
pub struct SkewOptionsBuilder {
    options: SkewOptions,
}

impl SkewOptionsBuilder {
    #[must_use]
    pub fn line_limit(mut self, limit: usize) -> Self {
        self.options.line_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn angle_tolerance(mut self, degrees: f32) -> Self {
        self.options.angle_tolerance = degrees.clamp(0.0, MAX_ANGLE_TOLERANCE);
        self
    }

    #[must_use]
    pub fn min_skew_degrees(mut self, degrees: f32) -> Self {
        self.options.min_skew_degrees = degrees.max(0.0);
        self
    }

    #[must_use]
    pub fn build(self) -> SkewOptions {
        self.options
    }
}

// ============================================================
// Skew Corrector
// ============================================================

/// Skew estimation and correction
pub struct SkewCorrector;

impl SkewCorrector {
    /// Estimate skew from an image without rotating it
    pub fn estimate(
        gray: &GrayImage,
        line_options: &LineDetectionOptions,
        options: &SkewOptions,
    ) -> Result<SkewEstimate, Fallback> {
        let lines = LineDetector::detect(gray, line_options);
        Self::estimate_from_lines(&lines, options)
    }

    /// Estimate skew from already detected lines
    pub fn estimate_from_lines(
        lines: &[Line],
        options: &SkewOptions,
    ) -> Result<SkewEstimate, Fallback> {
        if lines.is_empty() {
            return Err(Fallback::NoLinesDetected);
        }

        let mut deviations: Vec<f32> = lines
            .iter()
            .take(options.line_limit)
            .filter_map(|line| line.axis_deviation(options.angle_tolerance))
            .collect();

        if deviations.is_empty() {
            return Err(Fallback::NoAlignedLines);
        }

        let line_count = deviations.len();
        let angle = median(&mut deviations);

        if angle.abs() < options.min_skew_degrees {
            return Err(Fallback::BelowThreshold { angle });
        }

        Ok(SkewEstimate { angle, line_count })
    }

    /// Rotate by the negative skew estimate, or return the input unchanged
    pub fn correct(
        gray: GrayImage,
        line_options: &LineDetectionOptions,
        options: &SkewOptions,
    ) -> StageResult<SkewEstimate> {
        match Self::estimate(&gray, line_options, options) {
            Ok(estimate) => {
                info!(
                    angle = estimate.angle,
                    line_count = estimate.line_count,
                    "Correcting skew"
                );
                let image = rotate_about_center(&gray, -estimate.angle);
                StageResult::Corrected {
                    image,
                    detail: estimate,
                }
            }
            Err(reason) => {
                debug!(?reason, "Skew correction skipped");
                StageResult::Unchanged {
                    image: gray,
                    reason,
                }
            }
        }
    }
}

/// Median of a slice (sorts it); mean of the two middle values for even lengths
fn median(data: &mut [f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }

    data.sort_unstable_by(f32::total_cmp);
    let mid = data.len() / 2;

    if data.len() % 2 == 1 {
        data[mid]
    } else {
        (data[mid - 1] + data[mid]) / 2.0
    }
}
