//! Line detector core types

use serde::{Deserialize, Serialize};

// ============================================================
// Constants
// ============================================================

/// Default Canny low hysteresis threshold (8-bit scale)
pub const DEFAULT_CANNY_LOW: f32 = 60.0;

/// Default Canny high hysteresis threshold (8-bit scale)
pub const DEFAULT_CANNY_HIGH: f32 = 120.0;

/// Default minimum Hough votes for a line
pub const DEFAULT_VOTE_THRESHOLD: u32 = 120;

/// Default angular tolerance for axis classification (degrees)
pub const DEFAULT_AXIS_TOLERANCE: f32 = 5.0;

/// Number of angle bins (1 degree resolution over [0, 180))
pub const ANGLE_BINS: usize = 180;

// ============================================================
// Core Data Structures
// ============================================================

/// A detected straight line in polar form
///
/// `angle` is the direction of the line itself in degrees, modulo 180,
/// measured from the +x axis toward the +y axis (rows grow downward).
/// A horizontal line has angle 0, a vertical line has angle 90.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Signed perpendicular distance from the origin (pixels)
    pub distance: f32,
    /// Line direction in degrees, in [0, 180)
    pub angle: f32,
    /// Accumulator votes supporting this line
    pub votes: u32,
}

impl Line {
    /// Is the line within `tolerance` degrees of horizontal?
    pub fn is_horizontal(&self, tolerance: f32) -> bool {
        self.angle <= tolerance || self.angle >= 180.0 - tolerance
    }

    /// Is the line within `tolerance` degrees of vertical?
    pub fn is_vertical(&self, tolerance: f32) -> bool {
        (self.angle - 90.0).abs() <= tolerance
    }

    /// Signed deviation from the nearest cardinal axis, if the line is
    /// close enough to one
    pub fn axis_deviation(&self, tolerance: f32) -> Option<f32> {
        if self.is_vertical(tolerance) {
            Some(self.angle - 90.0)
        } else if self.angle >= 180.0 - tolerance {
            Some(self.angle - 180.0)
        } else if self.angle <= tolerance {
            Some(self.angle)
        } else {
            None
        }
    }
}

/// Counts of near-horizontal and near-vertical lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisCounts {
    pub horizontal: usize,
    pub vertical: usize,
}

// ============================================================
// Options
// ============================================================

/// Edge and line detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDetectionOptions {
    /// Canny low threshold
    pub canny_low: f32,
    /// Canny high threshold
    pub canny_high: f32,
    /// Minimum accumulator votes
    pub vote_threshold: u32,
}

impl Default for LineDetectionOptions {
    fn default() -> Self {
        Self {
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            vote_threshold: DEFAULT_VOTE_THRESHOLD,
        }
    }
}

impl LineDetectionOptions {
    /// Create a builder
    pub fn builder() -> LineDetectionOptionsBuilder {
        LineDetectionOptionsBuilder::default()
    }
}

/// Builder for LineDetectionOptions
#[derive(Debug, Default)]
pub struct LineDetectionOptionsBuilder {
    options: LineDetectionOptions,
}

impl LineDetectionOptionsBuilder {
    /// Set Canny hysteresis thresholds (swapped if given out of order)
    #[must_use]
    pub fn canny(mut self, low: f32, high: f32) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.options.canny_low = low.max(0.0);
        self.options.canny_high = high.max(0.0);
        self
    }

    /// Set minimum votes
    #[must_use]
    pub fn vote_threshold(mut self, votes: u32) -> Self {
        self.options.vote_threshold = votes.max(1);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> LineDetectionOptions {
        self.options
    }
}
