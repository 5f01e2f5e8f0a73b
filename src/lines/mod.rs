//! Edge and Line Detection module
//!
//! Converts a grayscale page into candidate straight lines.
//!
//! # Features
//!
//! - Canny edge map with fixed hysteresis thresholds
//! - Hough accumulator at 1 pixel / 1 degree resolution
//! - Lines ordered by vote count, strongest first
//! - Horizontal/vertical classification with an angular tolerance
//!
//! # Example
//!
//! ```rust,no_run
//! use formclean::{LineDetectionOptions, LineDetector};
//! use image::GrayImage;
//!
//! let gray = GrayImage::new(640, 480);
//! let lines = LineDetector::detect(&gray, &LineDetectionOptions::default());
//! let counts = LineDetector::axis_counts(&lines, 100, 5.0);
//! println!("horizontal={}, vertical={}", counts.horizontal, counts.vertical);
//! ```

// Submodules
mod detect;
mod types;

// Re-export public API
pub use detect::LineDetector;
pub use types::{
    AxisCounts, Line, LineDetectionOptions, LineDetectionOptionsBuilder, ANGLE_BINS,
    DEFAULT_AXIS_TOLERANCE, DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW, DEFAULT_VOTE_THRESHOLD,
};
