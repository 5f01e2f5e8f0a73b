//! Canny + Hough line detection

use image::GrayImage;
use imageproc::edges::canny;
use tracing::debug;

use super::types::{AxisCounts, Line, LineDetectionOptions, ANGLE_BINS};

/// Smallest image side that can produce meaningful edges
const MIN_DETECTABLE_SIDE: u32 = 3;

/// Line detector based on a Hough vote accumulator
pub struct LineDetector;

impl LineDetector {
    /// Detect candidate lines, strongest first
    ///
    /// Returns an empty vector when no accumulator cell clears the vote
    /// threshold. Callers treat that as "no correction possible".
    pub fn detect(gray: &GrayImage, options: &LineDetectionOptions) -> Vec<Line> {
        let (width, height) = gray.dimensions();
        if width < MIN_DETECTABLE_SIDE || height < MIN_DETECTABLE_SIDE {
            return Vec::new();
        }

        let edges = canny(gray, options.canny_low, options.canny_high);
        let accumulator = HoughAccumulator::vote(&edges);
        let lines = accumulator.peaks(options.vote_threshold);

        debug!(
            width,
            height,
            edge_pixels = accumulator.edge_pixels,
            line_count = lines.len(),
            "Hough lines detected"
        );

        lines
    }

    /// Count near-horizontal and near-vertical lines among the first `limit`
    pub fn axis_counts(lines: &[Line], limit: usize, tolerance: f32) -> AxisCounts {
        let mut counts = AxisCounts::default();
        for line in lines.iter().take(limit) {
            if line.is_horizontal(tolerance) {
                counts.horizontal += 1;
            } else if line.is_vertical(tolerance) {
                counts.vertical += 1;
            }
        }
        counts
    }

    /// Detect lines and count axis-aligned ones in one call
    pub fn detect_axis_counts(
        gray: &GrayImage,
        options: &LineDetectionOptions,
        limit: usize,
        tolerance: f32,
    ) -> AxisCounts {
        let lines = Self::detect(gray, options);
        Self::axis_counts(&lines, limit, tolerance)
    }
}

// ============================================================
// Accumulator
// ============================================================

/// Vote accumulator over (normal angle, distance)
///
/// Stored with one cell of zero padding on every side so the
/// neighbourhood test never leaves the buffer.
struct HoughAccumulator {
    votes: Vec<u32>,
    num_rho: usize,
    edge_pixels: usize,
}

impl HoughAccumulator {
    fn vote(edges: &GrayImage) -> Self {
        let (width, height) = edges.dimensions();
        let num_rho = ((width + height) * 2 + 1) as usize;
        let stride = num_rho + 2;
        let mut votes = vec![0u32; (ANGLE_BINS + 2) * stride];

        let trig: Vec<(f32, f32)> = (0..ANGLE_BINS)
            .map(|n| {
                let theta = (n as f32).to_radians();
                (theta.cos(), theta.sin())
            })
            .collect();
        let rho_offset = ((num_rho - 1) / 2) as i64;

        let mut edge_pixels = 0;
        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel.0[0] == 0 {
                continue;
            }
            edge_pixels += 1;
            let (fx, fy) = (x as f32, y as f32);
            for (n, &(cos, sin)) in trig.iter().enumerate() {
                let r = (fx * cos + fy * sin).round() as i64 + rho_offset;
                votes[(n + 1) * stride + r as usize + 1] += 1;
            }
        }

        Self {
            votes,
            num_rho,
            edge_pixels,
        }
    }

    /// Local maxima strictly above `threshold`, sorted by votes descending
    fn peaks(&self, threshold: u32) -> Vec<Line> {
        let stride = self.num_rho + 2;
        let half_range = (self.num_rho - 1) as f32 * 0.5;
        let mut lines = Vec::new();

        for n in 0..ANGLE_BINS {
            for r in 0..self.num_rho {
                let base = (n + 1) * stride + r + 1;
                let v = self.votes[base];
                if v > threshold
                    && v > self.votes[base - 1]
                    && v >= self.votes[base + 1]
                    && v > self.votes[base - stride]
                    && v >= self.votes[base + stride]
                {
                    lines.push(Line {
                        distance: r as f32 - half_range,
                        angle: ((n + 90) % ANGLE_BINS) as f32,
                        votes: v,
                    });
                }
            }
        }

        // Stable: equal votes keep scan order (angle, then distance)
        lines.sort_by(|a, b| b.votes.cmp(&a.votes));
        lines
    }
}
