//! Pipeline core types
//!
//! Stage outcomes, fallback reasons, the per-run report and the boundary
//! error type.

use image::GrayImage;
use serde::Serialize;
use thiserror::Error;

use crate::cleanup::CleanupError;
use crate::lines::AxisCounts;
use crate::progress::ProcessingStage;

// ============================================================
// Error Types
// ============================================================

/// Pipeline error types
///
/// Only boundary failures are errors. Weak or missing correction signals
/// are reported through [`StageResult::Unchanged`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read input: {0}")]
    Read(String),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(#[from] CleanupError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================
// Stage Outcomes
// ============================================================

/// Why a correction stage left its input untouched
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Fallback {
    /// The line detector returned nothing
    NoLinesDetected,
    /// Lines were found but none close to a cardinal axis
    NoAlignedLines,
    /// Estimated skew is smaller than the correction epsilon
    BelowThreshold { angle: f32 },
    /// Vertical evidence does not dominate strongly enough to try rotating
    InsufficientDominance { horizontal: usize, vertical: usize },
    /// Rotated candidates were evaluated but none beat the original
    OriginalIsBest,
}

/// Result of a correction stage: either a new image or the input returned
/// unchanged, with the reason
#[derive(Debug, Clone)]
pub enum StageResult<D> {
    Corrected { image: GrayImage, detail: D },
    Unchanged { image: GrayImage, reason: Fallback },
}

impl<D> StageResult<D> {
    /// Was a correction applied?
    pub fn is_corrected(&self) -> bool {
        matches!(self, StageResult::Corrected { .. })
    }

    /// Borrow the resulting image
    pub fn image(&self) -> &GrayImage {
        match self {
            StageResult::Corrected { image, .. } | StageResult::Unchanged { image, .. } => image,
        }
    }

    /// Consume the result and return the image
    pub fn into_image(self) -> GrayImage {
        match self {
            StageResult::Corrected { image, .. } | StageResult::Unchanged { image, .. } => image,
        }
    }

    /// Fallback reason, if nothing was changed
    pub fn fallback(&self) -> Option<Fallback> {
        match self {
            StageResult::Corrected { .. } => None,
            StageResult::Unchanged { reason, .. } => Some(*reason),
        }
    }
}

// ============================================================
// Stage Details
// ============================================================

/// Orientation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// No rotation
    #[default]
    Upright,
    /// Rotate +90 degrees (clockwise)
    Clockwise90,
    /// Rotate -90 degrees (counter-clockwise)
    CounterClockwise90,
}

impl Orientation {
    /// Signed rotation in degrees
    pub fn degrees(&self) -> i32 {
        match self {
            Orientation::Upright => 0,
            Orientation::Clockwise90 => 90,
            Orientation::CounterClockwise90 => -90,
        }
    }
}

/// Horizontal-line scores of the three orientation candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrientationScores {
    pub upright: usize,
    pub clockwise: usize,
    pub counter_clockwise: usize,
}

/// Orientation classifier detail for an applied rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationDecision {
    pub orientation: Orientation,
    /// Axis counts of the original image
    pub original: AxisCounts,
    pub scores: OrientationScores,
}

/// Skew estimator detail
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkewEstimate {
    /// Median deviation from the nearest axis (degrees, positive = clockwise)
    pub angle: f32,
    /// Number of axis-aligned lines used for the median
    pub line_count: usize,
}

// ============================================================
// Report
// ============================================================

/// Outcome of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Stage ran unconditionally
    Applied,
    /// Correction stage changed the image
    Corrected { message: String },
    /// Correction stage left the image as it was
    Unchanged { fallback: Fallback },
    /// Stage disabled by configuration
    Skipped,
}

/// Per-stage record of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: ProcessingStage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// What a pipeline run did, stage by stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageRecord>,
    pub input_size: (u32, u32),
    pub output_size: (u32, u32),
    pub orientation: Option<OrientationDecision>,
    pub skew: Option<SkewEstimate>,
    /// Foreground pixels removed as ruling
    pub ruling_pixels_removed: u64,
}

impl PipelineReport {
    pub(crate) fn record(&mut self, stage: ProcessingStage, outcome: StageOutcome) {
        self.stages.push(StageRecord { stage, outcome });
    }

    /// Outcome recorded for a stage, if it ran
    pub fn outcome(&self, stage: ProcessingStage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
