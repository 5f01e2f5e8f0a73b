//! formclean - OCR preprocessing for scanned handwritten forms
//!
//! Takes a scanned form and produces a clean black-on-white image for a
//! stroke recognizer:
//!
//! - Sideways pages are turned upright and small skew is straightened
//! - Ink is separated from paper with a local adaptive threshold
//! - Printed ruling and grid lines are erased, handwriting is kept
//!
//! # Modules
//!
//! - [`lines`] - Canny + Hough line detection
//! - [`orientation`] - Quarter-turn orientation correction
//! - [`skew`] - Small-angle skew estimation and correction
//! - [`cleanup`] - Binarization, ruled-line removal, morphology
//! - [`pipeline`] - Stage orchestration and run reports
//! - [`codec`] - Image decode/encode at the I/O boundary
//! - [`config`] - Tunable parameters and TOML loading
//! - [`progress`] - Stage names and progress callbacks
//! - [`transform`] - Rotations
//! - [`cli`] - Command-line arguments

pub mod cleanup;
pub mod cli;
pub mod codec;
pub mod config;
pub mod lines;
pub mod orientation;
pub mod pipeline;
pub mod progress;
pub mod skew;
pub mod transform;

// Re-exports for convenience
pub use cleanup::{
    BinarizeOptions, Binarizer, BinaryImage, CleanupError, LineRemovalOptions, LineRemovalResult,
    RuledLineRemover,
};
pub use cli::Cli;
pub use codec::{EncodeOptions, ImageCodec, OutputFormat, PngCompression};
pub use config::{CliOverrides, ConfigError, OutputConfig, PreprocessConfig};
pub use lines::{AxisCounts, Line, LineDetectionOptions, LineDetector};
pub use orientation::{OrientationClassifier, OrientationOptions};
pub use pipeline::{
    Fallback, Orientation, OrientationDecision, PipelineError, PipelineReport, PreprocessOutput,
    Preprocessor, SkewEstimate, StageOutcome, StageResult,
};
pub use progress::{OutputMode, ProcessingStage, ProgressCallback, SilentProgress};
pub use skew::{SkewCorrector, SkewOptions};

/// Process exit codes
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Invalid configuration or other non-I/O failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Input could not be read or decoded
    pub const READ_ERROR: i32 = 2;
    /// Output could not be encoded or written
    pub const WRITE_ERROR: i32 = 3;
}
