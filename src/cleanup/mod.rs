//! Cleanup module for binary image post-processing
//!
//! Turns a corrected grayscale page into clean two-level handwriting:
//!
//! # Features
//!
//! - **Binarize** ([`binarize`]) - Median denoise plus local adaptive mean threshold
//! - **Line Removal** ([`line_removal`]) - Erase printed ruling, keep strokes
//! - **Morphology** ([`morphology`]) - Line openings and stroke-connecting dilation

pub mod binarize;
pub mod line_removal;
pub mod morphology;
mod types;

// Re-export public API
pub use binarize::{BinarizeOptions, BinarizeOptionsBuilder, Binarizer};

pub use line_removal::{LineRemovalOptions, LineRemovalResult, RuledLineRemover};

pub use morphology::{dilate_square, MAX_DILATION_SIZE};

pub use types::{BinaryImage, CleanupError, Result, BACKGROUND, FOREGROUND};
