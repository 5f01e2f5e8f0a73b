//! Progress reporting for the preprocessing pipeline.
//!
//! Names each pipeline stage and defines the callback through which a
//! caller observes a run.

use serde::Serialize;
use std::fmt;

/// Processing stages of a preprocessing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    /// Decoding input bytes
    #[default]
    Decoding,
    /// Converting to a single channel
    Grayscale,
    /// Median blur
    Denoising,
    /// Quarter-turn orientation fix
    Orientation,
    /// Small-angle skew fix
    Deskewing,
    /// Adaptive threshold
    Binarizing,
    /// Ruled-line removal
    LineRemoval,
    /// Stroke-connecting dilation
    Dilating,
    /// Black-on-white polarity
    Inverting,
    /// Encoding output bytes
    Encoding,
    /// Completed
    Completed,
}

impl ProcessingStage {
    /// Stages run by the core pipeline, in order
    pub const PIPELINE: [ProcessingStage; 8] = [
        ProcessingStage::Grayscale,
        ProcessingStage::Denoising,
        ProcessingStage::Orientation,
        ProcessingStage::Deskewing,
        ProcessingStage::Binarizing,
        ProcessingStage::LineRemoval,
        ProcessingStage::Dilating,
        ProcessingStage::Inverting,
    ];

    /// Get the name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Decoding => "Decoding",
            ProcessingStage::Grayscale => "Grayscale",
            ProcessingStage::Denoising => "Denoising",
            ProcessingStage::Orientation => "Orientation",
            ProcessingStage::Deskewing => "Deskewing",
            ProcessingStage::Binarizing => "Binarizing",
            ProcessingStage::LineRemoval => "LineRemoval",
            ProcessingStage::Dilating => "Dilating",
            ProcessingStage::Inverting => "Inverting",
            ProcessingStage::Encoding => "Encoding",
            ProcessingStage::Completed => "Completed",
        }
    }

    /// Short human description of the stage
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Decoding => "reading input image",
            ProcessingStage::Grayscale => "converting to grayscale",
            ProcessingStage::Denoising => "removing scan speckle",
            ProcessingStage::Orientation => "checking page orientation",
            ProcessingStage::Deskewing => "correcting skew",
            ProcessingStage::Binarizing => "isolating ink",
            ProcessingStage::LineRemoval => "removing ruled lines",
            ProcessingStage::Dilating => "reconnecting strokes",
            ProcessingStage::Inverting => "inverting polarity",
            ProcessingStage::Encoding => "writing output image",
            ProcessingStage::Completed => "done",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Normal output (errors and summary)
    #[default]
    Normal,
    /// Verbose output (stage display)
    Verbose,
    /// Very verbose (stage details)
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }

    /// Default tracing filter directive for this mode
    pub fn log_directive(&self) -> &'static str {
        match self {
            OutputMode::Quiet => "error",
            OutputMode::Normal => "warn",
            OutputMode::Verbose => "info",
            OutputMode::VeryVerbose => "debug",
        }
    }
}

/// Observer for pipeline progress
pub trait ProgressCallback {
    /// A stage is about to run
    fn on_stage_start(&self, stage: ProcessingStage);

    /// A stage finished, with a one-line summary
    fn on_stage_complete(&self, stage: ProcessingStage, message: &str);

    /// Detailed diagnostic message
    fn on_debug(&self, _message: &str) {}
}

/// Progress callback that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_stage_start(&self, _stage: ProcessingStage) {}

    fn on_stage_complete(&self, _stage: ProcessingStage, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_processing_stage_name() {
        assert_eq!(ProcessingStage::Decoding.name(), "Decoding");
        assert_eq!(ProcessingStage::Orientation.name(), "Orientation");
        assert_eq!(ProcessingStage::Deskewing.name(), "Deskewing");
        assert_eq!(ProcessingStage::LineRemoval.name(), "LineRemoval");
        assert_eq!(ProcessingStage::Completed.name(), "Completed");
    }

    #[test]
    fn test_processing_stage_display() {
        let display = format!("{}", ProcessingStage::LineRemoval);
        assert_eq!(display, "LineRemoval (removing ruled lines)");
    }

    #[test]
    fn test_processing_stage_default() {
        let stage: ProcessingStage = Default::default();
        assert_eq!(stage, ProcessingStage::Decoding);
    }

    #[test]
    fn test_pipeline_order() {
        let order = ProcessingStage::PIPELINE;
        let pos = |s| order.iter().position(|&x| x == s).unwrap();
        assert!(pos(ProcessingStage::Orientation) < pos(ProcessingStage::Deskewing));
        assert!(pos(ProcessingStage::Binarizing) < pos(ProcessingStage::LineRemoval));
        assert_eq!(order[order.len() - 1], ProcessingStage::Inverting);
    }

    #[test]
    fn test_output_mode_from_verbosity() {
        assert_eq!(OutputMode::from_verbosity(0), OutputMode::Normal);
        assert_eq!(OutputMode::from_verbosity(1), OutputMode::Verbose);
        assert_eq!(OutputMode::from_verbosity(2), OutputMode::VeryVerbose);
        assert_eq!(OutputMode::from_verbosity(10), OutputMode::VeryVerbose);
    }

    #[test]
    fn test_output_mode_quiet() {
        let mode = OutputMode::Quiet;
        assert!(!mode.should_show(OutputMode::Quiet));
        assert!(!mode.should_show(OutputMode::Normal));
        assert!(!mode.should_show(OutputMode::Verbose));
    }

    #[test]
    fn test_output_mode_verbose() {
        let mode = OutputMode::Verbose;
        assert!(mode.should_show(OutputMode::Normal));
        assert!(mode.should_show(OutputMode::Verbose));
        assert!(!mode.should_show(OutputMode::VeryVerbose));
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(OutputMode::Normal.log_directive(), "warn");
        assert_eq!(OutputMode::VeryVerbose.log_directive(), "debug");
    }

    #[test]
    fn test_callback_default_debug_is_noop() {
        struct Recorder(RefCell<Vec<ProcessingStage>>);
        impl ProgressCallback for Recorder {
            fn on_stage_start(&self, stage: ProcessingStage) {
                self.0.borrow_mut().push(stage);
            }
            fn on_stage_complete(&self, _stage: ProcessingStage, _message: &str) {}
        }

        let recorder = Recorder(RefCell::new(Vec::new()));
        recorder.on_stage_start(ProcessingStage::Binarizing);
        recorder.on_debug("ignored");
        assert_eq!(*recorder.0.borrow(), vec![ProcessingStage::Binarizing]);
    }
}
