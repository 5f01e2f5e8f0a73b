//! Preprocessing pipeline
//!
//! Runs the stages in a fixed order:
//!
//! ```text
//! grayscale -> denoise -> [orientation -> skew] -> binarize
//!           -> line removal -> dilation -> inversion
//! ```
//!
//! The bracketed stages only run when correction is enabled. Correction
//! stages never fail; when the evidence is weak they hand the image back
//! unchanged and the reason lands in the [`PipelineReport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use formclean::{PreprocessConfig, Preprocessor};
//! use std::path::Path;
//!
//! let preprocessor = Preprocessor::new(PreprocessConfig::default());
//! let report = preprocessor
//!     .process_file(Path::new("scan.jpg"), Path::new("clean.png"))
//!     .unwrap();
//! println!("{}", report.to_json());
//! ```

mod types;

pub use types::{
    Fallback, Orientation, OrientationDecision, OrientationScores, PipelineError, PipelineReport,
    Result, SkewEstimate, StageOutcome, StageRecord, StageResult,
};

use image::{imageops, DynamicImage, GrayImage};
use imageproc::filter::median_filter;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::cleanup::{dilate_square, Binarizer, RuledLineRemover};
use crate::codec::{ImageCodec, OutputFormat};
use crate::config::PreprocessConfig;
use crate::orientation::OrientationClassifier;
use crate::progress::{ProcessingStage, ProgressCallback, SilentProgress};
use crate::skew::SkewCorrector;

/// Image and report produced by one run
#[derive(Debug, Clone)]
pub struct PreprocessOutput {
    /// Single-channel, black ink on white
    pub image: GrayImage,
    pub report: PipelineReport,
}

/// Preprocessing pipeline
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Effective configuration
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Run every stage on a decoded image
    pub fn process(&self, image: &DynamicImage) -> Result<PreprocessOutput> {
        self.process_with_progress(image, &SilentProgress)
    }

    /// Run every stage, reporting each one to `progress`
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process_with_progress(
        &self,
        image: &DynamicImage,
        progress: &dyn ProgressCallback,
    ) -> Result<PreprocessOutput> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Read("image has zero dimensions".to_string()));
        }

        let config = &self.config;
        let mut report = PipelineReport {
            input_size: (image.width(), image.height()),
            ..Default::default()
        };

        // Grayscale
        progress.on_stage_start(ProcessingStage::Grayscale);
        let gray = image.to_luma8();
        finish(&mut report, progress, ProcessingStage::Grayscale, StageOutcome::Applied);

        // Denoise
        progress.on_stage_start(ProcessingStage::Denoising);
        let radius = config.binarize.denoise_radius;
        let gray = if radius > 0 {
            median_filter(&gray, radius, radius)
        } else {
            gray
        };
        finish(&mut report, progress, ProcessingStage::Denoising, StageOutcome::Applied);

        // Orientation and skew
        let gray = if config.deskew {
            progress.on_stage_start(ProcessingStage::Orientation);
            let oriented =
                OrientationClassifier::correct(gray, &config.lines, &config.orientation);
            let outcome = match &oriented {
                StageResult::Corrected { detail, .. } => {
                    report.orientation = Some(*detail);
                    StageOutcome::Corrected {
                        message: format!("rotated {} degrees", detail.orientation.degrees()),
                    }
                }
                StageResult::Unchanged { reason, .. } => {
                    StageOutcome::Unchanged { fallback: *reason }
                }
            };
            finish(&mut report, progress, ProcessingStage::Orientation, outcome);

            progress.on_stage_start(ProcessingStage::Deskewing);
            let deskewed =
                SkewCorrector::correct(oriented.into_image(), &config.lines, &config.skew);
            let outcome = match &deskewed {
                StageResult::Corrected { detail, .. } => {
                    report.skew = Some(*detail);
                    StageOutcome::Corrected {
                        message: format!(
                            "rotated {:.2} degrees from {} lines",
                            -detail.angle, detail.line_count
                        ),
                    }
                }
                StageResult::Unchanged { reason, .. } => {
                    StageOutcome::Unchanged { fallback: *reason }
                }
            };
            finish(&mut report, progress, ProcessingStage::Deskewing, outcome);
            deskewed.into_image()
        } else {
            report.record(ProcessingStage::Orientation, StageOutcome::Skipped);
            report.record(ProcessingStage::Deskewing, StageOutcome::Skipped);
            progress.on_debug("orientation and skew correction disabled");
            gray
        };

        // Binarize (the image is already denoised)
        progress.on_stage_start(ProcessingStage::Binarizing);
        let binary = Binarizer::threshold(&gray, &config.binarize);
        progress.on_debug(&format!("{} foreground pixels", binary.foreground_count()));
        finish(&mut report, progress, ProcessingStage::Binarizing, StageOutcome::Applied);

        // Ruled-line removal
        progress.on_stage_start(ProcessingStage::LineRemoval);
        let removal = RuledLineRemover::remove(&binary, &config.line_removal)?;
        report.ruling_pixels_removed = removal.removed_pixels;
        progress.on_debug(&format!(
            "element lengths {}x1 and 1x{}",
            removal.horizontal_length, removal.vertical_length
        ));
        finish(&mut report, progress, ProcessingStage::LineRemoval, StageOutcome::Applied);

        // Dilation
        progress.on_stage_start(ProcessingStage::Dilating);
        let dilated = dilate_square(&removal.image, config.output.dilation_size);
        finish(&mut report, progress, ProcessingStage::Dilating, StageOutcome::Applied);

        // Inversion
        progress.on_stage_start(ProcessingStage::Inverting);
        let mut output = dilated.into_gray();
        imageops::invert(&mut output);
        finish(&mut report, progress, ProcessingStage::Inverting, StageOutcome::Applied);

        report.output_size = output.dimensions();
        info!(
            input = ?report.input_size,
            output = ?report.output_size,
            ruling_pixels_removed = report.ruling_pixels_removed,
            "Preprocessing complete"
        );

        Ok(PreprocessOutput {
            image: output,
            report,
        })
    }

    /// Decode bytes and run the pipeline
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<PreprocessOutput> {
        let image = ImageCodec::decode(bytes)?;
        self.process(&image)
    }

    /// Read `input`, preprocess it and write the result to `output`
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<PipelineReport> {
        self.process_file_with_progress(input, output, &SilentProgress)
    }

    /// [`Preprocessor::process_file`] with progress reporting
    ///
    /// The output file is only created once the whole image has been
    /// processed and encoded.
    pub fn process_file_with_progress(
        &self,
        input: &Path,
        output: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PipelineReport> {
        progress.on_stage_start(ProcessingStage::Decoding);
        let image = ImageCodec::read(input)?;
        progress.on_stage_complete(
            ProcessingStage::Decoding,
            &format!("{}x{}", image.width(), image.height()),
        );

        let PreprocessOutput { image, mut report } = self.process_with_progress(&image, progress)?;

        progress.on_stage_start(ProcessingStage::Encoding);
        ImageCodec::write(output, &image, &self.config.output.encode_options())?;
        let format = OutputFormat::from_path(output);
        report.record(ProcessingStage::Encoding, StageOutcome::Applied);
        progress.on_stage_complete(ProcessingStage::Encoding, &format!("{:?}", format));

        debug!(output = %output.display(), "Output written");
        progress.on_stage_complete(ProcessingStage::Completed, &output.display().to_string());
        Ok(report)
    }
}

/// Record a stage outcome and tell the observer
fn finish(
    report: &mut PipelineReport,
    progress: &dyn ProgressCallback,
    stage: ProcessingStage,
    outcome: StageOutcome,
) {
    let message = match &outcome {
        StageOutcome::Applied => "done".to_string(),
        StageOutcome::Corrected { message } => message.clone(),
        StageOutcome::Unchanged { fallback } => format!("unchanged ({:?})", fallback),
        StageOutcome::Skipped => "skipped".to_string(),
    };
    progress.on_stage_complete(stage, &message);
    report.record(stage, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::FOREGROUND;
    use image::Luma;
    use std::cell::RefCell;

    fn ruled_page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (40..height - 40).contains(&y) && y % 40 < 5 && (20..width - 20).contains(&x) {
                Luma([20])
            } else {
                Luma([235])
            }
        })
    }

    struct Recorder(RefCell<Vec<ProcessingStage>>);

    impl ProgressCallback for Recorder {
        fn on_stage_start(&self, stage: ProcessingStage) {
            self.0.borrow_mut().push(stage);
        }

        fn on_stage_complete(&self, _stage: ProcessingStage, _message: &str) {}
    }

    #[test]
    fn test_uniform_page_becomes_white() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([200])));
        let out = Preprocessor::new(PreprocessConfig::default())
            .process(&image)
            .unwrap();

        assert_eq!(out.image.dimensions(), (100, 100));
        assert!(out.image.pixels().all(|p| p.0[0] == 255));
        assert_eq!(out.report.ruling_pixels_removed, 0);
        assert_eq!(
            out.report.outcome(ProcessingStage::Orientation),
            Some(&StageOutcome::Unchanged {
                fallback: Fallback::InsufficientDominance {
                    horizontal: 0,
                    vertical: 0
                }
            })
        );
        assert_eq!(
            out.report.outcome(ProcessingStage::Deskewing),
            Some(&StageOutcome::Unchanged {
                fallback: Fallback::NoLinesDetected
            })
        );
    }

    #[test]
    fn test_color_input_is_accepted() {
        let rgb = image::RgbImage::from_pixel(40, 30, image::Rgb([200, 180, 160]));
        let out = Preprocessor::new(PreprocessConfig::default())
            .process(&DynamicImage::ImageRgb8(rgb))
            .unwrap();
        assert_eq!(out.image.dimensions(), (40, 30));
    }

    #[test]
    fn test_zero_dimension_is_read_error() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 10));
        let result = Preprocessor::new(PreprocessConfig::default()).process(&image);
        assert!(matches!(result, Err(PipelineError::Read(_))));
    }

    #[test]
    fn test_deskew_disabled_skips_correction() {
        let config = PreprocessConfig {
            deskew: false,
            ..Default::default()
        };
        let image = DynamicImage::ImageLuma8(ruled_page(300, 300));
        let out = Preprocessor::new(config).process(&image).unwrap();

        assert_eq!(
            out.report.outcome(ProcessingStage::Orientation),
            Some(&StageOutcome::Skipped)
        );
        assert_eq!(
            out.report.outcome(ProcessingStage::Deskewing),
            Some(&StageOutcome::Skipped)
        );
        assert!(out.report.orientation.is_none());
        assert!(out.report.skew.is_none());
    }

    #[test]
    fn test_ruling_is_removed() {
        let config = PreprocessConfig {
            deskew: false,
            ..Default::default()
        };
        let image = DynamicImage::ImageLuma8(ruled_page(300, 300));
        let out = Preprocessor::new(config).process(&image).unwrap();

        assert!(out.report.ruling_pixels_removed > 0);
        let ink = out.image.pixels().filter(|p| p.0[0] != 255).count();
        assert_eq!(ink, 0);
    }

    #[test]
    fn test_output_is_two_level() {
        let gray = GrayImage::from_fn(120, 80, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let out = Preprocessor::new(PreprocessConfig::default())
            .process(&DynamicImage::ImageLuma8(gray))
            .unwrap();
        assert!(out
            .image
            .pixels()
            .all(|p| p.0[0] == 0 || p.0[0] == FOREGROUND));
    }

    #[test]
    fn test_progress_sees_every_stage_in_order() {
        let recorder = Recorder(RefCell::new(Vec::new()));
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128])));
        Preprocessor::new(PreprocessConfig::default())
            .process_with_progress(&image, &recorder)
            .unwrap();
        assert_eq!(*recorder.0.borrow(), ProcessingStage::PIPELINE.to_vec());
    }

    #[test]
    fn test_report_lists_all_stages() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128])));
        let out = Preprocessor::new(PreprocessConfig::default())
            .process(&image)
            .unwrap();
        let stages: Vec<_> = out.report.stages.iter().map(|r| r.stage).collect();
        assert_eq!(stages, ProcessingStage::PIPELINE.to_vec());
        assert!(out.report.to_json().contains("\"line_removal\""));
    }

    #[test]
    fn test_process_bytes_rejects_empty() {
        let result = Preprocessor::new(PreprocessConfig::default()).process_bytes(&[]);
        assert!(matches!(result, Err(PipelineError::Read(_))));
    }
}
