//! formclean - OCR preprocessing for scanned handwritten forms
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formclean::{
    exit_codes, Cli, OutputMode, PipelineError, PreprocessConfig, Preprocessor,
    ProcessingStage, ProgressCallback,
};

fn main() {
    let cli = Cli::parse();
    let mode = cli.output_mode();
    init_tracing(mode);

    std::process::exit(match run(&cli, mode) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(&e)
        }
    });
}

/// Install the stderr subscriber; `RUST_LOG` overrides the verbosity flags
fn init_tracing(mode: OutputMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.log_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::Read(_)) => exit_codes::READ_ERROR,
        Some(PipelineError::Write(_)) => exit_codes::WRITE_ERROR,
        _ => exit_codes::GENERAL_ERROR,
    }
}

// ============ Progress Callback Implementation ============

/// Stage-by-stage progress on stdout
struct VerboseProgress {
    mode: OutputMode,
}

impl VerboseProgress {
    fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl ProgressCallback for VerboseProgress {
    fn on_stage_start(&self, stage: ProcessingStage) {
        if self.mode.should_show(OutputMode::Verbose) {
            println!("  {}", stage);
        }
    }

    fn on_stage_complete(&self, stage: ProcessingStage, message: &str) {
        if self.mode.should_show(OutputMode::Verbose) {
            println!("    {}: {}", stage.name(), message);
        }
    }

    fn on_debug(&self, message: &str) {
        if self.mode.should_show(OutputMode::VeryVerbose) {
            println!("    [DEBUG] {}", message);
        }
    }
}

// ============ Run ============

fn run(cli: &Cli, mode: OutputMode) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let file_config = match &cli.config {
        Some(path) => PreprocessConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PreprocessConfig::default(),
    };
    let config = file_config.merge_with_cli(&cli.overrides());
    config.validate()?;

    let preprocessor = Preprocessor::new(config);

    if cli.dry_run {
        print_execution_plan(cli, preprocessor.config());
        return Ok(());
    }

    let progress = VerboseProgress::new(mode);
    let report = preprocessor.process_file_with_progress(&cli.input, &cli.output, &progress)?;

    if mode.should_show(OutputMode::Verbose) {
        println!();
        println!("{}", report.to_json());
    }
    if mode.should_show(OutputMode::Normal) {
        println!(
            "{} -> {} ({}x{}, {:.2}s)",
            cli.input.display(),
            cli.output.display(),
            report.output_size.0,
            report.output_size.1,
            start_time.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Print execution plan for dry-run mode
fn print_execution_plan(cli: &Cli, config: &PreprocessConfig) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", cli.input.display());
    println!("Output: {}", cli.output.display());
    if let Some(path) = &cli.config {
        println!("Config: {}", path.display());
    }
    println!();
    println!("Pipeline:");
    println!("  1. Grayscale");
    println!("  2. Median denoise (radius {})", config.binarize.denoise_radius);
    if config.deskew {
        println!("  3. Orientation + Skew Correction: ENABLED");
    } else {
        println!("  3. Orientation + Skew Correction: DISABLED");
    }
    println!(
        "  4. Adaptive Threshold (block {}, offset {})",
        config.binarize.block_size, config.binarize.offset
    );
    println!("  5. Ruled-Line Removal");
    println!("  6. Dilation ({}x{})", config.output.dilation_size, config.output.dilation_size);
    println!("  7. Inversion");
    println!();
    println!("Effective parameters:");
    println!("{}", config.to_json());
}
