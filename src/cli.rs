//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::progress::OutputMode;

/// OCR preprocessing for scanned handwritten forms
#[derive(Parser, Debug)]
#[command(name = "formclean", version, about, long_about = None)]
pub struct Cli {
    /// Input image (PNG, JPEG, ...)
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Output image; `.jpg`/`.jpeg` writes JPEG, anything else PNG
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Orientation and skew correction (1 = on, 0 = off)
    #[arg(long, value_name = "0|1", default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub deskew: u8,

    /// TOML file with tuning parameters
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the execution plan and effective parameters, then exit
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Is orientation and skew correction enabled?
    pub fn effective_deskew(&self) -> bool {
        self.deskew != 0
    }

    /// Output mode implied by `-q` / `-v`
    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::from_verbosity(self.verbose)
        }
    }

    /// Overrides to apply on top of file configuration
    ///
    /// `--deskew` always has a value, so it always wins over the file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            deskew: Some(self.effective_deskew()),
        }
    }
}
