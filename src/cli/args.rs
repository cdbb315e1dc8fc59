//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

fn quality_in_range(s: &str) -> Result<u8, String> {
    clap_num::number_range(s, 0, 51)
}

/// Encoder selection shared by the editing commands
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Encoder: copy (lossless, keyframe-aligned), software or hardware
    #[arg(long)]
    pub encoder: Option<String>,

    /// Hardware backend: amf, nvenc or qsv
    #[arg(long)]
    pub hw_backend: Option<String>,

    /// Constant Rate Factor for software encoding (0-51)
    #[arg(long, value_parser = quality_in_range)]
    pub crf: Option<u8>,

    /// Software encoding preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Constant quantizer for hardware encoding (0-51)
    #[arg(long, value_parser = quality_in_range)]
    pub quality: Option<u8>,

    #[command(flatten)]
    pub overwrite: OverwriteOptions,
}

/// Overwrite behavior for existing outputs
#[derive(Args, Debug, Clone, Default)]
pub struct OverwriteOptions {
    /// Overwrite existing outputs without asking
    #[arg(short = 'y', long, conflicts_with = "no_clobber")]
    pub yes: bool,

    /// Never overwrite existing outputs
    #[arg(long)]
    pub no_clobber: bool,
}

/// Arguments for the remove command
#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Input video file or directory
    pub input: PathBuf,

    /// Ranges to remove, e.g. "1:00-2:00,5:00-6:00"
    pub ranges: String,

    /// Output file, or output directory in batch mode
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub encode: EncodeOptions,
}

/// Arguments for the trim command
#[derive(Args, Debug, Clone)]
pub struct TrimArgs {
    /// Input video file or directory
    pub input: PathBuf,

    /// Keep from this time (default: start of video)
    pub start: Option<String>,

    /// Keep until this time (default: end of video)
    pub end: Option<String>,

    /// Output file, or output directory in batch mode
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub encode: EncodeOptions,
}

/// Arguments for the cut command
#[derive(Args, Debug, Clone)]
pub struct CutArgs {
    /// Input video file or directory
    pub input: PathBuf,

    /// Amount to drop from the start
    #[arg(long, default_value = "29")]
    pub head: String,

    /// Amount to drop from the end
    #[arg(long, default_value = "25")]
    pub tail: String,

    /// Output file, or output directory in batch mode
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub encode: EncodeOptions,
}

/// Arguments for the merge command
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Directory of videos to join in name order
    pub directory: PathBuf,

    /// Output file (default: merged_output.mp4 inside the directory)
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overwrite: OverwriteOptions,
}
