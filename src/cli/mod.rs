//! CLI module for segcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{CutArgs, EncodeOptions, MergeArgs, OverwriteOptions, RemoveArgs, TrimArgs};

/// segcut - segment-based batch video editing
///
/// Removes time ranges, trims edges and joins videos by driving ffmpeg.
/// Passing a directory as input processes every video in it.
#[derive(Parser, Debug)]
#[command(name = "segcut")]
#[command(about = "segcut - segment-based batch video editing")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Progress output: console, json or none
    #[arg(long, global = true)]
    pub progress: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove time ranges and keep the rest
    Remove(RemoveArgs),
    /// Keep only the span between two times
    Trim(TrimArgs),
    /// Drop a fixed amount from the head and the tail
    Cut(CutArgs),
    /// Join every video in a directory
    Merge(MergeArgs),
}

impl Commands {
    /// Encoder options, for commands that encode
    pub fn encode_options(&self) -> Option<&EncodeOptions> {
        match self {
            Commands::Remove(args) => Some(&args.encode),
            Commands::Trim(args) => Some(&args.encode),
            Commands::Cut(args) => Some(&args.encode),
            Commands::Merge(_) => None,
        }
    }

    pub fn overwrite_options(&self) -> &OverwriteOptions {
        match self {
            Commands::Remove(args) => &args.encode.overwrite,
            Commands::Trim(args) => &args.encode.overwrite,
            Commands::Cut(args) => &args.encode.overwrite,
            Commands::Merge(args) => &args.overwrite,
        }
    }
}
