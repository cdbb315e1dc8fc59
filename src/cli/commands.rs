//! Command implementations

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::container::AppContainer;
use crate::app::{collect_inputs, OutputTarget};
use crate::cli::args::{CutArgs, MergeArgs, RemoveArgs, TrimArgs};
use crate::cli::Commands;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::RangeListParser;
use crate::engine::ProgressFormat;

/// A validated request, ready to run once the tools are confirmed
#[derive(Debug, Clone)]
pub enum PreparedCommand {
    Edit {
        files: Vec<PathBuf>,
        spec: EditSpec,
        target: OutputTarget,
    },
    Merge {
        directory: PathBuf,
        files: Vec<PathBuf>,
        destination: PathBuf,
    },
}

/// Validate arguments and expand inputs without touching external tools
pub fn prepare(command: &Commands, config: &AppConfig) -> Result<PreparedCommand, DomainError> {
    match command {
        Commands::Remove(args) => prepare_remove(args, config),
        Commands::Trim(args) => prepare_trim(args, config),
        Commands::Cut(args) => prepare_cut(args, config),
        Commands::Merge(args) => prepare_merge(args, config),
    }
}

fn prepare_remove(args: &RemoveArgs, config: &AppConfig) -> Result<PreparedCommand, DomainError> {
    let parsed = RangeListParser::parse(&args.ranges);
    if parsed.remove_set.is_empty() {
        return Err(DomainError::BadArgs(format!(
            "no valid ranges in '{}' (expected start-end, e.g. 1:00-2:00)",
            args.ranges
        )));
    }
    if !parsed.skipped.is_empty() {
        warn!("Ignored {} malformed range(s)", parsed.skipped.len());
    }
    for interval in parsed.remove_set.intervals() {
        info!("Will remove {}", interval);
    }

    prepare_edit(
        &args.input,
        args.output.as_deref(),
        EditSpec::RemoveSegments(parsed.remove_set),
        config,
    )
}

fn prepare_trim(args: &TrimArgs, config: &AppConfig) -> Result<PreparedCommand, DomainError> {
    let start = parse_optional_time("start", args.start.as_deref())?;
    let end = parse_optional_time("end", args.end.as_deref())?;

    if let (Some(s), Some(e)) = (start, end) {
        if s.as_seconds() >= e.as_seconds() {
            return Err(DomainError::BadArgs(format!(
                "start {} must be before end {}",
                s, e
            )));
        }
    }

    prepare_edit(
        &args.input,
        args.output.as_deref(),
        EditSpec::TrimEdges { start, end },
        config,
    )
}

fn prepare_cut(args: &CutArgs, config: &AppConfig) -> Result<PreparedCommand, DomainError> {
    let head = parse_time("head", &args.head)?;
    let tail = parse_time("tail", &args.tail)?;

    prepare_edit(
        &args.input,
        args.output.as_deref(),
        EditSpec::CutHeadTail { head, tail },
        config,
    )
}

fn prepare_edit(
    input: &Path,
    output: Option<&Path>,
    spec: EditSpec,
    config: &AppConfig,
) -> Result<PreparedCommand, DomainError> {
    let batch = input.is_dir();
    let files = collect_inputs(input, &config.output.extensions)?;
    if files.is_empty() {
        return Err(DomainError::BadArgs(format!(
            "no video files found in {}",
            input.display()
        )));
    }

    Ok(PreparedCommand::Edit {
        files,
        spec,
        target: OutputTarget::resolve(batch, output),
    })
}

fn prepare_merge(args: &MergeArgs, config: &AppConfig) -> Result<PreparedCommand, DomainError> {
    if !args.directory.is_dir() {
        return Err(DomainError::BadArgs(format!(
            "{} is not a directory",
            args.directory.display()
        )));
    }

    let files = collect_inputs(&args.directory, &config.output.extensions)?;
    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| args.directory.join(&config.output.merged_name));

    Ok(PreparedCommand::Merge {
        directory: args.directory.clone(),
        files,
        destination,
    })
}

fn parse_time(name: &str, value: &str) -> Result<TimeSpec, DomainError> {
    TimeSpec::parse(value).map_err(|e| DomainError::BadArgs(format!("Invalid {} time: {}", name, e)))
}

fn parse_optional_time(name: &str, value: Option<&str>) -> Result<Option<TimeSpec>, DomainError> {
    value.map(|v| parse_time(name, v)).transpose()
}

/// Run a prepared command to completion
pub async fn execute(
    container: &dyn AppContainer,
    prepared: PreparedCommand,
) -> Result<BatchResult, DomainError> {
    match prepared {
        PreparedCommand::Edit {
            files,
            spec,
            target,
        } => {
            container
                .batch_interactor()
                .run_batch(&files, &spec, &target)
                .await
        }
        PreparedCommand::Merge {
            directory,
            files,
            destination,
        } => {
            let mut result = BatchResult::new();
            let status = match container.merge_interactor().merge(&files, &destination).await {
                Ok(EditOutcome::Written { destination, .. }) => FileStatus::Succeeded { destination },
                Ok(EditOutcome::Skipped { reason }) => FileStatus::Skipped { reason },
                Err(e) if e.is_fatal() || matches!(e, DomainError::BadArgs(_)) => return Err(e),
                Err(e) => FileStatus::Failed {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                },
            };
            result.record(directory, status);
            Ok(result)
        }
    }
}

/// Print the final per-file report on stdout
pub fn print_summary(result: &BatchResult, format: ProgressFormat) {
    if format == ProgressFormat::Json {
        match serde_json::to_string(result) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Could not serialize summary: {}", e),
        }
        return;
    }

    for (path, status) in result.files() {
        match status {
            FileStatus::Succeeded { destination } => {
                println!("  ok       {} -> {}", path.display(), destination.display())
            }
            FileStatus::Skipped { reason } => {
                println!("  skipped  {}: {}", path.display(), reason)
            }
            FileStatus::Failed { message, .. } => {
                println!("  failed   {}: {}", path.display(), message)
            }
        }
    }
    println!(
        "{} file(s): {} succeeded, {} failed, {} skipped",
        result.total(),
        result.success_count(),
        result.failure_count(),
        result.skipped_count()
    );
}
