//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::AppConfig;
use crate::cli::Cli;
use crate::domain::errors::DomainError;
use crate::domain::model::{EncoderKind, HardwareBackend, OverwritePolicy};
use crate::engine::ProgressFormat;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SEGCUT_CONFIG";

/// Configuration after all layers were applied
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// File the base layer came from, if any
    pub source: Option<PathBuf>,
    /// Environment variables that overrode a setting
    pub env_overrides: Vec<String>,
}

/// Build the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<LoadedConfig, DomainError> {
    let cwd = std::env::current_dir()?;
    load_layers(cli, &cwd, |key| std::env::var(key).ok())
}

/// Layering with an injectable environment, for tests
pub fn load_layers<F>(cli: &Cli, base: &Path, env: F) -> Result<LoadedConfig, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = cli.config.clone().or_else(|| env(CONFIG_ENV).map(PathBuf::from));

    let (mut config, source) = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(DomainError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            (AppConfig::load_file(&path)?, Some(path))
        }
        None => match AppConfig::discover(base) {
            Some(path) => (AppConfig::load_file(&path)?, Some(path)),
            None => (AppConfig::default(), None),
        },
    };

    let env_overrides = apply_environment_overrides(&mut config, &env)?;
    apply_cli_overrides(&mut config, cli)?;
    config.validate()?;

    Ok(LoadedConfig {
        config,
        source,
        env_overrides,
    })
}

/// Apply `SEGCUT_*` variables; returns the names that were set
pub fn apply_environment_overrides<F>(
    config: &mut AppConfig,
    env: &F,
) -> Result<Vec<String>, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    let mut take = |key: &str| {
        let value = env(key).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            applied.push(key.to_string());
        }
        value
    };

    if let Some(v) = take("SEGCUT_LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = take("SEGCUT_LOG_JSON") {
        config.logging.json = parse_bool("SEGCUT_LOG_JSON", &v)?;
    }
    if let Some(v) = take("SEGCUT_PROGRESS") {
        config.progress.format = ProgressFormat::parse(&v)?;
    }
    if let Some(v) = take("SEGCUT_ENCODER") {
        config.encoding.encoder = EncoderKind::parse(&v)?;
    }
    if let Some(v) = take("SEGCUT_HW_BACKEND") {
        config.encoding.hw_backend = HardwareBackend::parse(&v)?;
    }
    if let Some(v) = take("SEGCUT_CRF") {
        config.encoding.crf = parse_number("SEGCUT_CRF", &v)?;
    }
    if let Some(v) = take("SEGCUT_PRESET") {
        config.encoding.preset = v;
    }
    if let Some(v) = take("SEGCUT_QUALITY") {
        config.encoding.quality = parse_number("SEGCUT_QUALITY", &v)?;
    }
    if let Some(v) = take("SEGCUT_OVERWRITE") {
        config.output.overwrite = OverwritePolicy::parse(&v)?;
    }
    if let Some(v) = take("SEGCUT_FFMPEG") {
        config.tools.ffmpeg = v;
    }
    if let Some(v) = take("SEGCUT_FFPROBE") {
        config.tools.ffprobe = v;
    }
    if let Some(v) = take("SEGCUT_PROBE_TIMEOUT") {
        config.tools.probe_timeout_secs = parse_number("SEGCUT_PROBE_TIMEOUT", &v)?;
    }

    Ok(applied)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> Result<(), DomainError> {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }
    if let Some(format) = &cli.progress {
        config.progress.format = ProgressFormat::parse(format)?;
    }

    if let Some(encode) = cli.command.encode_options() {
        if let Some(encoder) = &encode.encoder {
            config.encoding.encoder = EncoderKind::parse(encoder)?;
        }
        if let Some(backend) = &encode.hw_backend {
            config.encoding.hw_backend = HardwareBackend::parse(backend)?;
        }
        if let Some(crf) = encode.crf {
            config.encoding.crf = crf;
        }
        if let Some(preset) = &encode.preset {
            config.encoding.preset = preset.clone();
        }
        if let Some(quality) = encode.quality {
            config.encoding.quality = quality;
        }
    }

    let overwrite = cli.command.overwrite_options();
    if overwrite.yes {
        config.output.overwrite = OverwritePolicy::Always;
    } else if overwrite.no_clobber {
        config.output.overwrite = OverwritePolicy::Never;
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DomainError::Config(format!(
            "Invalid boolean value for {}: {}",
            key, value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::Config(format!("Invalid number for {}: {}", key, value)))
}
