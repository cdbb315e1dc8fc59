// Config file adapter - Application configuration loaded from TOML or YAML

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::ProgressFormat;
use crate::ports::LogLevel;

/// Video extensions recognized when scanning a directory
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "flv", "wmv", "m4v", "webm", "ts",
];

/// Files looked up when no `--config` is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["segcut.toml", "config/segcut.toml"];

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub encoding: EncodingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub progress: ProgressConfig,
}

/// External tool locations and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub probe_timeout_secs: u64,
    /// Characters of transcoder stderr kept for error reports
    pub diagnostic_tail_chars: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            probe_timeout_secs: 30,
            diagnostic_tail_chars: 500,
        }
    }
}

/// Encoder selection and quality settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub encoder: EncoderKind,
    pub hw_backend: HardwareBackend,
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
    pub quality: u8,
    pub hw_speed: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        let software = SoftwareProfile::default();
        let hardware = HardwareProfile::default();
        Self {
            encoder: EncoderKind::Copy,
            hw_backend: hardware.backend,
            video_codec: software.codec,
            crf: software.crf,
            preset: software.preset,
            quality: hardware.quality,
            hw_speed: hardware.speed,
            audio_codec: software.audio.codec,
            audio_bitrate: software.audio.bitrate,
        }
    }
}

impl EncodingConfig {
    fn audio(&self) -> AudioSettings {
        AudioSettings {
            codec: self.audio_codec.clone(),
            bitrate: self.audio_bitrate.clone(),
        }
    }

    /// Software settings, also used as the hardware fallback
    pub fn software_profile(&self) -> SoftwareProfile {
        SoftwareProfile {
            codec: self.video_codec.clone(),
            crf: self.crf,
            preset: self.preset.clone(),
            audio: self.audio(),
        }
    }

    pub fn hardware_profile(&self) -> HardwareProfile {
        HardwareProfile {
            backend: self.hw_backend,
            quality: self.quality,
            speed: self.hw_speed.clone(),
            audio: self.audio(),
        }
    }

    /// The profile selected by `encoder`
    pub fn profile(&self) -> EncoderProfile {
        match self.encoder {
            EncoderKind::Copy => EncoderProfile::StreamCopy,
            EncoderKind::Software => EncoderProfile::Software(self.software_profile()),
            EncoderKind::Hardware => EncoderProfile::Hardware(self.hardware_profile()),
        }
    }
}

/// Output placement and overwrite behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub overwrite: OverwritePolicy,
    pub extensions: Vec<String>,
    /// File name used by `merge` when no output is given
    pub merged_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            overwrite: OverwritePolicy::Prompt,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            merged_name: "merged_output.mp4".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub format: ProgressFormat,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            format: ProgressFormat::Console,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML or YAML file, chosen by extension
    pub fn load_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_toml_str(&content),
        }
        .map_err(|e| match e {
            DomainError::Config(message) => {
                DomainError::Config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse YAML config: {}", e)))
    }

    /// First existing default config file, if any
    pub fn discover(base: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|p| base.join(p))
            .find(|p| p.is_file())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        LogLevel::parse(&self.logging.level)
            .map_err(|e| DomainError::Config(e.to_string()))?;

        if self.encoding.crf > 51 {
            return Err(DomainError::Config(format!(
                "CRF value {} is out of range (0-51)",
                self.encoding.crf
            )));
        }

        if self.encoding.quality > 51 {
            return Err(DomainError::Config(format!(
                "Quality value {} is out of range (0-51)",
                self.encoding.quality
            )));
        }

        if self.tools.probe_timeout_secs == 0 {
            return Err(DomainError::Config(
                "probe_timeout_secs must be positive".to_string(),
            ));
        }

        if self.output.extensions.is_empty() {
            return Err(DomainError::Config(
                "at least one video extension is required".to_string(),
            ));
        }

        Ok(())
    }
}
