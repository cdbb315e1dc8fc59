// Adapters - External system implementations

pub mod console_confirm;
pub mod exec_ffmpeg;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use console_confirm::ConsoleConfirmAdapter;
pub use exec_ffmpeg::FFmpegAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::AppConfig;
pub use tracing_log::{init_logging, LogSettings};
