//! Transcoder job construction
//!
//! Builds the exact argument lists handed to the transcoder for cut jobs and
//! concat jobs, and renders the concat demuxer manifest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::model::*;

/// Builds `TranscodeJob`s from windows and encoder profiles
pub struct JobBuilder;

impl JobBuilder {
    /// Extract `window` of `source` into `destination` with `profile`
    pub fn cut(
        source: &Path,
        window: TimeWindow,
        profile: &EncoderProfile,
        destination: &Path,
    ) -> TranscodeJob {
        let mut args = Self::common_args();

        if profile.is_hardware() {
            args.extend(["-hwaccel", "auto"].map(String::from));
        }

        args.push("-i".to_string());
        args.push(path_arg(source));
        args.push("-ss".to_string());
        args.push(format_seconds(window.seek));
        args.push("-t".to_string());
        args.push(format_seconds(window.duration));
        args.extend(Self::profile_args(profile));
        args.extend(["-avoid_negative_ts", "make_zero"].map(String::from));
        args.push(path_arg(destination));

        TranscodeJob {
            label: format!(
                "cut {} +{:.2}s",
                TimeSpec::from_seconds(window.seek),
                window.duration
            ),
            input: JobInput::File(source.to_path_buf()),
            window: Some(window),
            profile: profile.clone(),
            destination: destination.to_path_buf(),
            args,
            target: Some(window.duration),
        }
    }

    /// Losslessly join the files listed in `manifest` into `destination`.
    ///
    /// `total_seconds` is the summed length of the listed files.
    pub fn concat(manifest: &Path, destination: &Path, total_seconds: f64) -> TranscodeJob {
        let mut args = Self::common_args();
        args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
        args.push(path_arg(manifest));
        args.extend(["-c", "copy"].map(String::from));
        args.push(path_arg(destination));

        TranscodeJob {
            label: "concat".to_string(),
            input: JobInput::ConcatManifest(manifest.to_path_buf()),
            window: None,
            profile: EncoderProfile::StreamCopy,
            destination: destination.to_path_buf(),
            args,
            target: Some(total_seconds).filter(|t| t.is_finite() && *t > 0.0),
        }
    }

    /// Rebuild a hardware cut job with a software profile over the same window.
    ///
    /// Returns `None` for jobs that are not hardware cuts.
    pub fn software_fallback(job: &TranscodeJob, software: &SoftwareProfile) -> Option<TranscodeJob> {
        if !job.profile.is_hardware() {
            return None;
        }
        match (&job.input, job.window) {
            (JobInput::File(source), Some(window)) => Some(
                Self::cut(
                    source,
                    window,
                    &EncoderProfile::Software(software.clone()),
                    &job.destination,
                )
                .with_label(format!("{} (software)", job.label)),
            ),
            _ => None,
        }
    }

    fn common_args() -> Vec<String> {
        ["-y", "-v", "error", "-progress", "pipe:2"]
            .map(String::from)
            .to_vec()
    }

    /// Encoder arguments for a profile, placed after the window
    pub fn profile_args(profile: &EncoderProfile) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match profile {
            EncoderProfile::StreamCopy => {
                args.extend(["-c", "copy"].map(String::from));
            }
            EncoderProfile::Software(p) => {
                args.extend([
                    "-c:v".to_string(),
                    p.codec.clone(),
                    "-preset".to_string(),
                    p.preset.clone(),
                    "-crf".to_string(),
                    p.crf.to_string(),
                ]);
                push_audio(&mut args, &p.audio);
            }
            EncoderProfile::Hardware(p) => {
                let quality = p.quality.to_string();
                args.extend(["-c:v".to_string(), p.backend.encoder().to_string()]);
                match p.backend {
                    HardwareBackend::Amf => args.extend([
                        "-rc".to_string(),
                        "cqp".to_string(),
                        "-qp_i".to_string(),
                        quality.clone(),
                        "-qp_p".to_string(),
                        quality,
                        "-quality".to_string(),
                        p.speed.clone(),
                    ]),
                    HardwareBackend::Nvenc => args.extend([
                        "-rc".to_string(),
                        "constqp".to_string(),
                        "-qp".to_string(),
                        quality,
                        "-preset".to_string(),
                        nvenc_preset(&p.speed).to_string(),
                    ]),
                    HardwareBackend::Qsv => args.extend([
                        "-global_quality".to_string(),
                        quality,
                        "-preset".to_string(),
                        qsv_preset(&p.speed).to_string(),
                    ]),
                }
                push_audio(&mut args, &p.audio);
            }
        }
        args
    }
}

fn push_audio(args: &mut Vec<String>, audio: &AudioSettings) {
    args.extend([
        "-c:a".to_string(),
        audio.codec.clone(),
        "-b:a".to_string(),
        audio.bitrate.clone(),
    ]);
}

// NVENC uses p1 (fastest) through p7 (best quality)
fn nvenc_preset(speed: &str) -> &str {
    match speed {
        "speed" => "p1",
        "balanced" => "p4",
        "quality" => "p7",
        other => other,
    }
}

fn qsv_preset(speed: &str) -> &str {
    match speed {
        "speed" => "veryfast",
        "balanced" => "medium",
        "quality" => "veryslow",
        other => other,
    }
}

fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Input list for the concat demuxer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// One `file '<path>'` line per entry, in order
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("file '{}'\n", Self::escape_path(entry)))
            .collect()
    }

    /// Forward slashes, and `'` closed, escaped and reopened as `'\''`
    pub fn escape_path(path: &Path) -> String {
        path.to_string_lossy()
            .replace('\\', "/")
            .replace('\'', r"'\''")
    }

    /// Write the manifest to `path`
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}
