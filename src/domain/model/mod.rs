// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification - a non-negative, finite number of seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// The start of the media
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Seconds as a float
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse `SS`, `MM:SS` or `HH:MM:SS` (fractional fields allowed).
    ///
    /// Fields are read right to left as seconds, minutes and hours, and the
    /// result is their weighted sum. Field values are not range-checked, so
    /// `"1:75"` is 135 seconds.
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();

        if parts.is_empty() || parts.len() > 3 {
            return Err(DomainError::InvalidFormat(format!(
                "'{}' (expected SS, MM:SS or HH:MM:SS)",
                time_str
            )));
        }

        let mut seconds = 0.0;
        for (position, field) in parts.iter().rev().enumerate() {
            let value = Self::parse_field(field).ok_or_else(|| {
                DomainError::InvalidFormat(format!(
                    "'{}' (field '{}' is not a non-negative number)",
                    time_str, field
                ))
            })?;
            seconds += value * 60f64.powi(position as i32);
        }

        Ok(Self::from_seconds(seconds))
    }

    fn parse_field(field: &str) -> Option<f64> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        field.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Format as H:MM:SS.mmm (or M:SS.mmm under an hour)
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let milliseconds = total_millis % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// A half-open span of media time with `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    start: f64,
    end: f64,
}

impl Interval {
    /// Create a new interval with validation
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::InvalidFormat(format!(
                "interval bounds must be finite ({} - {})",
                start, end
            )));
        }
        if start < 0.0 {
            return Err(DomainError::InvalidFormat(format!(
                "interval start cannot be negative ({})",
                start
            )));
        }
        if start >= end {
            return Err(DomainError::InvalidFormat(format!(
                "interval start must be before its end ({} >= {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// True when the two intervals share a span of positive length
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}s - {:.2}s ({} - {})",
            self.start,
            self.end,
            TimeSpec::from_seconds(self.start),
            TimeSpec::from_seconds(self.end)
        )
    }
}

/// Remove-intervals, always sorted ascending by start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoveSet {
    intervals: Vec<Interval>,
}

impl RemoveSet {
    /// Build a normalized set from intervals in any order
    pub fn from_intervals(mut intervals: Vec<Interval>) -> Self {
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Keep-intervals derived from a remove set and a duration
#[derive(Debug, Clone, PartialEq)]
pub struct KeepPlan {
    intervals: Vec<Interval>,
    duration: f64,
}

impl KeepPlan {
    pub(crate) fn new(intervals: Vec<Interval>, duration: f64) -> Self {
        Self { intervals, duration }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Source duration the plan was computed against
    pub fn source_duration(&self) -> f64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total seconds retained
    pub fn kept_seconds(&self) -> f64 {
        self.intervals.iter().map(Interval::length).sum()
    }

    /// A plan that keeps the whole source unchanged
    pub fn is_noop(&self) -> bool {
        const EPSILON: f64 = 1e-6;
        match self.intervals.as_slice() {
            [only] => only.start <= EPSILON && only.end >= self.duration - EPSILON,
            _ => false,
        }
    }
}

/// How a keep plan is materialized
#[derive(Debug, Clone, PartialEq)]
pub enum CutStrategy {
    /// One seek-and-duration invocation
    SingleCut(Interval),
    /// One output per interval, then a lossless concatenation in order
    ExtractAndConcat(Vec<Interval>),
}

impl CutStrategy {
    /// Number of transcoder invocations needed to extract the content
    pub fn segment_count(&self) -> usize {
        match self {
            CutStrategy::SingleCut(_) => 1,
            CutStrategy::ExtractAndConcat(intervals) => intervals.len(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CutStrategy::SingleCut(_) => "single-cut",
            CutStrategy::ExtractAndConcat(_) => "extract-and-concat",
        }
    }
}

/// A seek offset plus a fixed output duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub seek: f64,
    pub duration: f64,
}

impl From<Interval> for TimeWindow {
    fn from(interval: Interval) -> Self {
        Self {
            seek: interval.start,
            duration: interval.length(),
        }
    }
}

/// Hardware encoder backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareBackend {
    /// AMD AMF
    Amf,
    /// NVIDIA NVENC
    Nvenc,
    /// Intel Quick Sync Video
    Qsv,
}

impl HardwareBackend {
    /// Parse backend name from string
    pub fn parse(backend_str: &str) -> Result<Self, DomainError> {
        match backend_str.to_lowercase().as_str() {
            "amf" => Ok(HardwareBackend::Amf),
            "nvenc" => Ok(HardwareBackend::Nvenc),
            "qsv" => Ok(HardwareBackend::Qsv),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid hardware backend: {}. Valid backends: amf, nvenc, qsv",
                backend_str
            ))),
        }
    }

    /// FFmpeg encoder name
    pub fn encoder(&self) -> &'static str {
        match self {
            HardwareBackend::Amf => "h264_amf",
            HardwareBackend::Nvenc => "h264_nvenc",
            HardwareBackend::Qsv => "h264_qsv",
        }
    }
}

/// Which family of encoder profile the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Copy,
    Software,
    Hardware,
}

impl EncoderKind {
    /// Parse encoder kind from string
    pub fn parse(kind_str: &str) -> Result<Self, DomainError> {
        match kind_str.to_lowercase().as_str() {
            "copy" => Ok(EncoderKind::Copy),
            "software" | "sw" | "cpu" => Ok(EncoderKind::Software),
            "hardware" | "hw" | "gpu" => Ok(EncoderKind::Hardware),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid encoder: {}. Valid encoders: copy, software, hardware",
                kind_str
            ))),
        }
    }
}

/// Audio re-encode settings shared by the encoding profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub codec: String,
    pub bitrate: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate: "128k".to_string(),
        }
    }
}

/// Software encoding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareProfile {
    pub codec: String,
    /// Constant Rate Factor (0-51)
    pub crf: u8,
    pub preset: String,
    pub audio: AudioSettings,
}

impl Default for SoftwareProfile {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            crf: 23,
            preset: "fast".to_string(),
            audio: AudioSettings::default(),
        }
    }
}

/// Hardware encoding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub backend: HardwareBackend,
    /// Constant quantizer (0-51)
    pub quality: u8,
    /// Speed/quality bias passed to the backend
    pub speed: String,
    pub audio: AudioSettings,
}

impl Default for HardwareProfile {
    fn default() -> Self {
        Self {
            backend: HardwareBackend::Amf,
            quality: 23,
            speed: "speed".to_string(),
            audio: AudioSettings::default(),
        }
    }
}

/// Encoder configuration for one job, fixed once chosen
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderProfile {
    /// Re-mux without re-encoding; cut points snap to keyframes
    StreamCopy,
    Software(SoftwareProfile),
    Hardware(HardwareProfile),
}

impl EncoderProfile {
    pub fn is_hardware(&self) -> bool {
        matches!(self, EncoderProfile::Hardware(_))
    }

    pub fn label(&self) -> String {
        match self {
            EncoderProfile::StreamCopy => "stream-copy".to_string(),
            EncoderProfile::Software(p) => format!("software ({}, crf {})", p.codec, p.crf),
            EncoderProfile::Hardware(p) => {
                format!("hardware ({}, qp {})", p.backend.encoder(), p.quality)
            }
        }
    }
}

/// Where a job reads its media from
#[derive(Debug, Clone, PartialEq)]
pub enum JobInput {
    /// A single media file
    File(PathBuf),
    /// A concat demuxer manifest
    ConcatManifest(PathBuf),
}

impl JobInput {
    pub fn path(&self) -> &Path {
        match self {
            JobInput::File(path) | JobInput::ConcatManifest(path) => path,
        }
    }
}

/// One concrete invocation of the external transcoder
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    pub(crate) label: String,
    pub(crate) input: JobInput,
    pub(crate) window: Option<TimeWindow>,
    pub(crate) profile: EncoderProfile,
    pub(crate) destination: PathBuf,
    pub(crate) args: Vec<String>,
    /// Expected output length in seconds, when known
    pub(crate) target: Option<f64>,
}

impl TranscodeJob {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &JobInput {
        &self.input
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    pub fn profile(&self) -> &EncoderProfile {
        &self.profile
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Transcoder arguments, program name excluded
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Expected output length, used as the progress target
    pub fn target_duration(&self) -> Option<f64> {
        self.target
    }

    /// Replace the human-readable label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// The edit applied to every input file
#[derive(Debug, Clone, PartialEq)]
pub enum EditSpec {
    /// Excise the listed ranges, keep the rest
    RemoveSegments(RemoveSet),
    /// Keep `[start, end]`; missing bounds default to the media edges
    TrimEdges {
        start: Option<TimeSpec>,
        end: Option<TimeSpec>,
    },
    /// Drop a fixed amount from the head and the tail
    CutHeadTail { head: TimeSpec, tail: TimeSpec },
}

impl EditSpec {
    /// Suffix appended to output file stems
    pub fn output_suffix(&self) -> &'static str {
        match self {
            EditSpec::RemoveSegments(_) => "_processed",
            EditSpec::TrimEdges { .. } => "_trimmed",
            EditSpec::CutHeadTail { .. } => "_cut",
        }
    }
}

/// What to do when a destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Ask once, reuse the answer for the rest of the run
    Prompt,
    Always,
    Never,
}

impl OverwritePolicy {
    /// Parse overwrite policy from string
    pub fn parse(policy_str: &str) -> Result<Self, DomainError> {
        match policy_str.to_lowercase().as_str() {
            "prompt" => Ok(OverwritePolicy::Prompt),
            "always" => Ok(OverwritePolicy::Always),
            "never" => Ok(OverwritePolicy::Never),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid overwrite policy: {}. Valid policies: prompt, always, never",
                policy_str
            ))),
        }
    }
}

/// Result of editing one file
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Written {
        destination: PathBuf,
        kept_seconds: f64,
        segments: usize,
    },
    Skipped {
        reason: String,
    },
}

/// Per-file status recorded by the batch orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    Succeeded { destination: PathBuf },
    Skipped { reason: String },
    Failed { kind: String, message: String },
}

/// Aggregated results of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    success_count: usize,
    failure_count: usize,
    skipped_count: usize,
    files: Vec<(PathBuf, FileStatus)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, path: PathBuf, status: FileStatus) {
        match status {
            FileStatus::Succeeded { .. } => self.success_count += 1,
            FileStatus::Skipped { .. } => self.skipped_count += 1,
            FileStatus::Failed { .. } => self.failure_count += 1,
        }
        self.files.push((path, status));
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn files(&self) -> &[(PathBuf, FileStatus)] {
        &self.files
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}
