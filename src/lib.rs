//! segcut - segment-based batch video editing
//!
//! Turns "remove these ranges" (or "keep this span") requests into keep
//! plans, materializes them with ffmpeg as a single cut or as extracted
//! segments joined by the concat demuxer, and runs whole directories with
//! per-file failure isolation.
//!
//! # Usage
//!
//! ```bash
//! segcut remove talk.mp4 "1:00-2:00,5:00-6:00"
//! segcut trim videos/ 0:30 45:00 trimmed/
//! segcut cut videos/ --head 29 --tail 25 --encoder hardware
//! segcut merge parts/
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{DomainError, DomainResult};
pub use domain::model::{BatchResult, EditSpec, FileStatus, Interval, KeepPlan, TimeSpec};
