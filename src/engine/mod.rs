//! Transcoding engine: job construction, execution and progress

pub mod builder;
pub mod driver;
pub mod progress;

pub use builder::{ConcatManifest, JobBuilder};
pub use driver::{PlanExecutor, TranscodeDriver};
pub use progress::{ProgressCallback, ProgressFormat, ProgressSnapshot, ProgressTracker};
