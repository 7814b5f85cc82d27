//! Generic job framework shared by every extraction and write phase in the
//! migration pipeline: a `Job` trait whose `execute` consumes `self` (a job
//! is single-shot by construction, not by runtime flag), progress reporting
//! via `ProgressSink`, and cooperative cancellation via `CancelToken`.
//!
//! `ExtractionJob`/`WriteJob` are the two conveniences most stages are
//! built from; a stage with unusual shape can still implement `Job`
//! directly.

mod cancel;
mod extraction;
mod job;
mod progress;
mod write_job;

pub use cancel::CancelToken;
pub use extraction::ExtractionJob;
pub use job::{Job, JobError};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink, ProgressUpdate};
pub use write_job::{WriteJob, WriteOutcome};
