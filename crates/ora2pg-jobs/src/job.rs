use crate::cancel::CancelToken;
use crate::progress::ProgressSink;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job was cancelled")]
    Cancelled,

    #[error("required input {key} was not found in the state store")]
    MissingInput { key: String },

    #[error(transparent)]
    Store(#[from] ora2pg_store::StoreError),

    #[error("{0}")]
    Failed(String),

    /// The job ran to completion but its output failed validation — unlike
    /// `Failed`, this is never an infrastructural problem and a caller
    /// mapping job errors onto a continue-to-next-stage policy should treat
    /// it as such.
    #[error("{0}")]
    Invalid(String),
}

/// A unit of migration work: extract, transform, or write. `execute` takes
/// `self` by value so a `Job` can only ever be run once — the type system
/// enforces the single-shot rule rather than a runtime flag.
pub trait Job {
    type Output;

    fn id(&self) -> &str;
    fn kind(&self) -> &str;
    fn description(&self) -> &str;

    fn execute(self, sink: &dyn ProgressSink, cancel: &CancelToken) -> Result<Self::Output, JobError>;
}
