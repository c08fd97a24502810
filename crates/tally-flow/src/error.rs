use thiserror::Error;

/// Errors produced by the flow stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The merger task is gone and can no longer accept submissions.
    #[error("submission channel closed")]
    SubmissionChannelClosed,

    /// A submission is already in flight; the workflow is latched.
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// The search input channel is closed.
    #[error("search channel closed")]
    SearchChannelClosed,
}

/// Result alias for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
