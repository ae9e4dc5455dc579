use thiserror::Error;

/// Failures of a single describe run.
///
/// `Validation` is the only recoverable case: the user fixes the input and
/// submits again. Every other variant aborts the run with no partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid coordinates. {0}")]
    Validation(String),

    #[error("failed to fetch image: {0}")]
    Acquisition(String),

    #[error("catalog query failed: {0}")]
    Catalog(String),

    #[error("object detection failed: {0}")]
    Detection(String),

    #[error("description request failed: {0}")]
    Description(String),

    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for input errors the user can correct and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
