// Source trait for telemetry data access
use crate::domain::frame::Frame;
use async_trait::async_trait;
use thiserror::Error;

/// Failures raised while turning a source reference into a [`Frame`].
/// Any of these is terminal for the current render cycle; callers halt
/// rather than serve partial or stale data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The reference is not an http(s) URL. Raised before any fetch attempt.
    #[error("invalid source reference `{reference}`: expected an http(s) URL")]
    InvalidSourceReference { reference: String },

    /// The fetch or the CSV decode failed.
    #[error("source `{reference}` unavailable: {cause}")]
    SourceUnavailable { reference: String, cause: String },

    /// A column the pipeline cannot run without (the timestamp index) is
    /// absent. Optional channels never raise this; their features are
    /// skipped instead.
    #[error("source `{reference}` is missing the `{channel}` column")]
    MissingChannel { reference: String, channel: String },
}

impl IngestError {
    pub fn unavailable(reference: &str, cause: impl ToString) -> Self {
        IngestError::SourceUnavailable {
            reference: reference.to_string(),
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch and decode the full observation table behind `reference`.
    async fn fetch(&self, reference: &str) -> Result<Frame, IngestError>;
}
