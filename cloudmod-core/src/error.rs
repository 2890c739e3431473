//! Error types for pipeline construction

use thiserror::Error;

/// Result type alias for pipeline construction
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while resolving a configuration or building a topology
///
/// Failures inside the external collaborators (missing repository, missing
/// secret, failed builds or deploys) never surface here: construction performs
/// no I/O, so those propagate from the provisioning side unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The configuration violates a required-field invariant
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    /// The source type is not one of the supported providers
    #[error("Unsupported source type: '{0}' (expected 'codecommit' or 'github')")]
    UnsupportedSourceType(String),
}

impl PipelineError {
    /// Create a configuration error from a message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error is recoverable by correcting the input
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error is an unsupported source type
    pub fn is_unsupported_source(&self) -> bool {
        matches!(self, Self::UnsupportedSourceType(_))
    }
}
