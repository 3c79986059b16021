//! Loop-level error types.
//!
//! Per-tool failures are not represented here: the executor recovers them
//! into [`FunctionExecutionResult`](crate::models::FunctionExecutionResult)
//! entries that are fed back to the model. The variants below abort the
//! whole invocation and are surfaced to the caller.

use thiserror::Error;

/// Result type alias for loop operations.
pub type Result<T> = std::result::Result<T, AgentLoopError>;

/// Errors that terminate a caller-loop invocation.
#[derive(Error, Debug)]
pub enum AgentLoopError {
    /// The model client call errored or returned malformed output.
    /// Not retried here; retry policy belongs to the client.
    #[error("model request failed: {reason}")]
    ModelRequest {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The cancellation token was triggered mid-flight.
    #[error("operation was cancelled")]
    Cancelled,

    /// The configured `max_tool_rounds` cap was reached before the model
    /// produced a final answer.
    #[error("tool round limit of {limit} exceeded")]
    RoundLimitExceeded { limit: u32 },
}

impl AgentLoopError {
    /// Convenience constructor for model-side failures without a source.
    pub fn model(reason: impl Into<String>) -> Self {
        Self::ModelRequest {
            reason: reason.into(),
            source: None,
        }
    }

    /// Convenience constructor wrapping an underlying client error.
    pub fn model_with_source(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelRequest {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True if this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AgentLoopError::model("connection reset");
        assert_eq!(err.to_string(), "model request failed: connection reset");

        let err = AgentLoopError::RoundLimitExceeded { limit: 3 };
        assert_eq!(err.to_string(), "tool round limit of 3 exceeded");

        assert!(AgentLoopError::Cancelled.is_cancelled());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = AgentLoopError::model_with_source("request timed out", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
