//! Chat-completion client boundary.

use async_trait::async_trait;

use super::types::{CreateResult, LLMMessage, RequestUsage};
use crate::cancellation_token::CancellationToken;
use crate::error::Result;
use crate::tools::ToolSchema;

/// Client for a chat-completion model.
///
/// Implementations live outside this crate; the caller loop only relies on
/// this contract. Each [`FunctionCall`](crate::models::FunctionCall) in a
/// returned result must carry an id unique within that assistant turn.
/// Failures surface as [`AgentLoopError::ModelRequest`](crate::AgentLoopError)
/// and are not retried by the loop; retry policy, if any, lives in the
/// implementation.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Request a single completion for `messages`, offering `tools` as the
    /// callable actions. Implementations should observe
    /// `cancellation_token` and abort in-flight requests when it triggers.
    async fn create(
        &self,
        messages: &[LLMMessage],
        tools: &[ToolSchema],
        cancellation_token: Option<CancellationToken>,
    ) -> Result<CreateResult>;

    /// Usage recorded for the most recent request.
    fn actual_usage(&self) -> RequestUsage;

    /// Usage accumulated across all requests made through this client.
    fn total_usage(&self) -> RequestUsage;
}
