//! Conversation message types and the model client boundary.

mod model_client;
mod types;

pub use model_client::ChatCompletionClient;
pub use types::{
    AssistantMessage, AssistantMessageContent, CreateResult, CreateResultContent, FinishReason,
    FunctionCall, FunctionExecutionResult, FunctionExecutionResultMessage, LLMMessage,
    RequestUsage, SystemMessage, UserMessage,
};
