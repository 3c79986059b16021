use serde::{Deserialize, Serialize};

/// A model-issued request to invoke a named tool.
///
/// `arguments` is the JSON-encoded object exactly as produced by the
/// chat-completion API; parsing happens at execution time. `id` is unique
/// within the assistant turn that carried this call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments object.
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// A conversational turn. A conversation is an ordered, append-only
/// sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LLMMessage {
    System(SystemMessage),
    User(UserMessage),
    Assistant(AssistantMessage),
    FunctionResult(FunctionExecutionResultMessage),
}

impl LLMMessage {
    /// Tool calls carried by this message, if it is an assistant turn
    /// requesting execution.
    pub fn function_calls(&self) -> Option<&[FunctionCall]> {
        match self {
            LLMMessage::Assistant(AssistantMessage {
                content: AssistantMessageContent::FunctionCalls(calls),
                ..
            }) => Some(calls),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub content: String,
}

impl SystemMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl UserMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// An assistant turn: either final text or a batch of tool calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub content: AssistantMessageContent,
    /// Optional reasoning emitted alongside tool calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistantMessageContent {
    Text(String),
    FunctionCalls(Vec<FunctionCall>),
}

/// Outcome of one tool call, matched to its request by `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExecutionResult {
    /// Rendered output on success, rendered error otherwise.
    pub content: String,
    pub call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    pub name: String,
}

impl FunctionExecutionResult {
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// The turn appended after a tool round: one result per requested call,
/// in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExecutionResultMessage {
    pub content: Vec<FunctionExecutionResult>,
}

/// Token usage reported for a single model request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl RequestUsage {
    pub fn add(&mut self, other: RequestUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    FunctionCalls,
    Length,
    ContentFilter,
    Unknown,
}

/// Payload of a completed model request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateResultContent {
    Text(String),
    FunctionCalls(Vec<FunctionCall>),
}

/// Result of a single chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResult {
    pub content: CreateResultContent,
    pub finish_reason: FinishReason,
    pub usage: RequestUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

impl CreateResult {
    /// Build a plain-text completion.
    pub fn text(content: impl Into<String>, usage: RequestUsage) -> Self {
        Self {
            content: CreateResultContent::Text(content.into()),
            finish_reason: FinishReason::Stop,
            usage,
            thought: None,
        }
    }

    /// Build a completion that requests tool calls.
    pub fn function_calls(calls: Vec<FunctionCall>, usage: RequestUsage) -> Self {
        Self {
            content: CreateResultContent::FunctionCalls(calls),
            finish_reason: FinishReason::FunctionCalls,
            usage,
            thought: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization_is_tagged() {
        let msg = LLMMessage::User(UserMessage::new("hello").with_source("user"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "User");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["source"], "user");

        let back: LLMMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_function_calls_accessor() {
        let call = FunctionCall::new("1", "get_stock_price", r#"{"ticker":"AAPL"}"#);
        let msg = LLMMessage::Assistant(AssistantMessage {
            content: AssistantMessageContent::FunctionCalls(vec![call.clone()]),
            thought: None,
            source: Some("assistant".to_string()),
        });
        assert_eq!(msg.function_calls(), Some(&[call][..]));

        let text = LLMMessage::Assistant(AssistantMessage {
            content: AssistantMessageContent::Text("done".to_string()),
            thought: None,
            source: None,
        });
        assert!(text.function_calls().is_none());
    }

    #[test]
    fn test_usage_accumulation() {
        let mut total = RequestUsage::default();
        total.add(RequestUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
        });
        total.add(RequestUsage {
            prompt_tokens: 7,
            completion_tokens: 2,
        });
        assert_eq!(total.prompt_tokens, 17);
        assert_eq!(total.completion_tokens, 7);
    }
}
