//! Structured log events for model and tool calls.
//!
//! Each event serializes to a single JSON object and is emitted through
//! `tracing` at its call site, so downstream collectors can parse the
//! records without a custom format.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{CreateResult, FinishReason};

/// Record of one chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMCallEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message_count: usize,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub finish_reason: FinishReason,
    pub timestamp: DateTime<Utc>,
}

impl LLMCallEvent {
    pub fn new(message_count: usize, result: &CreateResult) -> Self {
        Self {
            event_type: "LLMCall".to_string(),
            message_count,
            prompt_tokens: result.usage.prompt_tokens,
            completion_tokens: result.usage.completion_tokens,
            finish_reason: result.finish_reason,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for LLMCallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "LLMCallEvent serialization error"),
        }
    }
}

/// Record of one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool_name: String,
    pub call_id: String,
    pub arguments: HashMap<String, Value>,
    pub result: String,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl ToolCallEvent {
    pub fn new(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        arguments: HashMap<String, Value>,
        result: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            event_type: "ToolCall".to_string(),
            tool_name: tool_name.into(),
            call_id: call_id.into(),
            arguments,
            result: result.into(),
            is_error,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for ToolCallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "ToolCallEvent serialization error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestUsage;

    #[test]
    fn test_llm_call_event_renders_as_json() {
        let result = CreateResult::text(
            "done",
            RequestUsage {
                prompt_tokens: 12,
                completion_tokens: 3,
            },
        );
        let event = LLMCallEvent::new(4, &result);
        let json: Value = serde_json::from_str(&event.to_string()).unwrap();
        assert_eq!(json["type"], "LLMCall");
        assert_eq!(json["message_count"], 4);
        assert_eq!(json["prompt_tokens"], 12);
        assert_eq!(json["finish_reason"], "stop");
    }

    #[test]
    fn test_tool_call_event_renders_as_json() {
        let event = ToolCallEvent::new(
            "get_stock_price",
            "1",
            HashMap::from([("ticker".to_string(), Value::from("AAPL"))]),
            "128.98",
            false,
        );
        let json: Value = serde_json::from_str(&event.to_string()).unwrap();
        assert_eq!(json["type"], "ToolCall");
        assert_eq!(json["tool_name"], "get_stock_price");
        assert_eq!(json["arguments"]["ticker"], "AAPL");
        assert_eq!(json["is_error"], false);
    }
}
