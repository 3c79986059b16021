//! Base tool trait and schema types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::cancellation_token::{CancellationToken, CancelledError};

/// Failures a tool invocation can report. Every variant ends up rendered
/// into a [`FunctionExecutionResult`](crate::models::FunctionExecutionResult)
/// with `is_error` set; none of them abort the batch they occur in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Arguments did not satisfy the declared parameter schema, or were
    /// not a JSON object at all.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The underlying action raised during execution.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),

    /// The cancellation token was triggered before the call completed.
    #[error("tool call was cancelled")]
    Cancelled,

    /// The requested tool name is not present in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl From<CancelledError> for ToolError {
    fn from(_: CancelledError) -> Self {
        ToolError::Cancelled
    }
}

/// JSON-schema description of a tool's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ParametersSchema {
    /// An `object` schema from property name/schema pairs and a required
    /// list.
    pub fn object(
        properties: impl IntoIterator<Item = (String, Value)>,
        required: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Some(properties.into_iter().collect()),
            required: Some(required.into_iter().collect()),
        }
    }
}

/// Schema published to the model for one tool. Immutable once handed to a
/// conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParametersSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// A named, schema-described unit of executable capability.
///
/// Tools must be safe to invoke concurrently with other tools; a tool that
/// wraps a stateful external resource owns that resource's concurrency
/// discipline.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, unique within whatever registry holds this tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Schema advertised to the model; stable for the tool's lifetime.
    fn schema(&self) -> ToolSchema;

    /// Render a run result for inclusion in a result message.
    fn return_value_as_string(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            _ => value.to_string(),
        }
    }

    /// Execute with already-parsed arguments. `call_id` identifies the
    /// originating request for logging.
    async fn run_json(
        &self,
        args: &HashMap<String, Value>,
        cancellation_token: Option<CancellationToken>,
        call_id: &str,
    ) -> Result<Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "Echo the input back".to_string(),
                parameters: Some(ParametersSchema::object(
                    [("text".to_string(), json!({"type": "string"}))],
                    ["text".to_string()],
                )),
                strict: None,
            }
        }

        async fn run_json(
            &self,
            args: &HashMap<String, Value>,
            _cancellation_token: Option<CancellationToken>,
            _call_id: &str,
        ) -> Result<Value, ToolError> {
            Ok(args.get("text").cloned().unwrap_or(Value::Null))
        }
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Echo.schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["name"], "echo");
        assert_eq!(json["parameters"]["type"], "object");
        assert_eq!(json["parameters"]["required"][0], "text");
    }

    #[test]
    fn test_return_value_rendering() {
        // Strings are unwrapped, everything else stays JSON-encoded.
        assert_eq!(Echo.return_value_as_string(&json!("plain")), "plain");
        assert_eq!(Echo.return_value_as_string(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(Echo.return_value_as_string(&json!(42)), "42");
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(
            ToolError::UnknownTool("nope".to_string()).to_string(),
            "unknown tool: nope"
        );
        assert_eq!(
            ToolError::from(CancelledError).to_string(),
            "tool call was cancelled"
        );
    }
}
