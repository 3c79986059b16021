//! Tool registry: the ordered set of tools a conversation may call.
//!
//! The registry is built up front, then treated as read-only; wrapped in an
//! [`Arc`] it is shared across concurrently running invocations without
//! locking. Each tool's parameter schema is compiled once at registration
//! and the compiled validator is reused for every call.

use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

use crate::tools::{Tool, ToolError, ToolSchema};

/// Errors reported while building a registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    DuplicateTool(String),

    #[error("parameter schema for tool '{name}' does not compile: {reason}")]
    InvalidSchema { name: String, reason: String },
}

pub(crate) struct RegisteredTool {
    pub(crate) tool: Arc<dyn Tool>,
    pub(crate) schema: ToolSchema,
    validator: Option<JSONSchema>,
}

impl RegisteredTool {
    /// Validate a parsed argument object against the tool's declared
    /// parameter schema. Tools without a parameter schema accept anything.
    pub(crate) fn validate_args(&self, args: &Value) -> Result<(), ToolError> {
        if let Some(ref validator) = self.validator {
            if let Err(errors) = validator.validate(args) {
                let messages: Vec<String> = errors
                    .map(|e| format!("{}: {}", e.instance_path, e))
                    .collect();
                return Err(ToolError::InvalidArguments(messages.join("; ")));
            }
        }
        Ok(())
    }
}

/// Ordered collection of tools, looked up by name at execution time.
///
/// Insertion order is preserved: [`schemas`](Self::schemas) presents tools
/// to the model in the order they were registered.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails on a duplicate name or a parameter schema
    /// that does not compile.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let schema = tool.schema();
        if self.entries.iter().any(|e| e.schema.name == schema.name) {
            return Err(RegistryError::DuplicateTool(schema.name));
        }

        let validator = match &schema.parameters {
            Some(parameters) => {
                let raw = serde_json::to_value(parameters).map_err(|e| {
                    RegistryError::InvalidSchema {
                        name: schema.name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let compiled =
                    JSONSchema::compile(&raw).map_err(|e| RegistryError::InvalidSchema {
                        name: schema.name.clone(),
                        reason: e.to_string(),
                    })?;
                Some(compiled)
            }
            None => None,
        };

        self.entries.push(RegisteredTool {
            tool,
            schema,
            validator,
        });
        Ok(())
    }

    /// Builder-style registration for constructing a registry inline.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    /// Schemas of all registered tools, in registration order. This is the
    /// schema set presented to the model.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.entries.iter().map(|e| e.schema.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.schema.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.schema.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&RegisteredTool> {
        self.entries.iter().find(|e| e.schema.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{create_function_tool, ParametersSchema};
    use serde_json::json;

    fn number_tool(name: &str) -> Arc<dyn Tool> {
        Arc::new(create_function_tool(
            name,
            "Takes a single number",
            Some(ParametersSchema::object(
                [("n".to_string(), json!({"type": "number"}))],
                ["n".to_string()],
            )),
            |args, _token| async move { Ok(args.get("n").cloned().unwrap_or(Value::Null)) },
        ))
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(number_tool("double")).unwrap();
        let err = registry.register(number_tool("double")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "double"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_schemas_preserve_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(number_tool("first"))
            .unwrap()
            .with_tool(number_tool("second"))
            .unwrap()
            .with_tool(number_tool("third"))
            .unwrap();

        let names: Vec<String> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(registry.names(), ["first", "second", "third"]);
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::new().with_tool(number_tool("double")).unwrap();
        assert!(registry.contains("double"));
        assert!(!registry.contains("halve"));
        assert!(registry.entry("double").is_some());
        assert!(registry.entry("halve").is_none());
    }

    #[test]
    fn test_argument_validation_against_compiled_schema() {
        let registry = ToolRegistry::new().with_tool(number_tool("double")).unwrap();
        let entry = registry.entry("double").unwrap();

        assert!(entry.validate_args(&json!({"n": 4})).is_ok());

        let err = entry.validate_args(&json!({"n": "four"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = entry.validate_args(&json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_tool_without_parameters_accepts_any_args() {
        let tool = Arc::new(create_function_tool(
            "ping",
            "No parameters",
            None,
            |_args, _token| async move { Ok(json!("pong")) },
        ));
        let registry = ToolRegistry::new().with_tool(tool).unwrap();
        let entry = registry.entry("ping").unwrap();
        assert!(entry.validate_args(&json!({"anything": true})).is_ok());
    }
}
