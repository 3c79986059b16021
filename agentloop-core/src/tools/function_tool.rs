//! Function tool: wrap an async Rust closure as a tool.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;

use super::base_tool::{ParametersSchema, Tool, ToolError, ToolSchema};
use crate::cancellation_token::CancellationToken;

/// Boxed async function backing a [`FunctionTool`].
pub type AsyncToolFunction = Box<
    dyn Fn(
            HashMap<String, Value>,
            Option<CancellationToken>,
        ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>
        + Send
        + Sync,
>;

/// A tool backed by an async closure or function pointer.
///
/// This is the convenience wrapper for one-off capabilities such as a
/// stock-price lookup; anything with real state should implement
/// [`Tool`] directly.
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Option<ParametersSchema>,
    function: AsyncToolFunction,
}

impl FunctionTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Option<ParametersSchema>,
        function: AsyncToolFunction,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            function,
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            strict: None,
        }
    }

    async fn run_json(
        &self,
        args: &HashMap<String, Value>,
        cancellation_token: Option<CancellationToken>,
        _call_id: &str,
    ) -> Result<Value, ToolError> {
        if let Some(ref token) = cancellation_token {
            token.check_cancelled()?;
        }
        (self.function)(args.clone(), cancellation_token).await
    }
}

/// Create a [`FunctionTool`] from a plain closure without boxing at the
/// call site.
pub fn create_function_tool<F, Fut>(
    name: &str,
    description: &str,
    parameters: Option<ParametersSchema>,
    func: F,
) -> FunctionTool
where
    F: Fn(HashMap<String, Value>, Option<CancellationToken>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    FunctionTool::new(
        name,
        description,
        parameters,
        Box::new(move |args, token| Box::pin(func(args, token))),
    )
}
