//! Batch tool executor.
//!
//! Takes the tool calls requested in one assistant turn, runs them, and
//! returns exactly one result per call in request order. Calls within a
//! batch execute concurrently and fail independently: an unknown name,
//! invalid arguments, or a raising tool produce an error result for that
//! call without disturbing its siblings. The executor never calls the
//! model.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use crate::cancellation_token::CancellationToken;
use crate::logging::ToolCallEvent;
use crate::models::{FunctionCall, FunctionExecutionResult};
use crate::registry::ToolRegistry;
use crate::tools::ToolError;

/// Executes batches of tool calls against a shared registry.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute `calls` as one batch.
    ///
    /// Returns one [`FunctionExecutionResult`] per call, in the order the
    /// calls were issued regardless of completion order. Triggering
    /// `cancellation_token` resolves every unresolved call with a
    /// `Cancelled` error result rather than leaving the batch incomplete.
    pub async fn execute(
        &self,
        calls: &[FunctionCall],
        cancellation_token: Option<CancellationToken>,
    ) -> Vec<FunctionExecutionResult> {
        let handles: Vec<_> = calls
            .iter()
            .map(|call| {
                let registry = Arc::clone(&self.registry);
                let call = call.clone();
                let token = cancellation_token.clone();
                tokio::spawn(execute_one(registry, call, token))
            })
            .collect();

        // Join is a barrier: every call resolves (result, error, or
        // cancellation) before the batch returns. Order follows `calls`.
        join_all(handles)
            .await
            .into_iter()
            .zip(calls)
            .map(|(joined, call)| match joined {
                Ok(result) => result,
                Err(join_error) => error_result(
                    call,
                    &ToolError::ExecutionFailed(format!("tool task aborted: {}", join_error)),
                ),
            })
            .collect()
    }
}

async fn execute_one(
    registry: Arc<ToolRegistry>,
    call: FunctionCall,
    cancellation_token: Option<CancellationToken>,
) -> FunctionExecutionResult {
    match run_call(&registry, &call, cancellation_token).await {
        Ok((content, arguments)) => {
            info!(
                "{}",
                ToolCallEvent::new(&call.name, &call.id, arguments, &content, false)
            );
            FunctionExecutionResult {
                content,
                call_id: call.id,
                is_error: Some(false),
                name: call.name,
            }
        }
        Err(error) => {
            warn!(
                "{}",
                ToolCallEvent::new(&call.name, &call.id, HashMap::new(), error.to_string(), true)
            );
            error_result(&call, &error)
        }
    }
}

/// Resolve, validate, and run a single call. Any error here is recovered
/// into the call's result by the caller.
async fn run_call(
    registry: &ToolRegistry,
    call: &FunctionCall,
    cancellation_token: Option<CancellationToken>,
) -> Result<(String, HashMap<String, Value>), ToolError> {
    let entry = registry
        .entry(&call.name)
        .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

    let (args_value, args) = parse_arguments(&call.arguments)?;
    entry.validate_args(&args_value)?;

    if let Some(ref token) = cancellation_token {
        token.check_cancelled()?;
    }

    let run = entry.tool.run_json(&args, cancellation_token.clone(), &call.id);
    let value = match cancellation_token {
        Some(ref token) => {
            tokio::select! {
                _ = token.cancelled() => return Err(ToolError::Cancelled),
                result = run => result?,
            }
        }
        None => run.await?,
    };

    Ok((entry.tool.return_value_as_string(&value), args))
}

fn parse_arguments(raw: &str) -> Result<(Value, HashMap<String, Value>), ToolError> {
    if raw.trim().is_empty() {
        return Ok((Value::Object(Default::default()), HashMap::new()));
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {}", e)))?;
    let args = match &value {
        Value::Object(object) => object
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => {
            return Err(ToolError::InvalidArguments(
                "arguments must be a JSON object".to_string(),
            ))
        }
    };
    Ok((value, args))
}

fn error_result(call: &FunctionCall, error: &ToolError) -> FunctionExecutionResult {
    FunctionExecutionResult {
        content: format!("Error: {}", error),
        call_id: call.id.clone(),
        is_error: Some(true),
        name: call.name.clone(),
    }
}
