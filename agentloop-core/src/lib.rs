//! # agentloop-core
//!
//! Tool-calling orchestration for LLM agents: the loop that alternates
//! between a chat-completion model and a set of schema-described tools
//! until the model produces a final answer.
//!
//! ## Features
//!
//! - **Caller loop**: sequential model/tool alternation with an append-only
//!   conversation, optional round cap, and cooperative cancellation
//! - **Tool abstraction**: a [`Tool`](tools::Tool) trait plus
//!   [`FunctionTool`](tools::FunctionTool) for wrapping async closures
//! - **Registry**: ordered tool set with JSON-schema argument validation
//! - **Batch executor**: concurrent per-call execution with per-call error
//!   recovery and request-order results
//! - **Observability**: phase-transition events on a broadcast channel and
//!   structured JSON log records via `tracing`
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agentloop_core::{
//!     tool_caller_loop, CallerLoopOptions, ToolExecutor, ToolRegistry,
//!     models::{LLMMessage, SystemMessage, UserMessage},
//!     tools::{create_function_tool, ParametersSchema},
//! };
//! use serde_json::json;
//!
//! # async fn example(model_client: &dyn agentloop_core::models::ChatCompletionClient)
//! # -> agentloop_core::Result<()> {
//! let get_stock_price = create_function_tool(
//!     "get_stock_price",
//!     "Get the stock price for a ticker on a date",
//!     Some(ParametersSchema::object(
//!         [
//!             ("ticker".to_string(), json!({"type": "string"})),
//!             ("date".to_string(), json!({"type": "string"})),
//!         ],
//!         ["ticker".to_string(), "date".to_string()],
//!     )),
//!     |_args, _token| async move { Ok(json!(128.98)) },
//! );
//!
//! let registry = ToolRegistry::new().with_tool(Arc::new(get_stock_price)).unwrap();
//! let executor = ToolExecutor::new(Arc::new(registry));
//!
//! let output = tool_caller_loop(
//!     model_client,
//!     &executor,
//!     vec![SystemMessage::new("You are a helpful assistant.")],
//!     vec![LLMMessage::User(UserMessage::new("What did AAPL close at on 2021/01/01?"))],
//!     CallerLoopOptions::new().with_max_tool_rounds(8),
//! )
//! .await?;
//!
//! println!("{}", output.final_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod caller_loop;
pub mod cancellation_token;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;
pub mod models;
pub mod registry;
pub mod tools;

pub use caller_loop::{tool_caller_loop, CallerLoopOptions, CallerLoopOutput};
pub use cancellation_token::{CancellationToken, CancelledError};
pub use error::{AgentLoopError, Result};
pub use events::{EventSender, LoopEvent};
pub use executor::ToolExecutor;
pub use registry::{RegistryError, ToolRegistry};
pub use tools::{Tool, ToolError, ToolSchema};
