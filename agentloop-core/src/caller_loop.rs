//! The tool-calling orchestration loop.
//!
//! [`tool_caller_loop`] alternates between the model client and the tool
//! executor until the model produces an assistant turn without tool calls.
//! The conversation is owned by the loop for the duration of one
//! invocation: an append-only message sequence seeded with the system and
//! input messages, returned whole on success.
//!
//! Every tool call requested in an assistant turn is resolved (with output
//! or an error result) before the model is queried again; results are
//! appended in the order their calls were issued, regardless of the order
//! in which the underlying concurrent executions finish.

use tracing::{debug, info};
use uuid::Uuid;

use crate::cancellation_token::CancellationToken;
use crate::error::{AgentLoopError, Result};
use crate::events::{EventSender, LoopEvent};
use crate::executor::ToolExecutor;
use crate::logging::LLMCallEvent;
use crate::models::{
    AssistantMessage, AssistantMessageContent, ChatCompletionClient, CreateResultContent,
    FunctionCall, FunctionExecutionResultMessage, LLMMessage, SystemMessage,
};

/// Options recognized by the caller loop.
#[derive(Clone, Default)]
pub struct CallerLoopOptions {
    /// Source tag stamped on generated assistant turns; defaults to
    /// `"assistant"`.
    pub caller_source: Option<String>,
    /// Bound on tool-call/response cycles. `None` means unbounded;
    /// exceeding a configured cap fails the invocation with
    /// [`AgentLoopError::RoundLimitExceeded`].
    pub max_tool_rounds: Option<u32>,
    /// Token observed by every model call and every tool invocation.
    pub cancellation_token: Option<CancellationToken>,
    /// Channel for phase-transition notifications.
    pub events: Option<EventSender>,
}

impl CallerLoopOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caller_source(mut self, source: impl Into<String>) -> Self {
        self.caller_source = Some(source.into());
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = Some(rounds);
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }
}

/// Successful outcome of one loop invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerLoopOutput {
    /// The full conversation: system messages, input messages, and every
    /// turn generated during the loop, in order.
    pub conversation: Vec<LLMMessage>,
}

impl CallerLoopOutput {
    /// The terminal assistant turn.
    pub fn final_message(&self) -> Option<&LLMMessage> {
        self.conversation.last()
    }

    /// Text of the terminal assistant turn.
    pub fn final_text(&self) -> Option<&str> {
        match self.conversation.last() {
            Some(LLMMessage::Assistant(AssistantMessage {
                content: AssistantMessageContent::Text(text),
                ..
            })) => Some(text),
            _ => None,
        }
    }
}

/// Phases of one invocation. `AwaitingTools` carries the batch requested
/// by the most recent assistant turn.
enum LoopState {
    AwaitingModel,
    AwaitingTools(Vec<FunctionCall>),
}

/// Run the tool-calling loop until the model stops generating tool calls.
///
/// The conversation starts as `system_messages` followed by
/// `input_messages`. Each round queries `model_client` with the
/// conversation and the schema set of `executor`'s registry; any requested
/// tool calls are dispatched as one batch and their results appended
/// before the next query.
///
/// Per-tool failures (unknown tool, invalid arguments, execution errors)
/// are fed back to the model as error results. Loop-level failures (a
/// failed model request, cancellation, or an exceeded round cap) abort
/// the invocation and are returned as the error.
pub async fn tool_caller_loop(
    model_client: &dyn ChatCompletionClient,
    executor: &ToolExecutor,
    system_messages: Vec<SystemMessage>,
    input_messages: Vec<LLMMessage>,
    options: CallerLoopOptions,
) -> Result<CallerLoopOutput> {
    let invocation = Uuid::new_v4();
    let caller_source = options
        .caller_source
        .unwrap_or_else(|| "assistant".to_string());
    let token = options.cancellation_token;
    let tool_schemas = executor.registry().schemas();

    let mut conversation: Vec<LLMMessage> = system_messages
        .into_iter()
        .map(LLMMessage::System)
        .collect();
    conversation.extend(input_messages);

    debug!(
        %invocation,
        tools = tool_schemas.len(),
        messages = conversation.len(),
        "starting caller loop"
    );

    let mut rounds_completed: u32 = 0;
    let mut state = LoopState::AwaitingModel;

    loop {
        if let Some(ref token) = token {
            if token.is_cancelled() {
                return Err(AgentLoopError::Cancelled);
            }
        }

        match state {
            LoopState::AwaitingModel => {
                emit(
                    &options.events,
                    LoopEvent::ModelQueried {
                        invocation,
                        round: rounds_completed,
                        message_count: conversation.len(),
                    },
                );

                let result = model_client
                    .create(&conversation, &tool_schemas, token.clone())
                    .await?;
                info!("{}", LLMCallEvent::new(conversation.len(), &result));

                let content = match &result.content {
                    CreateResultContent::Text(text) => AssistantMessageContent::Text(text.clone()),
                    CreateResultContent::FunctionCalls(calls) => {
                        AssistantMessageContent::FunctionCalls(calls.clone())
                    }
                };
                conversation.push(LLMMessage::Assistant(AssistantMessage {
                    content,
                    thought: result.thought.clone(),
                    source: Some(caller_source.clone()),
                }));

                match result.content {
                    CreateResultContent::FunctionCalls(calls) if !calls.is_empty() => {
                        state = LoopState::AwaitingTools(calls);
                    }
                    // A turn with no tool calls is terminal.
                    _ => {
                        debug!(%invocation, rounds = rounds_completed, "caller loop finished");
                        return Ok(CallerLoopOutput { conversation });
                    }
                }
            }

            LoopState::AwaitingTools(calls) => {
                if let Some(limit) = options.max_tool_rounds {
                    if rounds_completed >= limit {
                        return Err(AgentLoopError::RoundLimitExceeded { limit });
                    }
                }

                emit(
                    &options.events,
                    LoopEvent::ToolBatchDispatched {
                        invocation,
                        round: rounds_completed,
                        call_count: calls.len(),
                    },
                );

                let results = executor.execute(&calls, token.clone()).await;

                if let Some(ref token) = token {
                    if token.is_cancelled() {
                        return Err(AgentLoopError::Cancelled);
                    }
                }

                emit(
                    &options.events,
                    LoopEvent::ToolBatchCompleted {
                        invocation,
                        round: rounds_completed,
                        error_count: results.iter().filter(|r| r.is_error()).count(),
                    },
                );

                conversation.push(LLMMessage::FunctionResult(FunctionExecutionResultMessage {
                    content: results,
                }));
                rounds_completed += 1;
                state = LoopState::AwaitingModel;
            }
        }
    }
}

fn emit(events: &Option<EventSender>, event: LoopEvent) {
    if let Some(sender) = events {
        sender.emit(event);
    }
}
