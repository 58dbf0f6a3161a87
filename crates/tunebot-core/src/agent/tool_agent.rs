//! Tool-calling agent: the model/tool loop behind one turn.
//!
//! A turn alternates model steps and tool executions until the model answers
//! without requesting tools:
//!
//! 1. Append the user message to the thread's checkpoint.
//! 2. Call the provider with the full history and the toolkit's definitions.
//! 3. Emit the assistant message as an `agent` unit.
//! 4. Run every requested tool call, record the step in the checkpoint in a
//!    single append, then emit each result as a `tools` unit. A failing tool
//!    is reported back to the model, not to the caller.
//! 5. Repeat from 2 until no tool calls remain or `max_steps` is reached.

use std::sync::Arc;

use tracing::{Instrument, debug, info_span, warn};

use tunebot_types::agent::{OutputUnit, ToolDefinition};
use tunebot_types::error::AgentError;
use tunebot_types::llm::{CompletionRequest, Message};

use crate::llm::box_provider::BoxLlmProvider;

use super::checkpoint::CheckpointStore;
use super::toolkit::BoxToolkit;
use super::{Agent, UnitStream};

/// Model parameters and limits for a [`ToolAgent`].
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub max_steps: usize,
    pub system_prompt: String,
}

/// Production [`Agent`]: an LLM provider driving a toolkit, with per-thread
/// history in a checkpoint store.
pub struct ToolAgent {
    provider: Arc<BoxLlmProvider>,
    toolkit: Arc<BoxToolkit>,
    checkpoints: Arc<dyn CheckpointStore>,
    settings: Arc<AgentSettings>,
}

impl ToolAgent {
    pub fn new(
        provider: BoxLlmProvider,
        toolkit: BoxToolkit,
        checkpoints: Arc<dyn CheckpointStore>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            toolkit: Arc::new(toolkit),
            checkpoints,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }
}

impl Agent for ToolAgent {
    fn stream_turn(&self, thread_id: &str, message: &str) -> UnitStream {
        let provider = Arc::clone(&self.provider);
        let toolkit = Arc::clone(&self.toolkit);
        let checkpoints = Arc::clone(&self.checkpoints);
        let settings = Arc::clone(&self.settings);
        let thread_id = thread_id.to_string();
        let user_message = Message::user(message);

        Box::pin(async_stream::try_stream! {
            let mut history = checkpoints.load(&thread_id);
            checkpoints.append(&thread_id, std::slice::from_ref(&user_message));
            history.push(user_message);

            let tools = toolkit.definitions();
            let mut finished = false;

            for step in 0..settings.max_steps {
                let request = CompletionRequest {
                    model: settings.model.clone(),
                    messages: history.clone(),
                    system: Some(settings.system_prompt.clone()),
                    max_tokens: settings.max_tokens,
                    temperature: Some(settings.temperature),
                    tools: tools.clone(),
                };

                let span = info_span!(
                    "gen_ai.complete",
                    gen_ai.system = provider.name(),
                    gen_ai.request.model = %request.model,
                    gen_ai.request.max_tokens = request.max_tokens,
                    gen_ai.request.temperature = ?request.temperature,
                    agent.thread_id = %thread_id,
                    agent.step = step,
                );

                let response = provider
                    .complete(&request)
                    .instrument(span)
                    .await
                    .map_err(AgentError::from)?;

                debug!(
                    step,
                    stop_reason = %response.stop_reason,
                    tool_calls = response.tool_calls.len(),
                    output_tokens = response.usage.output_tokens,
                    "model step complete"
                );

                let calls = response.tool_calls.clone();
                let assistant = Message::assistant(response.content.clone(), calls.clone());

                if calls.is_empty() {
                    checkpoints.append(&thread_id, std::slice::from_ref(&assistant));
                    history.push(assistant);
                    yield OutputUnit::agent(response.content);
                    finished = true;
                    break;
                }

                yield OutputUnit::agent(response.content);

                // A tool-call step is committed whole: the assistant message
                // never reaches the checkpoint without all of its results.
                let mut step_messages = vec![assistant];
                let mut outputs = Vec::with_capacity(calls.len());
                for call in calls {
                    let text = match toolkit.invoke(&call.name, call.arguments.clone()).await {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(tool = %call.name, error = %e, "tool call failed");
                            format!("Error: {e}")
                        }
                    };
                    step_messages.push(Message::tool_result(call.id.clone(), text.clone()));
                    outputs.push(text);
                }

                checkpoints.append(&thread_id, &step_messages);
                history.extend(step_messages);

                for text in outputs {
                    yield OutputUnit::tools(text);
                }
            }

            if !finished {
                Err::<(), AgentError>(AgentError::StepLimit(settings.max_steps))?;
            }
        })
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.toolkit.definitions()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use futures_util::StreamExt;

    use tunebot_types::agent::UnitSource;
    use tunebot_types::error::ToolError;
    use tunebot_types::llm::{
        CompletionResponse, LlmError, MessageRole, ProviderCapabilities, StopReason, ToolCall,
        Usage,
    };

    use super::*;
    use crate::agent::checkpoint::MemoryCheckpointStore;
    use crate::agent::toolkit::Toolkit;
    use crate::llm::provider::LlmProvider;

    /// Provider that replays scripted responses and records every request.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
        capabilities: ProviderCapabilities,
    }

    impl ScriptedProvider {
        fn new(
            responses: Vec<Result<CompletionResponse, LlmError>>,
        ) -> (Self, Arc<Mutex<Vec<CompletionRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let provider = Self {
                responses: Mutex::new(responses.into()),
                requests: Arc::clone(&requests),
                capabilities: ProviderCapabilities {
                    tool_calling: true,
                    max_context_tokens: 8_192,
                    max_output_tokens: 1_024,
                },
            };
            (provider, requests)
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidRequest("script exhausted".into())))
        }
    }

    struct WalletStub;

    impl Toolkit for WalletStub {
        fn definitions(&self) -> Vec<ToolDefinition> {
            vec![ToolDefinition {
                name: "get_wallet_details".to_string(),
                description: "Wallet details".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }]
        }

        async fn invoke(
            &self,
            name: &str,
            _arguments: serde_json::Value,
        ) -> Result<String, ToolError> {
            match name {
                "get_wallet_details" => Ok("network: base-sepolia".to_string()),
                other => Err(ToolError::UnknownTool(other.to_string())),
            }
        }
    }

    fn text(content: &str) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            id: "resp".to_string(),
            content: content.to_string(),
            tool_calls: Vec::new(),
            model: "gpt-4".to_string(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    fn calls(names: &[&str]) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            id: "resp".to_string(),
            content: String::new(),
            tool_calls: names
                .iter()
                .enumerate()
                .map(|(i, n)| ToolCall {
                    id: format!("call_{i}"),
                    name: n.to_string(),
                    arguments: serde_json::json!({}),
                })
                .collect(),
            model: "gpt-4".to_string(),
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        })
    }

    fn settings(max_steps: usize) -> AgentSettings {
        AgentSettings {
            model: "gpt-4".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            max_steps,
            system_prompt: "You are a test agent.".to_string(),
        }
    }

    fn agent(
        responses: Vec<Result<CompletionResponse, LlmError>>,
        max_steps: usize,
    ) -> (ToolAgent, Arc<Mutex<Vec<CompletionRequest>>>, Arc<MemoryCheckpointStore>) {
        let (provider, requests) = ScriptedProvider::new(responses);
        let store = Arc::new(MemoryCheckpointStore::new());
        let agent = ToolAgent::new(
            BoxLlmProvider::new(provider),
            BoxToolkit::new(WalletStub),
            store.clone(),
            settings(max_steps),
        );
        (agent, requests, store)
    }

    async fn collect(stream: UnitStream) -> Vec<Result<OutputUnit, AgentError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_plain_answer_is_one_agent_unit() {
        let (agent, requests, _) = agent(vec![text("Hello, musician!")], 4);

        let units = collect(agent.stream_turn("t", "hi")).await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].as_ref().unwrap(), &OutputUnit::agent("Hello, musician!"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are a test agent."));
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].messages.last().unwrap().content, "hi");
    }

    #[tokio::test]
    async fn test_tool_round_trip_emits_units_in_order() {
        let (agent, requests, _) = agent(
            vec![calls(&["get_wallet_details"]), text("You are on base-sepolia.")],
            4,
        );

        let units: Vec<OutputUnit> = collect(agent.stream_turn("t", "where am I?"))
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        let sources: Vec<UnitSource> = units.iter().map(|u| u.source).collect();
        assert_eq!(
            sources,
            vec![UnitSource::Agent, UnitSource::Tools, UnitSource::Agent]
        );
        assert_eq!(units[1].text, "network: base-sepolia");
        assert_eq!(units[2].text, "You are on base-sepolia.");

        // Second step sees the assistant tool call and the tool result.
        let requests = requests.lock().unwrap();
        let second = &requests[1].messages;
        assert_eq!(second[second.len() - 2].role, MessageRole::Assistant);
        assert_eq!(second[second.len() - 1].role, MessageRole::Tool);
        assert_eq!(second[second.len() - 1].tool_call_id.as_deref(), Some("call_0"));
    }

    #[tokio::test]
    async fn test_failing_tool_is_reported_to_model() {
        let (agent, _, _) = agent(vec![calls(&["mint_nft"]), text("I cannot mint.")], 4);

        let units: Vec<OutputUnit> = collect(agent.stream_turn("t", "mint"))
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(units.len(), 3);
        assert_eq!(units[1].text, "Error: unknown tool 'mint_nft'");
    }

    #[tokio::test]
    async fn test_provider_error_ends_stream() {
        let (agent, _, _) = agent(vec![Err(LlmError::AuthenticationFailed)], 4);

        let units = collect(agent.stream_turn("t", "hi")).await;
        assert_eq!(units.len(), 1);
        assert!(matches!(
            units[0],
            Err(AgentError::Llm(LlmError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn test_step_limit_is_an_error_after_partial_output() {
        let (agent, _, _) = agent(
            vec![calls(&["get_wallet_details"]), calls(&["get_wallet_details"])],
            2,
        );

        let units = collect(agent.stream_turn("t", "loop")).await;
        assert_eq!(units.len(), 5);
        assert!(units[..4].iter().all(Result::is_ok));
        assert!(matches!(units[4], Err(AgentError::StepLimit(2))));
    }

    #[tokio::test]
    async fn test_history_is_replayed_on_next_turn() {
        let (agent, requests, store) = agent(vec![text("first"), text("second")], 4);

        collect(agent.stream_turn("thread-1", "one")).await;
        collect(agent.stream_turn("thread-1", "two")).await;

        assert_eq!(store.len("thread-1"), 4);
        let requests = requests.lock().unwrap();
        let contents: Vec<&str> = requests[1]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "first", "two"]);
    }

    #[tokio::test]
    async fn test_dropped_tool_step_leaves_no_dangling_call() {
        let (agent, requests, store) = agent(
            vec![calls(&["get_wallet_details"]), text("Still here.")],
            4,
        );

        let mut stream = agent.stream_turn("thread-1", "check wallet");
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.source, UnitSource::Agent);
        drop(stream);

        assert_eq!(store.len("thread-1"), 1);

        let units = collect(agent.stream_turn("thread-1", "hello again")).await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].as_ref().unwrap().text, "Still here.");

        let requests = requests.lock().unwrap();
        let roles: Vec<MessageRole> = requests[1]
            .messages
            .iter()
            .map(|m| m.role.clone())
            .collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::User]);
        assert!(requests[1].messages.iter().all(|m| m.tool_calls.is_empty()));
    }

    #[tokio::test]
    async fn test_completed_tool_step_is_recorded_whole() {
        let (agent, _, store) = agent(
            vec![calls(&["get_wallet_details", "mint_nft"]), text("Done.")],
            4,
        );

        collect(agent.stream_turn("thread-1", "go")).await;

        let roles: Vec<MessageRole> = store
            .load("thread-1")
            .iter()
            .map(|m| m.role.clone())
            .collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Tool,
                MessageRole::Assistant,
            ]
        );
    }

    #[test]
    fn test_tools_lists_toolkit_definitions() {
        let (agent, _, _) = agent(vec![], 1);
        let names: Vec<String> = agent.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["get_wallet_details"]);
    }
}
